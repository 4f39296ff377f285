//! lean_web - Zero-copy HTTP/1.x request parser and response header encoder
//!
//! A small HTTP/1.x core for static-file and API servers: it turns the bytes
//! of one read into a [`Request`] that borrows them, hands it to a
//! [`Handler`] found by a [`Router`], and writes the response with a header
//! block built by [`prepare_response_header`].
//!
//! # Protocol Support
//!
//! - **Methods**: `GET` and `HEAD`. Everything else gets `405`.
//! - **Versions**: `HTTP/1.0` and `HTTP/1.1`, with keep-alive derived from
//!   the version and the `Connection` header.
//! - **One read per request**: a request must fit into a single read of the
//!   [request buffer](limits::ReqLimits); a read that fills it gets `413`.
//! - **No request bodies**, no chunked encoding and no pipelining.
//!
//! # Characteristics
//!
//! - **Zero-copy parsing** - the URL is a span into the read buffer, unknown
//!   headers are skipped and never stored
//! - **Pre-allocated buffers** - every worker owns its request buffer, header
//!   buffer and response descriptor and reuses them for every connection
//! - **Fixed worker pool** - built on Tokio, workers pull accepted streams
//!   from a lock-free queue
//!
//! # Examples
//!
//! Quick start:
//! ```no_run
//! use lean_web::{PrefixRouter, Request, Response, Server, StatusCode};
//! use tokio::net::TcpListener;
//!
//! fn hello(_: &Request, resp: &mut Response) -> StatusCode {
//!     resp.body("Hello World!");
//!     StatusCode::Ok
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
//!         .router(PrefixRouter::new().route("/", hello))
//!         .build()
//!         .launch()
//!         .await;
//! }
//! ```
//! The parser and the encoder on their own:
//! ```
//! use lean_web::{prepare_response_header, Request, Response, StatusCode};
//!
//! let req = Request::parse(b"GET /index.html HTTP/1.1\r\nConnection: close\r\n\r\n").unwrap();
//! assert_eq!(req.url(), b"/index.html");
//! assert!(!req.is_keep_alive());
//!
//! let mut resp = Response::default();
//! resp.mime_type("text/html").body("<h1>Hi</h1>");
//!
//! let mut buffer = [0u8; 256];
//! let len = prepare_response_header(&req, StatusCode::Ok, &resp, &mut buffer);
//! assert!(buffer[..len].starts_with(b"HTTP/1.1 200 OK\r\nContent-Length: 11\r\n"));
//! ```

pub(crate) mod http {
    pub(crate) mod headers;
    pub(crate) mod request;
    pub(crate) mod response;
    pub(crate) mod scan;
    pub(crate) mod types;
}
pub(crate) mod server {
    pub(crate) mod connection;
    pub(crate) mod router;
    pub(crate) mod server_impl;
}
pub(crate) mod errors;
pub mod limits;

pub use crate::{
    http::{
        request::Request,
        response::{default_response, encoded_len, prepare_response_header, Header, Response},
        types::{Method, Span, StatusCode, Version},
    },
    server::{
        connection::{HttpConnection, Outcome, Transport},
        router::{Handler, PrefixRouter, Route, Router},
        server_impl::{Server, ServerBuilder},
    },
};

/// Product name sent in the `Server` header of every response.
pub const SERVER_NAME: &str = "lean_web";
