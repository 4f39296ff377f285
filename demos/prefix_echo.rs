//! Routes by prefix and echoes what is left of the path.
//!
//! ```text
//! $ curl -i http://127.0.0.1:8080/echo/hello
//! HTTP/1.1 200 OK
//! Content-Length: 5
//! Content-Type: text/plain
//! Connection: Keep-Alive
//! Server: lean_web
//!
//! hello
//! ```
use lean_web::{Handler, PrefixRouter, Request, Response, Server, StatusCode};
use std::io::Write;
use tokio::net::TcpListener;

struct Echo;

impl Handler for Echo {
    fn handle(&self, req: &Request, resp: &mut Response) -> StatusCode {
        resp.body(req.url());
        StatusCode::Ok
    }
}

struct Length;

impl Handler for Length {
    fn handle(&self, req: &Request, resp: &mut Response) -> StatusCode {
        match req.url_str() {
            Some(path) => {
                let _ = write!(resp.body_mut(), "{}", path.chars().count());
                StatusCode::Ok
            }
            None => {
                resp.body("path is not valid UTF-8\n");
                StatusCode::BadRequest
            }
        }
    }
}

fn index(_: &Request, resp: &mut Response) -> StatusCode {
    resp.mime_type("text/html")
        .header("Cache-Control", "no-cache")
        .body("<a href=\"/echo/hello\">echo</a> <a href=\"/len/hello\">len</a>\n");
    StatusCode::Ok
}

#[tokio::main]
async fn main() {
    let router = PrefixRouter::new()
        .route("/", index)
        .route("/echo/", Echo)
        .route("/len/", Length);

    Server::builder()
        .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
        .router(router)
        .build()
        .launch()
        .await;
}
