//! Server configuration limits and timeouts
//!
//! # Memory Consumption
//!
//! Each active connection owns:
//!
//! `Total` = [`Request Buffer`](crate::limits::ReqLimits::buffer_size) +
//!           [`Header Buffer`](crate::limits::RespLimits::header_buffer_size) +
//!           [`Response Body`](crate::limits::RespLimits#buffer-management) +
//!           `Runtime Overhead`
//!
//! All of it is allocated once per worker and reused between connections.
//!
//! # Examples
//!
//! ```no_run
//! use lean_web::{limits::{ConnLimits, ReqLimits, ServerLimits}, PrefixRouter, Server};
//! use tokio::net::TcpListener;
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() {
//!     Server::builder()
//!         .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
//!         .router(PrefixRouter::new())
//!         .server_limits(ServerLimits {
//!             max_connections: 5000,
//!             ..ServerLimits::default()
//!         })
//!         .connection_limits(ConnLimits {
//!             socket_read_timeout: Duration::from_secs(5),
//!             max_requests_per_connection: 10_000,
//!             ..ConnLimits::default()
//!         })
//!         .request_limits(ReqLimits {
//!             buffer_size: 16 * 1024,
//!             ..ReqLimits::default()
//!         })
//!         .build()
//!         .launch()
//!         .await;
//! }
//! ```

use std::time::Duration;

/// Controls server-level concurrency and queueing.
///
/// # Connection management
/// ```text
///                            [------------]
///                            [ Tcp accept ]
///                            [------------]
///                                  ||
///                                  || TCP_STREAM
///                                  \/
/// [--------------]   Yes   /----------------\   No   [-----------------]
/// [ Add to queue ] <====== | Is there room? | =====> [ Drop connection ]
/// [--------------]         \----------------/        [-----------------]
///        ||
///        \==================\\          //====================\
///                            V          V                    ||
/// [--------]   Yes   /--------------------------\   No   [------]
/// [ Worker ] <====== | Is there a free worker?  | =====> [ Wait ]
/// [--------]         \--------------------------/        [------]
/// ```
///
/// Workers are long-lived tasks created once at launch. Each one owns its
/// request buffer, header buffer and response descriptor, and serves the
/// connections it pulls from the queue one at a time.
#[derive(Debug, Clone)]
pub struct ServerLimits {
    /// Number of workers, i.e. connections served concurrently (default: `100`).
    pub max_connections: usize,

    /// Capacity of the admission queue (default: `250`).
    ///
    /// Connections accepted while the queue is full are closed without a
    /// response and logged.
    pub max_pending_connections: usize,

    /// How idle workers wait for the queue (default: `Sleep(50μs)`).
    pub wait_strategy: WaitStrategy,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ServerLimits {
    fn default() -> Self {
        Self {
            max_connections: 100,
            max_pending_connections: 250,
            wait_strategy: WaitStrategy::Sleep(Duration::from_micros(50)),

            _priv: (),
        }
    }
}

/// Strategy for worker task waiting when no connections are available
#[derive(Debug, Clone)]
pub enum WaitStrategy {
    /// While waiting, uses [`tokio::task::yield_now()`]
    ///
    /// # Note
    /// Keeps a core busy while the server is idle.
    Yield,

    /// While waiting, uses [`tokio::time::sleep()`]
    Sleep(Duration),
}

/// Connection-level limits and timeouts
#[derive(Debug, Clone)]
pub struct ConnLimits {
    /// Maximum duration of one read from the socket (default: `2 seconds`)
    ///
    /// On expiry the connection is closed without a response.
    pub socket_read_timeout: Duration,

    /// Maximum duration of writing one response (default: `3 seconds`)
    pub socket_write_timeout: Duration,

    /// Maximum number of requests served on one connection (default: `100`)
    pub max_requests_per_connection: usize,

    /// Maximum lifetime of a connection (default: `2 minutes`)
    ///
    /// Checked between requests: a response in progress is never cut off.
    pub connection_lifetime: Duration,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ConnLimits {
    #[inline(always)]
    fn default() -> Self {
        Self {
            socket_read_timeout: Duration::from_secs(2),
            socket_write_timeout: Duration::from_secs(3),
            max_requests_per_connection: 100,
            connection_lifetime: Duration::from_secs(120),

            _priv: (),
        }
    }
}

/// Request buffer configuration
///
/// A request must arrive in a single read of at most `buffer_size - 1`
/// bytes. A read that fills the whole buffer is answered with
/// [`413 Payload Too Large`](crate::StatusCode::PayloadTooLarge).
#[derive(Debug, Clone)]
pub struct ReqLimits {
    /// Size of the per-connection request buffer (default: `6 KB`)
    pub buffer_size: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for ReqLimits {
    fn default() -> Self {
        Self {
            buffer_size: 6 * 1024,
            _priv: (),
        }
    }
}

/// Configuration for response buffers.
///
/// # Buffer Management
///
/// Between requests the body buffer is managed as follows:
/// ```rust
/// # use lean_web::limits::RespLimits;
/// # let limits = RespLimits::default();
/// # let mut buffer: Vec<u8> = Vec::with_capacity(limits.default_body_capacity);
/// #
/// if buffer.capacity() > limits.max_body_capacity {
///     buffer = Vec::with_capacity(limits.default_body_capacity);
/// } else {
///     buffer.clear();
/// }
/// ```
#[derive(Debug, Clone)]
pub struct RespLimits {
    /// Initial size of the header block buffer (default: `512 B`)
    ///
    /// Grown for a single response whose headers do not fit.
    pub header_buffer_size: usize,
    /// Initial capacity of the extra header list (default: `8`)
    pub header_count: usize,

    /// Initial body buffer capacity (default: `1024 B`)
    pub default_body_capacity: usize,
    /// Body capacity above which the buffer is reallocated on reset (default: `8192 B`)
    pub max_body_capacity: usize,

    #[doc(hidden)]
    #[allow(dead_code)]
    pub _priv: (),
}

impl Default for RespLimits {
    fn default() -> Self {
        Self {
            header_buffer_size: 512,
            header_count: 8,
            default_body_capacity: 1024,
            max_body_capacity: 8 * 1024,

            _priv: (),
        }
    }
}
