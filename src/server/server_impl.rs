use crate::{
    limits::{ConnLimits, ReqLimits, RespLimits, ServerLimits, WaitStrategy},
    server::{connection::HttpConnection, router::Router},
};
use crossbeam::queue::SegQueue;
use std::{net::SocketAddr, sync::Arc};
use tokio::{
    net::{TcpListener, TcpStream},
    task::yield_now,
    time::sleep as tokio_sleep,
};
use tracing::{debug, warn};

/// An HTTP server that accepts TCP connections and serves them with a fixed
/// pool of workers.
///
/// # Examples
///
/// ```no_run
/// use lean_web::{PrefixRouter, Request, Response, Server, StatusCode};
/// use tokio::net::TcpListener;
///
/// fn hello(_: &Request, resp: &mut Response) -> StatusCode {
///     resp.body("Hello world!");
///     StatusCode::Ok
/// }
///
/// #[tokio::main]
/// async fn main() {
///     Server::builder()
///         .listener(TcpListener::bind("127.0.0.1:8080").await.unwrap())
///         .router(PrefixRouter::new().route("/", hello))
///         .build()
///         .launch()
///         .await
/// }
/// ```
pub struct Server {
    listener: TcpListener,
    stream_queue: TcpQueue,
    server_limits: ServerLimits,
}

impl Server {
    /// Creates a new builder for configuring the server instance.
    #[inline]
    pub fn builder<R: Router>() -> ServerBuilder<R> {
        ServerBuilder {
            listener: None,
            router: None,

            server_limits: None,
            request_limits: None,
            response_limits: None,
            connection_limits: None,
        }
    }

    /// Address the listener is bound to.
    #[inline]
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Starts accepting connections. Never returns.
    ///
    /// Connections accepted while the queue holds
    /// [`max_pending_connections`](ServerLimits::max_pending_connections)
    /// streams are closed immediately.
    #[inline]
    pub async fn launch(self) {
        loop {
            let (stream, addr) = match self.listener.accept().await {
                Ok(value) => value,
                Err(err) => {
                    warn!(error = %err, "failed to accept connection");
                    continue;
                }
            };

            if self.stream_queue.len() < self.server_limits.max_pending_connections {
                self.stream_queue.push((stream, addr));
            } else {
                warn!(%addr, "connection queue is full, dropping connection");
                drop(stream);
            }
        }
    }

    #[inline]
    async fn get_stream(queue: &TcpQueue, wait: &WaitStrategy) -> (TcpStream, SocketAddr) {
        loop {
            if let Some(value) = queue.pop() {
                return value;
            }

            match wait {
                WaitStrategy::Yield => yield_now().await,
                WaitStrategy::Sleep(time) => tokio_sleep(*time).await,
            }
        }
    }
}

//

/// Builder for configuring and creating [`Server`] instances.
pub struct ServerBuilder<R: Router> {
    listener: Option<TcpListener>,
    router: Option<Arc<R>>,

    server_limits: Option<ServerLimits>,
    request_limits: Option<ReqLimits>,
    response_limits: Option<RespLimits>,
    connection_limits: Option<ConnLimits>,
}

impl<R: Router> ServerBuilder<R> {
    /// Sets the TCP listener that the server will use to accept connections.
    ///
    /// **This is a required component.**
    #[inline(always)]
    pub fn listener(mut self, listener: TcpListener) -> Self {
        self.listener = Some(listener);
        self
    }

    /// Sets the router shared by all workers.
    ///
    /// **This is a required component.**
    #[inline(always)]
    pub fn router(mut self, router: R) -> Self {
        self.router = Some(Arc::new(router));
        self
    }

    #[inline(always)]
    pub fn server_limits(mut self, limits: ServerLimits) -> Self {
        self.server_limits = Some(limits);
        self
    }

    #[inline(always)]
    pub fn connection_limits(mut self, limits: ConnLimits) -> Self {
        self.connection_limits = Some(limits);
        self
    }

    #[inline(always)]
    pub fn request_limits(mut self, limits: ReqLimits) -> Self {
        self.request_limits = Some(limits);
        self
    }

    #[inline(always)]
    pub fn response_limits(mut self, limits: RespLimits) -> Self {
        self.response_limits = Some(limits);
        self
    }

    /// Finalizes the builder, spawning
    /// [`max_connections`](ServerLimits::max_connections) workers on the
    /// current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when:
    /// - The `listener` method was not called.
    /// - The `router` method was not called.
    /// - It is called outside of a Tokio runtime.
    #[inline]
    #[track_caller]
    pub fn build(self) -> Server {
        let (listener, router, limits) = self.get_all_parts();
        let stream_queue = Arc::new(SegQueue::new());

        for id in 0..limits.0.max_connections {
            Self::spawn_worker(id, &stream_queue, &limits, &router);
        }
        debug!(workers = limits.0.max_connections, "worker pool started");

        Server {
            listener,
            stream_queue,
            server_limits: limits.0,
        }
    }

    #[inline]
    fn spawn_worker(id: usize, queue: &TcpQueue, limits: &AllLimits, router: &Arc<R>) {
        let queue = queue.clone();
        let (server_limits, conn_limits, req_limits, resp_limits) = limits.clone();
        let mut conn =
            HttpConnection::with_limits(router.clone(), conn_limits, &req_limits, resp_limits);

        tokio::spawn(async move {
            loop {
                let (mut stream, addr) =
                    Server::get_stream(&queue, &server_limits.wait_strategy).await;

                if let Err(err) = conn.run(&mut stream).await {
                    debug!(worker = id, %addr, error = %err, "connection ended with error");
                }
            }
        });
    }

    #[inline]
    #[track_caller]
    fn get_all_parts(self) -> (TcpListener, Arc<R>, AllLimits) {
        (
            self.listener
                .expect("The `listener` method must be called to create"),
            self.router
                .expect("The `router` method must be called to create"),
            (
                self.server_limits.unwrap_or_default(),
                self.connection_limits.unwrap_or_default(),
                self.request_limits.unwrap_or_default(),
                self.response_limits.unwrap_or_default(),
            ),
        )
    }
}

type TcpQueue = Arc<SegQueue<(TcpStream, SocketAddr)>>;
type AllLimits = (ServerLimits, ConnLimits, ReqLimits, RespLimits);
