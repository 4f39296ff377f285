use crate::{
    errors::{ErrorKind, IoError},
    http::{
        request::{Parser, Request},
        response::{encode_into, Response},
        types::{Method, StatusCode},
    },
    limits::{ConnLimits, ReqLimits, RespLimits},
    server::router::Router,
};
use std::{io, sync::Arc, time::Duration};
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt, DuplexStream},
    net::TcpStream,
    time::{timeout, Instant},
};
use tracing::{debug, warn};

/// A connection-oriented byte stream a [`HttpConnection`] can serve.
///
/// `set_corked` batches the header block and the body into as few segments
/// as possible. Failures are logged and never end the request.
pub trait Transport: AsyncRead + AsyncWrite + Unpin + Send {
    #[inline(always)]
    fn set_corked(&mut self, _corked: bool) -> io::Result<()> {
        Ok(())
    }
}

impl Transport for TcpStream {
    #[cfg(any(target_os = "android", target_os = "fuchsia", target_os = "linux"))]
    #[inline]
    fn set_corked(&mut self, corked: bool) -> io::Result<()> {
        socket2::SockRef::from(&*self).set_tcp_cork(corked)
    }
}

/// In-memory pipe, corking is a no-op.
impl Transport for DuplexStream {}

/// What the peer can expect after [`HttpConnection::process_request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A response was sent with `Connection: Keep-Alive`.
    KeepAlive,
    /// A response was sent with `Connection: Close`.
    Close,
    /// Nothing was sent: the peer closed the stream or stayed silent past
    /// the read timeout.
    Closed,
}

/// Serves requests on one stream at a time.
///
/// Owns the request buffer, the header block buffer and the response
/// descriptor; all three are reused for every request and every stream.
pub struct HttpConnection<R: Router> {
    router: Arc<R>,

    parser: Parser,
    header: Vec<u8>,
    response: Response,

    conn_limits: ConnLimits,
    resp_limits: RespLimits,
}

impl<R: Router> HttpConnection<R> {
    /// Connection with default [limits](crate::limits).
    #[inline]
    pub fn new(router: Arc<R>) -> Self {
        Self::with_limits(
            router,
            ConnLimits::default(),
            &ReqLimits::default(),
            RespLimits::default(),
        )
    }

    #[inline]
    pub fn with_limits(
        router: Arc<R>,
        conn_limits: ConnLimits,
        req_limits: &ReqLimits,
        resp_limits: RespLimits,
    ) -> Self {
        Self {
            router,

            parser: Parser::new(req_limits),
            header: vec![0; resp_limits.header_buffer_size],
            response: Response::new(&resp_limits),

            conn_limits,
            resp_limits,
        }
    }

    #[inline]
    fn reset(&mut self) {
        self.parser.reset();
        self.response.reset(&self.resp_limits);

        if self.header.len() > self.resp_limits.header_buffer_size {
            self.header.truncate(self.resp_limits.header_buffer_size);
            self.header.shrink_to_fit();
        }
    }

    /// Serves `stream` until the peer closes it, a response says
    /// `Connection: Close`, or a [`ConnLimits`] limit is reached.
    ///
    /// Returns the I/O error that ended the connection, if any.
    pub async fn run<T: Transport>(&mut self, stream: &mut T) -> Result<(), io::Error> {
        let created = Instant::now();
        let mut served = 0;

        loop {
            let outcome = self.process_request(stream).await?;
            served += 1;

            if outcome != Outcome::KeepAlive
                || served >= self.conn_limits.max_requests_per_connection
                || created.elapsed() > self.conn_limits.connection_lifetime
            {
                return Ok(());
            }
        }
    }

    /// Reads, parses, routes and answers exactly one request.
    ///
    /// Every failure after a successful read is answered with the default
    /// response for its status. A read error is logged and returned
    /// without writing anything.
    pub async fn process_request<T: Transport>(
        &mut self,
        stream: &mut T,
    ) -> Result<Outcome, io::Error> {
        self.reset();

        let read = match timeout(
            self.conn_limits.socket_read_timeout,
            self.parser.fill_buffer(stream),
        )
        .await
        {
            Ok(read) => read,
            Err(_) => {
                debug!("read timed out, closing");
                return Ok(Outcome::Closed);
            }
        };

        let Self {
            router,
            parser,
            header,
            response,
            conn_limits,
            ..
        } = self;

        let mut request = Request::new(parser.filled());

        let dispatched = match read {
            Ok(_) => dispatch(router.as_ref(), &mut request, response),
            Err(err) => Err(err),
        };

        let status = match dispatched {
            Ok(status) => status,
            Err(ErrorKind::Closed) => return Ok(Outcome::Closed),
            Err(ErrorKind::Io(IoError(err))) => {
                warn!(error = %err, "failed to read request");
                return Err(err);
            }
            Err(err) => {
                debug!(error = %err, "request rejected");

                let status = err.status().unwrap_or(StatusCode::BadRequest);
                response.set_default(status);
                status
            }
        };

        let len = encode_into(header, &request, status, response);
        let body = match request.method() {
            Method::Head => &[][..],
            Method::Get => response.body_bytes(),
        };

        write_response(stream, &header[..len], body, conn_limits.socket_write_timeout).await?;

        Ok(match request.is_keep_alive() {
            true => Outcome::KeepAlive,
            false => Outcome::Close,
        })
    }
}

#[inline]
fn dispatch<R: Router>(
    router: &R,
    request: &mut Request<'_>,
    response: &mut Response,
) -> Result<StatusCode, ErrorKind> {
    request.parse_into()?;

    let route = router.lookup(request.url()).ok_or(ErrorKind::NotFound)?;
    request.strip_url_prefix(route.prefix_len);

    Ok(route.handler.handle(request, response))
}

#[inline]
async fn write_response<T: Transport>(
    stream: &mut T,
    header: &[u8],
    body: &[u8],
    write_timeout: Duration,
) -> Result<(), io::Error> {
    if let Err(err) = stream.set_corked(true) {
        warn!(error = %err, "failed to cork socket");
    }

    let written = timeout(write_timeout, async {
        stream.write_all(header).await?;
        if !body.is_empty() {
            stream.write_all(body).await?;
        }
        stream.flush().await
    })
    .await;

    if let Err(err) = stream.set_corked(false) {
        warn!(error = %err, "failed to uncork socket");
    }

    written?
}
