//! Response descriptor and the zero-allocation header block encoder.

use crate::{
    http::{request::Request, types::StatusCode},
    limits::RespLimits,
    SERVER_NAME,
};
use std::borrow::Cow;

/// A response header supplied by a handler.
///
/// A header with an empty `name` terminates the list: it and everything
/// after it are not written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub name: &'static str,
    pub value: Cow<'static, str>,
}

/// Response descriptor filled by a [`Handler`](crate::Handler).
///
/// The status is returned by the handler separately; the descriptor carries
/// everything else needed to build the header block and the body.
///
/// Instances are owned by the connection and reused between requests.
///
/// # Examples
/// ```
/// use lean_web::Response;
///
/// let mut resp = Response::default();
/// resp.mime_type("application/json")
///     .header("Cache-Control", "no-cache")
///     .body(r#"{"status":"ok"}"#);
///
/// assert_eq!(resp.content_length(), 15);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    body: Vec<u8>,
    mime_type: &'static str,
    headers: Vec<Header>,
}

impl Default for Response {
    fn default() -> Self {
        Response::new(&RespLimits::default())
    }
}

impl Response {
    /// MIME type used when the handler does not set one.
    pub const DEFAULT_MIME_TYPE: &'static str = "text/plain";

    #[inline(always)]
    pub(crate) fn new(limits: &RespLimits) -> Self {
        Self {
            body: Vec::with_capacity(limits.default_body_capacity),
            mime_type: Self::DEFAULT_MIME_TYPE,
            headers: Vec::with_capacity(limits.header_count),
        }
    }

    #[inline(always)]
    pub(crate) fn reset(&mut self, limits: &RespLimits) {
        if self.body.capacity() > limits.max_body_capacity {
            self.body = Vec::with_capacity(limits.default_body_capacity);
        } else {
            self.body.clear();
        }

        self.mime_type = Self::DEFAULT_MIME_TYPE;
        self.headers.clear();
    }

    /// Turns the descriptor into the canned page for `status`.
    #[inline]
    pub(crate) fn set_default(&mut self, status: StatusCode) {
        self.body.clear();
        self.body.extend_from_slice(status.default_body());
        self.mime_type = Self::DEFAULT_MIME_TYPE;
        self.headers.clear();
    }
}

// Public API
impl Response {
    /// Sets the `Content-Type` value.
    #[inline]
    pub fn mime_type(&mut self, mime_type: &'static str) -> &mut Self {
        self.mime_type = mime_type;
        self
    }

    /// Appends an extra header. Order is preserved on the wire.
    ///
    /// PLEASE DO NOT ADD THE FOLLOWING HEADERS, they are always written:
    /// - `Content-Length`
    /// - `Content-Type` - use [`mime_type()`](Response::mime_type)
    /// - `Connection` - derived from the request
    /// - `Server`
    #[inline]
    pub fn header<V: Into<Cow<'static, str>>>(&mut self, name: &'static str, value: V) -> &mut Self {
        self.headers.push(Header {
            name,
            value: value.into(),
        });
        self
    }

    /// Replaces the body.
    #[inline]
    pub fn body<T: AsRef<[u8]>>(&mut self, data: T) -> &mut Self {
        self.body.clear();
        self.body.extend_from_slice(data.as_ref());
        self
    }

    /// Direct access to the body buffer, e.g. for [`write!`].
    ///
    /// # Examples
    /// ```
    /// use lean_web::Response;
    /// use std::io::Write;
    ///
    /// let mut resp = Response::default();
    /// write!(resp.body_mut(), "{} - {} = {}", 6, 2, 4).unwrap();
    ///
    /// assert_eq!(resp.body_bytes(), b"6 - 2 = 4");
    /// ```
    #[inline(always)]
    pub fn body_mut(&mut self) -> &mut Vec<u8> {
        &mut self.body
    }

    #[inline(always)]
    pub fn body_bytes(&self) -> &[u8] {
        &self.body
    }

    #[inline(always)]
    pub fn content_length(&self) -> usize {
        self.body.len()
    }

    #[inline(always)]
    pub fn content_type(&self) -> &'static str {
        self.mime_type
    }

    /// Extra headers up to, not including, the first empty-name entry.
    #[inline]
    pub fn headers(&self) -> impl Iterator<Item = &Header> {
        self.headers.iter().take_while(|h| !h.name.is_empty())
    }
}

// ENCODER

const DECIMAL_DIGITS: &[u8; 10] = b"0123456789";

trait Sink {
    fn append(&mut self, bytes: &[u8]);
}

// Sequential writer over a caller-owned buffer. Never backtracks.
struct HeaderWriter<'a> {
    buffer: &'a mut [u8],
    pos: usize,
}

impl Sink for HeaderWriter<'_> {
    #[inline(always)]
    fn append(&mut self, bytes: &[u8]) {
        let end = self.pos + bytes.len();
        self.buffer[self.pos..end].copy_from_slice(bytes);
        self.pos = end;
    }
}

struct Counter(usize);

impl Sink for Counter {
    #[inline(always)]
    fn append(&mut self, bytes: &[u8]) {
        self.0 += bytes.len();
    }
}

#[inline(always)]
fn encode<S: Sink>(sink: &mut S, request: &Request<'_>, status: StatusCode, response: &Response) {
    let code = status.as_u16() as usize;
    let (length, start) = number_to_bytes(response.content_length());

    sink.append(b"HTTP/");
    sink.append(request.version().as_bytes());
    sink.append(&[
        b' ',
        DECIMAL_DIGITS[(code / 100) % 10],
        DECIMAL_DIGITS[(code / 10) % 10],
        DECIMAL_DIGITS[code % 10],
        b' ',
    ]);
    sink.append(status.reason().as_bytes());
    sink.append(b"\r\nContent-Length: ");
    sink.append(&length[start..]);
    sink.append(b"\r\nContent-Type: ");
    sink.append(response.content_type().as_bytes());
    sink.append(b"\r\nConnection: ");
    sink.append(match request.is_keep_alive() {
        true => &b"Keep-Alive"[..],
        false => &b"Close"[..],
    });
    for header in response.headers() {
        sink.append(b"\r\n");
        sink.append(header.name.as_bytes());
        sink.append(b": ");
        sink.append(header.value.as_bytes());
    }
    sink.append(b"\r\nServer: ");
    sink.append(SERVER_NAME.as_bytes());
    sink.append(b"\r\n\r\n");
}

/// Exact number of bytes [`prepare_response_header`] returns for the same
/// arguments. The buffer passed to it needs one more byte for the trailing NUL.
#[inline]
pub fn encoded_len(request: &Request<'_>, status: StatusCode, response: &Response) -> usize {
    let mut counter = Counter(0);
    encode(&mut counter, request, status, response);
    counter.0
}

/// Serializes the response header block into `headers` and returns its
/// exact length.
///
/// Writes, in order: the status line, `Content-Length`, `Content-Type`,
/// `Connection`, the extra headers of `response`, `Server` and the blank
/// line. A NUL byte is written after the block and is not counted.
///
/// # Panics
/// The buffer is not grown and capacity is not negotiated: sizing it is
/// the caller's job (see [`encoded_len`]). Panics if `headers` is shorter
/// than `encoded_len(..) + 1`.
///
/// # Examples
/// ```
/// use lean_web::{prepare_response_header, Request, Response, StatusCode};
///
/// let req = Request::parse(b"GET / HTTP/1.0\r\n\r\n").unwrap();
/// let mut resp = Response::default();
/// resp.body("hi");
///
/// let mut buffer = [0u8; 256];
/// let len = prepare_response_header(&req, StatusCode::Ok, &resp, &mut buffer);
///
/// assert_eq!(
///     &buffer[..len],
///     b"HTTP/1.0 200 OK\r\nContent-Length: 2\r\nContent-Type: text/plain\r\n\
///       Connection: Close\r\nServer: lean_web\r\n\r\n"
/// );
/// assert_eq!(buffer[len], 0);
/// ```
#[inline]
pub fn prepare_response_header(
    request: &Request<'_>,
    status: StatusCode,
    response: &Response,
    headers: &mut [u8],
) -> usize {
    let mut writer = HeaderWriter {
        buffer: headers,
        pos: 0,
    };

    encode(&mut writer, request, status, response);
    let len = writer.pos;
    writer.append(b"\0");

    len
}

/// Encodes into a growable buffer, resizing it when the block does not fit.
/// Returns the block length.
#[inline]
pub(crate) fn encode_into(
    header: &mut Vec<u8>,
    request: &Request<'_>,
    status: StatusCode,
    response: &Response,
) -> usize {
    let needed = encoded_len(request, status, response) + 1;
    if header.len() < needed {
        header.resize(needed, 0);
    }

    prepare_response_header(request, status, response, header)
}

/// Complete canned response for `status`: the header block built for
/// `request` followed by the `text/plain` body `"<code> <reason>\n"`.
///
/// A connection answers failed requests with the same bytes.
///
/// # Examples
/// ```
/// use lean_web::{default_response, Request, StatusCode};
///
/// let req = Request::parse(b"GET /missing HTTP/1.1\r\n\r\n").unwrap();
/// let bytes = default_response(&req, StatusCode::NotFound);
///
/// assert!(bytes.starts_with(b"HTTP/1.1 404 Not Found\r\n"));
/// assert!(bytes.ends_with(b"\r\n\r\n404 Not Found\n"));
/// ```
pub fn default_response(request: &Request<'_>, status: StatusCode) -> Vec<u8> {
    let mut response = Response::default();
    response.set_default(status);

    let mut bytes = Vec::new();
    let len = encode_into(&mut bytes, request, status, &response);
    bytes.truncate(len);
    bytes.extend_from_slice(response.body_bytes());

    bytes
}

#[inline]
const fn number_to_bytes(mut n: usize) -> ([u8; 20], usize) {
    let mut buffer = [b'0'; 20];
    let mut i = 20;

    if n == 0 {
        return (buffer, 19);
    }

    while n > 0 {
        i -= 1;
        buffer[i] = b'0' + (n % 10) as u8;
        n /= 10;
    }

    (buffer, i)
}
