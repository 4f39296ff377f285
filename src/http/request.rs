use crate::{
    errors::ErrorKind,
    http::{
        headers::{self, HeaderAction, HeaderMatch, HEADER_MIN_LOOKAHEAD},
        scan,
        types::{self, Span},
    },
    limits::ReqLimits,
    Method, StatusCode, Version,
};
use tokio::io::{AsyncRead, AsyncReadExt};

/// Width of `" HTTP/X.Y"` at the end of the request line.
pub(crate) const VERSION_SUFFIX_LEN: usize = 9;

/// Zero-copy HTTP request parsed from a single buffered read.
///
/// The request borrows the read buffer for its whole life; the URL is a
/// [`Span`] into that buffer and is never copied.
///
/// # Input data requirements
///
/// #### General designations
/// - `SP`: ASCII space (0x20)
/// - `CRLF`: Carriage return + line feed (`"\r\n"`)
/// ---
/// - `[METHOD]`: `GET` or `HEAD`. Anything else is answered with
///   `405 Method Not Allowed`.
/// - `[PATH]`: must start with `/`. Query strings and fragments are not
///   interpreted and stay part of the path.
///
/// ## First line
/// | Template                                       | Example                       |
/// |------------------------------------------------|-------------------------------|
/// | `[METHOD] SP [PATH] SP "HTTP/1." [MINOR] CRLF` | `GET /api/users HTTP/1.1\r\n` |
///
/// The version is located at a fixed offset from the line end, so exactly
/// one `SP` and the 8 bytes of `HTTP/1.x` must close the line. Leading
/// whitespace before the method is skipped.
///
/// ## Headers
///
/// Only a fixed set of names is recognized, spelled exactly as below:
///
/// | Header              | Effect                                  |
/// |---------------------|-----------------------------------------|
/// | `Connection`        | First value byte drives keep-alive      |
/// | `Host`              | Ignored                                 |
/// | `If-Modified-Since` | Ignored                                 |
/// | `Range`             | Ignored                                 |
/// | `Referer`           | Ignored                                 |
/// | `Cookie`            | Ignored                                 |
///
/// Recognized headers must look like `Name: value\r\n`. Everything else,
/// malformed recognized headers included, is skipped line by line and never
/// stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Request<'b> {
    buffer: &'b [u8],

    method: Method,
    url: Span,
    version: Version,

    connection: u8,
    keep_alive: bool,
}

impl<'b> Request<'b> {
    #[inline(always)]
    pub(crate) const fn new(buffer: &'b [u8]) -> Self {
        Request {
            buffer,

            method: Method::Get,
            url: Span { start: 0, len: 0 },
            version: Version::Http10,

            connection: 0,
            keep_alive: false,
        }
    }

    /// Parses `buffer` as one complete request head.
    ///
    /// The buffer is never modified, so parsing the same bytes twice yields
    /// equal requests.
    ///
    /// # Examples
    /// ```
    /// use lean_web::{Method, Request, StatusCode, Version};
    ///
    /// let req = Request::parse(b"GET /index.html HTTP/1.1\r\nConnection: close\r\n\r\n").unwrap();
    /// assert_eq!(req.method(), Method::Get);
    /// assert_eq!(req.url(), b"/index.html");
    /// assert_eq!(req.version(), Version::Http11);
    /// assert!(!req.is_keep_alive());
    ///
    /// let err = Request::parse(b"POST / HTTP/1.1\r\n\r\n").unwrap_err();
    /// assert_eq!(err, StatusCode::MethodNotAllowed);
    /// ```
    pub fn parse(buffer: &'b [u8]) -> Result<Self, StatusCode> {
        let mut request = Request::new(buffer);

        match request.parse_into() {
            Ok(()) => Ok(request),
            Err(err) => Err(err.status().unwrap_or(StatusCode::BadRequest)),
        }
    }

    #[inline]
    pub(crate) fn parse_into(&mut self) -> Result<(), ErrorKind> {
        let start = scan::skip_whitespace(self.buffer, 0);
        if start == self.buffer.len() {
            return Err(ErrorKind::EmptyRequest);
        }

        let pos = self.parse_method(start)?;
        let pos = self.parse_path(pos)?;
        self.parse_headers(pos);
        self.compute_flags();

        Ok(())
    }

    /// Advances the URL past a routed prefix.
    #[inline(always)]
    pub(crate) fn strip_url_prefix(&mut self, len: usize) {
        self.url.advance(len);
    }
}

// Public API
impl<'b> Request<'b> {
    #[inline(always)]
    pub const fn method(&self) -> Method {
        self.method
    }

    /// Returns the URL path.
    ///
    /// After routing, this is only the part past the handler's registered
    /// prefix.
    #[inline(always)]
    pub fn url(&self) -> &'b [u8] {
        self.url.get(self.buffer)
    }

    /// Returns the URL as `&str`, or `None` if it is not valid UTF-8.
    #[inline]
    pub fn url_str(&self) -> Option<&'b str> {
        simdutf8::basic::from_utf8(self.url()).ok()
    }

    /// Position of the URL inside the read buffer.
    #[inline(always)]
    pub const fn url_span(&self) -> Span {
        self.url
    }

    #[inline(always)]
    pub const fn version(&self) -> Version {
        self.version
    }

    /// Lowercased first byte of the `Connection` header value, if one was sent.
    #[inline(always)]
    pub const fn connection(&self) -> Option<u8> {
        match self.connection {
            0 => None,
            byte => Some(byte),
        }
    }

    /// Returns the keep-alive status of the connection.
    #[inline(always)]
    pub const fn is_keep_alive(&self) -> bool {
        self.keep_alive
    }
}

// Parse first line
impl Request<'_> {
    #[inline]
    fn parse_method(&mut self, pos: usize) -> Result<usize, ErrorKind> {
        let (method, len) = Method::from_bytes(&self.buffer[pos..])?;

        self.method = method;
        Ok(pos + len)
    }

    #[inline]
    fn parse_path(&mut self, pos: usize) -> Result<usize, ErrorKind> {
        let rest = &self.buffer[pos..];
        let eol = scan::find_cr(rest, rest.len()).ok_or(ErrorKind::InvalidRequestLine)?;

        // Length check first, the suffix is read at a fixed offset
        if eol < VERSION_SUFFIX_LEN {
            return Err(ErrorKind::InvalidRequestLine);
        }
        let space = eol - VERSION_SUFFIX_LEN;

        let (major, minor) = match rest[space..eol] {
            [_, b'H', _, _, _, _, major, _, minor] => (major, minor),
            _ => return Err(ErrorKind::InvalidRequestLine),
        };
        if major != b'1' {
            return Err(ErrorKind::UnsupportedVersion);
        }
        self.version = match minor {
            b'0' => Version::Http10,
            _ => Version::Http11,
        };

        let url = Span::new(pos, pos + space);
        if url.get(self.buffer).first() != Some(&b'/') {
            return Err(ErrorKind::InvalidUrl);
        }
        self.url = url;

        let after_cr = pos + eol + 1;
        match self.buffer.get(after_cr) {
            Some(b'\n') => Ok(after_cr + 1),
            _ => Ok(after_cr),
        }
    }
}

// Parse headers
impl Request<'_> {
    // Ends at a blank line, at the end of the buffer or when a line has no
    // `\n`. Never fails: unknown and malformed lines are skipped.
    #[inline]
    fn parse_headers(&mut self, mut pos: usize) -> usize {
        let buffer = self.buffer;

        while pos + HEADER_MIN_LOOKAHEAD < buffer.len() {
            if matches!(buffer[pos], b'\r' | b'\n') {
                break;
            }

            match headers::match_header(buffer, pos) {
                HeaderMatch::Matched {
                    action,
                    value,
                    next,
                } => {
                    self.apply_header(action, value);
                    pos = next;
                }
                HeaderMatch::NotMatched => match scan::find_lf(&buffer[pos..]) {
                    Some(lf) => pos += lf + 1,
                    None => break,
                },
            }
        }

        pos
    }

    #[inline(always)]
    fn apply_header(&mut self, action: HeaderAction, value: Span) {
        match action {
            HeaderAction::CacheConnection => {
                self.connection = value
                    .get(self.buffer)
                    .first()
                    .map_or(0, |&byte| types::to_lower(byte));
            }
            HeaderAction::Ignore => {}
        }
    }

    #[inline(always)]
    fn compute_flags(&mut self) {
        self.keep_alive = match self.version {
            Version::Http11 => self.connection != b'c',
            Version::Http10 => self.connection == b'k',
        };
    }
}

//

/// Fixed-capacity read buffer owned by one connection.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Parser {
    len: usize,
    buffer: Box<[u8]>,
}

impl Parser {
    #[inline(always)]
    pub(crate) fn new(limits: &ReqLimits) -> Self {
        let buffer = vec![0; limits.buffer_size].into_boxed_slice();

        Parser { len: 0, buffer }
    }

    #[inline]
    #[cfg(test)]
    pub(crate) fn from<V: AsRef<[u8]>>(limits: &ReqLimits, value: V) -> Self {
        let mut parser = Parser::new(limits);

        let value = value.as_ref();
        parser.buffer[..value.len()].copy_from_slice(value);
        parser.len = value.len();

        parser
    }

    #[inline(always)]
    pub(crate) fn reset(&mut self) {
        self.len = 0;
    }

    #[inline(always)]
    pub(crate) fn filled(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// One bounded read. A read that fills the whole buffer is rejected,
    /// whether or not more data was pending.
    #[inline]
    pub(crate) async fn fill_buffer<T>(&mut self, stream: &mut T) -> Result<usize, ErrorKind>
    where
        T: AsyncRead + Unpin,
    {
        let n = stream.read(&mut self.buffer).await?;
        self.len = n;

        match n {
            0 => Err(ErrorKind::Closed),
            n if n == self.buffer.len() => Err(ErrorKind::TooLarge),
            n => Ok(n),
        }
    }
}

#[cfg(test)]
mod request_self {
    use super::*;

    fn parse(value: &str) -> Result<Request<'_>, ErrorKind> {
        let mut request = Request::new(value.as_bytes());
        request.parse_into().map(|()| request)
    }

    #[test]
    fn parse_method() {
        #[rustfmt::skip]
        let cases = [
            ("GET / HTTP/1.1\r\n\r\n",      Ok(Method::Get)),
            ("HEAD / HTTP/1.1\r\n\r\n",     Ok(Method::Head)),
            ("\r\n\r\nGET / HTTP/1.1\r\n",  Ok(Method::Get)),
            (" \tHEAD / HTTP/1.0\r\n",      Ok(Method::Head)),

            ("POST / HTTP/1.1\r\n\r\n",     Err(ErrorKind::InvalidMethod)),
            ("OPTIONS / HTTP/1.1\r\n\r\n",  Err(ErrorKind::InvalidMethod)),
            ("get / HTTP/1.1\r\n\r\n",      Err(ErrorKind::InvalidMethod)),
            ("GET/ HTTP/1.1\r\n\r\n",       Err(ErrorKind::InvalidMethod)),
            ("GETGET / HTTP/1.1\r\n\r\n",   Err(ErrorKind::InvalidMethod)),

            ("",                            Err(ErrorKind::EmptyRequest)),
            (" \r\n\t \r\n",                Err(ErrorKind::EmptyRequest)),
        ];

        for (value, expected) in cases {
            assert_eq!(parse(value).map(|r| r.method()), expected, "{value:?}");
        }
    }

    #[test]
    fn parse_url() {
        #[rustfmt::skip]
        let cases = [
            ("/",                         Ok("/")),
            ("/path",                     Ok("/path")),
            ("/api/users/123",            Ok("/api/users/123")),
            ("/search?q=rust#top",        Ok("/search?q=rust#top")),
            ("//double",                  Ok("//double")),

            ("path",                      Err(ErrorKind::InvalidUrl)),
            ("*",                         Err(ErrorKind::InvalidUrl)),
            ("",                          Err(ErrorKind::InvalidUrl)),
            ("http://example.com/",       Err(ErrorKind::InvalidUrl)),
        ];

        for (url, expected) in cases {
            for method in ["GET", "HEAD"] {
                let value = format!("{method} {url} HTTP/1.1\r\nHost: a\r\n\r\n");

                match (parse(&value), &expected) {
                    (Ok(request), Ok(url)) => assert_eq!(request.url(), url.as_bytes()),
                    (Err(err), Err(expected)) => assert_eq!(&err, expected, "{value:?}"),
                    (result, expected) => panic!("{value:?}: {result:?} != {expected:?}"),
                }
            }
        }
    }

    #[test]
    fn parse_version() {
        #[rustfmt::skip]
        let cases = [
            ("GET / HTTP/1.1\r\n\r\n",  Ok(Version::Http11)),
            ("GET / HTTP/1.0\r\n\r\n",  Ok(Version::Http10)),
            ("GET / HTTP/1.9\r\n\r\n",  Ok(Version::Http11)),
            ("GET / HTTP/1.1\r",        Ok(Version::Http11)),
            ("GET / HTTP/1.1\rX",       Ok(Version::Http11)),

            ("GET / HTTP/2.0\r\n\r\n",  Err(ErrorKind::UnsupportedVersion)),
            ("GET / HTTP/0.9\r\n\r\n",  Err(ErrorKind::UnsupportedVersion)),
            ("GET / http/1.1\r\n\r\n",  Err(ErrorKind::InvalidRequestLine)),
            ("GET / HTTP/1.1\n\n",      Err(ErrorKind::InvalidRequestLine)),
            ("GET / HTTP/1.1",          Err(ErrorKind::InvalidRequestLine)),
            ("GET /\r\n",               Err(ErrorKind::InvalidRequestLine)),
            ("GET HTTP/1.1\r\n",        Err(ErrorKind::InvalidRequestLine)),
            ("GET \r\n",                Err(ErrorKind::InvalidRequestLine)),
            ("HEAD \r",                 Err(ErrorKind::InvalidRequestLine)),
            ("GET / HTTP/1.15\r\n",     Err(ErrorKind::InvalidRequestLine)),
            ("GET / HTTP/1.1 \r\n",     Err(ErrorKind::InvalidRequestLine)),
        ];

        for (value, expected) in cases {
            assert_eq!(parse(value).map(|r| r.version()), expected, "{value:?}");
        }
    }

    #[test]
    fn version_suffix_exactly_fills_line() {
        // Nine bytes before `\r` leaves an empty URL.
        assert_eq!(parse("GET  HTTP/1.1\r\n"), Err(ErrorKind::InvalidUrl));
    }

    #[test]
    fn parse_connection_header() {
        #[rustfmt::skip]
        let cases = [
            ("Connection: Keep-Alive\r\n", Some(b'k')),
            ("Connection: KEEP-ALIVE\r\n", Some(b'k')),
            ("Connection: keep-alive\r\n", Some(b'k')),
            ("Connection: Close\r\n",      Some(b'c')),
            ("Connection: CLOSE\r\n",      Some(b'c')),
            ("Connection: Upgrade\r\n",    Some(b'u')),
            ("Connection: \r\n",           None),

            ("Connection:close\r\n",       None),
            ("Connection close\r\n",       None),
            ("X-Connection: close\r\n",    None),
            ("connection: close\r\n",      None),
            ("CONNECTION: upgrade\r\n",    None),
            ("",                           None),
        ];

        for (header, expected) in cases {
            let value = format!("GET / HTTP/1.1\r\n{header}\r\n");
            let request = parse(&value).unwrap();

            assert_eq!(request.connection(), expected, "{header:?}");
        }
    }

    #[test]
    fn keep_alive_truth_table() {
        #[rustfmt::skip]
        let cases = [
            ("HTTP/1.1", "",                           true),
            ("HTTP/1.1", "Connection: close\r\n",      false),
            ("HTTP/1.1", "Connection: keep-alive\r\n", true),
            ("HTTP/1.1", "Connection: upgrade\r\n",    true),
            ("HTTP/1.1", "connection: close\r\n",      true),
            ("HTTP/1.0", "",                           false),
            ("HTTP/1.0", "Connection: keep-alive\r\n", true),
            ("HTTP/1.0", "Connection: Keep-Alive\r\n", true),
            ("HTTP/1.0", "Connection: close\r\n",      false),
            ("HTTP/1.0", "connection: keep-alive\r\n", false),
        ];

        for (version, header, expected) in cases {
            let value = format!("GET / {version}\r\nHost: localhost\r\n{header}\r\n");

            assert_eq!(parse(&value).unwrap().is_keep_alive(), expected, "{value:?}");
        }
    }

    #[test]
    fn unknown_headers_are_skipped() {
        #[rustfmt::skip]
        let cases = [
            "X-Custom: foo\r\nConnection: close\r\n\r\n",
            "X-Custom: foo\r\nUser-Agent: curl/8.0\r\nConnection: close\r\n\r\n",
            "Connection:broken\r\nConnection: close\r\n\r\n",
            "Host: a\r\nCookie: x=1\r\nReferer: /\r\nConnection: close\r\n\r\n",
            "Range: bytes=0-\r\nIf-Modified-Since: now\r\nConnection: close\r\n",
            "NoColonLine\r\nConnection: close\r\n\r\n",
        ];

        for headers in cases {
            let value = format!("GET /x HTTP/1.1\r\n{headers}");
            let request = parse(&value).unwrap();

            assert_eq!(request.url(), b"/x", "{headers:?}");
            assert_eq!(request.connection(), Some(b'c'), "{headers:?}");
            assert!(!request.is_keep_alive(), "{headers:?}");
        }
    }

    #[test]
    fn headers_end_at_blank_line() {
        let value = "GET / HTTP/1.1\r\nHost: a\r\n\r\nConnection: close\r\n\r\n";
        let mut request = Request::new(value.as_bytes());

        assert_eq!(request.parse_into(), Ok(()));
        assert_eq!(request.connection(), None);
        assert!(request.is_keep_alive());

        let mut request = Request::new(value.as_bytes());
        request.parse_method(0).unwrap();
        let pos = request.parse_path(4).unwrap();
        assert_eq!(pos, 16);
        assert_eq!(request.parse_headers(pos), 25);
    }

    #[test]
    fn headers_without_line_end() {
        let request = parse("GET / HTTP/1.1\r\nX-Long-Header-Without-End").unwrap();
        assert!(request.is_keep_alive());

        let request = parse("GET / HTTP/1.0\r\nConnection: keep-alive").unwrap();
        assert_eq!(request.connection(), None);
        assert!(!request.is_keep_alive());
    }

    #[test]
    fn parse_is_idempotent() {
        let value = b"\r\nHEAD /static/app.js HTTP/1.0\r\nConnection: Keep-Alive\r\nX: y\r\n\r\n";

        let first = Request::parse(value).unwrap();
        let second = Request::parse(value).unwrap();

        assert_eq!(first, second);
        assert_eq!(first.method(), Method::Head);
        assert_eq!(first.url(), b"/static/app.js");
        assert_eq!(first.url_span(), Span::new(7, 21));
        assert_eq!(first.version(), Version::Http10);
        assert!(first.is_keep_alive());
    }

    #[test]
    fn public_parse_maps_status() {
        #[rustfmt::skip]
        let cases = [
            ("",                         StatusCode::BadRequest),
            ("PUT / HTTP/1.1\r\n\r\n",   StatusCode::MethodNotAllowed),
            ("GET / HTTP/2.0\r\n\r\n",   StatusCode::BadRequest),
            ("GET x HTTP/1.1\r\n\r\n",   StatusCode::BadRequest),
            ("GET / HTTP/1.1",           StatusCode::BadRequest),
        ];

        for (value, expected) in cases {
            assert_eq!(Request::parse(value.as_bytes()), Err(expected), "{value:?}");
        }
    }

    #[test]
    fn strip_prefix() {
        let mut request = parse("GET /static/css/site.css HTTP/1.1\r\n\r\n").unwrap();

        request.strip_url_prefix("/static".len());
        assert_eq!(request.url(), b"/css/site.css");
        assert_eq!(request.url_str(), Some("/css/site.css"));

        request.strip_url_prefix(1000);
        assert_eq!(request.url(), b"");
    }

    #[test]
    fn url_str_rejects_invalid_utf8() {
        let request = Request::parse(b"GET /\xff\xfe HTTP/1.1\r\n\r\n").unwrap();

        assert_eq!(request.url(), b"/\xff\xfe");
        assert_eq!(request.url_str(), None);
    }
}
