use crate::http::{request::Request, response::Response, types::StatusCode};

/// Handles requests for one route.
///
/// The handler carries whatever data it needs as `self`. It fills `response`
/// and returns the status of the response; the header block is built
/// afterwards from both.
///
/// When the request is handed over, the URL has already been stripped of the
/// matched route prefix.
///
/// # Examples
/// ```
/// use lean_web::{Handler, Request, Response, StatusCode};
///
/// struct Greeter {
///     greeting: &'static str,
/// }
///
/// impl Handler for Greeter {
///     fn handle(&self, req: &Request, resp: &mut Response) -> StatusCode {
///         resp.body(self.greeting).body_mut().extend_from_slice(req.url());
///         StatusCode::Ok
///     }
/// }
/// ```
/// Plain functions and closures are handlers too:
/// ```
/// use lean_web::{Handler, Request, Response, StatusCode};
///
/// fn teapot(_: &Request, resp: &mut Response) -> StatusCode {
///     resp.body("short and stout");
///     StatusCode::ImaTeapot
/// }
///
/// fn assert_handler<H: Handler>(_: H) {}
/// assert_handler(teapot);
/// ```
pub trait Handler: Sync + Send + 'static {
    fn handle(&self, request: &Request<'_>, response: &mut Response) -> StatusCode;
}

impl<F> Handler for F
where
    F: Fn(&Request<'_>, &mut Response) -> StatusCode + Sync + Send + 'static,
{
    #[inline(always)]
    fn handle(&self, request: &Request<'_>, response: &mut Response) -> StatusCode {
        self(request, response)
    }
}

/// Result of a successful [`Router::lookup`].
#[derive(Clone, Copy)]
pub struct Route<'a> {
    /// Number of leading URL bytes matched by the route.
    pub prefix_len: usize,
    pub handler: &'a dyn Handler,
}

/// Maps a request path to a [`Route`]. Shared read-only by all workers.
///
/// A lookup that returns `None` is answered with
/// [`404 Not Found`](StatusCode::NotFound).
pub trait Router: Sync + Send + 'static {
    fn lookup(&self, path: &[u8]) -> Option<Route<'_>>;
}

/// Longest-prefix router over a flat list of routes.
///
/// Prefixes are matched byte-wise, so `/api` also matches `/apis`. Register
/// `/api/` to match whole segments only.
///
/// # Examples
/// ```
/// use lean_web::{PrefixRouter, Request, Response, Router, StatusCode};
///
/// let router = PrefixRouter::new()
///     .route("/", |_: &Request, _: &mut Response| StatusCode::Ok)
///     .route("/static/", |_: &Request, _: &mut Response| StatusCode::NoContent);
///
/// assert_eq!(router.lookup(b"/static/app.css").map(|r| r.prefix_len), Some(8));
/// assert_eq!(router.lookup(b"/index.html").map(|r| r.prefix_len), Some(1));
/// assert!(router.lookup(b"index.html").is_none());
/// ```
#[derive(Default)]
pub struct PrefixRouter {
    // Sorted by prefix length, longest first
    routes: Vec<(Box<[u8]>, Box<dyn Handler>)>,
}

impl PrefixRouter {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `handler` for every path starting with `prefix`. For equal
    /// prefixes the first registration wins.
    pub fn route<H: Handler>(mut self, prefix: &str, handler: H) -> Self {
        self.routes
            .push((prefix.as_bytes().into(), Box::new(handler)));
        self.routes.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl Router for PrefixRouter {
    #[inline]
    fn lookup(&self, path: &[u8]) -> Option<Route<'_>> {
        self.routes
            .iter()
            .find(|(prefix, _)| path.starts_with(prefix))
            .map(|(prefix, handler)| Route {
                prefix_len: prefix.len(),
                handler: handler.as_ref(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::*;

    struct Named(&'static str);

    impl Handler for Named {
        fn handle(&self, _: &Request<'_>, resp: &mut Response) -> StatusCode {
            resp.body(self.0);
            StatusCode::Ok
        }
    }

    fn router() -> PrefixRouter {
        PrefixRouter::new()
            .route("/", Named("root"))
            .route("/api/", Named("api"))
            .route("/api/v2/", Named("v2"))
            .route("/api/", Named("shadowed"))
    }

    fn who(router: &PrefixRouter, path: &str) -> Option<(usize, String)> {
        let route = router.lookup(path.as_bytes())?;
        let request = Request::parse(b"GET / HTTP/1.1\r\n\r\n").unwrap();
        let mut response = Response::default();

        assert_eq!(route.handler.handle(&request, &mut response), StatusCode::Ok);
        Some((route.prefix_len, str_op(response.body_bytes()).to_owned()))
    }

    #[test]
    fn longest_prefix() {
        let router = router();

        #[rustfmt::skip]
        let cases = [
            ("/",                Some((1, "root"))),
            ("/index.html",      Some((1, "root"))),
            ("/api",             Some((1, "root"))),
            ("/api/users",       Some((5, "api"))),
            ("/api/v2/users",    Some((8, "v2"))),
            ("/api/v2/",         Some((8, "v2"))),
            ("api/",             None),
            ("",                 None),
        ];

        for (path, expected) in cases {
            assert_eq!(
                who(&router, path),
                expected.map(|(len, name)| (len, name.to_owned())),
                "{path:?}"
            );
        }
    }

    #[test]
    fn empty_router() {
        let router = PrefixRouter::new();

        assert!(router.is_empty());
        assert!(router.lookup(b"/").is_none());
        assert_eq!(self::router().len(), 4);
    }

    #[test]
    fn closure_handler() {
        let router = PrefixRouter::new().route("/len/", |req: &Request<'_>, resp: &mut Response| {
            resp.body(req.url().len().to_string());
            StatusCode::Ok
        });

        let route = router.lookup(b"/len/abc").unwrap();
        let request = Request::parse(b"GET /len/abc HTTP/1.1\r\n\r\n").unwrap();
        let mut response = Response::default();

        route.handler.handle(&request, &mut response);
        assert_eq!(response.body_bytes(), b"8");
    }
}
