use crate::body::Body;
use crate::error::{Error, ErrorKind};
use crate::response::{self, CannedResponse};
use bytes::Bytes;
use http::{Request, Response, StatusCode};
use parking_lot::Mutex;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

/// The function a responder runs for every request routed to it.
pub type Handler = dyn Fn(&Request<Bytes>) -> Result<Response<Body>, Error> + Send + Sync + 'static;

///
/// Answers the requests routed to it, as long as it's enabled.
///
/// A `Responder` is a cheap handle: clones share the handler and the
/// availability flag. Keep a clone around after registering it in order to
/// take the endpoint down with `disable()` and bring it back with `enable()`.
///
/// ## Example
///
/// ```
/// use http::StatusCode;
/// use intercepto::{MockTransport, Responder};
///
/// let mock = MockTransport::new();
/// let responder = Responder::with_string(StatusCode::OK, "hello");
/// mock.register("GET", "https://example.test/a", responder.clone()).unwrap();
///
/// responder.disable();
/// assert!(!responder.is_available());
/// ```
///
#[derive(Clone)]
pub struct Responder {
    handler: Arc<Handler>,
    available: Arc<Mutex<bool>>,
}

impl Responder {
    ///
    /// Responds with the given status and text body.
    ///
    pub fn with_string(status: StatusCode, body: impl Into<String>) -> Self {
        Self::from_response(response::with_string(status, body))
    }

    ///
    /// Responds with the given status and binary body.
    ///
    pub fn with_bytes(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self::from_response(response::with_bytes(status, body))
    }

    ///
    /// Responds with `value` encoded as JSON. The value is encoded once, here,
    /// and an encoding failure is returned instead of a responder.
    ///
    /// ## Example
    ///
    /// ```
    /// use http::StatusCode;
    /// use intercepto::Responder;
    ///
    /// let responder = Responder::with_json(StatusCode::OK, &vec!["a", "b"]).unwrap();
    /// ```
    ///
    pub fn with_json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Self, Error> {
        response::with_json(status, value).map(Self::from_response)
    }

    ///
    /// Responds with `value` encoded as XML. The value is encoded once, here,
    /// and an encoding failure is returned instead of a responder.
    ///
    pub fn with_xml<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Self, Error> {
        response::with_xml(status, value).map(Self::from_response)
    }

    ///
    /// Responds with the contents of the file stored under `path`, read once.
    ///
    pub fn with_file(status: StatusCode, path: impl AsRef<Path>) -> Result<Self, Error> {
        let path = path.as_ref();
        let content = std::fs::read(path)
            .map_err(|_| Error::new_with_context(ErrorKind::FileNotFound, path.display()))?;

        Ok(Self::with_bytes(status, content))
    }

    ///
    /// Replays a pre-built response. Every request gets its own copy, with a
    /// body cursor starting at the first byte.
    ///
    pub fn from_response(response: Response<Body>) -> Self {
        let canned = CannedResponse::from(response);

        Self::from_handler(move |_| Ok(canned.to_response()))
    }

    ///
    /// Runs `handler` for every request. Use `move` closures and `Arc` to
    /// share state between requests, e.g. for an in-memory fake of a remote
    /// resource collection.
    ///
    /// ## Example
    ///
    /// ```
    /// use http::StatusCode;
    /// use intercepto::{response, Responder};
    ///
    /// let responder = Responder::from_handler(|request| {
    ///     Ok(response::with_string(StatusCode::OK, request.uri().path()))
    /// });
    /// ```
    ///
    pub fn from_handler(
        handler: impl Fn(&Request<Bytes>) -> Result<Response<Body>, Error> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
            available: Arc::new(Mutex::new(true)),
        }
    }

    /// Produces the response for `request`. Handler errors come back as they are.
    pub fn handle(&self, request: &Request<Bytes>) -> Result<Response<Body>, Error> {
        (self.handler)(request)
    }

    /// Makes the responder answer requests again.
    pub fn enable(&self) {
        *self.available.lock() = true;
    }

    /// Keeps the responder registered but refuses every request routed to it.
    pub fn disable(&self) {
        *self.available.lock() = false;
    }

    /// Whether the responder currently answers requests.
    pub fn is_available(&self) -> bool {
        *self.available.lock()
    }
}

impl fmt::Debug for Responder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Responder")
            .field("handler", &"<callback>")
            .field("available", &self.is_available())
            .finish()
    }
}

///
/// A responder matched by a regular expression over the request URL rather
/// than by the exact URL.
///
/// The expression is searched anywhere in the URL; anchor it with `^` and `$`
/// to match the whole URL. Request URLs are normalized by `http::Uri`, which
/// appends `/` to a bare authority; a request to `https://example.test` is
/// tried both as `https://example.test/` and as `https://example.test`.
///
/// Dereferences to the wrapped `Responder`.
///
#[derive(Clone, Debug)]
pub struct RegexResponder {
    responder: Responder,
    pattern: String,
    matcher: Regex,
}

impl RegexResponder {
    ///
    /// Compiles `pattern` once and binds it to `responder`.
    ///
    pub fn new(pattern: &str, responder: Responder) -> Result<Self, Error> {
        let matcher = Regex::new(pattern)
            .map_err(|err| Error::new_with_context(ErrorKind::InvalidPattern, err))?;

        Ok(Self {
            responder,
            pattern: pattern.to_owned(),
            matcher,
        })
    }

    /// Whether `url` matches the pattern. Availability is not considered.
    pub fn is_matched(&self, url: &str) -> bool {
        self.matcher.is_match(url)
    }

    /// The pattern source, as registered.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// The wrapped responder.
    pub fn responder(&self) -> &Responder {
        &self.responder
    }
}

impl Deref for RegexResponder {
    type Target = Responder;

    fn deref(&self) -> &Self::Target {
        &self.responder
    }
}
