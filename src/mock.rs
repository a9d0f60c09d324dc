use crate::body::Body;
use crate::error::{Error, ErrorKind};
use crate::responder::{RegexResponder, Responder};
use crate::route::{Lookup, RouteKey, RouteTable};
use crate::stats::Statistics;
use crate::transport::Transport;
use bytes::Bytes;
use http::{Request, Response};
use parking_lot::RwLock;

///
/// Options for a `MockTransport`.
///
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MockTransportOpts {
    /// Whether a regex route only answers requests with its own method.
    /// Off by default: regex routes are looked up by URL alone.
    pub match_regex_method: bool,
}

impl Default for MockTransportOpts {
    fn default() -> Self {
        Self {
            match_regex_method: false,
        }
    }
}

///
/// A transport answering requests from registered responders, without any
/// network I/O.
///
/// Requests are routed by exact `(method, URL)` first. When there's no
/// enabled exact route, the regex routes are scanned in registration order and
/// the first enabled one whose pattern matches the URL answers.
///
/// Every request bumps the grand total and either the match or the mismatch
/// counter of its route. Counters are keyed by the request's own method and
/// URL, also for requests answered by a regex route.
///
/// ## Example
///
/// ```
/// use bytes::Bytes;
/// use http::{Request, StatusCode};
/// use intercepto::{MockTransport, Responder};
///
/// let mock = MockTransport::new();
/// mock.register("GET", "https://example.test/a", Responder::with_string(StatusCode::OK, "hello")).unwrap();
///
/// let request = Request::get("https://example.test/a").body(Bytes::new()).unwrap();
/// let response = mock.dispatch(request).unwrap();
///
/// assert_eq!(StatusCode::OK, response.status());
/// assert_eq!(Some("hello"), response.body().as_str());
/// assert_eq!(1, mock.matched_count("GET", "https://example.test/a"));
/// ```
///
#[derive(Default)]
pub struct MockTransport {
    routes: RouteTable,
    stats: Statistics,
    opts: MockTransportOpts,
    // Shared while a request is routed and counted, exclusive during `reset`.
    gate: RwLock<()>,
}

impl MockTransport {
    /// Creates an empty transport with the default options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty transport with the given options.
    pub fn new_with_opts(opts: MockTransportOpts) -> Self {
        Self {
            opts,
            ..Self::default()
        }
    }

    /// The options this transport was created with.
    pub fn opts(&self) -> &MockTransportOpts {
        &self.opts
    }

    ///
    /// Registers `responder` for the exact `method` and `url`.
    ///
    /// Fails with `ErrorKind::AlreadyRegistered` when the route is taken: a
    /// second registration never shadows the first one.
    ///
    pub fn register(&self, method: &str, url: &str, responder: Responder) -> Result<(), Error> {
        let key = RouteKey::new(method, url);
        self.routes.register(key.clone(), responder)?;
        log::debug!("registered responder for {}", key);

        Ok(())
    }

    ///
    /// Registers `responder` for the requests whose URL matches `pattern`.
    /// The pattern is compiled here: an invalid one fails with
    /// `ErrorKind::InvalidPattern`.
    ///
    /// `method` is part of the route's identity. It only restricts lookup when
    /// `MockTransportOpts::match_regex_method` is set.
    ///
    /// ## Example
    ///
    /// ```
    /// use http::StatusCode;
    /// use intercepto::{MockTransport, Responder};
    ///
    /// let mock = MockTransport::new();
    /// mock.register_regex("GET", "https://example.test/items/[0-9]+", Responder::with_string(StatusCode::OK, "item"))
    ///     .unwrap();
    /// ```
    ///
    pub fn register_regex(&self, method: &str, pattern: &str, responder: Responder) -> Result<(), Error> {
        let key = RouteKey::pattern(method, pattern);
        let regex_responder = RegexResponder::new(pattern, responder)?;
        self.routes.register_regex(key.clone(), regex_responder)?;
        log::debug!("registered regex responder for {}", key);

        Ok(())
    }

    /// Removes the exact route. Returns whether something was removed.
    pub fn remove(&self, method: &str, url: &str) -> bool {
        let key = RouteKey::new(method, url);
        let removed = self.routes.remove(&key).is_some();
        if removed {
            log::debug!("removed responder for {}", key);
        }

        removed
    }

    /// Removes the regex route. Returns whether something was removed.
    pub fn remove_regex(&self, method: &str, pattern: &str) -> bool {
        let key = RouteKey::pattern(method, pattern);
        let removed = self.routes.remove_regex(&key).is_some();
        if removed {
            log::debug!("removed regex responder for {}", key);
        }

        removed
    }

    ///
    /// Answers `request` from the registered responders.
    ///
    /// A handler's own result is returned as it is. Without an enabled
    /// responder the request fails with `ErrorKind::NoResponder` when nothing
    /// is registered for it, or `ErrorKind::Unavailable` when the matching
    /// responders are disabled. Both errors carry the requested URL.
    ///
    pub fn dispatch(&self, request: Request<Bytes>) -> Result<Response<Body>, Error> {
        let key = RouteKey::from_request(&request);
        let lookup = {
            let _gate = self.gate.read();
            self.stats.record_request();
            let lookup = self.routes.resolve(&key, self.opts.match_regex_method);
            match lookup {
                Lookup::Found(_) => self.stats.record_match(&key),
                _ => self.stats.record_mismatch(&key),
            }

            lookup
        };

        match lookup {
            Lookup::Found(responder) => {
                log::trace!("matched {}", key);
                responder.handle(&request)
            }
            Lookup::Unavailable => {
                log::debug!("{} is registered but not available", key);
                Err(Error::new_with_context(ErrorKind::Unavailable, key.url()))
            }
            Lookup::Missing => {
                log::warn!("no responder registered for {}", key);
                Err(Error::new_with_context(ErrorKind::NoResponder, key.url()))
            }
        }
    }

    /// How many requests to `method` and `url` were answered.
    pub fn matched_count(&self, method: &str, url: &str) -> usize {
        self.stats.matched(&RouteKey::new(method, url))
    }

    /// How many requests to `method` and `url` failed to route.
    pub fn mismatched_count(&self, method: &str, url: &str) -> usize {
        self.stats.mismatched(&RouteKey::new(method, url))
    }

    /// How many requests were dispatched, whatever their outcome.
    pub fn total_count(&self) -> usize {
        self.stats.total()
    }

    /// The route of the most recent request that failed to route.
    pub fn last_unmatched(&self) -> Option<RouteKey> {
        self.stats.last_unmatched()
    }

    /// The number of registered routes, exact and regex.
    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    ///
    /// Removes every route and zeroes every counter. Requests being routed
    /// concurrently are counted either before the reset or after it.
    ///
    pub fn reset(&self) {
        let _gate = self.gate.write();
        self.routes.clear();
        self.stats.reset();
        log::debug!("reset mock transport");
    }

    ///
    /// Asserts that exactly `expected` requests to `method` and `url` were answered.
    ///
    #[track_caller]
    pub fn assert_matched(&self, method: &str, url: &str, expected: usize) {
        let key = RouteKey::new(method, url);
        let hits = self.stats.matched(&key);
        if hits == expected {
            return;
        }

        let mut message = format!(
            "\n> Expected {} request(s) to:\n{}\n...but received {}\n\n",
            expected, key, hits
        );
        if let Some(last) = self.last_unmatched() {
            message.push_str(&format!("> The last unmatched request was:\n{}\n", last));
        }

        panic!("{}", message)
    }
}

impl Transport for MockTransport {
    fn round_trip(&self, request: Request<Bytes>) -> Result<Response<Body>, Error> {
        self.dispatch(request)
    }
}
