use crate::error::{Error, ErrorKind};
use crate::responder::{RegexResponder, Responder};
use bytes::Bytes;
use http::{Method, Request, Uri};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;

///
/// The `(method, URL)` identity of a route.
///
/// The method is upper-cased and defaults to `GET` when empty. URLs are
/// normalized the way `http::Uri` prints them, so `https://example.test` and
/// `https://example.test/` are the same route.
///
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RouteKey {
    method: String,
    url: String,
}

impl RouteKey {
    /// Builds the key of an exact route.
    pub fn new(method: &str, url: &str) -> Self {
        Self {
            method: normalize_method(method),
            url: normalize_url(url),
        }
    }

    // Patterns are kept verbatim: normalizing them would change the expression.
    pub(crate) fn pattern(method: &str, pattern: &str) -> Self {
        Self {
            method: normalize_method(method),
            url: pattern.to_owned(),
        }
    }

    pub(crate) fn from_request(request: &Request<Bytes>) -> Self {
        Self {
            method: normalize_method(request.method().as_str()),
            url: request.uri().to_string(),
        }
    }

    /// The normalized method.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The normalized URL, or the pattern source for regex routes.
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl fmt::Display for RouteKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

fn normalize_method(method: &str) -> String {
    let method = method.trim();
    if method.is_empty() {
        Method::GET.to_string()
    } else {
        method.to_uppercase()
    }
}

fn normalize_url(url: &str) -> String {
    url.parse::<Uri>()
        .map(|uri| uri.to_string())
        .unwrap_or_else(|_| url.to_owned())
}

// `https://example.test/` without the slash `http::Uri` adds to an empty path.
fn bare_authority(url: &str) -> Option<&str> {
    let uri = url.parse::<Uri>().ok()?;
    if uri.authority().is_none() || uri.query().is_some() || uri.path() != "/" {
        return None;
    }

    url.strip_suffix('/')
}

/// The outcome of resolving a route.
#[derive(Debug)]
pub(crate) enum Lookup {
    Found(Responder),
    /// Something is registered for the route, but nothing that is enabled.
    Unavailable,
    Missing,
}

///
/// Exact routes in a map, regex routes in registration order. Each table has
/// its own lock and no lock is held while a responder runs.
///
#[derive(Default)]
pub(crate) struct RouteTable {
    exact: RwLock<HashMap<RouteKey, Responder>>,
    regex: RwLock<Vec<(RouteKey, RegexResponder)>>,
}

impl RouteTable {
    pub(crate) fn register(&self, key: RouteKey, responder: Responder) -> Result<(), Error> {
        let mut exact = self.exact.write();
        if exact.contains_key(&key) {
            return Err(Error::new_with_context(ErrorKind::AlreadyRegistered, key));
        }

        exact.insert(key, responder);
        Ok(())
    }

    pub(crate) fn register_regex(&self, key: RouteKey, responder: RegexResponder) -> Result<(), Error> {
        let mut regex = self.regex.write();
        if regex.iter().any(|(existing, _)| existing == &key) {
            return Err(Error::new_with_context(ErrorKind::AlreadyRegistered, key));
        }

        regex.push((key, responder));
        Ok(())
    }

    pub(crate) fn remove(&self, key: &RouteKey) -> Option<Responder> {
        self.exact.write().remove(key)
    }

    pub(crate) fn remove_regex(&self, key: &RouteKey) -> Option<RegexResponder> {
        let mut regex = self.regex.write();
        let position = regex.iter().position(|(existing, _)| existing == key)?;

        Some(regex.remove(position).1)
    }

    pub(crate) fn clear(&self) {
        let mut exact = self.exact.write();
        let mut regex = self.regex.write();
        exact.clear();
        regex.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.exact.read().len() + self.regex.read().len()
    }

    ///
    /// Exact match first; an exact route that is disabled falls through to the
    /// regex routes, scanned in registration order.
    ///
    pub(crate) fn resolve(&self, key: &RouteKey, match_regex_method: bool) -> Lookup {
        let exact = self.exact.read().get(key).cloned();
        if let Some(ref responder) = exact {
            if responder.is_available() {
                return Lookup::Found(responder.clone());
            }
        }

        match self.resolve_regex(key, match_regex_method) {
            Lookup::Missing if exact.is_some() => Lookup::Unavailable,
            lookup => lookup,
        }
    }

    fn resolve_regex(&self, key: &RouteKey, match_method: bool) -> Lookup {
        let bare = bare_authority(&key.url);
        let candidates: Vec<Responder> = self
            .regex
            .read()
            .iter()
            .filter(|(route, _)| !match_method || route.method == key.method)
            .filter(|(_, responder)| {
                responder.is_matched(&key.url) || bare.map_or(false, |url| responder.is_matched(url))
            })
            .map(|(_, responder)| responder.responder().clone())
            .collect();

        if candidates.is_empty() {
            return Lookup::Missing;
        }

        candidates
            .into_iter()
            .find(Responder::is_available)
            .map_or(Lookup::Unavailable, Lookup::Found)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::StatusCode;

    fn regex(pattern: &str, body: &'static str) -> RegexResponder {
        RegexResponder::new(pattern, Responder::with_string(StatusCode::OK, body)).unwrap()
    }

    fn found_body(lookup: Lookup) -> String {
        match lookup {
            Lookup::Found(responder) => {
                let request = Request::new(Bytes::new());
                let response = responder.handle(&request).unwrap();
                response.body().as_str().unwrap().to_string()
            }
            other => panic!("expected a responder, got {:?}", other),
        }
    }

    #[test]
    fn test_route_key_normalization() {
        assert_eq!(RouteKey::new("get", "https://example.test"), RouteKey::new("GET", "https://example.test/"));
        assert_eq!(RouteKey::new("", "/a"), RouteKey::new("GET", "/a"));
        assert_eq!("POST", RouteKey::new(" post ", "/a").method());
        assert_ne!(RouteKey::new("GET", "/a"), RouteKey::new("POST", "/a"));
    }

    #[test]
    fn test_route_key_keeps_patterns_verbatim() {
        let key = RouteKey::pattern("get", "https://example.test/items/[0-9]+");

        assert_eq!("https://example.test/items/[0-9]+", key.url());
        assert_eq!("GET", key.method());
    }

    #[test]
    fn test_duplicate_exact_route_is_rejected() {
        let table = RouteTable::default();
        let key = RouteKey::new("GET", "/x");

        table.register(key.clone(), Responder::with_string(StatusCode::OK, "a")).unwrap();
        let err = table
            .register(key, Responder::with_string(StatusCode::OK, "b"))
            .unwrap_err();

        assert_eq!(ErrorKind::AlreadyRegistered, err.kind);
        assert_eq!("a", found_body(table.resolve(&RouteKey::new("GET", "/x"), true)));
    }

    #[test]
    fn test_same_url_different_methods() {
        let table = RouteTable::default();

        table.register(RouteKey::new("GET", "/x"), Responder::with_string(StatusCode::OK, "get")).unwrap();
        table.register(RouteKey::new("POST", "/x"), Responder::with_string(StatusCode::OK, "post")).unwrap();

        assert_eq!("get", found_body(table.resolve(&RouteKey::new("GET", "/x"), true)));
        assert_eq!("post", found_body(table.resolve(&RouteKey::new("POST", "/x"), true)));
    }

    #[test]
    fn test_duplicate_regex_route_is_rejected() {
        let table = RouteTable::default();
        let key = RouteKey::pattern("GET", "/items/[0-9]+");

        table.register_regex(key.clone(), regex("/items/[0-9]+", "a")).unwrap();
        let err = table.register_regex(key, regex("/items/[0-9]+", "b")).unwrap_err();

        assert_eq!(ErrorKind::AlreadyRegistered, err.kind);
    }

    #[test]
    fn test_regex_routes_are_scanned_in_registration_order() {
        let table = RouteTable::default();

        table.register_regex(RouteKey::pattern("GET", "/items/4"), regex("/items/4", "first")).unwrap();
        table.register_regex(RouteKey::pattern("GET", "/items/[0-9]+"), regex("/items/[0-9]+", "second")).unwrap();

        assert_eq!("first", found_body(table.resolve(&RouteKey::new("GET", "/items/42"), true)));
        assert_eq!("second", found_body(table.resolve(&RouteKey::new("GET", "/items/7"), true)));
    }

    #[test]
    fn test_disabled_regex_route_is_skipped() {
        let table = RouteTable::default();
        let first = regex("/items/", "first");
        first.disable();

        table.register_regex(RouteKey::pattern("GET", "/items/"), first.clone()).unwrap();
        table.register_regex(RouteKey::pattern("GET", "/items/[0-9]+"), regex("/items/[0-9]+", "second")).unwrap();

        assert_eq!("second", found_body(table.resolve(&RouteKey::new("GET", "/items/42"), true)));
        assert!(matches!(table.resolve(&RouteKey::new("GET", "/items/abc"), true), Lookup::Unavailable));
    }

    #[test]
    fn test_disabled_exact_route_falls_back_to_regex() {
        let table = RouteTable::default();
        let exact = Responder::with_string(StatusCode::OK, "exact");

        table.register(RouteKey::new("GET", "/items/42"), exact.clone()).unwrap();
        table.register_regex(RouteKey::pattern("GET", "/items/[0-9]+"), regex("/items/[0-9]+", "regex")).unwrap();

        assert_eq!("exact", found_body(table.resolve(&RouteKey::new("GET", "/items/42"), true)));
        exact.disable();
        assert_eq!("regex", found_body(table.resolve(&RouteKey::new("GET", "/items/42"), true)));
    }

    #[test]
    fn test_disabled_exact_route_without_fallback_is_unavailable() {
        let table = RouteTable::default();
        let exact = Responder::with_string(StatusCode::OK, "exact");
        exact.disable();

        table.register(RouteKey::new("GET", "/a"), exact).unwrap();

        assert!(matches!(table.resolve(&RouteKey::new("GET", "/a"), true), Lookup::Unavailable));
        assert!(matches!(table.resolve(&RouteKey::new("GET", "/b"), true), Lookup::Missing));
    }

    #[test]
    fn test_regex_method_matching_is_optional() {
        let table = RouteTable::default();

        table.register_regex(RouteKey::pattern("POST", "/add"), regex("/add", "added")).unwrap();

        assert!(matches!(table.resolve(&RouteKey::new("GET", "/add"), true), Lookup::Missing));
        assert_eq!("added", found_body(table.resolve(&RouteKey::new("GET", "/add"), false)));
    }

    #[test]
    fn test_regex_matches_bare_authority() {
        let table = RouteTable::default();

        table
            .register_regex(RouteKey::pattern("GET", r"^https://example\.test$"), regex(r"^https://example\.test$", "root"))
            .unwrap();

        assert_eq!("root", found_body(table.resolve(&RouteKey::new("GET", "https://example.test"), false)));
        assert!(matches!(table.resolve(&RouteKey::new("GET", "https://example.test/a"), false), Lookup::Missing));
        assert!(matches!(table.resolve(&RouteKey::new("GET", "https://example.test/?q=1"), false), Lookup::Missing));
    }

    #[test]
    fn test_remove_and_clear() {
        let table = RouteTable::default();

        table.register(RouteKey::new("GET", "/a"), Responder::with_string(StatusCode::OK, "a")).unwrap();
        table.register_regex(RouteKey::pattern("GET", "/b.*"), regex("/b.*", "b")).unwrap();
        assert_eq!(2, table.len());

        assert!(table.remove(&RouteKey::new("GET", "/a")).is_some());
        assert!(table.remove(&RouteKey::new("GET", "/a")).is_none());
        assert!(table.remove_regex(&RouteKey::pattern("GET", "/b.*")).is_some());
        assert_eq!(0, table.len());

        table.register(RouteKey::new("GET", "/a"), Responder::with_string(StatusCode::OK, "a")).unwrap();
        table.clear();
        assert_eq!(0, table.len());
    }
}
