#![warn(missing_docs)]

//!
//! Intercepto replaces the transport of an HTTP client with an in-process
//! fake, so tests can answer outgoing requests with canned or computed
//! responses without any network I/O.
//!
//! # Getting Started
//!
//! Register responders for the routes your code calls, then start the
//! interception. Every request going through a `Client` without a transport of
//! its own is now answered by the registered responders.
//!
//! ## Example
//!
//! ```
//! use http::StatusCode;
//! use intercepto::{Client, Responder};
//!
//! intercepto::register_responder(
//!     "GET",
//!     "https://example.test/hello",
//!     Responder::with_string(StatusCode::OK, "world"),
//! )
//! .unwrap();
//! intercepto::start();
//!
//! let response = Client::new().get("https://example.test/hello").unwrap();
//! assert_eq!(Some("world"), response.body().as_str());
//!
//! intercepto::shutdown();
//! intercepto::reset();
//! ```
//!
//! # Isolated transports
//!
//! The crate-level functions share one process-wide `MockTransport`. Tests
//! running in parallel can each build their own transport and install it on
//! their own client instead:
//!
//! ## Example
//!
//! ```
//! use http::StatusCode;
//! use intercepto::{Activation, Client, MockTransport, Responder};
//! use std::sync::Arc;
//!
//! let mock = Arc::new(MockTransport::new());
//! mock.register("GET", "https://example.test/a", Responder::with_string(StatusCode::OK, "a")).unwrap();
//!
//! let client = Client::new();
//! let activation = Activation::new(mock.clone());
//! activation.activate_client(&client);
//!
//! client.get("https://example.test/a").unwrap();
//! assert_eq!(1, mock.matched_count("GET", "https://example.test/a"));
//! ```
//!
//! # Matching by pattern
//!
//! When the exact URL isn't known in advance, e.g. because of variable query
//! parameters, register a regex responder. Exact routes are always tried first;
//! regex routes are tried in registration order.
//!
//! ## Example
//!
//! ```
//! use http::StatusCode;
//! use intercepto::{Client, MockTransport, Responder};
//! use std::sync::Arc;
//!
//! let mock = Arc::new(MockTransport::new());
//! mock.register_regex("GET", r"^https://example\.test/items/[0-9]+$", Responder::with_string(StatusCode::OK, "item"))
//!     .unwrap();
//!
//! let client = Client::with_transport(mock);
//! assert!(client.get("https://example.test/items/42").is_ok());
//! assert!(client.get("https://example.test/items/abc").is_err());
//! ```
//!
//! # Taking endpoints down
//!
//! A disabled responder stays registered but fails every request routed to it
//! with `ErrorKind::Unavailable`, which tells it apart from an unknown route
//! (`ErrorKind::NoResponder`).
//!
//! ## Example
//!
//! ```
//! use http::StatusCode;
//! use intercepto::{Client, ErrorKind, MockTransport, Responder};
//! use std::sync::Arc;
//!
//! let mock = Arc::new(MockTransport::new());
//! let responder = Responder::with_string(StatusCode::OK, "up");
//! mock.register("GET", "https://example.test/status", responder.clone()).unwrap();
//!
//! let client = Client::with_transport(mock);
//! responder.disable();
//!
//! let err = client.get("https://example.test/status").unwrap_err();
//! assert_eq!(&ErrorKind::Unavailable, err.kind());
//! ```
//!

pub use activation::Activation;
pub use body::Body;
pub use client::Client;
pub use error::{Error, ErrorKind};
pub use mock::{MockTransport, MockTransportOpts};
pub use responder::{Handler, RegexResponder, Responder};
pub use route::RouteKey;
pub use transport::{default_transport, set_default_transport, NoTransport, Transport};

mod activation;
mod body;
mod client;
mod error;
mod mock;
mod responder;
pub mod response;
mod route;
mod stats;
mod transport;

use std::sync::Arc;

///
/// The process-wide `MockTransport` behind the crate-level functions.
///
pub fn default_mock() -> &'static Arc<MockTransport> {
    activation::default_activation().mock()
}

///
/// Installs the process-wide mock as the default transport.
///
pub fn start() {
    activation::default_activation().activate();
}

///
/// Installs the process-wide mock as the transport of `client`.
///
pub fn start_with_client(client: &Client) {
    activation::default_activation().activate_client(client);
}

///
/// Restores the default transport and every client passed to `start_with_client`.
///
pub fn shutdown() {
    activation::default_activation().deactivate();
}

///
/// Removes every route of the process-wide mock and zeroes its counters.
/// Activation is left as it is.
///
pub fn reset() {
    default_mock().reset();
}

///
/// Registers `responder` on the process-wide mock. See `MockTransport::register`.
///
pub fn register_responder(method: &str, url: &str, responder: Responder) -> Result<(), Error> {
    default_mock().register(method, url, responder)
}

///
/// Registers a regex responder on the process-wide mock. See `MockTransport::register_regex`.
///
pub fn register_regex_responder(method: &str, pattern: &str, responder: Responder) -> Result<(), Error> {
    default_mock().register_regex(method, pattern, responder)
}

///
/// Removes an exact route from the process-wide mock.
///
pub fn remove_responder(method: &str, url: &str) -> bool {
    default_mock().remove(method, url)
}

/// Match counter of the process-wide mock.
pub fn matched_count(method: &str, url: &str) -> usize {
    default_mock().matched_count(method, url)
}

/// Mismatch counter of the process-wide mock.
pub fn mismatched_count(method: &str, url: &str) -> usize {
    default_mock().mismatched_count(method, url)
}

/// Grand total of requests dispatched by the process-wide mock.
pub fn total_count() -> usize {
    default_mock().total_count()
}
