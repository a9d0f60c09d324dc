use crate::body::Body;
use crate::error::{Error, ErrorKind};
use crate::transport::{self, Transport};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http::{Method, Request, Response};
use parking_lot::RwLock;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(1);

struct ClientInner {
    id: u64,
    transport: RwLock<Option<Arc<dyn Transport>>>,
}

///
/// An HTTP client handle. Requests go through the client's own transport
/// when it has one, through the process-wide default transport otherwise.
///
/// Clones share the same transport slot and identity.
///
/// ## Example
///
/// ```
/// use http::StatusCode;
/// use intercepto::{Client, MockTransport, Responder};
/// use std::sync::Arc;
///
/// let mock = Arc::new(MockTransport::new());
/// mock.register("GET", "https://example.test/a", Responder::with_string(StatusCode::OK, "hello")).unwrap();
///
/// let client = Client::with_transport(mock);
/// let response = client.get("https://example.test/a").unwrap();
///
/// assert_eq!(Some("hello"), response.body().as_str());
/// ```
///
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// A client using the process-wide default transport.
    pub fn new() -> Self {
        Self::from_slot(None)
    }

    /// A client with its own transport.
    pub fn with_transport(transport: Arc<dyn Transport>) -> Self {
        Self::from_slot(Some(transport))
    }

    fn from_slot(transport: Option<Arc<dyn Transport>>) -> Self {
        Self {
            inner: Arc::new(ClientInner {
                id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
                transport: RwLock::new(transport),
            }),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.inner.id
    }

    /// The client's own transport, if any.
    pub fn transport(&self) -> Option<Arc<dyn Transport>> {
        self.inner.transport.read().clone()
    }

    /// Replaces the client's own transport and returns the previous one.
    pub fn set_transport(&self, transport: Option<Arc<dyn Transport>>) -> Option<Arc<dyn Transport>> {
        std::mem::replace(&mut *self.inner.transport.write(), transport)
    }

    /// Sends `request` through the effective transport.
    pub fn execute(&self, request: Request<Bytes>) -> Result<Response<Body>, Error> {
        let transport = self.transport().unwrap_or_else(transport::default_transport);
        transport.round_trip(request)
    }

    /// Sends a `GET` request to `url`.
    pub fn get(&self, url: &str) -> Result<Response<Body>, Error> {
        let request = Request::builder()
            .method(Method::GET)
            .uri(url)
            .body(Bytes::new())
            .map_err(|err| Error::new_with_context(ErrorKind::InvalidRequest, err))?;

        self.execute(request)
    }

    /// Sends a `POST` request to `url` with the given content type and body.
    pub fn post(&self, url: &str, content_type: &str, body: impl Into<Bytes>) -> Result<Response<Body>, Error> {
        let request = Request::builder()
            .method(Method::POST)
            .uri(url)
            .header(CONTENT_TYPE, content_type)
            .body(body.into())
            .map_err(|err| Error::new_with_context(ErrorKind::InvalidRequest, err))?;

        self.execute(request)
    }
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("id", &self.inner.id)
            .field("own_transport", &self.inner.transport.read().is_some())
            .finish()
    }
}
