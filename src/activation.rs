use crate::client::Client;
use crate::mock::MockTransport;
use crate::transport::{self, same_transport, Transport};
use lazy_static::lazy_static;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

lazy_static! {
    static ref DEFAULT_ACTIVATION: Activation = Activation::new(Arc::new(MockTransport::new()));
}

/// The activation behind the crate-level `start`/`shutdown` functions.
pub(crate) fn default_activation() -> &'static Activation {
    &DEFAULT_ACTIVATION
}

struct TrackedClient {
    client: Client,
    prior: Option<Arc<dyn Transport>>,
}

#[derive(Default)]
struct ActivationState {
    original: Option<Arc<dyn Transport>>,
    clients: HashMap<u64, TrackedClient>,
}

///
/// Installs a `MockTransport` in place of the process-wide default transport
/// and/or the transport of individual clients, and puts the previous
/// transports back on `deactivate`.
///
/// Activating twice never records the mock as the transport to restore.
/// Dropping an `Activation` deactivates it.
///
/// ## Example
///
/// ```
/// use http::StatusCode;
/// use intercepto::{Activation, Client, MockTransport, Responder};
/// use std::sync::Arc;
///
/// let mock = Arc::new(MockTransport::new());
/// mock.register("GET", "https://example.test/a", Responder::with_string(StatusCode::OK, "hello")).unwrap();
///
/// let client = Client::new();
/// let activation = Activation::new(mock);
/// activation.activate_client(&client);
///
/// assert!(client.get("https://example.test/a").is_ok());
///
/// activation.deactivate();
/// assert!(client.transport().is_none());
/// ```
///
pub struct Activation {
    mock: Arc<MockTransport>,
    state: Mutex<ActivationState>,
}

impl Activation {
    /// Wraps `mock`; nothing is installed until `activate` or `activate_client`.
    pub fn new(mock: Arc<MockTransport>) -> Self {
        Self {
            mock,
            state: Mutex::new(ActivationState::default()),
        }
    }

    /// The mock transport being installed.
    pub fn mock(&self) -> &Arc<MockTransport> {
        &self.mock
    }

    fn transport(&self) -> Arc<dyn Transport> {
        self.mock.clone()
    }

    ///
    /// Installs the mock as the process-wide default transport.
    ///
    pub fn activate(&self) {
        let mock = self.transport();
        let mut state = self.state.lock();
        let previous = transport::set_default_transport(mock.clone());
        if !same_transport(&previous, &mock) {
            state.original = Some(previous);
        }
        log::debug!("mock transport installed as the default transport");
    }

    ///
    /// Installs the mock as the transport of `client`. The client's previous
    /// transport is recorded the first time the client is activated.
    ///
    pub fn activate_client(&self, client: &Client) {
        let mock = self.transport();
        let mut state = self.state.lock();
        let previous = client.set_transport(Some(mock.clone()));
        state.clients.entry(client.id()).or_insert_with(|| TrackedClient {
            client: client.clone(),
            prior: previous.filter(|prior| !same_transport(prior, &mock)),
        });
        log::debug!("mock transport installed on client {}", client.id());
    }

    ///
    /// Restores the default transport and the transports of all the activated
    /// clients. Does nothing when nothing was activated.
    ///
    pub fn deactivate(&self) {
        let mut state = self.state.lock();
        if let Some(original) = state.original.take() {
            transport::set_default_transport(original);
            log::debug!("default transport restored");
        }

        for (id, tracked) in state.clients.drain() {
            tracked.client.set_transport(tracked.prior);
            log::debug!("transport of client {} restored", id);
        }
    }

    /// Whether the mock is currently the process-wide default transport.
    pub fn is_active(&self) -> bool {
        same_transport(&transport::default_transport(), &self.transport())
    }

    /// How many clients are waiting to be restored.
    pub fn tracked_clients(&self) -> usize {
        self.state.lock().clients.len()
    }
}

impl Drop for Activation {
    fn drop(&mut self) {
        self.deactivate();
    }
}

impl fmt::Debug for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Activation")
            .field("active", &self.is_active())
            .field("tracked_clients", &self.tracked_clients())
            .finish()
    }
}
