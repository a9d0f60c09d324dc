use crate::body::Body;
use crate::error::{Error, ErrorKind};
use bytes::Bytes;
use http::{Request, Response};
use lazy_static::lazy_static;
use parking_lot::RwLock;
use std::sync::Arc;

lazy_static! {
    // The transport used by clients that don't carry their own.
    static ref DEFAULT_TRANSPORT: RwLock<Arc<dyn Transport>> = RwLock::new(Arc::new(NoTransport));
}

///
/// Sends a request and returns its response. `Client` delegates every request
/// to a transport; swapping the transport is how requests get intercepted.
///
pub trait Transport: Send + Sync {
    /// Performs a single request.
    fn round_trip(&self, request: Request<Bytes>) -> Result<Response<Body>, Error>;
}

///
/// The transport installed until the host provides one: refuses every request.
///
#[derive(Clone, Copy, Debug, Default)]
pub struct NoTransport;

impl Transport for NoTransport {
    fn round_trip(&self, request: Request<Bytes>) -> Result<Response<Body>, Error> {
        Err(Error::new_with_context(ErrorKind::NoTransport, request.uri()))
    }
}

///
/// The process-wide default transport.
///
pub fn default_transport() -> Arc<dyn Transport> {
    DEFAULT_TRANSPORT.read().clone()
}

///
/// Installs `transport` as the process-wide default and returns the one it replaced.
///
pub fn set_default_transport(transport: Arc<dyn Transport>) -> Arc<dyn Transport> {
    std::mem::replace(&mut *DEFAULT_TRANSPORT.write(), transport)
}

// Data pointers only.
pub(crate) fn same_transport(a: &Arc<dyn Transport>, b: &Arc<dyn Transport>) -> bool {
    std::ptr::eq(Arc::as_ptr(a) as *const u8, Arc::as_ptr(b) as *const u8)
}
