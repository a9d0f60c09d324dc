//!
//! Helpers for building responses inside custom handlers.
//!
//! Every helper sets `content-length`; the JSON and XML helpers also set the
//! matching `content-type` and fail when the value can't be encoded.
//!

use crate::body::Body;
use crate::error::{Error, ErrorKind};
use bytes::Bytes;
use http::header::{HeaderMap, HeaderValue, CONTENT_LENGTH, CONTENT_TYPE};
use http::{Response, StatusCode, Version};
use serde::Serialize;

const APPLICATION_JSON: &str = "application/json";
const APPLICATION_XML: &str = "application/xml";

///
/// Builds a response replaying the given text.
///
/// ## Example
///
/// ```
/// use http::StatusCode;
///
/// let response = intercepto::response::with_string(StatusCode::OK, "hello");
///
/// assert_eq!(StatusCode::OK, response.status());
/// assert_eq!(Some("hello"), response.body().as_str());
/// ```
///
pub fn with_string(status: StatusCode, body: impl Into<String>) -> Response<Body> {
    new_response(status, Body::from_text(body))
}

/// Builds a response replaying the given bytes.
pub fn with_bytes(status: StatusCode, body: impl Into<Bytes>) -> Response<Body> {
    new_response(status, Body::from_bytes(body))
}

///
/// Builds a response carrying `value` encoded as JSON, with the
/// `application/json` content type.
///
pub fn with_json<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Response<Body>, Error> {
    let encoded = serde_json::to_vec(value)
        .map_err(|err| Error::new_with_context(ErrorKind::EncodingFailure, err))?;

    let mut response = with_bytes(status, encoded);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));

    Ok(response)
}

///
/// Builds a response carrying `value` encoded as XML, with the
/// `application/xml` content type. The root element is named after the
/// serialized type.
///
pub fn with_xml<T: Serialize + ?Sized>(status: StatusCode, value: &T) -> Result<Response<Body>, Error> {
    let encoded = quick_xml::se::to_string(value)
        .map_err(|err| Error::new_with_context(ErrorKind::EncodingFailure, err))?;

    let mut response = with_string(status, encoded);
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_XML));

    Ok(response)
}

fn new_response(status: StatusCode, body: Body) -> Response<Body> {
    let mut response = Response::new(body);
    *response.status_mut() = status;
    let length = response.body().len();
    response
        .headers_mut()
        .insert(CONTENT_LENGTH, HeaderValue::from(length));

    response
}

///
/// A response captured once and handed out again for every request, each
/// time with a fresh body cursor.
///
#[derive(Clone, Debug)]
pub(crate) struct CannedResponse {
    status: StatusCode,
    version: Version,
    headers: HeaderMap,
    body: Body,
}

impl CannedResponse {
    pub(crate) fn to_response(&self) -> Response<Body> {
        let mut response = Response::new(self.body.replay());
        *response.status_mut() = self.status;
        *response.version_mut() = self.version;
        *response.headers_mut() = self.headers.clone();

        response
    }
}

impl From<Response<Body>> for CannedResponse {
    fn from(response: Response<Body>) -> Self {
        let (parts, body) = response.into_parts();

        Self {
            status: parts.status,
            version: parts.version,
            headers: parts.headers,
            body,
        }
    }
}
