use std::error::Error as ErrorTrait;
use std::fmt::Display;

///
/// Contains information about an error occurence
///
#[derive(Debug)]
pub struct Error {
    /// The type of this error
    pub kind: ErrorKind,
    /// Some errors come with more context
    pub context: Option<String>,
}

impl Error {
    pub(crate) fn new_with_context(kind: ErrorKind, context: impl Display) -> Error {
        Error {
            kind,
            context: Some(context.to_string()),
        }
    }

    ///
    /// Builds an error for a custom handler that wants to fail a request
    /// instead of answering it.
    ///
    pub fn handler(context: impl Display) -> Error {
        Self::new_with_context(ErrorKind::HandlerFailure, context)
    }

    /// The type of this error
    pub fn kind(&self) -> &ErrorKind {
        &self.kind
    }

    /// True when no responder, exact or regex, was registered for the request.
    pub fn is_no_responder(&self) -> bool {
        matches!(self.kind, ErrorKind::NoResponder)
    }

    /// True when a responder exists for the request but is disabled.
    pub fn is_unavailable(&self) -> bool {
        matches!(self.kind, ErrorKind::Unavailable)
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} (context: {})",
            self.kind.description(),
            self.context.as_deref().unwrap_or("none")
        )
    }
}

impl ErrorTrait for Error {}

///
/// The type of an error
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A responder is already registered under the same method and URL
    AlreadyRegistered,
    /// The regular expression of a regex responder does not compile
    InvalidPattern,
    /// No responder matched the request
    NoResponder,
    /// A responder matched the request but is disabled
    Unavailable,
    /// The response payload could not be encoded
    EncodingFailure,
    /// File not found
    FileNotFound,
    /// The outgoing request could not be built
    InvalidRequest,
    /// No transport is installed
    NoTransport,
    /// A custom handler refused to answer
    HandlerFailure,
}

impl ErrorKind {
    fn description(&self) -> &'static str {
        match self {
            ErrorKind::AlreadyRegistered => "responder already exists",
            ErrorKind::InvalidPattern => "invalid url pattern",
            ErrorKind::NoResponder => "routing failed, no responders were found for url",
            ErrorKind::Unavailable => "url is not available",
            ErrorKind::EncodingFailure => "failed to encode the response body",
            ErrorKind::FileNotFound => "file not found",
            ErrorKind::InvalidRequest => "invalid request",
            ErrorKind::NoTransport => "no transport installed",
            ErrorKind::HandlerFailure => "the responder failed to answer",
        }
    }
}
