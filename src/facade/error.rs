//! Error type for facade operations.

use std::error::Error;
use std::fmt;

use crate::client::CallError;
use crate::error::PlumError;
use crate::transport::TransportError;

/// Error type for facade operations.
///
/// A classified failure travels back to the caller inside the response
/// envelope. An unclassified one is treated as a bug: it escapes the envelope
/// and surfaces as a raw transport failure.
#[derive(Debug)]
pub enum HandlerError {
    /// A taxonomy member (not found, validation, forbidden, ...).
    Classified(PlumError),
    /// Anything else.
    Unclassified(Box<dyn Error + Send + Sync>),
}

impl HandlerError {
    /// Wrap an arbitrary error as unclassified.
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn Error + Send + Sync>>,
    {
        HandlerError::Unclassified(err.into())
    }

    /// The classified error, if this is one.
    pub fn classified(&self) -> Option<&PlumError> {
        match self {
            HandlerError::Classified(e) => Some(e),
            HandlerError::Unclassified(_) => None,
        }
    }

    /// Map this error to an HTTP-style status code.
    pub fn status_code(&self) -> u16 {
        match self {
            HandlerError::Classified(e) => e.status(),
            HandlerError::Unclassified(_) => 500,
        }
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::Classified(e) => write!(f, "{}", e),
            HandlerError::Unclassified(e) => write!(f, "unclassified: {}", e),
        }
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HandlerError::Classified(e) => Some(e),
            HandlerError::Unclassified(e) => Some(e.as_ref()),
        }
    }
}

impl From<PlumError> for HandlerError {
    fn from(err: PlumError) -> Self {
        HandlerError::Classified(err)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Unclassified(Box::new(err))
    }
}

impl From<TransportError> for HandlerError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Handler(inner) => HandlerError::Unclassified(inner),
            other => HandlerError::Unclassified(Box::new(other)),
        }
    }
}

/// An outbound call made from inside a facade: a rejection by the remote
/// service stays classified, everything else is unclassified.
impl From<CallError> for HandlerError {
    fn from(err: CallError) -> Self {
        match err {
            CallError::Rejected(e) => HandlerError::Classified(e),
            CallError::Transport(e) => HandlerError::from(e),
            other => HandlerError::Unclassified(Box::new(other)),
        }
    }
}
