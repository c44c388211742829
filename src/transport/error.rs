//! Transport-level failures.

use std::error::Error;

/// Detail message a transport attaches to a failure caused by its own
/// dispatch timer.
pub const TIMEOUT_SENTINEL: &str = "[TIMEOUT]";

/// A failure raised by the transport rather than by a handler's domain logic.
///
/// Unclassified handler failures travel as [`TransportError::Handler`] with the
/// original error boxed inside, so callers can downcast to it.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// No registered pattern matches the message.
    #[error("no handler registered for pattern {pattern}")]
    NoMatch { pattern: String },
    /// A pattern claiming the same slot is already registered.
    #[error("pattern {pattern} is already registered")]
    Conflict { pattern: String },
    /// The transport itself failed (broker error, timeout, ...).
    #[error("transport failure: {message}")]
    Failed {
        message: String,
        detail: Option<String>,
    },
    /// The handler raised an unclassified error.
    #[error("handler failed: {0}")]
    Handler(#[source] Box<dyn Error + Send + Sync>),
}

impl TransportError {
    /// A failure with a detail message.
    pub fn failed(message: impl Into<String>, detail: impl Into<String>) -> Self {
        TransportError::Failed {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }

    /// A dispatch timeout as the transport reports it.
    pub fn timed_out(message: impl Into<String>) -> Self {
        Self::failed(message, TIMEOUT_SENTINEL)
    }

    /// Whether this failure carries the timeout sentinel.
    pub fn is_timeout(&self) -> bool {
        matches!(self, TransportError::Failed { detail: Some(d), .. } if d == TIMEOUT_SENTINEL)
    }

    /// The unclassified handler error, if this is one.
    pub fn handler_error(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        match self {
            TransportError::Handler(e) => Some(e.as_ref()),
            _ => None,
        }
    }
}
