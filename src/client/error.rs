//! Errors surfaced to callers of [`RpcClient`](super::RpcClient).

use thiserror::Error;

use crate::error::PlumError;
use crate::pin::PinError;
use crate::transport::TransportError;

/// Why an outbound call did not produce a result.
#[derive(Debug, Error)]
pub enum CallError {
    /// The remote service answered with a classified failure, or the
    /// transport timed out.
    #[error(transparent)]
    Rejected(#[from] PlumError),
    /// The transport failed, or the handler raised an unclassified error.
    #[error(transparent)]
    Transport(TransportError),
    /// The call descriptor is not a valid pin.
    #[error("invalid call descriptor: {0}")]
    Descriptor(#[from] PinError),
    /// The result did not have the expected shape.
    #[error("cannot decode result: {0}")]
    Decode(#[source] serde_json::Error),
}

impl CallError {
    /// The classified failure, if the service rejected the call.
    pub fn rejection(&self) -> Option<&PlumError> {
        match self {
            CallError::Rejected(e) => Some(e),
            _ => None,
        }
    }

    pub fn is_timeout(&self) -> bool {
        self.rejection()
            .is_some_and(|e| e.kind() == crate::error::ErrorKind::Timeout)
    }
}

/// Transport timeouts become the classified `timeout` failure; everything
/// else passes through untouched.
impl From<TransportError> for CallError {
    fn from(err: TransportError) -> Self {
        if err.is_timeout() {
            let message = match &err {
                TransportError::Failed { message, .. } => message.clone(),
                _ => err.to_string(),
            };
            return CallError::Rejected(PlumError::timeout().with_message(message));
        }
        CallError::Transport(err)
    }
}
