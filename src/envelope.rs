//! Response envelope: the uniform success/failure wrapper on the wire.
//!
//! ```json
//! { "status": true,  "data": { "id": "w1" } }
//! { "status": false, "error": { "status": 404, "code": "not_found", "message": "entity not found" } }
//! ```
//!
//! Only classified failures are enveloped. An unclassified handler failure
//! leaves [`reply`] as an `Err` and reaches the caller as a raw transport
//! failure.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PlumError;
use crate::facade::HandlerError;
use crate::transport::TransportError;

/// A handler outcome as it crosses the transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(into = "Wire", try_from = "Wire")]
pub enum Envelope {
    Success(Value),
    Failure(PlumError),
}

#[derive(Serialize, Deserialize)]
struct Wire {
    status: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    error: Option<PlumError>,
}

impl From<Envelope> for Wire {
    fn from(envelope: Envelope) -> Self {
        match envelope {
            Envelope::Success(data) => Wire {
                status: true,
                data: Some(data),
                error: None,
            },
            Envelope::Failure(error) => Wire {
                status: false,
                data: None,
                error: Some(error),
            },
        }
    }
}

impl TryFrom<Wire> for Envelope {
    type Error = String;

    fn try_from(wire: Wire) -> Result<Self, Self::Error> {
        match (wire.status, wire.error) {
            (true, _) => Ok(Envelope::Success(wire.data.unwrap_or(Value::Null))),
            (false, Some(error)) => Ok(Envelope::Failure(error)),
            (false, None) => Err("failed envelope without an error".to_string()),
        }
    }
}

impl Envelope {
    /// Successful envelope with no data.
    pub fn empty() -> Self {
        Envelope::Success(Value::Null)
    }

    pub fn into_value(self) -> Value {
        Value::from(self)
    }

    /// Convert into the caller-facing result.
    pub fn into_result(self) -> Result<Value, PlumError> {
        match self {
            Envelope::Success(data) => Ok(data),
            Envelope::Failure(error) => Err(error),
        }
    }

    /// Interpret a raw transport result.
    ///
    /// Values shaped like an envelope (an object with a boolean `status` and
    /// a `data` or `error` key) are unwrapped; a malformed failure envelope
    /// becomes a `server_error`. Anything else is a bare result from an
    /// endpoint that does not envelope and is passed through.
    pub fn unwrap_value(value: Value) -> Result<Value, PlumError> {
        let is_envelope = value.as_object().is_some_and(|obj| {
            obj.get("status").is_some_and(Value::is_boolean)
                && (obj.contains_key("data") || obj.contains_key("error"))
        });
        if !is_envelope {
            return Ok(value);
        }
        match serde_json::from_value::<Envelope>(value) {
            Ok(envelope) => envelope.into_result(),
            Err(e) => Err(PlumError::server_error().with_message(format!("malformed response envelope: {}", e))),
        }
    }
}

impl From<Envelope> for Value {
    fn from(envelope: Envelope) -> Self {
        serde_json::to_value(Wire::from(envelope)).unwrap_or(Value::Null)
    }
}

/// Wrap a handler outcome for the transport.
pub fn reply(outcome: Result<Value, HandlerError>) -> Result<Value, TransportError> {
    match outcome {
        Ok(data) => Ok(Envelope::Success(data).into_value()),
        Err(HandlerError::Classified(error)) => Ok(Envelope::Failure(error).into_value()),
        Err(HandlerError::Unclassified(error)) => Err(TransportError::Handler(error)),
    }
}
