//! The classified error taxonomy that crosses the wire.
//!
//! Every domain-expected failure (bad parameters, missing entity, denied
//! access, unimplemented operation, ...) is a [`PlumError`]. It carries an
//! HTTP-style status and a symbolic [`ErrorKind`] code and travels inside the
//! response envelope. Anything else a handler raises is unclassified and is
//! never turned into a `PlumError`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Symbolic kind of a classified failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    ParametersError,
    Unauthorized,
    Forbidden,
    NotFound,
    NotAllowed,
    Timeout,
    /// Older peers spell this code `predondition_error`.
    #[serde(alias = "predondition_error")]
    PreconditionFailed,
    ValidationError,
    /// Fallback kind; unknown codes decode to it.
    #[serde(other)]
    ServerError,
}

impl ErrorKind {
    /// All kinds, in status order.
    pub const ALL: [ErrorKind; 9] = [
        ErrorKind::ParametersError,
        ErrorKind::Unauthorized,
        ErrorKind::Forbidden,
        ErrorKind::NotFound,
        ErrorKind::NotAllowed,
        ErrorKind::Timeout,
        ErrorKind::PreconditionFailed,
        ErrorKind::ValidationError,
        ErrorKind::ServerError,
    ];

    /// HTTP-style status code.
    pub fn status(self) -> u16 {
        match self {
            ErrorKind::ParametersError => 400,
            ErrorKind::Unauthorized => 401,
            ErrorKind::Forbidden => 403,
            ErrorKind::NotFound => 404,
            ErrorKind::NotAllowed => 405,
            ErrorKind::Timeout => 408,
            ErrorKind::PreconditionFailed => 412,
            ErrorKind::ValidationError => 422,
            ErrorKind::ServerError => 500,
        }
    }

    /// Wire code.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::ParametersError => "parameters_error",
            ErrorKind::Unauthorized => "unauthorized",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::NotAllowed => "not_allowed",
            ErrorKind::Timeout => "timeout",
            ErrorKind::PreconditionFailed => "precondition_failed",
            ErrorKind::ValidationError => "validation_error",
            ErrorKind::ServerError => "server_error",
        }
    }

    pub fn default_message(self) -> &'static str {
        match self {
            ErrorKind::ParametersError => "invalid parameters",
            ErrorKind::Unauthorized => "unauthorized access",
            ErrorKind::Forbidden => "access forbidden",
            ErrorKind::NotFound => "entity not found",
            ErrorKind::NotAllowed => "method not allowed",
            ErrorKind::Timeout => "operation timed out",
            ErrorKind::PreconditionFailed => "precondition failed",
            ErrorKind::ValidationError => "field-level validation failure",
            ErrorKind::ServerError => "unexpected server error",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A single field failure inside a `validation_error`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub code: String,
    pub message: String,
}

impl FieldError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }
}

/// A classified failure.
///
/// Serializes as `{status, code, message, fields?, scope?}`. The status is
/// always derived from the kind, so a decoded error never disagrees with its
/// own code.
#[derive(Debug, Clone, PartialEq, thiserror::Error, Serialize, Deserialize)]
#[serde(into = "ErrorBody", from = "ErrorBody")]
#[error("{kind} ({status}): {message}", status = .kind.status())]
pub struct PlumError {
    kind: ErrorKind,
    message: String,
    fields: Option<BTreeMap<String, FieldError>>,
    scope: Option<Value>,
}

impl PlumError {
    /// Create an error of the given kind with a custom message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            fields: None,
            scope: None,
        }
    }

    /// Create an error of the given kind with its default message.
    pub fn of(kind: ErrorKind) -> Self {
        Self::new(kind, kind.default_message())
    }

    pub fn parameters(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ParametersError, message)
    }

    pub fn unauthorized() -> Self {
        Self::of(ErrorKind::Unauthorized)
    }

    pub fn forbidden() -> Self {
        Self::of(ErrorKind::Forbidden)
    }

    pub fn not_found() -> Self {
        Self::of(ErrorKind::NotFound)
    }

    pub fn not_allowed() -> Self {
        Self::of(ErrorKind::NotAllowed)
    }

    pub fn timeout() -> Self {
        Self::of(ErrorKind::Timeout)
    }

    pub fn precondition_failed() -> Self {
        Self::of(ErrorKind::PreconditionFailed)
    }

    pub fn server_error() -> Self {
        Self::of(ErrorKind::ServerError)
    }

    /// A `validation_error` carrying per-field failures.
    pub fn validation<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, FieldError)>,
    {
        let mut err = Self::of(ErrorKind::ValidationError);
        err.fields = Some(fields.into_iter().map(|(k, v)| (k.into(), v)).collect());
        err
    }

    /// Replace the message.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach structured context (e.g. the pin and arguments of a call).
    pub fn with_scope(mut self, scope: Value) -> Self {
        self.scope = Some(scope);
        self
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn status(&self) -> u16 {
        self.kind.status()
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn fields(&self) -> Option<&BTreeMap<String, FieldError>> {
        self.fields.as_ref()
    }

    pub fn scope(&self) -> Option<&Value> {
        self.scope.as_ref()
    }
}

/// Wire form of [`PlumError`].
#[derive(Serialize, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    status: u16,
    code: ErrorKind,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    fields: Option<BTreeMap<String, FieldError>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scope: Option<Value>,
}

impl From<PlumError> for ErrorBody {
    fn from(err: PlumError) -> Self {
        ErrorBody {
            status: err.kind.status(),
            code: err.kind,
            message: Some(err.message),
            fields: err.fields,
            scope: err.scope,
        }
    }
}

impl From<ErrorBody> for PlumError {
    fn from(body: ErrorBody) -> Self {
        PlumError {
            kind: body.code,
            message: body
                .message
                .unwrap_or_else(|| body.code.default_message().to_string()),
            fields: body.fields,
            scope: body.scope,
        }
    }
}
