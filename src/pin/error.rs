//! Errors raised while decoding pins.

/// A pin could not be decoded from its wire or string form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PinError {
    /// The attribute mapping has no `role`.
    #[error("pin is missing the `role` attribute")]
    MissingRole,
    /// The attribute mapping has no `cmd`.
    #[error("pin is missing the `cmd` attribute")]
    MissingCmd,
    /// A `key:value` segment of a pattern string could not be split.
    #[error("malformed pin segment: {0:?}")]
    Malformed(String),
    /// The JSON value was not an object.
    #[error("pin must be a JSON object, got {0}")]
    NotAnObject(String),
}
