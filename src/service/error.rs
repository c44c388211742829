//! Error types for binding a service entity.

use thiserror::Error;

use crate::transport::TransportError;

/// Why [`ServiceEntity::bind`](super::ServiceEntity::bind) refused or failed.
#[derive(Debug, Error)]
pub enum BindError {
    /// The entity has no act function to hand its facades.
    #[error("cannot bind `{role}`: 'act' service not set")]
    ActNotSet { role: String },
    /// The entity is already bound (or binding).
    #[error("`{role}` is already bound")]
    AlreadyBound { role: String },
    /// The transport rejected a registration.
    #[error(transparent)]
    Transport(#[from] TransportError),
}
