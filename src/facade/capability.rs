//! Capability traits: one per facade operation.
//!
//! A facade opts into an operation by implementing its trait and returning
//! itself from the matching accessor on [`Facade`]. Accessors default to
//! `None`, so an operation a facade does not expose simply has no endpoint.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::HandlerError;

/// Query conditions (`{"color": "red"}`); `None` means "all".
pub type Conditions = Map<String, Value>;

/// Partial update applied by the update operations.
pub type Patch = Map<String, Value>;

#[async_trait]
pub trait Create<E: Send + 'static>: Send + Sync {
    async fn create(&self, input: E) -> Result<E, HandlerError>;
}

#[async_trait]
pub trait Find<E: Send + 'static>: Send + Sync {
    async fn find(&self, conditions: Option<Conditions>) -> Result<Vec<E>, HandlerError>;
}

#[async_trait]
pub trait FindOne<E: Send + 'static>: Send + Sync {
    async fn find_one(&self, conditions: Option<Conditions>) -> Result<Option<E>, HandlerError>;
}

#[async_trait]
pub trait FindById<E: Send + 'static>: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<E>, HandlerError>;
}

/// Bulk update of every entity matching `conditions`.
#[async_trait]
pub trait Update<E: Send + 'static>: Send + Sync {
    async fn update(&self, conditions: Option<Conditions>, patch: Patch) -> Result<Vec<E>, HandlerError>;
}

#[async_trait]
pub trait UpdateOne<E: Send + 'static>: Send + Sync {
    async fn update_one(
        &self,
        conditions: Option<Conditions>,
        patch: Patch,
    ) -> Result<Option<E>, HandlerError>;
}

#[async_trait]
pub trait UpdateById<E: Send + 'static>: Send + Sync {
    async fn update_by_id(&self, id: &str, patch: Patch) -> Result<Option<E>, HandlerError>;
}

/// Bulk removal of every entity matching `conditions`.
#[async_trait]
pub trait Remove<E: Send + 'static>: Send + Sync {
    async fn remove(&self, conditions: Option<Conditions>) -> Result<Vec<E>, HandlerError>;
}

#[async_trait]
pub trait RemoveOne<E: Send + 'static>: Send + Sync {
    async fn remove_one(&self, conditions: Option<Conditions>) -> Result<Option<E>, HandlerError>;
}

#[async_trait]
pub trait RemoveById<E: Send + 'static>: Send + Sync {
    async fn remove_by_id(&self, id: &str) -> Result<Option<E>, HandlerError>;
}

/// Remove everything (optionally restricted by `conditions`), returning what
/// was removed.
#[async_trait]
pub trait Clean<E: Send + 'static>: Send + Sync {
    async fn clean(&self, conditions: Option<Conditions>) -> Result<Vec<E>, HandlerError>;
}

#[async_trait]
pub trait Count: Send + Sync {
    async fn count(&self, conditions: Option<Conditions>) -> Result<u64, HandlerError>;
}

#[async_trait]
pub trait Seed: Send + Sync {
    async fn seed(&self) -> Result<(), HandlerError>;
}

/// Wipe the store, re-seeding it when `seed` is set.
#[async_trait]
pub trait Reset: Send + Sync {
    async fn reset(&self, seed: bool) -> Result<(), HandlerError>;
}

/// An object exposing a subset of the operation vocabulary.
///
/// Presence is decided per instance: an accessor may consult the instance's
/// call context and return `None` (e.g. no `remove_by_id` for anonymous
/// callers). Use [`capabilities!`](crate::capabilities) to generate the
/// `Some(self)` accessors.
pub trait Facade: Send + Sync + 'static {
    /// The entity type the CRUD operations exchange.
    type Entity: Serialize + DeserializeOwned + Send + Sync + 'static;

    fn as_create(&self) -> Option<&dyn Create<Self::Entity>> {
        None
    }

    fn as_find(&self) -> Option<&dyn Find<Self::Entity>> {
        None
    }

    fn as_find_one(&self) -> Option<&dyn FindOne<Self::Entity>> {
        None
    }

    fn as_find_by_id(&self) -> Option<&dyn FindById<Self::Entity>> {
        None
    }

    fn as_update(&self) -> Option<&dyn Update<Self::Entity>> {
        None
    }

    fn as_update_one(&self) -> Option<&dyn UpdateOne<Self::Entity>> {
        None
    }

    fn as_update_by_id(&self) -> Option<&dyn UpdateById<Self::Entity>> {
        None
    }

    fn as_remove(&self) -> Option<&dyn Remove<Self::Entity>> {
        None
    }

    fn as_remove_one(&self) -> Option<&dyn RemoveOne<Self::Entity>> {
        None
    }

    fn as_remove_by_id(&self) -> Option<&dyn RemoveById<Self::Entity>> {
        None
    }

    fn as_clean(&self) -> Option<&dyn Clean<Self::Entity>> {
        None
    }

    fn as_count(&self) -> Option<&dyn Count> {
        None
    }

    fn as_seed(&self) -> Option<&dyn Seed> {
        None
    }

    fn as_reset(&self) -> Option<&dyn Reset> {
        None
    }
}
