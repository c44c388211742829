//! facade: optional-capability objects exposed as pinned endpoints.
//!
//! A facade implements any subset of the operation vocabulary (create,
//! find, findOne, findById, update, updateOne, updateById, remove,
//! removeOne, removeById, clean, count, seed, reset). A
//! [`ServiceEntity`](crate::service::ServiceEntity) probes which ones a facade
//! exposes and registers one endpoint per present operation.
//!
//! ## Quick Start
//!
//! ```ignore
//! use async_trait::async_trait;
//! use microplum::facade::{CallContext, Conditions, Facade, Find, FindById, HandlerError};
//!
//! pub struct WidgetFacade {
//!     ctx: CallContext,
//!     store: WidgetStore,
//! }
//!
//! impl Facade for WidgetFacade {
//!     type Entity = Widget;
//!     microplum::capabilities!(find, find_by_id);
//! }
//!
//! #[async_trait]
//! impl Find<Widget> for WidgetFacade {
//!     async fn find(&self, conditions: Option<Conditions>) -> Result<Vec<Widget>, HandlerError> {
//!         Ok(self.store.query(conditions))
//!     }
//! }
//! ```

mod caller;
mod capability;
mod context;
mod error;
mod operation;

pub use caller::Caller;
pub use capability::{
    Clean, Conditions, Count, Create, Facade, Find, FindById, FindOne, Patch, Remove, RemoveById,
    RemoveOne, Reset, Seed, Update, UpdateById, UpdateOne,
};
pub use context::{Act, ActFn, CallContext, ACT_NOT_SET};
pub use error::HandlerError;
pub use operation::Operation;

/// Generate `Some(self)` capability accessors inside an `impl Facade` block.
///
/// Each name must be one of: `create`, `find`, `find_one`, `find_by_id`,
/// `update`, `update_one`, `update_by_id`, `remove`, `remove_one`,
/// `remove_by_id`, `clean`, `count`, `seed`, `reset`. The facade must
/// implement the matching capability trait.
///
/// # Example
/// ```ignore
/// impl Facade for WidgetFacade {
///     type Entity = Widget;
///     microplum::capabilities!(find, find_by_id, create);
/// }
/// ```
#[macro_export]
macro_rules! capabilities {
    ($($cap:ident),+ $(,)?) => {
        $( $crate::__capability_accessor!($cap); )+
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __capability_accessor {
    (create) => {
        fn as_create(&self) -> Option<&dyn $crate::facade::Create<Self::Entity>> { Some(self) }
    };
    (find) => {
        fn as_find(&self) -> Option<&dyn $crate::facade::Find<Self::Entity>> { Some(self) }
    };
    (find_one) => {
        fn as_find_one(&self) -> Option<&dyn $crate::facade::FindOne<Self::Entity>> { Some(self) }
    };
    (find_by_id) => {
        fn as_find_by_id(&self) -> Option<&dyn $crate::facade::FindById<Self::Entity>> { Some(self) }
    };
    (update) => {
        fn as_update(&self) -> Option<&dyn $crate::facade::Update<Self::Entity>> { Some(self) }
    };
    (update_one) => {
        fn as_update_one(&self) -> Option<&dyn $crate::facade::UpdateOne<Self::Entity>> { Some(self) }
    };
    (update_by_id) => {
        fn as_update_by_id(&self) -> Option<&dyn $crate::facade::UpdateById<Self::Entity>> { Some(self) }
    };
    (remove) => {
        fn as_remove(&self) -> Option<&dyn $crate::facade::Remove<Self::Entity>> { Some(self) }
    };
    (remove_one) => {
        fn as_remove_one(&self) -> Option<&dyn $crate::facade::RemoveOne<Self::Entity>> { Some(self) }
    };
    (remove_by_id) => {
        fn as_remove_by_id(&self) -> Option<&dyn $crate::facade::RemoveById<Self::Entity>> { Some(self) }
    };
    (clean) => {
        fn as_clean(&self) -> Option<&dyn $crate::facade::Clean<Self::Entity>> { Some(self) }
    };
    (count) => {
        fn as_count(&self) -> Option<&dyn $crate::facade::Count> { Some(self) }
    };
    (seed) => {
        fn as_seed(&self) -> Option<&dyn $crate::facade::Seed> { Some(self) }
    };
    (reset) => {
        fn as_reset(&self) -> Option<&dyn $crate::facade::Reset> { Some(self) }
    };
}
