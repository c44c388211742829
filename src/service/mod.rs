//! Service entity: binds a facade's capabilities to pins on a transport.
//!
//! A `ServiceEntity<F>` owns a facade constructor. At bind time it builds a
//! probe facade, registers one endpoint per capability the probe exposes,
//! and always registers a role-wide catch-all. Each inbound call gets a
//! fresh facade built from that call's [`CallContext`](crate::facade::CallContext).
//!
//! ## Quick Start
//!
//! ```ignore
//! use microplum::{InMemoryTransport, ServiceEntity};
//!
//! let transport = InMemoryTransport::new();
//! let widgets = ServiceEntity::new("widget", |ctx| WidgetFacade::new(ctx, store.clone()))
//!     .with_act(client.act());
//!
//! let pins = widgets.bind(&transport)?;
//! ```

mod error;
mod service_entity;

pub use error::BindError;
pub use service_entity::{BindState, ServiceEntity, SERVICE_NOT_FOUND};
