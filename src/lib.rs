//! microplum: pin-based dispatch and facade binding for message-driven
//! services.
//!
//! Callers address remote operations by an attribute pattern (a [`Pin`])
//! instead of a URL or method name. A facade's optional capabilities are
//! exposed as pinned endpoints by a [`ServiceEntity`], and an [`RpcClient`]
//! decorates, dispatches and unwraps calls over any [`Transport`].

pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod facade;
pub mod logging;
pub mod pin;
pub mod service;
pub mod transport;

pub use client::{CallError, RpcClient};
pub use config::Config;
pub use envelope::Envelope;
pub use error::{ErrorKind, FieldError, PlumError};
pub use facade::{Act, CallContext, Caller, Facade, HandlerError, Operation};
pub use logging::init_tracing;
pub use pin::{Args, Attr, Pin, PinError};
pub use service::{BindError, BindState, ServiceEntity};
pub use transport::{InMemoryTransport, Transport, TransportError};
