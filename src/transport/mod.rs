//! Transport: the pattern-matching message delivery capability.
//!
//! The dispatch core never talks to a broker directly. It registers handlers
//! under pin patterns and dispatches messages (concrete pins) through a
//! [`Transport`]. A transport must route a message to the most specific
//! registered pattern that matches it, falling back to wildcard patterns.
//!
//! ```text
//! ┌────────────────────────────────────────────────────┐
//! │ RpcClient / ServiceEntity                          │
//! │   register(pattern, handler) · dispatch(message)   │
//! └────────────────────────────────────────────────────┘
//!                         │
//!                         ▼
//! ┌────────────────────────────────────────────────────┐
//! │              Transport trait                       │
//! └────────────────────────────────────────────────────┘
//!          │                            │
//!          ▼                            ▼
//! ┌──────────────────┐        ┌──────────────────────┐
//! │InMemoryTransport │        │ AMQP / broker-backed │
//! │   (included)     │        │     (external)       │
//! └──────────────────┘        └──────────────────────┘
//! ```

mod error;
mod in_memory;

use std::future::Future;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::BoxFuture;
use serde_json::Value;

use crate::pin::{Args, Pin};

pub use error::{TransportError, TIMEOUT_SENTINEL};
pub use in_memory::InMemoryTransport;

/// Future returned by a registered handler.
pub type HandlerFuture = BoxFuture<'static, Result<Value, TransportError>>;

/// A registered endpoint: receives the raw call arguments.
pub type Handler = Arc<dyn Fn(Args) -> HandlerFuture + Send + Sync>;

/// Wrap an async closure as a [`Handler`].
pub fn handler<F, Fut>(f: F) -> Handler
where
    F: Fn(Args) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Value, TransportError>> + Send + 'static,
{
    Arc::new(move |args| Box::pin(f(args)))
}

/// Pattern-matching register/dispatch capability.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Register `handler` under `pattern`.
    fn register(&self, pattern: Pin, handler: Handler) -> Result<(), TransportError>;

    /// Deliver `message` to the best matching handler and await its result.
    async fn dispatch(&self, message: Pin) -> Result<Value, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn register(&self, pattern: Pin, handler: Handler) -> Result<(), TransportError> {
        (**self).register(pattern, handler)
    }

    async fn dispatch(&self, message: Pin) -> Result<Value, TransportError> {
        (**self).dispatch(message).await
    }
}
