//! Caller side: [`RpcClient`] decorates descriptors into pins, attaches the
//! caller identity, dispatches through a transport, and unwraps the
//! response envelope.
//!
//! ## Quick Start
//!
//! ```ignore
//! use microplum::{Config, InMemoryTransport, RpcClient, ServiceEntity};
//! use serde_json::json;
//!
//! let client = RpcClient::new(InMemoryTransport::new(), Config::default());
//! let widgets = ServiceEntity::new("widget", WidgetFacade::new).with_act(client.act());
//! client.use_service(&widgets)?;
//!
//! let found = client
//!     .call(json!({ "role": "widget", "cmd": "find", "conditions": {} }), None)
//!     .await?;
//! ```

mod error;
mod rpc_client;

pub use error::CallError;
pub use rpc_client::RpcClient;

// HTTP gateway (requires "http" feature)
#[cfg(feature = "http")]
mod http;
#[cfg(feature = "http")]
pub use http::{router, serve};
