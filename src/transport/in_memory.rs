//! In-process transport for testing and single-process deployments.
//!
//! Implements the full pattern-matching contract: most specific pattern wins,
//! wildcard patterns catch what nothing more specific claims, and an optional
//! dispatch timeout reports the timeout sentinel the way a broker-backed
//! transport would.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde_json::Value;

use super::{Handler, Transport, TransportError};
use crate::config::Config;
use crate::pin::Pin;

struct Registration {
    pattern: Pin,
    handler: Handler,
}

/// In-memory pattern-matching transport.
///
/// Features:
/// - Thread-safe (can be shared across tasks via `Clone`)
/// - Registrations are kept ordered by specificity, so dispatch picks the
///   first match
/// - Conflicting registrations are rejected
///
/// ## Example
///
/// ```
/// use microplum::pin::Pin;
/// use microplum::transport::{handler, InMemoryTransport, Transport};
/// use serde_json::json;
///
/// # tokio_test_block(async {
/// let transport = InMemoryTransport::new();
/// transport
///     .register(Pin::new("math", "sum"), handler(|args| async move {
///         let a = args["a"].as_i64().unwrap_or(0);
///         let b = args["b"].as_i64().unwrap_or(0);
///         Ok(json!(a + b))
///     }))
///     .unwrap();
///
/// let sum = transport
///     .dispatch(Pin::new("math", "sum").with("a", 1_i64).with("b", 2_i64))
///     .await
///     .unwrap();
/// assert_eq!(sum, json!(3));
/// # });
/// # fn tokio_test_block<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(f)
/// # }
/// ```
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    registrations: Arc<RwLock<Vec<Registration>>>,
    timeout: Option<Duration>,
}

impl InMemoryTransport {
    /// Create a transport without a dispatch timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transport that fails dispatches running longer than `timeout`.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            registrations: Arc::default(),
            timeout: Some(timeout),
        }
    }

    /// Create a transport that enforces the configured dispatch timeout.
    pub fn from_config(config: &Config) -> Self {
        Self::with_timeout(config.timeout())
    }

    /// The pattern that would handle `message`, if any.
    pub fn resolve(&self, message: &Pin) -> Option<Pin> {
        self.registrations
            .read()
            .iter()
            .find(|r| r.pattern.matches(message))
            .map(|r| r.pattern.clone())
    }

    /// Canonical keys of all registered patterns, most specific first.
    pub fn patterns(&self) -> Vec<String> {
        self.registrations
            .read()
            .iter()
            .map(|r| r.pattern.to_pattern_key())
            .collect()
    }

    /// Whether a pattern with the same keys and values is registered.
    pub fn is_registered(&self, pattern: &Pin) -> bool {
        self.registrations
            .read()
            .iter()
            .any(|r| r.pattern.conflicts_with(pattern))
    }

    pub fn len(&self) -> usize {
        self.registrations.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.read().is_empty()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    fn register(&self, pattern: Pin, handler: Handler) -> Result<(), TransportError> {
        let mut registrations = self.registrations.write();
        if registrations.iter().any(|r| r.pattern.conflicts_with(&pattern)) {
            return Err(TransportError::Conflict {
                pattern: pattern.to_pattern_key(),
            });
        }

        let precedence = pattern.precedence();
        let index = registrations.partition_point(|r| r.pattern.precedence() <= precedence);
        tracing::debug!(pattern = %pattern, "registered endpoint");
        registrations.insert(index, Registration { pattern, handler });
        Ok(())
    }

    async fn dispatch(&self, message: Pin) -> Result<Value, TransportError> {
        let handler = {
            let registrations = self.registrations.read();
            registrations
                .iter()
                .find(|r| r.pattern.matches(&message))
                .map(|r| Arc::clone(&r.handler))
        };
        let handler = handler.ok_or_else(|| TransportError::NoMatch {
            pattern: message.to_pattern_key(),
        })?;

        let pending = handler(message.to_args());
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, pending).await.map_err(|_| {
                TransportError::timed_out(format!(
                    "act timed out after {}ms: {}",
                    limit.as_millis(),
                    message
                ))
            })?,
            None => pending.await,
        }
    }
}
