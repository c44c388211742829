//! The caller-side entry point: decorate, dispatch, unwrap.

use std::future::Future;
use std::sync::{Arc, Weak};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::error::CallError;
use crate::config::Config;
use crate::envelope::{self, Envelope};
use crate::facade::{Act, Caller, Facade, HandlerError};
use crate::pin::{Args, Attr, Pin};
use crate::service::{BindError, ServiceEntity};
use crate::transport::{handler, Handler, Transport, TransportError};

/// Sends calls through a [`Transport`] and hosts service endpoints on it.
///
/// Every pin passing through the client (outbound messages and registered
/// patterns alike) is decorated with the configured `version`,
/// `environment` and, in the `dev` environment, `developer`.
///
/// ```ignore
/// let client = RpcClient::new(InMemoryTransport::new(), Config::default());
/// let widget = client
///     .call(json!({ "role": "widget", "cmd": "find", "id": "w1" }), None)
///     .await?;
/// ```
#[derive(Clone)]
pub struct RpcClient {
    transport: Arc<dyn Transport>,
    config: Arc<Config>,
    listen_pins: Arc<RwLock<Vec<String>>>,
}

impl RpcClient {
    pub fn new(transport: impl Transport + 'static, config: Config) -> Self {
        Self::with_transport(Arc::new(transport), config)
    }

    /// Build a client over an already shared transport.
    pub fn with_transport(transport: Arc<dyn Transport>, config: Config) -> Self {
        Self {
            transport,
            config: Arc::new(config),
            listen_pins: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Stamp the configured contextual attributes onto `pin`.
    pub fn decorate(&self, pin: Pin) -> Pin {
        pin.decorate(
            &self.config.version,
            &self.config.environment,
            self.config.active_developer(),
        )
    }

    /// Call the operation a descriptor (`{role, cmd, ...}`) selects.
    ///
    /// A `user` object inside the descriptor is used as the caller when
    /// `caller` is `None`.
    pub async fn call(&self, descriptor: Value, caller: Option<&Caller>) -> Result<Value, CallError> {
        let pin = Pin::from_value(descriptor)?;
        self.call_pin(pin, caller).await
    }

    /// Typed variant of [`RpcClient::call`].
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        descriptor: Value,
        caller: Option<&Caller>,
    ) -> Result<T, CallError> {
        let value = self.call(descriptor, caller).await?;
        serde_json::from_value(value).map_err(CallError::Decode)
    }

    /// Call `role`/`cmd` with extra arguments. `args` cannot override the
    /// role or command.
    pub async fn send(
        &self,
        role: &str,
        cmd: &str,
        args: Args,
        caller: Option<&Caller>,
    ) -> Result<Value, CallError> {
        let pin = Pin::build(role, cmd, &Args::new(), &args);
        self.call_pin(pin, caller).await
    }

    /// Dispatch an already built pin and unwrap the envelope.
    ///
    /// A dispatch running past the configured timeout is rejected with
    /// `timeout`.
    pub async fn call_pin(&self, pin: Pin, caller: Option<&Caller>) -> Result<Value, CallError> {
        let mut pin = self.decorate(pin);
        self.identify(&mut pin, caller);

        tracing::trace!(pattern = %pin, "call");
        let limit = self.config.timeout();
        let outcome = tokio::time::timeout(limit, self.transport.dispatch(pin.clone()))
            .await
            .unwrap_or_else(|_| {
                Err(TransportError::timed_out(format!(
                    "act timed out after {}ms: {}",
                    limit.as_millis(),
                    pin
                )))
            });
        match &outcome {
            Ok(_) => tracing::trace!(pattern = %pin, "answer"),
            Err(e) => tracing::trace!(pattern = %pin, error = %e, "call failed"),
        }

        let value = outcome?;
        Envelope::unwrap_value(value).map_err(CallError::Rejected)
    }

    fn identify(&self, pin: &mut Pin, caller: Option<&Caller>) {
        let embedded = pin
            .get("user")
            .and_then(Attr::as_value)
            .and_then(|user| serde_json::from_value::<Caller>(user.clone()).ok());

        match caller.cloned().or(embedded) {
            Some(caller) => caller.inject(pin),
            None => {
                if let Some(debug_user) = &self.config.debug_user_id {
                    if pin.get("userId").is_none() {
                        pin.set("userId", debug_user.as_str());
                    }
                }
            }
        }
    }

    /// Register a raw endpoint. The handler's outcome is enveloped.
    ///
    /// Returns the decorated pattern it was registered under.
    pub fn register<F, Fut>(&self, pattern: Pin, f: F) -> Result<Pin, TransportError>
    where
        F: Fn(Args) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerError>> + Send + 'static,
    {
        let pattern = self.decorate(pattern);
        let f = Arc::new(f);
        let endpoint = handler(move |args| {
            let f = Arc::clone(&f);
            async move { envelope::reply(f(args).await) }
        });
        self.transport.register(pattern.clone(), endpoint)?;
        tracing::debug!(pattern = %pattern, "registered endpoint");
        Ok(pattern)
    }

    /// Bind `entity` through this client and listen on its public pin.
    ///
    /// The entity needs an act function first; [`RpcClient::act`] is the
    /// usual choice. Returns the decorated patterns.
    pub fn use_service<F: Facade>(&self, entity: &ServiceEntity<F>) -> Result<Vec<Pin>, BindError> {
        let pins = entity.bind(self)?;
        let listen = self.decorate(entity.public_pin()).to_pattern_key();
        tracing::debug!(pattern = %listen, "listening");
        self.listen_pins.write().push(listen);
        Ok(pins.into_iter().map(|p| self.decorate(p)).collect())
    }

    /// Patterns registered through [`RpcClient::use_service`].
    pub fn listen_pins(&self) -> Vec<String> {
        self.listen_pins.read().clone()
    }

    /// An act function dispatching through this client.
    ///
    /// It holds the transport weakly, so handlers registered on the transport
    /// can capture it without keeping the transport alive.
    pub fn act(&self) -> Act {
        let weak = WeakClient {
            transport: Arc::downgrade(&self.transport),
            config: Arc::clone(&self.config),
            listen_pins: Arc::clone(&self.listen_pins),
        };
        Act::new(move |pin: Pin, caller: Option<Caller>| {
            let weak = weak.clone();
            async move {
                let client = weak.upgrade().ok_or_else(|| {
                    CallError::Transport(TransportError::Failed {
                        message: "transport has been dropped".to_string(),
                        detail: None,
                    })
                })?;
                client.call_pin(pin, caller.as_ref()).await
            }
        })
    }
}

#[derive(Clone)]
struct WeakClient {
    transport: Weak<dyn Transport>,
    config: Arc<Config>,
    listen_pins: Arc<RwLock<Vec<String>>>,
}

impl WeakClient {
    fn upgrade(&self) -> Option<RpcClient> {
        Some(RpcClient {
            transport: self.transport.upgrade()?,
            config: Arc::clone(&self.config),
            listen_pins: Arc::clone(&self.listen_pins),
        })
    }
}

/// Registrations and messages are decorated on their way to the inner
/// transport; results are returned as-is (still enveloped).
#[async_trait]
impl Transport for RpcClient {
    fn register(&self, pattern: Pin, handler: Handler) -> Result<(), TransportError> {
        self.transport.register(self.decorate(pattern), handler)
    }

    async fn dispatch(&self, message: Pin) -> Result<Value, TransportError> {
        self.transport.dispatch(self.decorate(message)).await
    }
}

impl std::fmt::Debug for RpcClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcClient")
            .field("config", &self.config)
            .field("listen_pins", &*self.listen_pins.read())
            .finish()
    }
}
