//! Per-call context handed to every facade.
//!
//! Carries the raw call arguments, the resolved caller, and the act function
//! the facade uses to call other services. A fresh context is built for each
//! inbound call and dropped when the handler returns.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use futures::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::caller::Caller;
use super::error::HandlerError;
use crate::client::CallError;
use crate::error::PlumError;
use crate::pin::{Args, Pin};

/// Message of the error every call through an unbound act fails with.
pub const ACT_NOT_SET: &str = "'act' service not set.";

/// Boxed act function: dispatches an outbound pin on behalf of a caller.
pub type ActFn =
    Arc<dyn Fn(Pin, Option<Caller>) -> BoxFuture<'static, Result<Value, CallError>> + Send + Sync>;

/// The operation dispatcher a facade delegates outbound calls to.
///
/// `Unbound` fails closed: every call is rejected with `server_error`.
#[derive(Clone, Default)]
pub enum Act {
    #[default]
    Unbound,
    Bound(ActFn),
}

impl Act {
    /// Wrap an async closure.
    pub fn new<F, Fut>(f: F) -> Self
    where
        F: Fn(Pin, Option<Caller>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, CallError>> + Send + 'static,
    {
        Act::Bound(Arc::new(move |pin, caller| Box::pin(f(pin, caller))))
    }

    pub fn is_bound(&self) -> bool {
        matches!(self, Act::Bound(_))
    }

    /// Dispatch `pin` on behalf of `caller`.
    pub async fn call(&self, pin: Pin, caller: Option<Caller>) -> Result<Value, CallError> {
        match self {
            Act::Bound(f) => f(pin, caller).await,
            Act::Unbound => {
                tracing::warn!(pattern = %pin, "act called before it was set");
                Err(CallError::Rejected(PlumError::server_error().with_message(ACT_NOT_SET)))
            }
        }
    }
}

impl fmt::Debug for Act {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Act::Unbound => f.write_str("Act::Unbound"),
            Act::Bound(_) => f.write_str("Act::Bound(..)"),
        }
    }
}

/// The context passed to every facade constructor.
///
/// ## Example
///
/// ```ignore
/// #[async_trait]
/// impl FindById<Order> for OrderFacade {
///     async fn find_by_id(&self, id: &str) -> Result<Option<Order>, HandlerError> {
///         let owner = self.ctx.user_id()?;
///         let stock = self.ctx.act(Pin::new("stock", "find").with("id", id)).await?;
///         // ...
///     }
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    /// Raw arguments of the inbound call (the full message).
    args: Args,
    /// Caller resolved from `user` / `userId`.
    caller: Option<Caller>,
    act: Act,
}

impl CallContext {
    /// Create a context for an inbound call.
    pub fn new(args: Args, act: Act) -> Self {
        let caller = Caller::from_args(&args);
        Self { args, caller, act }
    }

    /// A context with no arguments and an unbound act, used to probe which
    /// capabilities a facade exposes.
    pub fn probe() -> Self {
        Self::default()
    }

    /// Replace the resolved caller.
    pub fn with_caller(mut self, caller: Caller) -> Self {
        self.caller = Some(caller);
        self
    }

    /// Get the raw arguments.
    pub fn args(&self) -> &Args {
        &self.args
    }

    /// Get a single raw argument.
    pub fn arg(&self, key: &str) -> Option<&Value> {
        self.args.get(key)
    }

    /// Deserialize one argument into a typed value.
    pub fn input<T: DeserializeOwned>(&self, key: &str) -> Result<T, HandlerError> {
        let value = self
            .args
            .get(key)
            .cloned()
            .ok_or_else(|| PlumError::parameters(format!("missing argument `{}`", key)))?;
        serde_json::from_value(value)
            .map_err(|e| PlumError::parameters(format!("invalid argument `{}`: {}", key, e)).into())
    }

    /// Check if the call carries an argument.
    pub fn has_field(&self, field: &str) -> bool {
        self.args.get(field).is_some()
    }

    /// Check if the call carries all specified arguments.
    pub fn has_fields(&self, fields: &[&str]) -> bool {
        fields.iter().all(|f| self.has_field(f))
    }

    pub fn caller(&self) -> Option<&Caller> {
        self.caller.as_ref()
    }

    /// The caller id. Returns `unauthorized` for anonymous calls.
    pub fn user_id(&self) -> Result<&str, HandlerError> {
        self.caller
            .as_ref()
            .and_then(Caller::user_id)
            .ok_or_else(|| PlumError::unauthorized().into())
    }

    pub fn act_fn(&self) -> &Act {
        &self.act
    }

    /// Call another service. The current caller travels along unless `pin`
    /// names its own user.
    pub async fn act(&self, pin: Pin) -> Result<Value, CallError> {
        let caller = if pin.get("user").is_some() || pin.get("userId").is_some() {
            None
        } else {
            self.caller.clone()
        };
        self.act.call(pin, caller).await
    }

    /// Typed variant of [`CallContext::act`].
    pub async fn act_as<T: DeserializeOwned>(&self, pin: Pin) -> Result<T, CallError> {
        let value = self.act(pin).await?;
        serde_json::from_value(value).map_err(CallError::Decode)
    }
}
