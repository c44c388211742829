//! Binding a facade to the transport.
//!
//! A `ServiceEntity<F>` holds a facade constructor and registers one endpoint
//! per capability, plus a catch-all for the role. Handlers build a fresh
//! facade per call and envelope its outcome.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::{json, Value};

use super::error::BindError;
use crate::envelope;
use crate::error::PlumError;
use crate::facade::{Act, CallContext, Caller, Facade, HandlerError, Operation};
use crate::pin::{arg_shape, Args, Attr, Pin};
use crate::transport::{handler, Handler, Transport};

/// Message of the catch-all rejection.
pub const SERVICE_NOT_FOUND: &str = "Service not found.";

/// Lifecycle of a service entity. Only `Bound` entities serve calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindState {
    Unbound,
    Binding,
    Bound,
}

type Factory<F> = Arc<dyn Fn(CallContext) -> F + Send + Sync>;

/// A named service exposing a facade's capabilities as pinned endpoints.
///
/// The entity name is the `role` of every pin it registers.
pub struct ServiceEntity<F: Facade> {
    name: String,
    factory: Factory<F>,
    /// Base attributes merged into every pin this entity registers.
    service_pin: Args,
    act: Act,
    state: Arc<RwLock<BindState>>,
}

impl<F: Facade> ServiceEntity<F> {
    /// Create an unbound entity with no act function.
    pub fn new<C>(name: impl Into<String>, factory: C) -> Self
    where
        C: Fn(CallContext) -> F + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            factory: Arc::new(factory),
            service_pin: Args::new(),
            act: Act::Unbound,
            state: Arc::new(RwLock::new(BindState::Unbound)),
        }
    }

    /// Merge `attrs` into every pin this entity registers.
    pub fn with_service_pin(mut self, attrs: Args) -> Self {
        self.service_pin = attrs;
        self
    }

    pub fn with_act(mut self, act: Act) -> Self {
        self.act = act;
        self
    }

    pub fn set_act(&mut self, act: Act) {
        self.act = act;
    }

    /// The act function, with `caller` attached to every outbound call that
    /// does not carry a caller of its own.
    pub fn act_for(&self, caller: Caller) -> Act {
        let inner = self.act.clone();
        if !inner.is_bound() {
            return inner;
        }
        Act::new(move |pin: Pin, explicit: Option<Caller>| {
            let inner = inner.clone();
            let caller = explicit.or_else(|| {
                let names_user = pin.get("user").is_some() || pin.get("userId").is_some();
                (!names_user).then(|| caller.clone())
            });
            async move { inner.call(pin, caller).await }
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> BindState {
        *self.state.read()
    }

    /// Operations a probe facade exposes, in registration order.
    pub fn capabilities(&self) -> Vec<Operation> {
        let probe = (self.factory)(CallContext::probe());
        Operation::present_in(&probe)
    }

    /// Build a facade for a call with the given arguments.
    pub fn create_facade(&self, args: Args) -> F {
        (self.factory)(CallContext::new(args, self.act.clone()))
    }

    /// `{role: name, cmd, ...service_pin, ...shape:*}`.
    pub fn pin(&self, cmd: impl Into<Attr>, shape: &[&str]) -> Pin {
        Pin::build(self.name.as_str(), cmd, &self.service_pin, &arg_shape(shape))
    }

    /// The role-wide pattern (`cmd:*`) a listener subscribes to.
    pub fn public_pin(&self) -> Pin {
        self.pin(Attr::Any, &[])
    }

    /// Register every present capability and the catch-all on `transport`.
    ///
    /// Returns the registered patterns, catch-all last. Fails without
    /// registering anything when the act function is unbound or the entity is
    /// already bound.
    pub fn bind(&self, transport: &dyn Transport) -> Result<Vec<Pin>, BindError> {
        {
            let mut state = self.state.write();
            if !self.act.is_bound() {
                tracing::warn!(role = %self.name, "refusing to bind without an act function");
                return Err(BindError::ActNotSet {
                    role: self.name.clone(),
                });
            }
            if *state != BindState::Unbound {
                return Err(BindError::AlreadyBound {
                    role: self.name.clone(),
                });
            }
            *state = BindState::Binding;
        }

        match self.register_all(transport) {
            Ok(pins) => {
                *self.state.write() = BindState::Bound;
                tracing::debug!(role = %self.name, endpoints = pins.len(), "service bound");
                Ok(pins)
            }
            Err(err) => {
                *self.state.write() = BindState::Unbound;
                tracing::warn!(role = %self.name, error = %err, "service binding failed");
                Err(err.into())
            }
        }
    }

    fn register_all(&self, transport: &dyn Transport) -> Result<Vec<Pin>, crate::transport::TransportError> {
        let mut pins = Vec::new();
        for op in self.capabilities() {
            let pin = self.pin(op.cmd(), op.arg_shape());
            transport.register(pin.clone(), self.operation_handler(op))?;
            pins.push(pin);
        }

        let catch_all = self.public_pin();
        transport.register(catch_all.clone(), self.catch_all_handler(catch_all.clone()))?;
        pins.push(catch_all);
        Ok(pins)
    }

    fn operation_handler(&self, op: Operation) -> Handler {
        let factory = Arc::clone(&self.factory);
        let act = self.act.clone();
        let state = Arc::clone(&self.state);
        let role = self.name.clone();

        handler(move |args: Args| {
            let factory = Arc::clone(&factory);
            let act = act.clone();
            let state = Arc::clone(&state);
            let role = role.clone();
            async move {
                let bound = *state.read() == BindState::Bound;
                if !bound {
                    let err = PlumError::server_error().with_message(format!("service `{}` is not bound", role));
                    return envelope::reply(Err(err.into()));
                }

                let facade = factory(CallContext::new(args.clone(), act));
                let outcome = op.invoke(&facade, &args).await;
                match &outcome {
                    Ok(_) => tracing::trace!(role = %role, op = %op, "handled"),
                    Err(HandlerError::Classified(e)) => {
                        tracing::trace!(role = %role, op = %op, code = e.code(), "rejected")
                    }
                    Err(HandlerError::Unclassified(e)) => {
                        tracing::trace!(role = %role, op = %op, error = %e, "failed")
                    }
                }
                envelope::reply(outcome)
            }
        })
    }

    fn catch_all_handler(&self, service: Pin) -> Handler {
        let service = Value::Object(service.to_args());
        handler(move |args: Args| {
            let service = service.clone();
            async move {
                tracing::warn!(
                    role = ?args.get("role"),
                    cmd = ?args.get("cmd"),
                    "no endpoint matched call"
                );
                if args.get("nonErrorDefault").is_some_and(truthy) {
                    return envelope::reply(Ok(Value::Null));
                }
                let err = PlumError::not_allowed()
                    .with_message(SERVICE_NOT_FOUND)
                    .with_scope(json!({ "service": service, "args": args }));
                envelope::reply(Err(err.into()))
            }
        })
    }
}

impl<F: Facade> fmt::Debug for ServiceEntity<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceEntity")
            .field("name", &self.name)
            .field("service_pin", &self.service_pin)
            .field("act", &self.act)
            .field("state", &self.state())
            .finish()
    }
}

fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
