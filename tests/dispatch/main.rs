//! Dispatch integration tests.
//!
//! Exercises the full path: a facade bound by a `ServiceEntity`, pins
//! decorated by an `RpcClient`, matched by the in-memory transport, and
//! results unwrapped from the response envelope.

mod support;
mod binding;
mod properties;
#[cfg(feature = "http")]
mod http;
