//! Pins: attribute patterns that address remote operations.
//!
//! A pin is a flat attribute mapping (`role`, `cmd`, `version`,
//! `environment`, plus free-form keys). Endpoints register under a pin whose
//! values may be the wildcard `*`; messages carry concrete values and select
//! the most specific registered pattern that matches them.
//!
//! ```text
//! registered:  role:widget,cmd:find,id:*        ← findById
//! registered:  role:widget,cmd:find,conditions:* ← find
//! registered:  role:widget,cmd:*                ← catch-all
//!
//! message:     role:widget,cmd:find,id:w1       → findById
//! message:     role:widget,cmd:explode          → catch-all
//! ```

mod attr;
mod error;
#[allow(clippy::module_inception)]
mod pin;

pub use attr::{Attr, WILDCARD};
pub use error::PinError;
pub use pin::{arg_shape, Args, Pin, DEVELOPMENT_ENVIRONMENT};
