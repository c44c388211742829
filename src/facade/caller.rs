//! Caller identity carried with a call.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::pin::{Args, Pin};

/// The user on whose behalf a call is made.
///
/// Identity providers disagree on where the id lives: some send `id`, OIDC
/// tokens send `sub`. The caller id is `id`, falling back to `sub`.
///
/// ```json
/// { "id": "user-42", "name": "Ada" }
/// { "sub": "auth0|5f1c", "name": "Ada" }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "string_or_number", skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Caller {
    /// A caller identified by `id`.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    /// A caller identified by a token subject.
    pub fn from_sub(sub: impl Into<String>) -> Self {
        Self {
            sub: Some(sub.into()),
            ..Self::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// `id`, falling back to `sub`.
    pub fn user_id(&self) -> Option<&str> {
        self.id.as_deref().or(self.sub.as_deref())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Resolve the caller of an inbound call.
    ///
    /// A structured `user` argument wins; otherwise `userId` / `userName`
    /// injected by the calling client are used.
    pub fn from_args(args: &Args) -> Option<Caller> {
        if let Some(user) = args.get("user").filter(|u| u.is_object()) {
            if let Ok(caller) = serde_json::from_value::<Caller>(user.clone()) {
                if caller.user_id().is_some() {
                    return Some(caller);
                }
            }
        }

        let id = scalar(args.get("userId")?)?;
        Some(Caller {
            id: Some(id),
            sub: None,
            name: args.get("userName").and_then(scalar),
        })
    }

    /// Write `userId` / `userName` into an outbound pin.
    pub fn inject(&self, pin: &mut Pin) {
        if let Some(id) = self.user_id() {
            pin.set("userId", id);
        }
        if let Some(name) = self.name() {
            pin.set("userName", name);
        }
    }
}

fn scalar(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?.as_ref().and_then(scalar))
}
