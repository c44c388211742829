//! Attribute values carried by a pin.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// The wildcard marker as it appears on the wire and in pattern keys.
pub const WILDCARD: &str = "*";

/// A single pin attribute: either a concrete JSON value or the wildcard `*`.
///
/// On the wire a wildcard is the plain string `"*"`, so any value decoded from
/// `"*"` becomes [`Attr::Any`].
#[derive(Debug, Clone, PartialEq)]
pub enum Attr {
    /// Matches any value, including structured ones.
    Any,
    /// A concrete value.
    Value(Value),
}

impl Attr {
    /// Whether this attribute is the wildcard marker.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, Attr::Any)
    }

    /// The attribute as a string slice, if it is a concrete string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Attr::Value(Value::String(s)) => Some(s),
            _ => None,
        }
    }

    /// The concrete value, if any.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Attr::Any => None,
            Attr::Value(v) => Some(v),
        }
    }

    /// Pattern-side comparison: a wildcard accepts everything, a concrete
    /// value accepts only an equal concrete value.
    pub fn accepts(&self, other: &Attr) -> bool {
        match self {
            Attr::Any => true,
            Attr::Value(v) => matches!(other, Attr::Value(o) if o == v),
        }
    }

    /// Convert to the JSON value that goes on the wire.
    pub fn to_value(&self) -> Value {
        match self {
            Attr::Any => Value::String(WILDCARD.to_string()),
            Attr::Value(v) => v.clone(),
        }
    }

    /// Parse a bare token from a `key:value` pattern string.
    pub(crate) fn parse_token(token: &str) -> Attr {
        if token == WILDCARD {
            return Attr::Any;
        }
        match token {
            "true" => Attr::Value(Value::Bool(true)),
            "false" => Attr::Value(Value::Bool(false)),
            _ => match token.parse::<i64>() {
                Ok(n) => Attr::Value(Value::from(n)),
                Err(_) => Attr::Value(Value::String(token.to_string())),
            },
        }
    }
}

impl fmt::Display for Attr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attr::Any => f.write_str(WILDCARD),
            Attr::Value(Value::String(s)) => f.write_str(s),
            Attr::Value(v) => write!(f, "{}", v),
        }
    }
}

impl From<Value> for Attr {
    fn from(value: Value) -> Self {
        match value {
            Value::String(s) if s == WILDCARD => Attr::Any,
            other => Attr::Value(other),
        }
    }
}

impl From<&str> for Attr {
    fn from(value: &str) -> Self {
        Attr::from(Value::String(value.to_string()))
    }
}

impl From<String> for Attr {
    fn from(value: String) -> Self {
        Attr::from(Value::String(value))
    }
}

impl From<&String> for Attr {
    fn from(value: &String) -> Self {
        Attr::from(value.as_str())
    }
}

impl From<i64> for Attr {
    fn from(value: i64) -> Self {
        Attr::Value(Value::from(value))
    }
}

impl From<u64> for Attr {
    fn from(value: u64) -> Self {
        Attr::Value(Value::from(value))
    }
}

impl From<bool> for Attr {
    fn from(value: bool) -> Self {
        Attr::Value(Value::Bool(value))
    }
}

impl Serialize for Attr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Attr::Any => serializer.serialize_str(WILDCARD),
            Attr::Value(v) => v.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Attr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Attr::from)
    }
}
