//! The pin record: build, decorate, match, and canonical keys.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::attr::{Attr, WILDCARD};
use super::error::PinError;

/// Raw call arguments: the flat JSON object a handler receives.
pub type Args = Map<String, Value>;

/// Environment name that enables developer pins.
pub const DEVELOPMENT_ENVIRONMENT: &str = "dev";

const ROLE: &str = "role";
const CMD: &str = "cmd";
const VERSION: &str = "version";
const ENVIRONMENT: &str = "environment";
const DEVELOPER: &str = "developer";

/// An attribute mapping identifying one remote operation.
///
/// `role` and `cmd` are always present. `version`, `environment` and
/// `developer` have dedicated slots; everything else lives in an ordered
/// extension map. On the wire a pin is a flat JSON object.
///
/// ```
/// use microplum::pin::{Attr, Pin};
///
/// let pin = Pin::new("widget", "find").with("id", Attr::Any);
/// assert_eq!(pin.to_pattern_key(), "cmd:find,id:*,role:widget");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Args", into = "Args")]
pub struct Pin {
    role: Attr,
    cmd: Attr,
    version: Option<Attr>,
    environment: Option<Attr>,
    developer: Option<Attr>,
    extra: BTreeMap<String, Attr>,
}

impl Pin {
    /// Create a pin with just `role` and `cmd`.
    pub fn new(role: impl Into<Attr>, cmd: impl Into<Attr>) -> Self {
        Self {
            role: role.into(),
            cmd: cmd.into(),
            version: None,
            environment: None,
            developer: None,
            extra: BTreeMap::new(),
        }
    }

    /// Merge `base` then `call` over `{role, cmd}`.
    ///
    /// Later keys win; `role` and `cmd` are applied last so neither map can
    /// override them.
    pub fn build(role: impl Into<Attr>, cmd: impl Into<Attr>, base: &Args, call: &Args) -> Self {
        let mut pin = Self::new(role, cmd);
        let (role, cmd) = (pin.role.clone(), pin.cmd.clone());
        for (key, value) in base.iter().chain(call.iter()) {
            pin.set(key, Attr::from(value.clone()));
        }
        pin.role = role;
        pin.cmd = cmd;
        pin
    }

    /// Parse a `key:value,key:value` pattern string.
    ///
    /// `*` parses as a wildcard, integers and booleans as JSON scalars, and
    /// anything else as a string.
    pub fn parse(pattern: &str) -> Result<Self, PinError> {
        let mut args = Args::new();
        for segment in pattern.split(',').map(str::trim).filter(|s| !s.is_empty()) {
            let (key, value) = segment
                .split_once(':')
                .ok_or_else(|| PinError::Malformed(segment.to_string()))?;
            let key = key.trim();
            if key.is_empty() {
                return Err(PinError::Malformed(segment.to_string()));
            }
            args.insert(key.to_string(), Attr::parse_token(value.trim()).to_value());
        }
        Self::from_args(args)
    }

    /// Decode a flat JSON object.
    pub fn from_args(mut args: Args) -> Result<Self, PinError> {
        let role = args.remove(ROLE).ok_or(PinError::MissingRole)?;
        let cmd = args.remove(CMD).ok_or(PinError::MissingCmd)?;
        let mut pin = Self::new(Attr::from(role), Attr::from(cmd));
        for (key, value) in args {
            pin.set(&key, Attr::from(value));
        }
        Ok(pin)
    }

    /// Decode any JSON value that should be an object.
    pub fn from_value(value: Value) -> Result<Self, PinError> {
        match value {
            Value::Object(args) => Self::from_args(args),
            other => Err(PinError::NotAnObject(other.to_string())),
        }
    }

    /// Encode as a flat JSON object.
    pub fn to_args(&self) -> Args {
        self.attrs()
            .map(|(key, attr)| (key.to_string(), attr.to_value()))
            .collect()
    }

    /// Builder-style [`Pin::set`].
    pub fn with(mut self, key: &str, attr: impl Into<Attr>) -> Self {
        self.set(key, attr);
        self
    }

    /// Set an attribute, routing well-known keys to their slots.
    pub fn set(&mut self, key: &str, attr: impl Into<Attr>) {
        let attr = attr.into();
        match key {
            ROLE => self.role = attr,
            CMD => self.cmd = attr,
            VERSION => self.version = Some(attr),
            ENVIRONMENT => self.environment = Some(attr),
            DEVELOPER => self.developer = Some(attr),
            _ => {
                self.extra.insert(key.to_string(), attr);
            }
        }
    }

    /// Look up an attribute by key.
    pub fn get(&self, key: &str) -> Option<&Attr> {
        match key {
            ROLE => Some(&self.role),
            CMD => Some(&self.cmd),
            VERSION => self.version.as_ref(),
            ENVIRONMENT => self.environment.as_ref(),
            DEVELOPER => self.developer.as_ref(),
            _ => self.extra.get(key),
        }
    }

    pub fn role(&self) -> &Attr {
        &self.role
    }

    pub fn cmd(&self) -> &Attr {
        &self.cmd
    }

    pub fn version(&self) -> Option<&Attr> {
        self.version.as_ref()
    }

    pub fn environment(&self) -> Option<&Attr> {
        self.environment.as_ref()
    }

    pub fn developer(&self) -> Option<&Attr> {
        self.developer.as_ref()
    }

    /// Every attribute, fixed slots first, then extension keys in order.
    pub fn attrs(&self) -> impl Iterator<Item = (&str, &Attr)> {
        [
            (ROLE, Some(&self.role)),
            (CMD, Some(&self.cmd)),
            (VERSION, self.version.as_ref()),
            (ENVIRONMENT, self.environment.as_ref()),
            (DEVELOPER, self.developer.as_ref()),
        ]
        .into_iter()
        .filter_map(|(key, attr)| attr.map(|a| (key, a)))
        .chain(self.extra.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Number of attributes present.
    pub fn len(&self) -> usize {
        self.attrs().count()
    }

    /// Never true: a pin always carries `role` and `cmd`.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Fill contextual attributes.
    ///
    /// `version` and `environment` are only set when absent. `developer` is set
    /// when `environment` (the active one, not the pin's) is the development
    /// mode and a developer identity is configured.
    pub fn decorate(mut self, version: &str, environment: &str, developer: Option<&str>) -> Self {
        if self.version.is_none() {
            self.version = Some(Attr::from(version));
        }
        if self.environment.is_none() {
            self.environment = Some(Attr::from(environment));
        }
        if environment == DEVELOPMENT_ENVIRONMENT {
            if let Some(developer) = developer {
                self.developer = Some(Attr::from(developer));
            }
        }
        self
    }

    /// Canonical `key:value` string sorted by key.
    pub fn to_pattern_key(&self) -> String {
        let mut pairs: Vec<(&str, &Attr)> = self.attrs().collect();
        pairs.sort_by(|a, b| a.0.cmp(b.0));
        pairs
            .iter()
            .map(|(key, attr)| format!("{}:{}", key, attr))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Treating `self` as a registered pattern, whether `message` selects it.
    pub fn matches(&self, message: &Pin) -> bool {
        self.attrs().all(|(key, pattern)| {
            message
                .get(key)
                .is_some_and(|value| pattern.accepts(value))
        })
    }

    /// Whether two patterns claim the same registration slot.
    pub fn conflicts_with(&self, other: &Pin) -> bool {
        self.len() == other.len()
            && self
                .attrs()
                .all(|(key, attr)| other.get(key).is_some_and(|o| o == attr))
    }

    /// Ordering weight for pattern selection: more keys first, then more
    /// concrete values.
    pub fn specificity(&self) -> (usize, usize) {
        let concrete = self.attrs().filter(|(_, a)| !a.is_wildcard()).count();
        (self.len(), concrete)
    }

    /// Sort key putting the most specific pattern first and breaking ties by
    /// canonical key.
    pub(crate) fn precedence(&self) -> (Reverse<(usize, usize)>, String) {
        (Reverse(self.specificity()), self.to_pattern_key())
    }

    /// Whether `role` or `cmd` is the wildcard.
    pub fn is_catch_all(&self) -> bool {
        self.role.is_wildcard() || self.cmd.is_wildcard()
    }
}

impl fmt::Display for Pin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_pattern_key())
    }
}

impl From<Pin> for Args {
    fn from(pin: Pin) -> Self {
        pin.to_args()
    }
}

impl TryFrom<Args> for Pin {
    type Error = PinError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        Pin::from_args(args)
    }
}

impl std::str::FromStr for Pin {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Pin::parse(s)
    }
}

/// Build a wildcard-valued fragment for the given keys.
pub fn arg_shape(keys: &[&str]) -> Args {
    keys.iter()
        .map(|key| (key.to_string(), Value::String(WILDCARD.to_string())))
        .collect()
}
