//! The operation vocabulary and its wire naming.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use super::capability::{Conditions, Facade, Patch};
use super::error::HandlerError;
use crate::error::PlumError;
use crate::pin::Args;

/// One operation of the facade vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Find,
    FindOne,
    FindById,
    Count,
    Create,
    Update,
    UpdateOne,
    UpdateById,
    Remove,
    RemoveOne,
    RemoveById,
    Clean,
    Seed,
    Reset,
}

impl Operation {
    /// All operations in registration order.
    pub const ALL: [Operation; 14] = [
        Operation::Find,
        Operation::FindOne,
        Operation::FindById,
        Operation::Count,
        Operation::Create,
        Operation::Update,
        Operation::UpdateOne,
        Operation::UpdateById,
        Operation::Remove,
        Operation::RemoveOne,
        Operation::RemoveById,
        Operation::Clean,
        Operation::Seed,
        Operation::Reset,
    ];

    /// Capability name as facades spell it.
    pub fn name(self) -> &'static str {
        match self {
            Operation::Find => "find",
            Operation::FindOne => "findOne",
            Operation::FindById => "findById",
            Operation::Count => "count",
            Operation::Create => "create",
            Operation::Update => "update",
            Operation::UpdateOne => "updateOne",
            Operation::UpdateById => "updateById",
            Operation::Remove => "remove",
            Operation::RemoveOne => "removeOne",
            Operation::RemoveById => "removeById",
            Operation::Clean => "clean",
            Operation::Seed => "seed",
            Operation::Reset => "reset",
        }
    }

    /// The `cmd` this operation registers under. Deployed callers depend on
    /// these exact strings.
    pub fn cmd(self) -> &'static str {
        match self {
            Operation::Find | Operation::FindById => "find",
            Operation::FindOne => "findOne",
            Operation::Count => "count",
            Operation::Create => "create",
            Operation::Update => "updateAll",
            Operation::UpdateOne | Operation::UpdateById => "update",
            Operation::Remove => "removeAll",
            Operation::RemoveOne | Operation::RemoveById => "remove",
            Operation::Clean => "clean",
            Operation::Seed => "seed",
            Operation::Reset => "reset",
        }
    }

    /// Argument keys registered as wildcards next to `role` and `cmd`.
    /// Operations sharing a `cmd` are told apart by these.
    pub fn arg_shape(self) -> &'static [&'static str] {
        match self {
            Operation::Find
            | Operation::FindOne
            | Operation::Count
            | Operation::Remove
            | Operation::RemoveOne => &["conditions"],
            Operation::FindById | Operation::RemoveById => &["id"],
            Operation::Create => &["input"],
            Operation::Update | Operation::UpdateOne => &["conditions", "input"],
            Operation::UpdateById => &["id", "input"],
            Operation::Clean | Operation::Seed | Operation::Reset => &[],
        }
    }

    /// Whether `facade` exposes this operation.
    pub fn is_present<F: Facade>(self, facade: &F) -> bool {
        match self {
            Operation::Find => facade.as_find().is_some(),
            Operation::FindOne => facade.as_find_one().is_some(),
            Operation::FindById => facade.as_find_by_id().is_some(),
            Operation::Count => facade.as_count().is_some(),
            Operation::Create => facade.as_create().is_some(),
            Operation::Update => facade.as_update().is_some(),
            Operation::UpdateOne => facade.as_update_one().is_some(),
            Operation::UpdateById => facade.as_update_by_id().is_some(),
            Operation::Remove => facade.as_remove().is_some(),
            Operation::RemoveOne => facade.as_remove_one().is_some(),
            Operation::RemoveById => facade.as_remove_by_id().is_some(),
            Operation::Clean => facade.as_clean().is_some(),
            Operation::Seed => facade.as_seed().is_some(),
            Operation::Reset => facade.as_reset().is_some(),
        }
    }

    /// Every operation `facade` exposes, in registration order.
    pub fn present_in<F: Facade>(facade: &F) -> Vec<Operation> {
        Self::ALL.into_iter().filter(|op| op.is_present(facade)).collect()
    }

    /// Run this operation on `facade` with arguments taken from `args`.
    ///
    /// A facade that lacks the capability (possible when capabilities vary
    /// per call) answers `not_allowed`.
    pub async fn invoke<F: Facade>(self, facade: &F, args: &Args) -> Result<Value, HandlerError> {
        let absent = || {
            HandlerError::from(
                PlumError::not_allowed()
                    .with_message(format!("operation `{}` is not available", self.name())),
            )
        };

        match self {
            Operation::Find => {
                let cap = facade.as_find().ok_or_else(absent)?;
                to_json(cap.find(conditions(args)?).await?)
            }
            Operation::FindOne => {
                let cap = facade.as_find_one().ok_or_else(absent)?;
                to_json(cap.find_one(conditions(args)?).await?)
            }
            Operation::FindById => {
                let cap = facade.as_find_by_id().ok_or_else(absent)?;
                to_json(cap.find_by_id(&id(args)?).await?)
            }
            Operation::Count => {
                let cap = facade.as_count().ok_or_else(absent)?;
                to_json(cap.count(conditions(args)?).await?)
            }
            Operation::Create => {
                let cap = facade.as_create().ok_or_else(absent)?;
                to_json(cap.create(input::<F::Entity>(args)?).await?)
            }
            Operation::Update => {
                let cap = facade.as_update().ok_or_else(absent)?;
                to_json(cap.update(conditions(args)?, patch(args)?).await?)
            }
            Operation::UpdateOne => {
                let cap = facade.as_update_one().ok_or_else(absent)?;
                to_json(cap.update_one(conditions(args)?, patch(args)?).await?)
            }
            Operation::UpdateById => {
                let cap = facade.as_update_by_id().ok_or_else(absent)?;
                to_json(cap.update_by_id(&id(args)?, patch(args)?).await?)
            }
            Operation::Remove => {
                let cap = facade.as_remove().ok_or_else(absent)?;
                to_json(cap.remove(conditions(args)?).await?)
            }
            Operation::RemoveOne => {
                let cap = facade.as_remove_one().ok_or_else(absent)?;
                to_json(cap.remove_one(conditions(args)?).await?)
            }
            Operation::RemoveById => {
                let cap = facade.as_remove_by_id().ok_or_else(absent)?;
                to_json(cap.remove_by_id(&id(args)?).await?)
            }
            Operation::Clean => {
                let cap = facade.as_clean().ok_or_else(absent)?;
                to_json(cap.clean(conditions(args)?).await?)
            }
            Operation::Seed => {
                let cap = facade.as_seed().ok_or_else(absent)?;
                cap.seed().await?;
                Ok(Value::Null)
            }
            Operation::Reset => {
                let cap = facade.as_reset().ok_or_else(absent)?;
                let seed = args.get("seed").and_then(Value::as_bool).unwrap_or(false);
                cap.reset(seed).await?;
                Ok(Value::Null)
            }
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn to_json<T: Serialize>(value: T) -> Result<Value, HandlerError> {
    serde_json::to_value(value).map_err(HandlerError::from)
}

fn conditions(args: &Args) -> Result<Option<Conditions>, HandlerError> {
    match args.get("conditions") {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(map)) => Ok(Some(map.clone())),
        Some(_) => Err(PlumError::parameters("`conditions` must be an object").into()),
    }
}

fn id(args: &Args) -> Result<String, HandlerError> {
    match args.get("id") {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(PlumError::parameters("`id` must be a string or number").into()),
    }
}

fn patch(args: &Args) -> Result<Patch, HandlerError> {
    match args.get("input") {
        Some(Value::Object(map)) => Ok(map.clone()),
        _ => Err(PlumError::parameters("`input` must be an object").into()),
    }
}

fn input<E: serde::de::DeserializeOwned>(args: &Args) -> Result<E, HandlerError> {
    let raw = args
        .get("input")
        .cloned()
        .ok_or_else(|| PlumError::parameters("missing `input`"))?;
    serde_json::from_value(raw)
        .map_err(|e| PlumError::parameters(format!("invalid `input`: {}", e)).into())
}
