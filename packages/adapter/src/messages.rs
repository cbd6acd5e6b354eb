//! Messages a view sends to an adapter.
//!
//! [`AdapterMessage`] is the in-process form. [`WireMessage`] is what arrives
//! over a serialized channel and converts with `TryFrom`; accepting a
//! container key carries a live adapter and has no wire form.

use crate::adapter::ReflectionAdapter;
use crate::errors::{AdapterError, AdapterResult};
use crate::nodes::ContainerAction;
use inspector_dom::{Path, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

pub mod names {
    pub const VALUE_CHANGED: &str = "ValueChanged";
    pub const CONTAINER_ACTION: &str = "ContainerAction";
    pub const ADD_CONTAINER_KEY: &str = "AddContainerKey";
    pub const REJECT_CONTAINER_KEY: &str = "RejectContainerKey";
    pub const SET_NODE_DISABLED: &str = "SetNodeDisabled";
    pub const REQUEST_TREE_UPDATE: &str = "RequestTreeUpdate";
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueChangeType {
    /// The user is still editing, e.g. dragging a slider.
    InProgressEdit,
    #[default]
    FinishedEdit,
}

#[derive(Debug)]
pub enum AdapterMessage {
    ValueChanged {
        origin: Path,
        value: Value,
        change_type: ValueChangeType,
    },
    ContainerAction {
        origin: Path,
        action: ContainerAction,
        index: Option<usize>,
    },
    /// Completes a pending add with the key edited through `key_adapter`.
    AddContainerKey {
        origin: Path,
        key_adapter: ReflectionAdapter,
    },
    RejectContainerKey {
        origin: Path,
    },
    SetNodeDisabled {
        path: Path,
        disabled: bool,
    },
    RequestTreeUpdate {
        origin: Path,
    },
}

impl AdapterMessage {
    pub fn name(&self) -> &'static str {
        match self {
            AdapterMessage::ValueChanged { .. } => names::VALUE_CHANGED,
            AdapterMessage::ContainerAction { .. } => names::CONTAINER_ACTION,
            AdapterMessage::AddContainerKey { .. } => names::ADD_CONTAINER_KEY,
            AdapterMessage::RejectContainerKey { .. } => names::REJECT_CONTAINER_KEY,
            AdapterMessage::SetNodeDisabled { .. } => names::SET_NODE_DISABLED,
            AdapterMessage::RequestTreeUpdate { .. } => names::REQUEST_TREE_UPDATE,
        }
    }

    pub fn origin(&self) -> &Path {
        match self {
            AdapterMessage::ValueChanged { origin, .. }
            | AdapterMessage::ContainerAction { origin, .. }
            | AdapterMessage::AddContainerKey { origin, .. }
            | AdapterMessage::RejectContainerKey { origin }
            | AdapterMessage::RequestTreeUpdate { origin } => origin,
            AdapterMessage::SetNodeDisabled { path, .. } => path,
        }
    }
}

/// A message as it appears on the wire:
///
/// ```json
/// { "name": "ValueChanged", "origin": "/0/1", "args": { "value": 4 } }
/// ```
///
/// `origin` is either a slash path or an array of path entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireMessage {
    pub name: String,
    #[serde(default, deserialize_with = "deserialize_origin")]
    pub origin: Path,
    #[serde(default)]
    pub args: serde_json::Value,
}

fn deserialize_origin<'de, D>(deserializer: D) -> Result<Path, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Origin {
        Text(String),
        Entries(Path),
    }

    match Origin::deserialize(deserializer)? {
        Origin::Text(text) => text.parse().map_err(serde::de::Error::custom),
        Origin::Entries(path) => Ok(path),
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ValueChangedArgs {
    value: serde_json::Value,
    #[serde(default)]
    change_type: ValueChangeType,
}

#[derive(Deserialize)]
struct ContainerActionArgs {
    action: ContainerAction,
    #[serde(default)]
    index: Option<usize>,
}

#[derive(Deserialize)]
struct SetDisabledArgs {
    disabled: bool,
}

fn decode_args<T: DeserializeOwned>(name: &str, args: serde_json::Value) -> AdapterResult<T> {
    serde_json::from_value(args).map_err(|e| AdapterError::InvalidMessage(format!("{name}: {e}")))
}

impl TryFrom<WireMessage> for AdapterMessage {
    type Error = AdapterError;

    fn try_from(wire: WireMessage) -> AdapterResult<Self> {
        let WireMessage { name, origin, args } = wire;
        match name.as_str() {
            names::VALUE_CHANGED => {
                let args: ValueChangedArgs = decode_args(&name, args)?;
                Ok(AdapterMessage::ValueChanged {
                    origin,
                    value: Value::from(args.value),
                    change_type: args.change_type,
                })
            }
            names::CONTAINER_ACTION => {
                let args: ContainerActionArgs = decode_args(&name, args)?;
                Ok(AdapterMessage::ContainerAction {
                    origin,
                    action: args.action,
                    index: args.index,
                })
            }
            names::REJECT_CONTAINER_KEY => Ok(AdapterMessage::RejectContainerKey { origin }),
            names::SET_NODE_DISABLED => {
                let args: SetDisabledArgs = decode_args(&name, args)?;
                Ok(AdapterMessage::SetNodeDisabled {
                    path: origin,
                    disabled: args.disabled,
                })
            }
            names::REQUEST_TREE_UPDATE => Ok(AdapterMessage::RequestTreeUpdate { origin }),
            names::ADD_CONTAINER_KEY => Err(AdapterError::InvalidMessage(format!(
                "{name} carries a key adapter and cannot be decoded"
            ))),
            _ => Err(AdapterError::UnknownMessage(name)),
        }
    }
}

/// Where a pending associative add waits for its key.
#[derive(Debug)]
pub struct KeyQuery {
    /// Path to send the accept or reject message to.
    pub container_path: Path,
    /// Adapter over the default key. Edit it, then hand it back with
    /// [`AdapterMessage::AddContainerKey`].
    pub adapter: ReflectionAdapter,
}

#[derive(Debug)]
pub enum MessageOutcome {
    Handled,
    /// Nothing is bound at the message's path.
    Ignored,
    KeyRequested(KeyQuery),
}

impl MessageOutcome {
    pub fn is_handled(&self) -> bool {
        !matches!(self, MessageOutcome::Ignored)
    }
}
