//! Document vocabulary: attribute names, editor types, and container actions.

use inspector_dom::Value;
use serde::{Deserialize, Serialize};

/// Attribute names written onto document nodes.
pub mod attrs {
    pub const VALUE: &str = "Value";
    pub const TYPE: &str = "Type";
    pub const DISABLED: &str = "Disabled";
    pub const ANCESTOR_DISABLED: &str = "AncestorDisabled";
    pub const VALUE_HASHED: &str = "ValueHashed";
    pub const ACTION: &str = "Action";
    pub const CONTAINER_INDEX: &str = "ContainerIndex";
    pub const SHARE_PRIOR_COLUMN: &str = "SharePriorColumn";
    pub const USE_MINIMUM_WIDTH: &str = "UseMinimumWidth";
    pub const ALIGNMENT: &str = "Alignment";
    pub const SERIALIZED_PATH: &str = "SerializedPath";
}

/// Editor type used when a field declares an enum type but no handler.
pub const COMBO_BOX: &str = "ComboBox";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    AlignLeft,
    AlignCenter,
    AlignRight,
}

impl Alignment {
    pub fn name(&self) -> &'static str {
        match self {
            Alignment::AlignLeft => "AlignLeft",
            Alignment::AlignCenter => "AlignCenter",
            Alignment::AlignRight => "AlignRight",
        }
    }
}

impl From<Alignment> for Value {
    fn from(alignment: Alignment) -> Self {
        Value::from(alignment.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContainerAction {
    AddElement,
    RemoveElement,
    Clear,
    MoveUp,
    MoveDown,
}

impl ContainerAction {
    pub fn name(&self) -> &'static str {
        match self {
            ContainerAction::AddElement => "AddElement",
            ContainerAction::RemoveElement => "RemoveElement",
            ContainerAction::Clear => "Clear",
            ContainerAction::MoveUp => "MoveUp",
            ContainerAction::MoveDown => "MoveDown",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "AddElement" => Some(ContainerAction::AddElement),
            "RemoveElement" => Some(ContainerAction::RemoveElement),
            "Clear" => Some(ContainerAction::Clear),
            "MoveUp" => Some(ContainerAction::MoveUp),
            "MoveDown" => Some(ContainerAction::MoveDown),
            _ => None,
        }
    }

    /// Actions that operate on the container rather than one element.
    pub fn targets_container(&self) -> bool {
        matches!(self, ContainerAction::AddElement | ContainerAction::Clear)
    }
}

impl From<ContainerAction> for Value {
    fn from(action: ContainerAction) -> Self {
        Value::from(action.name())
    }
}

/// Text shown beside a container label when no `ValueText` is declared.
pub fn element_count_text(count: usize) -> String {
    if count == 1 {
        "1 element".to_string()
    } else {
        format!("{count} elements")
    }
}
