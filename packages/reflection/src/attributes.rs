//! Declared field attributes and the attribute surface seen while visiting.
//!
//! Fields declare [`FieldAttributes`] (labels, handlers, visibility, ...). While
//! walking, the driver layers container bookkeeping on top of those and hands
//! the result to visitors as [`Attributes`].

use crate::container::{ContainerHandle, ElementId};
use inspector_dom::Value;

/// Well-known attribute names.
pub mod names {
    pub const LABEL: &str = "Label";
    pub const HANDLER: &str = "Handler";
    pub const VISIBILITY: &str = "Visibility";
    pub const SERIALIZED_PATH: &str = "SerializedPath";
    pub const ENUM_TYPE: &str = "EnumType";
    pub const VALUE_TEXT: &str = "ValueText";
    pub const DISABLED: &str = "Disabled";
    pub const ANCESTOR_DISABLED: &str = "AncestorDisabled";
    pub const CONTAINER_CAN_BE_MODIFIED: &str = "ContainerCanBeModified";
    pub const PARENT_CONTAINER_CAN_BE_MODIFIED: &str = "ParentContainerCanBeModified";
    pub const CONTAINER_INDEX: &str = "ContainerIndex";
    pub const FORCE_AUTO_EXPAND: &str = "ForceAutoExpand";
    pub const AUTO_EXPAND: &str = "AutoExpand";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Show,
    Hide,
    /// No row for this value, but its children are still shown.
    ShowChildrenOnly,
}

impl Visibility {
    pub fn name(&self) -> &'static str {
        match self {
            Visibility::Show => "Show",
            Visibility::Hide => "Hide",
            Visibility::ShowChildrenOnly => "ShowChildrenOnly",
        }
    }

    pub fn from_value(value: &Value) -> Option<Self> {
        match value.as_str()? {
            "Show" => Some(Visibility::Show),
            "Hide" => Some(Visibility::Hide),
            "ShowChildrenOnly" => Some(Visibility::ShowChildrenOnly),
            _ => None,
        }
    }
}

impl From<Visibility> for Value {
    fn from(visibility: Visibility) -> Self {
        Value::String(visibility.name().to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    /// Empty for the default group.
    pub group: String,
    pub name: String,
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldAttributes {
    entries: Vec<Attribute>,
}

impl FieldAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_grouped(mut self, group: &str, name: &str, value: impl Into<Value>) -> Self {
        self.set_grouped(group, name, value);
        self
    }

    pub fn label(self, text: &str) -> Self {
        self.with(names::LABEL, text)
    }

    pub fn handler(self, handler: &str) -> Self {
        self.with(names::HANDLER, handler)
    }

    pub fn visibility(self, visibility: Visibility) -> Self {
        self.with(names::VISIBILITY, visibility)
    }

    pub fn serialized_path(self, path: &str) -> Self {
        self.with(names::SERIALIZED_PATH, path)
    }

    pub fn disabled(self, disabled: bool) -> Self {
        self.with(names::DISABLED, disabled)
    }

    pub fn enum_type(self, type_name: &str) -> Self {
        self.with(names::ENUM_TYPE, type_name)
    }

    pub fn value_text(self, text: &str) -> Self {
        self.with(names::VALUE_TEXT, text)
    }

    pub fn container_can_be_modified(self, allowed: bool) -> Self {
        self.with(names::CONTAINER_CAN_BE_MODIFIED, allowed)
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        self.set_grouped("", name, value);
    }

    pub fn set_grouped(&mut self, group: &str, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self
            .entries
            .iter_mut()
            .find(|entry| entry.group == group && entry.name == name)
        {
            Some(entry) => entry.value = value,
            None => self.entries.push(Attribute {
                group: group.to_string(),
                name: name.to_string(),
                value,
            }),
        }
    }

    /// Looks up a default-group attribute.
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.find_grouped("", name)
    }

    pub fn find_grouped(&self, group: &str, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|entry| entry.group == group && entry.name == name)
            .map(|entry| &entry.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Attribute> {
        self.entries.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The key half of an associative element, shown next to its value.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEntry {
    pub value: Value,
    pub attributes: FieldAttributes,
}

/// Attributes of the value currently being visited.
#[derive(Debug, Clone, Default)]
pub struct Attributes {
    declared: FieldAttributes,
    injected: FieldAttributes,
    container: Option<ContainerHandle>,
    parent_container: Option<ContainerHandle>,
    parent_container_len: Option<usize>,
    element_override: Option<ElementId>,
    key: Option<KeyEntry>,
}

impl Attributes {
    pub fn declared(declared: FieldAttributes) -> Self {
        Self {
            declared,
            ..Self::default()
        }
    }

    /// Adds a value attribute on top of the declared ones.
    pub fn inject(&mut self, name: &str, value: impl Into<Value>) {
        self.injected.set(name, value);
    }

    pub fn with_container(mut self, container: ContainerHandle) -> Self {
        self.container = Some(container);
        self
    }

    pub fn with_parent_container(mut self, parent: ContainerHandle, len: usize, index: usize) -> Self {
        self.parent_container = Some(parent);
        self.parent_container_len = Some(len);
        self.inject(names::CONTAINER_INDEX, index);
        self
    }

    pub fn with_element_override(mut self, element: ElementId) -> Self {
        self.element_override = Some(element);
        self
    }

    pub fn with_key(mut self, key: KeyEntry) -> Self {
        self.key = Some(key);
        self
    }

    /// Injected attributes shadow declared ones.
    pub fn find(&self, name: &str) -> Option<&Value> {
        self.injected.find(name).or_else(|| self.declared.find(name))
    }

    /// Every attribute, declared first then injected. Shadowed declared
    /// entries are skipped.
    pub fn list_attributes(&self, mut visitor: impl FnMut(&str, &str, &Value)) {
        for attribute in self.declared.iter() {
            if attribute.group.is_empty() && self.injected.find(&attribute.name).is_some() {
                continue;
            }
            visitor(&attribute.group, &attribute.name, &attribute.value);
        }
        for attribute in self.injected.iter() {
            visitor(&attribute.group, &attribute.name, &attribute.value);
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        self.find(name).and_then(Value::as_bool)
    }

    pub fn visibility(&self) -> Visibility {
        self.find(names::VISIBILITY)
            .and_then(Visibility::from_value)
            .unwrap_or_default()
    }

    pub fn label(&self) -> Option<&str> {
        self.find(names::LABEL).and_then(Value::as_str)
    }

    pub fn handler(&self) -> Option<&str> {
        self.find(names::HANDLER).and_then(Value::as_str)
    }

    pub fn value_text(&self) -> Option<&str> {
        self.find(names::VALUE_TEXT).and_then(Value::as_str)
    }

    pub fn is_disabled(&self) -> bool {
        self.flag(names::DISABLED).unwrap_or(false)
    }

    pub fn is_ancestor_disabled(&self) -> bool {
        self.flag(names::ANCESTOR_DISABLED).unwrap_or(false)
    }

    pub fn container(&self) -> Option<&ContainerHandle> {
        self.container.as_ref()
    }

    pub fn parent_container(&self) -> Option<&ContainerHandle> {
        self.parent_container.as_ref()
    }

    /// Element count of the parent container when the walk reached this value.
    pub fn parent_container_len(&self) -> Option<usize> {
        self.parent_container_len
    }

    pub fn container_index(&self) -> Option<usize> {
        self.find(names::CONTAINER_INDEX)
            .and_then(Value::as_u64)
            .and_then(|index| usize::try_from(index).ok())
    }

    pub fn element_override(&self) -> Option<ElementId> {
        self.element_override
    }

    pub fn key(&self) -> Option<&KeyEntry> {
        self.key.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_overwrites_in_place() {
        let attributes = FieldAttributes::new()
            .label("First")
            .disabled(true)
            .label("Second");

        let order: Vec<_> = attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(order, vec![names::LABEL, names::DISABLED]);
        assert_eq!(attributes.find(names::LABEL), Some(&Value::from("Second")));
    }

    #[test]
    fn test_groups_are_separate() {
        let attributes = FieldAttributes::new()
            .with("Min", 0)
            .with_grouped("Slider", "Min", 10);

        assert_eq!(attributes.find("Min"), Some(&Value::Int(0)));
        assert_eq!(attributes.find_grouped("Slider", "Min"), Some(&Value::Int(10)));
    }

    #[test]
    fn test_injected_shadow_declared() {
        let mut attributes = Attributes::declared(FieldAttributes::new().with(names::ANCESTOR_DISABLED, false));
        attributes.inject(names::ANCESTOR_DISABLED, true);

        assert!(attributes.is_ancestor_disabled());
        let mut seen = Vec::new();
        attributes.list_attributes(|_, name, value| seen.push((name.to_string(), value.clone())));
        assert_eq!(seen, vec![(names::ANCESTOR_DISABLED.to_string(), Value::Bool(true))]);
    }

    #[test]
    fn test_visibility_defaults_to_show() {
        assert_eq!(Attributes::default().visibility(), Visibility::Show);
        let hidden = Attributes::declared(FieldAttributes::new().visibility(Visibility::Hide));
        assert_eq!(hidden.visibility(), Visibility::Hide);
    }
}
