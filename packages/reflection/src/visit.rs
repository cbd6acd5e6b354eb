//! Depth-first traversal of a reflected object graph.
//!
//! [`visit_instance`] reports each value to a [`ReadVisitor`] with the
//! attributes in effect at that point. Composite values produce a
//! `BeginObject` / `EndObject` pair around their children; everything else is a
//! single event.
//!
//! Container elements see extra injected attributes: a handle on the parent
//! container, their index, the parent length, and for associative containers
//! the element key. Disabled state flows down as `AncestorDisabled`.

use crate::address::{AccessStep, InstanceAddress};
use crate::attributes::{names, Attributes, FieldAttributes, KeyEntry, Visibility};
use crate::container::{ContainerHandle, DataContainer, ElementId};
use crate::reflect::{Primitive, Reflect, ReflectRef};
use crate::wrappers::AssetRef;

pub enum Visit<'a> {
    BeginObject,
    EndObject,
    Primitive(Primitive),
    String(&'a str),
    Enum(i64),
    Pointer,
    Buffer(&'a [u8]),
    Asset(&'a AssetRef),
}

/// The value being visited and where it lives.
#[derive(Clone, Copy)]
pub struct Access<'a> {
    value: &'a dyn Reflect,
    address: &'a InstanceAddress,
}

impl<'a> Access<'a> {
    pub fn value(&self) -> &'a dyn Reflect {
        self.value
    }

    pub fn address(&self) -> &'a InstanceAddress {
        self.address
    }

    pub fn type_name(&self) -> &'static str {
        self.value.type_name()
    }

    pub fn is_opaque(&self) -> bool {
        matches!(self.value.reflect_ref(), ReflectRef::Opaque)
    }

    pub fn as_container(&self) -> Option<&'a dyn DataContainer> {
        match self.value.reflect_ref() {
            ReflectRef::Container(container) => Some(container),
            _ => None,
        }
    }
}

pub trait ReadVisitor {
    fn visit(&mut self, visit: Visit<'_>, access: &Access<'_>, attributes: &Attributes);
}

/// Walks `root` and everything reachable from it.
///
/// A struct root contributes no row of its own: it is reported with
/// `Visibility::ShowChildrenOnly` so its fields land at the top level. Any other
/// root is visited as a plain value.
pub fn visit_instance(root: &dyn Reflect, visitor: &mut dyn ReadVisitor) {
    let address = InstanceAddress::root();
    let mut attributes = Attributes::default();
    if matches!(root.reflect_ref(), ReflectRef::Object(_)) {
        attributes.inject(names::VISIBILITY, Visibility::ShowChildrenOnly);
    }
    visit_value(root, &address, &attributes, visitor);
}

fn visit_value(
    value: &dyn Reflect,
    address: &InstanceAddress,
    attributes: &Attributes,
    visitor: &mut dyn ReadVisitor,
) {
    let access = Access { value, address };
    match value.reflect_ref() {
        ReflectRef::Primitive(primitive) => visitor.visit(Visit::Primitive(primitive), &access, attributes),
        ReflectRef::String(text) => visitor.visit(Visit::String(text), &access, attributes),
        ReflectRef::Enum(raw) => visitor.visit(Visit::Enum(raw), &access, attributes),
        ReflectRef::Pointer(_) => visitor.visit(Visit::Pointer, &access, attributes),
        ReflectRef::Buffer(bytes) => visitor.visit(Visit::Buffer(bytes), &access, attributes),
        ReflectRef::Asset(asset) => visitor.visit(Visit::Asset(asset), &access, attributes),
        ReflectRef::Opaque => {
            visitor.visit(Visit::BeginObject, &access, attributes);
            visitor.visit(Visit::EndObject, &access, attributes);
        }
        ReflectRef::Object(object) => {
            visitor.visit(Visit::BeginObject, &access, attributes);
            for index in 0..object.field_len() {
                let (Some(field), Some(info)) = (object.field(index), object.field_info(index)) else {
                    continue;
                };
                let mut field_attributes = Attributes::declared(info.attributes);
                inherit_disabled(attributes, &mut field_attributes);
                visit_value(
                    field,
                    &address.child(AccessStep::Field(index)),
                    &field_attributes,
                    visitor,
                );
            }
            visitor.visit(Visit::EndObject, &access, attributes);
        }
        ReflectRef::Container(container) => visit_container(container, &access, attributes, visitor),
    }
}

fn visit_container(
    container: &dyn DataContainer,
    access: &Access<'_>,
    attributes: &Attributes,
    visitor: &mut dyn ReadVisitor,
) {
    let handle = ContainerHandle {
        descriptor: container.descriptor(),
        instance: access.address.clone(),
    };
    let container_attributes = attributes.clone().with_container(handle.clone());
    let can_be_modified = attributes
        .flag(names::CONTAINER_CAN_BE_MODIFIED)
        .unwrap_or(true);
    let len = container.len();

    visitor.visit(Visit::BeginObject, access, &container_attributes);
    for index in 0..len {
        let Some(element) = container.element(index) else {
            continue;
        };
        let mut element_attributes = Attributes::default().with_parent_container(handle.clone(), len, index);
        element_attributes.inject(names::PARENT_CONTAINER_CAN_BE_MODIFIED, can_be_modified);

        if handle.descriptor.is_associative() {
            let key = container.element_key(index);
            let label = key
                .as_ref()
                .map(|key| key.display_text())
                .unwrap_or_else(|| format!("[{index}]"));
            element_attributes.inject(names::LABEL, label);
            element_attributes = element_attributes.with_element_override(ElementId::at(element, index));
            if let Some(value) = key {
                element_attributes = element_attributes.with_key(KeyEntry {
                    value,
                    attributes: FieldAttributes::new(),
                });
            }
        } else {
            element_attributes.inject(names::LABEL, format!("[{index}]"));
        }
        inherit_disabled(attributes, &mut element_attributes);

        visit_value(
            element,
            &access.address.child(AccessStep::Element(index)),
            &element_attributes,
            visitor,
        );
    }
    visitor.visit(Visit::EndObject, access, &container_attributes);
}

fn inherit_disabled(parent: &Attributes, child: &mut Attributes) {
    if parent.is_disabled() || parent.is_ancestor_disabled() {
        child.inject(names::ANCESTOR_DISABLED, true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect_struct;
    use std::collections::BTreeMap;

    #[derive(Default)]
    struct Item {
        count: u32,
    }

    reflect_struct! {
        Item {
            count => FieldAttributes::new().label("Count"),
        }
    }

    #[derive(Default)]
    struct Bag {
        name: String,
        items: Vec<Item>,
        tags: BTreeMap<String, bool>,
        locked: Vec<u8>,
    }

    reflect_struct! {
        Bag {
            name => FieldAttributes::new().label("Name"),
            items => FieldAttributes::new().label("Items"),
            tags => FieldAttributes::new().label("Tags"),
            locked => FieldAttributes::new().label("Locked").disabled(true),
        }
    }

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
        attributes: Vec<Attributes>,
    }

    impl ReadVisitor for Recorder {
        fn visit(&mut self, visit: Visit<'_>, access: &Access<'_>, attributes: &Attributes) {
            let kind = match visit {
                Visit::BeginObject => "begin",
                Visit::EndObject => "end",
                Visit::Primitive(_) => "primitive",
                Visit::String(_) => "string",
                Visit::Enum(_) => "enum",
                Visit::Pointer => "pointer",
                Visit::Buffer(_) => "buffer",
                Visit::Asset(_) => "asset",
            };
            let label = attributes.label().unwrap_or("-");
            self.events.push(format!("{kind} {label} {}", access.address()));
            self.attributes.push(attributes.clone());
        }
    }

    fn sample() -> Bag {
        let mut tags = BTreeMap::new();
        tags.insert("heavy".to_string(), true);
        Bag {
            name: "pack".into(),
            items: vec![Item { count: 1 }, Item { count: 2 }],
            tags,
            locked: vec![7],
        }
    }

    #[test]
    fn test_event_order() {
        let bag = sample();
        let mut recorder = Recorder::default();
        visit_instance(&bag, &mut recorder);

        assert_eq!(
            recorder.events,
            vec![
                "begin - $",
                "string Name $.0",
                "begin Items $.1",
                "begin [0] $.1[0]",
                "primitive Count $.1[0].0",
                "end [0] $.1[0]",
                "begin [1] $.1[1]",
                "primitive Count $.1[1].0",
                "end [1] $.1[1]",
                "end Items $.1",
                "begin Tags $.2",
                "primitive heavy $.2[0]",
                "end Tags $.2",
                "begin Locked $.3",
                "primitive [0] $.3[0]",
                "end Locked $.3",
                "end - $",
            ]
        );
        assert_eq!(recorder.attributes[0].visibility(), Visibility::ShowChildrenOnly);
    }

    #[test]
    fn test_container_attributes_injected() {
        let bag = sample();
        let mut recorder = Recorder::default();
        visit_instance(&bag, &mut recorder);

        let items_begin = &recorder.attributes[2];
        assert!(items_begin.container().is_some());

        let second = &recorder.attributes[6];
        assert_eq!(second.container_index(), Some(1));
        assert_eq!(second.parent_container_len(), Some(2));
        assert!(second
            .parent_container()
            .unwrap()
            .same_container(items_begin.container().unwrap()));

        let tag = &recorder.attributes[11];
        assert_eq!(tag.key().map(|key| key.value.clone()), Some("heavy".into()));
        assert!(tag.element_override().is_some());
    }

    #[test]
    fn test_disabled_flows_to_elements() {
        let bag = sample();
        let mut recorder = Recorder::default();
        visit_instance(&bag, &mut recorder);

        assert!(recorder.attributes[13].is_disabled());
        assert!(recorder.attributes[14].is_ancestor_disabled());
        assert!(!recorder.attributes[4].is_ancestor_disabled());
    }

    #[test]
    fn test_non_struct_root_is_plain_value() {
        let mut recorder = Recorder::default();
        visit_instance(&"key".to_string(), &mut recorder);
        assert_eq!(recorder.events, vec!["string - $"]);
    }
}
