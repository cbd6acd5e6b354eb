//! Object graph walker.
//!
//! Turns the visit events of [`visit_instance`] into document nodes. Every
//! property editor gets a [`ChangeCallback`] at its exact path, and every
//! container row and element row gets a [`ContainerEntry`], keyed by the
//! builder's current path at the moment the node is opened.

use crate::builder::AdapterBuilder;
use crate::config::AdapterConfig;
use crate::containers::{BoundContainer, ContainerElement, ContainerEntry};
use crate::errors::BuilderError;
use crate::nodes::{attrs, element_count_text, Alignment, ContainerAction, COMBO_BOX};
use crate::path_index::PathIndex;
use inspector_dom::{Node, Value};
use inspector_reflection::{
    is_editable, names, resolve, resolve_mut, visit_instance, Access, Attributes, ContainerHandle, DataContainer, ElementId,
    InstanceAddress, ReadVisitor, Reflect, ReflectError, ReflectRef, Visibility, Visit,
};
use tracing::{trace, warn};

/// Declared attributes that shape the row or editor instead of being copied
/// onto the editor.
const NOT_FORWARDED: &[&str] = &[
    names::LABEL,
    names::HANDLER,
    names::VISIBILITY,
    names::FORCE_AUTO_EXPAND,
    names::AUTO_EXPAND,
    attrs::VALUE,
    attrs::TYPE,
];

const ROW_ATTRIBUTES: &[&str] = &[names::FORCE_AUTO_EXPAND, names::AUTO_EXPAND];

/// Writes an edited value back into the graph.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeCallback {
    Store { address: InstanceAddress, generation: u64 },
    /// Displayed but not editable, e.g. the key of a map element.
    ReadOnly { value: Value, generation: u64 },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CallbackResult {
    /// The value now stored, in canonical form, and a fresh content hash for
    /// opaque values. `structural` is set when the edit replaced a whole
    /// container, whose rows are then out of date.
    Stored {
        value: Value,
        hash: Option<u32>,
        structural: bool,
    },
    /// The edit was discarded; `previous` is still stored. `None` when the
    /// address no longer reaches a value.
    Rejected { previous: Option<Value>, error: String },
}

impl ChangeCallback {
    pub fn generation(&self) -> u64 {
        match self {
            ChangeCallback::Store { generation, .. } | ChangeCallback::ReadOnly { generation, .. } => *generation,
        }
    }

    pub fn invoke(&self, root: &mut dyn Reflect, raw: &Value) -> CallbackResult {
        let address = match self {
            ChangeCallback::Store { address, .. } => address,
            ChangeCallback::ReadOnly { value, .. } => {
                return CallbackResult::Rejected {
                    previous: Some(value.clone()),
                    error: "value is read-only".to_string(),
                }
            }
        };
        let Some(target) = resolve_mut(&mut *root, address) else {
            return CallbackResult::Rejected {
                previous: resolve(&*root, address).map(Reflect::to_value),
                error: ReflectError::UnresolvedAddress(address.to_string()).to_string(),
            };
        };

        let previous = target.to_value();
        match target.apply_value(raw) {
            Ok(()) => CallbackResult::Stored {
                value: target.to_value(),
                hash: opaque_hash(&*target),
                structural: matches!(target.reflect_ref(), ReflectRef::Container(_)),
            },
            Err(error) => {
                if let Err(restore) = target.apply_value(&previous) {
                    warn!(%address, %restore, "could not restore value after failed edit");
                }
                CallbackResult::Rejected {
                    previous: Some(previous),
                    error: error.to_string(),
                }
            }
        }
    }
}

pub(crate) fn opaque_hash(value: &dyn Reflect) -> Option<u32> {
    match value.reflect_ref() {
        ReflectRef::Opaque => value.content_bytes().map(|bytes| crc32fast::hash(&bytes)),
        _ => None,
    }
}

/// Builds the document for `root`, filling both indices.
pub(crate) fn walk(
    root: &dyn Reflect,
    builder: &mut AdapterBuilder,
    callbacks: &mut PathIndex<ChangeCallback>,
    containers: &mut PathIndex<ContainerEntry>,
    config: &AdapterConfig,
    generation: u64,
) -> Result<Node, BuilderError> {
    builder.begin_adapter();
    let mut walker = ReflectionWalker {
        root,
        builder,
        callbacks,
        containers,
        config,
        generation,
        suppressed: 0,
    };
    visit_instance(root, &mut walker);
    walker.builder.end_adapter();
    walker.builder.finish_and_take_result()
}

struct ReflectionWalker<'a> {
    root: &'a dyn Reflect,
    builder: &'a mut AdapterBuilder,
    callbacks: &'a mut PathIndex<ChangeCallback>,
    containers: &'a mut PathIndex<ContainerEntry>,
    config: &'a AdapterConfig,
    generation: u64,
    /// Open objects inside a hidden subtree.
    suppressed: usize,
}

impl ReadVisitor for ReflectionWalker<'_> {
    fn visit(&mut self, visit: Visit<'_>, access: &Access<'_>, attributes: &Attributes) {
        if self.suppressed > 0 {
            match visit {
                Visit::BeginObject => self.suppressed += 1,
                Visit::EndObject => self.suppressed -= 1,
                _ => {}
            }
            return;
        }

        match visit {
            Visit::BeginObject => self.begin_object(access, attributes),
            Visit::EndObject => self.end_object(attributes),
            Visit::Primitive(_) | Visit::String(_) => self.leaf(access, attributes),
            Visit::Enum(_) | Visit::Pointer | Visit::Buffer(_) | Visit::Asset(_) => {
                trace!(type_name = access.type_name(), address = %access.address(), "skipping value");
            }
        }
    }
}

impl ReflectionWalker<'_> {
    fn leaf(&mut self, access: &Access<'_>, attributes: &Attributes) {
        if attributes.visibility() != Visibility::Show {
            return;
        }
        self.builder.begin_row();
        self.label(attributes);
        self.key_editor(attributes);
        self.value_editor(access, attributes);
        self.element_controls(access, attributes);
        self.builder.end_row();
    }

    fn begin_object(&mut self, access: &Access<'_>, attributes: &Attributes) {
        match attributes.visibility() {
            Visibility::Hide => {
                self.suppressed = 1;
                return;
            }
            Visibility::ShowChildrenOnly => return,
            Visibility::Show => {}
        }

        self.builder.begin_row();
        for name in ROW_ATTRIBUTES {
            if let Some(value) = attributes.find(name) {
                self.builder.attribute(name, value.clone());
            }
        }

        if let Some(container) = access.as_container() {
            self.container_row(access, container, attributes);
        } else if access.is_opaque() {
            self.label(attributes);
            self.key_editor(attributes);
            self.value_editor(access, attributes);
            self.element_controls(access, attributes);
        } else {
            self.label(attributes);
            self.key_editor(attributes);
            self.element_controls(access, attributes);
        }
    }

    fn end_object(&mut self, attributes: &Attributes) {
        if attributes.visibility() == Visibility::Show {
            self.builder.end_row();
        }
    }

    fn container_row(&mut self, access: &Access<'_>, container: &dyn DataContainer, attributes: &Attributes) {
        let handle = attributes.container().cloned().unwrap_or_else(|| ContainerHandle {
            descriptor: container.descriptor(),
            instance: access.address().clone(),
        });
        let row_path = self.builder.current_path();
        let modifiable = !handle.descriptor.fixed_size
            && attributes.flag(names::CONTAINER_CAN_BE_MODIFIED).unwrap_or(true);
        self.containers
            .entry_or_insert_with(&row_path, ContainerEntry::default)
            .container = Some(BoundContainer::new(handle, self.generation));

        self.label(attributes);
        self.key_editor(attributes);
        let summary = match attributes.value_text() {
            Some(text) => Some(text.to_string()),
            None if self.config.element_count_labels => Some(element_count_text(container.len())),
            None => None,
        };
        if let Some(summary) = summary {
            self.builder.label(summary);
        }

        if modifiable {
            let disabled = attributes.is_disabled();
            let ancestor_disabled = attributes.is_ancestor_disabled();
            self.action_button(ContainerAction::AddElement, disabled, ancestor_disabled, None);
            self.action_button(ContainerAction::Clear, disabled || container.is_empty(), ancestor_disabled, None);
        }

        self.value_editor(access, attributes);
        self.element_controls(access, attributes);
    }

    fn label(&mut self, attributes: &Attributes) {
        if let Some(label) = attributes.label() {
            self.builder.label(label);
        }
    }

    fn value_editor(&mut self, access: &Access<'_>, attributes: &Attributes) {
        let editor_type = editor_kind(attributes.find(names::HANDLER), attributes.find(names::ENUM_TYPE));
        self.builder.begin_property_editor(editor_type, access.value().to_value());
        attributes.list_attributes(|group, name, value| {
            if group.is_empty() && !NOT_FORWARDED.contains(&name) {
                self.builder.attribute(name, value.clone());
            }
        });
        if self.config.hash_opaque_values {
            if let Some(hash) = opaque_hash(access.value()) {
                self.builder.attribute(attrs::VALUE_HASHED, hash);
            }
        }

        let path = self.builder.current_path();
        let callback = if is_editable(self.root, access.address()) {
            ChangeCallback::Store {
                address: access.address().clone(),
                generation: self.generation,
            }
        } else {
            ChangeCallback::ReadOnly {
                value: access.value().to_value(),
                generation: self.generation,
            }
        };
        self.callbacks.set(&path, callback);
        self.builder.end_property_editor();
    }

    fn key_editor(&mut self, attributes: &Attributes) {
        let Some(key) = attributes.key() else {
            return;
        };
        let editor_type = editor_kind(key.attributes.find(names::HANDLER), key.attributes.find(names::ENUM_TYPE));
        self.builder.begin_property_editor(editor_type, key.value.clone());
        self.builder.attribute(attrs::USE_MINIMUM_WIDTH, true);
        self.builder.attribute(attrs::DISABLED, true);

        let path = self.builder.current_path();
        self.callbacks.set(
            &path,
            ChangeCallback::ReadOnly {
                value: key.value.clone(),
                generation: self.generation,
            },
        );
        self.builder.end_property_editor();
    }

    /// Binds the current row as an element of its parent container and adds
    /// the element buttons the container allows.
    fn element_controls(&mut self, access: &Access<'_>, attributes: &Attributes) {
        let (Some(parent), Some(index)) = (attributes.parent_container(), attributes.container_index()) else {
            return;
        };
        let row_path = self.builder.current_path();
        let element = attributes
            .element_override()
            .unwrap_or_else(|| ElementId::at(access.value(), index));
        self.containers
            .entry_or_insert_with(&row_path, ContainerEntry::default)
            .element = Some(ContainerElement::new(parent.clone(), element, index, self.generation));

        if parent.descriptor.fixed_size || attributes.flag(names::PARENT_CONTAINER_CAN_BE_MODIFIED) == Some(false) {
            return;
        }
        let len = attributes.parent_container_len().unwrap_or(0);
        let ancestor_disabled = attributes.is_ancestor_disabled();
        if parent.descriptor.is_sequence() && len > 1 {
            self.action_button(ContainerAction::MoveUp, index == 0, ancestor_disabled, Some(index));
            self.action_button(ContainerAction::MoveDown, index + 1 == len, ancestor_disabled, Some(index));
        }
        self.action_button(ContainerAction::RemoveElement, false, ancestor_disabled, None);
    }

    fn action_button(&mut self, action: ContainerAction, disabled: bool, ancestor_disabled: bool, index: Option<usize>) {
        self.builder.begin_action_button();
        self.builder.attribute(attrs::SHARE_PRIOR_COLUMN, true);
        self.builder.attribute(attrs::USE_MINIMUM_WIDTH, true);
        self.builder.attribute(attrs::ALIGNMENT, Alignment::AlignRight);
        self.builder.attribute(attrs::ACTION, action);
        if disabled {
            self.builder.attribute(attrs::DISABLED, true);
        }
        if ancestor_disabled {
            self.builder.attribute(attrs::ANCESTOR_DISABLED, true);
        }
        if let Some(index) = index {
            self.builder.attribute(attrs::CONTAINER_INDEX, index);
        }
        self.builder.end_action_button();
    }
}

fn editor_kind<'v>(handler: Option<&'v Value>, enum_type: Option<&Value>) -> Option<&'v str> {
    match handler.and_then(Value::as_str) {
        Some(handler) => Some(handler),
        None if enum_type.is_some_and(|value| !value.is_null()) => Some(COMBO_BOX),
        None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path_index::PrefixMatch;
    use inspector_dom::{NodeKind, Path};
    use inspector_reflection::{reflect_struct, FieldAttributes, Opaque};
    use serde::{Deserialize, Serialize};
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
    struct Curve {
        points: Vec<f32>,
    }

    #[derive(Default)]
    struct Sample {
        speed: i32,
        mode: i64,
        hidden: String,
        scores: Vec<u8>,
        names: BTreeMap<String, bool>,
        curve: Opaque<Curve>,
    }

    reflect_struct! {
        Sample {
            speed => FieldAttributes::new().label("Speed").handler("SpinBox").with("Min", 0),
            mode => FieldAttributes::new().label("Mode").enum_type("Mode"),
            hidden => FieldAttributes::new().visibility(Visibility::Hide),
            scores => FieldAttributes::new().label("Scores").serialized_path("scores"),
            names => FieldAttributes::new().label("Names"),
            curve => FieldAttributes::new().label("Curve"),
        }
    }

    fn sample() -> Sample {
        Sample {
            speed: 3,
            mode: 1,
            hidden: "secret".into(),
            scores: vec![4, 5],
            names: BTreeMap::from([("a".to_string(), true)]),
            curve: Opaque(Curve { points: vec![0.5] }),
        }
    }

    struct Walked {
        document: Node,
        callbacks: PathIndex<ChangeCallback>,
        containers: PathIndex<ContainerEntry>,
    }

    fn walk_sample(value: &dyn Reflect, config: &AdapterConfig) -> Walked {
        let mut builder = AdapterBuilder::new();
        let mut callbacks = PathIndex::new();
        let mut containers = PathIndex::new();
        let document = walk(value, &mut builder, &mut callbacks, &mut containers, config, 7).unwrap();
        Walked {
            document,
            callbacks,
            containers,
        }
    }

    fn p(text: &str) -> Path {
        text.parse().unwrap()
    }

    #[test]
    fn test_leaf_rows() {
        let walked = walk_sample(&sample(), &AdapterConfig::default());
        let doc = &walked.document;

        // Hidden field contributes no row.
        assert_eq!(doc.children.len(), 5);

        let speed = doc.node_at(&p("/0")).unwrap();
        assert!(speed.is(NodeKind::Row));
        assert_eq!(speed.children[0].attribute("Value"), Some(&Value::from("Speed")));
        let editor = &speed.children[1];
        assert_eq!(editor.attribute("Type"), Some(&Value::from("SpinBox")));
        assert_eq!(editor.attribute("Value"), Some(&Value::Int(3)));
        assert_eq!(editor.attribute("Min"), Some(&Value::Int(0)));
        assert!(editor.attribute("Label").is_none());
        assert!(editor.attribute("Handler").is_none());

        let mode = doc.node_at(&p("/1/1")).unwrap();
        assert_eq!(mode.attribute("Type"), Some(&Value::from(COMBO_BOX)));
    }

    #[test]
    fn test_every_editor_has_callback() {
        let walked = walk_sample(&sample(), &AdapterConfig::default());
        let editors = walked.document.find_paths(|node| node.is(NodeKind::PropertyEditor));
        assert!(!editors.is_empty());
        for path in &editors {
            let callback = walked.callbacks.get(path, PrefixMatch::ExactPath);
            assert_eq!(callback.map(ChangeCallback::generation), Some(7), "{path}");
        }
        assert_eq!(walked.callbacks.len(), editors.len());
    }

    #[test]
    fn test_container_row_layout() {
        let walked = walk_sample(&sample(), &AdapterConfig::default());
        let scores = walked.document.node_at(&p("/2")).unwrap();

        let kinds: Vec<_> = scores.children.iter().map(|child| child.kind).collect();
        assert_eq!(
            kinds,
            vec![
                NodeKind::Label,
                NodeKind::Label,
                NodeKind::ActionButton,
                NodeKind::ActionButton,
                NodeKind::PropertyEditor,
                NodeKind::Row,
                NodeKind::Row,
            ]
        );
        assert_eq!(scores.children[1].attribute("Value"), Some(&Value::from("2 elements")));
        assert_eq!(scores.children[2].attribute("Action"), Some(&Value::from("AddElement")));
        assert_eq!(scores.children[4].attribute("SerializedPath"), Some(&Value::from("scores")));

        let entry = walked.containers.get(&p("/2"), PrefixMatch::ExactPath).unwrap();
        assert!(entry.container.is_some());
        assert!(entry.element.is_none());
    }

    #[test]
    fn test_sequence_element_buttons() {
        let walked = walk_sample(&sample(), &AdapterConfig::default());
        let first = walked.document.node_at(&p("/2/5")).unwrap();

        let actions: Vec<_> = first
            .children
            .iter()
            .filter_map(|child| child.attribute("Action").and_then(Value::as_str))
            .collect();
        assert_eq!(actions, vec!["MoveUp", "MoveDown", "RemoveElement"]);

        let move_up = &first.children[2];
        assert!(move_up.has_truthy("Disabled"));
        assert_eq!(move_up.attribute("ContainerIndex"), Some(&Value::Uint(0)));
        assert_eq!(move_up.attribute("Alignment"), Some(&Value::from("AlignRight")));
        assert!(!first.children[3].has_truthy("Disabled"));

        let entry = walked.containers.get(&p("/2/5"), PrefixMatch::ExactPath).unwrap();
        assert_eq!(entry.element.as_ref().map(ContainerElement::index), Some(0));
    }

    #[test]
    fn test_map_element_has_key_editor() {
        let walked = walk_sample(&sample(), &AdapterConfig::default());
        let element = walked.document.node_at(&p("/3/5")).unwrap();

        assert_eq!(element.children[0].attribute("Value"), Some(&Value::from("a")));
        let key = &element.children[1];
        assert!(key.is(NodeKind::PropertyEditor));
        assert!(key.has_truthy("Disabled"));
        assert!(key.has_truthy("UseMinimumWidth"));
        assert!(matches!(
            walked.callbacks.get(&p("/3/5/1"), PrefixMatch::ExactPath),
            Some(ChangeCallback::ReadOnly { .. })
        ));

        // Maps are unordered: no move buttons.
        let actions: Vec<_> = element
            .children
            .iter()
            .filter_map(|child| child.attribute("Action").and_then(Value::as_str))
            .collect();
        assert_eq!(actions, vec!["RemoveElement"]);
    }

    #[test]
    fn test_opaque_value_is_hashed() {
        let value = sample();
        let expected = crc32fast::hash(&serde_json::to_vec(&value.curve.0).unwrap());
        let walked = walk_sample(&value, &AdapterConfig::default());
        let editor = walked.document.node_at(&p("/4/1")).unwrap();
        assert_eq!(editor.attribute("ValueHashed"), Some(&Value::from(expected)));

        let config = AdapterConfig {
            hash_opaque_values: false,
            ..AdapterConfig::default()
        };
        let walked = walk_sample(&value, &config);
        assert!(walked.document.node_at(&p("/4/1")).unwrap().attribute("ValueHashed").is_none());
    }

    #[test]
    fn test_walk_is_deterministic() {
        let value = sample();
        let first = walk_sample(&value, &AdapterConfig::default());
        let second = walk_sample(&value, &AdapterConfig::default());
        assert_eq!(first.document, second.document);
    }

    #[test]
    fn test_invoke_stores_and_rejects() {
        let mut value = sample();
        let callback = ChangeCallback::Store {
            address: InstanceAddress::root().child(inspector_reflection::AccessStep::Field(0)),
            generation: 1,
        };

        let stored = callback.invoke(&mut value, &Value::Double(9.0));
        assert_eq!(
            stored,
            CallbackResult::Stored {
                value: Value::Int(9),
                hash: None,
                structural: false,
            }
        );
        assert_eq!(value.speed, 9);

        let rejected = callback.invoke(&mut value, &Value::from("fast"));
        assert!(matches!(rejected, CallbackResult::Rejected { previous: Some(Value::Int(9)), .. }));
        assert_eq!(value.speed, 9);
    }

    #[test]
    fn test_invoke_on_missing_address() {
        let mut value = sample();
        let gone = ChangeCallback::Store {
            address: InstanceAddress::root()
                .child(inspector_reflection::AccessStep::Field(3))
                .child(inspector_reflection::AccessStep::Element(9)),
            generation: 1,
        };
        assert!(matches!(
            gone.invoke(&mut value, &Value::Int(1)),
            CallbackResult::Rejected { previous: None, .. }
        ));

        let scores = ChangeCallback::Store {
            address: InstanceAddress::root().child(inspector_reflection::AccessStep::Field(3)),
            generation: 1,
        };
        let stored = scores.invoke(&mut value, &Value::Array(vec![Value::Int(1)]));
        assert!(matches!(stored, CallbackResult::Stored { structural: true, .. }));
        assert_eq!(value.scores, vec![1]);
    }

    #[test]
    fn test_set_members_get_read_only_editors() {
        let set = std::collections::BTreeSet::from(["a".to_string(), "b".to_string()]);
        let walked = walk_sample(&set, &AdapterConfig::default());
        let editors = walked.document.find_paths(|node| node.is(NodeKind::PropertyEditor));

        let read_only: Vec<_> = editors
            .iter()
            .filter(|path| {
                matches!(
                    walked.callbacks.get(path, PrefixMatch::ExactPath),
                    Some(ChangeCallback::ReadOnly { .. })
                )
            })
            .collect();
        assert_eq!(read_only.len(), 2);
        // The set's own editor still writes the whole set.
        assert_eq!(editors.len(), 3);
    }

    #[test]
    fn test_editor_kind() {
        let handler = Value::from("Slider");
        let enum_type = Value::from("Mode");
        assert_eq!(editor_kind(Some(&handler), Some(&enum_type)), Some("Slider"));
        assert_eq!(editor_kind(None, Some(&enum_type)), Some(COMBO_BOX));
        assert_eq!(editor_kind(None, Some(&Value::Null)), None);
        assert_eq!(editor_kind(None, None), None);
    }
}
