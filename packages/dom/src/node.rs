//! Document nodes.
//!
//! A node has a kind, ordered attributes, and ordered children. Builder style
//! helpers (`with_attr`, `with_child`) are provided for constructing trees in
//! tests and fixtures.

use crate::path::{Path, PathEntry};
use crate::value::Value;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Node kinds understood by property views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    /// Document root.
    Adapter,
    /// One property line. Rows nest.
    Row,
    Label,
    PropertyEditor,
    /// A property editor specialized to a clickable action.
    ActionButton,
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Adapter => "Adapter",
            NodeKind::Row => "Row",
            NodeKind::Label => "Label",
            NodeKind::PropertyEditor => "PropertyEditor",
            NodeKind::ActionButton => "ActionButton",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "Adapter" => Some(NodeKind::Adapter),
            "Row" => Some(NodeKind::Row),
            "Label" => Some(NodeKind::Label),
            "PropertyEditor" => Some(NodeKind::PropertyEditor),
            "ActionButton" => Some(NodeKind::ActionButton),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            attributes: IndexMap::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn is(&self, kind: NodeKind) -> bool {
        self.kind == kind
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// True when the attribute is present and set to `true`.
    pub fn has_truthy(&self, name: &str) -> bool {
        self.attributes.get(name).is_some_and(Value::is_truthy)
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes.insert(name.into(), value.into())
    }

    /// Removes an attribute, keeping the order of the remaining ones.
    pub fn remove_attribute(&mut self, name: &str) -> Option<Value> {
        self.attributes.shift_remove(name)
    }

    pub fn child(&self, index: usize) -> Option<&Node> {
        self.children.get(index)
    }

    /// Walks index entries from this node. Any key entry fails the lookup.
    pub fn node_at(&self, path: &Path) -> Option<&Node> {
        let mut current = self;
        for entry in path.entries() {
            match entry {
                PathEntry::Index(index) => current = current.children.get(*index)?,
                PathEntry::Key(_) => return None,
            }
        }
        Some(current)
    }

    pub fn node_at_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let mut current = self;
        for entry in path.entries() {
            match entry {
                PathEntry::Index(index) => current = current.children.get_mut(*index)?,
                PathEntry::Key(_) => return None,
            }
        }
        Some(current)
    }

    /// Resolves a path whose last entry names an attribute.
    pub fn attribute_at(&self, path: &Path) -> Option<&Value> {
        let (node_path, name) = path.split_attribute()?;
        self.node_at(&node_path)?.attribute(name)
    }

    /// Pre-order walk over this node and every descendant.
    pub fn visit(&self, visitor: &mut dyn FnMut(&Path, &Node)) {
        fn walk(node: &Node, path: &mut Path, visitor: &mut dyn FnMut(&Path, &Node)) {
            visitor(path, node);
            for (index, child) in node.children.iter().enumerate() {
                path.push(index);
                walk(child, path, visitor);
                path.pop();
            }
        }
        walk(self, &mut Path::root(), visitor);
    }

    /// Collects the paths of all nodes matching `predicate`, in document order.
    pub fn find_paths(&self, predicate: impl Fn(&Node) -> bool) -> Vec<Path> {
        let mut found = Vec::new();
        self.visit(&mut |path, node| {
            if predicate(node) {
                found.push(path.clone());
            }
        });
        found
    }
}
