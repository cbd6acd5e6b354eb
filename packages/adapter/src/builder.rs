//! Stack-based document builder.
//!
//! Nodes are opened with `begin_*` and closed with the matching `end_*`.
//! [`AdapterBuilder::current_path`] is the document path of the innermost open
//! node, so index entries can be keyed at the moment a node is created.
//!
//! The first structural error is recorded and reported by
//! [`AdapterBuilder::finish_and_take_result`]; later calls keep going so a
//! walker does not need to check every step.

use crate::errors::BuilderError;
use crate::nodes::attrs;
use inspector_dom::{Node, NodeKind, Path, PathEntry, Value};

#[derive(Debug, Default)]
pub struct AdapterBuilder {
    stack: Vec<Node>,
    /// Child index of every open node below the root.
    indices: Vec<usize>,
    result: Option<Node>,
    error: Option<BuilderError>,
}

impl AdapterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin_adapter(&mut self) {
        if !self.stack.is_empty() || self.result.is_some() {
            self.record(BuilderError::Unbalanced {
                expected: NodeKind::Adapter,
                found: self.stack.last().map_or(NodeKind::Adapter, |node| node.kind),
            });
            return;
        }
        self.stack.push(Node::new(NodeKind::Adapter));
    }

    pub fn end_adapter(&mut self) {
        self.end_node(NodeKind::Adapter);
    }

    pub fn begin_row(&mut self) {
        self.begin_node(NodeKind::Row);
    }

    pub fn end_row(&mut self) {
        self.end_node(NodeKind::Row);
    }

    /// Opens a property editor showing `value`, typed when `editor_type` is set.
    pub fn begin_property_editor(&mut self, editor_type: Option<&str>, value: Value) {
        self.begin_node(NodeKind::PropertyEditor);
        if let Some(editor_type) = editor_type {
            self.attribute(attrs::TYPE, editor_type);
        }
        self.attribute(attrs::VALUE, value);
    }

    pub fn end_property_editor(&mut self) {
        self.end_node(NodeKind::PropertyEditor);
    }

    pub fn begin_action_button(&mut self) {
        self.begin_node(NodeKind::ActionButton);
    }

    pub fn end_action_button(&mut self) {
        self.end_node(NodeKind::ActionButton);
    }

    pub fn label(&mut self, text: impl Into<String>) {
        self.begin_node(NodeKind::Label);
        self.attribute(attrs::VALUE, Value::String(text.into()));
        self.end_node(NodeKind::Label);
    }

    /// Sets an attribute on the innermost open node.
    pub fn attribute(&mut self, name: &str, value: impl Into<Value>) {
        match self.stack.last_mut() {
            Some(node) => {
                node.set_attribute(name, value);
            }
            None => self.record(BuilderError::NoOpenNode("attribute")),
        }
    }

    pub fn current_path(&self) -> Path {
        self.indices.iter().copied().map(PathEntry::Index).collect()
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Returns the finished document and resets the builder.
    pub fn finish_and_take_result(&mut self) -> Result<Node, BuilderError> {
        let open = self.stack.len();
        let result = self.result.take();
        let error = self.error.take();
        self.stack.clear();
        self.indices.clear();

        if let Some(error) = error {
            return Err(error);
        }
        if open > 0 {
            return Err(BuilderError::UnclosedNodes(open));
        }
        result.ok_or(BuilderError::NoResult)
    }

    fn begin_node(&mut self, kind: NodeKind) {
        let Some(parent) = self.stack.last() else {
            self.record(BuilderError::NoOpenNode(kind.name()));
            return;
        };
        self.indices.push(parent.children.len());
        self.stack.push(Node::new(kind));
    }

    fn end_node(&mut self, kind: NodeKind) {
        let Some(node) = self.stack.pop() else {
            self.record(BuilderError::NoOpenNode(kind.name()));
            return;
        };
        if node.kind != kind {
            self.record(BuilderError::Unbalanced {
                expected: node.kind,
                found: kind,
            });
        }
        match self.stack.last_mut() {
            Some(parent) => {
                self.indices.pop();
                parent.children.push(node);
            }
            None => self.result = Some(node),
        }
    }

    fn record(&mut self, error: BuilderError) {
        if self.error.is_none() {
            self.error = Some(error);
        }
    }
}
