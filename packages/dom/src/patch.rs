//! Document patches.
//!
//! A [`Patch`] is an ordered list of add, remove, and replace operations. Paths
//! made only of indices address nodes; a path ending in a key addresses an
//! attribute of the node before it.

use crate::node::Node;
use crate::path::{Path, PathEntry};
use crate::value::Value;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum PatchError {
    #[error("No node or attribute at {0}")]
    PathNotFound(Path),

    #[error("{0} does not address a node or attribute")]
    InvalidTarget(Path),

    #[error("Value written to {0} must be a node")]
    InvalidValue(Path),

    #[error("Child index out of range at {0}")]
    IndexOutOfRange(Path),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum PatchOperation {
    Add { path: Path, value: Value },
    Remove { path: Path },
    Replace { path: Path, value: Value },
}

impl PatchOperation {
    pub fn add(path: Path, value: impl Into<Value>) -> Self {
        PatchOperation::Add {
            path,
            value: value.into(),
        }
    }

    pub fn remove(path: Path) -> Self {
        PatchOperation::Remove { path }
    }

    pub fn replace(path: Path, value: impl Into<Value>) -> Self {
        PatchOperation::Replace {
            path,
            value: value.into(),
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            PatchOperation::Add { path, .. }
            | PatchOperation::Remove { path }
            | PatchOperation::Replace { path, .. } => path,
        }
    }

    /// Applies this operation in place. On error the document may be left
    /// partially modified only for this one operation; see [`Patch::apply`].
    pub fn apply(&self, root: &mut Node) -> Result<(), PatchError> {
        let path = self.path();
        match path.split_attribute() {
            Some((node_path, name)) => self.apply_to_attribute(root, &node_path, name),
            None if path.is_node_path() => self.apply_to_node(root),
            None => Err(PatchError::InvalidTarget(path.clone())),
        }
    }

    fn apply_to_attribute(&self, root: &mut Node, node_path: &Path, name: &str) -> Result<(), PatchError> {
        let path = self.path();
        if !node_path.is_node_path() {
            return Err(PatchError::InvalidTarget(path.clone()));
        }
        let node = root
            .node_at_mut(node_path)
            .ok_or_else(|| PatchError::PathNotFound(path.clone()))?;

        match self {
            PatchOperation::Add { value, .. } => {
                node.set_attribute(name, value.clone());
            }
            PatchOperation::Replace { value, .. } => {
                let slot = node
                    .attributes
                    .get_mut(name)
                    .ok_or_else(|| PatchError::PathNotFound(path.clone()))?;
                *slot = value.clone();
            }
            PatchOperation::Remove { .. } => {
                node.remove_attribute(name)
                    .ok_or_else(|| PatchError::PathNotFound(path.clone()))?;
            }
        }
        Ok(())
    }

    fn apply_to_node(&self, root: &mut Node) -> Result<(), PatchError> {
        let path = self.path();
        let Some((last, parent_entries)) = path.entries().split_last() else {
            // The root itself can be replaced but never removed.
            return match self {
                PatchOperation::Add { value, .. } | PatchOperation::Replace { value, .. } => {
                    *root = node_value(value, path)?;
                    Ok(())
                }
                PatchOperation::Remove { .. } => Err(PatchError::InvalidTarget(path.clone())),
            };
        };
        let index = match last {
            PathEntry::Index(index) => *index,
            PathEntry::Key(_) => return Err(PatchError::InvalidTarget(path.clone())),
        };
        let parent = root
            .node_at_mut(&Path::new(parent_entries.to_vec()))
            .ok_or_else(|| PatchError::PathNotFound(path.clone()))?;

        match self {
            PatchOperation::Add { value, .. } => {
                if index > parent.children.len() {
                    return Err(PatchError::IndexOutOfRange(path.clone()));
                }
                parent.children.insert(index, node_value(value, path)?);
            }
            PatchOperation::Replace { value, .. } => {
                let slot = parent
                    .children
                    .get_mut(index)
                    .ok_or_else(|| PatchError::IndexOutOfRange(path.clone()))?;
                *slot = node_value(value, path)?;
            }
            PatchOperation::Remove { .. } => {
                if index >= parent.children.len() {
                    return Err(PatchError::IndexOutOfRange(path.clone()));
                }
                parent.children.remove(index);
            }
        }
        Ok(())
    }
}

fn node_value(value: &Value, path: &Path) -> Result<Node, PatchError> {
    value
        .as_node()
        .cloned()
        .ok_or_else(|| PatchError::InvalidValue(path.clone()))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Patch {
    operations: Vec<PatchOperation>,
}

impl Patch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, operation: PatchOperation) {
        self.operations.push(operation);
    }

    pub fn operations(&self) -> &[PatchOperation] {
        &self.operations
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatchOperation> {
        self.operations.iter()
    }

    /// Applies every operation in order. Either all of them land or the
    /// document is left exactly as it was.
    pub fn apply(&self, root: &mut Node) -> Result<(), PatchError> {
        let snapshot = root.clone();
        for operation in &self.operations {
            if let Err(error) = operation.apply(root) {
                *root = snapshot;
                return Err(error);
            }
        }
        Ok(())
    }
}

impl From<Vec<PatchOperation>> for Patch {
    fn from(operations: Vec<PatchOperation>) -> Self {
        Self { operations }
    }
}

impl FromIterator<PatchOperation> for Patch {
    fn from_iter<I: IntoIterator<Item = PatchOperation>>(iter: I) -> Self {
        Self {
            operations: iter.into_iter().collect(),
        }
    }
}

impl Extend<PatchOperation> for Patch {
    fn extend<I: IntoIterator<Item = PatchOperation>>(&mut self, iter: I) {
        self.operations.extend(iter);
    }
}

impl IntoIterator for Patch {
    type Item = PatchOperation;
    type IntoIter = std::vec::IntoIter<PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.into_iter()
    }
}

impl<'a> IntoIterator for &'a Patch {
    type Item = &'a PatchOperation;
    type IntoIter = std::slice::Iter<'a, PatchOperation>;

    fn into_iter(self) -> Self::IntoIter {
        self.operations.iter()
    }
}
