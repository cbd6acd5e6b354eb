//! Structural diff between two documents.
//!
//! Produces a [`Patch`] that turns `old` into `new` when applied. Nodes are
//! compared position by position; a kind change replaces the whole subtree.

use crate::node::Node;
use crate::patch::{Patch, PatchOperation};
use crate::path::Path;
use crate::value::Value;

pub fn diff(old: &Node, new: &Node) -> Patch {
    let mut patch = Patch::new();
    diff_node(old, new, &mut Path::root(), &mut patch);
    patch
}

fn diff_node(old: &Node, new: &Node, path: &mut Path, patch: &mut Patch) {
    if old.kind != new.kind {
        patch.push(PatchOperation::replace(path.clone(), Value::Node(new.clone())));
        return;
    }

    diff_attributes(old, new, path, patch);

    let shared = old.children.len().min(new.children.len());
    for index in 0..shared {
        path.push(index);
        diff_node(&old.children[index], &new.children[index], path, patch);
        path.pop();
    }

    // Trailing removals go last-to-first so earlier indices stay valid.
    for index in (shared..old.children.len()).rev() {
        patch.push(PatchOperation::remove(path.child(index)));
    }
    for (index, child) in new.children.iter().enumerate().skip(shared) {
        patch.push(PatchOperation::add(path.child(index), Value::Node(child.clone())));
    }
}

fn diff_attributes(old: &Node, new: &Node, path: &Path, patch: &mut Patch) {
    for name in old.attributes.keys() {
        if !new.attributes.contains_key(name) {
            patch.push(PatchOperation::remove(path.child(name.as_str())));
        }
    }
    for (name, value) in &new.attributes {
        match old.attributes.get(name) {
            Some(previous) if previous == value => {}
            Some(_) => patch.push(PatchOperation::replace(path.child(name.as_str()), value.clone())),
            None => patch.push(PatchOperation::add(path.child(name.as_str()), value.clone())),
        }
    }
}
