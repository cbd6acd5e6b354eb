//! # Disabled-State Cascade
//!
//! Toggling `Disabled` on a node marks or unmarks `AncestorDisabled` on its
//! descendants. A Row never carries either flag itself: toggling a Row applies
//! `Disabled` to its direct non-Row children instead.
//!
//! Propagation stops below any descendant that carries its own `Disabled`;
//! that subtree is governed by its own flag. The descendant itself still
//! receives `AncestorDisabled`.
//!
//! Only operations that change something are emitted, so repeating a toggle
//! yields an empty patch.

use crate::nodes::attrs;
use inspector_dom::{Node, NodeKind, Patch, PatchOperation, Path, Value};

pub fn compute_disabled_patch(target: &Node, target_path: &Path, disable: bool) -> Patch {
    let mut patch = Patch::new();
    let mut worklist: Vec<(Path, &Node)> = Vec::new();

    if target.is(NodeKind::Row) {
        let mut direct = Vec::with_capacity(target.children.len());
        for (index, child) in target.children.iter().enumerate() {
            let child_path = target_path / index;
            if !child.is(NodeKind::Row) {
                toggle(&mut patch, child, &child_path, attrs::DISABLED, disable);
            }
            direct.push((child_path, child));
        }
        // Queued last-to-first so the worklist pops in document order.
        for (child_path, child) in direct.iter().rev() {
            queue_children(&mut worklist, *child, child_path);
        }
    } else {
        toggle(&mut patch, target, target_path, attrs::DISABLED, disable);
        queue_children(&mut worklist, target, target_path);
    }

    while let Some((path, node)) = worklist.pop() {
        if !node.is(NodeKind::Row) {
            toggle(&mut patch, node, &path, attrs::ANCESTOR_DISABLED, disable);
        }
        if !node.has_truthy(attrs::DISABLED) {
            queue_children(&mut worklist, node, &path);
        }
    }

    patch
}

fn queue_children<'a>(worklist: &mut Vec<(Path, &'a Node)>, parent: &'a Node, parent_path: &Path) {
    for (index, child) in parent.children.iter().enumerate().rev() {
        worklist.push((parent_path / index, child));
    }
}

fn toggle(patch: &mut Patch, node: &Node, path: &Path, name: &str, set: bool) {
    let present = node.has_truthy(name);
    if set && !present {
        patch.push(PatchOperation::add(path / name, Value::Bool(true)));
    } else if !set && present {
        patch.push(PatchOperation::remove(path / name));
    }
}
