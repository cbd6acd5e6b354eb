//! # Path Index
//!
//! A trie keyed by document [`Path`]s. The adapter keeps two of them, one for
//! change callbacks and one for container bindings, both rebuilt on every
//! document generation.
//!
//! ## Matching
//!
//! - [`PrefixMatch::ExactPath`]: only an entry stored at exactly this path.
//! - [`PrefixMatch::ParentsOnly`]: the entry at the nearest proper ancestor.
//! - [`PrefixMatch::PathAndParents`]: the exact entry if present, else the
//!   nearest ancestor.

use inspector_dom::{Path, PathEntry};
use std::collections::BTreeMap;
use std::ops::ControlFlow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixMatch {
    ExactPath,
    ParentsOnly,
    PathAndParents,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraversalOrder {
    MostSpecificFirst,
    LeastSpecificFirst,
}

#[derive(Debug)]
struct IndexNode<T> {
    value: Option<T>,
    children: BTreeMap<PathEntry, IndexNode<T>>,
}

impl<T> Default for IndexNode<T> {
    fn default() -> Self {
        Self {
            value: None,
            children: BTreeMap::new(),
        }
    }
}

#[derive(Debug)]
pub struct PathIndex<T> {
    root: IndexNode<T>,
    len: usize,
}

impl<T> Default for PathIndex<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathIndex<T> {
    pub fn new() -> Self {
        Self {
            root: IndexNode::default(),
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn clear(&mut self) {
        self.root = IndexNode::default();
        self.len = 0;
    }

    /// Stores `value` at `path`, returning the entry it replaced.
    pub fn set(&mut self, path: &Path, value: T) -> Option<T> {
        let mut node = &mut self.root;
        for entry in path.entries() {
            node = node.children.entry(entry.clone()).or_default();
        }
        let previous = node.value.replace(value);
        if previous.is_none() {
            self.len += 1;
        }
        previous
    }

    /// The entry at `path`, inserting `default()` first when none is stored.
    pub fn entry_or_insert_with(&mut self, path: &Path, default: impl FnOnce() -> T) -> &mut T {
        let mut node = &mut self.root;
        for entry in path.entries() {
            node = node.children.entry(entry.clone()).or_default();
        }
        if node.value.is_none() {
            self.len += 1;
        }
        node.value.get_or_insert_with(default)
    }

    pub fn remove(&mut self, path: &Path) -> Option<T> {
        let removed = self.node_mut(path.entries())?.value.take();
        if removed.is_some() {
            self.len -= 1;
        }
        removed
    }

    pub fn get(&self, path: &Path, matching: PrefixMatch) -> Option<&T> {
        let depth = self.match_depth(path, matching)?;
        self.node(&path.entries()[..depth])?.value.as_ref()
    }

    pub fn get_mut(&mut self, path: &Path, matching: PrefixMatch) -> Option<&mut T> {
        let depth = self.match_depth(path, matching)?;
        self.node_mut(&path.entries()[..depth])?.value.as_mut()
    }

    /// The path of the entry [`get`](Self::get) would return.
    pub fn matched_path(&self, path: &Path, matching: PrefixMatch) -> Option<Path> {
        let depth = self.match_depth(path, matching)?;
        Some(Path::new(path.entries()[..depth].to_vec()))
    }

    /// Visits the entries stored at prefixes of `path`. When
    /// `exclude_child_paths` is false, entries stored below `path` are visited
    /// too. The visitor stops the walk by returning `ControlFlow::Break`.
    pub fn visit_prefixes<F>(&self, path: &Path, order: TraversalOrder, exclude_child_paths: bool, mut visitor: F)
    where
        F: FnMut(&Path, &T) -> ControlFlow<()>,
    {
        let mut found: Vec<(Path, &T)> = Vec::new();
        let mut current = Path::root();
        let mut node = &self.root;
        let mut reached = true;

        if let Some(value) = &node.value {
            found.push((current.clone(), value));
        }
        for entry in path.entries() {
            match node.children.get(entry) {
                Some(child) => {
                    node = child;
                    current.push(entry.clone());
                    if let Some(value) = &node.value {
                        found.push((current.clone(), value));
                    }
                }
                None => {
                    reached = false;
                    break;
                }
            }
        }

        if reached && !exclude_child_paths {
            for (entry, child) in &node.children {
                collect_subtree(child, current.child(entry.clone()), &mut found);
            }
        }

        if order == TraversalOrder::MostSpecificFirst {
            found.reverse();
        }
        for (entry_path, value) in found {
            if visitor(&entry_path, value).is_break() {
                return;
            }
        }
    }

    /// Every stored value, in path order.
    pub fn values_mut(&mut self) -> Vec<&mut T> {
        fn collect<'a, T>(node: &'a mut IndexNode<T>, out: &mut Vec<&'a mut T>) {
            if let Some(value) = node.value.as_mut() {
                out.push(value);
            }
            for child in node.children.values_mut() {
                collect(child, out);
            }
        }
        let mut out = Vec::with_capacity(self.len);
        collect(&mut self.root, &mut out);
        out
    }

    fn match_depth(&self, path: &Path, matching: PrefixMatch) -> Option<usize> {
        let entries = path.entries();
        let mut node = &self.root;
        let mut found = None;

        for depth in 0..=entries.len() {
            if node.value.is_some() {
                let exact = depth == entries.len();
                match matching {
                    PrefixMatch::ExactPath if exact => found = Some(depth),
                    PrefixMatch::ParentsOnly if !exact => found = Some(depth),
                    PrefixMatch::PathAndParents => found = Some(depth),
                    _ => {}
                }
            }
            if depth == entries.len() {
                break;
            }
            match node.children.get(&entries[depth]) {
                Some(child) => node = child,
                None => break,
            }
        }
        found
    }

    fn node(&self, entries: &[PathEntry]) -> Option<&IndexNode<T>> {
        let mut node = &self.root;
        for entry in entries {
            node = node.children.get(entry)?;
        }
        Some(node)
    }

    fn node_mut(&mut self, entries: &[PathEntry]) -> Option<&mut IndexNode<T>> {
        let mut node = &mut self.root;
        for entry in entries {
            node = node.children.get_mut(entry)?;
        }
        Some(node)
    }
}

fn collect_subtree<'a, T>(node: &'a IndexNode<T>, path: Path, found: &mut Vec<(Path, &'a T)>) {
    if let Some(value) = &node.value {
        found.push((path.clone(), value));
    }
    for (entry, child) in &node.children {
        collect_subtree(child, path.child(entry.clone()), found);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(text: &str) -> Path {
        text.parse().unwrap()
    }

    fn sample() -> PathIndex<&'static str> {
        let mut index = PathIndex::new();
        index.set(&p("/1"), "container");
        index.set(&p("/1/2"), "element");
        index.set(&p("/1/2/0/3"), "nested");
        index
    }

    #[test]
    fn test_exact_lookup() {
        let index = sample();
        assert_eq!(index.get(&p("/1/2"), PrefixMatch::ExactPath), Some(&"element"));
        assert_eq!(index.get(&p("/1/2/0"), PrefixMatch::ExactPath), None);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_parents_only_skips_exact() {
        let index = sample();
        assert_eq!(index.get(&p("/1/2"), PrefixMatch::ParentsOnly), Some(&"container"));
        assert_eq!(index.get(&p("/1/2/5"), PrefixMatch::ParentsOnly), Some(&"element"));
        assert_eq!(index.get(&p("/1"), PrefixMatch::ParentsOnly), None);
        assert_eq!(index.matched_path(&p("/1/2/0/3/9"), PrefixMatch::ParentsOnly), Some(p("/1/2/0/3")));
    }

    #[test]
    fn test_path_and_parents() {
        let index = sample();
        assert_eq!(index.get(&p("/1/2"), PrefixMatch::PathAndParents), Some(&"element"));
        assert_eq!(index.get(&p("/1/7"), PrefixMatch::PathAndParents), Some(&"container"));
        assert_eq!(index.get(&p("/0"), PrefixMatch::PathAndParents), None);
    }

    #[test]
    fn test_set_overwrites_and_remove() {
        let mut index = sample();
        assert_eq!(index.set(&p("/1"), "replaced"), Some("container"));
        assert_eq!(index.len(), 3);
        assert_eq!(index.remove(&p("/1/2")), Some("element"));
        assert_eq!(index.len(), 2);
        assert_eq!(index.get(&p("/1/2/0/3"), PrefixMatch::ExactPath), Some(&"nested"));
    }

    #[test]
    fn test_entry_or_insert_with() {
        let mut index: PathIndex<Vec<u32>> = PathIndex::new();
        index.entry_or_insert_with(&p("/3"), Vec::new).push(1);
        index.entry_or_insert_with(&p("/3"), Vec::new).push(2);
        assert_eq!(index.len(), 1);
        assert_eq!(index.get(&p("/3"), PrefixMatch::ExactPath), Some(&vec![1, 2]));
    }

    #[test]
    fn test_visit_prefixes_orders() {
        let index = sample();
        let mut seen = Vec::new();
        index.visit_prefixes(&p("/1/2/0/3/4"), TraversalOrder::MostSpecificFirst, true, |path, value| {
            seen.push((path.to_string(), *value));
            ControlFlow::Continue(())
        });
        assert_eq!(
            seen,
            vec![
                ("/1/2/0/3".to_string(), "nested"),
                ("/1/2".to_string(), "element"),
                ("/1".to_string(), "container"),
            ]
        );

        let mut seen = Vec::new();
        index.visit_prefixes(&p("/1"), TraversalOrder::LeastSpecificFirst, false, |_, value| {
            seen.push(*value);
            ControlFlow::Continue(())
        });
        assert_eq!(seen, vec!["container", "element", "nested"]);
    }

    #[test]
    fn test_visit_prefixes_stops_early() {
        let index = sample();
        let mut seen = Vec::new();
        index.visit_prefixes(&p("/1/2/0/3"), TraversalOrder::MostSpecificFirst, true, |_, value| {
            seen.push(*value);
            ControlFlow::Break(())
        });
        assert_eq!(seen, vec!["nested"]);
    }

    #[test]
    fn test_clear_and_values_mut() {
        let mut index: PathIndex<u32> = PathIndex::new();
        index.set(&p("/0"), 1);
        index.set(&p("/0/1"), 2);
        for value in index.values_mut() {
            *value *= 10;
        }
        assert_eq!(index.get(&p("/0/1"), PrefixMatch::ExactPath), Some(&20));

        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.get(&p("/0"), PrefixMatch::ExactPath), None);
    }
}
