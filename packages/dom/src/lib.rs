//! # Inspector DOM
//!
//! The property document tree shared between an adapter and its views.
//!
//! A document is a tree of typed [`Node`]s carrying ordered attributes. Nodes are
//! addressed with a [`Path`] of child indices, optionally ending in an attribute
//! name, and edited through JSON-patch style [`Patch`]es.
//!
//! ## Example
//!
//! ```
//! use inspector_dom::{Node, NodeKind, Patch, PatchOperation, Path, Value};
//!
//! let mut doc = Node::new(NodeKind::Adapter)
//!     .with_child(Node::new(NodeKind::Row).with_child(
//!         Node::new(NodeKind::PropertyEditor).with_attr("Value", 3),
//!     ));
//!
//! let patch = Patch::from(vec![PatchOperation::replace(
//!     Path::root() / 0 / 0 / "Value",
//!     Value::Int(4),
//! )]);
//! patch.apply(&mut doc).unwrap();
//!
//! assert_eq!(
//!     doc.attribute_at(&"/0/0/Value".parse().unwrap()),
//!     Some(&Value::Int(4))
//! );
//! ```

pub mod diff;
pub mod node;
pub mod patch;
pub mod path;
pub mod value;

pub use diff::diff;
pub use node::{Node, NodeKind};
pub use patch::{Patch, PatchError, PatchOperation};
pub use path::{Path, PathEntry, PathParseError};
pub use value::{Object, Value};

/// A full property document. The root is always an `Adapter` node.
pub type Document = Node;
