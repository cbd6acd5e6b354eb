//! # Inspector Reflection
//!
//! Runtime reflection for host object graphs.
//!
//! Types describe themselves through [`Reflect`]: a category ([`ReflectRef`]),
//! a conversion to and from document [`Value`](inspector_dom::Value)s, and for
//! composites a field list ([`Struct`]) or container surface ([`DataContainer`]).
//!
//! [`visit_instance`] walks a graph depth first and reports every value to a
//! [`ReadVisitor`] together with its [`Attributes`] and [`InstanceAddress`].
//! Addresses are re-resolved against the live graph whenever a later edit needs
//! to reach the same value again.
//!
//! ## Declaring a struct
//!
//! ```
//! use inspector_reflection::{reflect_struct, FieldAttributes, Reflect, ReflectRef};
//!
//! #[derive(Default)]
//! struct Light {
//!     intensity: f32,
//!     name: String,
//! }
//!
//! reflect_struct! {
//!     Light {
//!         intensity => FieldAttributes::new().label("Intensity"),
//!         name => FieldAttributes::new().label("Name"),
//!     }
//! }
//!
//! let light = Light::default();
//! assert!(matches!(light.reflect_ref(), ReflectRef::Object(_)));
//! ```

pub mod address;
pub mod attributes;
pub mod container;
pub mod error;
pub mod impls;
mod macros;
pub mod reflect;
pub mod visit;
pub mod wrappers;

pub use address::{is_editable, resolve, resolve_mut, AccessStep, InstanceAddress};
pub use attributes::{names, Attribute, Attributes, FieldAttributes, KeyEntry, Visibility};
pub use container::{
    ContainerDescriptor, ContainerHandle, ContainerKind, DataContainer, ElementId, Reservation,
};
pub use error::ReflectError;
pub use reflect::{
    FieldInfo, Primitive, Reflect, ReflectMut, ReflectRef, SharedObject, Struct,
};
pub use visit::{visit_instance, Access, ReadVisitor, Visit};
pub use wrappers::{AssetRef, Buffer, CappedVec, EnumValue, Opaque};

#[doc(hidden)]
pub use inspector_dom as __dom;

/// Wraps a value into the shared handle the adapter and its host both hold.
pub fn share<T: Reflect>(value: T) -> SharedObject {
    std::rc::Rc::new(std::cell::RefCell::new(value))
}
