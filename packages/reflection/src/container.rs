//! The container surface.
//!
//! Containers expose their elements by index and support a two-phase insert:
//! [`DataContainer::reserve_element`] hands out a [`Reservation`] holding a
//! default element (and for keyed containers a default key), which is later
//! either stored or freed. Associative containers bind the key in between with
//! [`DataContainer::set_element_key`].

use crate::address::InstanceAddress;
use crate::error::ReflectError;
use crate::reflect::{Reflect, SharedObject};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Sequence,
    Associative,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerDescriptor {
    pub type_name: &'static str,
    pub kind: ContainerKind,
    /// Elements can be neither added nor removed.
    pub fixed_size: bool,
    /// Upper bound on the element count, when there is one.
    pub capacity: Option<usize>,
    /// Type name of the key for keyed associative containers.
    pub key_type: Option<&'static str>,
}

impl ContainerDescriptor {
    pub fn sequence(type_name: &'static str) -> Self {
        Self {
            type_name,
            kind: ContainerKind::Sequence,
            fixed_size: false,
            capacity: None,
            key_type: None,
        }
    }

    pub fn associative(type_name: &'static str, key_type: Option<&'static str>) -> Self {
        Self {
            type_name,
            kind: ContainerKind::Associative,
            fixed_size: false,
            capacity: None,
            key_type,
        }
    }

    pub fn with_fixed_size(mut self) -> Self {
        self.fixed_size = true;
        self
    }

    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = Some(capacity);
        self
    }

    pub fn is_sequence(&self) -> bool {
        self.kind == ContainerKind::Sequence
    }

    pub fn is_associative(&self) -> bool {
        self.kind == ContainerKind::Associative
    }

    pub fn has_fixed_capacity(&self) -> bool {
        self.capacity.is_some()
    }
}

/// Identifies one container instance inside an object graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHandle {
    pub descriptor: ContainerDescriptor,
    pub instance: InstanceAddress,
}

impl ContainerHandle {
    pub fn same_container(&self, other: &ContainerHandle) -> bool {
        self.instance == other.instance && self.descriptor.type_name == other.descriptor.type_name
    }
}

/// Identity of an element, derived from its address in memory. Only meaningful
/// until the owning container next changes.
///
/// Zero-sized elements share one address, so they are identified by their
/// index instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementId {
    Address(usize),
    Index(usize),
}

impl ElementId {
    pub fn at(element: &dyn Reflect, index: usize) -> Self {
        if std::mem::size_of_val(element) == 0 {
            ElementId::Index(index)
        } else {
            ElementId::Address(element as *const dyn Reflect as *const () as usize)
        }
    }
}

/// A pending element. Must end in either [`DataContainer::store_element`] or
/// [`DataContainer::free_reserved_element`]; dropping it otherwise logs a leak.
pub struct Reservation {
    container: &'static str,
    element: Option<Box<dyn Reflect>>,
    key: Option<SharedObject>,
    bound_key: Option<Box<dyn Reflect>>,
}

impl Reservation {
    pub fn new(container: &'static str, element: Box<dyn Reflect>) -> Self {
        Self {
            container,
            element: Some(element),
            key: None,
            bound_key: None,
        }
    }

    /// Attaches the default key an editor can fill in before the key is bound.
    pub fn with_key(mut self, key: SharedObject) -> Self {
        self.key = Some(key);
        self
    }

    pub fn container(&self) -> &'static str {
        self.container
    }

    pub fn key_object(&self) -> Option<&SharedObject> {
        self.key.as_ref()
    }

    pub fn element(&self) -> Option<&dyn Reflect> {
        self.element.as_deref()
    }

    pub fn is_key_bound(&self) -> bool {
        self.bound_key.is_some()
    }

    pub fn bind_key(&mut self, key: Box<dyn Reflect>) {
        self.bound_key = Some(key);
    }

    pub fn take_element<T: Reflect>(&mut self) -> Result<T, ReflectError> {
        let element = self
            .element
            .take()
            .ok_or(ReflectError::MissingElement(self.container))?;
        downcast_box(element, self.container)
    }

    pub fn take_key<K: Reflect>(&mut self) -> Result<K, ReflectError> {
        let key = self
            .bound_key
            .take()
            .ok_or(ReflectError::MissingKey(self.container))?;
        downcast_box(key, self.container)
    }

    /// Discards the pending element without storing it.
    pub fn release(mut self) {
        self.element = None;
        self.bound_key = None;
    }
}

fn downcast_box<T: Reflect>(value: Box<dyn Reflect>, container: &'static str) -> Result<T, ReflectError> {
    value
        .into_any()
        .downcast::<T>()
        .map(|boxed| *boxed)
        .map_err(|_| ReflectError::TypeMismatch {
            expected: std::any::type_name::<T>(),
            found: container,
        })
}

impl Drop for Reservation {
    fn drop(&mut self) {
        if self.element.is_some() {
            warn!(
                container = self.container,
                "reserved element dropped without being stored or freed"
            );
        }
    }
}

impl std::fmt::Debug for Reservation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reservation")
            .field("container", &self.container)
            .field("pending", &self.element.is_some())
            .field("has_key", &self.key.is_some())
            .field("key_bound", &self.bound_key.is_some())
            .finish()
    }
}

pub trait DataContainer {
    fn descriptor(&self) -> ContainerDescriptor;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn element(&self, index: usize) -> Option<&dyn Reflect>;

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    /// Whether [`element_mut`](Self::element_mut) hands out elements. Sets
    /// answer `false`: their members are their own keys.
    fn elements_editable(&self) -> bool {
        true
    }

    /// Key of the element at `index`, for associative containers.
    fn element_key(&self, _index: usize) -> Option<inspector_dom::Value> {
        None
    }

    fn clear(&mut self) -> Result<(), ReflectError>;

    fn reserve_element(&self) -> Reservation;

    fn set_element_key(&self, _reservation: &mut Reservation, _key: &dyn Reflect) -> Result<(), ReflectError> {
        Err(ReflectError::NotAssociative(self.descriptor().type_name))
    }

    /// Stores a reserved element. The reservation is consumed either way.
    fn store_element(&mut self, reservation: Reservation) -> Result<(), ReflectError>;

    fn free_reserved_element(&mut self, reservation: Reservation) {
        reservation.release();
    }

    fn remove_element(&mut self, element: ElementId) -> Result<(), ReflectError>;

    fn swap_elements(&mut self, first: usize, second: usize) -> Result<(), ReflectError>;

    fn position_of(&self, element: ElementId) -> Option<usize> {
        (0..self.len()).find(|&index| self.element(index).map(|item| ElementId::at(item, index)) == Some(element))
    }
}
