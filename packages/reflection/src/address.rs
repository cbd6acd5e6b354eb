//! Addresses of values inside an object graph.
//!
//! An [`InstanceAddress`] records how a value was reached from the root: which
//! field of a struct, which element of a container, or through a pointer. It is
//! resolved again against the live graph every time it is used, so it never
//! holds a borrow.

use crate::reflect::{Reflect, ReflectMut, ReflectRef};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessStep {
    Field(usize),
    Element(usize),
    Pointee,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct InstanceAddress(Vec<AccessStep>);

impl InstanceAddress {
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn steps(&self) -> &[AccessStep] {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn child(&self, step: AccessStep) -> Self {
        let mut steps = self.0.clone();
        steps.push(step);
        Self(steps)
    }
}

impl fmt::Display for InstanceAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "$")?;
        for step in &self.0 {
            match step {
                AccessStep::Field(index) => write!(f, ".{index}")?,
                AccessStep::Element(index) => write!(f, "[{index}]")?,
                AccessStep::Pointee => write!(f, "*")?,
            }
        }
        Ok(())
    }
}

pub fn resolve<'a>(root: &'a dyn Reflect, address: &InstanceAddress) -> Option<&'a dyn Reflect> {
    let mut current = root;
    for step in address.steps() {
        current = match (step, current.reflect_ref()) {
            (AccessStep::Field(index), ReflectRef::Object(object)) => object.field(*index)?,
            (AccessStep::Element(index), ReflectRef::Container(container)) => container.element(*index)?,
            (AccessStep::Pointee, ReflectRef::Pointer(Some(target))) => target,
            _ => return None,
        };
    }
    Some(current)
}

/// Whether [`resolve_mut`] can reach `address`: it resolves, and no container
/// on the way withholds its elements.
pub fn is_editable(root: &dyn Reflect, address: &InstanceAddress) -> bool {
    let mut current = root;
    for step in address.steps() {
        let next = match (step, current.reflect_ref()) {
            (AccessStep::Field(index), ReflectRef::Object(object)) => object.field(*index),
            (AccessStep::Element(index), ReflectRef::Container(container)) if container.elements_editable() => {
                container.element(*index)
            }
            (AccessStep::Pointee, ReflectRef::Pointer(Some(target))) => Some(target),
            _ => None,
        };
        match next {
            Some(next) => current = next,
            None => return false,
        }
    }
    true
}

pub fn resolve_mut<'a>(root: &'a mut dyn Reflect, address: &InstanceAddress) -> Option<&'a mut dyn Reflect> {
    let mut current = root;
    for step in address.steps() {
        current = match (step, current.reflect_mut()) {
            (AccessStep::Field(index), ReflectMut::Object(object)) => object.field_mut(*index)?,
            (AccessStep::Element(index), ReflectMut::Container(container)) => {
                container.element_mut(*index)?
            }
            (AccessStep::Pointee, ReflectMut::Pointer(Some(target))) => target,
            _ => return None,
        };
    }
    Some(current)
}
