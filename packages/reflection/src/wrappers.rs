//! Wrapper types for value categories that have no natural std form.

use crate::container::{ContainerDescriptor, DataContainer, ElementId, Reservation};
use crate::error::ReflectError;
use crate::impls::position_in;
use crate::reflect::{Reflect, ReflectMut, ReflectRef};
use inspector_dom::Value;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// A serde value shown as a single opaque editor. Its content bytes are the
/// JSON encoding, so equal contents hash equally.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Opaque<T>(pub T);

impl<T> Reflect for Opaque<T>
where
    T: Serialize + DeserializeOwned + 'static,
{
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Opaque
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Leaf
    }

    fn to_value(&self) -> Value {
        serde_json::to_value(&self.0)
            .map(Value::from)
            .unwrap_or(Value::Null)
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        let parsed = serde_json::from_value::<T>(serde_json::Value::from(value))
            .map_err(|_| ReflectError::conversion::<T>(value))?;
        self.0 = parsed;
        Ok(())
    }

    fn content_bytes(&self) -> Option<Vec<u8>> {
        serde_json::to_vec(&self.0).ok()
    }
}

/// A growable sequence with a hard upper bound on its length.
#[derive(Debug, Clone, PartialEq)]
pub struct CappedVec<T> {
    items: Vec<T>,
    capacity: usize,
}

impl<T> CappedVec<T> {
    pub fn new(capacity: usize) -> Self {
        Self {
            items: Vec::new(),
            capacity,
        }
    }

    /// Keeps at most `capacity` of `items`.
    pub fn from_vec(mut items: Vec<T>, capacity: usize) -> Self {
        items.truncate(capacity);
        Self { items, capacity }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn is_full(&self) -> bool {
        self.items.len() >= self.capacity
    }

    /// Hands the item back when full.
    pub fn push(&mut self, item: T) -> Result<(), T> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push(item);
        Ok(())
    }

    pub fn into_vec(self) -> Vec<T> {
        self.items
    }
}

impl<T> Deref for CappedVec<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.items
    }
}

impl<T: Reflect + Default> Reflect for CappedVec<T> {
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Container(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Container(self)
    }

    fn to_value(&self) -> Value {
        self.items.to_value()
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        let mut items: Vec<T> = Vec::new();
        items.apply_value(value)?;
        if items.len() > self.capacity {
            return Err(ReflectError::AtCapacity(std::any::type_name::<Self>()));
        }
        self.items = items;
        Ok(())
    }
}

impl<T: Reflect + Default> DataContainer for CappedVec<T> {
    fn descriptor(&self) -> ContainerDescriptor {
        ContainerDescriptor::sequence(std::any::type_name::<Self>()).with_capacity(self.capacity)
    }

    fn len(&self) -> usize {
        self.items.len()
    }

    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.items.get(index).map(|item| item as &dyn Reflect)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.items.get_mut(index).map(|item| item as &mut dyn Reflect)
    }

    fn clear(&mut self) -> Result<(), ReflectError> {
        self.items.clear();
        Ok(())
    }

    fn reserve_element(&self) -> Reservation {
        Reservation::new(std::any::type_name::<Self>(), Box::new(T::default()))
    }

    fn store_element(&mut self, mut reservation: Reservation) -> Result<(), ReflectError> {
        if self.is_full() {
            reservation.release();
            return Err(ReflectError::AtCapacity(std::any::type_name::<Self>()));
        }
        self.items.push(reservation.take_element::<T>()?);
        Ok(())
    }

    fn remove_element(&mut self, element: ElementId) -> Result<(), ReflectError> {
        let index = position_in(&self.items, element)
            .ok_or(ReflectError::ElementNotFound(std::any::type_name::<Self>()))?;
        self.items.remove(index);
        Ok(())
    }

    fn swap_elements(&mut self, first: usize, second: usize) -> Result<(), ReflectError> {
        self.items.swap_elements(first, second)
    }
}

/// Raw bytes. Not editable through a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Buffer(pub Vec<u8>);

impl Reflect for Buffer {
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Buffer(&self.0)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Leaf
    }

    fn to_value(&self) -> Value {
        Value::Array(self.0.iter().map(|byte| Value::Uint(u64::from(*byte))).collect())
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.apply_value(value)?;
        self.0 = bytes;
        Ok(())
    }

    fn content_bytes(&self) -> Option<Vec<u8>> {
        Some(self.0.clone())
    }
}

/// Reference to an external asset by id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: String,
    #[serde(default)]
    pub hint: String,
}

impl Reflect for AssetRef {
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Asset(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Leaf
    }

    fn to_value(&self) -> Value {
        Value::String(self.id.clone())
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        let id = value
            .as_str()
            .ok_or_else(|| ReflectError::conversion::<AssetRef>(value))?;
        self.id = id.to_string();
        Ok(())
    }
}

/// An enumeration reflected by its underlying integer value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EnumValue {
    pub value: i64,
}

impl Reflect for EnumValue {
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Enum(self.value)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Leaf
    }

    fn to_value(&self) -> Value {
        Value::Int(self.value)
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        self.value = value
            .as_i64()
            .ok_or_else(|| ReflectError::conversion::<EnumValue>(value))?;
        Ok(())
    }
}
