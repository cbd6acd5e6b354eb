//! [`Reflect`] for standard library types.

use crate::container::{ContainerDescriptor, DataContainer, ElementId, Reservation};
use crate::error::ReflectError;
use crate::reflect::{Primitive, Reflect, ReflectMut, ReflectRef, SharedObject};
use inspector_dom::Value;
use std::cell::RefCell;
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

macro_rules! impl_reflect_int {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                crate::__reflect_any_methods!();

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Primitive(Primitive::$variant(*self))
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::Leaf
                }

                fn to_value(&self) -> Value {
                    Primitive::$variant(*self).to_value()
                }

                fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
                    let converted = match value {
                        Value::Int(i) => <$ty>::try_from(*i).ok(),
                        Value::Uint(u) => <$ty>::try_from(*u).ok(),
                        Value::Double(d) if d.fract() == 0.0 => <$ty>::try_from(*d as i128).ok(),
                        _ => None,
                    };
                    *self = converted.ok_or_else(|| ReflectError::conversion::<$ty>(value))?;
                    Ok(())
                }
            }
        )*
    };
}

impl_reflect_int!(
    i8 => I8,
    i16 => I16,
    i32 => I32,
    i64 => I64,
    u8 => U8,
    u16 => U16,
    u32 => U32,
    u64 => U64,
);

macro_rules! impl_reflect_float {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Reflect for $ty {
                crate::__reflect_any_methods!();

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Primitive(Primitive::$variant(*self))
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::Leaf
                }

                fn to_value(&self) -> Value {
                    Primitive::$variant(*self).to_value()
                }

                fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
                    let converted = value
                        .as_f64()
                        .ok_or_else(|| ReflectError::conversion::<$ty>(value))?;
                    *self = converted as $ty;
                    Ok(())
                }
            }
        )*
    };
}

impl_reflect_float!(f32 => F32, f64 => F64);

impl Reflect for bool {
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Primitive(Primitive::Bool(*self))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Leaf
    }

    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        *self = value
            .as_bool()
            .ok_or_else(|| ReflectError::conversion::<bool>(value))?;
        Ok(())
    }
}

impl Reflect for char {
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Primitive(Primitive::Char(*self))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Leaf
    }

    fn to_value(&self) -> Value {
        Primitive::Char(*self).to_value()
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        let mut chars = value.as_str().unwrap_or_default().chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => {
                *self = c;
                Ok(())
            }
            _ => Err(ReflectError::conversion::<char>(value)),
        }
    }
}

impl Reflect for String {
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::String(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Leaf
    }

    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        let text = value
            .as_str()
            .ok_or_else(|| ReflectError::conversion::<String>(value))?;
        self.clear();
        self.push_str(text);
        Ok(())
    }
}

impl<T: Reflect> Reflect for Box<T> {
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(Some(&**self))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(Some(&mut **self))
    }

    fn to_value(&self) -> Value {
        (**self).to_value()
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        (**self).apply_value(value)
    }
}

impl<T: Reflect + Default> Reflect for Option<T> {
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self.as_ref().map(|value| value as &dyn Reflect))
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self.as_mut().map(|value| value as &mut dyn Reflect))
    }

    fn to_value(&self) -> Value {
        self.as_ref().map(Reflect::to_value).unwrap_or(Value::Null)
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        if value.is_null() {
            *self = None;
            return Ok(());
        }
        let mut next = T::default();
        next.apply_value(value)?;
        *self = Some(next);
        Ok(())
    }
}

/// Builds a fresh sequence from an array value without touching `target`
/// until every element converted.
fn sequence_from_value<T: Reflect + Default>(value: &Value, type_name: &'static str) -> Result<Vec<T>, ReflectError> {
    let items = value.as_array().ok_or_else(|| ReflectError::Conversion {
        type_name,
        value: value.display_text(),
    })?;
    items
        .iter()
        .map(|item| {
            let mut element = T::default();
            element.apply_value(item).map(|()| element)
        })
        .collect()
}

fn sequence_to_value<T: Reflect>(items: &[T]) -> Value {
    Value::Array(items.iter().map(Reflect::to_value).collect())
}

fn check_index(type_name: &'static str, index: usize, len: usize) -> Result<(), ReflectError> {
    if index < len {
        Ok(())
    } else {
        Err(ReflectError::IndexOutOfRange { type_name, index, len })
    }
}

pub(crate) fn position_in<T: Reflect>(items: &[T], element: ElementId) -> Option<usize> {
    items
        .iter()
        .enumerate()
        .position(|(index, item)| ElementId::at(item, index) == element)
}

impl<T: Reflect + Default> Reflect for Vec<T> {
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Container(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Container(self)
    }

    fn to_value(&self) -> Value {
        sequence_to_value(self)
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        *self = sequence_from_value(value, self.type_name())?;
        Ok(())
    }
}

impl<T: Reflect + Default> DataContainer for Vec<T> {
    fn descriptor(&self) -> ContainerDescriptor {
        ContainerDescriptor::sequence(std::any::type_name::<Self>())
    }

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.get(index).map(|item| item as &dyn Reflect)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index).map(|item| item as &mut dyn Reflect)
    }

    fn clear(&mut self) -> Result<(), ReflectError> {
        Vec::clear(self);
        Ok(())
    }

    fn reserve_element(&self) -> Reservation {
        Reservation::new(std::any::type_name::<Self>(), Box::new(T::default()))
    }

    fn store_element(&mut self, mut reservation: Reservation) -> Result<(), ReflectError> {
        self.push(reservation.take_element::<T>()?);
        Ok(())
    }

    fn remove_element(&mut self, element: ElementId) -> Result<(), ReflectError> {
        let index = position_in(self, element)
            .ok_or(ReflectError::ElementNotFound(std::any::type_name::<Self>()))?;
        self.remove(index);
        Ok(())
    }

    fn swap_elements(&mut self, first: usize, second: usize) -> Result<(), ReflectError> {
        let type_name = std::any::type_name::<Self>();
        check_index(type_name, first, Vec::len(self))?;
        check_index(type_name, second, Vec::len(self))?;
        self.swap(first, second);
        Ok(())
    }
}

impl<T: Reflect + Default, const N: usize> Reflect for [T; N] {
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Container(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Container(self)
    }

    fn to_value(&self) -> Value {
        sequence_to_value(self)
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        let items: Vec<T> = sequence_from_value(value, self.type_name())?;
        let items: [T; N] = items
            .try_into()
            .map_err(|_| ReflectError::conversion::<Self>(value))?;
        *self = items;
        Ok(())
    }
}

impl<T: Reflect + Default, const N: usize> DataContainer for [T; N] {
    fn descriptor(&self) -> ContainerDescriptor {
        ContainerDescriptor::sequence(std::any::type_name::<Self>())
            .with_fixed_size()
            .with_capacity(N)
    }

    fn len(&self) -> usize {
        N
    }

    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.get(index).map(|item| item as &dyn Reflect)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.get_mut(index).map(|item| item as &mut dyn Reflect)
    }

    fn clear(&mut self) -> Result<(), ReflectError> {
        Err(ReflectError::FixedSize(std::any::type_name::<Self>()))
    }

    fn reserve_element(&self) -> Reservation {
        Reservation::new(std::any::type_name::<Self>(), Box::new(T::default()))
    }

    fn store_element(&mut self, reservation: Reservation) -> Result<(), ReflectError> {
        reservation.release();
        Err(ReflectError::FixedSize(std::any::type_name::<Self>()))
    }

    fn remove_element(&mut self, _element: ElementId) -> Result<(), ReflectError> {
        Err(ReflectError::FixedSize(std::any::type_name::<Self>()))
    }

    fn swap_elements(&mut self, first: usize, second: usize) -> Result<(), ReflectError> {
        let type_name = std::any::type_name::<Self>();
        check_index(type_name, first, N)?;
        check_index(type_name, second, N)?;
        self.swap(first, second);
        Ok(())
    }
}

impl<K, V> Reflect for BTreeMap<K, V>
where
    K: Reflect + Default + Ord + Clone,
    V: Reflect + Default,
{
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Container(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Container(self)
    }

    /// An array of `[key, value]` pairs in key order.
    fn to_value(&self) -> Value {
        Value::Array(
            self.iter()
                .map(|(key, value)| Value::Array(vec![key.to_value(), value.to_value()]))
                .collect(),
        )
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        let conversion = || ReflectError::conversion::<Self>(value);
        let pairs = value.as_array().ok_or_else(conversion)?;
        let mut next = BTreeMap::new();
        for pair in pairs {
            let [key_value, item_value] = pair.as_array().ok_or_else(conversion)? else {
                return Err(conversion());
            };
            let mut key = K::default();
            key.apply_value(key_value)?;
            let mut item = V::default();
            item.apply_value(item_value)?;
            if next.insert(key, item).is_some() {
                return Err(ReflectError::DuplicateKey(std::any::type_name::<Self>()));
            }
        }
        *self = next;
        Ok(())
    }
}

impl<K, V> DataContainer for BTreeMap<K, V>
where
    K: Reflect + Default + Ord + Clone,
    V: Reflect + Default,
{
    fn descriptor(&self) -> ContainerDescriptor {
        ContainerDescriptor::associative(
            std::any::type_name::<Self>(),
            Some(std::any::type_name::<K>()),
        )
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.values().nth(index).map(|value| value as &dyn Reflect)
    }

    fn element_mut(&mut self, index: usize) -> Option<&mut dyn Reflect> {
        self.values_mut().nth(index).map(|value| value as &mut dyn Reflect)
    }

    fn element_key(&self, index: usize) -> Option<Value> {
        self.keys().nth(index).map(Reflect::to_value)
    }

    fn clear(&mut self) -> Result<(), ReflectError> {
        BTreeMap::clear(self);
        Ok(())
    }

    fn reserve_element(&self) -> Reservation {
        let key: SharedObject = Rc::new(RefCell::new(K::default()));
        Reservation::new(std::any::type_name::<Self>(), Box::new(V::default())).with_key(key)
    }

    fn set_element_key(&self, reservation: &mut Reservation, key: &dyn Reflect) -> Result<(), ReflectError> {
        let key = key
            .as_any()
            .downcast_ref::<K>()
            .ok_or(ReflectError::TypeMismatch {
                expected: std::any::type_name::<K>(),
                found: key.type_name(),
            })?;
        reservation.bind_key(Box::new(key.clone()));
        Ok(())
    }

    fn store_element(&mut self, mut reservation: Reservation) -> Result<(), ReflectError> {
        let type_name = std::any::type_name::<Self>();
        let key: K = match reservation.take_key() {
            Ok(key) => key,
            Err(error) => {
                reservation.release();
                return Err(error);
            }
        };
        if self.contains_key(&key) {
            reservation.release();
            return Err(ReflectError::DuplicateKey(type_name));
        }
        let value: V = reservation.take_element()?;
        self.insert(key, value);
        Ok(())
    }

    fn remove_element(&mut self, element: ElementId) -> Result<(), ReflectError> {
        let type_name = std::any::type_name::<Self>();
        let key = self
            .iter()
            .enumerate()
            .find(|(index, (_, value))| ElementId::at(*value, *index) == element)
            .map(|(_, (key, _))| key.clone())
            .ok_or(ReflectError::ElementNotFound(type_name))?;
        self.remove(&key);
        Ok(())
    }

    fn swap_elements(&mut self, _first: usize, _second: usize) -> Result<(), ReflectError> {
        Err(ReflectError::NotSequence(std::any::type_name::<Self>()))
    }
}

impl<T> Reflect for BTreeSet<T>
where
    T: Reflect + Default + Ord + Clone,
{
    crate::__reflect_any_methods!();

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Container(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Container(self)
    }

    fn to_value(&self) -> Value {
        Value::Array(self.iter().map(Reflect::to_value).collect())
    }

    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError> {
        let items: Vec<T> = sequence_from_value(value, self.type_name())?;
        *self = items.into_iter().collect();
        Ok(())
    }
}

/// Set members are their own keys, so elements are stored as soon as they are
/// reserved and cannot be edited in place.
impl<T> DataContainer for BTreeSet<T>
where
    T: Reflect + Default + Ord + Clone,
{
    fn descriptor(&self) -> ContainerDescriptor {
        ContainerDescriptor::associative(std::any::type_name::<Self>(), None)
    }

    fn len(&self) -> usize {
        BTreeSet::len(self)
    }

    fn element(&self, index: usize) -> Option<&dyn Reflect> {
        self.iter().nth(index).map(|value| value as &dyn Reflect)
    }

    fn element_mut(&mut self, _index: usize) -> Option<&mut dyn Reflect> {
        None
    }

    fn elements_editable(&self) -> bool {
        false
    }

    fn clear(&mut self) -> Result<(), ReflectError> {
        BTreeSet::clear(self);
        Ok(())
    }

    fn reserve_element(&self) -> Reservation {
        Reservation::new(std::any::type_name::<Self>(), Box::new(T::default()))
    }

    fn store_element(&mut self, mut reservation: Reservation) -> Result<(), ReflectError> {
        let value: T = reservation.take_element()?;
        if !self.insert(value) {
            return Err(ReflectError::DuplicateKey(std::any::type_name::<Self>()));
        }
        Ok(())
    }

    fn remove_element(&mut self, element: ElementId) -> Result<(), ReflectError> {
        let value = self
            .iter()
            .enumerate()
            .find(|(index, value)| ElementId::at(*value, *index) == element)
            .map(|(_, value)| value.clone())
            .ok_or(ReflectError::ElementNotFound(std::any::type_name::<Self>()))?;
        self.remove(&value);
        Ok(())
    }

    fn swap_elements(&mut self, _first: usize, _second: usize) -> Result<(), ReflectError> {
        Err(ReflectError::NotSequence(std::any::type_name::<Self>()))
    }
}
