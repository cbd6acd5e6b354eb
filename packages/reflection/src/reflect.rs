//! The core reflection traits.

use crate::attributes::FieldAttributes;
use crate::container::DataContainer;
use crate::error::ReflectError;
use crate::wrappers::AssetRef;
use inspector_dom::Value;
use std::any::Any;
use std::cell::RefCell;
use std::rc::Rc;

/// A host object graph shared between the host and an adapter. The adapter only
/// borrows it for the duration of a single call.
pub type SharedObject = Rc<RefCell<dyn Reflect>>;

/// A value that can describe and update itself at runtime.
pub trait Reflect: Any {
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    fn into_any(self: Box<Self>) -> Box<dyn Any>;

    fn reflect_ref(&self) -> ReflectRef<'_>;

    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// Current value as a document value.
    fn to_value(&self) -> Value;

    /// Overwrites this value from a document value. Implementations leave
    /// `self` untouched when they return an error.
    fn apply_value(&mut self, value: &Value) -> Result<(), ReflectError>;

    /// Stable byte form for values the document cannot show directly.
    fn content_bytes(&self) -> Option<Vec<u8>> {
        None
    }
}

impl std::fmt::Debug for dyn Reflect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({:?})", self.type_name(), self.to_value())
    }
}

/// Read-only view of a value's category.
pub enum ReflectRef<'a> {
    Primitive(Primitive),
    String(&'a str),
    Object(&'a dyn Struct),
    Container(&'a dyn DataContainer),
    Enum(i64),
    Pointer(Option<&'a dyn Reflect>),
    Buffer(&'a [u8]),
    Asset(&'a AssetRef),
    /// A value with no visible structure. Edited as a whole.
    Opaque,
}

/// Mutable view for the categories that have mutable structure. Everything
/// else is changed with [`Reflect::apply_value`].
pub enum ReflectMut<'a> {
    Object(&'a mut dyn Struct),
    Container(&'a mut dyn DataContainer),
    Pointer(Option<&'a mut dyn Reflect>),
    Leaf,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Primitive {
    Bool(bool),
    Char(char),
    I8(i8),
    I16(i16),
    I32(i32),
    I64(i64),
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    F32(f32),
    F64(f64),
}

impl Primitive {
    pub fn to_value(self) -> Value {
        match self {
            Primitive::Bool(b) => Value::Bool(b),
            Primitive::Char(c) => Value::String(c.to_string()),
            Primitive::I8(v) => Value::Int(i64::from(v)),
            Primitive::I16(v) => Value::Int(i64::from(v)),
            Primitive::I32(v) => Value::Int(i64::from(v)),
            Primitive::I64(v) => Value::Int(v),
            Primitive::U8(v) => Value::Uint(u64::from(v)),
            Primitive::U16(v) => Value::Uint(u64::from(v)),
            Primitive::U32(v) => Value::Uint(u64::from(v)),
            Primitive::U64(v) => Value::Uint(v),
            Primitive::F32(v) => Value::Double(f64::from(v)),
            Primitive::F64(v) => Value::Double(v),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldInfo {
    pub name: &'static str,
    pub attributes: FieldAttributes,
}

/// A composite value with an ordered list of named fields.
pub trait Struct {
    fn field_len(&self) -> usize;

    fn field(&self, index: usize) -> Option<&dyn Reflect>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Reflect>;

    fn field_info(&self, index: usize) -> Option<FieldInfo>;

    fn field_index(&self, name: &str) -> Option<usize> {
        (0..self.field_len()).find(|&index| {
            self.field_info(index)
                .is_some_and(|info| info.name == name)
        })
    }
}

/// Downcasts a reflected value to a concrete type.
pub fn downcast_ref<T: Reflect>(value: &dyn Reflect) -> Option<&T> {
    value.as_any().downcast_ref::<T>()
}

pub fn downcast_mut<T: Reflect>(value: &mut dyn Reflect) -> Option<&mut T> {
    value.as_any_mut().downcast_mut::<T>()
}
