use inspector_dom::Value;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReflectError {
    #[error("Cannot convert {value} into {type_name}")]
    Conversion {
        type_name: &'static str,
        value: String,
    },

    #[error("Expected {expected}, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    #[error("Key already present in {0}")]
    DuplicateKey(&'static str),

    #[error("Reserved element for {0} has no key bound")]
    MissingKey(&'static str),

    #[error("Reservation for {0} holds no element")]
    MissingElement(&'static str),

    #[error("{0} is at capacity")]
    AtCapacity(&'static str),

    #[error("{0} has a fixed size")]
    FixedSize(&'static str),

    #[error("{0} is not an associative container")]
    NotAssociative(&'static str),

    #[error("{0} is not a sequence container")]
    NotSequence(&'static str),

    #[error("Element not found in {0}")]
    ElementNotFound(&'static str),

    #[error("Index {index} out of range for {type_name} of length {len}")]
    IndexOutOfRange {
        type_name: &'static str,
        index: usize,
        len: usize,
    },

    #[error("Address {0} does not resolve to a value")]
    UnresolvedAddress(String),
}

impl ReflectError {
    pub fn conversion<T: ?Sized>(value: &Value) -> Self {
        ReflectError::Conversion {
            type_name: std::any::type_name::<T>(),
            value: value.display_text(),
        }
    }
}
