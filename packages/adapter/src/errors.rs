//! Error types for the adapter

use inspector_dom::{NodeKind, PatchError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdapterError {
    #[error("Contract violation: {0}")]
    ContractViolation(String),

    #[error("Unknown message: {0}")]
    UnknownMessage(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Builder error: {0}")]
    Builder(#[from] BuilderError),

    #[error("Patch error: {0}")]
    Patch(#[from] PatchError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum BuilderError {
    #[error("Closed {found:?} while {expected:?} was open")]
    Unbalanced { expected: NodeKind, found: NodeKind },

    #[error("No open node for {0}")]
    NoOpenNode(&'static str),

    #[error("{0} node(s) still open")]
    UnclosedNodes(usize),

    #[error("Builder produced no document")]
    NoResult,
}

pub type AdapterResult<T> = Result<T, AdapterError>;
