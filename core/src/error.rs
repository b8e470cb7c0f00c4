//! Error types for the todo core.
//!
//! # Design
//! `StoreError` covers faults of the persistence layer only. `TodoError` is
//! what the command executor returns: input problems (`Validation`,
//! `InvalidAction`), a missing record (`NotFound`), or a wrapped store fault.
//! None of these leave the command boundary raw; `status` turns them into
//! user-facing messages.

use thiserror::Error;
use uuid::Uuid;

/// Faults raised by a `TodoStore` implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// The backing store could not be reached or timed out.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The write violated a store-level constraint.
    #[error("store conflict: {0}")]
    Conflict(String),

    /// A stored record could not be encoded or decoded.
    #[error("stored record is unreadable: {0}")]
    Serialization(String),
}

/// Errors returned by `TodoService` operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TodoError {
    /// A required field is missing or malformed.
    #[error("{0}")]
    Validation(String),

    /// The bulk action name is not one of the supported actions.
    #[error("invalid bulk action: {0:?}")]
    InvalidAction(String),

    /// No todo exists with the given id.
    #[error("todo {0} not found")]
    NotFound(Uuid),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TodoError {
    pub fn is_store_fault(&self) -> bool {
        matches!(self, TodoError::Store(_))
    }
}
