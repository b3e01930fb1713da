//! # Derivation Errors
//!
//! These never leave the engine's public `derive_value*` functions; they exist
//! so each failure path can be named, logged and tested.

use thiserror::Error;

/// Result type for derivation operations
pub type DerivationResult<T> = Result<T, DerivationError>;

/// Reasons a derived value could not be computed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DerivationError {
    #[error("Field is not derived")]
    NotDerived,

    #[error("No derivation logic configured")]
    NoLogic,

    #[error("Unknown derivation logic: {0}")]
    UnknownLogic(String),

    #[error("Derivation needs a parent field")]
    MissingParent,

    #[error("Parent field '{0}' has no value")]
    EmptyParent(String),

    #[error("Parent field '{field}' holds an unparseable date: {value}")]
    UnparseableDate { field: String, value: String },

    #[error("Date arithmetic out of range")]
    OutOfRange,
}
