//! # Session Errors

use thiserror::Error;

/// Result type for session operations
pub type SessionResult<T> = Result<T, SessionError>;

/// Events the session refuses to apply
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Field not in form: {0}")]
    UnknownField(String),

    #[error("Field is derived and read-only: {0}")]
    ReadOnlyField(String),
}
