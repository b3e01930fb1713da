//! # Store Errors

use std::io;

use thiserror::Error;

/// Result type for form store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Form store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    /// Stored data exists but does not parse as a forms collection
    #[error("Unreadable forms data in {path}: {source}")]
    Unreadable {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to serialize forms: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl StoreError {
    pub fn io(path: impl Into<String>, source: io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unreadable(path: impl Into<String>, source: serde_json::Error) -> Self {
        StoreError::Unreadable {
            path: path.into(),
            source,
        }
    }
}
