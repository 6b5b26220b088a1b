//! # Store Errors
//!
//! Error types reported by object store implementations.

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// Index name not declared on the store
    #[error("Unknown index: {0}")]
    UnknownIndex(String),

    /// Asynchronous store call failed
    #[error("Store I/O failure: {0}")]
    Io(String),

    /// Value cannot be used as a key
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Record has no value at the store's key path
    #[error("Record has no value at key path '{0}'")]
    MissingKeyPath(String),
}

impl StoreError {
    /// Returns true if the error is a caller error rather than an I/O failure
    pub fn is_configuration(&self) -> bool {
        !matches!(self, StoreError::Io(_))
    }
}
