//! Core error types for `LedgerLens`.

use thiserror::Error;

/// Core error type for `LedgerLens` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data supplied by a caller.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Realm id is not the numeric company id.
    #[error("Invalid realm id {0:?}: expected the numeric company id")]
    InvalidRealmId(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
