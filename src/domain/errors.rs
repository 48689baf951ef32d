//! Domain error types
//!
//! All errors are domain-specific and don't expose third-party types. SQLite,
//! I/O and serialization failures are converted at the adapter boundary.

use thiserror::Error;

/// Main portable case error type
#[derive(Debug, Error)]
pub enum PortableCaseError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Selection or output directory rejected before any store is created
    #[error("Validation error: {0}")]
    Validation(String),

    /// Case database errors
    #[error("Case database error: {0}")]
    Store(#[from] StoreError),

    /// An attribute value disagrees with its declared value type
    #[error("Attribute kind mismatch: {0}")]
    AttributeKindMismatch(String),

    /// An attribute declares a value type that cannot be copied
    #[error("Unsupported attribute value type: {0}")]
    UnsupportedValueType(String),

    /// A tag assignment refers to a tag definition that was not copied
    #[error("Missing tag definition mapping: {0}")]
    MissingTagMapping(String),

    /// A parent chain or associated-artifact chain loops back on itself
    #[error("Cycle detected: {0}")]
    CycleDetected(String),

    /// Copy pipeline errors
    #[error("Copy error: {0}")]
    Copy(String),

    /// External archiving errors
    #[error("Packaging error: {0}")]
    Packaging(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

/// Case database errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to open case database: {0}")]
    OpenFailed(String),

    #[error("Failed to initialize schema: {0}")]
    SchemaFailed(String),

    #[error("Query failed: {0}")]
    QueryFailed(String),

    #[error("Insert failed: {0}")]
    InsertFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// The store handle was used after `close`
    #[error("Case database is closed")]
    Closed,

    /// A stored row could not be decoded into a domain value
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

impl From<std::io::Error> for PortableCaseError {
    fn from(err: std::io::Error) -> Self {
        PortableCaseError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for PortableCaseError {
    fn from(err: serde_json::Error) -> Self {
        PortableCaseError::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for PortableCaseError {
    fn from(err: toml::de::Error) -> Self {
        PortableCaseError::Configuration(format!("TOML parse error: {err}"))
    }
}
