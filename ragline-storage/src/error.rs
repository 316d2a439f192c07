//! Storage-crate error type.

use thiserror::Error;

/// Errors from a file storage operation.
///
/// Per §7, cache/trace/monitor I/O failures are never fatal to a query —
/// callers log this and fall back to a miss/no-op rather than propagate it
/// up through the pipeline.
#[derive(Debug, Error)]
pub enum StorageError {
    /// Underlying filesystem operation failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Stored content could not be deserialized.
    #[error("deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, StorageError>;
