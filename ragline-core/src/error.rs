//! Shared error type, following the one-enum-per-crate convention used throughout ragline.

use thiserror::Error;

/// Errors that can cross a ragline crate boundary.
///
/// Retriever, cache, and trace failures are absorbed at their call site per
/// the pipeline's error-handling design and never reach this enum in normal
/// operation; it exists for configuration and invariant failures, which are
/// the only failure modes allowed to be fatal.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A configuration value was missing or malformed at startup.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// An invariant the pipeline depends on was violated (programmer error).
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Serialization/deserialization of a persisted record failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Filesystem I/O failed in a context where it must be fatal.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias used across ragline crates.
pub type Result<T> = std::result::Result<T, CoreError>;
