//! Errors crossing the context pipeline's internal boundaries.
//!
//! Per §7, none of these are meant to abort a query: retrieval, analysis,
//! and re-ranking failures are absorbed at their call site. This enum
//! exists for the rare invariant violation (e.g. a cross-encoder returning
//! the wrong number of scores) that the design calls out as a genuine bug.

use thiserror::Error;

/// Errors from the context engineering pipeline.
#[derive(Debug, Error)]
pub enum ContextError {
    /// A component received a response shaped differently than it promised.
    #[error("invariant violated: {0}")]
    Invariant(String),

    /// Serialization of an intermediate structure failed.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ContextError>;
