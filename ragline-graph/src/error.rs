//! Entity graph error type.

use thiserror::Error;

/// Errors loading the entity graph's backing JSON file.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The file could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The file's contents were not valid entity-graph JSON.
    #[error("malformed entity graph: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, GraphError>;
