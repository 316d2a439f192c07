//! Provider-crate error type.

use thiserror::Error;

/// Errors a provider call can fail with.
///
/// Callers in `ragline-context`/`ragline-synth` are expected to absorb these
/// into component-specific defaults (empty list, "general" intent, error
/// sentinel answer) rather than propagate them, per the pipeline's error
/// handling design; this enum exists so that absorption point has something
/// concrete to match on.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Required configuration (API credentials, endpoint) was missing.
    #[error("provider not configured: {0}")]
    NotConfigured(String),

    /// The underlying HTTP call failed.
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider returned a response that could not be parsed.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The call exceeded its deadline.
    #[error("provider call timed out")]
    Timeout,
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ProviderError>;
