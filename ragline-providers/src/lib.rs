// ABOUTME: LLM and cross-encoder provider abstractions
// ABOUTME: the concrete model behind each trait is an opaque collaborator per scope

//! Provider abstractions for the two model-backed collaborators the pipeline
//! depends on but does not implement: an LLM (fast model for analysis/
//! planning, main model for synthesis) and a cross-encoder (stage-2
//! re-ranking). Both are out of scope as concrete implementations; this
//! crate defines the trait boundary plus a deterministic mock and a
//! generic HTTP-backed implementation so the rest of the workspace can be
//! exercised without a live model.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod cross_encoder;
pub mod error;
pub mod llm;

pub use config::ProviderConfig;
pub use cross_encoder::{CrossEncoder, MockCrossEncoder};
pub use error::{ProviderError, Result};
pub use llm::{CompletionOptions, HttpLlmProvider, LlmProvider, MockLlmProvider};
