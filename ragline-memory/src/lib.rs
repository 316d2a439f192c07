// ABOUTME: Memory search client (C2): wraps an external memory service behind a subprocess
// ABOUTME: and tolerates truncated JSON, timeouts, and non-zero exits by degrading to empty

//! Wraps an external conversation/knowledge memory service. The concrete
//! service is out of scope — this crate only specifies and implements the
//! tolerance contract: well-formed JSON, truncated JSON (regex fallback),
//! timeout, and non-zero exit all degrade to an empty result, never an
//! error, so the orchestrator can treat this retriever uniformly with the
//! others.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod client;
pub mod parsing;

pub use client::{InMemoryMemoryClient, MemorySearchClient, SubprocessMemoryClient};
