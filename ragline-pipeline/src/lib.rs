// ABOUTME: Pipeline controller (C14) — the state machine wiring every
// ABOUTME: other component into one query, plus its auxiliary hooks

//! The top-level state machine for one query: analyze (C6), plan (C7),
//! probe the cache (C12), retrieve (C8), re-rank (C9), compress (C10),
//! synthesize (C11) — then persist the cache entry, log the run (C13),
//! and return.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod controller;
pub mod eval;
pub mod hooks;

pub use controller::{PipelineController, PipelineSettings};
pub use eval::{run_quality_suite, score_answer, ScoredCase, Scores, TestCase, TestSuite, TestSuiteSummary};
pub use hooks::{update_local_knowledge, update_vector_store, InteractionConsumer, NoopConsumer};
