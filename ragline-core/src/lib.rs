// ABOUTME: Shared data model (Query, Document, Strategy, Run Record, Trace) for the ragline pipeline
// ABOUTME: Every other ragline-* crate depends on this one for its wire types and error conversions

//! Core data model for the ragline retrieval-augmented answering engine.
//!
//! This crate holds no business logic. It defines the shapes that flow
//! between the query analyzer, retrievers, re-ranker, compressor, and
//! synthesizer, plus the shared error type those stages absorb into.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod types;

pub mod prelude {
    //! Re-exports of the types most crates need.
    pub use crate::error::{CoreError, Result};
    pub use crate::types::{
        CacheEntry, Document, DocumentSource, Intent, Query, RunRecord, Strategy, StrategyMode,
        Trace, TraceSpan,
    };
}
