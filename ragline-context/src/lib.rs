// ABOUTME: Query analysis, strategy planning, retrieval orchestration,
// ABOUTME: re-ranking, and context compression — the body of the pipeline

//! The context engineering pipeline: understand the query (C6), decide what
//! to retrieve and with what budgets (C7), fan out to retrievers and merge
//! (C8), re-rank in two stages (C9), and compress into a character budget
//! (C10).

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod assembly;
pub mod error;
pub mod query;
pub mod reranking;
pub mod retrieval;

pub use assembly::{compress_context, DEFAULT_MAX_CHARS};
pub use error::{ContextError, Result};
pub use query::QueryAnalyzer;
pub use reranking::Reranker;
pub use retrieval::{plan, CodeSymbolIndex, KeywordSearch, RetrievalOrchestrator, RgKeywordRetriever};
