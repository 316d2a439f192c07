//! Re-ranker (C9): cheap filter plus cross-encoder fusion.

mod reranker;

pub use reranker::Reranker;
