//! Query analyzer (C6): concept extraction, query expansion, temporal cue
//! parsing, and intent classification.

mod analyzer;

pub use analyzer::QueryAnalyzer;
