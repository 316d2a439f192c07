// ABOUTME: Vector index client (C1): semantic similarity search over a persistent embedding store
// ABOUTME: the embedding model itself is an opaque collaborator per scope

//! A deterministic, in-memory vector index suitable for tests and small
//! corpora, plus the `VectorIndex`/`EmbeddingProvider` trait boundary a real
//! HNSW-backed or cloud vector store would implement instead. Indexing and
//! ingestion are out of scope (§1) — this crate only serves queries against
//! an already-populated index.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod embeddings;
pub mod index;

pub use embeddings::{EmbeddingProvider, MockEmbeddingProvider};
pub use index::{InMemoryVectorIndex, VectorIndex};
