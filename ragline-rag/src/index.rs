//! An in-memory vector index with deterministic cosine-similarity search.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ragline_core::types::{Document, DocumentSource};
use serde_json::Value;
use tokio::sync::RwLock;

use crate::embeddings::EmbeddingProvider;

/// Semantic similarity search over a persistent embedding store.
///
/// On an empty index, both methods return an empty list rather than
/// failing — indexing/ingestion is out of scope (§1); this trait only
/// serves an already-populated store.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Search for the `n` nearest documents to `query`, optionally
    /// restricted to documents whose metadata matches every key/value in
    /// `filter`.
    async fn search(&self, query: &str, n: usize, filter: Option<&HashMap<String, Value>>) -> Vec<Document>;

    /// Combine vector similarity with a pre-computed keyword result set,
    /// weighting vector score by `vector_weight` (`keyword_weight = 1.0 -
    /// vector_weight`).
    async fn hybrid_search(
        &self,
        query: &str,
        keyword_docs: &[Document],
        n: usize,
        vector_weight: f64,
    ) -> Vec<Document>;
}

struct Entry {
    id: String,
    content: String,
    embedding: Vec<f32>,
    metadata: HashMap<String, Value>,
}

/// A deterministic, in-memory vector index backed by an [`EmbeddingProvider`].
pub struct InMemoryVectorIndex {
    embedder: Arc<dyn EmbeddingProvider>,
    entries: RwLock<Vec<Entry>>,
}

impl InMemoryVectorIndex {
    /// An empty index using `embedder` to embed both stored documents and
    /// queries.
    #[must_use]
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    /// Add a document to the index, embedding its content.
    pub async fn insert(&self, id: impl Into<String>, content: impl Into<String>, metadata: HashMap<String, Value>) {
        let content = content.into();
        let embedding = self.embedder.embed(&content).await;
        self.entries.write().await.push(Entry {
            id: id.into(),
            content,
            embedding,
            metadata,
        });
    }

    fn matches_filter(metadata: &HashMap<String, Value>, filter: Option<&HashMap<String, Value>>) -> bool {
        match filter {
            None => true,
            Some(filter) => filter.iter().all(|(k, v)| metadata.get(k) == Some(v)),
        }
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn search(&self, query: &str, n: usize, filter: Option<&HashMap<String, Value>>) -> Vec<Document> {
        let query_embedding = self.embedder.embed(query).await;
        let entries = self.entries.read().await;

        let mut scored: Vec<(f32, &Entry)> = entries
            .iter()
            .filter(|e| Self::matches_filter(&e.metadata, filter))
            .map(|e| (cosine_similarity(&query_embedding, &e.embedding), e))
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(n)
            .map(|(cos, entry)| {
                let mapped = f64::from((cos + 1.0) / 2.0);
                Document::new(entry.content.clone(), DocumentSource::Vector, &entry.id)
                    .with_metadata(entry.metadata.clone())
                    .with_score(mapped)
                    .with_vector_score(mapped)
            })
            .collect()
    }

    async fn hybrid_search(
        &self,
        query: &str,
        keyword_docs: &[Document],
        n: usize,
        vector_weight: f64,
    ) -> Vec<Document> {
        let vector_weight = vector_weight.clamp(0.0, 1.0);
        let keyword_weight = 1.0 - vector_weight;

        let vector_docs = self.search(query, n.max(keyword_docs.len()), None).await;

        let mut by_id: HashMap<String, Document> = HashMap::new();
        for mut doc in vector_docs {
            let vector_component = doc.vector_score.unwrap_or(0.0) * vector_weight;
            doc.score = Some(vector_component);
            by_id.insert(doc.id.clone(), doc);
        }
        for doc in keyword_docs {
            by_id
                .entry(doc.id.clone())
                .and_modify(|existing| {
                    existing.score = Some(existing.score.unwrap_or(0.0) + keyword_weight);
                })
                .or_insert_with(|| {
                    let mut doc = doc.clone();
                    doc.score = Some(keyword_weight);
                    doc
                });
        }

        let mut merged: Vec<Document> = by_id.into_values().collect();
        merged.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        merged.truncate(n);
        merged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::MockEmbeddingProvider;

    fn index() -> InMemoryVectorIndex {
        InMemoryVectorIndex::new(Arc::new(MockEmbeddingProvider::default()))
    }

    #[tokio::test]
    async fn empty_index_returns_empty_list() {
        let idx = index();
        assert!(idx.search("anything", 5, None).await.is_empty());
    }

    #[tokio::test]
    async fn search_ranks_similar_content_first() {
        let idx = index();
        idx.insert("a", "walk forward validation routine", HashMap::new()).await;
        idx.insert("b", "completely unrelated topic about weather", HashMap::new())
            .await;

        let results = idx.search("walk forward validation", 2, None).await;
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, content_id_for("a"));
    }

    #[tokio::test]
    async fn search_is_deterministic() {
        let idx = index();
        idx.insert("a", "walk forward validation", HashMap::new()).await;
        let first = idx.search("walk forward", 1, None).await;
        let second = idx.search("walk forward", 1, None).await;
        assert_eq!(first[0].score, second[0].score);
    }

    #[tokio::test]
    async fn filter_excludes_non_matching_metadata() {
        let idx = index();
        let mut meta_a = HashMap::new();
        meta_a.insert("project".to_string(), serde_json::json!("alpha"));
        idx.insert("a", "walk forward validation", meta_a).await;
        let mut meta_b = HashMap::new();
        meta_b.insert("project".to_string(), serde_json::json!("beta"));
        idx.insert("b", "walk forward validation", meta_b).await;

        let mut filter = HashMap::new();
        filter.insert("project".to_string(), serde_json::json!("beta"));
        let results = idx.search("walk forward", 10, Some(&filter)).await;
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].metadata["project"], "beta");
    }

    fn content_id_for(dedup_key: &str) -> String {
        ragline_core::types::content_id(dedup_key)
    }
}
