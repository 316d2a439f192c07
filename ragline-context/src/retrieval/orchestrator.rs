//! Retrieval orchestrator (C8): fans out to every enabled retriever
//! concurrently, merges and deduplicates, and runs planning decomposition
//! and temporal recency boosting.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use ragline_core::types::{Document, DocumentSource, Query, Strategy};
use ragline_graph::EntityGraph;
use ragline_memory::MemorySearchClient;
use ragline_providers::{CompletionOptions, LlmProvider};
use ragline_rag::VectorIndex;
use tokio::sync::Semaphore;
use tracing::{warn, Instrument};

use crate::query::QueryAnalyzer;
use crate::retrieval::code::CodeSymbolIndex;
use crate::retrieval::keyword::KeywordSearch;

const MIN_WORKER_POOL: usize = 4;
const EARLY_STOP_COUNT: usize = 30;
const EARLY_STOP_SCORE: f64 = 0.8;
const MEMORY_CONCEPT_LIMIT: usize = 5;
const MAX_SUBQUESTIONS: usize = 3;

/// Fans out a planned [`Strategy`] to C1–C5, merges their output, and
/// (when `use_planning`) decomposes the query into sub-questions first.
pub struct RetrievalOrchestrator {
    vector: Arc<dyn VectorIndex>,
    memory: Arc<dyn MemorySearchClient>,
    keyword: Arc<dyn KeywordSearch>,
    code: Arc<CodeSymbolIndex>,
    graph: Arc<EntityGraph>,
    analyzer: Arc<QueryAnalyzer>,
    planner_llm: Arc<dyn LlmProvider>,
}

impl RetrievalOrchestrator {
    /// Build an orchestrator over its five retrievers plus the analyzer and
    /// LLM used for planning decomposition.
    #[must_use]
    pub fn new(
        vector: Arc<dyn VectorIndex>,
        memory: Arc<dyn MemorySearchClient>,
        keyword: Arc<dyn KeywordSearch>,
        code: Arc<CodeSymbolIndex>,
        graph: Arc<EntityGraph>,
        analyzer: Arc<QueryAnalyzer>,
        planner_llm: Arc<dyn LlmProvider>,
    ) -> Self {
        Self {
            vector,
            memory,
            keyword,
            code,
            graph,
            analyzer,
            planner_llm,
        }
    }

    /// Retrieve documents for `query` under `strategy`, applying planning
    /// decomposition first when `strategy.use_planning` is set.
    pub async fn retrieve(&self, query: &Query, strategy: &Strategy) -> Vec<Document> {
        if !strategy.use_planning {
            return self.retrieve_single(query, strategy).await;
        }

        let subquestions = self.decompose(&query.text).await;
        if subquestions.is_empty() {
            return self.retrieve_single(query, strategy).await;
        }

        let mut merged: IndexMap<String, Document> = IndexMap::new();
        for text in subquestions {
            let subquery = self.analyzer.analyze(&text).await;
            let docs = self.retrieve_single(&subquery, strategy).await;
            merge_into(&mut merged, docs);
        }
        merged.into_values().collect()
    }

    async fn decompose(&self, query: &str) -> Vec<String> {
        let prompt = format!(
            "Break this question into at most {MAX_SUBQUESTIONS} independent sub-questions \
             (one per line, no numbering). If it is already simple, reply with nothing:\n{query}"
        );
        match self.planner_llm.complete(&prompt, &CompletionOptions::default()).await {
            Ok(text) => text
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .take(MAX_SUBQUESTIONS)
                .map(str::to_string)
                .collect(),
            Err(err) => {
                warn!(error = %err, "planning decomposition failed, falling back to single-pass retrieval");
                Vec::new()
            }
        }
    }

    async fn retrieve_single(&self, query: &Query, strategy: &Strategy) -> Vec<Document> {
        let enabled = [
            strategy.use_vector,
            strategy.use_memory,
            strategy.use_recent,
            strategy.use_code,
            strategy.use_keywords,
            strategy.use_graph,
        ]
        .into_iter()
        .filter(|enabled| *enabled)
        .count();
        let semaphore = Arc::new(Semaphore::new(enabled.max(MIN_WORKER_POOL)));
        let mut handles = Vec::new();

        if strategy.use_vector {
            let vector = Arc::clone(&self.vector);
            let variants = query_variants(query);
            let n = strategy.vector_n_results;
            let sem = Arc::clone(&semaphore);
            let span = retriever_span("vector");
            handles.push(tokio::spawn(
                async move {
                    let _permit = sem.acquire_owned().await.ok();
                    vector_retrieve(vector.as_ref(), &variants, n).await
                }
                .instrument(span),
            ));
        }

        if strategy.use_memory {
            let memory = Arc::clone(&self.memory);
            let text = query.text.clone();
            let concepts: Vec<String> = query.concepts.iter().take(strategy.memory_concepts).cloned().collect();
            let limit = strategy.memory_limit;
            let sem = Arc::clone(&semaphore);
            let span = retriever_span("memory");
            handles.push(tokio::spawn(
                async move {
                    let _permit = sem.acquire_owned().await.ok();
                    memory_retrieve(memory.as_ref(), &text, &concepts, limit).await
                }
                .instrument(span),
            ));
        }

        if strategy.use_recent {
            let memory = Arc::clone(&self.memory);
            let text = query.text.clone();
            let limit = strategy.memory_limit;
            let half_life = strategy.half_life_days;
            let sem = Arc::clone(&semaphore);
            let span = retriever_span("temporal");
            handles.push(tokio::spawn(
                async move {
                    let _permit = sem.acquire_owned().await.ok();
                    temporal_retrieve(memory.as_ref(), &text, limit, half_life).await
                }
                .instrument(span),
            ));
        }

        if strategy.use_code {
            let code = Arc::clone(&self.code);
            let mut queries = vec![query.text.clone()];
            queries.extend(query.concepts.iter().cloned());
            let limit = strategy.code_limit;
            let sem = Arc::clone(&semaphore);
            let span = retriever_span("code");
            handles.push(tokio::spawn(
                async move {
                    let _permit = sem.acquire_owned().await.ok();
                    code.search(&queries, limit)
                }
                .instrument(span),
            ));
        }

        if strategy.use_keywords {
            let keyword = Arc::clone(&self.keyword);
            let text = query.text.clone();
            let limit = strategy.keyword_limit;
            let sem = Arc::clone(&semaphore);
            let span = retriever_span("keyword");
            handles.push(tokio::spawn(
                async move {
                    let _permit = sem.acquire_owned().await.ok();
                    keyword.search(&text, limit).await
                }
                .instrument(span),
            ));
        }

        if strategy.use_graph {
            let graph = Arc::clone(&self.graph);
            let text = query.text.clone();
            let limit = strategy.graph_limit;
            let sem = Arc::clone(&semaphore);
            let span = retriever_span("graph");
            handles.push(tokio::spawn(
                async move {
                    let _permit = sem.acquire_owned().await.ok();
                    graph.search(&text, limit)
                }
                .instrument(span),
            ));
        }

        let mut merged: IndexMap<String, Document> = IndexMap::new();
        for handle in handles {
            let docs = handle.await.unwrap_or_default();
            merge_into(&mut merged, docs);
        }
        merged.into_values().collect()
    }
}

/// A per-retriever span with a `status` field the retriever itself can
/// fill in (via `Span::current().record`) when it degrades instead of
/// failing outright — see [`ragline_memory::SubprocessMemoryClient`].
fn retriever_span(name: &'static str) -> tracing::Span {
    tracing::info_span!("retriever", retriever = name, status = tracing::field::Empty)
}

fn merge_into(merged: &mut IndexMap<String, Document>, docs: Vec<Document>) {
    for doc in docs {
        merged.entry(doc.dedup_key()).or_insert(doc);
    }
}

fn query_variants(query: &Query) -> Vec<String> {
    let mut variants = vec![query.text.clone()];
    variants.extend(query.concepts.iter().cloned());
    variants.extend(query.expansions.iter().cloned());
    variants
}

async fn vector_retrieve(vector: &dyn VectorIndex, variants: &[String], n: usize) -> Vec<Document> {
    let mut collected = Vec::new();
    let mut high_score_count = 0usize;
    for variant in variants {
        let docs = vector.search(variant, n, None).await;
        high_score_count += docs.iter().filter(|d| d.score.unwrap_or(0.0) > EARLY_STOP_SCORE).count();
        collected.extend(docs);
        if high_score_count >= EARLY_STOP_COUNT {
            break;
        }
    }
    collected
}

async fn memory_retrieve(
    memory: &dyn MemorySearchClient,
    text: &str,
    concepts: &[String],
    limit: usize,
) -> Vec<Document> {
    let mut collected = memory.search(text, limit).await;
    for concept in concepts {
        collected.extend(memory.search(concept, MEMORY_CONCEPT_LIMIT).await);
    }
    collected
}

async fn temporal_retrieve(
    memory: &dyn MemorySearchClient,
    text: &str,
    limit: usize,
    half_life_days: i64,
) -> Vec<Document> {
    let mut docs = memory.search(text, limit).await;
    for doc in &mut docs {
        doc.source = DocumentSource::Temporal;
        doc.temporal_boost = Some(temporal_boost(doc, half_life_days));
    }
    docs
}

fn temporal_boost(doc: &Document, half_life_days: i64) -> f64 {
    let timestamp = doc
        .metadata
        .get("updatedAt")
        .or_else(|| doc.metadata.get("createdAt"))
        .and_then(|v| v.as_str());

    let base = match timestamp.and_then(|s| DateTime::parse_from_rfc3339(s).ok()) {
        Some(parsed) => {
            let age_days = (Utc::now() - parsed.with_timezone(&Utc)).num_seconds() as f64 / 86400.0;
            if age_days <= 1.0 {
                3.0
            } else if age_days <= 3.0 {
                2.0
            } else if age_days <= 7.0 {
                1.5
            } else {
                1.0 + (-age_days / half_life_days as f64).exp()
            }
        }
        None => 1.0,
    };

    let is_backtest_result = doc.metadata.get("type").and_then(|v| v.as_str()) == Some("backtest_result");
    if is_backtest_result {
        base * 1.3
    } else {
        base
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragline_core::types::{Intent, Temporal};
    use ragline_memory::InMemoryMemoryClient;
    use ragline_providers::MockLlmProvider;
    use ragline_rag::InMemoryVectorIndex;
    use ragline_rag::MockEmbeddingProvider;
    use serde_json::Value;
    use std::collections::HashMap;
    use std::path::Path;

    struct NoopKeywordSearch;

    #[async_trait]
    impl KeywordSearch for NoopKeywordSearch {
        async fn search(&self, _query: &str, _limit: usize) -> Vec<Document> {
            Vec::new()
        }
    }

    fn query(text: &str) -> Query {
        Query {
            text: text.to_string(),
            concepts: vec![],
            expansions: vec![],
            temporal: Temporal::default(),
            intent: Intent::General,
        }
    }

    fn orchestrator(memory_docs: Vec<Document>) -> RetrievalOrchestrator {
        let vector = Arc::new(InMemoryVectorIndex::new(Arc::new(MockEmbeddingProvider::default())));
        let memory = Arc::new(InMemoryMemoryClient::new(memory_docs));
        let keyword = Arc::new(NoopKeywordSearch);
        let code = Arc::new(CodeSymbolIndex::empty(Path::new(".")));
        let graph = Arc::new(EntityGraph::empty());
        let analyzer = Arc::new(QueryAnalyzer::new(Arc::new(MockLlmProvider::empty())));
        let planner_llm = Arc::new(MockLlmProvider::empty());
        RetrievalOrchestrator::new(vector, memory, keyword, code, graph, analyzer, planner_llm)
    }

    #[tokio::test]
    async fn retrieve_merges_and_dedups_across_retrievers() {
        let doc = Document::new("shared content", DocumentSource::Memory, "shared content");
        let orchestrator = orchestrator(vec![doc.clone(), doc]);
        let strategy = Strategy {
            use_code: false,
            use_graph: false,
            use_keywords: false,
            use_vector: false,
            use_recent: false,
            ..Strategy::base_defaults(Intent::General, false)
        };
        let docs = orchestrator.retrieve_single(&query("anything"), &strategy).await;
        assert_eq!(docs.len(), 1);
    }

    #[tokio::test]
    async fn retrieve_without_planning_skips_decomposition() {
        let orchestrator = orchestrator(vec![]);
        let strategy = Strategy::skip_retrieval();
        let docs = orchestrator.retrieve(&query("anything"), &strategy).await;
        assert!(docs.is_empty());
    }

    #[test]
    fn temporal_boost_recent_document_outranks_old() {
        let mut recent = Document::new("x", DocumentSource::Memory, "x");
        let mut metadata = HashMap::new();
        metadata.insert("updatedAt".to_string(), Value::String(Utc::now().to_rfc3339()));
        recent.metadata = metadata;

        let mut old = Document::new("y", DocumentSource::Memory, "y");
        let mut old_metadata = HashMap::new();
        old_metadata.insert(
            "updatedAt".to_string(),
            Value::String((Utc::now() - chrono::Duration::days(30)).to_rfc3339()),
        );
        old.metadata = old_metadata;

        assert!(temporal_boost(&recent, 3) > temporal_boost(&old, 3));
    }

    #[test]
    fn temporal_boost_missing_timestamp_is_one() {
        let doc = Document::new("z", DocumentSource::Memory, "z");
        assert_eq!(temporal_boost(&doc, 3), 1.0);
    }

    #[test]
    fn temporal_boost_backtest_result_gets_extra_multiplier() {
        let mut doc = Document::new("z", DocumentSource::Memory, "z");
        let mut metadata = HashMap::new();
        metadata.insert("type".to_string(), Value::String("backtest_result".to_string()));
        doc.metadata = metadata;
        assert!((temporal_boost(&doc, 3) - 1.3).abs() < 1e-9);
    }
}
