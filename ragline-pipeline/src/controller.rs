//! The pipeline controller (C14): one query in, one [`RunRecord`] out.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use ragline_cache::{cache_key, CacheKeyParts, QueryCache, TtlPolicy};
use ragline_context::{compress_context, plan, QueryAnalyzer, Reranker, RetrievalOrchestrator};
use ragline_core::types::{RunRecord, StrategyMode};
use ragline_synth::AnswerSynthesizer;
use ragline_trace::{Monitor, Tracer};
use serde_json::json;
use tracing::info;

use crate::hooks::InteractionConsumer;

/// Settings that vary per call: the global `--context-chars`/`--top-k`
/// flags override the planner's budgets when present.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineSettings {
    /// Overrides `Strategy::top_k` when set.
    pub top_k_override: Option<usize>,
    /// Overrides the context compressor's budget when set.
    pub context_chars_override: Option<usize>,
}

/// Wires C6 → C7 → C8 → C9 → C10 → C11 together with C12 (cache) and C13
/// (trace/monitor) around them.
pub struct PipelineController {
    analyzer: Arc<QueryAnalyzer>,
    orchestrator: Arc<RetrievalOrchestrator>,
    reranker: Arc<Reranker>,
    synthesizer: Arc<AnswerSynthesizer>,
    cache: Arc<QueryCache>,
    tracer: Arc<Tracer>,
    monitor: Arc<Monitor>,
    ttl_policy: TtlPolicy,
    project: String,
    project_specific_terms: Vec<String>,
    consumers: Vec<Arc<dyn InteractionConsumer>>,
}

impl PipelineController {
    /// Build a controller from its already-constructed collaborators.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        analyzer: Arc<QueryAnalyzer>,
        orchestrator: Arc<RetrievalOrchestrator>,
        reranker: Arc<Reranker>,
        synthesizer: Arc<AnswerSynthesizer>,
        cache: Arc<QueryCache>,
        tracer: Arc<Tracer>,
        monitor: Arc<Monitor>,
        project: impl Into<String>,
        project_specific_terms: Vec<String>,
    ) -> Self {
        Self {
            analyzer,
            orchestrator,
            reranker,
            synthesizer,
            cache,
            tracer,
            monitor,
            ttl_policy: TtlPolicy::default(),
            project: project.into(),
            project_specific_terms,
            consumers: Vec::new(),
        }
    }

    /// Register an auxiliary consumer of completed [`RunRecord`]s (the
    /// ingestion/feedback "brain" seam). No-op by default.
    #[must_use]
    pub fn with_consumer(mut self, consumer: Arc<dyn InteractionConsumer>) -> Self {
        self.consumers.push(consumer);
        self
    }

    /// Override the default per-intent TTL policy.
    #[must_use]
    pub fn with_ttl_policy(mut self, policy: TtlPolicy) -> Self {
        self.ttl_policy = policy;
        self
    }

    /// Run the full pipeline for `text`, returning the completed
    /// [`RunRecord`]. Never returns an `Err`: every internal failure is
    /// absorbed per §7 and surfaces as a degraded answer or sentinel.
    pub async fn ask(&self, text: &str, settings: PipelineSettings) -> RunRecord {
        let started = Instant::now();
        let mut trace = self.tracer.start("ask", text);

        let query = trace.span_async("analyze", || self.analyzer.analyze(text)).await;

        let project_specific_terms = &self.project_specific_terms;
        let mut strategy = trace
            .span("plan", || Ok(plan(&query, project_specific_terms)))
            .expect("planning never fails");
        if let Some(top_k) = settings.top_k_override {
            strategy.top_k = top_k;
        }
        let context_max_chars = settings.context_chars_override.unwrap_or(ragline_context::DEFAULT_MAX_CHARS);

        let key = cache_key(&CacheKeyParts {
            project: &self.project,
            normalized_query: &query.normalized(),
            intent: query.intent,
            top_k: strategy.top_k,
            context_max_chars,
            use_vector: strategy.use_vector,
            use_memory: strategy.use_memory,
            use_recent: strategy.use_recent,
        });

        if let Some(mut cached) = self.cache.get(&key) {
            cached.from_cache = true;
            cached.elapsed_sec = started.elapsed().as_secs_f64();
            self.finish(trace, cached.clone(), started);
            return cached;
        }

        let record = if strategy.mode == StrategyMode::None {
            let synthesized = trace
                .span_async("synthesize_nocontext", || {
                    self.synthesizer.synthesize_without_retrieval(&query.text, query.intent, &query.concepts)
                })
                .await;
            RunRecord {
                query: query.text.clone(),
                intent: query.intent,
                retrieved: 0,
                reranked: 0,
                context_chars: 0,
                confidence: synthesized.confidence,
                elapsed_sec: started.elapsed().as_secs_f64(),
                from_cache: false,
                answer: synthesized.answer,
                project: self.project.clone(),
                timestamp: Utc::now(),
                cache_ttl: self.ttl_policy.ttl_for(query.intent),
            }
        } else {
            let retrieved = trace.span_async("retrieve", || self.orchestrator.retrieve(&query, &strategy)).await;
            let retrieved_count = retrieved.len();

            let reranked = trace.span_async("rerank", || self.reranker.rerank(&query.text, retrieved, strategy.top_k)).await;
            let reranked_count = reranked.len();

            let context = trace
                .span("compress", || Ok(compress_context(&reranked, context_max_chars)))
                .expect("context compression never fails");
            let context_chars = context.chars().count();

            let synthesized = trace
                .span_async("synthesize", || {
                    self.synthesizer.synthesize(&query.text, query.intent, &query.concepts, retrieved_count, reranked_count, &context)
                })
                .await;

            RunRecord {
                query: query.text.clone(),
                intent: query.intent,
                retrieved: retrieved_count,
                reranked: reranked_count,
                context_chars,
                confidence: synthesized.confidence,
                elapsed_sec: started.elapsed().as_secs_f64(),
                from_cache: false,
                answer: synthesized.answer,
                project: self.project.clone(),
                timestamp: Utc::now(),
                cache_ttl: self.ttl_policy.ttl_for(query.intent),
            }
        };

        self.cache.set(&key, record.clone(), record.cache_ttl);
        self.finish(trace, record.clone(), started);
        record
    }

    fn finish(&self, trace: ragline_trace::ActiveTrace, record: RunRecord, _started: Instant) {
        self.monitor.log_run(&record);
        for consumer in &self.consumers {
            consumer.record_interaction(&record);
        }
        self.tracer.end(
            trace,
            Some(json!({
                "retrieved": record.retrieved,
                "reranked": record.reranked,
                "context_chars": record.context_chars,
                "confidence": record.confidence,
                "from_cache": record.from_cache,
            })),
        );
        info!(
            query = %record.query,
            confidence = record.confidence,
            from_cache = record.from_cache,
            elapsed_sec = record.elapsed_sec,
            "query completed"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ragline_context::KeywordSearch;
    use ragline_core::types::{Document, DocumentSource};
    use ragline_graph::EntityGraph;
    use ragline_memory::InMemoryMemoryClient;
    use ragline_providers::{LlmProvider, MockCrossEncoder, MockLlmProvider};
    use ragline_rag::{InMemoryVectorIndex, MockEmbeddingProvider};
    use tempfile::tempdir;

    struct NoopKeywordSearch;

    #[async_trait]
    impl KeywordSearch for NoopKeywordSearch {
        async fn search(&self, _query: &str, _limit: usize) -> Vec<Document> {
            Vec::new()
        }
    }

    fn controller(dir: &std::path::Path, memory_docs: Vec<Document>, main_llm: MockLlmProvider) -> PipelineController {
        let vector = Arc::new(InMemoryVectorIndex::new(Arc::new(MockEmbeddingProvider::default())));
        let memory = Arc::new(InMemoryMemoryClient::new(memory_docs));
        let keyword = Arc::new(NoopKeywordSearch);
        let code_root = dir.join("code_root");
        std::fs::create_dir_all(&code_root).unwrap();
        let code = Arc::new(ragline_context::CodeSymbolIndex::empty(&code_root));
        let graph = Arc::new(EntityGraph::empty());
        let analyzer = Arc::new(QueryAnalyzer::new(Arc::new(MockLlmProvider::empty())));
        let planner_llm: Arc<dyn LlmProvider> = Arc::new(MockLlmProvider::empty());
        let orchestrator = Arc::new(RetrievalOrchestrator::new(vector, memory, keyword, code, graph, Arc::clone(&analyzer), planner_llm));
        let reranker = Arc::new(Reranker::new(Arc::new(MockCrossEncoder::new())));
        let synthesizer = Arc::new(AnswerSynthesizer::new(Arc::new(main_llm)));
        let cache = Arc::new(QueryCache::new(dir, "demo", 256));
        let tracer = Arc::new(Tracer::new(dir));
        let monitor = Arc::new(Monitor::new(dir));

        PipelineController::new(analyzer, orchestrator, reranker, synthesizer, cache, tracer, monitor, "demo", vec![])
    }

    #[tokio::test]
    async fn empty_retrieval_produces_sentinel_with_zero_confidence() {
        let dir = tempdir().unwrap();
        let pipeline = controller(dir.path(), vec![], MockLlmProvider::empty());
        let record = pipeline.ask("show me the function compress_context", PipelineSettings::default()).await;
        assert_eq!(record.retrieved, 0);
        assert_eq!(record.confidence, 0.0);
        assert!(record.answer.contains("No relevant information"));
    }

    #[tokio::test]
    async fn second_identical_query_is_served_from_cache() {
        let dir = tempdir().unwrap();
        let doc = Document::new("walk forward backtest details", DocumentSource::Memory, "walk forward backtest details");
        let llm = MockLlmProvider::empty().with_response("QUESTION", "the walk-forward result is stable");
        let pipeline = controller(dir.path(), vec![doc], llm);

        let first = pipeline.ask("explain the walk forward backtest", PipelineSettings::default()).await;
        assert!(!first.from_cache);

        let second = pipeline.ask("explain the walk forward backtest", PipelineSettings::default()).await;
        assert!(second.from_cache);
        assert_eq!(second.answer, first.answer);
    }

    #[tokio::test]
    async fn top_k_override_is_respected_in_cache_key() {
        let dir = tempdir().unwrap();
        let pipeline = controller(dir.path(), vec![], MockLlmProvider::empty());
        let a = pipeline
            .ask("what is a cache", PipelineSettings { top_k_override: Some(5), ..Default::default() })
            .await;
        let b = pipeline
            .ask("what is a cache", PipelineSettings { top_k_override: Some(99), ..Default::default() })
            .await;
        assert!(!a.from_cache);
        assert!(!b.from_cache);
    }
}
