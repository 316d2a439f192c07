//! Data model shared by every stage of the pipeline.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Coarse classification of a query, driving retriever routing and budgets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    /// The query is about source code ("show me the function ...").
    Code,
    /// The query is about configuration or setup.
    Config,
    /// The query asks for an explanation of a system or concept.
    Explain,
    /// The query asks about current state or status.
    Status,
    /// Anything not matched by a more specific intent.
    General,
}

impl Default for Intent {
    fn default() -> Self {
        Self::General
    }
}

impl Intent {
    /// The name used for per-intent cache TTL lookups and trace fields.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Code => "code",
            Self::Config => "config",
            Self::Explain => "explain",
            Self::Status => "status",
            Self::General => "general",
        }
    }
}

/// Temporal cue extracted from a query ("what changed yesterday").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Temporal {
    /// Whether a temporal keyword was found.
    pub present: bool,
    /// How many days back the keyword implies.
    pub days_back: i64,
    /// The matched keyword, if any.
    pub keyword: Option<String>,
}

/// A query plus the fields derived from it by the analyzer.
///
/// Immutable once analysis completes: every field below is produced once,
/// by the analyzer, before the query is handed to the strategy planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Query {
    /// The raw, unmodified question text.
    pub text: String,
    /// Short phrases capturing the query's key concepts (at most 5).
    pub concepts: Vec<String>,
    /// Alternate phrasings of the query (at most 3).
    pub expansions: Vec<String>,
    /// Temporal cue, if any.
    pub temporal: Temporal,
    /// Coarse intent classification.
    pub intent: Intent,
}

impl Query {
    /// Start a new query analysis with only the raw text populated.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            concepts: Vec::new(),
            expansions: Vec::new(),
            temporal: Temporal::default(),
            intent: Intent::default(),
        }
    }

    /// Normalized form used for cache-key derivation: lowercase,
    /// alphanumeric-only, single-spaced.
    #[must_use]
    pub fn normalized(&self) -> String {
        let mut out = String::with_capacity(self.text.len());
        let mut last_was_space = true;
        for ch in self.text.to_lowercase().chars() {
            if ch.is_alphanumeric() {
                out.push(ch);
                last_was_space = false;
            } else if !last_was_space {
                out.push(' ');
                last_was_space = true;
            }
        }
        out.trim_end().to_string()
    }
}

/// Where a [`Document`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum DocumentSource {
    /// Vector/semantic similarity search.
    Vector,
    /// The external memory service.
    Memory,
    /// The keyword scanner.
    Keyword,
    /// The code symbol index.
    Code,
    /// Filesystem-scan fallback when the code symbol cache is unavailable.
    CodeFallback,
    /// The static entity graph.
    EntityGraph,
    /// The temporal memory retriever.
    Temporal,
}

/// A retrieved piece of evidence flowing through the pipeline.
///
/// Scoring fields are added by successive stages and never reassigned once
/// set: `score`/`vector_score` by retrievers, `temporal_boost` by the
/// temporal retriever, `final_score` by the re-ranker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Stable, content-derived identifier (first 16 hex chars of a SHA-256 digest).
    pub id: String,
    /// The document's text content.
    pub content: String,
    /// Which retriever produced this document.
    pub source: DocumentSource,
    /// Source-specific metadata (entity name, timestamps, doc type, ...).
    pub metadata: HashMap<String, Value>,
    /// Raw retriever score, scale depends on source.
    pub score: Option<f64>,
    /// Cosine-similarity style score from vector retrieval, in `[0, 1]`.
    pub vector_score: Option<f64>,
    /// Multiplicative recency adjustment applied by the temporal retriever.
    pub temporal_boost: Option<f64>,
    /// Combined score computed by the re-ranker; drives final ordering.
    pub final_score: Option<f64>,
}

impl Document {
    /// Build a document, deriving its id from a dedup key (typically the
    /// first 200 chars of `content`) via SHA-256.
    #[must_use]
    pub fn new(content: impl Into<String>, source: DocumentSource, dedup_key: &str) -> Self {
        Self {
            id: content_id(dedup_key),
            content: content.into(),
            source,
            metadata: HashMap::new(),
            score: None,
            vector_score: None,
            temporal_boost: None,
            final_score: None,
        }
    }

    /// Attach metadata, replacing the previous map.
    #[must_use]
    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Set the raw retriever score.
    #[must_use]
    pub const fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Set the vector similarity score.
    #[must_use]
    pub const fn with_vector_score(mut self, score: f64) -> Self {
        self.vector_score = Some(score);
        self
    }

    /// The key used for cross-retriever deduplication: the first 200 chars
    /// of the content, hashed.
    #[must_use]
    pub fn dedup_key(&self) -> String {
        let prefix: String = self.content.chars().take(200).collect();
        content_id(&prefix)
    }
}

/// First 16 hex characters of the SHA-256 digest of `key`.
#[must_use]
pub fn content_id(key: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    let digest = hasher.finalize();
    digest.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

/// Retrieval mode chosen by the strategy planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyMode {
    /// Combine all enabled retrievers.
    Hybrid,
    /// Skip retrieval entirely (generic definitional queries).
    None,
}

/// Retriever selection and budgets decided by the strategy planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Strategy {
    /// Whether to retrieve at all.
    pub mode: StrategyMode,
    /// Enable the vector index client.
    pub use_vector: bool,
    /// Enable the memory search client.
    pub use_memory: bool,
    /// Enable the temporal memory retriever.
    pub use_recent: bool,
    /// Enable the code symbol index.
    pub use_code: bool,
    /// Enable the keyword scanner.
    pub use_keywords: bool,
    /// Enable the entity graph.
    pub use_graph: bool,
    /// Decompose the query into sub-questions before retrieval.
    pub use_planning: bool,
    /// Final number of documents to keep after re-ranking.
    pub top_k: usize,
    /// Number of results requested per vector query variant.
    pub vector_n_results: usize,
    /// Number of results requested from the memory client for the original query.
    pub memory_limit: usize,
    /// Number of concepts to additionally query the memory client with.
    pub memory_concepts: usize,
    /// Number of results requested from the keyword scanner.
    pub keyword_limit: usize,
    /// Number of results requested from the entity graph.
    pub graph_limit: usize,
    /// Number of results requested from the code symbol index.
    pub code_limit: usize,
    /// Half-life, in days, for the temporal recency boost's exponential tail.
    pub half_life_days: i64,
}

impl Strategy {
    /// The base defaults from which the planner's rules adjust.
    #[must_use]
    pub fn base_defaults(intent: Intent, temporal_present: bool) -> Self {
        Self {
            mode: StrategyMode::Hybrid,
            use_vector: true,
            use_memory: true,
            use_recent: temporal_present,
            use_code: intent == Intent::Code,
            use_keywords: true,
            use_graph: matches!(intent, Intent::Status | Intent::Explain | Intent::General),
            use_planning: false,
            top_k: 20,
            vector_n_results: 10,
            memory_limit: 20,
            memory_concepts: 3,
            keyword_limit: 10,
            graph_limit: 5,
            code_limit: 20,
            half_life_days: 3,
        }
    }

    /// A `mode=none` strategy that skips every retriever.
    #[must_use]
    pub fn skip_retrieval() -> Self {
        Self {
            mode: StrategyMode::None,
            use_vector: false,
            use_memory: false,
            use_recent: false,
            use_code: false,
            use_keywords: false,
            use_graph: false,
            use_planning: false,
            ..Self::base_defaults(Intent::General, false)
        }
    }
}

/// The canonical object produced by one pipeline execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// The original question text.
    pub query: String,
    /// Classified intent.
    pub intent: Intent,
    /// Number of documents retrieved before re-ranking.
    pub retrieved: usize,
    /// Number of documents kept after re-ranking.
    pub reranked: usize,
    /// Size of the compressed context handed to the synthesizer.
    pub context_chars: usize,
    /// Confidence score in `[0, 100]`.
    pub confidence: f64,
    /// Wall-clock seconds the run took.
    pub elapsed_sec: f64,
    /// Whether this record was served from the cache.
    pub from_cache: bool,
    /// The synthesized answer text.
    pub answer: String,
    /// The project this run was scoped to.
    pub project: String,
    /// When the run completed.
    pub timestamp: DateTime<Utc>,
    /// The cache TTL (seconds) this record was stored with.
    pub cache_ttl: u64,
}

/// A cache entry on disk: `{ts, ttl, payload}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Wall-clock seconds at write time.
    pub ts: f64,
    /// Time-to-live, in seconds.
    pub ttl: u64,
    /// The cached run record.
    pub payload: RunRecord,
}

/// One closed span within a [`Trace`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TraceSpan {
    /// Span name (pipeline stage).
    pub name: String,
    /// Start time, wall-clock seconds.
    pub start: f64,
    /// End time, wall-clock seconds.
    pub end: f64,
    /// `end - start`, in milliseconds.
    pub duration_ms: f64,
    /// `"ok"` or `"error"`.
    pub status: String,
    /// Arbitrary span attributes.
    pub attributes: HashMap<String, Value>,
    /// Error message, if `status == "error"`.
    pub error: Option<String>,
}

/// A full pipeline execution trace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trace {
    /// Unique id for this trace (`{operation}_{epoch_ms}`).
    pub trace_id: String,
    /// The pipeline operation being traced (e.g. `"ask"`).
    pub operation: String,
    /// The query text, truncated to 200 chars.
    pub query: String,
    /// ISO-8601 start timestamp.
    pub start_ts: DateTime<Utc>,
    /// ISO-8601 end timestamp.
    pub end_ts: Option<DateTime<Utc>>,
    /// Total duration in milliseconds.
    pub duration_ms: Option<f64>,
    /// Closed spans, in close order.
    pub spans: Vec<TraceSpan>,
    /// Summary of the run's result, attached at `end_trace`.
    pub result: Option<Value>,
}
