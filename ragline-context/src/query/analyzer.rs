//! Runs the four query-understanding sub-extractors concurrently.

use std::sync::Arc;
use std::sync::LazyLock;

use ragline_core::types::{Intent, Query, Temporal};
use ragline_providers::{CompletionOptions, LlmProvider};
use tracing::warn;

/// Keyword/days-back table for temporal cue extraction. Order matters: the
/// first matching keyword wins.
static TEMPORAL_KEYWORDS: &[(&str, i64)] = &[
    ("today", 0),
    ("yesterday", 1),
    ("day before", 2),
    ("week", 7),
    ("month", 30),
    ("recent", 7),
    ("last", 3),
    ("new", 3),
    ("current", 1),
];

/// Intent keyword table, evaluated in order; first match wins.
static INTENT_KEYWORDS: LazyLock<[(Intent, Vec<&'static str>); 4]> = LazyLock::new(|| {
    [
        (
            Intent::Code,
            vec!["function", "method", "class", "code", "implementation", "compile", "bug"],
        ),
        (
            Intent::Config,
            vec!["config", "configuration", "setting", "setup", "environment variable", "flag"],
        ),
        (
            Intent::Explain,
            vec!["explain", "describe", "why", "how does", "overview", "understand"],
        ),
        (
            Intent::Status,
            vec!["status", "health", "running", "current state"],
        ),
    ]
});

/// Extract the temporal cue from `query`, if any. Pure, keyword-table based.
#[must_use]
pub fn extract_temporal(query: &str) -> Temporal {
    let lower = query.to_lowercase();
    for (keyword, days) in TEMPORAL_KEYWORDS {
        if lower.contains(keyword) {
            return Temporal {
                present: true,
                days_back: *days,
                keyword: Some((*keyword).to_string()),
            };
        }
    }
    Temporal::default()
}

/// Classify `query`'s intent by keyword membership. Pure.
#[must_use]
pub fn classify_intent(query: &str) -> Intent {
    let lower = query.to_lowercase();
    for (intent, keywords) in INTENT_KEYWORDS.iter() {
        if keywords.iter().any(|kw| lower.contains(kw)) {
            return *intent;
        }
    }
    Intent::General
}

fn non_empty_lines(text: &str, max: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}

/// Runs the four query-understanding sub-extractors concurrently, each with
/// its own failure domain: an LLM call failing degrades that field to empty,
/// it never fails the whole analysis.
pub struct QueryAnalyzer {
    fast_llm: Arc<dyn LlmProvider>,
}

impl QueryAnalyzer {
    /// Build an analyzer backed by the fast model.
    #[must_use]
    pub fn new(fast_llm: Arc<dyn LlmProvider>) -> Self {
        Self { fast_llm }
    }

    /// Extract at most 5 short concept phrases via the fast LLM.
    pub async fn extract_concepts(&self, query: &str) -> Vec<String> {
        let prompt = format!(
            "List up to 5 short key concepts (one per line, no numbering) in this question:\n{query}"
        );
        match self.fast_llm.complete(&prompt, &CompletionOptions::default()).await {
            Ok(text) => non_empty_lines(&text, 5),
            Err(err) => {
                warn!(error = %err, "concept extraction failed, defaulting to empty");
                Vec::new()
            }
        }
    }

    /// Generate at most 3 alternate phrasings via the fast LLM.
    pub async fn expand_query(&self, query: &str) -> Vec<String> {
        let prompt = format!(
            "Write up to 3 alternate phrasings (one per line, no numbering) of this question:\n{query}"
        );
        match self.fast_llm.complete(&prompt, &CompletionOptions::default()).await {
            Ok(text) => non_empty_lines(&text, 3),
            Err(err) => {
                warn!(error = %err, "query expansion failed, defaulting to empty");
                Vec::new()
            }
        }
    }

    /// Run all four sub-extractors and assemble an analyzed [`Query`].
    pub async fn analyze(&self, text: &str) -> Query {
        let (concepts, expansions, temporal, intent) = tokio::join!(
            self.extract_concepts(text),
            self.expand_query(text),
            async { extract_temporal(text) },
            async { classify_intent(text) },
        );

        Query {
            text: text.to_string(),
            concepts,
            expansions,
            temporal,
            intent,
        }
    }
}
