//! Two-stage re-ranker (C9): a cheap score-sum filter followed by
//! cross-encoder scoring with signal fusion.

use std::cmp::Ordering;
use std::sync::Arc;

use ragline_core::types::Document;
use ragline_providers::CrossEncoder;
use tracing::warn;

const MIN_STAGE1_CANDIDATES: usize = 50;
const CONTENT_SNIPPET_CHARS: usize = 1000;
const VECTOR_SCORE_WEIGHT: f64 = 0.2;
const VERBATIM_MATCH_MULTIPLIER: f64 = 1.2;

/// Runs stage 1 (cheap score-sum filter) then stage 2 (cross-encoder
/// scoring with signal fusion) over a candidate set.
pub struct Reranker {
    cross_encoder: Arc<dyn CrossEncoder>,
}

impl Reranker {
    /// Build a re-ranker backed by `cross_encoder`.
    #[must_use]
    pub fn new(cross_encoder: Arc<dyn CrossEncoder>) -> Self {
        Self { cross_encoder }
    }

    /// Re-rank `candidates` for `query`, returning at most `top_k`
    /// documents ordered by `final_score` descending (stable).
    pub async fn rerank(&self, query: &str, candidates: Vec<Document>, top_k: usize) -> Vec<Document> {
        if candidates.is_empty() {
            return Vec::new();
        }

        let stage1 = cheap_filter(candidates, top_k);
        let pairs: Vec<(String, String)> = stage1
            .iter()
            .map(|doc| (query.to_string(), doc.content.chars().take(CONTENT_SNIPPET_CHARS).collect()))
            .collect();

        let scores = match self.cross_encoder.score(&pairs).await {
            Ok(scores) => scores,
            Err(err) => {
                warn!(error = %err, "cross-encoder scoring failed, treating all candidates as score 0");
                vec![0.0; stage1.len()]
            }
        };

        let lower_query = query.to_lowercase();
        let mut scored: Vec<Document> = stage1
            .into_iter()
            .zip(scores)
            .map(|(mut doc, ce_score)| {
                doc.final_score = Some(fuse_score(&doc, ce_score, &lower_query));
                doc
            })
            .collect();

        scored.sort_by(|a, b| {
            b.final_score
                .unwrap_or(0.0)
                .partial_cmp(&a.final_score.unwrap_or(0.0))
                .unwrap_or(Ordering::Equal)
        });
        scored.truncate(top_k);
        scored
    }
}

fn fuse_score(doc: &Document, ce_score: f64, lower_query: &str) -> f64 {
    let mut final_score = ce_score;
    if let Some(vector_score) = doc.vector_score {
        final_score += VECTOR_SCORE_WEIGHT * vector_score;
    }
    if let Some(temporal_boost) = doc.temporal_boost {
        final_score *= temporal_boost;
    }
    if doc.content.to_lowercase().contains(lower_query) {
        final_score *= VERBATIM_MATCH_MULTIPLIER;
    }
    final_score
}

fn cheap_filter(mut candidates: Vec<Document>, top_k: usize) -> Vec<Document> {
    let keep = MIN_STAGE1_CANDIDATES.max(2 * top_k);
    candidates.sort_by(|a, b| {
        let score_a = a.score.unwrap_or(0.0) + a.vector_score.unwrap_or(0.0);
        let score_b = b.score.unwrap_or(0.0) + b.vector_score.unwrap_or(0.0);
        score_b.partial_cmp(&score_a).unwrap_or(Ordering::Equal)
    });
    candidates.truncate(keep);
    candidates
}
