//! The cross-encoder trait used by stage 2 of the re-ranker (C9).

use async_trait::async_trait;

use crate::error::Result;

/// Scores `(query, document)` pairs with a relevance score, as opposed to a
/// bi-encoder's independent embedding comparison.
///
/// The real model (e.g. a DeBERTa-style cross-encoder) is an opaque
/// collaborator per scope; this crate ships only the trait and a
/// deterministic mock so the re-ranker can be built and tested without a
/// model download.
#[async_trait]
pub trait CrossEncoder: Send + Sync {
    /// Score each `(query, content)` pair, returning one score per pair in
    /// the same order. Must return a vector the same length as `pairs`;
    /// a mismatch is an invariant violation for the caller to raise.
    async fn score(&self, pairs: &[(String, String)]) -> Result<Vec<f64>>;
}

/// Deterministic cross-encoder stand-in: scores a pair by the fraction of
/// query tokens that appear in the document, scaled into a score range
/// comparable to a real cross-encoder's (`[0, 1]` typically, occasionally
/// exceeding it slightly for strong matches, as a trained model would).
#[derive(Debug, Clone, Copy, Default)]
pub struct MockCrossEncoder;

impl MockCrossEncoder {
    /// A fresh mock cross-encoder.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    fn score_pair(query: &str, content: &str) -> f64 {
        let query_tokens: Vec<&str> = query.split_whitespace().collect();
        if query_tokens.is_empty() {
            return 0.0;
        }
        let content_lower = content.to_lowercase();
        let hits = query_tokens
            .iter()
            .filter(|t| content_lower.contains(&t.to_lowercase()))
            .count();
        hits as f64 / query_tokens.len() as f64
    }
}

#[async_trait]
impl CrossEncoder for MockCrossEncoder {
    async fn score(&self, pairs: &[(String, String)]) -> Result<Vec<f64>> {
        Ok(pairs
            .iter()
            .map(|(q, d)| Self::score_pair(q, d))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mock_cross_encoder_scores_full_overlap_highest() {
        let ce = MockCrossEncoder::new();
        let scores = ce
            .score(&[
                ("walk forward".to_string(), "a walk forward test".to_string()),
                ("walk forward".to_string(), "unrelated content".to_string()),
            ])
            .await
            .unwrap();
        assert!(scores[0] > scores[1]);
        assert!((scores[0] - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn mock_cross_encoder_preserves_length() {
        let ce = MockCrossEncoder::new();
        let pairs: Vec<(String, String)> = (0..5)
            .map(|i| ("q".to_string(), format!("doc {i}")))
            .collect();
        let scores = ce.score(&pairs).await.unwrap();
        assert_eq!(scores.len(), pairs.len());
    }
}
