//! Prompt assembly, main-LLM call, and confidence scoring.

use std::sync::Arc;

use ragline_core::types::Intent;
use ragline_providers::{CompletionOptions, LlmProvider};
use tracing::warn;

const SYNTHESIS_TEMPERATURE: f32 = 0.2;
const SYNTHESIS_MAX_TOKENS: u32 = 8000;
const CONFIDENCE_PER_DOC: f64 = 2.0;
const CONFIDENCE_CAP: f64 = 100.0;

const NO_INFO_SENTINEL: &str = "No relevant information was found in the knowledge base.";
const NO_CONTEXT_CONFIDENCE: f64 = 50.0;

/// The synthesizer's output: the answer text plus its confidence.
#[derive(Debug, Clone)]
pub struct SynthesizedAnswer {
    /// The answer text, or a sentinel when no context/LLM output was available.
    pub answer: String,
    /// Confidence in `[0, 100]`.
    pub confidence: f64,
}

/// Builds the synthesis prompt and calls the main LLM.
pub struct AnswerSynthesizer {
    main_llm: Arc<dyn LlmProvider>,
}

impl AnswerSynthesizer {
    /// Build a synthesizer backed by the main (not fast) model.
    #[must_use]
    pub fn new(main_llm: Arc<dyn LlmProvider>) -> Self {
        Self { main_llm }
    }

    /// Synthesize an answer for `query` from `context`, a compressed
    /// document bundle already formatted by the context compressor.
    ///
    /// An empty `context` short-circuits to the "no information found"
    /// sentinel with confidence 0, without calling the LLM. A same-shaped
    /// sentinel is returned if the LLM call itself fails, also with
    /// confidence forced to 0 regardless of `reranked_docs`.
    pub async fn synthesize(
        &self,
        query: &str,
        intent: Intent,
        concepts: &[String],
        total_docs: usize,
        reranked_docs: usize,
        context: &str,
    ) -> SynthesizedAnswer {
        if context.is_empty() {
            return SynthesizedAnswer {
                answer: NO_INFO_SENTINEL.to_string(),
                confidence: 0.0,
            };
        }

        let prompt = build_prompt(query, intent, concepts, total_docs, reranked_docs, context);
        let options = CompletionOptions {
            temperature: SYNTHESIS_TEMPERATURE,
            max_tokens: SYNTHESIS_MAX_TOKENS,
        };

        match self.main_llm.complete(&prompt, &options).await {
            Ok(answer) => SynthesizedAnswer {
                answer,
                confidence: confidence_for(reranked_docs),
            },
            Err(err) => {
                warn!(error = %err, "answer synthesis failed");
                SynthesizedAnswer {
                    answer: format!("Error generating answer: {err}"),
                    confidence: 0.0,
                }
            }
        }
    }

    /// Synthesize an answer for a `mode=none` strategy, where retrieval was
    /// deliberately skipped (e.g. a generic definitional question). The
    /// model answers from its own knowledge with no retrieved context.
    /// Confidence is a fixed 50 on success, matching the spec's `mode=none`
    /// boundary case; a failed LLM call still forces confidence to 0.
    pub async fn synthesize_without_retrieval(
        &self,
        query: &str,
        intent: Intent,
        concepts: &[String],
    ) -> SynthesizedAnswer {
        let prompt = build_no_context_prompt(query, intent, concepts);
        let options = CompletionOptions {
            temperature: SYNTHESIS_TEMPERATURE,
            max_tokens: SYNTHESIS_MAX_TOKENS,
        };

        match self.main_llm.complete(&prompt, &options).await {
            Ok(answer) => SynthesizedAnswer {
                answer,
                confidence: NO_CONTEXT_CONFIDENCE,
            },
            Err(err) => {
                warn!(error = %err, "no-context answer synthesis failed");
                SynthesizedAnswer {
                    answer: format!("Error generating answer: {err}"),
                    confidence: 0.0,
                }
            }
        }
    }
}

/// `min(100, 2.0 * reranked_doc_count)`. Deterministic, independent of
/// answer content.
#[must_use]
pub fn confidence_for(reranked_docs: usize) -> f64 {
    (reranked_docs as f64 * CONFIDENCE_PER_DOC).min(CONFIDENCE_CAP)
}

fn build_prompt(query: &str, intent: Intent, concepts: &[String], total_docs: usize, reranked_docs: usize, context: &str) -> String {
    format!(
        "You are an expert assistant answering questions about this project's codebase \
         and documentation.\n\n\
         CONTEXT ANALYSIS:\n\
         - Query: {query}\n\
         - Intent: {}\n\
         - Key concepts: {}\n\
         - Documents found: {total_docs} -> {reranked_docs} after re-ranking\n\n\
         RELEVANT DOCUMENTS:\n{context}\n\n\
         INSTRUCTIONS:\n\
         1. Reason silently about what the question is really asking, which documents \
            are most relevant, and whether any information conflicts.\n\
         2. Combine information from multiple sources, preferring the most recent where \
            sources disagree.\n\
         3. Write a structured answer: begin with a short executive summary, cite \
            sources as [Doc N], include any commands, code, or configuration verbatim, \
            and note if the available information is incomplete.\n\n\
         QUESTION: {query}\n\n\
         ANSWER (skip the analysis section, go straight to the synthesized answer):",
        intent.as_str(),
        concepts.join(", "),
    )
}

fn build_no_context_prompt(query: &str, intent: Intent, concepts: &[String]) -> String {
    format!(
        "You are an expert assistant answering general questions about this project. \
         No specific documents were retrieved for this question because it looks generic \
         or definitional rather than project-specific.\n\n\
         Intent: {}\n\
         Key concepts: {}\n\n\
         Answer from general knowledge, concisely and without fabricating project-specific \
         details you cannot support.\n\n\
         QUESTION: {query}\n\n\
         ANSWER:",
        intent.as_str(),
        concepts.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragline_providers::MockLlmProvider;

    #[tokio::test]
    async fn empty_context_short_circuits_to_sentinel() {
        let synth = AnswerSynthesizer::new(Arc::new(MockLlmProvider::empty()));
        let result = synth.synthesize("what is x", Intent::General, &[], 0, 0, "").await;
        assert_eq!(result.answer, NO_INFO_SENTINEL);
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn successful_synthesis_scores_confidence_from_reranked_count() {
        let llm = MockLlmProvider::empty().with_response("QUESTION", "the answer is [Doc 1]");
        let synth = AnswerSynthesizer::new(Arc::new(llm));
        let result = synth
            .synthesize("what is x", Intent::General, &["x".to_string()], 20, 10, "[Doc 1] ...")
            .await;
        assert_eq!(result.answer, "the answer is [Doc 1]");
        assert_eq!(result.confidence, 20.0);
    }

    #[tokio::test]
    async fn confidence_caps_at_one_hundred() {
        let llm = MockLlmProvider::empty().with_response("QUESTION", "answer");
        let synth = AnswerSynthesizer::new(Arc::new(llm));
        let result = synth
            .synthesize("q", Intent::General, &[], 100, 80, "some context")
            .await;
        assert_eq!(result.confidence, 100.0);
    }

    #[tokio::test]
    async fn llm_failure_forces_confidence_to_zero() {
        struct FailingLlm;
        #[async_trait::async_trait]
        impl LlmProvider for FailingLlm {
            async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> ragline_providers::Result<String> {
                Err(ragline_providers::ProviderError::Timeout)
            }
        }
        let synth = AnswerSynthesizer::new(Arc::new(FailingLlm));
        let result = synth.synthesize("q", Intent::General, &[], 10, 10, "some context").await;
        assert!(result.answer.starts_with("Error generating answer"));
        assert_eq!(result.confidence, 0.0);
    }

    #[tokio::test]
    async fn no_context_synthesis_scores_fixed_fifty_on_success() {
        let llm = MockLlmProvider::empty().with_response("QUESTION", "a cache stores results for reuse");
        let synth = AnswerSynthesizer::new(Arc::new(llm));
        let result = synth
            .synthesize_without_retrieval("what is a cache", Intent::General, &[])
            .await;
        assert_eq!(result.answer, "a cache stores results for reuse");
        assert_eq!(result.confidence, 50.0);
    }

    #[tokio::test]
    async fn no_context_synthesis_forces_zero_on_llm_failure() {
        struct FailingLlm;
        #[async_trait::async_trait]
        impl LlmProvider for FailingLlm {
            async fn complete(&self, _prompt: &str, _options: &CompletionOptions) -> ragline_providers::Result<String> {
                Err(ragline_providers::ProviderError::Timeout)
            }
        }
        let synth = AnswerSynthesizer::new(Arc::new(FailingLlm));
        let result = synth
            .synthesize_without_retrieval("what is a cache", Intent::General, &[])
            .await;
        assert!(result.answer.starts_with("Error generating answer"));
        assert_eq!(result.confidence, 0.0);
    }
}
