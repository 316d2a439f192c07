//! The quality panel (evaluation harness): runs a fixed suite of
//! question/ideal-answer pairs through the pipeline and scores each answer
//! on a 0-10 scale across four token-overlap-based dimensions.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::controller::{PipelineController, PipelineSettings};

/// One test case: a question and the answer it should resemble.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TestCase {
    /// The question to ask the pipeline.
    pub question: String,
    /// The reference answer to compare against.
    pub ideal_answer: String,
}

/// A suite of test cases, as read from a JSON file (`{"tests": [...]}`).
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TestSuite {
    /// The individual cases to run.
    pub tests: Vec<TestCase>,
}

/// The four scored dimensions, each on a 0-10 scale.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Scores {
    /// Token overlap of the answer against the ideal answer.
    pub precision: f64,
    /// Whether the answer shows evidence of citing retrieved context
    /// (looks for a `[Doc N]`-style marker).
    pub context_usage: f64,
    /// Inverse of the hallucination penalty: high when the answer agrees
    /// with the ideal answer or is appropriately uncertain.
    pub hallucination: f64,
    /// Fraction of the ideal answer's tokens reproduced in the answer.
    pub completeness: f64,
}

/// One scored run: the case, the system's answer, and its scores.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredCase {
    /// The question asked.
    pub question: String,
    /// The reference answer.
    pub ideal_answer: String,
    /// The pipeline's answer.
    pub system_answer: String,
    /// The pipeline's self-reported confidence for this run.
    pub confidence: f64,
    /// The four scored dimensions.
    pub scores: Scores,
}

/// Suite-wide averages across every scored case.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TestSuiteSummary {
    /// Mean of [`Scores::precision`] across the suite.
    pub avg_precision: f64,
    /// Mean of [`Scores::context_usage`] across the suite.
    pub avg_context_usage: f64,
    /// Mean of [`Scores::hallucination`] across the suite.
    pub avg_hallucination: f64,
    /// Mean of [`Scores::completeness`] across the suite.
    pub avg_completeness: f64,
}

fn tokenize(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// `|tokens(a) ∩ tokens(b)| / max(1, |tokens(b)|)` — normalized by `b`'s
/// token count, not `a`'s, so swapping the arguments changes the score.
fn overlap_score(a: &str, b: &str) -> f64 {
    let a_tokens = tokenize(a);
    let b_tokens = tokenize(b);
    let shared = a_tokens.intersection(&b_tokens).count();
    shared as f64 / b_tokens.len().max(1) as f64
}

fn completeness_score(ideal: &str, answer: &str) -> f64 {
    let ideal_tokens = tokenize(ideal);
    if ideal_tokens.is_empty() {
        return 0.0;
    }
    let answer_tokens = tokenize(answer);
    let shared = ideal_tokens.intersection(&answer_tokens).count();
    shared as f64 / ideal_tokens.len() as f64
}

fn context_usage_score(answer: &str) -> f64 {
    if answer.contains("[Doc ") {
        1.0
    } else {
        0.3
    }
}

fn hallucination_penalty(ideal: &str, answer: &str) -> f64 {
    let overlap = overlap_score(ideal, answer);
    let cites = context_usage_score(answer);
    if overlap > 0.5 {
        0.0
    } else if overlap < 0.2 && cites < 0.5 {
        0.8
    } else {
        0.3
    }
}

/// Score one answer against its ideal answer, on a 0-10 scale.
#[must_use]
pub fn score_answer(ideal_answer: &str, system_answer: &str) -> Scores {
    let precision = overlap_score(ideal_answer, system_answer);
    let completeness = completeness_score(ideal_answer, system_answer);
    let context_usage = context_usage_score(system_answer);
    let hallucination = 1.0 - hallucination_penalty(ideal_answer, system_answer);

    Scores {
        precision: round2(precision * 10.0),
        context_usage: round2(context_usage * 10.0),
        hallucination: round2(hallucination * 10.0),
        completeness: round2(completeness * 10.0),
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Run every case in `suite` through `controller` and score the results.
pub async fn run_quality_suite(controller: &PipelineController, suite: &TestSuite) -> (Vec<ScoredCase>, TestSuiteSummary) {
    let mut cases = Vec::with_capacity(suite.tests.len());

    for test in &suite.tests {
        let record = controller.ask(&test.question, PipelineSettings::default()).await;
        let scores = score_answer(&test.ideal_answer, &record.answer);
        cases.push(ScoredCase {
            question: test.question.clone(),
            ideal_answer: test.ideal_answer.clone(),
            system_answer: record.answer,
            confidence: record.confidence,
            scores,
        });
    }

    let summary = summarize(&cases);
    (cases, summary)
}

fn summarize(cases: &[ScoredCase]) -> TestSuiteSummary {
    let count = cases.len().max(1) as f64;
    let mut total = Scores { precision: 0.0, context_usage: 0.0, hallucination: 0.0, completeness: 0.0 };
    for case in cases {
        total.precision += case.scores.precision;
        total.context_usage += case.scores.context_usage;
        total.hallucination += case.scores.hallucination;
        total.completeness += case.scores.completeness;
    }
    TestSuiteSummary {
        avg_precision: round2(total.precision / count),
        avg_context_usage: round2(total.context_usage / count),
        avg_hallucination: round2(total.hallucination / count),
        avg_completeness: round2(total.completeness / count),
    }
}
