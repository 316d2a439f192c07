// ABOUTME: Answer synthesizer (C11) — builds the final prompt, calls the
// ABOUTME: main LLM, and computes the deterministic confidence score

//! Formats a single prompt from the query, intent, concepts, retrieval
//! counts, and compressed context; calls the main LLM; and derives a
//! confidence score that depends only on how many documents survived
//! re-ranking.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

mod synthesizer;

pub use synthesizer::{AnswerSynthesizer, SynthesizedAnswer};
