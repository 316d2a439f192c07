//! Context compressor (C10): packs a ranked document list into a
//! character budget, prioritizing the first ten and highest-scoring docs
//! for full inclusion.

use ragline_core::types::Document;

/// Default character budget when the caller does not override it.
pub const DEFAULT_MAX_CHARS: usize = 120_000;

const FULL_INCLUSION_RANK_CUTOFF: usize = 10;
const FULL_INCLUSION_SCORE_CUTOFF: f64 = 0.8;
const TRUNCATION_MIN_REMAINING: usize = 500;
const SUMMARY_CHARS: usize = 1500;
const TRUNCATED_SUFFIX: &str = "... [truncated]\n";

/// Compress `docs` (already ranked, highest `final_score` first) into a
/// single string no longer than `max_chars` characters.
#[must_use]
pub fn compress_context(docs: &[Document], max_chars: usize) -> String {
    let mut output = String::new();
    let mut remaining = max_chars;

    for (rank, doc) in docs.iter().enumerate() {
        let doc_num = rank + 1;
        let score = doc.final_score.unwrap_or(0.0);

        if rank < FULL_INCLUSION_RANK_CUTOFF || score > FULL_INCLUSION_SCORE_CUTOFF {
            let block = format!("[Doc {doc_num}] (Score: {score:.2})\n{}\n", doc.content);
            let block_chars = block.chars().count();
            if block_chars <= remaining {
                output.push_str(&block);
                remaining -= block_chars;
                continue;
            }

            if remaining < TRUNCATION_MIN_REMAINING {
                break;
            }
            let header = format!("[Doc {doc_num}] (Score: {score:.2})\n");
            let header_chars = header.chars().count();
            let suffix_chars = TRUNCATED_SUFFIX.chars().count();
            let available = remaining.saturating_sub(header_chars + suffix_chars);
            let truncated: String = doc.content.chars().take(available).collect();
            output.push_str(&header);
            output.push_str(&truncated);
            output.push_str(TRUNCATED_SUFFIX);
            break;
        }

        let summary: String = doc.content.chars().take(SUMMARY_CHARS).collect();
        let block = format!("[Doc {doc_num}] (Summary)\n{summary}...\n");
        let block_chars = block.chars().count();
        if block_chars > remaining {
            break;
        }
        output.push_str(&block);
        remaining -= block_chars;
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragline_core::types::DocumentSource;

    fn doc(content: &str, final_score: f64) -> Document {
        let mut d = Document::new(content, DocumentSource::Vector, content);
        d.final_score = Some(final_score);
        d
    }

    #[test]
    fn empty_documents_produce_empty_output() {
        assert_eq!(compress_context(&[], DEFAULT_MAX_CHARS), "");
    }

    #[test]
    fn first_ten_docs_get_full_inclusion_regardless_of_score() {
        let docs = vec![doc("short content", 0.1)];
        let out = compress_context(&docs, DEFAULT_MAX_CHARS);
        assert!(out.contains("short content"));
        assert!(out.starts_with("[Doc 1] (Score: 0.10)"));
    }

    #[test]
    fn low_ranked_low_score_doc_gets_summarized() {
        let mut docs: Vec<Document> = (0..11).map(|i| doc(&format!("filler {i}"), 0.1)).collect();
        docs.push(doc(&"x".repeat(2000), 0.1));
        let out = compress_context(&docs, DEFAULT_MAX_CHARS);
        assert!(out.contains("(Summary)"));
        assert!(out.contains("..."));
    }

    #[test]
    fn high_score_doc_beyond_rank_ten_still_gets_full_inclusion() {
        let mut docs: Vec<Document> = (0..11).map(|i| doc(&format!("filler {i}"), 0.1)).collect();
        docs.push(doc("important high scoring content", 0.9));
        let out = compress_context(&docs, DEFAULT_MAX_CHARS);
        assert!(out.contains("important high scoring content"));
        assert!(!out.contains("important high scoring content\n..."));
    }

    #[test]
    fn truncates_when_budget_runs_out_mid_document() {
        let docs = vec![doc(&"a".repeat(1000), 0.9)];
        let out = compress_context(&docs, 600);
        assert!(out.ends_with(TRUNCATED_SUFFIX));
    }

    #[test]
    fn stops_entirely_when_remaining_budget_too_small_to_truncate() {
        let docs = vec![doc(&"a".repeat(1000), 0.9), doc(&"b".repeat(1000), 0.9)];
        let out = compress_context(&docs, 40);
        assert!(out.is_empty() || out.ends_with(TRUNCATED_SUFFIX));
    }
}
