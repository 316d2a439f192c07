//! Tokenization and stopword filtering.

use std::collections::HashSet;
use std::sync::LazyLock;

/// English stopwords filtered out of extracted keyword lists.
static STOPWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "do", "does", "did",
        "i", "we", "you", "he", "she", "it", "they", "this", "that", "these", "those", "in",
        "on", "at", "to", "for", "of", "with", "and", "or", "but", "not", "me", "my", "our",
        "your", "his", "her", "its", "their",
    ]
    .into_iter()
    .collect()
});

/// Whether `word` (case-insensitive) is a stopword.
#[must_use]
pub fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(word.to_lowercase().as_str())
}

/// Split `text` on anything that isn't alphanumeric or underscore, dropping
/// empty tokens. Mirrors the `re.split(r"[^\w]+", text.lower())` pattern
/// used by the entity graph and code symbol index.
#[must_use]
pub fn word_tokens(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Pick the single longest alphanumeric/underscore token longer than 3
/// characters, preferring the first-occurring token among ties. Returns
/// `None` if no token qualifies.
#[must_use]
pub fn select_salient_token(query: &str) -> Option<String> {
    query
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|t| t.len() > 3)
        .rev()
        .max_by_key(|t| t.len())
        .map(str::to_string)
}

/// Extract meaningful keywords from a query: split on whitespace/punctuation,
/// drop tokens under 2 chars, drop stopwords, lowercase, dedup preserving order.
#[must_use]
pub fn extract_keywords(query: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    query
        .split(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .filter_map(|tok| {
            let trimmed = tok.trim();
            if trimmed.len() < 2 || is_stopword(trimmed) {
                return None;
            }
            let lower = trimmed.to_lowercase();
            seen.insert(lower.clone()).then_some(lower)
        })
        .collect()
}
