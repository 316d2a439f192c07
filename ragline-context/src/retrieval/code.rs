//! Code symbol index (C4): a JSON symbol cache scored against query tokens,
//! falling back to a capped filesystem walk when no cache is present.
//!
//! The upstream tool this is grounded on (Serena) persists its cache as a
//! Python pickle. We read a JSON cache instead — pickle has no safe,
//! dependency-free Rust reader, and a JSON export is a one-line change on
//! the producing side.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use ragline_core::types::{Document, DocumentSource};
use ragline_utils::fs::capped_file_walk;
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

const WALK_CAP: usize = 400;
const CONTEXT_LINES: usize = 8;

/// One symbol entry in the JSON cache.
#[derive(Debug, Clone, Deserialize)]
struct Symbol {
    name: String,
    #[serde(default)]
    full_name: String,
    relative_path: String,
    absolute_path: PathBuf,
    start_line: usize,
    end_line: usize,
}

/// Top-level shape of a symbol cache file: `{"symbols": [...]}`.
#[derive(Debug, Deserialize)]
struct SymbolCacheFile {
    symbols: Vec<Symbol>,
}

/// Reads a project's code symbol cache and scores symbols against query
/// tokens, falling back to a plain file walk when no cache is loaded.
pub struct CodeSymbolIndex {
    project_root: PathBuf,
    symbols: Vec<Symbol>,
}

impl CodeSymbolIndex {
    /// Load the symbol cache at `cache_path`, if it exists. A missing or
    /// unreadable cache leaves the index in its unavailable state rather
    /// than failing construction.
    #[must_use]
    pub fn load(project_root: impl Into<PathBuf>, cache_path: &Path) -> Self {
        let symbols = match fs::read_to_string(cache_path) {
            Ok(raw) => match serde_json::from_str::<SymbolCacheFile>(&raw) {
                Ok(file) => file.symbols,
                Err(err) => {
                    warn!(error = %err, "symbol cache malformed, code index unavailable");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };
        Self {
            project_root: project_root.into(),
            symbols,
        }
    }

    /// An index with no cache loaded.
    #[must_use]
    pub fn empty(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            symbols: Vec::new(),
        }
    }

    /// Whether a symbol cache was successfully loaded.
    #[must_use]
    pub fn available(&self) -> bool {
        !self.symbols.is_empty()
    }

    /// Score and return up to `limit` symbols matching any of `queries`'
    /// tokens, each mapped to a code-snippet [`Document`]. Falls back to a
    /// capped filesystem walk, scanning for any token as a substring, when
    /// no cache is loaded.
    #[must_use]
    pub fn search(&self, queries: &[String], limit: usize) -> Vec<Document> {
        if queries.is_empty() {
            return Vec::new();
        }
        let tokens = tokenize(queries);
        if tokens.is_empty() {
            return Vec::new();
        }

        if self.available() {
            self.search_cache(&tokens, limit)
        } else {
            self.search_fallback(&tokens, limit)
        }
    }

    fn search_cache(&self, tokens: &[String], limit: usize) -> Vec<Document> {
        let mut scored: Vec<(f64, &Symbol)> = self
            .symbols
            .iter()
            .map(|sym| (score_symbol(sym, tokens), sym))
            .filter(|(score, _)| *score > 0.0)
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        scored
            .into_iter()
            .take(limit)
            .filter_map(|(score, sym)| self.build_document(sym, score))
            .collect()
    }

    fn build_document(&self, sym: &Symbol, score: f64) -> Option<Document> {
        let snippet = read_snippet(&sym.absolute_path, sym.start_line, sym.end_line)?;
        let dedup_key = format!("code::{}:{}", sym.relative_path, sym.start_line + 1);
        let mut metadata = HashMap::new();
        metadata.insert("path".to_string(), Value::String(sym.relative_path.clone()));
        metadata.insert("start_line".to_string(), Value::from(sym.start_line + 1));
        metadata.insert("end_line".to_string(), Value::from(sym.end_line + 1));
        metadata.insert("symbol".to_string(), Value::String(sym.full_name.clone()));
        Some(
            Document::new(snippet, DocumentSource::Code, &dedup_key)
                .with_metadata(metadata)
                .with_score(score),
        )
    }

    fn search_fallback(&self, tokens: &[String], limit: usize) -> Vec<Document> {
        let mut results = Vec::new();
        for path in capped_file_walk(&self.project_root, WALK_CAP) {
            let Ok(text) = fs::read_to_string(&path) else {
                continue;
            };
            let lower = text.to_lowercase();
            if !tokens.iter().any(|t| lower.contains(t.as_str())) {
                continue;
            }
            let relative = path.strip_prefix(&self.project_root).unwrap_or(&path);
            let snippet: String = text.lines().take(40).collect::<Vec<_>>().join("\n");
            let dedup_key = format!("code_fallback::{}", relative.display());
            let mut metadata = HashMap::new();
            metadata.insert("path".to_string(), Value::String(relative.display().to_string()));
            results.push(Document::new(
                format!("# File: {}\n{snippet}", relative.display()),
                DocumentSource::CodeFallback,
                &dedup_key,
            ).with_metadata(metadata));
            if results.len() >= limit {
                break;
            }
        }
        results
    }
}

fn tokenize(queries: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut tokens = Vec::new();
    for q in queries {
        for part in q
            .to_lowercase()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .filter(|t| !t.is_empty())
        {
            if seen.insert(part.to_string()) {
                tokens.push(part.to_string());
            }
        }
    }
    tokens
}

fn score_symbol(sym: &Symbol, tokens: &[String]) -> f64 {
    let name_lower = sym.name.to_lowercase();
    let full_name_lower = sym.full_name.to_lowercase();
    let path_lower = sym.relative_path.to_lowercase();

    let mut score = 0.0;
    for token in tokens {
        if name_lower.contains(token.as_str()) {
            score += 3.0;
        } else if full_name_lower.contains(token.as_str()) {
            score += 2.0;
        } else if path_lower.contains(token.as_str()) {
            score += 1.0;
        }
    }
    score
}

fn read_snippet(path: &Path, start_line: usize, end_line: usize) -> Option<String> {
    let text = fs::read_to_string(path).ok()?;
    let lines: Vec<&str> = text.lines().collect();
    let start = start_line.saturating_sub(CONTEXT_LINES);
    let end = (end_line + CONTEXT_LINES + 1).min(lines.len());
    if start >= end {
        return None;
    }
    let body = lines[start..end].join("\n");
    Some(format!("# File: {}:{}-{}\n{body}", path.display(), start + 1, end))
}
