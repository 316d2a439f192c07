//! Keyword scanner (C3): shells out to `rg` for a single salient token and
//! falls back to a capped, in-process line scan when ripgrep is unavailable.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use ragline_core::types::{Document, DocumentSource};
use ragline_utils::fs::capped_file_walk;
use ragline_utils::text::select_salient_token;
use serde::Deserialize;
use serde_json::Value;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::warn;

const RG_TIMEOUT: Duration = Duration::from_secs(5);
const WALK_CAP: usize = 400;

/// Searches a project tree for literal occurrences of a query's most
/// salient token.
#[async_trait]
pub trait KeywordSearch: Send + Sync {
    /// Return up to `limit` matching [`Document`]s for `query`.
    async fn search(&self, query: &str, limit: usize) -> Vec<Document>;
}

/// Default implementation: `rg --json`, falling back to a capped directory
/// walk plus naive line scan when ripgrep is missing.
pub struct RgKeywordRetriever {
    project_root: PathBuf,
}

impl RgKeywordRetriever {
    /// Build a retriever rooted at `project_root`.
    #[must_use]
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    async fn run_rg(&self, token: &str, limit: usize) -> Option<Vec<Document>> {
        let max_matches = (limit * 3).to_string();
        let output = Command::new("rg")
            .args(["--json", "-n", "-m", &max_matches, "--no-heading", token])
            .arg(&self.project_root)
            .kill_on_drop(true)
            .output();

        let output = match timeout(RG_TIMEOUT, output).await {
            Ok(Ok(output)) => output,
            Ok(Err(_)) => return None,
            Err(_) => {
                warn!("ripgrep timed out, falling back to a file walk");
                return Some(Vec::new());
            }
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        Some(parse_rg_json(&stdout, &self.project_root, limit))
    }

    fn fallback_scan(&self, token: &str, limit: usize) -> Vec<Document> {
        let mut results = Vec::new();
        for path in capped_file_walk(&self.project_root, WALK_CAP) {
            let Ok(text) = std::fs::read_to_string(&path) else {
                continue;
            };
            for (idx, line) in text.lines().enumerate() {
                if line.contains(token) {
                    results.push(build_document(&self.project_root, &path, idx + 1, line));
                    if results.len() >= limit {
                        return results;
                    }
                }
            }
        }
        results
    }
}

#[async_trait]
impl KeywordSearch for RgKeywordRetriever {
    async fn search(&self, query: &str, limit: usize) -> Vec<Document> {
        let Some(token) = select_salient_token(query) else {
            return Vec::new();
        };

        match self.run_rg(&token, limit).await {
            Some(docs) if !docs.is_empty() => docs,
            Some(_) => self.fallback_scan(&token, limit),
            None => self.fallback_scan(&token, limit),
        }
    }
}

#[derive(Deserialize)]
struct RgLine {
    #[serde(rename = "type")]
    kind: String,
    data: Value,
}

fn parse_rg_json(stdout: &str, project_root: &Path, limit: usize) -> Vec<Document> {
    let mut results = Vec::new();
    for raw_line in stdout.lines() {
        let Ok(parsed) = serde_json::from_str::<RgLine>(raw_line) else {
            continue;
        };
        if parsed.kind != "match" {
            continue;
        }
        let Some(path) = parsed.data["path"]["text"].as_str() else {
            continue;
        };
        let Some(line_number) = parsed.data["line_number"].as_u64() else {
            continue;
        };
        let line_text = parsed.data["lines"]["text"].as_str().unwrap_or_default().trim();
        if line_text.is_empty() {
            continue;
        }
        results.push(build_document(project_root, Path::new(path), line_number as usize, line_text));
        if results.len() >= limit {
            break;
        }
    }
    results
}

fn build_document(project_root: &Path, path: &Path, line_number: usize, line_text: &str) -> Document {
    let relative = path.strip_prefix(project_root).unwrap_or(path);
    let content = format!("# File: {}:{line_number}\n{line_text}", relative.display());
    let dedup_key = format!("keyword::{}:{line_number}", relative.display());
    let mut metadata = HashMap::new();
    metadata.insert("path".to_string(), Value::String(relative.display().to_string()));
    metadata.insert("line".to_string(), Value::from(line_number));
    Document::new(content, DocumentSource::Keyword, &dedup_key)
        .with_metadata(metadata)
        .with_score(0.6)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn search_with_no_salient_token_returns_empty() {
        let dir = tempdir().unwrap();
        let retriever = RgKeywordRetriever::new(dir.path());
        assert!(retriever.search("a an it", 5).await.is_empty());
    }

    #[tokio::test]
    async fn fallback_scan_finds_literal_matches() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("lib.rs"), "fn compress_context() {}\nfn other() {}\n").unwrap();
        let retriever = RgKeywordRetriever::new(dir.path());
        let docs = retriever.fallback_scan("compress_context", 10);
        assert_eq!(docs.len(), 1);
        assert!(docs[0].content.contains("compress_context"));
    }

    #[test]
    fn parse_rg_json_extracts_match_lines_only() {
        let payload = r#"{"type":"match","data":{"path":{"text":"/proj/src/lib.rs"},"line_number":12,"lines":{"text":"fn compress_context() {}"}}}
{"type":"begin","data":{}}"#;
        let docs = parse_rg_json(payload, Path::new("/proj"), 10);
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].metadata["line"], 12);
    }
}
