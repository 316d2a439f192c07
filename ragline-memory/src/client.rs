//! The memory search client trait and its subprocess-backed implementation.

use std::time::Duration;

use async_trait::async_trait;
use ragline_core::types::Document;
use tokio::process::Command;
use tokio::time::timeout;
use tracing::{warn, Span};

use crate::parsing::parse_memory_output;

/// Searches an external memory/conversation-history service.
///
/// Implementations must never propagate a failure: timeouts, non-zero
/// exits, and unparseable output all degrade to an empty `Vec`, matching
/// the retriever tolerance contract in §4.2/§7. Implementations may use
/// IPC, HTTP, or an in-process store as long as this contract holds.
#[async_trait]
pub trait MemorySearchClient: Send + Sync {
    /// Search for up to `limit` relevant memory entries.
    async fn search(&self, query: &str, limit: usize) -> Vec<Document>;
}

/// A memory client backed by a subprocess: `{command} {args...} --query Q --limit N`.
///
/// The subprocess is expected to print either a JSON array of observations
/// or (if truncated/aborted) at least some quoted strings the fallback
/// parser can salvage.
#[derive(Debug, Clone)]
pub struct SubprocessMemoryClient {
    command: String,
    args: Vec<String>,
    timeout: Duration,
}

impl SubprocessMemoryClient {
    /// Build a client invoking `command` with the given fixed `args`,
    /// appending `--query`/`--limit` per call, with the async default
    /// timeout of 10 seconds.
    #[must_use]
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            timeout: Duration::from_secs(10),
        }
    }

    /// Override the per-call timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[async_trait]
impl MemorySearchClient for SubprocessMemoryClient {
    async fn search(&self, query: &str, limit: usize) -> Vec<Document> {
        let mut cmd = Command::new(&self.command);
        cmd.args(&self.args)
            .arg("--query")
            .arg(query)
            .arg("--limit")
            .arg(limit.to_string())
            .kill_on_drop(true);

        let output = match timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(err)) => {
                warn!(error = %err, "memory subprocess failed to spawn");
                Span::current().record("status", "error");
                return Vec::new();
            }
            Err(_) => {
                warn!("memory subprocess timed out after {:?}", self.timeout);
                Span::current().record("status", "error");
                return Vec::new();
            }
        };

        if !output.status.success() {
            warn!(status = ?output.status, "memory subprocess exited non-zero");
            Span::current().record("status", "error");
            return Vec::new();
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let mut docs = parse_memory_output(&stdout);
        docs.truncate(limit);
        Span::current().record("status", "ok");
        docs
    }
}

/// A static in-process client, for tests and offline development.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMemoryClient {
    documents: Vec<Document>,
}

impl InMemoryMemoryClient {
    /// Build a client that always returns `documents` (truncated to the
    /// caller's limit), regardless of query text.
    #[must_use]
    pub fn new(documents: Vec<Document>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl MemorySearchClient for InMemoryMemoryClient {
    async fn search(&self, _query: &str, limit: usize) -> Vec<Document> {
        self.documents.iter().take(limit).cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_binary_degrades_to_empty() {
        let client = SubprocessMemoryClient::new("ragline-memory-binary-that-does-not-exist", vec![]);
        let docs = client.search("hello", 5).await;
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn subprocess_client_respects_timeout() {
        let client = SubprocessMemoryClient::new("sleep", vec!["2".to_string()])
            .with_timeout(Duration::from_millis(50));
        let docs = client.search("hello", 5).await;
        assert!(docs.is_empty());
    }

    #[tokio::test]
    async fn in_memory_client_respects_limit() {
        let docs = vec![
            Document::new("a", ragline_core::types::DocumentSource::Memory, "a"),
            Document::new("b", ragline_core::types::DocumentSource::Memory, "b"),
        ];
        let client = InMemoryMemoryClient::new(docs);
        let result = client.search("anything", 1).await;
        assert_eq!(result.len(), 1);
    }
}
