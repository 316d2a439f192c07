//! The on-disk query cache: one file per key under `cache/<project>/`.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use ragline_core::types::{CacheEntry, RunRecord};
use tracing::warn;

const CACHE_EXTENSION: &str = "json";

/// A content-addressed, TTL- and capacity-bounded cache of [`RunRecord`]s.
pub struct QueryCache {
    dir: PathBuf,
    max_entries: usize,
    enabled: bool,
}

impl QueryCache {
    /// A cache rooted at `data_root/cache/<project>`.
    #[must_use]
    pub fn new(data_root: impl AsRef<Path>, project: &str, max_entries: usize) -> Self {
        Self {
            dir: data_root.as_ref().join("cache").join(project),
            max_entries,
            enabled: true,
        }
    }

    /// Disable the cache: `get` always misses, `set` is a no-op. Matches
    /// `RAG_DISABLE_CACHE`.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Look up `key`. Returns `None` on a miss, a stale (expired) entry,
    /// or an unreadable entry — all three remove the backing file.
    pub fn get(&self, key: &str) -> Option<RunRecord> {
        if !self.enabled {
            return None;
        }

        let path = self.entry_path(key);
        let entry: CacheEntry = match ragline_storage::read_json(&path) {
            Ok(entry) => entry,
            Err(_) => return None,
        };

        if now_seconds() - entry.ts <= entry.ttl as f64 {
            Some(entry.payload)
        } else {
            let _ = fs::remove_file(&path);
            None
        }
    }

    /// Store `payload` under `key` with `ttl` seconds, then prune the
    /// directory back to `max_entries` most-recently-modified files.
    pub fn set(&self, key: &str, payload: RunRecord, ttl: u64) {
        if !self.enabled {
            return;
        }

        let entry = CacheEntry {
            ts: now_seconds(),
            ttl,
            payload,
        };
        let path = self.entry_path(key);
        if let Err(err) = ragline_storage::write_json_atomic(&path, &entry) {
            warn!(error = %err, key, "failed to write cache entry");
            return;
        }
        if let Err(err) = ragline_storage::prune_by_mtime(&self.dir, CACHE_EXTENSION, self.max_entries) {
            warn!(error = %err, "failed to prune cache directory");
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.{CACHE_EXTENSION}"))
    }
}

fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::tempdir;

    fn sample_record() -> RunRecord {
        RunRecord {
            query: "q".to_string(),
            intent: ragline_core::types::Intent::General,
            retrieved: 5,
            reranked: 3,
            context_chars: 100,
            confidence: 60.0,
            elapsed_sec: 0.5,
            from_cache: false,
            answer: "the answer".to_string(),
            project: "demo".to_string(),
            timestamp: Utc::now(),
            cache_ttl: 600,
        }
    }

    #[test]
    fn miss_on_unknown_key() {
        let dir = tempdir().unwrap();
        let cache = QueryCache::new(dir.path(), "demo", 10);
        assert!(cache.get("nope").is_none());
    }

    #[test]
    fn set_then_get_round_trips_within_ttl() {
        let dir = tempdir().unwrap();
        let cache = QueryCache::new(dir.path(), "demo", 10);
        cache.set("k1", sample_record(), 600);
        let fetched = cache.get("k1").unwrap();
        assert_eq!(fetched.answer, "the answer");
    }
}
