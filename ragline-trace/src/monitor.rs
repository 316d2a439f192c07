//! Append-only run log plus a read-modify-write aggregate metrics file.

use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::Mutex;
use ragline_core::types::RunRecord;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Aggregate counters derived from every run logged so far.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metrics {
    /// Total number of runs logged.
    pub total_runs: u64,
    /// Number of those runs served from the cache.
    pub cache_hits: u64,
    sum_confidence: f64,
    sum_elapsed_sec: f64,
    sum_context_chars: u64,
    /// Running average confidence across all runs.
    pub avg_confidence: f64,
    /// Running average wall-clock seconds per run.
    pub avg_elapsed_sec: f64,
    /// Running average compressed-context size.
    pub avg_context_chars: u64,
    /// `cache_hits / total_runs`.
    pub cache_hit_rate: f64,
    /// When this file was last written.
    pub updated_at: chrono::DateTime<Utc>,
}

impl Default for Metrics {
    fn default() -> Self {
        Self {
            total_runs: 0,
            cache_hits: 0,
            sum_confidence: 0.0,
            sum_elapsed_sec: 0.0,
            sum_context_chars: 0,
            avg_confidence: 0.0,
            avg_elapsed_sec: 0.0,
            avg_context_chars: 0,
            cache_hit_rate: 0.0,
            updated_at: Utc::now(),
        }
    }
}

/// Appends [`RunRecord`]s to `logs/rag_runs.jsonl` and keeps
/// `logs/rag_metrics.json` up to date under a process-local lock.
pub struct Monitor {
    log_file: PathBuf,
    metrics_file: PathBuf,
    lock: Mutex<()>,
}

impl Monitor {
    /// A monitor writing under `logs_dir`.
    #[must_use]
    pub fn new(logs_dir: impl AsRef<Path>) -> Self {
        let logs_dir = logs_dir.as_ref();
        Self {
            log_file: logs_dir.join("rag_runs.jsonl"),
            metrics_file: logs_dir.join("rag_metrics.json"),
            lock: Mutex::new(()),
        }
    }

    /// Append `record` and fold it into the aggregate metrics file. Failures
    /// are logged and swallowed: monitoring never fails the pipeline.
    pub fn log_run(&self, record: &RunRecord) {
        let _guard = self.lock.lock();

        let line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to serialize run record");
                return;
            }
        };
        if let Err(err) = ragline_storage::append_line(&self.log_file, &line) {
            warn!(error = %err, "failed to append run log");
        }

        let mut metrics = self.load_metrics();
        metrics.total_runs += 1;
        if record.from_cache {
            metrics.cache_hits += 1;
        }
        metrics.sum_confidence += record.confidence;
        metrics.sum_elapsed_sec += record.elapsed_sec;
        metrics.sum_context_chars += record.context_chars as u64;

        let total = metrics.total_runs.max(1) as f64;
        metrics.avg_confidence = round2(metrics.sum_confidence / total);
        metrics.avg_elapsed_sec = round2(metrics.sum_elapsed_sec / total);
        #[allow(clippy::cast_possible_truncation)]
        {
            metrics.avg_context_chars = (metrics.sum_context_chars as f64 / total) as u64;
        }
        metrics.cache_hit_rate = round2(metrics.cache_hits as f64 / total);
        metrics.updated_at = Utc::now();

        if let Err(err) = ragline_storage::write_json_atomic(&self.metrics_file, &metrics) {
            warn!(error = %err, "failed to write aggregate metrics");
        }
    }

    /// Read the current aggregate metrics, defaulting to zeros if the file
    /// is absent or unreadable.
    #[must_use]
    pub fn load_metrics(&self) -> Metrics {
        ragline_storage::read_json(&self.metrics_file).unwrap_or_default()
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use ragline_core::types::Intent;
    use tempfile::tempdir;

    fn sample(confidence: f64, from_cache: bool) -> RunRecord {
        RunRecord {
            query: "q".to_string(),
            intent: Intent::General,
            retrieved: 10,
            reranked: 5,
            context_chars: 1000,
            confidence,
            elapsed_sec: 1.0,
            from_cache,
            answer: "a".to_string(),
            project: "demo".to_string(),
            timestamp: Utc::now(),
            cache_ttl: 600,
        }
    }

    #[test]
    fn first_run_seeds_metrics_from_zero() {
        let dir = tempdir().unwrap();
        let monitor = Monitor::new(dir.path());
        monitor.log_run(&sample(80.0, false));
        let metrics = monitor.load_metrics();
        assert_eq!(metrics.total_runs, 1);
        assert!((metrics.avg_confidence - 80.0).abs() < f64::EPSILON);
        assert!((metrics.cache_hit_rate - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn cache_hit_rate_tracks_fraction_of_cached_runs() {
        let dir = tempdir().unwrap();
        let monitor = Monitor::new(dir.path());
        monitor.log_run(&sample(50.0, true));
        monitor.log_run(&sample(50.0, false));
        let metrics = monitor.load_metrics();
        assert_eq!(metrics.total_runs, 2);
        assert!((metrics.cache_hit_rate - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn run_log_accumulates_one_line_per_run() {
        let dir = tempdir().unwrap();
        let monitor = Monitor::new(dir.path());
        monitor.log_run(&sample(10.0, false));
        monitor.log_run(&sample(20.0, false));
        let content = std::fs::read_to_string(dir.path().join("rag_runs.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn averages_update_across_multiple_runs() {
        let dir = tempdir().unwrap();
        let monitor = Monitor::new(dir.path());
        monitor.log_run(&sample(60.0, false));
        monitor.log_run(&sample(80.0, false));
        let metrics = monitor.load_metrics();
        assert!((metrics.avg_confidence - 70.0).abs() < f64::EPSILON);
    }
}
