//! Span-level tracing of a single pipeline run, persisted as JSONL.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;
use ragline_core::types::{Trace, TraceSpan};
use serde_json::Value;
use tracing::{warn, Instrument};

const QUERY_TRUNCATE_CHARS: usize = 200;

/// Opens and closes [`Trace`]s, writing each finished trace as one line of
/// `logs/traces/traces_YYYYMMDD.jsonl`.
pub struct Tracer {
    logs_dir: PathBuf,
    enabled: bool,
}

impl Tracer {
    /// A tracer writing under `logs_dir/traces/`.
    #[must_use]
    pub fn new(logs_dir: impl AsRef<Path>) -> Self {
        Self {
            logs_dir: logs_dir.as_ref().join("traces"),
            enabled: true,
        }
    }

    /// Disable tracing: `start` still returns a handle (so call sites don't
    /// need to branch), but `end` is a no-op. Matches `RAG_TRACING_ENABLED`.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Begin a trace for `operation` against `query`. The query text is
    /// truncated to 200 characters before storage.
    #[must_use]
    pub fn start(&self, operation: &str, query: &str) -> ActiveTrace {
        let truncated: String = query.chars().take(QUERY_TRUNCATE_CHARS).collect();
        let trace_id = format!("{operation}_{}", epoch_millis());
        ActiveTrace {
            trace: Trace {
                trace_id,
                operation: operation.to_string(),
                query: truncated,
                start_ts: Utc::now(),
                end_ts: None,
                duration_ms: None,
                spans: Vec::new(),
                result: None,
            },
            start_instant: now_seconds(),
        }
    }

    /// Close `trace`, attach `result`, and append it to today's trace file.
    /// A write failure is logged and otherwise swallowed: tracing never
    /// fails the pipeline.
    pub fn end(&self, mut trace: ActiveTrace, result: Option<Value>) {
        if !self.enabled {
            return;
        }

        let end_instant = now_seconds();
        trace.trace.end_ts = Some(Utc::now());
        trace.trace.duration_ms = Some((end_instant - trace.start_instant) * 1000.0);
        trace.trace.result = result;

        let file_name = format!("traces_{}.jsonl", Utc::now().format("%Y%m%d"));
        let path = self.logs_dir.join(file_name);

        let line = match serde_json::to_string(&trace.trace) {
            Ok(line) => line,
            Err(err) => {
                warn!(error = %err, "failed to serialize trace");
                return;
            }
        };

        if let Err(err) = ragline_storage::append_line(&path, &line) {
            warn!(error = %err, "failed to append trace");
        }
    }
}

/// A trace in progress: spans are appended to it until [`Tracer::end`]
/// closes and persists it.
pub struct ActiveTrace {
    trace: Trace,
    start_instant: f64,
}

impl ActiveTrace {
    /// Run `f` inside a real [`tracing::Span`] named `pipeline_stage`
    /// (`stage = name`), recording a matching entry in the bespoke JSONL
    /// trace with `f`'s duration and success/failure status. `f`'s `Err`
    /// is converted to the span's error message and re-raised to the
    /// caller.
    pub fn span<T, F>(&mut self, name: &'static str, f: F) -> Result<T, String>
    where
        F: FnOnce() -> Result<T, String>,
    {
        let span = tracing::info_span!("pipeline_stage", stage = name, status = tracing::field::Empty);
        let _enter = span.enter();

        let start = now_seconds();
        let outcome = f();
        let end = now_seconds();

        let status = if outcome.is_ok() { "ok" } else { "error" };
        span.record("status", status);
        self.push_span(name, start, end, status, outcome.as_ref().err().cloned());

        outcome
    }

    /// Run the async stage produced by `f` inside a real `tracing::Span`
    /// (via [`Instrument`]), so the span's lifetime — and the recorded
    /// JSONL duration — covers the actual await, not a trivial closure
    /// called after the fact.
    pub async fn span_async<T, F, Fut>(&mut self, name: &'static str, f: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        let span = tracing::info_span!("pipeline_stage", stage = name);
        let start = now_seconds();
        let result = f().instrument(span).await;
        let end = now_seconds();
        self.push_span(name, start, end, "ok", None);
        result
    }

    /// Record a span whose timing and status were determined elsewhere —
    /// for a sub-operation (e.g. one retriever among several fanned out
    /// concurrently) that reports its own outcome instead of running
    /// directly inside this call.
    pub fn record_span(&mut self, name: &str, start: f64, end: f64, status: &str, error: Option<String>) {
        self.push_span(name, start, end, status, error);
    }

    fn push_span(&mut self, name: &str, start: f64, end: f64, status: &str, error: Option<String>) {
        self.trace.spans.push(TraceSpan {
            name: name.to_string(),
            start,
            end,
            duration_ms: (end - start) * 1000.0,
            status: status.to_string(),
            attributes: std::collections::HashMap::new(),
            error,
        });
    }

    /// The trace id assigned at `start`.
    #[must_use]
    pub fn trace_id(&self) -> &str {
        &self.trace.trace_id
    }
}

/// Seconds since the Unix epoch, for timing spans whose start/end are
/// captured by a caller outside this module (e.g. per-retriever spans).
#[must_use]
pub fn now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn epoch_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}
