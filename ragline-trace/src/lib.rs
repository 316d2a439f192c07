// ABOUTME: Pipeline tracer and run monitor (C13) — per-query span traces
// ABOUTME: and an append-only run log with a read-modify-write metrics file

//! Observability for the pipeline controller: [`Tracer`] records per-query
//! span traces to day-partitioned JSONL files, and [`Monitor`] appends each
//! completed [`ragline_core::types::RunRecord`] to a run log while keeping a
//! small aggregate metrics file up to date.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

mod monitor;
mod tracer;

pub use monitor::{Metrics, Monitor};
pub use tracer::{now_seconds, ActiveTrace, Tracer};
