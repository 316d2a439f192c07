// ABOUTME: Write-to-temp-then-rename file primitives and mtime-based pruning
// ABOUTME: backing the query cache (C12) and the tracer/monitor logs (C13)

//! Generic, dependency-light file storage helpers. Nothing here knows about
//! cache keys, TTLs, or trace shapes — those live in `ragline-cache` and
//! `ragline-trace`, which both need the same primitive: "write this JSON
//! atomically", "append this line under a lock", "keep only the N
//! most-recently-modified files in this directory".

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod atomic;
pub mod error;
pub mod prune;

pub use atomic::{append_line, read_json, write_json_atomic};
pub use error::{Result, StorageError};
pub use prune::prune_by_mtime;
