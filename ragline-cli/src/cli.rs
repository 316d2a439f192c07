//! Argument parsing: the five subcommands and global flags from §6.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Trace level for logging output, used only when `RUST_LOG` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TraceLevel {
    /// No trace output.
    Off,
    /// Error level only.
    Error,
    /// Warning level and above (default).
    Warn,
    /// Info level and above.
    Info,
    /// Debug level and above.
    Debug,
    /// Trace level (most verbose).
    Trace,
}

impl From<TraceLevel> for tracing::Level {
    fn from(trace_level: TraceLevel) -> Self {
        match trace_level {
            TraceLevel::Off | TraceLevel::Error => tracing::Level::ERROR,
            TraceLevel::Warn => tracing::Level::WARN,
            TraceLevel::Info => tracing::Level::INFO,
            TraceLevel::Debug => tracing::Level::DEBUG,
            TraceLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// `ragline` — ask questions of a retrieval-augmented answering engine.
#[derive(Parser, Debug)]
#[command(name = "ragline")]
#[command(version)]
#[command(about = "Retrieval-augmented answering engine")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Project namespace, used to partition the cache and logs (GLOBAL).
    #[arg(long, global = true, env = "RAG_PROJECT")]
    pub project: Option<String>,

    /// Filesystem root the keyword scanner and code index search under (GLOBAL).
    #[arg(long, global = true, env = "RAG_PROJECT_ROOT")]
    pub project_root: Option<PathBuf>,

    /// Path to a quality-panel test suite JSON file, used by `eval` (GLOBAL).
    #[arg(long, global = true)]
    pub suite: Option<PathBuf>,

    /// Override the context compressor's character budget (GLOBAL).
    #[arg(long, global = true)]
    pub context_chars: Option<usize>,

    /// Override the strategy planner's default top-k (GLOBAL).
    #[arg(long, global = true)]
    pub top_k: Option<usize>,

    /// Trace level (ignored when `RUST_LOG` is set).
    #[arg(long, global = true, value_enum, default_value = "warn")]
    pub trace: TraceLevel,

    #[command(subcommand)]
    pub command: Commands,
}

/// The five subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline for one question and print the formatted answer.
    Ask {
        /// The natural-language question.
        question: String,
    },
    /// Trigger ingestion hooks (out of core scope; logs the request).
    Update,
    /// Print aggregate component/run statistics.
    Stats,
    /// Run the quality-panel test suite given by `--suite` and write a JSON report.
    Eval {
        /// Directory to write the timestamped report into.
        #[arg(long, default_value = "logs/eval")]
        out_dir: PathBuf,
    },
    /// Print the last N lines of the run log.
    Logs {
        /// Number of lines to print, most recent last.
        #[arg(long, default_value_t = 50)]
        lines: usize,
    },
}
