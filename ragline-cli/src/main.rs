//! ABOUTME: Entry point for the ragline CLI
//! ABOUTME: parses arguments, sets up tracing, builds config, dispatches

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::Cli;
use ragline_config::{CliOverrides, RagConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.trace);

    let config = RagConfig::from_env().with_overrides(CliOverrides {
        project: cli.project.clone(),
        project_root: cli.project_root.clone(),
        context_chars: cli.context_chars,
        top_k: cli.top_k,
    });

    commands::execute_command(cli.command, config, cli.suite).await
}

/// Priority: `RUST_LOG` > `--trace` flag > default (warn). Tracing writes to
/// stderr so stdout stays clean for program output, e.g. `ragline ask "..." > out.txt 2> debug.log`.
fn setup_tracing(trace_level: cli::TraceLevel) {
    use std::io;
    use tracing_subscriber::EnvFilter;

    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    } else {
        let level: tracing::Level = trace_level.into();
        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_writer(io::stderr)
            .with_target(false)
            .init();
    }
}
