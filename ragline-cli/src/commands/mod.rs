//! One handler per subcommand, each building its own
//! [`PipelineController`] from [`RagConfig`] where it needs the full
//! pipeline.

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use ragline_cache::QueryCache;
use ragline_context::{CodeSymbolIndex, QueryAnalyzer, Reranker, RetrievalOrchestrator, RgKeywordRetriever};
use ragline_config::RagConfig;
use ragline_graph::EntityGraph;
use ragline_memory::SubprocessMemoryClient;
use ragline_pipeline::{eval, update_local_knowledge, update_vector_store, NoopConsumer, PipelineController, PipelineSettings};
use ragline_providers::{CrossEncoder, HttpLlmProvider, LlmProvider, MockCrossEncoder};
use ragline_rag::{EmbeddingProvider, InMemoryVectorIndex, MockEmbeddingProvider};
use ragline_synth::AnswerSynthesizer;
use ragline_trace::{Monitor, Tracer};

use crate::cli::Commands;

/// Build the full pipeline controller from resolved configuration.
fn build_controller(config: &RagConfig) -> PipelineController {
    let fast_llm: Arc<dyn LlmProvider> = Arc::new(HttpLlmProvider::new(config.fast_provider()));
    let main_llm: Arc<dyn LlmProvider> = Arc::new(HttpLlmProvider::new(config.main_provider()));
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(MockEmbeddingProvider::default());
    let cross_encoder: Arc<dyn CrossEncoder> = Arc::new(MockCrossEncoder::new());

    let vector = Arc::new(InMemoryVectorIndex::new(embedder));
    let memory = Arc::new(SubprocessMemoryClient::new("ragline-memory-search", vec![]));
    let keyword = Arc::new(RgKeywordRetriever::new(config.project_root.clone()));

    let code_cache = config.project_root.join(".ragline").join("code_symbols.json");
    let code = Arc::new(CodeSymbolIndex::load(config.project_root.clone(), &code_cache));

    let entities_path = config.project_root.join("entities.json");
    let graph = Arc::new(EntityGraph::load(&entities_path).unwrap_or_else(|_| EntityGraph::empty()));

    let analyzer = Arc::new(QueryAnalyzer::new(Arc::clone(&fast_llm)));
    let orchestrator = Arc::new(RetrievalOrchestrator::new(
        vector,
        memory,
        keyword,
        code,
        graph,
        Arc::clone(&analyzer),
        Arc::clone(&fast_llm),
    ));
    let reranker = Arc::new(Reranker::new(cross_encoder));
    let synthesizer = Arc::new(AnswerSynthesizer::new(main_llm));

    let cache = Arc::new(QueryCache::new(&config.data_root, &config.project, config.cache_max_entries).with_enabled(!config.cache_disabled));
    let logs_dir = config.data_root.join("logs");
    let tracer = Arc::new(Tracer::new(&logs_dir).with_enabled(config.tracing_enabled));
    let monitor = Arc::new(Monitor::new(&logs_dir));

    PipelineController::new(analyzer, orchestrator, reranker, synthesizer, cache, tracer, monitor, config.project.clone(), vec![])
        .with_ttl_policy(config.ttl_policy)
        .with_consumer(Arc::new(NoopConsumer))
}

fn settings_from(config: &RagConfig) -> PipelineSettings {
    PipelineSettings {
        top_k_override: Some(config.top_k),
        context_chars_override: Some(config.context_chars),
    }
}

/// Dispatch and run one subcommand, returning an error only for operational
/// failures (bad file paths, unreadable suites) — pipeline-internal failures
/// never surface here, they degrade to a recorded run per §7.
pub async fn execute_command(command: Commands, config: RagConfig, suite_path: Option<std::path::PathBuf>) -> Result<()> {
    match command {
        Commands::Ask { question } => run_ask(&question, &config).await,
        Commands::Update => run_update(&config),
        Commands::Stats => run_stats(&config),
        Commands::Eval { out_dir } => run_eval(&config, suite_path.as_deref(), &out_dir).await,
        Commands::Logs { lines } => run_logs(&config, lines),
    }
}

async fn run_ask(question: &str, config: &RagConfig) -> Result<()> {
    let controller = build_controller(config);
    let record = controller.ask(question, settings_from(config)).await;

    println!("{}", record.answer);
    println!(
        "\n[confidence={:.0} retrieved={} reranked={} context_chars={} elapsed={:.2}s cache={}]",
        record.confidence, record.retrieved, record.reranked, record.context_chars, record.elapsed_sec, record.from_cache
    );
    Ok(())
}

fn run_update(config: &RagConfig) -> Result<()> {
    update_vector_store(&config.project);
    update_local_knowledge(&config.project);
    println!("update requested for project '{}' (ingestion runs out-of-process)", config.project);
    Ok(())
}

fn run_stats(config: &RagConfig) -> Result<()> {
    let monitor = Monitor::new(&config.data_root);
    let metrics = monitor.load_metrics();
    println!("{}", serde_json::to_string_pretty(&metrics)?);
    Ok(())
}

async fn run_eval(config: &RagConfig, suite_path: Option<&Path>, out_dir: &Path) -> Result<()> {
    let suite_path = suite_path.context("--suite <path> is required for `eval`")?;
    let raw = std::fs::read_to_string(suite_path).with_context(|| format!("reading suite file {}", suite_path.display()))?;
    let suite: eval::TestSuite = serde_json::from_str(&raw).context("parsing suite JSON")?;

    let controller = build_controller(config);
    let (cases, summary) = eval::run_quality_suite(&controller, &suite).await;

    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;
    let report = serde_json::json!({ "cases": cases, "summary": summary });
    let report_path = out_dir.join(format!("run_{}.json", chrono::Utc::now().format("%Y%m%dT%H%M%S")));
    std::fs::write(&report_path, serde_json::to_vec_pretty(&report)?).with_context(|| format!("writing {}", report_path.display()))?;

    println!("wrote {}", report_path.display());
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn run_logs(config: &RagConfig, lines: usize) -> Result<()> {
    let log_path = config.data_root.join("logs").join("rag_runs.jsonl");
    let content = std::fs::read_to_string(&log_path).unwrap_or_default();
    let all_lines: Vec<&str> = content.lines().collect();
    let start = all_lines.len().saturating_sub(lines);
    for line in &all_lines[start..] {
        println!("{line}");
    }
    Ok(())
}
