// ABOUTME: Runtime configuration layer — environment variables plus
// ABOUTME: CLI-flag overrides, per the spec's external-interfaces section

//! Configuration is layered: built-in defaults, overridden by environment
//! variables, overridden again by explicit CLI flags. Nothing here reads a
//! config file — per §6, the core's configuration surface is environment
//! variables and global CLI flags only; file-based config is a transport
//! concern the core doesn't own.

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

use std::env;
use std::path::PathBuf;

use ragline_cache::TtlPolicy;
use ragline_providers::ProviderConfig;
use serde::Serialize;

const DEFAULT_CONTEXT_CHARS: usize = 120_000;
const DEFAULT_TOP_K: usize = 20;
const DEFAULT_CACHE_TTL: u64 = 900;
const DEFAULT_CACHE_MAX_ENTRIES: usize = 256;
const DEFAULT_PROJECT: &str = "default";

/// Resolved runtime configuration for one pipeline instance.
#[derive(Debug, Clone, Serialize)]
pub struct RagConfig {
    /// Context compressor budget (characters). `RAG_CONTEXT_CHARS`.
    pub context_chars: usize,
    /// Strategy planner's default top-k. `RAG_TOP_K`.
    pub top_k: usize,
    /// Default cache TTL (seconds), used for intents with no dedicated
    /// override. `RAG_CACHE_TTL`.
    pub cache_ttl: u64,
    /// Max cache entries retained per project. `RAG_CACHE_MAX_ENTRIES`.
    pub cache_max_entries: usize,
    /// `RAG_DISABLE_CACHE`: when true, the cache always misses and never stores.
    pub cache_disabled: bool,
    /// Per-intent TTL overrides layered over [`TtlPolicy::default`].
    pub ttl_policy: TtlPolicy,
    /// `RAG_TRACING_ENABLED` (default true).
    pub tracing_enabled: bool,
    /// `RAG_AUTO_SAVE`: whether the controller should persist cache entries
    /// without an explicit flush call.
    pub auto_save: bool,
    /// `RAG_PROJECT`: the project namespace for cache/log partitioning.
    pub project: String,
    /// `RAG_PROJECT_ROOT`: filesystem root the keyword scanner and code
    /// index search under.
    pub project_root: PathBuf,
    /// Root directory for cache/log/trace persistence. Not named in the
    /// spec's env var list; added here as the practical knob a deployment
    /// needs to relocate `cache/`, `logs/` (see DESIGN.md).
    pub data_root: PathBuf,
}

impl Default for RagConfig {
    fn default() -> Self {
        Self {
            context_chars: DEFAULT_CONTEXT_CHARS,
            top_k: DEFAULT_TOP_K,
            cache_ttl: DEFAULT_CACHE_TTL,
            cache_max_entries: DEFAULT_CACHE_MAX_ENTRIES,
            cache_disabled: false,
            ttl_policy: TtlPolicy::default(),
            tracing_enabled: true,
            auto_save: false,
            project: DEFAULT_PROJECT.to_string(),
            project_root: PathBuf::from("."),
            data_root: PathBuf::from(".ragline"),
        }
    }
}

impl RagConfig {
    /// Build a configuration from defaults overridden by any of the
    /// environment variables listed in §6. Unset or unparsable variables
    /// fall back to the default silently.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            context_chars: env_usize("RAG_CONTEXT_CHARS").unwrap_or(defaults.context_chars),
            top_k: env_usize("RAG_TOP_K").unwrap_or(defaults.top_k),
            cache_ttl: env_u64("RAG_CACHE_TTL").unwrap_or(defaults.cache_ttl),
            cache_max_entries: env_usize("RAG_CACHE_MAX_ENTRIES").unwrap_or(defaults.cache_max_entries),
            cache_disabled: env_bool("RAG_DISABLE_CACHE").unwrap_or(defaults.cache_disabled),
            ttl_policy: TtlPolicy {
                status: env_u64("RAG_CACHE_TTL_STATUS").unwrap_or(defaults.ttl_policy.status),
                general: env_u64("RAG_CACHE_TTL_GENERAL").unwrap_or(defaults.ttl_policy.general),
                explain: env_u64("RAG_CACHE_TTL_EXPLAIN").unwrap_or(defaults.ttl_policy.explain),
                code: env_u64("RAG_CACHE_TTL_CODE").unwrap_or(defaults.ttl_policy.code),
                default: env_u64("RAG_CACHE_TTL").unwrap_or(defaults.ttl_policy.default),
            },
            tracing_enabled: env_bool("RAG_TRACING_ENABLED").unwrap_or(defaults.tracing_enabled),
            auto_save: env_bool("RAG_AUTO_SAVE").unwrap_or(defaults.auto_save),
            project: env::var("RAG_PROJECT").unwrap_or(defaults.project),
            project_root: env::var("RAG_PROJECT_ROOT").map(PathBuf::from).unwrap_or(defaults.project_root),
            data_root: env::var("RAG_DATA_ROOT").map(PathBuf::from).unwrap_or(defaults.data_root),
        }
    }

    /// Apply the CLI's global-flag overrides (`--project`, `--project-root`,
    /// `--context-chars`, `--top-k`), which take precedence over both
    /// defaults and environment variables.
    #[must_use]
    pub fn with_overrides(mut self, overrides: CliOverrides) -> Self {
        if let Some(project) = overrides.project {
            self.project = project;
        }
        if let Some(root) = overrides.project_root {
            self.project_root = root;
        }
        if let Some(chars) = overrides.context_chars {
            self.context_chars = chars;
        }
        if let Some(top_k) = overrides.top_k {
            self.top_k = top_k;
        }
        self
    }

    /// Build the fast-model provider config (`RAGLINE_FAST_*`).
    #[must_use]
    pub fn fast_provider(&self) -> ProviderConfig {
        ProviderConfig::from_env("fast", "fast-default")
    }

    /// Build the main-model provider config (`RAGLINE_MAIN_*`).
    #[must_use]
    pub fn main_provider(&self) -> ProviderConfig {
        ProviderConfig::from_env("main", "main-default")
    }
}

/// The subset of global CLI flags (§6) that override configuration.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--project <name>`.
    pub project: Option<String>,
    /// `--project-root <path>`.
    pub project_root: Option<PathBuf>,
    /// `--context-chars <N>`.
    pub context_chars: Option<usize>,
    /// `--top-k <N>`.
    pub top_k: Option<usize>,
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_u64(key: &str) -> Option<u64> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}

fn env_bool(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| matches!(v.as_str(), "1" | "true" | "TRUE" | "yes"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn defaults_match_spec_constants() {
        let config = RagConfig::default();
        assert_eq!(config.context_chars, 120_000);
        assert_eq!(config.top_k, 20);
        assert_eq!(config.cache_ttl, 900);
        assert!(!config.cache_disabled);
    }

    #[test]
    fn env_overrides_defaults() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("RAG_TOP_K", "7");
        env::set_var("RAG_DISABLE_CACHE", "true");
        let config = RagConfig::from_env();
        assert_eq!(config.top_k, 7);
        assert!(config.cache_disabled);
        env::remove_var("RAG_TOP_K");
        env::remove_var("RAG_DISABLE_CACHE");
    }

    #[test]
    fn cli_overrides_win_over_everything() {
        let config = RagConfig::default().with_overrides(CliOverrides {
            top_k: Some(3),
            project: Some("acme".to_string()),
            ..Default::default()
        });
        assert_eq!(config.top_k, 3);
        assert_eq!(config.project, "acme");
    }

    #[test]
    fn malformed_env_value_falls_back_to_default() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var("RAG_TOP_K", "not-a-number");
        let config = RagConfig::from_env();
        assert_eq!(config.top_k, 20);
        env::remove_var("RAG_TOP_K");
    }
}
