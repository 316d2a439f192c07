//! Provider configuration, loaded from environment variables.

use std::env;
use std::time::Duration;

/// Configuration for one provider (fast LLM, main LLM, or cross-encoder).
///
/// Mirrors the teacher's `ProviderConfig::from_env`, reading
/// `RAGLINE_{NAME}_{FIELD}` variables rather than requiring a config file,
/// since §6 specifies "credentials for the LLM provider" as environment-only.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Logical provider name, used as the env var prefix.
    pub name: String,
    /// API endpoint, if the provider is HTTP-backed.
    pub endpoint: Option<String>,
    /// API credential.
    pub api_key: Option<String>,
    /// Model identifier to request.
    pub model: String,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Build a config directly, without consulting the environment.
    #[must_use]
    pub fn new(name: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            endpoint: None,
            api_key: None,
            model: model.into(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Load `endpoint`/`api_key`/`model` from `RAGLINE_{NAME}_*` environment
    /// variables, falling back to `default_model` when
    /// `RAGLINE_{NAME}_MODEL` is unset.
    #[must_use]
    pub fn from_env(name: &str, default_model: &str) -> Self {
        let prefix = format!("RAGLINE_{}", name.to_uppercase());
        Self {
            name: name.to_string(),
            endpoint: env::var(format!("{prefix}_ENDPOINT")).ok(),
            api_key: env::var(format!("{prefix}_API_KEY")).ok(),
            model: env::var(format!("{prefix}_MODEL")).unwrap_or_else(|_| default_model.to_string()),
            timeout: Duration::from_secs(30),
        }
    }

    /// Whether this config has enough to make a real HTTP call.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.endpoint.is_some() && self.api_key.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn from_env_falls_back_to_default_model() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::remove_var("RAGLINE_FAST_MODEL");
        let cfg = ProviderConfig::from_env("fast", "fast-default");
        assert_eq!(cfg.model, "fast-default");
        assert!(!cfg.is_configured());
    }

    #[test]
    fn from_env_reads_model_override() {
        let _guard = ENV_LOCK.lock().unwrap();
        std::env::set_var("RAGLINE_FAST_MODEL", "custom-model");
        let cfg = ProviderConfig::from_env("fast", "fast-default");
        assert_eq!(cfg.model, "custom-model");
        std::env::remove_var("RAGLINE_FAST_MODEL");
    }
}
