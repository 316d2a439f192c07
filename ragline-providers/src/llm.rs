//! The LLM provider trait: used for concept extraction, query expansion,
//! query decomposition (all "fast" model calls) and answer synthesis (the
//! "main" model call).

use async_trait::async_trait;

use crate::config::ProviderConfig;
use crate::error::{ProviderError, Result};

/// Per-call generation options.
#[derive(Debug, Clone)]
pub struct CompletionOptions {
    /// Sampling temperature. Synthesis calls use `<= 0.3` per spec.
    pub temperature: f32,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.3,
            max_tokens: 1024,
        }
    }
}

/// An LLM completion call, abstracted over the concrete provider.
///
/// Implementations must never propagate a failure as a hard error from the
/// analyzer's perspective — callers are expected to catch `Err` and degrade
/// to an empty/default result per §4.6 and §7. This trait still returns
/// `Result` so the provider itself can report the failure for logging.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String>;
}

/// A generic HTTP JSON provider, POSTing `{model, prompt, temperature, max_tokens}`
/// and expecting `{text: string}` back. Works against any reverse-proxy-style
/// LLM gateway; the specific wire format of any particular vendor is outside
/// this crate's scope (the model is an opaque collaborator per spec).
#[derive(Debug, Clone)]
pub struct HttpLlmProvider {
    config: ProviderConfig,
    client: reqwest::Client,
}

impl HttpLlmProvider {
    /// Build a provider from a resolved config.
    #[must_use]
    pub fn new(config: ProviderConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(serde::Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    temperature: f32,
    max_tokens: u32,
}

#[derive(serde::Deserialize)]
struct CompletionResponse {
    text: String,
}

#[async_trait]
impl LlmProvider for HttpLlmProvider {
    async fn complete(&self, prompt: &str, options: &CompletionOptions) -> Result<String> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .ok_or_else(|| ProviderError::NotConfigured(self.config.name.clone()))?;

        let mut request = self.client.post(endpoint).json(&CompletionRequest {
            model: &self.config.model,
            prompt,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        });
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = tokio::time::timeout(self.config.timeout, request.send())
            .await
            .map_err(|_| ProviderError::Timeout)??;
        let body: CompletionResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;
        Ok(body.text)
    }
}

/// A deterministic provider for tests and offline development: echoes back
/// a fixed, queryable response keyed by a substring of the prompt, or an
/// empty string if nothing matches.
#[derive(Debug, Clone, Default)]
pub struct MockLlmProvider {
    responses: Vec<(String, String)>,
}

impl MockLlmProvider {
    /// An instance with no configured responses (always returns `""`).
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Register a response returned when `prompt` contains `matches`.
    #[must_use]
    pub fn with_response(mut self, matches: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.push((matches.into(), response.into()));
        self
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    async fn complete(&self, prompt: &str, _options: &CompletionOptions) -> Result<String> {
        Ok(self
            .responses
            .iter()
            .find(|(needle, _)| prompt.contains(needle.as_str()))
            .map(|(_, resp)| resp.clone())
            .unwrap_or_default())
    }
}
