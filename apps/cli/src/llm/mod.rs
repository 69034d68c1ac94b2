//! LLM Client layer — the single point of entry for all chat-completion calls.
//!
//! ARCHITECTURAL RULE: No other module may call a provider API directly.
//! All LLM interactions MUST go through a `ChatClient` built by the registry.
//!
//! Providers are looked up in a capability-keyed registry rather than a
//! conditional ladder; adding a provider is a registration, not an edit of a
//! dispatch chain. Credentials are threaded explicitly through constructors —
//! no process-wide environment mutation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize};
use thiserror::Error;

use crate::errors::AppError;

pub mod anthropic;
pub mod google;
pub mod openai;

pub use anthropic::AnthropicClient;
pub use google::GoogleClient;
pub use openai::OpenAiClient;

/// Sampling temperature used for every stage call.
pub const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 4096;
const REQUEST_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,
}

/// A single chat-completion call: system prompt + user prompt in, text out.
///
/// Every call is attempted exactly once — no retries, no backoff. A failed
/// stage aborts the pipeline run.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, system: &str, prompt: &str) -> Result<String, LlmError>;
}

/// Provider/model pair selected for a pipeline stage.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelSpec {
    pub service: String,
    pub model: String,
}

impl Default for ModelSpec {
    fn default() -> Self {
        Self {
            service: "openai".to_string(),
            model: "gpt-4".to_string(),
        }
    }
}

type Constructor = fn(model: String, api_key: String) -> Arc<dyn ChatClient>;

/// Registry mapping a provider identifier to a client constructor.
pub struct ProviderRegistry {
    constructors: HashMap<&'static str, Constructor>,
}

impl ProviderRegistry {
    /// Registry pre-loaded with the built-in providers.
    pub fn builtin() -> Self {
        let mut registry = Self {
            constructors: HashMap::new(),
        };
        registry.register("openai", |model, key| Arc::new(OpenAiClient::new(model, key)));
        registry.register("anthropic", |model, key| {
            Arc::new(AnthropicClient::new(model, key))
        });
        registry.register("google", |model, key| Arc::new(GoogleClient::new(model, key)));
        registry
    }

    pub fn register(&mut self, service: &'static str, constructor: Constructor) {
        self.constructors.insert(service, constructor);
    }

    /// Builds a client for the given spec, or fails immediately for an
    /// unrecognized provider identifier — no fallback.
    pub fn build(&self, spec: &ModelSpec, api_key: &str) -> Result<Arc<dyn ChatClient>, AppError> {
        let constructor = self
            .constructors
            .get(spec.service.as_str())
            .ok_or_else(|| AppError::UnsupportedProvider(spec.service.clone()))?;
        Ok(constructor(spec.model.clone(), api_key.to_string()))
    }
}

/// Shared HTTP client builder for the provider implementations.
pub(crate) fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .expect("Failed to build HTTP client")
}

/// Calls the client and deserializes the text response as JSON.
/// The prompt must instruct the model to return valid JSON.
pub async fn complete_json<T: DeserializeOwned>(
    client: &dyn ChatClient,
    system: &str,
    prompt: &str,
) -> Result<T, LlmError> {
    let text = client.complete(system, prompt).await?;
    let text = strip_json_fences(&text);
    serde_json::from_str(text).map_err(LlmError::Parse)
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_registry_builds_all_builtin_providers() {
        let registry = ProviderRegistry::builtin();
        for service in ["openai", "anthropic", "google"] {
            let spec = ModelSpec {
                service: service.to_string(),
                model: "test-model".to_string(),
            };
            assert!(registry.build(&spec, "test-key").is_ok(), "{service}");
        }
    }

    #[test]
    fn test_registry_rejects_unknown_provider() {
        let registry = ProviderRegistry::builtin();
        let spec = ModelSpec {
            service: "mistral".to_string(),
            model: "mistral-large".to_string(),
        };
        match registry.build(&spec, "test-key") {
            Err(AppError::UnsupportedProvider(name)) => assert_eq!(name, "mistral"),
            Err(other) => panic!("expected UnsupportedProvider, got {other:?}"),
            Ok(_) => panic!("unknown provider must not build"),
        }
    }

    #[test]
    fn test_model_spec_default_matches_config_fallback() {
        let spec = ModelSpec::default();
        assert_eq!(spec.service, "openai");
        assert_eq!(spec.model, "gpt-4");
    }
}
