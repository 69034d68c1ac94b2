use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::errors::AppError;
use crate::llm::ModelSpec;

/// Pipeline stage identifiers, in execution order. Also the keys of the
/// `agent_llms` mapping in the configuration file.
pub const STAGES: [&str; 4] = [
    "job_analyzer",
    "relevance_selector",
    "formatting_strategist",
    "cover_letter_writer",
];

/// Application configuration loaded from a JSON file.
///
/// `api_keys` maps a provider identifier to its credential; keys missing from
/// the file are filled from the environment (`OPENAI_API_KEY`,
/// `ANTHROPIC_API_KEY`, `GOOGLE_API_KEY`), with `.env` honored via dotenvy.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api_keys: HashMap<String, String>,
    #[serde(default)]
    pub agent_llms: HashMap<String, ModelSpec>,
    #[serde(default)]
    pub job_posting_url: Option<String>,
    #[serde(default)]
    pub job_description: Option<String>,
    /// Canonical LaTeX preamble. When set, the normalizer replaces everything
    /// before the preamble anchor in the generated document with this text.
    #[serde(default)]
    pub canonical_preamble: Option<String>,
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path.display()))?;
        let mut config: Config = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))?;
        config.fill_keys_from_env();
        Ok(config)
    }

    /// Model selection for a stage; falls back to the default provider/model
    /// when the stage has no entry in `agent_llms`.
    pub fn stage_model(&self, stage: &str) -> ModelSpec {
        self.agent_llms.get(stage).cloned().unwrap_or_default()
    }

    /// Credential for a provider identifier.
    pub fn api_key(&self, service: &str) -> Result<&str, AppError> {
        self.api_keys
            .get(service)
            .map(String::as_str)
            .ok_or_else(|| {
                AppError::Validation(format!("No API key configured for provider '{service}'"))
            })
    }

    /// Logs the provider/model assignment of every pipeline stage.
    pub fn log_llm_assignments(&self) {
        for stage in STAGES {
            let spec = self.stage_model(stage);
            info!("{stage}: {} - {}", spec.service, spec.model);
        }
    }

    fn fill_keys_from_env(&mut self) {
        for (service, var) in [
            ("openai", "OPENAI_API_KEY"),
            ("anthropic", "ANTHROPIC_API_KEY"),
            ("google", "GOOGLE_API_KEY"),
        ] {
            if !self.api_keys.contains_key(service) {
                if let Ok(value) = std::env::var(var) {
                    self.api_keys.insert(service.to_string(), value);
                }
            }
        }
    }
}
