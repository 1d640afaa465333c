//! Configuration file support for followup.
//!
//! Loads `followup.toml` from the working directory, falling back to
//! `<config dir>/followup/followup.toml`.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use followup_core::{DEFAULT_MAX_ATTEMPTS, FEEDBACK_MAX_TOKENS, FOLLOW_UP_MAX_TOKENS};
use followup_gate::{GateConfig, DEFAULT_MIN_SCORE, SCORE_MAX_TOKENS};
use followup_llm::{GenerationConfig, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// The config file name
pub const CONFIG_FILE_NAME: &str = "followup.toml";

/// Directory under the platform config dir holding the global config
pub const GLOBAL_CONFIG_DIR: &str = "followup";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Configuration loaded from `followup.toml`
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Global default model (applies to every call)
    pub model: Option<String>,
    /// Provider endpoint override
    pub api_base_url: Option<String>,
    /// HTTP request timeout
    pub request_timeout_secs: Option<u64>,
    /// Cap on propose/gate cycles per follow-up
    pub max_attempts: Option<usize>,
    #[serde(default)]
    pub feedback: RoleConfig,
    #[serde(default)]
    pub follow_up: RoleConfig,
    #[serde(default)]
    pub gate: GateSection,
}

/// Model settings for one kind of call
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct RoleConfig {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
}

/// Model settings and thresholds for the quality gate
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct GateSection {
    pub model: Option<String>,
    pub max_tokens: Option<u32>,
    pub min_relevance: Option<u32>,
    pub min_quality: Option<u32>,
}

impl ProjectConfig {
    /// Load configuration for `working_dir`.
    ///
    /// Returns:
    /// - `Ok(Some((config, path)))` for the first file found
    /// - `Ok(None)` if neither the local nor the global file exists
    /// - `Err(...)` if a file exists but fails to parse (hard error)
    pub fn load(working_dir: &Path) -> Result<Option<(Self, PathBuf)>> {
        let mut candidates = vec![working_dir.join(CONFIG_FILE_NAME)];
        if let Some(config_dir) = dirs::config_dir() {
            candidates.push(config_dir.join(GLOBAL_CONFIG_DIR).join(CONFIG_FILE_NAME));
        }

        for path in candidates {
            if let Some(config) = Self::load_from(&path)? {
                return Ok(Some((config, path)));
            }
        }
        Ok(None)
    }

    /// Load a specific file; `Ok(None)` if it does not exist
    pub fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        let config: ProjectConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;

        Ok(Some(config))
    }

    /// Priority: [feedback].model > global model > None
    pub fn feedback_model(&self) -> Option<&str> {
        self.feedback.model.as_deref().or(self.model.as_deref())
    }

    /// Priority: [follow_up].model > global model > None
    pub fn follow_up_model(&self) -> Option<&str> {
        self.follow_up.model.as_deref().or(self.model.as_deref())
    }

    /// Priority: [gate].model > global model > None
    pub fn gate_model(&self) -> Option<&str> {
        self.gate.model.as_deref().or(self.model.as_deref())
    }
}

/// Fully resolved runtime settings
#[derive(Debug, Clone)]
pub struct Settings {
    pub feedback: GenerationConfig,
    pub follow_up: GenerationConfig,
    pub gate: GateConfig,
    pub max_attempts: usize,
    pub api_base_url: String,
    pub request_timeout: Duration,
}

impl Settings {
    /// Merge built-in defaults, the config file and the CLI model override.
    /// Priority: CLI > role section > global > default.
    pub fn resolve(config: &ProjectConfig, cli_model: Option<&str>) -> Self {
        let pick = |role: Option<&str>| -> String {
            cli_model.or(role).unwrap_or(DEFAULT_MODEL).to_string()
        };

        let gate_model = pick(config.gate_model());
        let gate_tokens = config.gate.max_tokens.unwrap_or(SCORE_MAX_TOKENS);
        let gate = GateConfig {
            relevance: GenerationConfig::new(gate_tokens).with_model(gate_model.clone()),
            quality: GenerationConfig::new(gate_tokens).with_model(gate_model),
            min_relevance: config.gate.min_relevance.unwrap_or(DEFAULT_MIN_SCORE),
            min_quality: config.gate.min_quality.unwrap_or(DEFAULT_MIN_SCORE),
        };

        Self {
            feedback: GenerationConfig::new(
                config.feedback.max_tokens.unwrap_or(FEEDBACK_MAX_TOKENS),
            )
            .with_model(pick(config.feedback_model())),
            follow_up: GenerationConfig::new(
                config.follow_up.max_tokens.unwrap_or(FOLLOW_UP_MAX_TOKENS),
            )
            .with_model(pick(config.follow_up_model())),
            gate,
            max_attempts: config.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS).max(1),
            api_base_url: config
                .api_base_url
                .clone()
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            request_timeout: Duration::from_secs(
                config
                    .request_timeout_secs
                    .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS),
            ),
        }
    }
}
