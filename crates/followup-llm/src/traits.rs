use async_trait::async_trait;
use thiserror::Error;

use crate::Completion;

/// Model used when neither the config file nor the CLI names one.
pub const DEFAULT_MODEL: &str = "claude-3-7-sonnet-20250219";

/// Errors that can occur while talking to a text-generation provider
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Transport(String),

    #[error("Authentication failed (check ANTHROPIC_API_KEY)")]
    Authentication,

    #[error("Rate limited by provider")]
    RateLimited { retry_after_secs: Option<u64> },

    #[error("Provider overloaded: {0}")]
    Overloaded(String),

    #[error("Provider error (HTTP {status}): {message}")]
    Provider { status: u16, message: String },

    #[error("Failed to decode provider response: {0}")]
    Deserialization(String),

    #[error("Provider returned no text content")]
    EmptyResponse,

    #[error("Client configuration error: {0}")]
    ConfigError(String),
}

/// Per-call generation settings: which model and how many output tokens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    pub model: String,
    pub max_tokens: u32,
}

impl GenerationConfig {
    pub fn new(max_tokens: u32) -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Build a request using these settings
    pub fn request(&self, system: &str, prompt: String) -> CompletionRequest {
        CompletionRequest {
            system: system.to_string(),
            prompt,
            max_tokens: self.max_tokens,
            model: self.model.clone(),
        }
    }
}

/// A single-turn completion request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionRequest {
    /// Role-priming instruction sent as the system prompt
    pub system: String,
    /// The user turn
    pub prompt: String,
    /// Output length cap
    pub max_tokens: u32,
    /// Model identifier
    pub model: String,
}

/// The text-generation collaborator every component talks to
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Human-readable provider name (e.g., "anthropic")
    fn name(&self) -> &str;

    /// Send one request and wait for the full completion
    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError>;
}
