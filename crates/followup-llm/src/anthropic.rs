use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

use crate::types::{ErrorEnvelope, Message, MessagesRequest, MessagesResponse};
use crate::{Completion, CompletionRequest, LlmError, TextGenerator};

/// Default API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

/// Anthropic Messages API client
///
/// The key lives in a [`SecretString`] and is only exposed while building
/// request headers. No `Debug` impl, so it cannot end up in logs.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl AnthropicClient {
    const API_VERSION: &'static str = "2023-06-01";

    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self, LlmError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(LlmError::ConfigError("API key is empty".to_string()));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::ConfigError(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the base URL (proxies, local test servers)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn messages_url(&self) -> String {
        format!("{}/v1/messages", self.base_url)
    }

    async fn error_for_status(response: reqwest::Response) -> LlmError {
        let status = response.status();
        let retry_after_secs = response
            .headers()
            .get(reqwest::header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or(body);

        match status.as_u16() {
            401 => LlmError::Authentication,
            429 => LlmError::RateLimited { retry_after_secs },
            529 => LlmError::Overloaded(message),
            code => LlmError::Provider {
                status: code,
                message,
            },
        }
    }
}

#[async_trait]
impl TextGenerator for AnthropicClient {
    fn name(&self) -> &str {
        "anthropic"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<Completion, LlmError> {
        let start = Instant::now();
        let body = MessagesRequest {
            model: &request.model,
            max_tokens: request.max_tokens,
            system: (!request.system.is_empty()).then_some(request.system.as_str()),
            messages: vec![Message {
                role: "user",
                content: &request.prompt,
            }],
        };

        debug!(
            model = %request.model,
            max_tokens = request.max_tokens,
            prompt_len = request.prompt.len(),
            "Sending completion request"
        );

        let response = self
            .client
            .post(self.messages_url())
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            let err = Self::error_for_status(response).await;
            warn!(error = %err, "Completion request rejected");
            return Err(err);
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(e.to_string()))?;

        let text = parsed.text().ok_or(LlmError::EmptyResponse)?;
        let duration = start.elapsed();

        debug!(
            model = %parsed.model,
            duration_ms = duration.as_millis(),
            text_len = text.len(),
            "Completion received"
        );

        let completion = Completion::new(text, parsed.model, duration);
        Ok(match parsed.usage {
            Some(usage) => completion.with_usage(usage.input_tokens, usage.output_tokens),
            None => completion,
        })
    }
}
