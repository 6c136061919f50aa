//! Mistral chat-completions adapter for the ChatModel port.
//!
//! Non-2xx statuses, malformed payloads and transport failures are all
//! mapped into `ModelError`; the response generator above treats every
//! variant uniformly as "generation failed".
//!
//! # Configuration
//!
//! ```ignore
//! let config = MistralConfig::new(api_key)
//!     .with_model("mistral-small-latest")
//!     .with_base_url("https://api.mistral.ai");
//!
//! let model = MistralModel::new(config);
//! ```

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ports::{ChatModel, ChatReply, ChatRequest, ModelError, ModelInfo};

/// Configuration for the Mistral adapter.
#[derive(Debug, Clone)]
pub struct MistralConfig {
    /// API key for authentication.
    api_key: Secret<String>,
    /// Model to use (e.g., "mistral-small-latest").
    pub model: String,
    /// Base URL for the API.
    pub base_url: String,
    /// Request timeout.
    pub timeout: Duration,
}

impl MistralConfig {
    /// Creates a new configuration with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Secret::new(api_key.into()),
            model: "mistral-small-latest".to_string(),
            base_url: "https://api.mistral.ai".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Sets the model to use.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Exposes the API key (for making requests).
    fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }
}

/// Mistral API implementation of the ChatModel port.
pub struct MistralModel {
    config: MistralConfig,
    client: Client,
}

impl MistralModel {
    /// Creates a new Mistral adapter with the given configuration.
    pub fn new(config: MistralConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    /// Builds the chat completions endpoint URL.
    fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.config.base_url)
    }

    /// Converts a port request into Mistral's wire format.
    fn to_wire_request(&self, request: &ChatRequest) -> WireRequest {
        WireRequest {
            model: self.config.model.clone(),
            messages: vec![
                WireMessage {
                    role: "system",
                    content: request.system_prompt.clone(),
                },
                WireMessage {
                    role: "user",
                    content: request.user_prompt.clone(),
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        }
    }
}

#[async_trait]
impl ChatModel for MistralModel {
    async fn complete(&self, request: ChatRequest) -> Result<ChatReply, ModelError> {
        let wire_request = self.to_wire_request(&request);

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(self.config.api_key())
            .header("Content-Type", "application/json")
            .json(&wire_request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout {
                        timeout_secs: self.config.timeout.as_secs() as u32,
                    }
                } else if e.is_connect() {
                    ModelError::network(format!("Connection failed: {}", e))
                } else {
                    ModelError::network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(&response);
            let body = response.text().await.unwrap_or_default();
            return Err(map_error_status(status, retry_after, &body));
        }

        let payload: WireResponse = response
            .json()
            .await
            .map_err(|e| ModelError::parse(e.to_string()))?;

        let text = payload
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| ModelError::parse("response contained no choices"))?;

        Ok(ChatReply::new(text, payload.model))
    }

    fn info(&self) -> ModelInfo {
        ModelInfo::new("mistral", &self.config.model)
    }
}

/// Reads the Retry-After header, defaulting to 30 seconds.
fn parse_retry_after(response: &reqwest::Response) -> u32 {
    response
        .headers()
        .get("retry-after")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(30)
}

/// Maps a non-2xx status into a ModelError.
fn map_error_status(status: StatusCode, retry_after_secs: u32, body: &str) -> ModelError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ModelError::AuthenticationFailed,
        StatusCode::TOO_MANY_REQUESTS => ModelError::RateLimited { retry_after_secs },
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
            ModelError::InvalidRequest(truncate(body, 200))
        }
        status if status.is_server_error() => {
            ModelError::unavailable(format!("HTTP {}: {}", status.as_u16(), truncate(body, 200)))
        }
        status => ModelError::network(format!("unexpected HTTP {}", status.as_u16())),
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Mistral chat completions request body.
#[derive(Debug, Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: String,
}

/// Mistral chat completions response body (the fields we read).
#[derive(Debug, Deserialize)]
struct WireResponse {
    model: String,
    choices: Vec<WireChoice>,
}

#[derive(Debug, Deserialize)]
struct WireChoice {
    message: WireChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct WireChoiceMessage {
    content: String,
}
