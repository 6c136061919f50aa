//! ChatModel port - interface to the remote language-generation backend.
//!
//! The backend is an opaque remote function `generate(system, user) -> text`
//! and is assumed unreliable: it may error, time out, or return low-quality
//! text. Adapters translate provider-specific APIs into this shape; the
//! response generator above this port absorbs every error into a fallback
//! reply, so nothing here ever reaches the visitor as an exception.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Port for the language-generation backend.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Generates a single completion for the given prompts.
    async fn complete(&self, request: ChatRequest) -> Result<ChatReply, ModelError>;

    /// Returns backend information (provider name, model identifier).
    fn info(&self) -> ModelInfo;
}

/// A completion request: one system prompt, one rendered user prompt.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest {
    /// System-level instruction embedding the business context.
    pub system_prompt: String,
    /// Rendered conversation history plus the new utterance.
    pub user_prompt: String,
    /// Token budget for the reply.
    pub max_tokens: u32,
    /// Sampling temperature.
    pub temperature: f32,
}

impl ChatRequest {
    /// Creates a request with the default token budget and temperature.
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            max_tokens: 200,
            temperature: 0.7,
        }
    }

    /// Sets the token budget.
    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Sets the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}

/// A completion from the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    /// Generated text.
    pub text: String,
    /// Model that produced it.
    pub model: String,
}

impl ChatReply {
    /// Creates a reply.
    pub fn new(text: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            model: model.into(),
        }
    }
}

/// Backend information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelInfo {
    /// Provider name (e.g., "mistral").
    pub provider: String,
    /// Model identifier (e.g., "mistral-small-latest").
    pub model: String,
}

impl ModelInfo {
    /// Creates backend info.
    pub fn new(provider: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            model: model.into(),
        }
    }
}

/// Generation backend errors.
///
/// Non-2xx responses, malformed payloads and transport failures all map
/// here; callers treat every variant uniformly as "generation failed".
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u32,
    },

    /// Network error during the request.
    #[error("network error: {0}")]
    Network(String),

    /// Failed to parse the backend response.
    #[error("parse error: {0}")]
    Parse(String),

    /// Backend returned a server error or is down.
    #[error("backend unavailable: {message}")]
    Unavailable {
        /// Error details.
        message: String,
    },

    /// Rate limited by the backend.
    #[error("rate limited: retry after {retry_after_secs}s")]
    RateLimited {
        /// Seconds until retry is allowed.
        retry_after_secs: u32,
    },

    /// API key rejected.
    #[error("authentication failed")]
    AuthenticationFailed,

    /// Backend rejected the request as malformed.
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl ModelError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Returns true if a later attempt could plausibly succeed.
    ///
    /// The engine never retries within a turn; this only feeds logging so
    /// operators can distinguish transient noise from configuration errors.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ModelError::Timeout { .. }
                | ModelError::Network(_)
                | ModelError::Unavailable { .. }
                | ModelError::RateLimited { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_applies_overrides() {
        let request = ChatRequest::new("system", "user")
            .with_max_tokens(64)
            .with_temperature(0.2);

        assert_eq!(request.max_tokens, 64);
        assert_eq!(request.temperature, 0.2);
    }

    #[test]
    fn request_defaults_are_bounded() {
        let request = ChatRequest::new("system", "user");
        assert_eq!(request.max_tokens, 200);
        assert_eq!(request.temperature, 0.7);
    }

    #[test]
    fn transient_errors_are_retryable() {
        assert!(ModelError::Timeout { timeout_secs: 30 }.is_retryable());
        assert!(ModelError::network("reset").is_retryable());
        assert!(ModelError::unavailable("502").is_retryable());
        assert!(ModelError::RateLimited { retry_after_secs: 5 }.is_retryable());
    }

    #[test]
    fn permanent_errors_are_not_retryable() {
        assert!(!ModelError::AuthenticationFailed.is_retryable());
        assert!(!ModelError::parse("bad json").is_retryable());
        assert!(!ModelError::InvalidRequest("missing model".into()).is_retryable());
    }
}
