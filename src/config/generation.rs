//! Generation backend configuration.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Configuration for the remote generation backend.
#[derive(Debug, Clone, Deserialize)]
pub struct GenerationConfig {
    /// API key for the backend.
    pub api_key: Option<String>,

    /// Model identifier.
    #[serde(default = "default_model")]
    pub model: String,

    /// Base URL for the API.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Token budget per reply.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl GenerationConfig {
    /// Returns the timeout as a Duration.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Returns true if an API key is configured.
    pub fn has_api_key(&self) -> bool {
        self.api_key.as_ref().is_some_and(|k| !k.is_empty())
    }

    /// Validates the generation configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !self.has_api_key() {
            return Err(ValidationError::MissingRequired("GENERATION__API_KEY"));
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::ZeroTimeout);
        }
        Ok(())
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_model(),
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_model() -> String {
    "mistral-small-latest".to_string()
}

fn default_base_url() -> String {
    "https://api.mistral.ai".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_max_tokens() -> u32 {
    200
}

fn default_temperature() -> f32 {
    0.7
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_bounded() {
        let config = GenerationConfig::default();
        assert_eq!(config.model, "mistral-small-latest");
        assert_eq!(config.max_tokens, 200);
        assert_eq!(config.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn missing_api_key_fails_validation() {
        let config = GenerationConfig::default();
        assert_eq!(
            config.validate(),
            Err(ValidationError::MissingRequired("GENERATION__API_KEY"))
        );
    }

    #[test]
    fn configured_key_passes_validation() {
        let config = GenerationConfig {
            api_key: Some("test-key".to_string()),
            ..GenerationConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
