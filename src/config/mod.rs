//! Application configuration module
//!
//! Type-safe configuration loading from environment variables using the
//! `config` and `dotenvy` crates. Values are read with the `CONCIERGE`
//! prefix and nested sections use double underscores as separators. The
//! per-deployment business profile is a JSON document loaded separately via
//! [`BusinessProfile::from_json_file`].
//!
//! # Example
//!
//! ```no_run
//! use concierge::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod business;
mod email;
mod error;
mod generation;
mod widget;

pub use business::{BusinessProfile, FeatureFlags};
pub use email::EmailConfig;
pub use error::{ConfigError, ValidationError};
pub use generation::GenerationConfig;
pub use widget::WidgetConfig;

use serde::Deserialize;

/// Root application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Generation backend configuration.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Email notification configuration.
    #[serde(default)]
    pub email: EmailConfig,

    /// Widget engine tuning.
    #[serde(default)]
    pub widget: WidgetConfig,
}

impl AppConfig {
    /// Loads configuration from environment variables.
    ///
    /// Reads a `.env` file if present (development), then environment
    /// variables with the `CONCIERGE` prefix and `__` separators:
    ///
    /// - `CONCIERGE__GENERATION__API_KEY=...` -> `generation.api_key`
    /// - `CONCIERGE__WIDGET__HISTORY_WINDOW=5` -> `widget.history_window`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into the expected
    /// types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("CONCIERGE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validates all configuration sections.
    ///
    /// # Errors
    ///
    /// Returns the first `ValidationError` encountered.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.generation.validate()?;
        self.widget.validate()?;
        Ok(())
    }
}
