//! Widget engine tuning.

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;

/// Engine tuning knobs for the widget.
#[derive(Debug, Clone, Deserialize)]
pub struct WidgetConfig {
    /// How many recent messages to render into the prompt.
    #[serde(default = "default_history_window")]
    pub history_window: usize,

    /// Maximum accepted length of a user message.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,

    /// Delay before the lead-capture form opens after a qualifying reply.
    ///
    /// A UX parameter, not a correctness requirement; the prompt is a
    /// cancelable scheduled task, never a blocking sleep.
    #[serde(default = "default_lead_prompt_delay_ms")]
    pub lead_prompt_delay_ms: u64,
}

impl WidgetConfig {
    /// Returns the lead-prompt delay as a Duration.
    pub fn lead_prompt_delay(&self) -> Duration {
        Duration::from_millis(self.lead_prompt_delay_ms)
    }

    /// Validates the widget configuration.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.history_window == 0 {
            return Err(ValidationError::ZeroHistoryWindow);
        }
        Ok(())
    }
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            history_window: default_history_window(),
            max_message_length: default_max_message_length(),
            lead_prompt_delay_ms: default_lead_prompt_delay_ms(),
        }
    }
}

fn default_history_window() -> usize {
    5
}

fn default_max_message_length() -> usize {
    500
}

fn default_lead_prompt_delay_ms() -> u64 {
    2000
}
