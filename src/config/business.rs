//! Business profile: the read-only context bundle for one deployment.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::ConfigError;

/// Per-deployment feature switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureFlags {
    /// Prompt visitors for contact details.
    #[serde(default = "default_true")]
    pub lead_capture: bool,

    /// Offer hand-off to a human.
    #[serde(default = "default_true")]
    pub human_escalation: bool,

    /// Send email alerts for leads and escalations.
    #[serde(default = "default_true")]
    pub email_notifications: bool,
}

impl Default for FeatureFlags {
    fn default() -> Self {
        Self {
            lead_capture: true,
            human_escalation: true,
            email_notifications: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// Read-only business context supplied once per deployment.
///
/// The engine never mutates this; it is shared freely across sessions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessProfile {
    /// Business name.
    pub business_name: String,

    /// Industry the business operates in.
    pub industry: String,

    /// Services on offer.
    pub services: Vec<String>,

    /// Pricing summary.
    pub pricing: String,

    /// Opening hours.
    pub business_hours: String,

    /// Contact email; also the recipient of lead/escalation alerts.
    pub contact_email: String,

    /// Contact phone number.
    pub contact_phone: String,

    /// Suggested quick replies shown in the widget.
    #[serde(default)]
    pub quick_replies: Vec<String>,

    /// Greeting appended as the first bot message when the chat opens.
    #[serde(default)]
    pub welcome_message: Option<String>,

    /// Feature switches.
    #[serde(default)]
    pub features: FeatureFlags,
}

impl BusinessProfile {
    /// Loads a profile from a JSON file.
    ///
    /// # Errors
    ///
    /// - `File` if the file cannot be read
    /// - `Parse` if the JSON does not match the profile shape
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::file(path.display().to_string(), e))?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::parse(path.display().to_string(), e))
    }

    /// Returns the greeting, falling back to a generic one.
    pub fn welcome_message(&self) -> &str {
        self.welcome_message
            .as_deref()
            .unwrap_or("Hi! I'm your AI Assistant. How can I help you today?")
    }

    /// Renders the profile as a fact block for the system prompt.
    pub fn context_block(&self) -> String {
        format!(
            "Business Name: {}\n\
             Industry: {}\n\
             Services: {}\n\
             Pricing: {}\n\
             Business Hours: {}\n\
             Contact Email: {}\n\
             Contact Phone: {}",
            self.business_name,
            self.industry,
            self.services.join(", "),
            self.pricing,
            self.business_hours,
            self.contact_email,
            self.contact_phone,
        )
    }

    /// A sample profile for demos and tests.
    pub fn demo() -> Self {
        Self {
            business_name: "Lumen Dental Care".to_string(),
            industry: "dental healthcare".to_string(),
            services: vec![
                "Checkups".to_string(),
                "Teeth whitening".to_string(),
                "Braces".to_string(),
            ],
            pricing: "Checkups from PKR 2,500; whitening from PKR 15,000".to_string(),
            business_hours: "Mon-Sat 9am-7pm".to_string(),
            contact_email: "hello@lumendental.example".to_string(),
            contact_phone: "+92-301-2345678".to_string(),
            quick_replies: vec![
                "What are your prices?".to_string(),
                "Book an appointment".to_string(),
                "What services do you offer?".to_string(),
            ],
            welcome_message: None,
            features: FeatureFlags::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_block_contains_every_fact() {
        let profile = BusinessProfile::demo();
        let block = profile.context_block();

        assert!(block.contains("Lumen Dental Care"));
        assert!(block.contains("dental healthcare"));
        assert!(block.contains("Teeth whitening"));
        assert!(block.contains("Mon-Sat 9am-7pm"));
        assert!(block.contains("hello@lumendental.example"));
    }

    #[test]
    fn welcome_message_falls_back_to_generic() {
        let mut profile = BusinessProfile::demo();
        assert!(profile.welcome_message().starts_with("Hi! I'm your AI Assistant"));

        profile.welcome_message = Some("Welcome to Lumen!".to_string());
        assert_eq!(profile.welcome_message(), "Welcome to Lumen!");
    }

    #[test]
    fn features_default_to_enabled() {
        let flags = FeatureFlags::default();
        assert!(flags.lead_capture);
        assert!(flags.human_escalation);
        assert!(flags.email_notifications);
    }

    #[test]
    fn profile_parses_from_json_with_defaults() {
        let json = r#"{
            "business_name": "Acme",
            "industry": "retail",
            "services": ["Sales"],
            "pricing": "On request",
            "business_hours": "9-5",
            "contact_email": "acme@example.com",
            "contact_phone": "03012345678"
        }"#;

        let profile: BusinessProfile = serde_json::from_str(json).unwrap();
        assert!(profile.quick_replies.is_empty());
        assert!(profile.welcome_message.is_none());
        assert!(profile.features.lead_capture);
    }
}
