//! Email notification configuration.

use serde::Deserialize;

use super::error::ValidationError;

/// Email delivery configuration (Resend-compatible API).
#[derive(Debug, Clone, Deserialize)]
pub struct EmailConfig {
    /// Delivery service API key.
    #[serde(default)]
    pub api_key: String,

    /// From email address.
    #[serde(default = "default_from_email")]
    pub from_email: String,

    /// From display name.
    #[serde(default = "default_from_name")]
    pub from_name: String,
}

impl EmailConfig {
    /// Returns the formatted "From" header value.
    pub fn from_header(&self) -> String {
        format!("{} <{}>", self.from_name, self.from_email)
    }

    /// Validates the email configuration.
    ///
    /// Only called when email notifications are enabled in the business
    /// profile; a widget with notifications off needs no key.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_empty() {
            return Err(ValidationError::MissingRequired("EMAIL__API_KEY"));
        }
        if !self.from_email.contains('@') {
            return Err(ValidationError::InvalidFromEmail);
        }
        Ok(())
    }
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            from_email: default_from_email(),
            from_name: default_from_name(),
        }
    }
}

fn default_from_email() -> String {
    "noreply@concierge.chat".to_string()
}

fn default_from_name() -> String {
    "Concierge".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_header_combines_name_and_address() {
        let config = EmailConfig::default();
        assert_eq!(config.from_header(), "Concierge <noreply@concierge.chat>");
    }

    #[test]
    fn empty_api_key_fails_validation() {
        assert!(EmailConfig::default().validate().is_err());
    }

    #[test]
    fn bad_from_email_fails_validation() {
        let config = EmailConfig {
            api_key: "key".to_string(),
            from_email: "not-an-address".to_string(),
            ..EmailConfig::default()
        };
        assert_eq!(config.validate(), Err(ValidationError::InvalidFromEmail));
    }
}
