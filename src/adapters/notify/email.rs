//! Email notifier (Resend-compatible HTTP API).
//!
//! Sends lead and escalation alerts to the business contact address.
//! Delivery failures map to `NotifyError` and are swallowed upstream by the
//! effect dispatcher; an alert can never block or reverse the record it
//! announces.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, Secret};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::{BusinessProfile, EmailConfig};
use crate::domain::chat::Sender;
use crate::domain::lead::{Escalation, Lead};
use crate::ports::{Notifier, NotifyError};

/// Default Resend API endpoint.
const DEFAULT_BASE_URL: &str = "https://api.resend.com";

/// Email implementation of the Notifier port.
pub struct EmailNotifier {
    api_key: Secret<String>,
    from_header: String,
    base_url: String,
    profile: Arc<BusinessProfile>,
    client: Client,
}

impl EmailNotifier {
    /// Creates a notifier from the email configuration and the business
    /// profile (whose contact email receives the alerts).
    pub fn new(config: &EmailConfig, profile: Arc<BusinessProfile>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            api_key: Secret::new(config.api_key.clone()),
            from_header: config.from_header(),
            base_url: DEFAULT_BASE_URL.to_string(),
            profile,
            client,
        }
    }

    /// Overrides the API base URL (tests, self-hosted relays).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn send(&self, subject: String, text: String) -> Result<(), NotifyError> {
        if self.api_key.expose_secret().is_empty() {
            return Err(NotifyError::configuration("email API key is empty"));
        }

        let payload = EmailPayload {
            from: &self.from_header,
            to: vec![&self.profile.contact_email],
            subject: &subject,
            text: &text,
        };

        let response = self
            .client
            .post(format!("{}/emails", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotifyError::delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(NotifyError::delivery(format!(
                "HTTP {}: {}",
                status.as_u16(),
                body
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for EmailNotifier {
    async fn lead_captured(&self, lead: &Lead) -> Result<(), NotifyError> {
        let subject = format!("New Lead: {} - {}", lead.name(), self.profile.business_name);
        let text = render_lead(lead);
        self.send(subject, text).await
    }

    async fn escalation_raised(&self, escalation: &Escalation) -> Result<(), NotifyError> {
        let subject = format!(
            "Human Escalation Required - {}",
            self.profile.business_name
        );
        let text = render_escalation(escalation);
        self.send(subject, text).await
    }
}

/// Renders the lead alert body.
fn render_lead(lead: &Lead) -> String {
    format!(
        "Name: {}\n\
         Email: {}\n\
         Phone: {}\n\
         Company: {}\n\
         Service interest: {}\n\
         Preferred contact time: {}\n\
         Message: {}\n\
         Captured at: {}",
        lead.name(),
        lead.email(),
        lead.phone(),
        lead.company().unwrap_or("N/A"),
        lead.service_interest().unwrap_or("N/A"),
        lead.preferred_contact_time().unwrap_or("N/A"),
        lead.message().unwrap_or("No message provided"),
        lead.captured_at(),
    )
}

/// Renders the escalation alert body with the transcript.
fn render_escalation(escalation: &Escalation) -> String {
    let transcript: Vec<String> = escalation
        .transcript()
        .iter()
        .map(|msg| {
            let speaker = match msg.sender() {
                Sender::User => "USER",
                Sender::Bot => "BOT",
            };
            format!("{}: {}", speaker, msg.content())
        })
        .collect();

    format!(
        "Session: {}\n\
         Reason: {}\n\
         Contact: {} / {} / {}\n\
         Raised at: {}\n\n\
         Conversation:\n{}",
        escalation.session_id(),
        escalation.reason(),
        escalation.contact().name.as_deref().unwrap_or("Unknown"),
        escalation.contact().email.as_deref().unwrap_or("Not provided"),
        escalation.contact().phone.as_deref().unwrap_or("Not provided"),
        escalation.created_at(),
        transcript.join("\n"),
    )
}

#[derive(Debug, Serialize)]
struct EmailPayload<'a> {
    from: &'a str,
    to: Vec<&'a str>,
    subject: &'a str,
    text: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::Message;
    use crate::domain::foundation::SessionId;
    use crate::domain::lead::{ContactDetails, LeadForm};

    fn sample_lead() -> Lead {
        Lead::from_form(
            SessionId::new(),
            LeadForm {
                name: "Ayesha Khan".to_string(),
                email: "ayesha@example.com".to_string(),
                phone: "03012345678".to_string(),
                company: Some("Khan & Co".to_string()),
                ..LeadForm::default()
            },
        )
        .unwrap()
    }

    #[test]
    fn lead_body_lists_contact_fields() {
        let body = render_lead(&sample_lead());
        assert!(body.contains("Name: Ayesha Khan"));
        assert!(body.contains("Email: ayesha@example.com"));
        assert!(body.contains("Company: Khan & Co"));
        assert!(body.contains("Service interest: N/A"));
    }

    #[test]
    fn escalation_body_includes_transcript_and_contact() {
        let session_id = SessionId::new();
        let transcript = vec![Message::user(session_id, "I want a human").unwrap()];
        let escalation = Escalation::new(session_id, transcript, "user asked").with_contact(
            ContactDetails {
                name: Some("Bilal".to_string()),
                ..ContactDetails::default()
            },
        );

        let body = render_escalation(&escalation);
        assert!(body.contains("Reason: user asked"));
        assert!(body.contains("USER: I want a human"));
        assert!(body.contains("Contact: Bilal / Not provided / Not provided"));
    }

    #[tokio::test]
    async fn empty_api_key_is_a_configuration_error() {
        let notifier = EmailNotifier::new(
            &EmailConfig::default(),
            Arc::new(BusinessProfile::demo()),
        );

        let err = notifier.lead_captured(&sample_lead()).await.unwrap_err();
        assert!(matches!(err, NotifyError::Configuration(_)));
    }
}
