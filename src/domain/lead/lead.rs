//! Lead entity and contact-form validation.
//!
//! A lead is a visitor's contact details captured mid-conversation. The form
//! is validated field by field before anything reaches the orchestrator, so
//! the UI can render errors next to the offending inputs.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{FieldErrors, LeadId, SessionId, Timestamp, ValidationError};

/// Maximum length for the free-text message on the form.
pub const MAX_LEAD_MESSAGE_LENGTH: usize = 500;

/// Follow-up status of a captured lead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LeadStatus {
    /// Freshly captured, nobody has reached out yet.
    New,
    /// A human has contacted the lead.
    Contacted,
    /// The lead became a customer.
    Converted,
    /// The lead went cold.
    Lost,
}

impl std::fmt::Display for LeadStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            LeadStatus::New => "new",
            LeadStatus::Contacted => "contacted",
            LeadStatus::Converted => "converted",
            LeadStatus::Lost => "lost",
        };
        write!(f, "{}", s)
    }
}

/// Raw contact-form input, not yet validated.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadForm {
    /// Visitor's name (required, 2-50 characters).
    pub name: String,
    /// Visitor's email (required).
    pub email: String,
    /// Visitor's phone number (required).
    pub phone: String,
    /// Company name.
    pub company: Option<String>,
    /// Which service the visitor asked about.
    pub service_interest: Option<String>,
    /// When the visitor prefers to be contacted.
    pub preferred_contact_time: Option<String>,
    /// Free-text message.
    pub message: Option<String>,
}

impl LeadForm {
    /// Validates every field, collecting one error message per field.
    ///
    /// # Errors
    ///
    /// Returns the full set of field errors; an empty set means valid.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = self.name.trim();
        if name.is_empty() {
            errors.push(ValidationError::empty_field("name"));
        } else if name.len() < 2 || name.len() > 50 {
            errors.push(ValidationError::length_out_of_range("name", 2, 50, name.len()));
        }

        let email = self.email.trim();
        if email.is_empty() {
            errors.push(ValidationError::empty_field("email"));
        } else if !is_valid_email(email) {
            errors.push(ValidationError::invalid_format(
                "email",
                "expected an address like name@example.com",
            ));
        }

        let phone = self.phone.trim();
        if phone.is_empty() {
            errors.push(ValidationError::empty_field("phone"));
        } else if !is_valid_phone(phone) {
            errors.push(ValidationError::invalid_format(
                "phone",
                "expected 10-11 digits, optionally prefixed with +92 or 0",
            ));
        }

        if let Some(message) = &self.message {
            if message.trim().len() > MAX_LEAD_MESSAGE_LENGTH {
                errors.push(ValidationError::too_long(
                    "message",
                    MAX_LEAD_MESSAGE_LENGTH,
                    message.trim().len(),
                ));
            }
        }

        errors.into_result()
    }
}

/// Accepts addresses of the shape `local@domain.tld` with no whitespace.
fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.split_once('.').is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
}

/// Accepts 10-11 digits after stripping separators and an optional
/// `+92` or leading-zero prefix.
fn is_valid_phone(phone: &str) -> bool {
    let cleaned: String = phone.chars().filter(|c| *c != '-' && *c != ' ').collect();

    let digits = cleaned
        .strip_prefix("+92")
        .or_else(|| cleaned.strip_prefix('0'))
        .unwrap_or(&cleaned);

    (10..=11).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
}

/// A captured lead.
///
/// # Invariants
///
/// - built only from a form that passed validation
/// - `captured_at` is set at construction and never changes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    /// Unique identifier for this lead.
    id: LeadId,

    /// Session the lead was captured in.
    session_id: SessionId,

    /// Visitor's name.
    name: String,

    /// Visitor's email.
    email: String,

    /// Visitor's phone number.
    phone: String,

    /// Company name, if given.
    company: Option<String>,

    /// Service the visitor asked about, if given.
    service_interest: Option<String>,

    /// Preferred contact time, if given.
    preferred_contact_time: Option<String>,

    /// Free-text message, if given.
    message: Option<String>,

    /// When the lead was captured.
    captured_at: Timestamp,

    /// Follow-up status.
    status: LeadStatus,

    /// Where the lead came from (widget deployment identifier).
    source: Option<String>,
}

impl Lead {
    /// Builds a lead from a validated form.
    ///
    /// # Errors
    ///
    /// Returns the form's field errors if validation fails.
    pub fn from_form(session_id: SessionId, form: LeadForm) -> Result<Self, FieldErrors> {
        form.validate()?;

        Ok(Self {
            id: LeadId::new(),
            session_id,
            name: form.name.trim().to_string(),
            email: form.email.trim().to_string(),
            phone: form.phone.trim().to_string(),
            company: form.company,
            service_interest: form.service_interest,
            preferred_contact_time: form.preferred_contact_time,
            message: form.message,
            captured_at: Timestamp::now(),
            status: LeadStatus::New,
            source: None,
        })
    }

    /// Sets the deployment source of this lead.
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Updates the follow-up status (admin surface).
    pub fn set_status(&mut self, status: LeadStatus) {
        self.status = status;
    }

    /// Returns the lead ID.
    pub fn id(&self) -> &LeadId {
        &self.id
    }

    /// Returns the session the lead was captured in.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the visitor's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the visitor's email.
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the visitor's phone number.
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// Returns the company, if given.
    pub fn company(&self) -> Option<&str> {
        self.company.as_deref()
    }

    /// Returns the service interest, if given.
    pub fn service_interest(&self) -> Option<&str> {
        self.service_interest.as_deref()
    }

    /// Returns the preferred contact time, if given.
    pub fn preferred_contact_time(&self) -> Option<&str> {
        self.preferred_contact_time.as_deref()
    }

    /// Returns the free-text message, if given.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Returns when the lead was captured.
    pub fn captured_at(&self) -> &Timestamp {
        &self.captured_at
    }

    /// Returns the follow-up status.
    pub fn status(&self) -> LeadStatus {
        self.status
    }

    /// Returns the deployment source, if set.
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> LeadForm {
        LeadForm {
            name: "Ayesha Khan".to_string(),
            email: "ayesha@example.com".to_string(),
            phone: "0301-2345678".to_string(),
            ..LeadForm::default()
        }
    }

    #[test]
    fn valid_form_passes() {
        assert!(valid_form().validate().is_ok());
    }

    #[test]
    fn missing_required_fields_report_per_field() {
        let errors = LeadForm::default().validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors.get("name").is_some());
        assert!(errors.get("email").is_some());
        assert!(errors.get("phone").is_some());
    }

    #[test]
    fn short_name_is_rejected() {
        let mut form = valid_form();
        form.name = "A".to_string();
        let errors = form.validate().unwrap_err();
        assert!(errors.get("name").unwrap().contains("between 2 and 50"));
    }

    #[test]
    fn malformed_emails_are_rejected() {
        for email in ["plainaddress", "missing@tld", "two@@example.com", "with space@example.com"] {
            let mut form = valid_form();
            form.email = email.to_string();
            assert!(form.validate().is_err(), "accepted {:?}", email);
        }
    }

    #[test]
    fn phone_accepts_separators_and_country_prefix() {
        for phone in ["+92-301-2345678", "03012345678", "0301 2345678"] {
            let mut form = valid_form();
            form.phone = phone.to_string();
            assert!(form.validate().is_ok(), "rejected {:?}", phone);
        }
    }

    #[test]
    fn phone_rejects_letters_and_wrong_length() {
        for phone in ["12345", "phone-number", "0301234567890000"] {
            let mut form = valid_form();
            form.phone = phone.to_string();
            assert!(form.validate().is_err(), "accepted {:?}", phone);
        }
    }

    #[test]
    fn over_long_message_is_rejected() {
        let mut form = valid_form();
        form.message = Some("x".repeat(MAX_LEAD_MESSAGE_LENGTH + 1));
        let errors = form.validate().unwrap_err();
        assert!(errors.get("message").is_some());
    }

    #[test]
    fn lead_from_form_trims_and_defaults_to_new() {
        let mut form = valid_form();
        form.name = "  Ayesha Khan  ".to_string();

        let lead = Lead::from_form(SessionId::new(), form).unwrap();
        assert_eq!(lead.name(), "Ayesha Khan");
        assert_eq!(lead.status(), LeadStatus::New);
        assert!(lead.source().is_none());
    }

    #[test]
    fn lead_from_invalid_form_is_rejected() {
        assert!(Lead::from_form(SessionId::new(), LeadForm::default()).is_err());
    }
}
