//! Human-escalation request entity.

use serde::{Deserialize, Serialize};

use crate::domain::chat::Message;
use crate::domain::foundation::{EscalationId, SessionId, Timestamp};

/// Resolution status of an escalation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EscalationStatus {
    /// Waiting for a human to pick it up.
    Pending,
    /// A human has handled it.
    Resolved,
}

impl std::fmt::Display for EscalationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EscalationStatus::Pending => "pending",
            EscalationStatus::Resolved => "resolved",
        };
        write!(f, "{}", s)
    }
}

/// Contact details the visitor volunteered with the escalation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactDetails {
    /// Visitor's name.
    pub name: Option<String>,
    /// Visitor's email.
    pub email: Option<String>,
    /// Visitor's phone number.
    pub phone: Option<String>,
}

impl ContactDetails {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// A request to hand the conversation to a human.
///
/// Carries a snapshot of the transcript at the moment of escalation so the
/// human picking it up has the full context without a store round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Escalation {
    /// Unique identifier for this escalation.
    id: EscalationId,

    /// Session that escalated.
    session_id: SessionId,

    /// Transcript snapshot at escalation time.
    transcript: Vec<Message>,

    /// Contact details, if the visitor gave any.
    contact: ContactDetails,

    /// Why the conversation escalated.
    reason: String,

    /// When the request was raised.
    created_at: Timestamp,

    /// Resolution status.
    status: EscalationStatus,

    /// When the request was resolved, if it has been.
    resolved_at: Option<Timestamp>,

    /// Who resolved it, if anyone.
    resolved_by: Option<String>,
}

impl Escalation {
    /// Creates a pending escalation with a transcript snapshot.
    pub fn new(
        session_id: SessionId,
        transcript: Vec<Message>,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: EscalationId::new(),
            session_id,
            transcript,
            contact: ContactDetails::default(),
            reason: reason.into(),
            created_at: Timestamp::now(),
            status: EscalationStatus::Pending,
            resolved_at: None,
            resolved_by: None,
        }
    }

    /// Attaches the visitor's contact details.
    pub fn with_contact(mut self, contact: ContactDetails) -> Self {
        self.contact = contact;
        self
    }

    /// Marks the escalation resolved, stamping who and when.
    ///
    /// A second call is a no-op: the first resolution wins.
    pub fn resolve(&mut self, resolved_by: Option<String>) {
        if self.status == EscalationStatus::Resolved {
            return;
        }
        self.status = EscalationStatus::Resolved;
        self.resolved_at = Some(Timestamp::now());
        self.resolved_by = resolved_by;
    }

    /// Returns the escalation ID.
    pub fn id(&self) -> &EscalationId {
        &self.id
    }

    /// Returns the escalating session's ID.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the transcript snapshot.
    pub fn transcript(&self) -> &[Message] {
        &self.transcript
    }

    /// Returns the visitor's contact details.
    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    /// Returns the escalation reason.
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Returns when the request was raised.
    pub fn created_at(&self) -> &Timestamp {
        &self.created_at
    }

    /// Returns the resolution status.
    pub fn status(&self) -> EscalationStatus {
        self.status
    }

    /// Returns when the request was resolved, if it has been.
    pub fn resolved_at(&self) -> Option<&Timestamp> {
        self.resolved_at.as_ref()
    }

    /// Returns who resolved the request, if anyone.
    pub fn resolved_by(&self) -> Option<&str> {
        self.resolved_by.as_deref()
    }
}
