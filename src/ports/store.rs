//! ConversationStore port - interface to the external document store.
//!
//! Four record kinds cross this boundary: sessions, messages, leads and
//! escalations. All writes from the orchestrator are best-effort; a failing
//! store never blocks a conversation. The query surface backs the admin
//! console (conversation, lead and escalation lists with filters).

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::chat::{ChatSession, Message, SessionStatus};
use crate::domain::foundation::{EscalationId, LeadId, Timestamp};
use crate::domain::lead::{Escalation, EscalationStatus, Lead, LeadStatus};

/// Port for session/message/lead/escalation persistence.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persists a session snapshot (insert or replace by ID).
    async fn save_session(&self, session: &ChatSession) -> Result<(), StoreError>;

    /// Persists a single message.
    async fn save_message(&self, message: &Message) -> Result<(), StoreError>;

    /// Persists a captured lead.
    async fn save_lead(&self, lead: &Lead) -> Result<(), StoreError>;

    /// Persists an escalation request.
    async fn save_escalation(&self, escalation: &Escalation) -> Result<(), StoreError>;

    /// Returns sessions matching the query, newest first.
    async fn sessions(&self, query: SessionQuery) -> Result<Vec<ChatSession>, StoreError>;

    /// Returns leads matching the query, newest first.
    async fn leads(&self, query: LeadQuery) -> Result<Vec<Lead>, StoreError>;

    /// Returns escalations matching the query, newest first.
    async fn escalations(&self, query: EscalationQuery) -> Result<Vec<Escalation>, StoreError>;

    /// Updates the follow-up status of a lead.
    async fn update_lead_status(&self, id: &LeadId, status: LeadStatus) -> Result<(), StoreError>;

    /// Updates the resolution status of an escalation.
    ///
    /// Moving to `Resolved` stamps the resolution time and, when given, the
    /// resolver.
    async fn update_escalation_status(
        &self,
        id: &EscalationId,
        status: EscalationStatus,
        resolved_by: Option<&str>,
    ) -> Result<(), StoreError>;
}

/// Filter for session queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionQuery {
    /// Only sessions started at or after this time.
    pub started_after: Option<Timestamp>,
    /// Only sessions started at or before this time.
    pub started_before: Option<Timestamp>,
    /// Only sessions with this status.
    pub status: Option<SessionStatus>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl SessionQuery {
    /// Creates an unfiltered query.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to sessions started at or after the given time.
    pub fn started_after(mut self, ts: Timestamp) -> Self {
        self.started_after = Some(ts);
        self
    }

    /// Restricts to sessions started at or before the given time.
    pub fn started_before(mut self, ts: Timestamp) -> Self {
        self.started_before = Some(ts);
        self
    }

    /// Restricts to sessions with the given status.
    pub fn with_status(mut self, status: SessionStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Caps the number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Filter for lead queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadQuery {
    /// Only leads captured at or after this time.
    pub captured_after: Option<Timestamp>,
    /// Only leads captured at or before this time.
    pub captured_before: Option<Timestamp>,
    /// Only leads with this follow-up status.
    pub status: Option<LeadStatus>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl LeadQuery {
    /// Creates an unfiltered query.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to leads captured at or after the given time.
    pub fn captured_after(mut self, ts: Timestamp) -> Self {
        self.captured_after = Some(ts);
        self
    }

    /// Restricts to leads captured at or before the given time.
    pub fn captured_before(mut self, ts: Timestamp) -> Self {
        self.captured_before = Some(ts);
        self
    }

    /// Restricts to leads with the given status.
    pub fn with_status(mut self, status: LeadStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Caps the number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Filter for escalation queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EscalationQuery {
    /// Only escalations with this resolution status.
    pub status: Option<EscalationStatus>,
    /// Maximum number of results.
    pub limit: Option<usize>,
}

impl EscalationQuery {
    /// Creates an unfiltered query.
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts to escalations with the given status.
    pub fn with_status(mut self, status: EscalationStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Caps the number of results.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Document store errors.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Store is unreachable or rejected the operation.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Record failed to serialize or deserialize.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Referenced record does not exist.
    #[error("{kind} not found: {id}")]
    NotFound {
        /// Record kind ("lead", "escalation", ...).
        kind: &'static str,
        /// Identifier that missed.
        id: String,
    },
}

impl StoreError {
    /// Creates an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable(message.into())
    }

    /// Creates a serialization error.
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }

    /// Creates a not-found error.
    pub fn not_found(kind: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_builders_compose() {
        let now = Timestamp::now();
        let query = SessionQuery::all()
            .started_after(now)
            .with_status(SessionStatus::Escalated)
            .with_limit(10);

        assert_eq!(query.started_after, Some(now));
        assert_eq!(query.status, Some(SessionStatus::Escalated));
        assert_eq!(query.limit, Some(10));
        assert!(query.started_before.is_none());
    }

    #[test]
    fn not_found_renders_kind_and_id() {
        let err = StoreError::not_found("lead", "abc-123");
        assert_eq!(err.to_string(), "lead not found: abc-123");
    }
}
