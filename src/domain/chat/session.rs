//! Chat session aggregate.
//!
//! A session is the per-visitor container for the message log and the
//! lead-capture / escalation flags. All mutation goes through the
//! orchestrator; the aggregate itself enforces the append-only log and the
//! terminal status rules.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{SessionId, Timestamp, ValidationError};

use super::message::Message;

/// Lifecycle status of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    /// Session is open and accepting turns.
    Active,
    /// Session ended without ever escalating.
    Completed,
    /// Session ended after the escalation flag was set.
    Escalated,
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SessionStatus::Active => "active",
            SessionStatus::Completed => "completed",
            SessionStatus::Escalated => "escalated",
        };
        write!(f, "{}", s)
    }
}

/// Opaque context captured from the embedding page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionMetadata {
    /// Browser user agent string.
    pub user_agent: Option<String>,
    /// Referrer of the page hosting the widget.
    pub referrer: Option<String>,
    /// Website the widget is embedded on.
    pub source_website: Option<String>,
}

impl SessionMetadata {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.user_agent.is_none() && self.referrer.is_none() && self.source_website.is_none()
    }
}

/// Chat session aggregate.
///
/// # Invariants
///
/// - `messages` is append-only: no message is ever edited or removed
/// - every appended message belongs to this session
/// - `status` is `Active` until ended, then `Escalated` if the escalation
///   flag was ever set, else `Completed`
/// - ending is idempotent: the first `end()` wins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatSession {
    /// Unique identifier for this session.
    id: SessionId,

    /// When the session was created.
    started_at: Timestamp,

    /// When the session ended, if it has.
    ended_at: Option<Timestamp>,

    /// Ordered, append-only message log.
    messages: Vec<Message>,

    /// Whether a lead was captured during this session.
    lead_captured: bool,

    /// Whether the session was ever escalated to a human.
    escalated: bool,

    /// Current lifecycle status.
    status: SessionStatus,

    /// Context captured from the embedding page.
    metadata: SessionMetadata,
}

impl ChatSession {
    /// Creates a new active session.
    pub fn new(id: SessionId) -> Self {
        Self {
            id,
            started_at: Timestamp::now(),
            ended_at: None,
            messages: Vec::new(),
            lead_captured: false,
            escalated: false,
            status: SessionStatus::Active,
            metadata: SessionMetadata::default(),
        }
    }

    /// Creates a new active session with page context attached.
    pub fn with_metadata(id: SessionId, metadata: SessionMetadata) -> Self {
        let mut session = Self::new(id);
        session.metadata = metadata;
        session
    }

    /// Reconstitutes a session from persistence (no validation).
    #[allow(clippy::too_many_arguments)]
    pub fn reconstitute(
        id: SessionId,
        started_at: Timestamp,
        ended_at: Option<Timestamp>,
        messages: Vec<Message>,
        lead_captured: bool,
        escalated: bool,
        status: SessionStatus,
        metadata: SessionMetadata,
    ) -> Self {
        Self {
            id,
            started_at,
            ended_at,
            messages,
            lead_captured,
            escalated,
            status,
            metadata,
        }
    }

    /// Appends a message to the log.
    ///
    /// Appending is allowed even after the session ended so an in-flight
    /// reply is never dropped from the record.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` if the message belongs to a different session
    pub fn append(&mut self, message: Message) -> Result<(), ValidationError> {
        if message.session_id() != &self.id {
            return Err(ValidationError::invalid_format(
                "session_id",
                format!(
                    "message belongs to session {}, not {}",
                    message.session_id(),
                    self.id
                ),
            ));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Marks that a lead was captured.
    pub fn mark_lead_captured(&mut self) {
        self.lead_captured = true;
    }

    /// Marks the session as escalated. Sticky for the session lifetime.
    pub fn mark_escalated(&mut self) {
        self.escalated = true;
    }

    /// Ends the session, fixing the terminal status.
    ///
    /// Returns true on the first call, false on any later call (the end
    /// time and status never change once set).
    pub fn end(&mut self) -> bool {
        if self.ended_at.is_some() {
            return false;
        }

        self.ended_at = Some(Timestamp::now());
        self.status = if self.escalated {
            SessionStatus::Escalated
        } else {
            SessionStatus::Completed
        };
        true
    }

    /// Returns the session ID.
    pub fn id(&self) -> &SessionId {
        &self.id
    }

    /// Returns when the session started.
    pub fn started_at(&self) -> &Timestamp {
        &self.started_at
    }

    /// Returns when the session ended, if it has.
    pub fn ended_at(&self) -> Option<&Timestamp> {
        self.ended_at.as_ref()
    }

    /// Returns the full message log, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the last `n` messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    /// Returns the number of messages in the log.
    pub fn message_count(&self) -> usize {
        self.messages.len()
    }

    /// Returns true if the log has any messages.
    pub fn has_messages(&self) -> bool {
        !self.messages.is_empty()
    }

    /// Returns whether a lead was captured.
    pub fn lead_captured(&self) -> bool {
        self.lead_captured
    }

    /// Returns whether the session was ever escalated.
    pub fn escalated(&self) -> bool {
        self.escalated
    }

    /// Returns the lifecycle status.
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    /// Returns the page context.
    pub fn metadata(&self) -> &SessionMetadata {
        &self.metadata
    }

    /// Returns true once the session has ended.
    pub fn is_ended(&self) -> bool {
        self.ended_at.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::chat::{Confidence, Intent};

    fn session_with_turn() -> ChatSession {
        let mut session = ChatSession::new(SessionId::new());
        let user = Message::user(*session.id(), "hi").unwrap();
        let bot = Message::bot(*session.id(), "hello!", Intent::General, Confidence::new(0.7)).unwrap();
        session.append(user).unwrap();
        session.append(bot).unwrap();
        session
    }

    #[test]
    fn new_session_is_active_and_empty() {
        let session = ChatSession::new(SessionId::new());
        assert_eq!(session.status(), SessionStatus::Active);
        assert!(!session.has_messages());
        assert!(!session.lead_captured());
        assert!(!session.escalated());
    }

    #[test]
    fn append_rejects_foreign_messages() {
        let mut session = ChatSession::new(SessionId::new());
        let foreign = Message::user(SessionId::new(), "hi").unwrap();
        assert!(session.append(foreign).is_err());
    }

    #[test]
    fn log_is_append_only_and_ordered() {
        let session = session_with_turn();
        assert_eq!(session.message_count(), 2);
        assert!(session.messages()[0].is_from_user());
        assert!(!session.messages()[1].is_from_user());
    }

    #[test]
    fn recent_messages_returns_tail() {
        let mut session = ChatSession::new(SessionId::new());
        for i in 0..8 {
            let msg = Message::user(*session.id(), format!("m{}", i)).unwrap();
            session.append(msg).unwrap();
        }

        let recent = session.recent_messages(5);
        assert_eq!(recent.len(), 5);
        assert_eq!(recent[0].content(), "m3");
        assert_eq!(recent[4].content(), "m7");
    }

    #[test]
    fn end_without_escalation_completes() {
        let mut session = session_with_turn();
        assert!(session.end());
        assert_eq!(session.status(), SessionStatus::Completed);
        assert!(session.ended_at().is_some());
    }

    #[test]
    fn end_after_escalation_keeps_escalated_status() {
        let mut session = session_with_turn();
        session.mark_escalated();
        session.end();
        assert_eq!(session.status(), SessionStatus::Escalated);
    }

    #[test]
    fn end_is_idempotent() {
        let mut session = session_with_turn();
        assert!(session.end());
        let first_end = *session.ended_at().unwrap();
        let first_status = session.status();

        assert!(!session.end());
        assert_eq!(session.ended_at(), Some(&first_end));
        assert_eq!(session.status(), first_status);
    }

    #[test]
    fn appending_after_end_is_allowed() {
        let mut session = session_with_turn();
        session.end();

        let late = Message::bot(*session.id(), "late reply", Intent::General, Confidence::new(0.2))
            .unwrap();
        assert!(session.append(late).is_ok());
        assert_eq!(session.message_count(), 3);
    }
}
