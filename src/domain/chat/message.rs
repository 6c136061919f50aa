//! Message entity for chat sessions.
//!
//! Messages are immutable once created and only ever appended to a session
//! log. Intent and confidence are set only on bot messages produced by the
//! orchestrator.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MessageId, SessionId, Timestamp, ValidationError};

use super::confidence::Confidence;
use super::intent::Intent;

/// Who sent a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The visitor typing into the widget.
    User,
    /// The assistant.
    Bot,
}

/// An immutable message within a chat session.
///
/// # Invariants
///
/// - `id` is globally unique
/// - `content` is non-empty (validated at construction)
/// - `timestamp` is set at construction and never changes
/// - `intent`/`confidence` are present only on bot messages
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier for this message.
    id: MessageId,

    /// Session this message belongs to.
    session_id: SessionId,

    /// The message text.
    content: String,

    /// Who sent it.
    sender: Sender,

    /// When the message was appended.
    timestamp: Timestamp,

    /// Detected intent (bot messages only).
    intent: Option<Intent>,

    /// Reply confidence (bot messages only).
    confidence: Option<Confidence>,
}

impl Message {
    /// Creates a user message.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if content is empty after trimming
    pub fn user(session_id: SessionId, content: impl Into<String>) -> Result<Self, ValidationError> {
        let content = content.into();
        Self::validate_content(&content)?;

        Ok(Self {
            id: MessageId::new(),
            session_id,
            content,
            sender: Sender::User,
            timestamp: Timestamp::now(),
            intent: None,
            confidence: None,
        })
    }

    /// Creates a bot message carrying the detected intent and reply
    /// confidence.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if content is empty after trimming
    pub fn bot(
        session_id: SessionId,
        content: impl Into<String>,
        intent: Intent,
        confidence: Confidence,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        Self::validate_content(&content)?;

        Ok(Self {
            id: MessageId::new(),
            session_id,
            content,
            sender: Sender::Bot,
            timestamp: Timestamp::now(),
            intent: Some(intent),
            confidence: Some(confidence),
        })
    }

    /// Creates a bot message without intent or confidence.
    ///
    /// Used for greetings, confirmations and hand-off notices the
    /// orchestrator writes directly, as opposed to generated replies.
    ///
    /// # Errors
    ///
    /// - `EmptyField` if content is empty after trimming
    pub fn bot_notice(
        session_id: SessionId,
        content: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let content = content.into();
        Self::validate_content(&content)?;

        Ok(Self {
            id: MessageId::new(),
            session_id,
            content,
            sender: Sender::Bot,
            timestamp: Timestamp::now(),
            intent: None,
            confidence: None,
        })
    }

    /// Reconstitutes a message from persistence (no validation).
    pub fn reconstitute(
        id: MessageId,
        session_id: SessionId,
        content: String,
        sender: Sender,
        timestamp: Timestamp,
        intent: Option<Intent>,
        confidence: Option<Confidence>,
    ) -> Self {
        Self {
            id,
            session_id,
            content,
            sender,
            timestamp,
            intent,
            confidence,
        }
    }

    fn validate_content(content: &str) -> Result<(), ValidationError> {
        if content.trim().is_empty() {
            return Err(ValidationError::empty_field("content"));
        }
        Ok(())
    }

    /// Returns the message ID.
    pub fn id(&self) -> &MessageId {
        &self.id
    }

    /// Returns the owning session ID.
    pub fn session_id(&self) -> &SessionId {
        &self.session_id
    }

    /// Returns the message text.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Returns who sent the message.
    pub fn sender(&self) -> Sender {
        self.sender
    }

    /// Returns when the message was appended.
    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    /// Returns the detected intent, if this is a bot message.
    pub fn intent(&self) -> Option<Intent> {
        self.intent
    }

    /// Returns the reply confidence, if this is a bot message.
    pub fn confidence(&self) -> Option<Confidence> {
        self.confidence
    }

    /// Returns true if the visitor sent this message.
    pub fn is_from_user(&self) -> bool {
        self.sender == Sender::User
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_has_no_intent_or_confidence() {
        let msg = Message::user(SessionId::new(), "hello").unwrap();
        assert_eq!(msg.sender(), Sender::User);
        assert!(msg.intent().is_none());
        assert!(msg.confidence().is_none());
    }

    #[test]
    fn bot_message_carries_intent_and_confidence() {
        let msg = Message::bot(
            SessionId::new(),
            "We open at nine.",
            Intent::Hours,
            Confidence::new(0.8),
        )
        .unwrap();

        assert_eq!(msg.sender(), Sender::Bot);
        assert_eq!(msg.intent(), Some(Intent::Hours));
        assert_eq!(msg.confidence(), Some(Confidence::new(0.8)));
    }

    #[test]
    fn empty_content_is_rejected() {
        assert!(Message::user(SessionId::new(), "").is_err());
        assert!(Message::user(SessionId::new(), "   ").is_err());
    }

    #[test]
    fn sender_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Sender::User).unwrap(), "\"user\"");
        assert_eq!(serde_json::to_string(&Sender::Bot).unwrap(), "\"bot\"");
    }
}
