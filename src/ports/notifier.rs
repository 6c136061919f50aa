//! Notifier port - interface for outbound lead/escalation alerts.
//!
//! Notification is a fire-and-forget side effect after the record is already
//! saved: failures are logged and swallowed, never surfaced to the visitor
//! and never able to reverse the saved record.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::lead::{Escalation, Lead};

/// Port for outbound notification delivery.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Alerts the business that a lead was captured.
    async fn lead_captured(&self, lead: &Lead) -> Result<(), NotifyError>;

    /// Alerts the business that a conversation escalated.
    async fn escalation_raised(&self, escalation: &Escalation) -> Result<(), NotifyError>;
}

/// Notification delivery errors.
#[derive(Debug, Clone, Error)]
pub enum NotifyError {
    /// The delivery service rejected or failed the send.
    #[error("delivery failed: {0}")]
    Delivery(String),

    /// The notifier is misconfigured (bad key, missing recipient).
    #[error("notifier misconfigured: {0}")]
    Configuration(String),
}

impl NotifyError {
    /// Creates a delivery error.
    pub fn delivery(message: impl Into<String>) -> Self {
        Self::Delivery(message.into())
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }
}
