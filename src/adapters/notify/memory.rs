//! Recording notifier for testing.
//!
//! Captures every alert instead of delivering it, with failure injection
//! for resilience tests.
//!
//! # Panics
//!
//! Methods panic if internal locks are poisoned. Acceptable for test code;
//! production deployments use the email notifier.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::domain::lead::{Escalation, Lead};
use crate::ports::{Notifier, NotifyError};

/// In-memory implementation of the Notifier port.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    leads: RwLock<Vec<Lead>>,
    escalations: RwLock<Vec<Escalation>>,
    fail_sends: AtomicBool,
}

impl RecordingNotifier {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent send fail (for resilience tests).
    pub fn fail_sends(&self, fail: bool) {
        self.fail_sends.store(fail, Ordering::SeqCst);
    }

    /// Returns the lead alerts sent so far.
    pub fn lead_alerts(&self) -> Vec<Lead> {
        self.leads
            .read()
            .expect("RecordingNotifier: leads lock poisoned")
            .clone()
    }

    /// Returns the escalation alerts sent so far.
    pub fn escalation_alerts(&self) -> Vec<Escalation> {
        self.escalations
            .read()
            .expect("RecordingNotifier: escalations lock poisoned")
            .clone()
    }

    /// Returns the total number of alerts sent.
    pub fn alert_count(&self) -> usize {
        self.lead_alerts().len() + self.escalation_alerts().len()
    }

    fn check_sendable(&self) -> Result<(), NotifyError> {
        if self.fail_sends.load(Ordering::SeqCst) {
            return Err(NotifyError::delivery("injected send failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn lead_captured(&self, lead: &Lead) -> Result<(), NotifyError> {
        self.check_sendable()?;
        self.leads
            .write()
            .expect("RecordingNotifier: leads lock poisoned")
            .push(lead.clone());
        Ok(())
    }

    async fn escalation_raised(&self, escalation: &Escalation) -> Result<(), NotifyError> {
        self.check_sendable()?;
        self.escalations
            .write()
            .expect("RecordingNotifier: escalations lock poisoned")
            .push(escalation.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::domain::lead::LeadForm;

    #[tokio::test]
    async fn records_alerts_until_failure_injected() {
        let notifier = RecordingNotifier::new();
        let lead = Lead::from_form(
            SessionId::new(),
            LeadForm {
                name: "Ada Lovelace".to_string(),
                email: "ada@example.com".to_string(),
                phone: "03012345678".to_string(),
                ..LeadForm::default()
            },
        )
        .unwrap();

        notifier.lead_captured(&lead).await.unwrap();
        assert_eq!(notifier.alert_count(), 1);

        notifier.fail_sends(true);
        assert!(notifier.lead_captured(&lead).await.is_err());
        assert_eq!(notifier.alert_count(), 1);
    }
}
