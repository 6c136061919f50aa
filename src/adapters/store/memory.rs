//! In-memory document store.
//!
//! Backs tests and local demos with deterministic, synchronous storage.
//! Supports write-failure injection for resilience tests.
//!
//! # Panics
//!
//! Methods panic if internal locks are poisoned. Acceptable for test code;
//! production deployments use a real document-store adapter.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::domain::chat::{ChatSession, Message};
use crate::domain::foundation::{EscalationId, LeadId};
use crate::domain::lead::{Escalation, EscalationStatus, Lead, LeadStatus};
use crate::ports::{
    ConversationStore, EscalationQuery, LeadQuery, SessionQuery, StoreError,
};

/// In-memory implementation of the ConversationStore port.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    sessions: RwLock<Vec<ChatSession>>,
    messages: RwLock<Vec<Message>>,
    leads: RwLock<Vec<Lead>>,
    escalations: RwLock<Vec<Escalation>>,
    fail_writes: AtomicBool,
}

impl InMemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent write fail (for resilience tests).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns the number of stored messages.
    pub fn message_count(&self) -> usize {
        self.messages
            .read()
            .expect("InMemoryStore: messages lock poisoned")
            .len()
    }

    /// Returns the number of stored session snapshots.
    pub fn session_count(&self) -> usize {
        self.sessions
            .read()
            .expect("InMemoryStore: sessions lock poisoned")
            .len()
    }

    /// Returns the number of stored leads.
    pub fn lead_count(&self) -> usize {
        self.leads
            .read()
            .expect("InMemoryStore: leads lock poisoned")
            .len()
    }

    /// Returns the number of stored escalations.
    pub fn escalation_count(&self) -> usize {
        self.escalations
            .read()
            .expect("InMemoryStore: escalations lock poisoned")
            .len()
    }

    fn check_writable(&self) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::unavailable("injected write failure"));
        }
        Ok(())
    }
}

#[async_trait]
impl ConversationStore for InMemoryStore {
    async fn save_session(&self, session: &ChatSession) -> Result<(), StoreError> {
        self.check_writable()?;

        let mut sessions = self
            .sessions
            .write()
            .expect("InMemoryStore: sessions lock poisoned");
        match sessions.iter_mut().find(|s| s.id() == session.id()) {
            Some(existing) => *existing = session.clone(),
            None => sessions.push(session.clone()),
        }
        Ok(())
    }

    async fn save_message(&self, message: &Message) -> Result<(), StoreError> {
        self.check_writable()?;

        self.messages
            .write()
            .expect("InMemoryStore: messages lock poisoned")
            .push(message.clone());
        Ok(())
    }

    async fn save_lead(&self, lead: &Lead) -> Result<(), StoreError> {
        self.check_writable()?;

        self.leads
            .write()
            .expect("InMemoryStore: leads lock poisoned")
            .push(lead.clone());
        Ok(())
    }

    async fn save_escalation(&self, escalation: &Escalation) -> Result<(), StoreError> {
        self.check_writable()?;

        self.escalations
            .write()
            .expect("InMemoryStore: escalations lock poisoned")
            .push(escalation.clone());
        Ok(())
    }

    async fn sessions(&self, query: SessionQuery) -> Result<Vec<ChatSession>, StoreError> {
        let sessions = self
            .sessions
            .read()
            .expect("InMemoryStore: sessions lock poisoned");

        let mut matching: Vec<ChatSession> = sessions
            .iter()
            .filter(|s| query.started_after.map_or(true, |t| !s.started_at().is_before(&t)))
            .filter(|s| query.started_before.map_or(true, |t| !s.started_at().is_after(&t)))
            .filter(|s| query.status.map_or(true, |status| s.status() == status))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.started_at().cmp(a.started_at()));
        if let Some(limit) = query.limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    async fn leads(&self, query: LeadQuery) -> Result<Vec<Lead>, StoreError> {
        let leads = self
            .leads
            .read()
            .expect("InMemoryStore: leads lock poisoned");

        let mut matching: Vec<Lead> = leads
            .iter()
            .filter(|l| query.captured_after.map_or(true, |t| !l.captured_at().is_before(&t)))
            .filter(|l| query.captured_before.map_or(true, |t| !l.captured_at().is_after(&t)))
            .filter(|l| query.status.map_or(true, |status| l.status() == status))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.captured_at().cmp(a.captured_at()));
        if let Some(limit) = query.limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    async fn escalations(&self, query: EscalationQuery) -> Result<Vec<Escalation>, StoreError> {
        let escalations = self
            .escalations
            .read()
            .expect("InMemoryStore: escalations lock poisoned");

        let mut matching: Vec<Escalation> = escalations
            .iter()
            .filter(|e| query.status.map_or(true, |status| e.status() == status))
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at().cmp(a.created_at()));
        if let Some(limit) = query.limit {
            matching.truncate(limit);
        }
        Ok(matching)
    }

    async fn update_lead_status(&self, id: &LeadId, status: LeadStatus) -> Result<(), StoreError> {
        self.check_writable()?;

        let mut leads = self
            .leads
            .write()
            .expect("InMemoryStore: leads lock poisoned");
        let lead = leads
            .iter_mut()
            .find(|l| l.id() == id)
            .ok_or_else(|| StoreError::not_found("lead", id))?;
        lead.set_status(status);
        Ok(())
    }

    async fn update_escalation_status(
        &self,
        id: &EscalationId,
        status: EscalationStatus,
        resolved_by: Option<&str>,
    ) -> Result<(), StoreError> {
        self.check_writable()?;

        let mut escalations = self
            .escalations
            .write()
            .expect("InMemoryStore: escalations lock poisoned");
        let escalation = escalations
            .iter_mut()
            .find(|e| e.id() == id)
            .ok_or_else(|| StoreError::not_found("escalation", id))?;

        // Pending -> Resolved stamps time and resolver; resolution is never
        // undone.
        if status == EscalationStatus::Resolved {
            escalation.resolve(resolved_by.map(str::to_string));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::SessionId;
    use crate::domain::lead::LeadForm;

    fn lead(name: &str) -> Lead {
        Lead::from_form(
            SessionId::new(),
            LeadForm {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                phone: "03012345678".to_string(),
                ..LeadForm::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn save_session_replaces_by_id() {
        let store = InMemoryStore::new();
        let mut session = ChatSession::new(SessionId::new());

        store.save_session(&session).await.unwrap();
        session.mark_escalated();
        store.save_session(&session).await.unwrap();

        assert_eq!(store.session_count(), 1);
        let fetched = store.sessions(SessionQuery::all()).await.unwrap();
        assert!(fetched[0].escalated());
    }

    #[tokio::test]
    async fn lead_queries_filter_by_status_and_limit() {
        let store = InMemoryStore::new();
        for name in ["Ada", "Grace", "Edsger"] {
            store.save_lead(&lead(name)).await.unwrap();
        }

        let first = store.leads(LeadQuery::all()).await.unwrap();
        store
            .update_lead_status(first[0].id(), LeadStatus::Contacted)
            .await
            .unwrap();

        let contacted = store
            .leads(LeadQuery::all().with_status(LeadStatus::Contacted))
            .await
            .unwrap();
        assert_eq!(contacted.len(), 1);

        let limited = store.leads(LeadQuery::all().with_limit(2)).await.unwrap();
        assert_eq!(limited.len(), 2);
    }

    #[tokio::test]
    async fn escalation_resolution_stamps_resolver() {
        let store = InMemoryStore::new();
        let escalation = Escalation::new(SessionId::new(), Vec::new(), "user asked");
        store.save_escalation(&escalation).await.unwrap();

        store
            .update_escalation_status(escalation.id(), EscalationStatus::Resolved, Some("admin"))
            .await
            .unwrap();

        let resolved = store
            .escalations(EscalationQuery::all().with_status(EscalationStatus::Resolved))
            .await
            .unwrap();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].resolved_by(), Some("admin"));
        assert!(resolved[0].resolved_at().is_some());
    }

    #[tokio::test]
    async fn updating_a_missing_lead_is_not_found() {
        let store = InMemoryStore::new();
        let err = store
            .update_lead_status(&LeadId::new(), LeadStatus::Lost)
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { kind: "lead", .. }));
    }

    #[tokio::test]
    async fn injected_failures_reject_writes_but_not_reads() {
        let store = InMemoryStore::new();
        let message = Message::user(SessionId::new(), "hi").unwrap();
        store.save_message(&message).await.unwrap();

        store.fail_writes(true);
        assert!(store.save_message(&message).await.is_err());
        assert!(store.sessions(SessionQuery::all()).await.is_ok());

        store.fail_writes(false);
        assert!(store.save_message(&message).await.is_ok());
    }
}
