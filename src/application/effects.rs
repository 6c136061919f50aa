//! Best-effort side-effect dispatch.
//!
//! Persistence and notification are fire-and-forget: they run off the turn's
//! critical path, and a failing store or mailer never blocks or aborts a
//! conversation. Failures are logged and recorded on a dead-letter log so
//! they stay observable (and assertable in tests) without ever being
//! synchronously blocking.

use std::sync::{Arc, Mutex};

use tokio::task::JoinSet;

use crate::domain::chat::{ChatSession, Message};
use crate::domain::foundation::Timestamp;
use crate::domain::lead::{Escalation, Lead};
use crate::ports::{ConversationStore, Notifier};

/// A side effect that failed, kept for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectFailure {
    /// Which effect failed ("save_message", "notify_lead", ...).
    pub effect: &'static str,
    /// The rendered error.
    pub error: String,
    /// When the failure was recorded.
    pub at: Timestamp,
}

/// Dispatches store and notifier calls as supervised background tasks.
pub struct EffectDispatcher<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    dead_letters: Arc<Mutex<Vec<EffectFailure>>>,
    tasks: tokio::sync::Mutex<JoinSet<()>>,
}

impl<S, N> EffectDispatcher<S, N>
where
    S: ConversationStore + 'static,
    N: Notifier + 'static,
{
    /// Creates a dispatcher over the given collaborators.
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self {
            store,
            notifier,
            dead_letters: Arc::new(Mutex::new(Vec::new())),
            tasks: tokio::sync::Mutex::new(JoinSet::new()),
        }
    }

    /// Persists a message off the critical path.
    pub async fn persist_message(&self, message: &Message) {
        let store = Arc::clone(&self.store);
        let message = message.clone();
        self.dispatch("save_message", async move {
            store.save_message(&message).await.map_err(|e| e.to_string())
        })
        .await;
    }

    /// Persists a session snapshot off the critical path.
    pub async fn persist_session(&self, session: &ChatSession) {
        let store = Arc::clone(&self.store);
        let session = session.clone();
        self.dispatch("save_session", async move {
            store.save_session(&session).await.map_err(|e| e.to_string())
        })
        .await;
    }

    /// Persists a captured lead off the critical path.
    pub async fn persist_lead(&self, lead: &Lead) {
        let store = Arc::clone(&self.store);
        let lead = lead.clone();
        self.dispatch("save_lead", async move {
            store.save_lead(&lead).await.map_err(|e| e.to_string())
        })
        .await;
    }

    /// Persists an escalation request off the critical path.
    pub async fn persist_escalation(&self, escalation: &Escalation) {
        let store = Arc::clone(&self.store);
        let escalation = escalation.clone();
        self.dispatch("save_escalation", async move {
            store
                .save_escalation(&escalation)
                .await
                .map_err(|e| e.to_string())
        })
        .await;
    }

    /// Sends a lead alert off the critical path.
    pub async fn notify_lead(&self, lead: &Lead) {
        let notifier = Arc::clone(&self.notifier);
        let lead = lead.clone();
        self.dispatch("notify_lead", async move {
            notifier.lead_captured(&lead).await.map_err(|e| e.to_string())
        })
        .await;
    }

    /// Sends an escalation alert off the critical path.
    pub async fn notify_escalation(&self, escalation: &Escalation) {
        let notifier = Arc::clone(&self.notifier);
        let escalation = escalation.clone();
        self.dispatch("notify_escalation", async move {
            notifier
                .escalation_raised(&escalation)
                .await
                .map_err(|e| e.to_string())
        })
        .await;
    }

    /// Awaits every outstanding effect. Tests call this to make the
    /// fire-and-forget pipeline deterministic.
    pub async fn flush(&self) {
        let mut tasks = self.tasks.lock().await;
        while tasks.join_next().await.is_some() {}
    }

    /// Returns the recorded failures, oldest first.
    pub fn failures(&self) -> Vec<EffectFailure> {
        self.dead_letters
            .lock()
            .expect("EffectDispatcher: dead-letter lock poisoned")
            .clone()
    }

    /// Returns how many effects have failed so far.
    pub fn failure_count(&self) -> usize {
        self.dead_letters
            .lock()
            .expect("EffectDispatcher: dead-letter lock poisoned")
            .len()
    }

    async fn dispatch<F>(&self, effect: &'static str, fut: F)
    where
        F: std::future::Future<Output = Result<(), String>> + Send + 'static,
    {
        let dead_letters = Arc::clone(&self.dead_letters);
        let mut tasks = self.tasks.lock().await;
        // Reap finished effects so the set stays bounded over long sessions.
        while tasks.try_join_next().is_some() {}
        tasks.spawn(async move {
            if let Err(error) = fut.await {
                tracing::warn!(effect, error = %error, "side effect failed");
                let mut letters = dead_letters
                    .lock()
                    .expect("EffectDispatcher: dead-letter lock poisoned");
                letters.push(EffectFailure {
                    effect,
                    error,
                    at: Timestamp::now(),
                });
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::notify::RecordingNotifier;
    use crate::adapters::store::InMemoryStore;
    use crate::domain::foundation::SessionId;

    fn dispatcher(
        store: Arc<InMemoryStore>,
        notifier: Arc<RecordingNotifier>,
    ) -> EffectDispatcher<InMemoryStore, RecordingNotifier> {
        EffectDispatcher::new(store, notifier)
    }

    #[tokio::test]
    async fn successful_effects_leave_no_dead_letters() {
        let store = Arc::new(InMemoryStore::new());
        let dispatcher = dispatcher(Arc::clone(&store), Arc::new(RecordingNotifier::new()));

        let message = Message::user(SessionId::new(), "hi").unwrap();
        dispatcher.persist_message(&message).await;
        dispatcher.flush().await;

        assert_eq!(dispatcher.failure_count(), 0);
        assert_eq!(store.message_count(), 1);
    }

    #[tokio::test]
    async fn store_failure_is_recorded_not_raised() {
        let store = Arc::new(InMemoryStore::new());
        store.fail_writes(true);
        let dispatcher = dispatcher(Arc::clone(&store), Arc::new(RecordingNotifier::new()));

        let message = Message::user(SessionId::new(), "hi").unwrap();
        dispatcher.persist_message(&message).await;
        dispatcher.flush().await;

        let failures = dispatcher.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].effect, "save_message");
        assert_eq!(store.message_count(), 0);
    }

    #[tokio::test]
    async fn notifier_failure_is_recorded_not_raised() {
        let notifier = Arc::new(RecordingNotifier::new());
        notifier.fail_sends(true);
        let dispatcher = dispatcher(Arc::new(InMemoryStore::new()), Arc::clone(&notifier));

        let session_id = SessionId::new();
        let escalation = Escalation::new(session_id, Vec::new(), "low confidence");
        dispatcher.notify_escalation(&escalation).await;
        dispatcher.flush().await;

        assert_eq!(dispatcher.failure_count(), 1);
        assert_eq!(dispatcher.failures()[0].effect, "notify_escalation");
    }
}
