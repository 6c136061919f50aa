//! Per-session conversation orchestration.
//!
//! The orchestrator owns one session's state machine: it ingests user
//! utterances, classifies intent, requests a generated reply, scores it and
//! deterministically decides whether to show the reply, surface the
//! escalation affordance, or trigger lead capture. UI layers do not reach
//! into shared state; they call the mutation surface here and subscribe to
//! snapshot notifications.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::config::{BusinessProfile, WidgetConfig};
use crate::domain::chat::{
    classify, should_escalate, should_prompt_lead, ChatSession, Message, SessionMetadata,
    SessionStatus,
};
use crate::domain::foundation::{FieldErrors, SessionId, ValidationError};
use crate::domain::lead::{ContactDetails, Escalation, Lead, LeadForm};
use crate::ports::{ChatModel, ConversationStore, Notifier};

use super::effects::EffectDispatcher;
use super::generator::ResponseGenerator;

/// Bot message shown when the visitor asks for a human.
const ESCALATION_HANDOFF: &str = "I'll connect you with a human representative. \
     Please provide your contact information so we can reach out to you.";

/// Observable snapshot of the widget's state.
///
/// Published through a watch channel on every mutation; the UI re-renders
/// from the latest snapshot instead of importing shared state.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetState {
    /// The session this widget drives.
    pub session_id: SessionId,
    /// Full message log, oldest first.
    pub messages: Vec<Message>,
    /// Whether the chat window is open.
    pub is_open: bool,
    /// Whether the typing indicator is showing.
    pub is_typing: bool,
    /// Whether the escalation affordance has been offered. Sticky.
    pub escalation_offered: bool,
    /// Whether the lead-capture form is open.
    pub lead_form_open: bool,
    /// Whether a lead has been captured this session.
    pub lead_captured: bool,
    /// Whether the session has escalated.
    pub escalated: bool,
    /// Session lifecycle status.
    pub status: SessionStatus,
}

/// Errors rejecting a `send_message` turn.
#[derive(Debug, Clone, Error)]
pub enum TurnError {
    /// Message was empty after trimming.
    #[error("message cannot be empty")]
    EmptyMessage,

    /// Message exceeds the configured maximum length.
    #[error("message too long: {actual} characters exceeds the {max} limit")]
    MessageTooLong {
        /// Configured maximum.
        max: usize,
        /// Actual length.
        actual: usize,
    },

    /// Session already ended; no further turns are accepted.
    #[error("session has ended")]
    SessionEnded,

    /// Message failed domain validation.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
}

/// Errors rejecting a lead submission.
#[derive(Debug, Clone, Error)]
pub enum LeadCaptureError {
    /// Lead capture is switched off for this deployment.
    #[error("lead capture is disabled for this deployment")]
    Disabled,

    /// A lead was already captured for this session.
    #[error("a lead was already captured for this session")]
    AlreadyCaptured,

    /// The form failed field validation.
    #[error(transparent)]
    Invalid(#[from] FieldErrors),
}

/// Errors rejecting an escalation request.
#[derive(Debug, Clone, Error)]
pub enum EscalationError {
    /// Human escalation is switched off for this deployment.
    #[error("human escalation is disabled for this deployment")]
    Disabled,
}

/// Mutable per-session state, guarded by one async lock.
///
/// The lock is held across the whole turn, including the generation await,
/// so turns for one session never interleave: a second `send_message` queues
/// behind the first.
struct Inner {
    session: ChatSession,
    is_open: bool,
    is_typing: bool,
    escalation_offered: bool,
    lead_form_open: bool,
}

/// Per-session conversation state machine.
pub struct ConversationOrchestrator<M, S, N> {
    profile: Arc<BusinessProfile>,
    widget: WidgetConfig,
    generator: ResponseGenerator<M>,
    effects: EffectDispatcher<S, N>,
    session_id: SessionId,
    inner: Arc<Mutex<Inner>>,
    state_tx: watch::Sender<WidgetState>,
    lead_prompt: Mutex<Option<JoinHandle<()>>>,
}

impl<M, S, N> ConversationOrchestrator<M, S, N>
where
    M: ChatModel + 'static,
    S: ConversationStore + 'static,
    N: Notifier + 'static,
{
    /// Creates an orchestrator with a fresh session.
    pub fn new(
        profile: Arc<BusinessProfile>,
        widget: WidgetConfig,
        generator: ResponseGenerator<M>,
        store: Arc<S>,
        notifier: Arc<N>,
    ) -> Self {
        Self::with_session(
            SessionId::new(),
            SessionMetadata::default(),
            profile,
            widget,
            generator,
            store,
            notifier,
        )
    }

    /// Creates an orchestrator reusing an existing session identifier.
    ///
    /// The embedding layer persists the identifier locally so the session
    /// survives page reloads.
    pub fn with_session(
        session_id: SessionId,
        metadata: SessionMetadata,
        profile: Arc<BusinessProfile>,
        widget: WidgetConfig,
        generator: ResponseGenerator<M>,
        store: Arc<S>,
        notifier: Arc<N>,
    ) -> Self {
        let session = ChatSession::with_metadata(session_id, metadata);
        let inner = Inner {
            session,
            is_open: false,
            is_typing: false,
            escalation_offered: false,
            lead_form_open: false,
        };
        let (state_tx, _) = watch::channel(snapshot(&inner));

        Self {
            profile,
            widget,
            generator,
            effects: EffectDispatcher::new(store, notifier),
            session_id,
            inner: Arc::new(Mutex::new(inner)),
            state_tx,
            lead_prompt: Mutex::new(None),
        }
    }

    /// Returns the session identifier.
    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Subscribes to state snapshots.
    pub fn subscribe(&self) -> watch::Receiver<WidgetState> {
        self.state_tx.subscribe()
    }

    /// Returns the latest state snapshot.
    pub fn state(&self) -> WidgetState {
        self.state_tx.borrow().clone()
    }

    /// Returns the side-effect dispatcher (dead letters, flush).
    pub fn effects(&self) -> &EffectDispatcher<S, N> {
        &self.effects
    }

    /// Runs one conversation turn.
    ///
    /// Appends the user message, classifies intent, generates and appends a
    /// reply (real or fallback), then evaluates the escalation and lead
    /// policies. Turns for the same session are serialized; a concurrent
    /// call queues until this one finishes.
    ///
    /// # Errors
    ///
    /// Rejects empty or over-long input and turns after `end_session`.
    /// Generation failure is NOT an error: it produces the fallback reply.
    pub async fn send_message(&self, text: &str) -> Result<(), TurnError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(TurnError::EmptyMessage);
        }
        if trimmed.len() > self.widget.max_message_length {
            return Err(TurnError::MessageTooLong {
                max: self.widget.max_message_length,
                actual: trimmed.len(),
            });
        }

        let mut inner = self.inner.lock().await;
        if inner.session.is_ended() {
            return Err(TurnError::SessionEnded);
        }

        // History snapshot before this turn's messages: the new utterance is
        // rendered separately in the prompt.
        let history = inner
            .session
            .recent_messages(self.widget.history_window)
            .to_vec();

        let user_message = Message::user(self.session_id, trimmed)?;
        inner.session.append(user_message.clone())?;
        self.effects.persist_message(&user_message).await;

        inner.is_typing = true;
        self.publish(&inner);

        let detection = classify(trimmed);
        let reply = self
            .generator
            .generate(trimmed, &history, detection.intent)
            .await;

        let bot_message = Message::bot(
            self.session_id,
            reply.text,
            detection.intent,
            reply.confidence,
        )?;
        inner.session.append(bot_message.clone())?;
        self.effects.persist_message(&bot_message).await;

        inner.is_typing = false;

        if self.profile.features.human_escalation
            && should_escalate(reply.confidence, detection.intent)
        {
            inner.escalation_offered = true;
        }

        let prompt_lead = self.profile.features.lead_capture
            && should_prompt_lead(
                detection.intent,
                reply.confidence,
                inner.session.lead_captured(),
            );

        self.publish(&inner);
        drop(inner);

        if prompt_lead {
            self.schedule_lead_prompt().await;
        }

        Ok(())
    }

    /// Ends the session, fixing its terminal status and persisting the
    /// final snapshot (when at least one message exists).
    ///
    /// Idempotent: a second call changes nothing and does not re-persist.
    /// A turn in flight completes first; its reply stays in the log.
    pub async fn end_session(&self) {
        self.cancel_lead_prompt().await;

        let mut inner = self.inner.lock().await;
        if !inner.session.end() {
            return;
        }

        if inner.session.has_messages() {
            self.effects.persist_session(&inner.session).await;
        }
        self.publish(&inner);
    }

    /// Opens the chat window, greeting the visitor on first open.
    pub async fn open_chat(&self) {
        let mut inner = self.inner.lock().await;
        inner.is_open = true;

        // The greeting lands in the log once, before any turn; it reaches
        // the store with the final session snapshot.
        if !inner.session.has_messages() {
            match Message::bot_notice(self.session_id, self.profile.welcome_message()) {
                Ok(greeting) => {
                    // Session id matches by construction.
                    let _ = inner.session.append(greeting);
                }
                Err(error) => {
                    tracing::warn!(error = %error, "skipping invalid welcome message");
                }
            }
        }
        self.publish(&inner);
    }

    /// Closes the chat window and cancels a pending lead prompt.
    pub async fn close_chat(&self) {
        self.cancel_lead_prompt().await;

        let mut inner = self.inner.lock().await;
        inner.is_open = false;
        self.publish(&inner);
    }

    /// Toggles the chat window.
    pub async fn toggle_chat(&self) {
        let open = { self.inner.lock().await.is_open };
        if open {
            self.close_chat().await;
        } else {
            self.open_chat().await;
        }
    }

    /// Opens or closes the lead-capture form (UI toggle).
    pub async fn set_lead_form_open(&self, open: bool) {
        let mut inner = self.inner.lock().await;
        inner.lead_form_open = open;
        self.publish(&inner);
    }

    /// Captures a lead from a submitted contact form.
    ///
    /// Validation happens before any state changes; the caller gets
    /// field-level errors to render. On success the lead is persisted and
    /// the business alerted, both best-effort.
    ///
    /// # Errors
    ///
    /// - `Disabled` when the deployment switched lead capture off
    /// - `AlreadyCaptured` when this session already has a lead
    /// - `Invalid` with per-field messages when validation fails
    pub async fn submit_lead(&self, form: LeadForm) -> Result<Lead, LeadCaptureError> {
        if !self.profile.features.lead_capture {
            return Err(LeadCaptureError::Disabled);
        }

        let lead = Lead::from_form(self.session_id, form)?;

        {
            let mut inner = self.inner.lock().await;
            if inner.session.lead_captured() {
                return Err(LeadCaptureError::AlreadyCaptured);
            }
            inner.session.mark_lead_captured();
            inner.lead_form_open = false;

            let confirmation = format!(
                "Thank you, {}! We've received your information and will contact you soon at {}.",
                lead.name(),
                lead.email()
            );
            match Message::bot_notice(self.session_id, confirmation) {
                Ok(notice) => {
                    let _ = inner.session.append(notice);
                }
                Err(error) => {
                    tracing::warn!(error = %error, "skipping lead confirmation message");
                }
            }
            self.publish(&inner);
        }

        self.cancel_lead_prompt().await;

        self.effects.persist_lead(&lead).await;
        if self.profile.features.email_notifications {
            self.effects.notify_lead(&lead).await;
        }

        Ok(lead)
    }

    /// Hands the conversation to a human.
    ///
    /// Marks the session escalated (sticky), records an escalation carrying
    /// the transcript snapshot, appends a hand-off message, and opens the
    /// contact form when no lead exists yet. Record and alert are dispatched
    /// best-effort.
    ///
    /// # Errors
    ///
    /// - `Disabled` when the deployment switched human escalation off
    pub async fn request_escalation(
        &self,
        reason: impl Into<String>,
        contact: ContactDetails,
    ) -> Result<Escalation, EscalationError> {
        if !self.profile.features.human_escalation {
            return Err(EscalationError::Disabled);
        }

        let escalation = {
            let mut inner = self.inner.lock().await;
            inner.session.mark_escalated();
            inner.escalation_offered = true;

            let escalation = Escalation::new(
                self.session_id,
                inner.session.messages().to_vec(),
                reason,
            )
            .with_contact(contact);

            match Message::bot_notice(self.session_id, ESCALATION_HANDOFF) {
                Ok(notice) => {
                    let _ = inner.session.append(notice);
                }
                Err(error) => {
                    tracing::warn!(error = %error, "skipping escalation hand-off message");
                }
            }

            if self.profile.features.lead_capture && !inner.session.lead_captured() {
                inner.lead_form_open = true;
            }
            self.publish(&inner);
            escalation
        };

        self.effects.persist_escalation(&escalation).await;
        if self.profile.features.email_notifications {
            self.effects.notify_escalation(&escalation).await;
        }

        Ok(escalation)
    }

    /// Publishes a snapshot to subscribers.
    fn publish(&self, inner: &Inner) {
        self.state_tx.send_replace(snapshot(inner));
    }

    /// Schedules the delayed lead prompt.
    ///
    /// A scheduled, cancelable task rather than a blocking sleep: if the
    /// session ends or the chat closes before the delay elapses, the prompt
    /// is cancelled instead of mutating a torn-down session.
    async fn schedule_lead_prompt(&self) {
        let inner = Arc::clone(&self.inner);
        let state_tx = self.state_tx.clone();
        let delay = self.widget.lead_prompt_delay();

        let mut slot = self.lead_prompt.lock().await;
        if let Some(previous) = slot.take() {
            previous.abort();
        }
        *slot = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;

            let mut inner = inner.lock().await;
            if inner.session.is_ended() || inner.session.lead_captured() {
                return;
            }
            inner.lead_form_open = true;
            state_tx.send_replace(snapshot(&inner));
        }));
    }

    /// Cancels a pending lead prompt, if any.
    async fn cancel_lead_prompt(&self) {
        if let Some(handle) = self.lead_prompt.lock().await.take() {
            handle.abort();
        }
    }
}

fn snapshot(inner: &Inner) -> WidgetState {
    WidgetState {
        session_id: *inner.session.id(),
        messages: inner.session.messages().to_vec(),
        is_open: inner.is_open,
        is_typing: inner.is_typing,
        escalation_offered: inner.escalation_offered,
        lead_form_open: inner.lead_form_open,
        lead_captured: inner.session.lead_captured(),
        escalated: inner.session.escalated(),
        status: inner.session.status(),
    }
}
