//! Application layer: response generation, side-effect dispatch and the
//! per-session orchestrator.

mod effects;
mod generator;
mod orchestrator;

pub use effects::{EffectDispatcher, EffectFailure};
pub use generator::{GeneratedReply, ResponseGenerator, FALLBACK_REPLY};
pub use orchestrator::{
    ConversationOrchestrator, EscalationError, LeadCaptureError, TurnError, WidgetState,
};
