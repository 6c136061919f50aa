//! Chat domain: messages, sessions, intent detection and turn policies.

mod confidence;
mod intent;
mod message;
mod policy;
mod session;

pub use confidence::Confidence;
pub use intent::{classify, Detection, Intent};
pub use message::{Message, Sender};
pub use policy::{should_escalate, should_prompt_lead, MIN_CONFIDENCE_THRESHOLD};
pub use session::{ChatSession, SessionMetadata, SessionStatus};
