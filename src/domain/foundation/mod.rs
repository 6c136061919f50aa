//! Foundation value objects shared across the domain.
//!
//! Strongly-typed identifiers, UTC timestamps and validation errors. These
//! carry no behavior beyond construction and comparison; all business rules
//! live in the chat and lead modules.

mod errors;
mod ids;
mod timestamp;

pub use errors::{FieldErrors, ValidationError};
pub use ids::{EscalationId, LeadId, MessageId, SessionId};
pub use timestamp::Timestamp;
