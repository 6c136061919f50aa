//! Lead capture and human escalation domain.

mod escalation;
mod lead;

pub use escalation::{ContactDetails, Escalation, EscalationStatus};
pub use lead::{Lead, LeadForm, LeadStatus, MAX_LEAD_MESSAGE_LENGTH};
