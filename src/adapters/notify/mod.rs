//! Notification adapters.

mod email;
mod memory;

pub use email::EmailNotifier;
pub use memory::RecordingNotifier;
