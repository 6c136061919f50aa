//! Generation backend adapters.

mod mistral;
mod mock;

pub use mistral::{MistralConfig, MistralModel};
pub use mock::MockChatModel;
