//! Mock ChatModel for testing.
//!
//! Configurable to return scripted replies, inject errors, and simulate
//! latency, with call tracking for assertions.
//!
//! # Example
//!
//! ```ignore
//! let model = MockChatModel::new()
//!     .with_reply("Hello, I'm the assistant!")
//!     .with_delay(Duration::from_millis(50));
//!
//! let reply = model.complete(request).await?;
//! assert_eq!(reply.text, "Hello, I'm the assistant!");
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use crate::ports::{ChatModel, ChatReply, ChatRequest, ModelError, ModelInfo};

/// Mock generation backend.
///
/// Scripted responses are consumed in order; once the script runs out the
/// most recently configured response repeats, so multi-turn tests need only
/// one `with_reply`.
#[derive(Debug, Clone)]
pub struct MockChatModel {
    script: Arc<Mutex<VecDeque<Result<String, ModelError>>>>,
    repeating: Arc<Mutex<Result<String, ModelError>>>,
    calls: Arc<Mutex<Vec<ChatRequest>>>,
    delay: Duration,
}

impl Default for MockChatModel {
    fn default() -> Self {
        Self::new()
    }
}

impl MockChatModel {
    /// Creates a mock that replies with a generic greeting.
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            repeating: Arc::new(Mutex::new(Ok("Hello! How can I help you today?".to_string()))),
            calls: Arc::new(Mutex::new(Vec::new())),
            delay: Duration::ZERO,
        }
    }

    /// Queues a successful reply; also becomes the repeating response.
    pub fn with_reply(self, text: impl Into<String>) -> Self {
        let text = text.into();
        self.script
            .lock()
            .expect("MockChatModel: script lock poisoned")
            .push_back(Ok(text.clone()));
        *self
            .repeating
            .lock()
            .expect("MockChatModel: repeating lock poisoned") = Ok(text);
        self
    }

    /// Queues an error; also becomes the repeating response.
    pub fn with_error(self, error: ModelError) -> Self {
        self.script
            .lock()
            .expect("MockChatModel: script lock poisoned")
            .push_back(Err(error.clone()));
        *self
            .repeating
            .lock()
            .expect("MockChatModel: repeating lock poisoned") = Err(error);
        self
    }

    /// Simulates latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Returns how many completions were requested.
    pub fn call_count(&self) -> usize {
        self.calls
            .lock()
            .expect("MockChatModel: calls lock poisoned")
            .len()
    }

    /// Returns the most recent request, if any.
    pub fn last_request(&self) -> Option<ChatRequest> {
        self.calls
            .lock()
            .expect("MockChatModel: calls lock poisoned")
            .last()
            .cloned()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn complete(&self, request: ChatRequest) -> Result<ChatReply, ModelError> {
        self.calls
            .lock()
            .expect("MockChatModel: calls lock poisoned")
            .push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        let next = self
            .script
            .lock()
            .expect("MockChatModel: script lock poisoned")
            .pop_front();

        let outcome = match next {
            Some(outcome) => outcome,
            None => self
                .repeating
                .lock()
                .expect("MockChatModel: repeating lock poisoned")
                .clone(),
        };

        outcome.map(|text| ChatReply::new(text, "mock-model"))
    }

    fn info(&self) -> ModelInfo {
        ModelInfo::new("mock", "mock-model")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> ChatRequest {
        ChatRequest::new("system", "user")
    }

    #[tokio::test]
    async fn scripted_replies_are_consumed_in_order_then_repeat() {
        let model = MockChatModel::new().with_reply("first").with_reply("second");

        assert_eq!(model.complete(request()).await.unwrap().text, "first");
        assert_eq!(model.complete(request()).await.unwrap().text, "second");
        assert_eq!(model.complete(request()).await.unwrap().text, "second");
    }

    #[tokio::test]
    async fn errors_repeat_once_scripted() {
        let model = MockChatModel::new().with_error(ModelError::unavailable("down"));

        assert!(model.complete(request()).await.is_err());
        assert!(model.complete(request()).await.is_err());
    }

    #[tokio::test]
    async fn calls_are_tracked() {
        let model = MockChatModel::new();
        assert_eq!(model.call_count(), 0);

        model.complete(request()).await.unwrap();
        assert_eq!(model.call_count(), 1);
        assert_eq!(model.last_request().unwrap().system_prompt, "system");
    }
}
