//! Response generation on top of the ChatModel port.
//!
//! Builds the prompts from the business profile, recent history and the
//! detected intent, calls the backend once, and scores the reply. Backend
//! failures are absorbed here: the caller always gets a reply, real or
//! fallback, and never an error.

use std::sync::Arc;

use crate::config::BusinessProfile;
use crate::domain::chat::{Confidence, Intent, Message, Sender, MIN_CONFIDENCE_THRESHOLD};
use crate::ports::{ChatModel, ChatRequest};

/// Fixed reply used when the backend fails.
pub const FALLBACK_REPLY: &str = "I'm having trouble processing your request right now. \
     Would you like to speak with a human representative?";

/// Reply used when the backend succeeds but returns empty text.
const EMPTY_REPLY_APOLOGY: &str =
    "I apologize, but I encountered an issue. Please try again.";

/// Confidence attached to the fallback reply. Below the escalation
/// threshold, so a failed turn always surfaces the human affordance.
const FALLBACK_CONFIDENCE: f64 = 0.2;

/// Phrases that signal the model is unsure of its own answer.
const UNCERTAINTY_PHRASES: [&str; 4] = ["i don't know", "i'm not sure", "i cannot", "i can't"];

/// A generated reply with its confidence score.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedReply {
    /// Reply text to show the visitor.
    pub text: String,
    /// Heuristic confidence in the reply.
    pub confidence: Confidence,
    /// True when the backend failed and the fixed fallback was used.
    pub is_fallback: bool,
}

/// Builds prompts, calls the generation backend and scores replies.
pub struct ResponseGenerator<M> {
    model: Arc<M>,
    profile: Arc<BusinessProfile>,
    max_tokens: u32,
    temperature: f32,
}

impl<M: ChatModel> ResponseGenerator<M> {
    /// Creates a generator with the given token budget and temperature.
    pub fn new(model: Arc<M>, profile: Arc<BusinessProfile>, max_tokens: u32, temperature: f32) -> Self {
        Self {
            model,
            profile,
            max_tokens,
            temperature,
        }
    }

    /// Generates a reply for the user's utterance.
    ///
    /// A single backend attempt per turn keeps latency predictable; retry,
    /// if wanted, belongs to a policy layered above. Never fails: any
    /// backend error becomes the fixed fallback reply with confidence 0.2.
    pub async fn generate(
        &self,
        user_text: &str,
        history: &[Message],
        intent: Intent,
    ) -> GeneratedReply {
        let request = ChatRequest::new(
            self.system_prompt(intent),
            self.user_prompt(user_text, history),
        )
        .with_max_tokens(self.max_tokens)
        .with_temperature(self.temperature);

        match self.model.complete(request).await {
            Ok(reply) => {
                let text = if reply.text.trim().is_empty() {
                    EMPTY_REPLY_APOLOGY.to_string()
                } else {
                    reply.text
                };
                let confidence = self.score_reply(&text, intent);
                GeneratedReply {
                    text,
                    confidence,
                    is_fallback: false,
                }
            }
            Err(error) => {
                tracing::warn!(
                    error = %error,
                    retryable = error.is_retryable(),
                    backend = %self.model.info().provider,
                    "generation failed, using fallback reply"
                );
                GeneratedReply {
                    text: FALLBACK_REPLY.to_string(),
                    confidence: Confidence::new(FALLBACK_CONFIDENCE),
                    is_fallback: true,
                }
            }
        }
    }

    /// System instruction embedding the business context.
    fn system_prompt(&self, intent: Intent) -> String {
        format!(
            "You are a helpful AI assistant for {name}, a business in the {industry} industry.\n\n\
             {context}\n\n\
             Your role:\n\
             - Answer customer questions professionally and helpfully\n\
             - Provide accurate information about services, pricing, and business hours\n\
             - Be conversational and friendly\n\
             - If you don't know something, admit it and offer to connect them with a human representative\n\
             - Keep responses concise (2-3 sentences max)\n\
             - Never make up information not provided in the business context\n\n\
             Current conversation intent: {intent}",
            name = self.profile.business_name,
            industry = self.profile.industry,
            context = self.profile.context_block(),
            intent = intent,
        )
    }

    /// User prompt: rendered recent history plus the new utterance.
    fn user_prompt(&self, user_text: &str, history: &[Message]) -> String {
        if history.is_empty() {
            return format!("User's message: {}", user_text);
        }

        let rendered: Vec<String> = history
            .iter()
            .map(|msg| {
                let speaker = match msg.sender() {
                    Sender::User => "User",
                    Sender::Bot => "Assistant",
                };
                format!("{}: {}", speaker, msg.content())
            })
            .collect();

        format!(
            "Previous conversation:\n{}\n\nUser's current message: {}",
            rendered.join("\n"),
            user_text
        )
    }

    /// Scores a successful reply.
    ///
    /// Base 0.6, +0.1 for a reply between 20 and 300 characters, +0.1 when
    /// the business name is mentioned, -0.2 when the reply hedges, +0.15
    /// for factual intents. Clamped to [0.1, 0.95].
    fn score_reply(&self, reply: &str, intent: Intent) -> Confidence {
        let mut score = MIN_CONFIDENCE_THRESHOLD;
        let lowered = reply.to_lowercase();

        if reply.len() > 20 && reply.len() < 300 {
            score += 0.1;
        }

        if lowered.contains(&self.profile.business_name.to_lowercase()) {
            score += 0.1;
        }

        if UNCERTAINTY_PHRASES.iter().any(|p| lowered.contains(p)) {
            score -= 0.2;
        }

        if intent.is_factual() {
            score += 0.15;
        }

        Confidence::new(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockChatModel;
    use crate::domain::foundation::SessionId;
    use crate::ports::ModelError;

    fn generator(model: MockChatModel) -> ResponseGenerator<MockChatModel> {
        ResponseGenerator::new(
            Arc::new(model),
            Arc::new(BusinessProfile::demo()),
            200,
            0.7,
        )
    }

    #[tokio::test]
    async fn success_scores_reply_and_is_not_fallback() {
        let model = MockChatModel::new().with_reply("We open Mon-Sat from nine to seven.");
        let reply = generator(model).generate("when are you open?", &[], Intent::Hours).await;

        assert!(!reply.is_fallback);
        // 0.6 base + 0.1 length + 0.15 factual intent.
        assert!((reply.confidence.value() - 0.85).abs() < 1e-9);
    }

    #[tokio::test]
    async fn mentioning_the_business_name_raises_confidence() {
        let model = MockChatModel::new().with_reply("Lumen Dental Care opens at nine.");
        let reply = generator(model).generate("hours?", &[], Intent::Hours).await;

        // 0.6 + 0.1 length + 0.1 name + 0.15 factual = 0.95 (at the cap).
        assert!((reply.confidence.value() - 0.95).abs() < 1e-9);
    }

    #[tokio::test]
    async fn hedging_lowers_confidence() {
        let model = MockChatModel::new().with_reply("I'm not sure about that, sorry.");
        let reply = generator(model).generate("do you sell veneers?", &[], Intent::General).await;

        // 0.6 + 0.1 length - 0.2 uncertainty = 0.5.
        assert!((reply.confidence.value() - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn backend_error_yields_fallback_with_low_confidence() {
        let model = MockChatModel::new().with_error(ModelError::unavailable("503"));
        let reply = generator(model).generate("hello", &[], Intent::General).await;

        assert!(reply.is_fallback);
        assert_eq!(reply.text, FALLBACK_REPLY);
        assert!((reply.confidence.value() - 0.2).abs() < 1e-9);
    }

    #[tokio::test]
    async fn empty_backend_text_is_replaced_and_scored() {
        let model = MockChatModel::new().with_reply("   ");
        let reply = generator(model).generate("hello", &[], Intent::General).await;

        assert!(!reply.is_fallback);
        assert_eq!(reply.text, EMPTY_REPLY_APOLOGY);
    }

    #[tokio::test]
    async fn prompt_includes_history_and_business_facts() {
        let model = MockChatModel::new().with_reply("Sure!");
        let generator = generator(model);

        let session_id = SessionId::new();
        let history = vec![
            Message::user(session_id, "hi").unwrap(),
            Message::bot(session_id, "hello!", Intent::General, Confidence::new(0.7)).unwrap(),
        ];

        generator.generate("book me in", &history, Intent::Booking).await;

        let request = generator.model.last_request().unwrap();
        assert!(request.system_prompt.contains("Lumen Dental Care"));
        assert!(request.system_prompt.contains("Current conversation intent: booking"));
        assert!(request.user_prompt.contains("User: hi"));
        assert!(request.user_prompt.contains("Assistant: hello!"));
        assert!(request.user_prompt.contains("User's current message: book me in"));
        assert_eq!(request.max_tokens, 200);
    }

    #[tokio::test]
    async fn first_turn_prompt_has_no_history_block() {
        let model = MockChatModel::new().with_reply("Hi!");
        let generator = generator(model);

        generator.generate("hello", &[], Intent::General).await;

        let request = generator.model.last_request().unwrap();
        assert!(!request.user_prompt.contains("Previous conversation"));
        assert!(request.user_prompt.starts_with("User's message: hello"));
    }
}
