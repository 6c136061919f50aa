//! Escalation and lead-capture decision policies.
//!
//! Pure, total functions over (intent, confidence, session state). The
//! orchestrator evaluates them after every bot reply; they hold no state of
//! their own.

use super::confidence::Confidence;
use super::intent::Intent;

/// Confidence floor below which the bot offers a human instead.
pub const MIN_CONFIDENCE_THRESHOLD: f64 = 0.6;

/// Decides whether to surface the human-escalation affordance.
///
/// True when confidence is strictly below the minimum threshold, or whenever
/// the intent is `Unknown` regardless of confidence.
pub fn should_escalate(confidence: Confidence, intent: Intent) -> bool {
    if confidence.value() < MIN_CONFIDENCE_THRESHOLD {
        return true;
    }

    intent == Intent::Unknown
}

/// Decides whether to prompt the visitor for contact details.
///
/// True only when no lead has been captured yet, the intent signals buying
/// interest (booking or pricing), and confidence is strictly above the
/// minimum threshold. The prompt itself is scheduled with a short delay so
/// it never preempts the reply the visitor is reading.
pub fn should_prompt_lead(intent: Intent, confidence: Confidence, already_captured: bool) -> bool {
    !already_captured
        && intent.is_sales_signal()
        && confidence.value() > MIN_CONFIDENCE_THRESHOLD
}
