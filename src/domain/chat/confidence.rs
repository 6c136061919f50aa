//! Confidence score value object.

use serde::{Deserialize, Serialize};

/// Heuristic trust in the most recent bot reply.
///
/// Not a probability: a composite of keyword-match counts and reply-quality
/// heuristics, always clamped to `[0.1, 0.95]`. Policies compare it against
/// fixed thresholds to decide on escalation and lead capture.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Confidence(f64);

impl Confidence {
    /// Lower clamp bound.
    pub const MIN: f64 = 0.1;
    /// Upper clamp bound.
    pub const MAX: f64 = 0.95;

    /// Creates a confidence score, clamping into `[0.1, 0.95]`.
    pub fn new(raw: f64) -> Self {
        Self(raw.clamp(Self::MIN, Self::MAX))
    }

    /// Returns the score as a float.
    pub fn value(&self) -> f64 {
        self.0
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}
