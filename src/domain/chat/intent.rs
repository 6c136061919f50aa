//! Intent taxonomy and keyword-based intent detection.
//!
//! Detection is deliberately simple and stateless: lower-cased substring
//! matching against a fixed keyword table. It is a pure function, trivially
//! unit-testable, and can be swapped for a stronger classifier later without
//! touching the orchestrator contract.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use super::confidence::Confidence;

/// Coarse category of what a visitor is asking about.
///
/// `General` is the fallback when no keyword matches. `Unknown` is reserved
/// for classifier failure and is never produced by keyword matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Questions about prices, fees, rates.
    Pricing,
    /// Questions about what the business offers.
    Services,
    /// Appointment or reservation requests.
    Booking,
    /// Requests for contact details or callbacks.
    Contact,
    /// Opening hours and availability.
    Hours,
    /// Generic how/what/why questions.
    Faq,
    /// Anything that matched no keyword.
    General,
    /// Classifier failure fallback.
    Unknown,
}

impl Intent {
    /// Returns true for intents answered from the business profile facts.
    pub fn is_factual(&self) -> bool {
        matches!(self, Intent::Pricing | Intent::Services | Intent::Hours)
    }

    /// Returns true for intents that signal buying interest.
    pub fn is_sales_signal(&self) -> bool {
        matches!(self, Intent::Booking | Intent::Pricing)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Intent::Pricing => "pricing",
            Intent::Services => "services",
            Intent::Booking => "booking",
            Intent::Contact => "contact",
            Intent::Hours => "hours",
            Intent::Faq => "faq",
            Intent::General => "general",
            Intent::Unknown => "unknown",
        };
        write!(f, "{}", s)
    }
}

/// Keyword table in classification order.
///
/// Order matters: when two intents tie on match count, the earlier entry
/// wins. The order is fixed as pricing, services, booking, contact, hours,
/// faq.
static INTENT_KEYWORDS: Lazy<[(Intent, &'static [&'static str]); 6]> = Lazy::new(|| {
    [
        (
            Intent::Pricing,
            &[
                "price", "cost", "pricing", "how much", "fee", "charge", "rate", "pkr", "rupees",
            ][..],
        ),
        (
            Intent::Services,
            &[
                "service",
                "offer",
                "provide",
                "do you have",
                "available",
                "what do you",
            ][..],
        ),
        (
            Intent::Booking,
            &["book", "appointment", "schedule", "meeting", "visit", "reserve"][..],
        ),
        (
            Intent::Contact,
            &["contact", "reach", "call", "email", "phone", "address", "location"][..],
        ),
        (
            Intent::Hours,
            &["hours", "open", "close", "timing", "when", "available time"][..],
        ),
        (
            Intent::Faq,
            &["how", "what", "why", "where", "who", "can you"][..],
        ),
    ]
});

/// Result of intent detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Detection {
    /// The detected intent.
    pub intent: Intent,
    /// Heuristic confidence in the detection.
    pub confidence: Confidence,
}

/// Detects the intent of a user utterance.
///
/// Counts, per intent, how many of its keywords appear as substrings of the
/// lower-cased input. The strictly greatest count wins; ties keep the intent
/// that comes first in the table. Zero matches fall back to `General`.
///
/// Confidence is 0.3 with zero matches, otherwise
/// `min(0.5 + 0.15 * matches, 0.95)`.
///
/// Deterministic and total: the same input always yields the same detection,
/// including empty input and input without alphabetic content.
pub fn classify(text: &str) -> Detection {
    let lowered = text.to_lowercase();

    let mut detected = Intent::General;
    let mut max_matches = 0usize;

    for (intent, keywords) in INTENT_KEYWORDS.iter() {
        let matches = keywords.iter().filter(|k| lowered.contains(*k)).count();
        if matches > max_matches {
            max_matches = matches;
            detected = *intent;
        }
    }

    let confidence = if max_matches == 0 {
        Confidence::new(0.3)
    } else {
        Confidence::new((0.5 + 0.15 * max_matches as f64).min(0.95))
    };

    Detection {
        intent: detected,
        confidence,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_keyword_detects_pricing() {
        let detection = classify("What are your prices?");
        assert_eq!(detection.intent, Intent::Pricing);
        assert!((detection.confidence.value() - 0.65).abs() < 1e-9);
    }

    #[test]
    fn empty_input_falls_back_to_general() {
        let detection = classify("");
        assert_eq!(detection.intent, Intent::General);
        assert!((detection.confidence.value() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn non_alphabetic_input_falls_back_to_general() {
        let detection = classify("12345 !!! ???");
        assert_eq!(detection.intent, Intent::General);
        assert!((detection.confidence.value() - 0.3).abs() < 1e-9);
    }

    #[test]
    fn multiple_matches_raise_confidence() {
        // "price" and "cost" both hit the pricing list.
        let detection = classify("what does it cost, any price list?");
        assert_eq!(detection.intent, Intent::Pricing);
        assert!((detection.confidence.value() - 0.8).abs() < 1e-9);
    }

    #[test]
    fn confidence_caps_at_095() {
        let detection = classify("price cost pricing fee charge rate");
        assert_eq!(detection.intent, Intent::Pricing);
        assert!((detection.confidence.value() - 0.95).abs() < 1e-9);
    }

    #[test]
    fn ties_favor_earlier_table_order() {
        // "book" (booking) and "call" (contact) match once each; booking is
        // listed first so it wins the tie.
        let detection = classify("book or call");
        assert_eq!(detection.intent, Intent::Booking);
    }

    #[test]
    fn keyword_matching_never_yields_unknown() {
        for text in ["hello there", "price", "asdfgh", ""] {
            assert_ne!(classify(text).intent, Intent::Unknown);
        }
    }

    #[test]
    fn case_is_ignored() {
        assert_eq!(classify("BOOK an APPOINTMENT").intent, Intent::Booking);
    }

    #[test]
    fn intent_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Intent::Pricing).unwrap(), "\"pricing\"");
        assert_eq!(serde_json::to_string(&Intent::Unknown).unwrap(), "\"unknown\"");
    }

    proptest! {
        #[test]
        fn classify_is_deterministic(text in ".{0,200}") {
            let first = classify(&text);
            let second = classify(&text);
            prop_assert_eq!(first.intent, second.intent);
            prop_assert_eq!(first.confidence, second.confidence);
        }

        #[test]
        fn classify_confidence_stays_in_bounds(text in ".{0,200}") {
            let detection = classify(&text);
            prop_assert!(detection.confidence.value() >= 0.1);
            prop_assert!(detection.confidence.value() <= 0.95);
        }
    }
}
