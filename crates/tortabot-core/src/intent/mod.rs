//! Intent model and the deterministic keyword classifier.

mod classifier;

pub use classifier::classify;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// What the customer is trying to do in one utterance.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
    EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IntentId {
    Greeting,
    Smalltalk,
    OrderStart,
    OrderStatus,
    FaqHours,
    FaqMenu,
    HandoffHuman,
    Goodbye,
    Fallback,
}

/// A classified intent with its confidence and the rule that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentMatch {
    pub id: IntentId,
    /// In `[0, 1]`.
    pub confidence: f32,
    pub reason: String,
}

impl IntentMatch {
    pub fn new(id: IntentId, confidence: f32, reason: impl Into<String>) -> Self {
        Self {
            id,
            confidence: confidence.clamp(0.0, 1.0),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn test_intent_ids_round_trip_through_strings() {
        for id in IntentId::iter() {
            let s = id.to_string();
            assert_eq!(IntentId::from_str(&s).unwrap(), id);
            assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{s}\""));
        }
        assert_eq!(IntentId::OrderStart.as_ref(), "order_start");
        assert!(IntentId::from_str("order_cancel").is_err());
    }

    #[test]
    fn test_confidence_is_clamped() {
        assert_eq!(IntentMatch::new(IntentId::Greeting, 1.7, "x").confidence, 1.0);
        assert_eq!(IntentMatch::new(IntentId::Greeting, -0.2, "x").confidence, 0.0);
    }
}
