//! Dialogue states, the order slot-filling machine and non-order replies.

mod machine;
mod replies;

pub use machine::{OrderFlow, OrderStep};
pub use replies::{non_order_reply, NonOrderReply};

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Where a conversation stands between turns.
///
/// `HandoffRequested`, `AwaitingOrderReference` and `Ended` are terminal for
/// the automated flow; `Idle` is reachable from any FAQ turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DialogueState {
    Idle,
    CollectingOrderDetails,
    HandoffRequested,
    AwaitingOrderReference,
    Ended,
}

impl DialogueState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            DialogueState::HandoffRequested
                | DialogueState::AwaitingOrderReference
                | DialogueState::Ended
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_state_string_forms() {
        assert_eq!(
            DialogueState::CollectingOrderDetails.to_string(),
            "collecting_order_details"
        );
        assert_eq!(
            DialogueState::from_str("handoff_requested").unwrap(),
            DialogueState::HandoffRequested
        );
        assert_eq!(
            serde_json::to_string(&DialogueState::AwaitingOrderReference).unwrap(),
            "\"awaiting_order_reference\""
        );
        assert!(!DialogueState::Idle.is_terminal());
        assert!(DialogueState::Ended.is_terminal());
    }
}
