use chrono::{DateTime, Duration, Utc};

use super::repository::ConversationRecord;

/// Decides when a conversation's ephemeral state is discarded.
///
/// Two triggers exist: inactivity longer than the timeout (checked before a
/// turn is processed) and a response carrying `clear_memory` (applied after).
/// In both cases the state machine restarts and administrative metadata and
/// history survive.
#[derive(Debug, Clone, Copy)]
pub struct SessionMemoryController {
    timeout: Duration,
}

impl SessionMemoryController {
    pub fn new(timeout_secs: u64) -> Self {
        Self {
            timeout: Duration::seconds(
                i64::try_from(timeout_secs)
                    .unwrap_or(i64::MAX)
                    .min(i64::MAX / 1000),
            ),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn is_expired(&self, last_activity: DateTime<Utc>, now: DateTime<Utc>) -> bool {
        now - last_activity > self.timeout
    }

    /// Resets `record` when it has been idle too long. Returns whether it did.
    pub fn expire_if_idle(&self, record: &mut ConversationRecord, now: DateTime<Utc>) -> bool {
        if !self.is_expired(record.last_activity, now) {
            return false;
        }
        tracing::info!(
            conversation_id = %record.id,
            idle_secs = (now - record.last_activity).num_seconds(),
            "Session expired, dropping order draft"
        );
        Self::clear(record);
        true
    }

    /// Drops the draft and oracle state and restarts the dialogue.
    pub fn clear(record: &mut ConversationRecord) {
        record.metadata.clear_ephemeral();
        record.state = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::{Channel, HistoryItem};
    use crate::dialogue::DialogueState;
    use crate::order::OrderDraft;

    fn record(last_activity: DateTime<Utc>) -> ConversationRecord {
        let mut record = ConversationRecord::new("c1", Channel::Whatsapp, last_activity);
        record.state = Some(DialogueState::CollectingOrderDetails);
        record.metadata.order_draft = OrderDraft {
            headcount: Some(10),
            ..Default::default()
        };
        record.metadata.oracle_reply = Some("¡Perfecto!".into());
        record.metadata.history.push(HistoryItem::user("para 10"));
        record
            .metadata
            .extra
            .insert("crmId".into(), serde_json::Value::from(42));
        record
    }

    #[test]
    fn test_recent_session_is_kept() {
        let controller = SessionMemoryController::new(300);
        let now = Utc::now();
        let mut rec = record(now - Duration::seconds(299));
        assert!(!controller.expire_if_idle(&mut rec, now));
        assert_eq!(rec.metadata.order_draft.headcount, Some(10));
        assert_eq!(rec.state, Some(DialogueState::CollectingOrderDetails));
    }

    #[test]
    fn test_idle_session_drops_ephemeral_state() {
        let controller = SessionMemoryController::new(300);
        let now = Utc::now();
        let mut rec = record(now - Duration::seconds(301));
        assert!(controller.expire_if_idle(&mut rec, now));
        assert!(rec.metadata.order_draft.is_empty());
        assert!(rec.metadata.oracle_reply.is_none());
        assert_eq!(rec.state, None);
        assert_eq!(rec.metadata.history.len(), 1);
        assert_eq!(rec.metadata.extra["crmId"], 42);
    }
}
