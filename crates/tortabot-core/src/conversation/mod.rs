//! Per-turn input and output of the engine, plus session bookkeeping.

mod memory;
mod repository;

pub use memory::SessionMemoryController;
pub use repository::{ConfirmedOrder, ConversationRecord, ConversationRepository, ConversationStatus};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, Display, EnumString};

use crate::dialogue::DialogueState;
use crate::intent::IntentMatch;
use crate::nlu::OracleSlots;
use crate::order::OrderDraft;
use crate::settings::Settings;

/// Messaging channel a conversation arrives on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString, AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Channel {
    #[default]
    Whatsapp,
    Web,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Locale {
    #[default]
    Es,
    En,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    User,
    Bot,
    /// A person from the business answering by hand.
    Staff,
}

/// One line of the conversation transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub role: Speaker,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub at: Option<DateTime<Utc>>,
}

impl HistoryItem {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::User,
            text: text.into(),
            at: None,
        }
    }

    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::Bot,
            text: text.into(),
            at: None,
        }
    }

    pub fn staff(text: impl Into<String>) -> Self {
        Self {
            role: Speaker::Staff,
            text: text.into(),
            at: None,
        }
    }

    pub fn at(mut self, at: DateTime<Utc>) -> Self {
        self.at = Some(at);
        self
    }
}

/// State carried between turns.
///
/// The draft, oracle slots and oracle reply are ephemeral and dropped when a
/// session expires or a flow ends. `extra` holds administrative fields that
/// the engine never interprets and always passes through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMetadata {
    #[serde(default, skip_serializing_if = "OrderDraft::is_empty")]
    pub order_draft: OrderDraft,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_slots: Option<OracleSlots>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oracle_reply: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub history: Vec<HistoryItem>,
    /// Per-conversation override of the engine's settings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ConversationMetadata {
    /// Drops the draft and everything the oracle contributed.
    pub fn clear_ephemeral(&mut self) {
        self.order_draft = OrderDraft::default();
        self.oracle_slots = None;
        self.oracle_reply = None;
    }
}

/// Everything the engine needs to answer one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub conversation_id: String,
    pub channel: Channel,
    pub text: String,
    #[serde(default)]
    pub locale: Locale,
    pub previous_state: Option<DialogueState>,
    /// Calendar date of the turn in the business timezone; relative dates
    /// ("mañana", "el viernes") resolve against it.
    pub today: NaiveDate,
    #[serde(default)]
    pub metadata: ConversationMetadata,
}

impl ConversationContext {
    pub fn new(
        conversation_id: impl Into<String>,
        channel: Channel,
        text: impl Into<String>,
        today: NaiveDate,
    ) -> Self {
        Self {
            conversation_id: conversation_id.into(),
            channel,
            text: text.into(),
            locale: Locale::default(),
            previous_state: None,
            today,
            metadata: ConversationMetadata::default(),
        }
    }

    pub fn with_previous_state(mut self, state: Option<DialogueState>) -> Self {
        self.previous_state = state;
        self
    }

    pub fn with_metadata(mut self, metadata: ConversationMetadata) -> Self {
        self.metadata = metadata;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    Image,
}

/// Media the transport should send along with the reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaAttachment {
    #[serde(rename = "type")]
    pub kind: MediaKind,
    pub url: String,
    pub caption: String,
}

impl MediaAttachment {
    pub fn image(url: impl Into<String>, caption: impl Into<String>) -> Self {
        Self {
            kind: MediaKind::Image,
            url: url.into(),
            caption: caption.into(),
        }
    }
}

/// The engine's answer to one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BotResponse {
    pub reply: String,
    pub intent: IntentMatch,
    pub next_state: Option<DialogueState>,
    pub needs_human: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub media: Vec<MediaAttachment>,
    /// Ask the caller to drop ephemeral session state after persisting.
    pub clear_memory: bool,
    /// Metadata to persist for the next turn.
    pub metadata: ConversationMetadata,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_preserves_unknown_fields() {
        let json = r#"{
            "orderDraft": {"product": "Torta Moka", "headcount": 10},
            "history": [{"role": "user", "text": "hola"}],
            "assignedAgent": "carla",
            "tags": ["vip"]
        }"#;
        let metadata: ConversationMetadata = serde_json::from_str(json).unwrap();
        assert_eq!(metadata.order_draft.product.as_deref(), Some("Torta Moka"));
        assert_eq!(metadata.history.len(), 1);
        assert_eq!(metadata.extra["assignedAgent"], "carla");

        let back = serde_json::to_value(&metadata).unwrap();
        assert_eq!(back["tags"][0], "vip");
        assert_eq!(back["orderDraft"]["headcount"], 10);
    }

    #[test]
    fn test_clear_ephemeral_keeps_history_and_extra() {
        let mut metadata = ConversationMetadata {
            order_draft: OrderDraft {
                headcount: Some(4),
                ..Default::default()
            },
            oracle_reply: Some("hola".into()),
            history: vec![HistoryItem::user("hola")],
            ..Default::default()
        };
        metadata.extra.insert("note".into(), Value::from("keep"));

        metadata.clear_ephemeral();
        assert!(metadata.order_draft.is_empty());
        assert!(metadata.oracle_reply.is_none());
        assert_eq!(metadata.history.len(), 1);
        assert_eq!(metadata.extra["note"], "keep");
    }

    #[test]
    fn test_media_serializes_type_field() {
        let media = MediaAttachment::image("https://x/y.webp", "Torta Moka");
        let json = serde_json::to_value(&media).unwrap();
        assert_eq!(json["type"], "image");
        assert_eq!(json["caption"], "Torta Moka");
    }
}
