//! Conversation persistence port.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Channel, ConversationMetadata};
use crate::dialogue::DialogueState;
use crate::error::Result;
use crate::order::OrderDraft;

/// Whether staff need to look at a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationStatus {
    #[default]
    Open,
    /// Waiting for a human.
    Pending,
    Closed,
}

/// What the session store keeps per conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    pub id: String,
    pub channel: Channel,
    pub state: Option<DialogueState>,
    #[serde(default)]
    pub metadata: ConversationMetadata,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub needs_human: bool,
    #[serde(default)]
    pub status: ConversationStatus,
}

impl ConversationRecord {
    /// A fresh record with no state.
    pub fn new(id: impl Into<String>, channel: Channel, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            channel,
            state: None,
            metadata: ConversationMetadata::default(),
            created_at: now,
            last_activity: now,
            needs_human: false,
            status: ConversationStatus::Open,
        }
    }
}

/// A draft the customer confirmed, queued for staff.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmedOrder {
    pub id: String,
    pub conversation_id: String,
    pub channel: Channel,
    pub created_at: DateTime<Utc>,
    pub draft: OrderDraft,
}

/// Repository trait for conversation persistence.
///
/// Implementations store one [`ConversationRecord`] per conversation id and
/// append-only [`ConfirmedOrder`]s.
#[async_trait]
pub trait ConversationRepository: Send + Sync {
    /// Finds a conversation by its id.
    ///
    /// # Arguments
    ///
    /// * `id` - The conversation id (e.g. the customer's phone number)
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))`: The conversation exists
    /// - `Ok(None)`: No turn has been stored for this id yet
    /// - `Err(_)`: Storage failure
    async fn find_by_id(&self, id: &str) -> Result<Option<ConversationRecord>>;

    /// Saves a conversation, replacing any previous record with the same id.
    async fn save(&self, record: &ConversationRecord) -> Result<()>;

    /// Appends a confirmed order.
    async fn record_confirmed_order(&self, order: &ConfirmedOrder) -> Result<()>;

    /// Lists confirmed orders, oldest first.
    async fn confirmed_orders(&self) -> Result<Vec<ConfirmedOrder>>;
}
