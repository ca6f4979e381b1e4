use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, Utc};
use tortabot_core::{BotError, Result};
use tortabot_core::conversation::{
    BotResponse, Channel, ConfirmedOrder, ConversationContext, ConversationRecord,
    ConversationRepository, ConversationStatus, HistoryItem, SessionMemoryController,
};
use tortabot_core::dialogue::DialogueState;
use uuid::Uuid;

use super::locks::ConversationLocks;
use crate::engine::ConversationEngine;

/// Use case for handling customer messages end to end.
///
/// # Responsibilities
///
/// - Serializing turns of the same conversation
/// - Loading the conversation record, or starting a fresh one
/// - Dropping ephemeral state after inactivity
/// - Running the engine and appending both sides to the history
/// - Recording confirmed orders and honoring `clear_memory`
/// - Persisting the updated record
/// - Staff replies and manual status changes
pub struct ConversationService {
    engine: Arc<ConversationEngine>,
    repository: Arc<dyn ConversationRepository>,
    locks: ConversationLocks,
    memory: SessionMemoryController,
}

impl ConversationService {
    /// Creates a new `ConversationService`.
    ///
    /// # Arguments
    ///
    /// * `engine` - The engine answering each turn; its settings provide the
    ///   inactivity timeout and history retention
    /// * `repository` - Conversation persistence
    pub fn new(engine: Arc<ConversationEngine>, repository: Arc<dyn ConversationRepository>) -> Self {
        let memory = SessionMemoryController::new(engine.settings().engine.session_timeout_secs);
        Self {
            engine,
            repository,
            locks: ConversationLocks::new(),
            memory,
        }
    }

    pub fn engine(&self) -> &ConversationEngine {
        &self.engine
    }

    /// Handles one inbound message using the current clock.
    pub async fn handle_message(
        &self,
        conversation_id: &str,
        channel: Channel,
        text: &str,
    ) -> Result<BotResponse> {
        self.handle_message_at(
            conversation_id,
            channel,
            text,
            Utc::now(),
            Local::now().date_naive(),
        )
        .await
    }

    /// Handles one inbound message at a given instant.
    ///
    /// # Arguments
    ///
    /// * `conversation_id` - Stable id of the conversation (e.g. phone number)
    /// * `channel` - Channel used when the conversation is new
    /// * `text` - The customer's utterance
    /// * `now` - Timestamp of the message, compared against the last activity
    /// * `today` - Business calendar date that relative dates resolve against
    ///
    /// # Errors
    ///
    /// Only repository failures are returned; the engine itself never fails.
    pub async fn handle_message_at(
        &self,
        conversation_id: &str,
        channel: Channel,
        text: &str,
        now: DateTime<Utc>,
        today: NaiveDate,
    ) -> Result<BotResponse> {
        let _guard = self.locks.acquire(conversation_id).await;

        let mut record = match self.repository.find_by_id(conversation_id).await? {
            Some(record) => record,
            None => {
                tracing::info!(conversation_id, channel = %channel, "New conversation");
                ConversationRecord::new(conversation_id, channel, now)
            }
        };
        self.memory.expire_if_idle(&mut record, now);

        let context = ConversationContext::new(conversation_id, record.channel, text, today)
            .with_previous_state(record.state)
            .with_metadata(record.metadata.clone());
        let response = self.engine.process_message(&context).await;

        record.metadata = response.metadata.clone();
        record.metadata.history.push(HistoryItem::user(text).at(now));
        record
            .metadata
            .history
            .push(HistoryItem::bot(response.reply.as_str()).at(now));
        let retention = self.engine.settings().engine.history_retention;
        let overflow = record.metadata.history.len().saturating_sub(retention);
        record.metadata.history.drain(..overflow);

        record.state = response.next_state;
        record.last_activity = now;
        record.needs_human = response.needs_human;
        record.status = if response.needs_human {
            ConversationStatus::Pending
        } else if response.next_state == Some(DialogueState::Ended) {
            ConversationStatus::Closed
        } else {
            ConversationStatus::Open
        };

        if response.next_state == Some(DialogueState::HandoffRequested)
            && record.metadata.order_draft.confirmed
        {
            let order = ConfirmedOrder {
                id: Uuid::new_v4().to_string(),
                conversation_id: conversation_id.to_string(),
                channel: record.channel,
                created_at: now,
                draft: record.metadata.order_draft.clone(),
            };
            tracing::info!(
                conversation_id,
                order_id = %order.id,
                product = ?order.draft.product,
                "Recording confirmed order"
            );
            self.repository.record_confirmed_order(&order).await?;
        }

        if response.clear_memory {
            SessionMemoryController::clear(&mut record);
        }

        self.repository.save(&record).await?;
        Ok(response)
    }

    /// Drops the draft and dialogue state of a conversation, keeping history.
    pub async fn reset(&self, conversation_id: &str) -> Result<()> {
        let _guard = self.locks.acquire(conversation_id).await;
        if let Some(mut record) = self.repository.find_by_id(conversation_id).await? {
            SessionMemoryController::clear(&mut record);
            self.repository.save(&record).await?;
            tracing::info!(conversation_id, "Conversation reset");
        }
        Ok(())
    }

    /// Records a message a staff member sent by hand.
    ///
    /// Staff answering means the conversation no longer waits for a human;
    /// a closed conversation stays closed.
    ///
    /// # Errors
    ///
    /// `NotFound` when the conversation does not exist.
    pub async fn staff_reply(
        &self,
        conversation_id: &str,
        text: &str,
        now: DateTime<Utc>,
    ) -> Result<ConversationRecord> {
        let _guard = self.locks.acquire(conversation_id).await;
        let mut record = self
            .repository
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| BotError::not_found("Conversation", conversation_id))?;

        record.metadata.history.push(HistoryItem::staff(text).at(now));
        record.needs_human = false;
        if record.status != ConversationStatus::Closed {
            record.status = ConversationStatus::Open;
        }

        self.repository.save(&record).await?;
        tracing::info!(conversation_id, "Staff reply recorded");
        Ok(record)
    }

    /// Overrides the status and/or the needs-human flag from the staff side.
    ///
    /// `None` leaves the field unchanged.
    ///
    /// # Errors
    ///
    /// `NotFound` when the conversation does not exist.
    pub async fn update_status(
        &self,
        conversation_id: &str,
        status: Option<ConversationStatus>,
        needs_human: Option<bool>,
    ) -> Result<ConversationRecord> {
        let _guard = self.locks.acquire(conversation_id).await;
        let mut record = self
            .repository
            .find_by_id(conversation_id)
            .await?
            .ok_or_else(|| BotError::not_found("Conversation", conversation_id))?;

        if let Some(status) = status {
            record.status = status;
        }
        if let Some(needs_human) = needs_human {
            record.needs_human = needs_human;
        }

        self.repository.save(&record).await?;
        tracing::info!(
            conversation_id,
            status = ?record.status,
            needs_human = record.needs_human,
            "Conversation status updated"
        );
        Ok(record)
    }

    /// The stored record of a conversation, if any.
    pub async fn conversation(&self, conversation_id: &str) -> Result<Option<ConversationRecord>> {
        self.repository.find_by_id(conversation_id).await
    }

    pub async fn confirmed_orders(&self) -> Result<Vec<ConfirmedOrder>> {
        self.repository.confirmed_orders().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    use async_trait::async_trait;
    use chrono::Duration;
    use tokio::sync::Mutex;
    use tortabot_core::catalog::Catalog;
    use tortabot_core::settings::Settings;
    use tortabot_core::store::{StoreDirectory, StoreLocator};

    #[derive(Default)]
    struct MockRepository {
        records: Mutex<HashMap<String, ConversationRecord>>,
        orders: Mutex<Vec<ConfirmedOrder>>,
    }

    #[async_trait]
    impl ConversationRepository for MockRepository {
        async fn find_by_id(&self, id: &str) -> Result<Option<ConversationRecord>> {
            Ok(self.records.lock().await.get(id).cloned())
        }

        async fn save(&self, record: &ConversationRecord) -> Result<()> {
            self.records
                .lock()
                .await
                .insert(record.id.clone(), record.clone());
            Ok(())
        }

        async fn record_confirmed_order(&self, order: &ConfirmedOrder) -> Result<()> {
            self.orders.lock().await.push(order.clone());
            Ok(())
        }

        async fn confirmed_orders(&self) -> Result<Vec<ConfirmedOrder>> {
            Ok(self.orders.lock().await.clone())
        }
    }

    fn service_with(settings: Settings) -> (ConversationService, Arc<MockRepository>) {
        let engine = ConversationEngine::new(
            Arc::new(Catalog::bundled().unwrap()),
            StoreLocator::new(Arc::new(StoreDirectory::bundled().unwrap()), None),
            settings,
        );
        let repository = Arc::new(MockRepository::default());
        (
            ConversationService::new(Arc::new(engine), repository.clone()),
            repository,
        )
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, 19).unwrap()
    }

    #[tokio::test]
    async fn test_first_message_creates_record_with_history() {
        let (service, _) = service_with(Settings::default());
        let now = Utc::now();
        service
            .handle_message_at("c1", Channel::Web, "hola", now, today())
            .await
            .unwrap();

        let record = service.conversation("c1").await.unwrap().unwrap();
        assert_eq!(record.channel, Channel::Web);
        assert_eq!(record.state, Some(DialogueState::Idle));
        assert_eq!(record.metadata.history.len(), 2);
        assert_eq!(record.metadata.history[0].text, "hola");
        assert_eq!(record.last_activity, now);
    }

    #[tokio::test]
    async fn test_idle_conversation_loses_draft() {
        let (service, _) = service_with(Settings::default());
        let start = Utc::now();
        service
            .handle_message_at("c1", Channel::Whatsapp, "quiero encargar una torta alpina", start, today())
            .await
            .unwrap();
        let record = service.conversation("c1").await.unwrap().unwrap();
        assert_eq!(record.metadata.order_draft.product.as_deref(), Some("Torta Alpina"));

        let later = start + Duration::seconds(301);
        service
            .handle_message_at("c1", Channel::Whatsapp, "hola", later, today())
            .await
            .unwrap();
        let record = service.conversation("c1").await.unwrap().unwrap();
        assert!(record.metadata.order_draft.is_empty());
        assert_eq!(record.metadata.history.len(), 4);
    }

    #[tokio::test]
    async fn test_history_is_capped() {
        let mut settings = Settings::default();
        settings.engine.history_retention = 5;
        let (service, _) = service_with(settings);
        let now = Utc::now();
        for i in 0..4 {
            service
                .handle_message_at("c1", Channel::Whatsapp, &format!("hola {i}"), now, today())
                .await
                .unwrap();
        }
        let record = service.conversation("c1").await.unwrap().unwrap();
        assert_eq!(record.metadata.history.len(), 5);
        assert_eq!(record.metadata.history.last().unwrap().role, tortabot_core::conversation::Speaker::Bot);
    }

    #[tokio::test]
    async fn test_goodbye_clears_memory_and_closes() {
        let (service, _) = service_with(Settings::default());
        let now = Utc::now();
        service
            .handle_message_at("c1", Channel::Whatsapp, "quiero encargar una torta alpina", now, today())
            .await
            .unwrap();
        let response = service
            .handle_message_at("c1", Channel::Whatsapp, "cancelar", now, today())
            .await
            .unwrap();
        assert!(response.clear_memory);

        let record = service.conversation("c1").await.unwrap().unwrap();
        assert!(record.metadata.order_draft.is_empty());
        assert_eq!(record.state, None);
        assert_eq!(record.status, ConversationStatus::Closed);
    }

    #[tokio::test]
    async fn test_handoff_marks_pending() {
        let (service, repository) = service_with(Settings::default());
        service
            .handle_message("c1", Channel::Whatsapp, "quiero hablar con una persona")
            .await
            .unwrap();
        let record = service.conversation("c1").await.unwrap().unwrap();
        assert!(record.needs_human);
        assert_eq!(record.status, ConversationStatus::Pending);
        assert!(repository.orders.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_needs_human_is_recomputed_each_turn() {
        let (service, _) = service_with(Settings::default());
        let now = Utc::now();
        for text in ["quiero hablar con un asesor", "hola"] {
            service
                .handle_message_at("c1", Channel::Whatsapp, text, now, today())
                .await
                .unwrap();
        }
        let record = service.conversation("c1").await.unwrap().unwrap();
        assert!(!record.needs_human);
        assert_eq!(record.status, ConversationStatus::Open);

        service
            .handle_message_at("c1", Channel::Whatsapp, "quiero hablar con un asesor", now, today())
            .await
            .unwrap();
        service
            .handle_message_at("c1", Channel::Whatsapp, "muchas gracias, chao", now, today())
            .await
            .unwrap();
        let record = service.conversation("c1").await.unwrap().unwrap();
        assert!(!record.needs_human);
        assert_eq!(record.status, ConversationStatus::Closed);
    }

    #[tokio::test]
    async fn test_staff_reply_releases_pending_conversation() {
        let (service, _) = service_with(Settings::default());
        let now = Utc::now();
        service
            .handle_message_at("c1", Channel::Whatsapp, "quiero hablar con un asesor", now, today())
            .await
            .unwrap();

        let record = service
            .staff_reply("c1", "Hola, soy Ana de la pastelería", now)
            .await
            .unwrap();
        assert!(!record.needs_human);
        assert_eq!(record.status, ConversationStatus::Open);
        let last = record.metadata.history.last().unwrap();
        assert_eq!(last.role, tortabot_core::conversation::Speaker::Staff);
        assert_eq!(last.text, "Hola, soy Ana de la pastelería");

        let stored = service.conversation("c1").await.unwrap().unwrap();
        assert_eq!(stored, record);
    }

    #[tokio::test]
    async fn test_staff_reply_keeps_closed_conversation_closed() {
        let (service, _) = service_with(Settings::default());
        let now = Utc::now();
        service
            .handle_message_at("c1", Channel::Whatsapp, "gracias, chao", now, today())
            .await
            .unwrap();
        let record = service.staff_reply("c1", "¡Que estés bien!", now).await.unwrap();
        assert_eq!(record.status, ConversationStatus::Closed);
    }

    #[tokio::test]
    async fn test_update_status_overrides_only_given_fields() {
        let (service, _) = service_with(Settings::default());
        service
            .handle_message("c1", Channel::Whatsapp, "quiero hablar con un asesor")
            .await
            .unwrap();

        let record = service.update_status("c1", None, Some(false)).await.unwrap();
        assert!(!record.needs_human);
        assert_eq!(record.status, ConversationStatus::Pending);

        let record = service
            .update_status("c1", Some(ConversationStatus::Closed), None)
            .await
            .unwrap();
        assert_eq!(record.status, ConversationStatus::Closed);
        assert!(!record.needs_human);
    }

    #[tokio::test]
    async fn test_staff_operations_on_unknown_conversation() {
        let (service, _) = service_with(Settings::default());
        let err = service.staff_reply("nope", "hola", Utc::now()).await.unwrap_err();
        assert!(err.is_not_found());
        let err = service.update_status("nope", None, Some(false)).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_reset_keeps_history() {
        let (service, _) = service_with(Settings::default());
        service
            .handle_message("c1", Channel::Whatsapp, "quiero encargar una torta moka")
            .await
            .unwrap();
        service.reset("c1").await.unwrap();
        let record = service.conversation("c1").await.unwrap().unwrap();
        assert!(record.metadata.order_draft.is_empty());
        assert_eq!(record.state, None);
        assert_eq!(record.metadata.history.len(), 2);
    }
}
