//! Process-local implementation of the conversation store.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tortabot_core::Result;
use tortabot_core::conversation::{ConfirmedOrder, ConversationRecord, ConversationRepository};

/// Keeps conversations and confirmed orders in memory.
///
/// Nothing survives a restart; suited to the REPL and to tests.
#[derive(Default)]
pub struct InMemoryConversationRepository {
    records: RwLock<HashMap<String, ConversationRecord>>,
    orders: RwLock<Vec<ConfirmedOrder>>,
}

impl InMemoryConversationRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationRepository for InMemoryConversationRepository {
    async fn find_by_id(&self, id: &str) -> Result<Option<ConversationRecord>> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn save(&self, record: &ConversationRecord) -> Result<()> {
        self.records
            .write()
            .await
            .insert(record.id.clone(), record.clone());
        Ok(())
    }

    async fn record_confirmed_order(&self, order: &ConfirmedOrder) -> Result<()> {
        self.orders.write().await.push(order.clone());
        Ok(())
    }

    async fn confirmed_orders(&self) -> Result<Vec<ConfirmedOrder>> {
        Ok(self.orders.read().await.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tortabot_core::conversation::Channel;
    use tortabot_core::order::OrderDraft;

    #[tokio::test]
    async fn test_save_replaces_record() {
        let repo = InMemoryConversationRepository::new();
        assert!(repo.find_by_id("56911112222").await.unwrap().is_none());

        let mut record = ConversationRecord::new("56911112222", Channel::Whatsapp, Utc::now());
        repo.save(&record).await.unwrap();
        record.needs_human = true;
        repo.save(&record).await.unwrap();

        let found = repo.find_by_id("56911112222").await.unwrap().unwrap();
        assert!(found.needs_human);
    }

    #[tokio::test]
    async fn test_confirmed_orders_keep_insertion_order() {
        let repo = InMemoryConversationRepository::new();
        for id in ["o1", "o2"] {
            repo.record_confirmed_order(&ConfirmedOrder {
                id: id.to_string(),
                conversation_id: "c1".into(),
                channel: Channel::Web,
                created_at: Utc::now(),
                draft: OrderDraft::default(),
            })
            .await
            .unwrap();
        }
        let orders = repo.confirmed_orders().await.unwrap();
        assert_eq!(
            orders.iter().map(|o| o.id.as_str()).collect::<Vec<_>>(),
            ["o1", "o2"]
        );
    }
}
