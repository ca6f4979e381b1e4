use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// One async mutex per conversation id.
///
/// Turns of the same conversation run one at a time; different conversations
/// do not contend beyond the brief map lookup. Entries nobody holds or waits
/// on are dropped whenever a new id is added.
#[derive(Default)]
pub struct ConversationLocks {
    locks: RwLock<HashMap<String, Arc<Mutex<()>>>>,
}

impl ConversationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits for exclusive access to `conversation_id`.
    ///
    /// The returned guard releases the conversation when dropped.
    pub async fn acquire(&self, conversation_id: &str) -> OwnedMutexGuard<()> {
        let existing = self.locks.read().await.get(conversation_id).cloned();
        let lock = match existing {
            Some(lock) => lock,
            None => {
                let mut locks = self.locks.write().await;
                Self::prune_idle(&mut locks);
                locks
                    .entry(conversation_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .clone()
            }
        };
        lock.lock_owned().await
    }

    /// Drops the entries of conversations with no turn in progress.
    pub async fn prune(&self) {
        Self::prune_idle(&mut *self.locks.write().await);
    }

    /// Number of conversations with a lock entry.
    pub async fn conversation_count(&self) -> usize {
        self.locks.read().await.len()
    }

    // The map owns one reference; any other is a held guard or a waiter.
    fn prune_idle(locks: &mut HashMap<String, Arc<Mutex<()>>>) {
        locks.retain(|_, lock| Arc::strong_count(lock) > 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_id_is_exclusive() {
        let locks = Arc::new(ConversationLocks::new());
        let guard = locks.acquire("c1").await;

        let contender = {
            let locks = locks.clone();
            tokio::spawn(async move {
                let _guard = locks.acquire("c1").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!contender.is_finished());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), contender)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_different_ids_do_not_block() {
        let locks = ConversationLocks::new();
        let _first = locks.acquire("c1").await;
        let second = tokio::time::timeout(Duration::from_millis(200), locks.acquire("c2")).await;
        assert!(second.is_ok());
        assert_eq!(locks.conversation_count().await, 2);
    }

    #[tokio::test]
    async fn test_released_conversations_are_pruned() {
        let locks = ConversationLocks::new();
        for i in 0..100 {
            let _guard = locks.acquire(&format!("c{i}")).await;
        }
        assert_eq!(locks.conversation_count().await, 1);

        let held = locks.acquire("held").await;
        locks.prune().await;
        assert_eq!(locks.conversation_count().await, 1);

        drop(held);
        locks.prune().await;
        assert_eq!(locks.conversation_count().await, 0);
    }
}
