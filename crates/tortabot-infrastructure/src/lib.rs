pub mod memory_conversation_repository;
pub mod paths;
pub mod storage;

pub use crate::memory_conversation_repository::InMemoryConversationRepository;
pub use crate::paths::TortabotPaths;
pub use crate::storage::{
    CatalogStorage, GeminiSecret, SecretConfig, SecretStorage, SecretStorageError, SettingsStorage,
};
