//! Domain core of the bakery order assistant.
//!
//! Everything here is transport-agnostic: the catalog, intent rules, order
//! drafts, dialogue state machine and the ports (`NluOracle`,
//! `StoreLocatorOracle`, `ConversationRepository`) that adapters implement.

pub mod catalog;
pub mod conversation;
pub mod dialogue;
pub mod error;
pub mod intent;
pub mod nlu;
pub mod order;
pub mod settings;
pub mod store;
pub mod text;

// Re-export common error type
pub use error::{BotError, Result};
