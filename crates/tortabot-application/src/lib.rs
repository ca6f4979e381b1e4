//! Application layer for Tortabot.
//!
//! `ConversationEngine` turns one utterance into a `BotResponse`;
//! `ConversationService` wraps it with session loading, expiry, history and
//! persistence.

pub mod conversation;
pub mod engine;

pub use conversation::{ConversationLocks, ConversationService};
pub use engine::ConversationEngine;
