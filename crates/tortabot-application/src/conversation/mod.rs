//! Session-level use case around the engine.

mod locks;
mod service;

pub use locks::ConversationLocks;
pub use service::ConversationService;
