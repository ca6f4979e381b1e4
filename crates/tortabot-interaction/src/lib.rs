//! Adapters to the external reasoning service (Gemini).
//!
//! `GeminiApiAgent` is the HTTP client; `GeminiNluOracle` and
//! `GeminiStoreLocator` put it behind the core's oracle ports.

pub mod agent_error;
pub mod gemini_api_agent;
pub mod gemini_oracles;
pub mod prompts;

pub use agent_error::AgentError;
pub use gemini_api_agent::GeminiApiAgent;
pub use gemini_oracles::{GeminiNluOracle, GeminiStoreLocator};
