//! Gemini-backed implementations of the core's oracle ports.

use async_trait::async_trait;
use tortabot_core::Result;
use tortabot_core::catalog::Catalog;
use tortabot_core::nlu::{NluOracle, NluRequest};
use tortabot_core::settings::Settings;
use tortabot_core::store::{Store, StoreLocatorOracle};

use crate::agent_error::AgentError;
use crate::gemini_api_agent::GeminiApiAgent;
use crate::prompts;

const ASSISTANT_NAME: &str = "Edu";
const DEFAULT_CITY: &str = "Valdivia, Chile";

/// NLU oracle answering in JSON mode with the business's system instruction.
pub struct GeminiNluOracle {
    agent: GeminiApiAgent,
}

impl GeminiNluOracle {
    /// Wraps `agent`, installing the system instruction built from the
    /// business name and the catalog.
    pub fn new(agent: GeminiApiAgent, settings: &Settings, catalog: &Catalog) -> std::result::Result<Self, AgentError> {
        let instruction = prompts::nlu_system_instruction(ASSISTANT_NAME, &settings.business_name, catalog)?;
        Ok(Self {
            agent: agent.with_system_instruction(instruction).with_json_response(),
        })
    }
}

#[async_trait]
impl NluOracle for GeminiNluOracle {
    async fn interpret(&self, request: &NluRequest) -> Result<String> {
        let prompt = prompts::nlu_user_prompt(request)?;
        let raw = self.agent.generate(&prompt).await.inspect_err(|e| {
            tracing::warn!(
                retryable = e.is_retryable(),
                retry_after = ?e.retry_after(),
                error = %e,
                "Gemini NLU request failed"
            );
        })?;
        Ok(raw)
    }
}

/// Store locator that asks Gemini which branch is nearest.
pub struct GeminiStoreLocator {
    agent: GeminiApiAgent,
    city: String,
}

impl GeminiStoreLocator {
    pub fn new(agent: GeminiApiAgent) -> Self {
        Self {
            agent,
            city: DEFAULT_CITY.to_string(),
        }
    }

    /// City named in the prompt to anchor the model's geography.
    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = city.into();
        self
    }
}

#[async_trait]
impl StoreLocatorOracle for GeminiStoreLocator {
    async fn closest_store_id(&self, address: &str, stores: &[Store]) -> Result<String> {
        let prompt = prompts::store_locator_prompt(&self.city, address, stores)?;
        let answer = self.agent.generate(&prompt).await?;
        Ok(answer.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_agent_errors_surface_as_oracle_errors() {
        let agent = GeminiApiAgent::new("k", "m").unwrap();
        let err: tortabot_core::BotError = agent.generate("").await.unwrap_err().into();
        assert!(err.is_oracle());
    }

    #[test]
    fn test_nlu_oracle_builds_with_bundled_catalog() {
        let agent = GeminiApiAgent::new("k", "gemini-2.5-flash").unwrap();
        let catalog = Catalog::bundled().unwrap();
        assert!(GeminiNluOracle::new(agent, &Settings::default(), &catalog).is_ok());
    }
}
