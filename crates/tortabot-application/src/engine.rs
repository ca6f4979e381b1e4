//! Conversation engine: one utterance in, one response out.

use std::sync::Arc;

use tortabot_core::catalog::Catalog;
use tortabot_core::conversation::{BotResponse, ConversationContext};
use tortabot_core::dialogue::{non_order_reply, DialogueState, OrderFlow};
use tortabot_core::intent::{classify, IntentId, IntentMatch};
use tortabot_core::nlu::{understand, NluOracle, NluResult};
use tortabot_core::order::{extract_headcount, DraftMerger};
use tortabot_core::settings::Settings;
use tortabot_core::store::StoreLocator;
use tortabot_core::text::normalize;

/// Confidence given to a turn promoted to `order_start`.
const PROMOTED_CONFIDENCE: f32 = 0.8;

/// Combines keyword rules, the optional NLU oracle, the draft merger and the
/// order state machine.
///
/// The engine is stateless between calls: everything it needs about the
/// conversation arrives in the [`ConversationContext`] and everything to keep
/// leaves in [`BotResponse::metadata`].
pub struct ConversationEngine {
    catalog: Arc<Catalog>,
    locator: StoreLocator,
    settings: Settings,
    nlu: Option<Arc<dyn NluOracle>>,
}

impl ConversationEngine {
    /// Creates an engine without an NLU oracle.
    ///
    /// # Arguments
    ///
    /// * `catalog` - Available products
    /// * `locator` - Branch resolution, with or without its own oracle
    /// * `settings` - Default business settings; a conversation may override them
    pub fn new(catalog: Arc<Catalog>, locator: StoreLocator, settings: Settings) -> Self {
        Self {
            catalog,
            locator,
            settings,
            nlu: None,
        }
    }

    /// Enables the NLU oracle for low-confidence turns.
    pub fn with_nlu_oracle(mut self, oracle: Arc<dyn NluOracle>) -> Self {
        self.nlu = Some(oracle);
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Answers one utterance. Never fails: oracle problems degrade to the
    /// keyword rules and an unreachable locator degrades to the first store.
    pub async fn process_message(&self, context: &ConversationContext) -> BotResponse {
        let settings = context.metadata.settings.as_ref().unwrap_or(&self.settings);

        let rule = classify(&context.text, context.previous_state);
        let nlu = self.consult_oracle(context, &rule, settings).await;

        let mut intent = match &nlu {
            Some(result) if result.intent.confidence > rule.confidence => result.intent.clone(),
            _ => rule,
        };
        if self.should_promote(&intent, &context.text) {
            intent = IntentMatch::new(
                IntentId::OrderStart,
                intent.confidence.max(PROMOTED_CONFIDENCE),
                format!("{} promoted: utterance names a product or headcount", intent.id),
            );
        }

        let slots = nlu.as_ref().map(|r| r.slots.clone()).unwrap_or_default();
        let oracle_reply = nlu.as_ref().and_then(|r| r.generated_reply.clone());

        let mut metadata = context.metadata.clone();
        metadata.oracle_slots = (!slots.is_empty()).then(|| slots.clone());
        metadata.oracle_reply = oracle_reply.clone();

        let response = if intent.id == IntentId::OrderStart {
            let merger = DraftMerger::new(&self.catalog, settings.engine.max_portion_suggestions);
            let draft = merger.merge(&metadata.order_draft, &slots, &context.text, context.today);

            let flow = OrderFlow::new(&self.catalog, &self.locator, settings);
            let step = flow.advance(draft, oracle_reply.as_deref()).await;
            metadata.order_draft = step.draft;
            BotResponse {
                reply: step.reply,
                intent,
                next_state: Some(step.next_state),
                needs_human: step.needs_human,
                media: step.media,
                clear_memory: step.clear_memory,
                metadata,
            }
        } else {
            let mut reply = non_order_reply(
                intent.id,
                context.previous_state,
                settings,
                &self.catalog,
                oracle_reply.as_deref(),
            );
            if nlu.as_ref().is_some_and(|r| r.needs_human) && !reply.needs_human {
                tracing::info!(
                    conversation_id = %context.conversation_id,
                    intent = %intent.id,
                    "Oracle requested a human, escalating"
                );
                reply.reply = settings.messages.handoff.clone();
                reply.next_state = DialogueState::HandoffRequested;
                reply.needs_human = true;
                reply.clear_memory = false;
            }
            BotResponse {
                reply: reply.reply,
                intent,
                next_state: Some(reply.next_state),
                needs_human: reply.needs_human,
                media: Vec::new(),
                clear_memory: reply.clear_memory,
                metadata,
            }
        };

        tracing::info!(
            conversation_id = %context.conversation_id,
            intent = %response.intent.id,
            confidence = response.intent.confidence,
            reason = %response.intent.reason,
            next_state = ?response.next_state,
            needs_human = response.needs_human,
            "Processed message"
        );
        response
    }

    async fn consult_oracle(
        &self,
        context: &ConversationContext,
        rule: &IntentMatch,
        settings: &Settings,
    ) -> Option<NluResult> {
        let oracle = self.nlu.as_deref()?;
        if rule.confidence >= settings.engine.oracle_bypass_confidence {
            tracing::debug!(
                conversation_id = %context.conversation_id,
                intent = %rule.id,
                confidence = rule.confidence,
                "Rule intent is confident, skipping oracle"
            );
            return None;
        }
        understand(Some(oracle), context, rule, settings.engine.history_window).await
    }

    fn should_promote(&self, intent: &IntentMatch, text: &str) -> bool {
        matches!(
            intent.id,
            IntentId::Greeting | IntentId::Smalltalk | IntentId::Fallback
        ) && (self.catalog.match_text(text).is_some() || extract_headcount(&normalize(text)).is_some())
    }
}
