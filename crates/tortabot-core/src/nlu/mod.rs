//! Port and adapter logic for the optional NLU oracle.
//!
//! The oracle is advisory: every failure (not configured, transport error,
//! malformed JSON, unknown intent) turns into `None` and the engine carries on
//! with its keyword rules.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::conversation::ConversationContext;
use crate::dialogue::DialogueState;
use crate::error::Result;
use crate::intent::{IntentId, IntentMatch};
use crate::order::DeliveryMode;
use crate::text::truncate_chars;

/// Maximum characters of serialized history sent to the oracle.
pub const HISTORY_EXCERPT_CHARS: usize = 1500;

/// Confidence assumed when the oracle omits it.
pub const DEFAULT_ORACLE_CONFIDENCE: f32 = 0.9;

/// What the oracle is asked about one utterance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NluRequest {
    pub utterance: String,
    pub previous_state: Option<DialogueState>,
    pub rule_intent: IntentId,
    /// JSON array of recent history items, already truncated.
    pub history_excerpt: String,
    /// Date relative expressions ("el viernes") resolve against.
    pub today: NaiveDate,
}

/// Slots proposed by the oracle. Values are unvalidated suggestions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OracleSlots {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headcount: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_mode: Option<DeliveryMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_text: Option<String>,
}

impl OracleSlots {
    pub fn is_empty(&self) -> bool {
        *self == OracleSlots::default()
    }
}

/// A parsed oracle answer.
#[derive(Debug, Clone, PartialEq)]
pub struct NluResult {
    pub intent: IntentMatch,
    pub slots: OracleSlots,
    pub needs_human: bool,
    pub generated_reply: Option<String>,
}

/// External text-understanding service.
#[async_trait]
pub trait NluOracle: Send + Sync {
    /// Interprets one utterance.
    ///
    /// # Arguments
    ///
    /// * `request` - Utterance, prior state, rule intent and history excerpt
    ///
    /// # Returns
    ///
    /// The raw response text, expected to be a JSON object of the form
    /// `{intentId, confidence, slots, needsHuman, generatedReply}`.
    async fn interpret(&self, request: &NluRequest) -> Result<String>;
}

/// Consults the oracle for `context`, returning `None` on any failure.
pub async fn understand(
    oracle: Option<&dyn NluOracle>,
    context: &ConversationContext,
    rule_intent: &IntentMatch,
    history_window: usize,
) -> Option<NluResult> {
    let oracle = oracle?;

    let request = NluRequest {
        utterance: context.text.clone(),
        previous_state: context.previous_state,
        rule_intent: rule_intent.id,
        history_excerpt: history_excerpt(context, history_window),
        today: context.today,
    };

    let raw = match oracle.interpret(&request).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(
                conversation_id = %context.conversation_id,
                error = %e,
                "NLU oracle failed, falling back to rules"
            );
            return None;
        }
    };

    let parsed = parse_nlu_response(&raw);
    if parsed.is_none() {
        tracing::warn!(
            conversation_id = %context.conversation_id,
            raw = %truncate_chars(&raw, 200),
            "NLU oracle returned an unusable response"
        );
    }
    parsed
}

fn history_excerpt(context: &ConversationContext, window: usize) -> String {
    let history = &context.metadata.history;
    let start = history.len().saturating_sub(window);
    let json = serde_json::to_string(&history[start..]).unwrap_or_else(|_| "[]".to_string());
    truncate_chars(&json, HISTORY_EXCERPT_CHARS)
}

fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let body = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    body.trim_end().trim_end_matches("```").trim()
}

fn non_empty_string(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_headcount(value: Option<&Value>) -> Option<u32> {
    match value? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|f| *f >= 0.0).map(|f| f.round() as u64))
            .and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse::<u32>().ok(),
        _ => None,
    }
}

fn parse_delivery_mode(value: Option<&Value>) -> Option<DeliveryMode> {
    let raw = crate::text::normalize(value?.as_str()?);
    match raw.as_str() {
        "retiro" | "pickup" | "local" | "retiro en local" => Some(DeliveryMode::Pickup),
        "delivery" | "despacho" | "envio" => Some(DeliveryMode::Delivery),
        _ => None,
    }
}

fn parse_confidence(value: Option<&Value>) -> f32 {
    let confidence = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    confidence
        .filter(|c| c.is_finite())
        .map(|c| c as f32)
        .unwrap_or(DEFAULT_ORACLE_CONFIDENCE)
        .clamp(0.0, 1.0)
}

/// Parses an oracle answer leniently.
///
/// Markdown code fences are stripped, `personas` may be a number or a numeric
/// string, an unparseable `fechaIso` is dropped and delivery-mode synonyms are
/// mapped. A missing or unknown `intentId` makes the whole answer unusable.
pub fn parse_nlu_response(raw: &str) -> Option<NluResult> {
    let value: Value = serde_json::from_str(strip_code_fences(raw)).ok()?;
    let object = value.as_object()?;

    let intent_id = IntentId::from_str(object.get("intentId")?.as_str()?.trim()).ok()?;
    let confidence = parse_confidence(object.get("confidence"));

    let slots = match object.get("slots").and_then(Value::as_object) {
        Some(slots) => OracleSlots {
            product: non_empty_string(slots.get("producto")),
            headcount: parse_headcount(slots.get("personas")),
            delivery_mode: parse_delivery_mode(slots.get("deliveryMode")),
            date: slots
                .get("fechaIso")
                .and_then(Value::as_str)
                .and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok()),
            free_text: non_empty_string(slots.get("freeText")),
        },
        None => OracleSlots::default(),
    };

    Some(NluResult {
        intent: IntentMatch::new(intent_id, confidence, "NLU oracle"),
        slots,
        needs_human: object
            .get("needsHuman")
            .and_then(Value::as_bool)
            .unwrap_or(false),
        generated_reply: non_empty_string(object.get("generatedReply")),
    })
}
