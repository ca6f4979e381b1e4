//! Prompt templates for the Gemini oracles.

use minijinja::{context, Environment};
use once_cell::sync::Lazy;
use serde::Serialize;
use tortabot_core::catalog::Catalog;
use tortabot_core::nlu::NluRequest;
use tortabot_core::store::Store;

use crate::agent_error::AgentError;

static TEMPLATES: Lazy<Environment<'static>> = Lazy::new(|| {
    let mut env = Environment::new();
    env.add_template("nlu_system", include_str!("../templates/nlu_system.j2"))
        .expect("valid nlu_system template");
    env.add_template("nlu_user", include_str!("../templates/nlu_user.j2"))
        .expect("valid nlu_user template");
    env.add_template("store_locator", include_str!("../templates/store_locator.j2"))
        .expect("valid store_locator template");
    env
});

#[derive(Serialize)]
struct IntentHint {
    id: &'static str,
    hint: &'static str,
}

const INTENT_HINTS: &[IntentHint] = &[
    IntentHint { id: "greeting", hint: "saludos (\"hola\", \"buenas\", etc.)" },
    IntentHint { id: "smalltalk", hint: "charla general (\"cómo estás\", \"quién eres\", etc.)" },
    IntentHint { id: "order_start", hint: "inicio o continuación de un pedido de tortas" },
    IntentHint { id: "order_status", hint: "consulta de estado de un pedido ya hecho" },
    IntentHint { id: "faq_hours", hint: "consulta de horarios de atención o ubicación" },
    IntentHint { id: "faq_menu", hint: "consulta de menú, carta, tipos de tortas y productos" },
    IntentHint { id: "handoff_human", hint: "el usuario quiere hablar con una persona" },
    IntentHint { id: "goodbye", hint: "despedida o agradecimiento de cierre" },
    IntentHint { id: "fallback", hint: "no queda claro qué quiere el usuario" },
];

/// System instruction for the NLU oracle.
pub fn nlu_system_instruction(
    assistant_name: &str,
    business_name: &str,
    catalog: &Catalog,
) -> Result<String, AgentError> {
    let products: Vec<&str> = catalog.products().iter().map(|p| p.name.as_str()).collect();
    let rendered = TEMPLATES.get_template("nlu_system")?.render(context! {
        assistant_name,
        business_name,
        intents => INTENT_HINTS,
        products,
    })?;
    Ok(rendered)
}

/// Per-turn prompt for the NLU oracle.
pub fn nlu_user_prompt(request: &NluRequest) -> Result<String, AgentError> {
    let previous_state = request
        .previous_state
        .map(|s| s.to_string())
        .unwrap_or_else(|| "null".to_string());
    let rendered = TEMPLATES.get_template("nlu_user")?.render(context! {
        today => request.today.to_string(),
        previous_state,
        rule_intent => request.rule_intent.to_string(),
        utterance => request.utterance.as_str(),
        history => request.history_excerpt.as_str(),
    })?;
    Ok(rendered)
}

/// Prompt asking for the id of the store closest to `address`.
pub fn store_locator_prompt(city: &str, address: &str, stores: &[Store]) -> Result<String, AgentError> {
    let rendered = TEMPLATES.get_template("store_locator")?.render(context! {
        city,
        address,
        stores,
    })?;
    Ok(rendered)
}
