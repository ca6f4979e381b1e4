use super::DialogueState;
use crate::catalog::{menu_summary, Catalog};
use crate::intent::IntentId;
use crate::settings::Settings;

/// Reply to a turn that does not advance an order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NonOrderReply {
    pub reply: String,
    pub next_state: DialogueState,
    pub needs_human: bool,
    pub clear_memory: bool,
}

impl NonOrderReply {
    fn new(reply: impl Into<String>, next_state: DialogueState) -> Self {
        Self {
            reply: reply.into(),
            next_state,
            needs_human: false,
            clear_memory: false,
        }
    }
}

const SMALLTALK: &str = "Estoy aquí para ayudarte con tus pedidos y consultas 😊\nSi quieres, puedes decirme por ejemplo: \"Quiero hacer un pedido\" o \"¿Cuáles son los horarios?\"";

const ORDER_STATUS: &str = "Para revisar el estado de tu pedido necesito algún dato de referencia 🧾\nPor ejemplo: número de pedido, nombre y fecha aproximada en que lo hiciste.";

const FALLBACK: &str = "No estoy seguro de haber entendido del todo 🤔\nPuedo ayudarte con pedidos, horarios, productos o derivarte con una persona del equipo.\n¿Podrías explicarme de otra forma o decir, por ejemplo: \"Quiero hacer un pedido\"?";

const ORDER_START: &str = "¡Perfecto! Empecemos tu pedido 🧁\nCuéntame qué torta te gustaría y para cuántas personas.";

/// Canned reply for `intent`.
///
/// FAQ turns keep `previous_state` (or fall back to idle) so a question in
/// the middle of a flow does not reset it. `oracle_reply` replaces the canned
/// smalltalk and fallback texts when present.
pub fn non_order_reply(
    intent: IntentId,
    previous_state: Option<DialogueState>,
    settings: &Settings,
    catalog: &Catalog,
    oracle_reply: Option<&str>,
) -> NonOrderReply {
    let preserved = previous_state.unwrap_or(DialogueState::Idle);
    match intent {
        IntentId::Greeting => NonOrderReply::new(&settings.messages.welcome, DialogueState::Idle),
        IntentId::Smalltalk => {
            NonOrderReply::new(oracle_reply.unwrap_or(SMALLTALK), DialogueState::Idle)
        }
        IntentId::OrderStatus => {
            NonOrderReply::new(ORDER_STATUS, DialogueState::AwaitingOrderReference)
        }
        IntentId::FaqHours => {
            let hours = &settings.hours;
            NonOrderReply::new(
                format!(
                    "Nuestros horarios de atención son:\n🕒 Lunes a viernes: {}\n🕒 Sábados: {}\n🕒 Domingos y festivos: {}",
                    hours.weekdays, hours.saturday, hours.sunday
                ),
                preserved,
            )
        }
        IntentId::FaqMenu => NonOrderReply::new(
            format!(
                "Te comparto un resumen de nuestros productos principales 🍰\n\n{}\n\nSi alguna te interesa, dime su nombre y te cuento más.",
                menu_summary(catalog, settings.engine.menu_summary_size)
            ),
            preserved,
        ),
        IntentId::HandoffHuman => NonOrderReply {
            needs_human: true,
            ..NonOrderReply::new(&settings.messages.handoff, DialogueState::HandoffRequested)
        },
        IntentId::Goodbye => NonOrderReply {
            clear_memory: true,
            ..NonOrderReply::new(&settings.messages.closing, DialogueState::Ended)
        },
        IntentId::Fallback => NonOrderReply::new(oracle_reply.unwrap_or(FALLBACK), preserved),
        IntentId::OrderStart => {
            NonOrderReply::new(ORDER_START, DialogueState::CollectingOrderDetails)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reply(intent: IntentId, previous: Option<DialogueState>) -> NonOrderReply {
        non_order_reply(
            intent,
            previous,
            &Settings::default(),
            &Catalog::bundled().unwrap(),
            None,
        )
    }

    #[test]
    fn test_greeting_uses_welcome_message() {
        let r = reply(IntentId::Greeting, None);
        assert_eq!(r.reply, Settings::default().messages.welcome);
        assert_eq!(r.next_state, DialogueState::Idle);
    }

    #[test]
    fn test_hours_preserve_state() {
        let r = reply(IntentId::FaqHours, Some(DialogueState::CollectingOrderDetails));
        assert!(r.reply.contains("Lunes a viernes: 10:00 – 19:00"));
        assert_eq!(r.next_state, DialogueState::CollectingOrderDetails);

        let r = reply(IntentId::FaqHours, None);
        assert_eq!(r.next_state, DialogueState::Idle);
    }

    #[test]
    fn test_menu_lists_catalog() {
        let r = reply(IntentId::FaqMenu, None);
        assert!(r.reply.contains("• Torta Alpina"));
        assert!(r.reply.contains("Tortas de hojarasca"));
    }

    #[test]
    fn test_handoff_and_goodbye_flags() {
        let r = reply(IntentId::HandoffHuman, None);
        assert!(r.needs_human);
        assert_eq!(r.next_state, DialogueState::HandoffRequested);

        let r = reply(IntentId::Goodbye, Some(DialogueState::CollectingOrderDetails));
        assert!(r.clear_memory);
        assert!(!r.needs_human);
        assert_eq!(r.next_state, DialogueState::Ended);
    }

    #[test]
    fn test_order_status_awaits_reference() {
        let r = reply(IntentId::OrderStatus, None);
        assert_eq!(r.next_state, DialogueState::AwaitingOrderReference);
    }

    #[test]
    fn test_oracle_reply_replaces_fallback() {
        let r = non_order_reply(
            IntentId::Fallback,
            None,
            &Settings::default(),
            &Catalog::bundled().unwrap(),
            Some("¿Te refieres a una torta?"),
        );
        assert_eq!(r.reply, "¿Te refieres a una torta?");
    }
}
