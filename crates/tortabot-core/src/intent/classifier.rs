use super::{IntentId, IntentMatch};
use crate::dialogue::DialogueState;
use crate::text::{contains_keyword, normalize, words};

const CANCEL_KEYWORDS: &[&str] = &[
    "cancelar",
    "cancela",
    "olvidalo",
    "chao",
    "chau",
    "adios",
    "nos vemos",
    "hasta luego",
];

const CONFIRM_KEYWORDS: &[&str] = &[
    "confirmar",
    "confirmo",
    "listo",
    "ok",
    "si",
    "dale",
    "esta bien",
    "estaria bien",
    "correcto",
    "perfecto",
];

const CLOSING_KEYWORDS: &[&str] = &[
    "gracias",
    "muchas gracias",
    "chao",
    "chau",
    "adios",
    "nos vemos",
    "hasta luego",
];

const GREETING_KEYWORDS: &[&str] = &[
    "hola",
    "buenas",
    "buen dia",
    "buenos dias",
    "buenas tardes",
    "buenas noches",
];

const ORDER_KEYWORDS: &[&str] = &[
    "pedido",
    "orden",
    "comprar",
    "encargar",
    "encargo",
    "pedir",
    "quiero un",
    "quiero una",
    "hacer un pedido",
];

const STATUS_KEYWORDS: &[&str] = &[
    "estado de mi pedido",
    "mi pedido",
    "cuando llega",
    "seguimiento",
    "tracking",
];

const HOURS_KEYWORDS: &[&str] = &[
    "horario",
    "abren",
    "cierran",
    "a que hora",
    "atienden",
    "donde estan",
    "ubicacion",
    "ubicados",
    "sucursal",
];

const MENU_KEYWORDS: &[&str] = &[
    "menu",
    "carta",
    "productos",
    "lista de precios",
    "catalogo",
    "sabores",
    "variedades",
];

const MENU_CUES: &[&str] = &["que", "ver", "tienen", "cuales", "hay"];

const HANDOFF_KEYWORDS: &[&str] = &[
    "hablar con una persona",
    "hablar con un humano",
    "hablar con humano",
    "asesor",
    "ejecutivo",
    "persona real",
    "atencion al cliente",
    "encargado",
];

const SMALLTALK_KEYWORDS: &[&str] = &[
    "como estas",
    "que tal",
    "quien eres",
    "que haces",
    "como te llamas",
];

/// Classifies an utterance with ordered keyword rules; the first rule that
/// fires wins.
///
/// While an order is being collected every utterance stays in the order flow
/// unless it cancels or says goodbye. "gracias" alone is not a farewell there,
/// since "no gracias" answers the extras question.
pub fn classify(text: &str, previous_state: Option<DialogueState>) -> IntentMatch {
    let n = normalize(text);
    let has_any = |keywords: &[&str]| contains_keyword(&n, keywords);

    if previous_state == Some(DialogueState::CollectingOrderDetails) {
        if has_any(CANCEL_KEYWORDS) {
            return IntentMatch::new(IntentId::Goodbye, 0.95, "Cancellation inside the order flow");
        }
        if has_any(CONFIRM_KEYWORDS) {
            return IntentMatch::new(IntentId::OrderStart, 0.95, "Confirmation inside the order flow");
        }
        return IntentMatch::new(IntentId::OrderStart, 0.85, "Still collecting order details");
    }

    if has_any(CLOSING_KEYWORDS) {
        return IntentMatch::new(IntentId::Goodbye, 0.85, "Farewell keywords");
    }

    if has_any(GREETING_KEYWORDS) {
        return IntentMatch::new(IntentId::Greeting, 0.9, "Greeting keywords");
    }

    if has_any(ORDER_KEYWORDS) && !has_any(STATUS_KEYWORDS) {
        return IntentMatch::new(IntentId::OrderStart, 0.92, "Order keywords");
    }

    if has_any(STATUS_KEYWORDS) {
        return IntentMatch::new(IntentId::OrderStatus, 0.9, "Order status keywords");
    }

    if has_any(HOURS_KEYWORDS) {
        return IntentMatch::new(IntentId::FaqHours, 0.88, "Opening hours or location keywords");
    }

    let mentions_cake = words(&n).iter().any(|w| *w == "torta" || *w == "tortas");
    if has_any(MENU_KEYWORDS) || (mentions_cake && has_any(MENU_CUES)) {
        return IntentMatch::new(IntentId::FaqMenu, 0.93, "Menu or catalog question");
    }

    if has_any(HANDOFF_KEYWORDS) {
        return IntentMatch::new(IntentId::HandoffHuman, 0.95, "Customer asks for a person");
    }

    if has_any(SMALLTALK_KEYWORDS) {
        return IntentMatch::new(IntentId::Smalltalk, 0.7, "Smalltalk keywords");
    }

    IntentMatch::new(IntentId::Fallback, 0.3, "No rule matched")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(text: &str) -> IntentId {
        classify(text, None).id
    }

    #[test]
    fn test_top_level_rules() {
        assert_eq!(id("Hola!"), IntentId::Greeting);
        assert_eq!(id("Buenas tardes"), IntentId::Greeting);
        assert_eq!(id("muchas gracias, chao"), IntentId::Goodbye);
        assert_eq!(id("quiero una torta alpina"), IntentId::OrderStart);
        assert_eq!(id("quiero hacer un pedido"), IntentId::OrderStart);
        assert_eq!(id("¿cuál es el estado de mi pedido?"), IntentId::OrderStatus);
        assert_eq!(id("tracking 1234"), IntentId::OrderStatus);
        assert_eq!(id("¿A qué hora abren?"), IntentId::FaqHours);
        assert_eq!(id("¿Qué tortas tienen?"), IntentId::FaqMenu);
        assert_eq!(id("me mandas el menú"), IntentId::FaqMenu);
        assert_eq!(id("necesito un asesor"), IntentId::HandoffHuman);
        assert_eq!(id("¿cómo estás?"), IntentId::Smalltalk);
        assert_eq!(id("asdf"), IntentId::Fallback);
    }

    #[test]
    fn test_confidences() {
        assert_eq!(classify("hola", None).confidence, 0.9);
        assert_eq!(classify("quiero pedir", None).confidence, 0.92);
        assert_eq!(classify("qwerty", None).confidence, 0.3);
    }

    #[test]
    fn test_status_phrase_beats_order_keywords() {
        let m = classify("quiero saber de mi pedido", None);
        assert_eq!(m.id, IntentId::OrderStatus);
    }

    #[test]
    fn test_collecting_state_keeps_order_flow() {
        let state = Some(DialogueState::CollectingOrderDetails);

        let m = classify("sí, está bien", state);
        assert_eq!((m.id, m.confidence), (IntentId::OrderStart, 0.95));

        let m = classify("Av. Francia 1200", state);
        assert_eq!((m.id, m.confidence), (IntentId::OrderStart, 0.85));

        let m = classify("no gracias", state);
        assert_eq!(m.id, IntentId::OrderStart);

        let m = classify("mejor cancelar", state);
        assert_eq!((m.id, m.confidence), (IntentId::Goodbye, 0.95));
    }

    #[test]
    fn test_short_keywords_need_whole_words() {
        assert_eq!(classify("tokyo", Some(DialogueState::CollectingOrderDetails)).confidence, 0.85);
        assert_eq!(id("tortas veraniegas"), IntentId::Fallback);
    }
}
