//! Slot extractors over a single normalized utterance.

use once_cell::sync::Lazy;
use regex::Regex;

use super::dates::strip_date_time;
use super::draft::DeliveryMode;
use crate::text::{contains_keyword, words};

static HEADCOUNT_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b(\d{1,3})\b\s*(personas?|prs|pax)?").expect("valid headcount regex")
});

/// Plausible headcounts; larger numbers are years, prices or phone digits.
pub const HEADCOUNT_RANGE: std::ops::RangeInclusive<u32> = 1..=200;

const PICKUP_KEYWORDS: &[&str] = &["retiro", "retirar", "local", "tienda"];
const DELIVERY_KEYWORDS: &[&str] = &["delivery", "despacho", "envio", "enviar"];

const CONFIRMATION_KEYWORDS: &[&str] = &[
    "si",
    "ok",
    "listo",
    "dale",
    "bueno",
    "correcto",
    "perfecto",
    "confirmo",
    "confirmar",
    "esta bien",
];

const NEGATION_WORDS: &[&str] = &["no", "nada", "ninguno", "ninguna", "nop"];
const NEGATION_PHRASES: &[&str] = &["nada mas", "no gracias", "ningun", "sin extras"];

const ADDRESS_CUES: &[&str] = &[
    "av",
    "avenida",
    "calle",
    "pasaje",
    "condominio",
    "villa",
    "poblacion",
    "sector",
    "block",
    "depto",
];

const EXTRAS_KEYWORDS: &[&str] = &["vela", "mensaje", "tarjeta"];

/// A headcount mentioned outside date and time expressions.
///
/// A number followed by `personas`, `prs` or `pax` wins; otherwise the last
/// plausible bare number is used.
pub fn extract_headcount(normalized: &str) -> Option<u32> {
    let text = strip_date_time(normalized);
    let mut best: Option<u32> = None;
    for caps in HEADCOUNT_RE.captures_iter(&text) {
        let Ok(value) = caps[1].parse::<u32>() else {
            continue;
        };
        if !HEADCOUNT_RANGE.contains(&value) {
            continue;
        }
        if caps.get(2).is_some() {
            return Some(value);
        }
        best = Some(value);
    }
    best
}

/// A number explicitly followed by `personas`, `prs` or `pax`.
pub fn mentions_people(normalized: &str) -> bool {
    let text = strip_date_time(normalized);
    HEADCOUNT_RE.captures_iter(&text).any(|caps| caps.get(2).is_some())
}

/// Explicit pickup or delivery wording; pickup wins when both appear.
pub fn extract_delivery_mode(normalized: &str) -> Option<DeliveryMode> {
    if contains_keyword(normalized, PICKUP_KEYWORDS) {
        Some(DeliveryMode::Pickup)
    } else if contains_keyword(normalized, DELIVERY_KEYWORDS) {
        Some(DeliveryMode::Delivery)
    } else {
        None
    }
}

pub fn is_confirmation(normalized: &str) -> bool {
    contains_keyword(normalized, CONFIRMATION_KEYWORDS)
}

/// A declining answer: starts with a negation word or uses a declining phrase.
pub fn is_negation(normalized: &str) -> bool {
    words(normalized)
        .first()
        .is_some_and(|first| NEGATION_WORDS.contains(first))
        || contains_keyword(normalized, NEGATION_PHRASES)
}

pub fn has_address_cue(normalized: &str) -> bool {
    contains_keyword(normalized, ADDRESS_CUES)
}

pub fn mentions_extras(normalized: &str) -> bool {
    contains_keyword(normalized, EXTRAS_KEYWORDS)
}
