//! The conversation-scoped order draft.

use std::fmt;

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::store::Store;

/// How the customer receives the cake. Only pickup is offered; delivery is
/// recorded so the dialogue can apologise and redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    Pickup,
    Delivery,
}

impl DeliveryMode {
    pub fn label(&self) -> &'static str {
        match self {
            DeliveryMode::Pickup => "retiro en local",
            DeliveryMode::Delivery => "delivery",
        }
    }
}

/// Answer to the extras question. `Nothing` means the customer declined,
/// which is different from not having been asked yet (`None` on the draft).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "detail")]
pub enum Extras {
    Nothing,
    Items(String),
}

impl fmt::Display for Extras {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extras::Nothing => write!(f, "Ninguno"),
            Extras::Items(text) => write!(f, "{text}"),
        }
    }
}

/// Slots accumulated across turns.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OrderDraft {
    /// Canonical catalog name, or an unresolved name awaiting correction.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headcount: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery_mode: Option<DeliveryMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store: Option<Store>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<NaiveTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extras: Option<Extras>,
    #[serde(default)]
    pub confirmed: bool,
}

impl OrderDraft {
    pub fn is_empty(&self) -> bool {
        *self == OrderDraft::default()
    }

    pub fn has_schedule(&self) -> bool {
        self.date.is_some() && self.time.is_some()
    }

    /// Every question before the confirmation has an answer.
    pub fn is_ready_for_confirmation(&self) -> bool {
        self.product.is_some()
            && self.headcount.is_some()
            && self.delivery_mode == Some(DeliveryMode::Pickup)
            && self.address.is_some()
            && self.store.is_some()
            && self.has_schedule()
            && self.extras.is_some()
    }
}
