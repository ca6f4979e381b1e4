//! Slot-filling state machine for the order flow.

use super::DialogueState;
use crate::catalog::{
    format_clp, menu_summary, product_detail, render_portion_suggestions, Catalog, Product,
};
use crate::conversation::MediaAttachment;
use crate::order::{order_summary, DeliveryMode, OrderDraft};
use crate::settings::Settings;
use crate::store::StoreLocator;

/// Result of advancing the order flow by one turn.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderStep {
    pub reply: String,
    pub draft: OrderDraft,
    pub next_state: DialogueState,
    pub needs_human: bool,
    pub media: Vec<MediaAttachment>,
    pub clear_memory: bool,
}

impl OrderStep {
    fn ask(reply: impl Into<String>, draft: OrderDraft) -> Self {
        Self {
            reply: reply.into(),
            draft,
            next_state: DialogueState::CollectingOrderDetails,
            needs_human: false,
            media: Vec::new(),
            clear_memory: false,
        }
    }
}

/// Asks for the first missing slot of a draft, or hands a complete order to
/// staff.
pub struct OrderFlow<'a> {
    catalog: &'a Catalog,
    locator: &'a StoreLocator,
    settings: &'a Settings,
}

impl<'a> OrderFlow<'a> {
    pub fn new(catalog: &'a Catalog, locator: &'a StoreLocator, settings: &'a Settings) -> Self {
        Self {
            catalog,
            locator,
            settings,
        }
    }

    /// Advances the flow for `draft`.
    ///
    /// `intro` is an optional conversational opener (usually the oracle's
    /// generated reply) used in place of the canned one on the first steps.
    pub async fn advance(&self, mut draft: OrderDraft, intro: Option<&str>) -> OrderStep {
        if !self.settings.orders.allow_orders {
            return OrderStep {
                reply: self.settings.messages.handoff.clone(),
                draft,
                next_state: DialogueState::HandoffRequested,
                needs_human: true,
                media: Vec::new(),
                clear_memory: false,
            };
        }

        let mut announcement = None;
        if self.needs_store(&draft) {
            if let Some(address) = draft.address.clone() {
                let store = self.locator.nearest_store(&address).await;
                announcement = Some(format!(
                    "¡Listo! 🗺️\n\nSegún tu ubicación en *\"{}\"*, la sucursal más cercana es:\n📍 *{}* ({}).",
                    address, store.name, store.address
                ));
                draft.store = Some(store);
            }
        }

        let mut step = self.next_step(draft, intro);
        if let Some(announcement) = announcement {
            step.reply = format!("{announcement}\n\n{}", step.reply);
        }
        step
    }

    /// Store resolution is due once everything before it is settled.
    fn needs_store(&self, draft: &OrderDraft) -> bool {
        draft
            .product
            .as_deref()
            .is_some_and(|name| self.catalog.match_text(name).is_some())
            && draft.headcount.is_some()
            && draft.delivery_mode == Some(DeliveryMode::Pickup)
            && draft.address.is_some()
            && draft.store.is_none()
    }

    fn next_step(&self, mut draft: OrderDraft, intro: Option<&str>) -> OrderStep {
        let product = match draft.product.as_deref() {
            Some(name) => match self.catalog.match_text(name) {
                Some(product) => product,
                None => return self.unknown_product(draft),
            },
            None => return self.ask_product(draft, intro),
        };

        let Some(headcount) = draft.headcount else {
            return self.ask_headcount(product, draft, intro);
        };

        match draft.delivery_mode {
            Some(DeliveryMode::Delivery) => {
                draft.delivery_mode = None;
                return OrderStep::ask(
                    "Lo siento mucho 😔. Por el momento *no contamos con servicio de delivery*, solo retiro en nuestros locales.\n\n¿Te acomoda cambiar tu pedido a *retiro en local*?",
                    draft,
                );
            }
            None => return self.offer_pickup(product, headcount, draft, intro),
            Some(DeliveryMode::Pickup) => {}
        }

        if draft.address.is_none() {
            return OrderStep::ask(
                "Perfecto, retiro en local ✅\n¿En qué sector o dirección te encuentras? Así calculo cuál sucursal te queda más cerca.",
                draft,
            );
        }

        match (draft.date, draft.time) {
            (None, None) => {
                return OrderStep::ask(
                    "¿Para qué día y a qué hora pasarías a retirar tu pedido?",
                    draft,
                );
            }
            (Some(date), None) => {
                return OrderStep::ask(
                    format!(
                        "Anotado para el *{}* 🗓️. ¿A qué hora pasarías a retirarlo?",
                        date.format("%d-%m-%Y")
                    ),
                    draft,
                );
            }
            (None, Some(time)) => {
                return OrderStep::ask(
                    format!(
                        "Anotado a las *{}* 🕒. ¿Para qué día sería?",
                        time.format("%H:%M")
                    ),
                    draft,
                );
            }
            (Some(_), Some(_)) => {}
        }

        if draft.extras.is_none() {
            return OrderStep::ask(
                "Anotado 🗓️.\n¿Quieres agregar algo más? (velas, mensaje, etc.)",
                draft,
            );
        }

        if !draft.confirmed {
            if self.settings.orders.require_confirmation {
                let reply = format!(
                    "Este sería tu pedido:\n{}\n\n¿Está bien así para confirmar?",
                    order_summary(&draft)
                );
                return OrderStep::ask(reply, draft);
            }
            draft.confirmed = true;
        }

        tracing::info!(product = %product.name, headcount, "Order confirmed, handing off");
        OrderStep {
            reply: format!(
                "¡Excelente! 🙌 Derivo tu pedido al equipo.\n\n{}\n\n¡Gracias! Ahora una persona del equipo se contactará contigo para confirmar tu pedido. ¡Hasta luego!",
                order_summary(&draft)
            ),
            draft,
            next_state: DialogueState::HandoffRequested,
            needs_human: true,
            media: Vec::new(),
            clear_memory: true,
        }
    }

    fn unknown_product(&self, mut draft: OrderDraft) -> OrderStep {
        let name = draft.product.take().unwrap_or_default();
        tracing::debug!(product = %name, "Draft product not in catalog");
        let menu = menu_summary(self.catalog, self.settings.engine.menu_excerpt_size);
        OrderStep::ask(
            format!(
                "Mmm... lo siento 😅, pero no encuentro una torta llamada *\"{name}\"* en nuestro catálogo.\n\nAquí tienes algunas opciones disponibles:\n\n{menu}\n\n¿Te gustaría alguna de estas?"
            ),
            draft,
        )
    }

    fn ask_product(&self, draft: OrderDraft, intro: Option<&str>) -> OrderStep {
        if let Some(headcount) = draft.headcount {
            let suggestions = self
                .catalog
                .suggest_combinations(headcount, self.settings.engine.max_portion_suggestions);
            let text = render_portion_suggestions(headcount, &suggestions);
            let intro = intro.map(|i| format!("{i}\n\n")).unwrap_or_default();
            return OrderStep::ask(
                format!("{intro}{text}\n\nSi prefieres una torta específica, dime el nombre."),
                draft,
            );
        }

        let opener = intro.unwrap_or("¡Claro! 😊 Cuéntame qué torta te gustaría encargar.");
        OrderStep::ask(
            format!("{opener}\nPor ejemplo: \"Torta Alpina\" o \"Torta Mil Hojas\"."),
            draft,
        )
    }

    fn ask_headcount(&self, product: &Product, draft: OrderDraft, intro: Option<&str>) -> OrderStep {
        let opener = intro
            .map(str::to_string)
            .unwrap_or_else(|| format!("Perfecto, aquí tienes la información de *{}* 🍰", product.name));
        let mut step = OrderStep::ask(
            format!(
                "{opener}\n\n{}\n\n¿Para cuántas personas sería aproximadamente?",
                product_detail(product)
            ),
            draft,
        );
        if let Some(image) = &product.image {
            step.media
                .push(MediaAttachment::image(self.settings.image_url(image), product.name.clone()));
        }
        step
    }

    fn offer_pickup(
        &self,
        product: &Product,
        headcount: u32,
        mut draft: OrderDraft,
        intro: Option<&str>,
    ) -> OrderStep {
        let size_hint = self
            .catalog
            .select_for_headcount(product, headcount)
            .filter(|v| v.variant_id.is_some())
            .map(|v| {
                format!(
                    "\nPara *{headcount}* personas te recomiendo el tamaño *{}* ({}).",
                    v.label,
                    format_clp(v.price)
                )
            })
            .unwrap_or_default();
        let opener = intro
            .map(str::to_string)
            .unwrap_or_else(|| format!("Genial, *{}* para *{headcount}* personas 🥳", product.name));

        draft.delivery_mode = Some(DeliveryMode::Pickup);
        OrderStep::ask(
            format!(
                "{opener}{size_hint}\n\nTe cuento que por ahora *solo realizamos retiro en local* 🏪.\n\n¿En qué sector o dirección te encuentras? Así calculo qué sucursal te queda más cerca."
            ),
            draft,
        )
    }
}
