//! Business settings consumed by the conversation engine.
//!
//! Every field has a serde default so a partial `settings.toml` (or none at
//! all) still yields a complete configuration.

use serde::{Deserialize, Serialize};

/// Top-level business settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_business_name")]
    pub business_name: String,
    #[serde(default)]
    pub hours: BusinessHours,
    #[serde(default)]
    pub messages: Messages,
    #[serde(default)]
    pub orders: OrderSettings,
    /// Base URL that product image paths are appended to.
    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
    #[serde(default)]
    pub engine: EngineSettings,
}

fn default_business_name() -> String {
    "Delicias Porteñas".to_string()
}

fn default_public_base_url() -> String {
    "https://ccsolutions-bot.vercel.app".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            business_name: default_business_name(),
            hours: BusinessHours::default(),
            messages: Messages::default(),
            orders: OrderSettings::default(),
            public_base_url: default_public_base_url(),
            engine: EngineSettings::default(),
        }
    }
}

impl Settings {
    /// Builds an absolute URL for a product image path.
    ///
    /// `tortas/bizcocho/tortaAlpina2.webp` becomes
    /// `<public_base_url>/tortas/bizcocho/tortaAlpina2.webp`.
    pub fn image_url(&self, relative_path: &str) -> String {
        let base = self.public_base_url.trim_end_matches('/');
        if relative_path.starts_with('/') {
            format!("{base}{relative_path}")
        } else {
            format!("{base}/{relative_path}")
        }
    }
}

/// Opening hours shown for `faq_hours`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusinessHours {
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_weekdays")]
    pub weekdays: String,
    #[serde(default = "default_saturday")]
    pub saturday: String,
    #[serde(default = "default_sunday")]
    pub sunday: String,
}

fn default_timezone() -> String {
    "America/Santiago".to_string()
}

fn default_weekdays() -> String {
    "10:00 – 19:00".to_string()
}

fn default_saturday() -> String {
    "10:00 – 14:00".to_string()
}

fn default_sunday() -> String {
    "Según disponibilidad, consultar por WhatsApp.".to_string()
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            timezone: default_timezone(),
            weekdays: default_weekdays(),
            saturday: default_saturday(),
            sunday: default_sunday(),
        }
    }
}

/// Canned customer-facing messages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Messages {
    #[serde(default = "default_welcome")]
    pub welcome: String,
    #[serde(default = "default_inactivity")]
    pub inactivity: String,
    #[serde(default = "default_handoff")]
    pub handoff: String,
    #[serde(default = "default_closing")]
    pub closing: String,
}

fn default_welcome() -> String {
    "¡Hola! 👋 Soy el asistente automático. Puedo ayudarte a hacer pedidos, ver horarios y hablar con una persona del equipo.".to_string()
}

fn default_inactivity() -> String {
    "Sigo por aquí 😊 Si todavía necesitas ayuda, puedes escribirme tu consulta o pedido."
        .to_string()
}

fn default_handoff() -> String {
    "Derivaré tu consulta a una persona del equipo 👤. Te responderán lo antes posible."
        .to_string()
}

fn default_closing() -> String {
    "Gracias por escribirnos 🙌 Si más adelante necesitas algo, puedes volver a hablarme cuando quieras.".to_string()
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            welcome: default_welcome(),
            inactivity: default_inactivity(),
            handoff: default_handoff(),
            closing: default_closing(),
        }
    }
}

/// Order-taking toggles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderSettings {
    /// When false the order flow escalates straight to a human.
    #[serde(default = "default_true")]
    pub allow_orders: bool,
    /// When false a complete draft is confirmed without asking.
    #[serde(default = "default_true")]
    pub require_confirmation: bool,
}

fn default_true() -> bool {
    true
}

impl Default for OrderSettings {
    fn default() -> Self {
        Self {
            allow_orders: true,
            require_confirmation: true,
        }
    }
}

/// Tuning knobs for the engine and the session controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Rule confidence at or above which the NLU oracle is skipped.
    #[serde(default = "default_oracle_bypass_confidence")]
    pub oracle_bypass_confidence: f32,
    /// Number of history items sent to the NLU oracle.
    #[serde(default = "default_history_window")]
    pub history_window: usize,
    /// Number of history items kept in the conversation record.
    #[serde(default = "default_history_retention")]
    pub history_retention: usize,
    /// Inactivity after which ephemeral slots are dropped.
    #[serde(default = "default_session_timeout_secs")]
    pub session_timeout_secs: u64,
    #[serde(default = "default_max_portion_suggestions")]
    pub max_portion_suggestions: usize,
    /// Products per category in the menu excerpt shown after a bad product name.
    #[serde(default = "default_menu_excerpt_size")]
    pub menu_excerpt_size: usize,
    /// Products per category in the full `faq_menu` reply.
    #[serde(default = "default_menu_summary_size")]
    pub menu_summary_size: usize,
}

fn default_oracle_bypass_confidence() -> f32 {
    0.9
}

fn default_history_window() -> usize {
    15
}

fn default_history_retention() -> usize {
    40
}

fn default_session_timeout_secs() -> u64 {
    300
}

fn default_max_portion_suggestions() -> usize {
    3
}

fn default_menu_excerpt_size() -> usize {
    3
}

fn default_menu_summary_size() -> usize {
    4
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            oracle_bypass_confidence: default_oracle_bypass_confidence(),
            history_window: default_history_window(),
            history_retention: default_history_retention(),
            session_timeout_secs: default_session_timeout_secs(),
            max_portion_suggestions: default_max_portion_suggestions(),
            menu_excerpt_size: default_menu_excerpt_size(),
            menu_summary_size: default_menu_summary_size(),
        }
    }
}
