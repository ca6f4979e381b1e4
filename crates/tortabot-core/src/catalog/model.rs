//! Catalog domain models.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// Product family, in menu display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumIter)]
pub enum Category {
    Bizcocho,
    Hojarasca,
    Porciones,
    Temporada,
}

impl Category {
    /// Heading used in menu summaries.
    pub fn title(&self) -> &'static str {
        match self {
            Category::Bizcocho => "Tortas de bizcocho",
            Category::Hojarasca => "Tortas de hojarasca / mil hojas",
            Category::Porciones => "Porciones individuales",
            Category::Temporada => "Tortas de temporada / especiales",
        }
    }
}

/// A size option of a product. The label carries the servings hint,
/// e.g. `Mediano (Ø 22 cm / 20–25p)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variant {
    pub id: String,
    pub label: String,
    pub price: u32,
}

/// An optional extra sold with a product (greeting card, candles).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Addon {
    pub id: String,
    pub label: String,
    pub price: u32,
}

/// A catalog entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub short_description: String,
    pub description: String,
    pub category: Category,
    /// Base price, used when the product has no variants.
    pub price: u32,
    /// Approximate number of servings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diameter_cm: Option<u32>,
    /// Image path relative to the public base URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub variants: Vec<Variant>,
    #[serde(default)]
    pub addons: Vec<Addon>,
}

fn default_available() -> bool {
    true
}
