//! Product catalog: models, fuzzy matching, portion sizing and rendering.
//!
//! A [`Catalog`] is immutable once built and only ever holds available
//! products; unavailable entries are dropped at load time.

mod format;
pub(crate) mod matcher;
mod model;
mod portions;

pub use format::{format_clp, menu_summary, product_detail, render_portion_suggestions};
pub use model::{Addon, Category, Product, Variant};
pub use portions::{PortionItem, PortionSuggestion, ProductVariant, ServingsRange};

use crate::error::{BotError, Result};

const BUNDLED_CATALOG: &str = include_str!("../../data/catalog.json");

/// The set of products the assistant can sell.
#[derive(Debug, Clone)]
pub struct Catalog {
    products: Vec<Product>,
}

impl Catalog {
    /// Builds a catalog, keeping only available products in their given order.
    pub fn new(products: Vec<Product>) -> Self {
        let total = products.len();
        let products: Vec<Product> = products.into_iter().filter(|p| p.available).collect();
        tracing::debug!(
            total,
            available = products.len(),
            "Catalog loaded"
        );
        Self { products }
    }

    /// Parses a JSON array of products.
    pub fn from_json(json: &str) -> Result<Self> {
        let products: Vec<Product> = serde_json::from_str(json)?;
        if products.is_empty() {
            return Err(BotError::config("catalog contains no products"));
        }
        Ok(Self::new(products))
    }

    /// The catalog compiled into the binary.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_CATALOG)
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Looks a product up by its id.
    pub fn find_by_id(&self, id: &str) -> Result<&Product> {
        self.products
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| BotError::not_found("product", id))
    }

    /// Products of one category, in catalog order.
    pub fn by_category(&self, category: Category) -> impl Iterator<Item = &Product> {
        self.products.iter().filter(move |p| p.category == category)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bundled_catalog_loads() {
        let catalog = Catalog::bundled().unwrap();
        assert_eq!(catalog.len(), 18);
        assert_eq!(catalog.products()[0].name, "Torta Alpina");
        assert_eq!(catalog.by_category(Category::Hojarasca).count(), 3);
    }

    #[test]
    fn test_unavailable_products_are_dropped() {
        let json = r#"[
            {"id":"a","slug":"a","name":"Torta A","description":"x","category":"Bizcocho","price":1000,"available":false},
            {"id":"b","slug":"b","name":"Torta B","description":"y","category":"Temporada","price":2000}
        ]"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 1);
        assert!(catalog.find_by_id("a").unwrap_err().is_not_found());
        assert_eq!(catalog.find_by_id("b").unwrap().name, "Torta B");
    }

    #[test]
    fn test_empty_catalog_is_rejected() {
        let err = Catalog::from_json("[]").unwrap_err();
        assert!(matches!(err, BotError::Config(_)));
    }
}
