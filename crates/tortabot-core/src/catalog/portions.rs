//! Portion sizing: servings ranges per variant and headcount suggestions.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{Catalog, Product};
use crate::text::normalize;

static RANGE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*[-–a]\s*(\d+)\s*p").expect("valid range regex"));
static UP_TO_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"hasta\s+(\d+)\s*p").expect("valid up-to regex"));
static SINGLE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*p").expect("valid single regex"));

const DEFAULT_RANGE: ServingsRange = ServingsRange { min: 8, max: 12 };

/// Inclusive range of servings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServingsRange {
    pub min: u32,
    pub max: u32,
}

impl ServingsRange {
    fn midpoint(&self) -> f64 {
        (self.min as f64 + self.max as f64) / 2.0
    }

    fn from_yield(servings: u32) -> Self {
        let servings = servings as f64;
        Self {
            min: ((servings * 0.8).round() as u32).max(1),
            max: (servings * 1.1).round() as u32,
        }
    }
}

/// A sellable size of a product with its inferred servings range.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductVariant<'a> {
    pub product: &'a Product,
    /// `None` for variants synthesized from the product's yield.
    pub variant_id: Option<String>,
    pub label: String,
    pub price: u32,
    pub servings: ServingsRange,
}

/// One line of a suggestion: `quantity` units of a variant.
#[derive(Debug, Clone, PartialEq)]
pub struct PortionItem<'a> {
    pub variant: ProductVariant<'a>,
    pub quantity: u32,
}

/// A way to serve a headcount, with aggregate servings and price.
#[derive(Debug, Clone, PartialEq)]
pub struct PortionSuggestion<'a> {
    pub items: Vec<PortionItem<'a>>,
    pub servings: ServingsRange,
    pub total_price: u32,
}

/// Extracts a servings range from a variant label.
///
/// Understands `10-15p`, `14–16p`, `10 a 15p`, `hasta 12p` and `15p`.
pub fn parse_servings_range(label: &str) -> Option<ServingsRange> {
    let clean = normalize(label);

    if let Some(caps) = RANGE_RE.captures(&clean) {
        let min = caps[1].parse::<u32>().ok();
        let max = caps[2].parse::<u32>().ok();
        if let (Some(min), Some(max)) = (min, max) {
            if min > 0 && max >= min {
                return Some(ServingsRange { min, max });
            }
        }
    }

    if let Some(caps) = UP_TO_RE.captures(&clean) {
        if let Ok(max) = caps[1].parse::<u32>() {
            if max > 0 {
                return Some(ServingsRange {
                    min: max.saturating_sub(4).max(1),
                    max,
                });
            }
        }
    }

    if let Some(caps) = SINGLE_RE.captures(&clean) {
        if let Ok(n) = caps[1].parse::<u32>() {
            if n > 0 {
                return Some(ServingsRange {
                    min: n.saturating_sub(2).max(1),
                    max: n.saturating_add(2),
                });
            }
        }
    }

    None
}

fn variants_of(product: &Product) -> Vec<ProductVariant<'_>> {
    if product.variants.is_empty() {
        return match product.servings {
            Some(servings) if servings > 0 => vec![ProductVariant {
                product,
                variant_id: None,
                label: format!("{servings} personas aprox."),
                price: product.price,
                servings: ServingsRange::from_yield(servings),
            }],
            _ => Vec::new(),
        };
    }

    product
        .variants
        .iter()
        .map(|variant| {
            let servings = parse_servings_range(&variant.label)
                .or_else(|| product.servings.map(ServingsRange::from_yield))
                .unwrap_or(DEFAULT_RANGE);
            ProductVariant {
                product,
                variant_id: Some(variant.id.clone()),
                label: variant.label.clone(),
                price: variant.price,
                servings,
            }
        })
        .collect()
}

impl Catalog {
    /// Every sellable variant in catalog order.
    pub fn build_variants(&self) -> Vec<ProductVariant<'_>> {
        self.products().iter().flat_map(variants_of).collect()
    }

    /// The variant of `product` whose servings midpoint is closest to `headcount`.
    ///
    /// Ties keep the first variant. Returns `None` for a zero headcount or a
    /// product with no sizable variants.
    pub fn select_for_headcount<'a>(
        &'a self,
        product: &'a Product,
        headcount: u32,
    ) -> Option<ProductVariant<'a>> {
        if headcount == 0 {
            return None;
        }
        let target = headcount as f64;
        let mut best: Option<(ProductVariant<'a>, f64)> = None;
        for variant in variants_of(product) {
            let diff = (variant.servings.midpoint() - target).abs();
            if best.as_ref().is_none_or(|(_, d)| diff < *d) {
                best = Some((variant, diff));
            }
        }
        best.map(|(variant, _)| variant)
    }

    /// Ranks single-variant combinations that serve at least `headcount`.
    ///
    /// Each variant is multiplied up to cover the headcount; candidates are
    /// ordered by the least overservice, then the lowest total price. A
    /// candidate whose totals do not fit in `u32` is left out.
    pub fn suggest_combinations(&self, headcount: u32, max_results: usize) -> Vec<PortionSuggestion<'_>> {
        if headcount == 0 {
            return Vec::new();
        }

        let mut suggestions: Vec<PortionSuggestion<'_>> = self
            .build_variants()
            .into_iter()
            .filter(|v| v.servings.max > 0)
            .filter_map(|variant| {
                let quantity = headcount.div_ceil(variant.servings.max);
                let servings = ServingsRange {
                    min: variant.servings.min.checked_mul(quantity)?,
                    max: variant.servings.max.checked_mul(quantity)?,
                };
                if servings.max < headcount {
                    return None;
                }
                let total_price = variant.price.checked_mul(quantity)?;
                Some(PortionSuggestion {
                    items: vec![PortionItem { variant, quantity }],
                    servings,
                    total_price,
                })
            })
            .collect();

        let h = headcount as i64;
        suggestions.sort_by_key(|s| (s.servings.min as i64 - h, s.total_price));
        suggestions.truncate(max_results);
        suggestions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::bundled().unwrap()
    }

    #[test]
    fn test_parse_servings_range_variants() {
        assert_eq!(
            parse_servings_range("Chico (Ø 20 cm / 10-15p)"),
            Some(ServingsRange { min: 10, max: 15 })
        );
        assert_eq!(
            parse_servings_range("Mediano (Ø 22 cm / 14–16p)"),
            Some(ServingsRange { min: 14, max: 16 })
        );
        assert_eq!(
            parse_servings_range("Familiar 10 a 12p"),
            Some(ServingsRange { min: 10, max: 12 })
        );
        assert_eq!(
            parse_servings_range("Hasta 12p"),
            Some(ServingsRange { min: 8, max: 12 })
        );
        assert_eq!(
            parse_servings_range("Individual 2p"),
            Some(ServingsRange { min: 1, max: 4 })
        );
        assert_eq!(parse_servings_range("Tamaño único"), None);
    }

    #[test]
    fn test_yield_fallback_and_synthesized_variant() {
        let json = r#"[
            {"id":"p1","slug":"p1","name":"Kuchen Nuez","description":"x","category":"Temporada","price":9000,"servings":10},
            {"id":"p2","slug":"p2","name":"Torta Sin Rango","description":"y","category":"Temporada","price":9000,
             "variants":[{"id":"u","label":"Única","price":9000}]}
        ]"#;
        let catalog = Catalog::from_json(json).unwrap();
        let variants = catalog.build_variants();
        assert_eq!(variants.len(), 2);
        assert_eq!(variants[0].label, "10 personas aprox.");
        assert_eq!(variants[0].variant_id, None);
        assert_eq!(variants[0].servings, ServingsRange { min: 8, max: 11 });
        assert_eq!(variants[1].servings, ServingsRange { min: 8, max: 12 });
    }

    #[test]
    fn test_select_for_headcount_uses_midpoint() {
        let catalog = catalog();
        let alpina = catalog.match_text("Torta Alpina").unwrap();
        assert_eq!(catalog.select_for_headcount(alpina, 12).unwrap().variant_id.as_deref(), Some("ch"));
        assert_eq!(catalog.select_for_headcount(alpina, 15).unwrap().variant_id.as_deref(), Some("md"));
        assert_eq!(catalog.select_for_headcount(alpina, 25).unwrap().variant_id.as_deref(), Some("gr"));
        assert!(catalog.select_for_headcount(alpina, 0).is_none());
    }

    #[test]
    fn test_suggestions_cover_headcount_and_are_sorted() {
        let catalog = catalog();
        for headcount in [1, 7, 15, 20, 33, 64, 150] {
            let suggestions = catalog.suggest_combinations(headcount, 10);
            assert!(!suggestions.is_empty());
            for s in &suggestions {
                assert!(s.servings.max >= headcount, "h={headcount}");
            }
            for pair in suggestions.windows(2) {
                let a = (pair[0].servings.min as i64 - headcount as i64, pair[0].total_price);
                let b = (pair[1].servings.min as i64 - headcount as i64, pair[1].total_price);
                assert!(a <= b, "unsorted for h={headcount}");
            }
        }
    }

    #[test]
    fn test_suggestions_for_twenty() {
        let catalog = catalog();
        let suggestions = catalog.suggest_combinations(20, 3);
        assert_eq!(suggestions.len(), 3);
        let first = &suggestions[0];
        assert_eq!(first.items[0].variant.product.name, "Torta de Chocolate");
        assert_eq!(first.items[0].quantity, 1);
        assert_eq!(first.servings, ServingsRange { min: 20, max: 25 });
        assert_eq!(first.total_price, 27500);
    }

    #[test]
    fn test_huge_headcount_drops_overflowing_candidates() {
        let catalog = catalog();
        for headcount in [1_000_000_000, u32::MAX] {
            let suggestions = catalog.suggest_combinations(headcount, 3);
            assert!(suggestions.iter().all(|s| s.servings.max >= headcount));
        }
        assert_eq!(
            parse_servings_range("4294967295p"),
            Some(ServingsRange { min: 4294967293, max: u32::MAX })
        );
    }

    #[test]
    fn test_zero_headcount_yields_nothing() {
        assert!(catalog().suggest_combinations(0, 3).is_empty());
    }
}
