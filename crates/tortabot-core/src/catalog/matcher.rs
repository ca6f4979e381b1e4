//! Fuzzy lookup of free text against the catalog.

use super::{Catalog, Product};
use crate::text::{levenshtein, normalize, words};

/// Filler words ignored when scoring tokens.
pub(crate) const STOP_WORDS: &[&str] = &[
    "torta", "tortas", "pastel", "kuchen", "pie", "de", "con", "el", "la", "los", "las", "un",
    "una", "del", "quiero", "pedir", "comprar", "necesito", "hay", "tienen", "hola", "buenas",
    "para", "personas", "pax", "prs",
];

const MIN_TOKEN_LEN: usize = 3;
const MIN_SCORE: u32 = 2;
const MAX_FUZZY_DISTANCE: usize = 2;

/// Tokens of normalized text that carry meaning for product lookup.
pub(crate) fn significant_tokens(normalized: &str) -> Vec<&str> {
    words(normalized)
        .into_iter()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN && !STOP_WORDS.contains(t))
        .collect()
}

impl Catalog {
    /// Resolves free text to a product.
    ///
    /// Strategies are tried in order and the first hit wins:
    /// 1. exact normalized name
    /// 2. normalized name containing the input (needs a significant token)
    /// 3. exact normalized slug
    /// 4. token overlap scoring with a minimum score of 2
    pub fn match_text(&self, text: &str) -> Option<&Product> {
        let input = normalize(text);
        if input.is_empty() {
            return None;
        }

        if let Some(p) = self.products().iter().find(|p| normalize(&p.name) == input) {
            return Some(p);
        }

        let tokens = significant_tokens(&input);

        if !tokens.is_empty() {
            if let Some(p) = self
                .products()
                .iter()
                .find(|p| normalize(&p.name).contains(&input))
            {
                return Some(p);
            }
        }

        if let Some(p) = self.products().iter().find(|p| normalize(&p.slug) == input) {
            return Some(p);
        }

        if tokens.is_empty() {
            return None;
        }

        let mut best: Option<(&Product, u32)> = None;
        for product in self.products() {
            let name = normalize(&product.name);
            let target = format!(
                "{} {} {}",
                name,
                normalize(&product.description),
                normalize(&product.slug)
            );

            let score: u32 = tokens
                .iter()
                .map(|token| {
                    if target.contains(token) {
                        if name.contains(token) { 5 } else { 2 }
                    } else if levenshtein(token, &name) <= MAX_FUZZY_DISTANCE {
                        1
                    } else {
                        0
                    }
                })
                .sum();

            if best.is_none_or(|(_, s)| score > s) {
                best = Some((product, score));
            }
        }

        match best {
            Some((product, score)) if score >= MIN_SCORE => {
                tracing::debug!(input = %input, product = %product.name, score, "Catalog token match");
                Some(product)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> Catalog {
        Catalog::bundled().unwrap()
    }

    #[test]
    fn test_exact_name_always_matches() {
        let catalog = catalog();
        for product in catalog.products() {
            let found = catalog.match_text(&product.name).unwrap();
            assert_eq!(found.id, product.id);
            let found = catalog.match_text(&product.name.to_uppercase()).unwrap();
            assert_eq!(found.id, product.id);
        }
    }

    #[test]
    fn test_stop_word_alone_matches_nothing() {
        let catalog = catalog();
        assert!(catalog.match_text("torta").is_none());
        assert!(catalog.match_text("quiero una torta").is_none());
        assert!(catalog.match_text("   ").is_none());
    }

    #[test]
    fn test_gibberish_matches_nothing() {
        let catalog = catalog();
        assert!(catalog.match_text("xyzzy qwrtp").is_none());
        assert!(catalog.match_text("mango").is_none());
    }

    #[test]
    fn test_partial_name_and_slug() {
        let catalog = catalog();
        assert_eq!(catalog.match_text("selva negra").unwrap().name, "Torta Selva Negra");
        assert_eq!(catalog.match_text("torta-moka").unwrap().name, "Torta Moka");
        assert_eq!(catalog.match_text("mani").unwrap().name, "Torta Maní");
    }

    #[test]
    fn test_token_scoring_prefers_name_hits() {
        let catalog = catalog();
        assert_eq!(
            catalog.match_text("quiero una torta alpina").unwrap().name,
            "Torta Alpina"
        );
        assert_eq!(
            catalog.match_text("una de chocolate para el sábado").unwrap().name,
            "Torta de Chocolate"
        );
    }

    #[test]
    fn test_significant_tokens_filters_stop_words() {
        assert_eq!(significant_tokens("quiero una torta de mani"), vec!["mani"]);
        assert!(significant_tokens("para 20 personas").is_empty());
    }
}
