//! Customer-facing rendering of catalog data.

use strum::IntoEnumIterator;

use super::{Catalog, Category, PortionSuggestion, Product};

/// Formats an amount as Chilean pesos: `18500` → `$18.500`.
pub fn format_clp(amount: u32) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    format!("${grouped}")
}

fn short_sizes(product: &Product) -> String {
    match product.variants.first() {
        Some(first) => {
            let size = first.label.split('/').next().unwrap_or(&first.label).trim();
            format!("{} desde {}", size, format_clp(first.price))
        }
        None => match product.servings {
            Some(servings) => format!("{} aprox. {} personas", format_clp(product.price), servings),
            None => format_clp(product.price),
        },
    }
}

/// Menu overview: up to `limit_per_category` products per category.
pub fn menu_summary(catalog: &Catalog, limit_per_category: usize) -> String {
    Category::iter()
        .filter_map(|category| {
            let lines: Vec<String> = catalog
                .by_category(category)
                .take(limit_per_category)
                .map(|p| format!("• {} – {}", p.name, short_sizes(p)))
                .collect();
            if lines.is_empty() {
                None
            } else {
                Some(format!("🍰 {}\n{}", category.title(), lines.join("\n")))
            }
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Product card with description, sizes and add-ons.
pub fn product_detail(product: &Product) -> String {
    let mut out = format!("*{}*\n{}", product.name, product.description);
    if let Some(servings) = product.servings {
        out.push_str(&format!("\nRinde aprox. *{servings} personas*."));
    }
    if let Some(diameter) = product.diameter_cm {
        out.push_str(&format!("\nDiámetro aprox.: *{diameter} cm*."));
    }

    if product.variants.is_empty() {
        out.push_str(&format!("\n\nPrecio: {}", format_clp(product.price)));
    } else {
        out.push_str("\n\n*Tamaños disponibles:*");
        for v in &product.variants {
            out.push_str(&format!("\n• {}: {}", v.label, format_clp(v.price)));
        }
    }

    if !product.addons.is_empty() {
        out.push_str("\n\n*Extras opcionales:*");
        for a in &product.addons {
            out.push_str(&format!("\n• {}: {}", a.label, format_clp(a.price)));
        }
    }

    out.push_str("\n\nSi quieres, dime para cuántas personas y la fecha, y seguimos con tu pedido.");
    out
}

/// Numbered list of portion suggestions, or a pointer to a human when empty.
pub fn render_portion_suggestions(headcount: u32, suggestions: &[PortionSuggestion<'_>]) -> String {
    if suggestions.is_empty() {
        return format!(
            "No tengo una combinación clara de tortas para *{headcount}* personas. Te recomiendo hablar con una persona del equipo para que te asesore mejor 🧁"
        );
    }

    let mut parts = vec![
        format!(
            "No tengo una sola torta exacta para *{headcount}* personas, pero estas opciones se ajustan bastante:"
        ),
        String::new(),
    ];

    for (idx, suggestion) in suggestions.iter().enumerate() {
        let products = suggestion
            .items
            .iter()
            .map(|item| {
                let name = format!("{} - {}", item.variant.product.name, item.variant.label);
                if item.quantity == 1 {
                    name
                } else {
                    format!("{}× {}", item.quantity, name)
                }
            })
            .collect::<Vec<_>>()
            .join(" + ");
        parts.push(format!(
            "{}. {}\n   → Rinde: {}–{} personas aprox.\n   → Total aprox.: {}",
            idx + 1,
            products,
            suggestion.servings.min,
            suggestion.servings.max,
            format_clp(suggestion.total_price)
        ));
    }

    parts.push(
        "\nSi te gusta alguna opción, dime el número (1, 2, 3...) o escríbeme qué prefieres y seguimos con el pedido."
            .to_string(),
    );
    parts.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_clp() {
        assert_eq!(format_clp(0), "$0");
        assert_eq!(format_clp(950), "$950");
        assert_eq!(format_clp(1500), "$1.500");
        assert_eq!(format_clp(18500), "$18.500");
        assert_eq!(format_clp(1234567), "$1.234.567");
    }

    #[test]
    fn test_menu_summary_groups_by_category() {
        let catalog = Catalog::bundled().unwrap();
        let menu = menu_summary(&catalog, 3);
        assert!(menu.starts_with("🍰 Tortas de bizcocho\n• Torta Alpina – Chico (Ø 20 cm desde $18.500"));
        assert!(menu.contains("🍰 Tortas de hojarasca / mil hojas"));
        assert!(!menu.contains("Porciones individuales"));
        assert_eq!(menu.matches('•').count(), 6);
    }

    #[test]
    fn test_product_detail_lists_sizes_and_addons() {
        let catalog = Catalog::bundled().unwrap();
        let detail = product_detail(catalog.match_text("Torta Mil Hojas").unwrap());
        assert!(detail.starts_with("*Torta Mil Hojas*"));
        assert!(detail.contains("*Tamaños disponibles:*"));
        assert!(detail.contains("• Tarjeta de saludo: $1.500"));
    }

    #[test]
    fn test_render_empty_suggestions_recommends_human() {
        let text = render_portion_suggestions(500, &[]);
        assert!(text.contains("*500*"));
        assert!(text.contains("persona del equipo"));
    }

    #[test]
    fn test_render_suggestions_numbered() {
        let catalog = Catalog::bundled().unwrap();
        let suggestions = catalog.suggest_combinations(40, 2);
        let text = render_portion_suggestions(40, &suggestions);
        assert!(text.contains("1. "));
        assert!(text.contains("2. "));
        assert!(text.contains("→ Total aprox.:"));
    }
}
