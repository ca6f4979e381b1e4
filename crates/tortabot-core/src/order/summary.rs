use super::draft::OrderDraft;

/// Bullet list of the slots filled so far.
pub fn order_summary(draft: &OrderDraft) -> String {
    let mut lines = Vec::new();
    if let Some(product) = &draft.product {
        lines.push(format!("• Producto: *{product}*"));
    }
    if let Some(headcount) = draft.headcount {
        lines.push(format!("• Para: *{headcount}* personas"));
    }
    if let Some(mode) = draft.delivery_mode {
        lines.push(format!("• Modalidad: *{}*", mode.label()));
    }
    if let Some(address) = &draft.address {
        lines.push(format!("• Dirección: *{address}*"));
    }
    if let Some(store) = &draft.store {
        lines.push(format!("• Sucursal: *{}*", store.name));
    }
    if let Some(date) = draft.date {
        lines.push(format!("• Fecha: *{}*", date.format("%d-%m-%Y")));
    }
    if let Some(time) = draft.time {
        lines.push(format!("• Hora: *{}*", time.format("%H:%M")));
    }
    if let Some(extras) = &draft.extras {
        lines.push(format!("• Extras: *{extras}*"));
    }
    lines.join("\n")
}
