//! Order drafting: the draft model, slot extraction and merging.

pub mod dates;
mod draft;
mod extract;
mod merger;
mod summary;

pub use draft::{DeliveryMode, Extras, OrderDraft};
pub use extract::{extract_delivery_mode, extract_headcount, is_confirmation, is_negation};
pub use merger::DraftMerger;
pub use summary::order_summary;
