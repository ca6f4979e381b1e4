//! Folds one utterance and the oracle's slots into the draft.

use chrono::NaiveDate;

use super::dates::{parse_date, parse_time};
use super::draft::{DeliveryMode, Extras, OrderDraft};
use super::extract::{
    extract_delivery_mode, extract_headcount, has_address_cue, is_confirmation, is_negation,
    mentions_extras, mentions_people, HEADCOUNT_RANGE,
};
use crate::catalog::Catalog;
use crate::catalog::matcher::significant_tokens;
use crate::nlu::OracleSlots;
use crate::text::{normalize, words};

/// Minimum length of a token that can ground an oracle product in the utterance.
const GROUNDING_TOKEN_MIN_CHARS: usize = 4;
const MIN_CONTEXTUAL_ADDRESS_CHARS: usize = 4;

/// Merges turns into an [`OrderDraft`].
///
/// Re-merging the same slots and utterance into the result changes nothing.
#[derive(Debug, Clone, Copy)]
pub struct DraftMerger<'a> {
    catalog: &'a Catalog,
    max_suggestions: usize,
}

impl<'a> DraftMerger<'a> {
    /// `max_suggestions` must match what the dialogue shows, so that a bare
    /// number picks the suggestion the customer saw.
    pub fn new(catalog: &'a Catalog, max_suggestions: usize) -> Self {
        Self {
            catalog,
            max_suggestions,
        }
    }

    pub fn merge(
        &self,
        previous: &OrderDraft,
        slots: &OracleSlots,
        utterance: &str,
        today: NaiveDate,
    ) -> OrderDraft {
        let n = normalize(utterance);
        let mut draft = previous.clone();

        self.merge_product(&mut draft, slots, utterance, &n);

        match slots.headcount.filter(|h| HEADCOUNT_RANGE.contains(h)) {
            Some(headcount) => draft.headcount = Some(headcount),
            None if draft.headcount.is_none() => draft.headcount = extract_headcount(&n),
            None => {}
        }

        // An oracle "delivery" is usually echoed from history; only the
        // customer's own words can request it.
        match extract_delivery_mode(&n) {
            Some(mode) => draft.delivery_mode = Some(mode),
            None if draft.delivery_mode.is_none() => {
                draft.delivery_mode = slots.delivery_mode.filter(|m| *m == DeliveryMode::Pickup);
            }
            None => {}
        }

        if let Some(date) = slots.date.or_else(|| parse_date(&n, today)) {
            draft.date = Some(date);
        }
        if let Some(time) = parse_time(&n) {
            draft.time = Some(time);
        }

        let confirming = is_confirmation(&n);
        let negating = is_negation(&n);

        if draft.address.is_none() {
            let contextual = draft.delivery_mode == Some(DeliveryMode::Pickup)
                && utterance.trim().chars().count() >= MIN_CONTEXTUAL_ADDRESS_CHARS
                && !confirming
                && !negating
                && !self.carries_other_slot(previous, utterance, &n, today);
            if has_address_cue(&n) || contextual {
                draft.address = Some(utterance.trim().to_string());
            }
        }

        let answers_extras = mentions_extras(&n);
        if answers_extras {
            draft.extras = Some(Extras::Items(utterance.trim().to_string()));
        } else if negating && draft.extras.is_none() && draft.has_schedule() {
            draft.extras = Some(Extras::Nothing);
        }

        if confirming && !answers_extras && !negating && draft.is_ready_for_confirmation() {
            draft.confirmed = true;
        }

        draft
    }

    fn merge_product(&self, draft: &mut OrderDraft, slots: &OracleSlots, utterance: &str, n: &str) {
        if let Some(raw) = slots.product.as_deref() {
            match self.ground_product(raw, n) {
                Some(name) => {
                    draft.product = Some(name);
                    return;
                }
                None => {
                    tracing::debug!(product = %raw, "Dropped ungrounded oracle product");
                }
            }
        }

        if draft.product.is_some() {
            return;
        }

        if let Some(product) = self.catalog.match_text(utterance) {
            draft.product = Some(product.name.clone());
            return;
        }

        // A bare "2" picks the second portion suggestion shown for the headcount.
        if let (Some(headcount), [choice]) = (draft.headcount, words(n).as_slice()) {
            if let Ok(index) = choice.parse::<usize>() {
                if (1..=self.max_suggestions).contains(&index) {
                    let suggestions = self.catalog.suggest_combinations(headcount, self.max_suggestions);
                    if let Some(suggestion) = suggestions.get(index - 1) {
                        draft.product = Some(suggestion.items[0].variant.product.name.clone());
                    }
                }
            }
        }
    }

    /// Canonical name when the oracle product resolves in the catalog, the raw
    /// name when one of its significant tokens appears in the utterance, and
    /// `None` otherwise.
    fn ground_product(&self, raw: &str, normalized_utterance: &str) -> Option<String> {
        if let Some(product) = self.catalog.match_text(raw) {
            return Some(product.name.clone());
        }
        let raw_normalized = normalize(raw);
        let grounded = significant_tokens(&raw_normalized)
            .into_iter()
            .filter(|t| t.chars().count() >= GROUNDING_TOKEN_MIN_CHARS)
            .any(|t| normalized_utterance.contains(t));
        grounded.then(|| raw.trim().to_string())
    }

    /// Whether the utterance answers something other than the address.
    ///
    /// Once the headcount is known a bare number is a street number; only an
    /// explicit "N personas" still counts as a headcount.
    fn carries_other_slot(&self, previous: &OrderDraft, utterance: &str, n: &str, today: NaiveDate) -> bool {
        let headcount = if previous.headcount.is_some() {
            mentions_people(n)
        } else {
            extract_headcount(n).is_some()
        };
        headcount
            || extract_delivery_mode(n).is_some()
            || parse_date(n, today).is_some()
            || parse_time(n).is_some()
            || mentions_extras(n)
            || self.catalog.match_text(utterance).is_some()
    }
}
