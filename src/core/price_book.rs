//! # PriceBook — Remembered Unit Prices per Vendor
//!
//! The [`PriceBook`] remembers what an item cost the last time it was
//! bought at a given vendor, so the price-entry form can pre-fill it the
//! next time. One current value per key; re-saving overwrites.
//!
//! ## Key
//!
//! `(member, vendor, normalized item name)` — prices are scoped to the
//! acting household member and to the store they were seen at.
//! "Tomatoes at Shufersal" says nothing about tomatoes elsewhere.
//!
//! ## Storage
//!
//! Entries are kept in a `Vec` (that is what gets serialized) with a
//! `#[serde(skip)]` HashMap index over the key. After deserializing,
//! [`PriceBook::rebuild_index`] repopulates the index.
//!
//! ## Normalization
//!
//! [`normalize_item_name`] is the single canonical rule used everywhere
//! a price is stored or looked up:
//!
//! ```text
//! NFC → lowercase → strip punctuation → collapse whitespace
//!       (word chars, whitespace and the Hebrew block survive)
//! ```
//!
//! The normalized form is a *matching key only* — the verbatim item name
//! stays on the list item, and a copy of it is kept on the memory entry
//! for display.

use std::collections::HashMap;
use std::sync::OnceLock;

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use uuid::Uuid;

/// Characters that do not survive normalization: anything that is not a
/// word character, whitespace, or a letter in the Hebrew block.
fn punctuation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\s\u{0590}-\u{05FF}]").expect("static pattern"))
}

/// Normalizes an item name into its price-matching key.
///
/// Total: any input yields a (possibly empty) key. Callers treat an
/// empty key as "nothing to match".
pub fn normalize_item_name(name: &str) -> String {
    let nfc: String = name.nfc().collect();
    let lowered = nfc.to_lowercase();
    let stripped = punctuation_pattern().replace_all(&lowered, "");
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// A remembered price: what one unit cost, in which currency, and when
/// the memory was last written.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub unit_price: f64,
    pub currency: String,
    pub last_used_at: DateTime<Utc>,
}

/// Full price-memory entry. Key fields plus the verbatim item name for
/// display.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PriceMemory {
    /// The acting household member the price belongs to.
    pub member: Uuid,
    /// Vendor name as entered (not normalized — vendors come from a
    /// short free-text field; item names are the noisy side).
    pub vendor: String,
    /// The item name exactly as it appeared when the price was saved.
    pub item_name: String,
    /// Normalized item name (see [`normalize_item_name`]).
    pub normalized_name: String,
    pub quote: PriceQuote,
}

/// Index key of one price memory.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PriceKey {
    pub member: Uuid,
    pub vendor: String,
    pub normalized_name: String,
}

impl PriceMemory {
    fn key(&self) -> PriceKey {
        PriceKey {
            member: self.member,
            vendor: self.vendor.clone(),
            normalized_name: self.normalized_name.clone(),
        }
    }
}

/// In-memory store of remembered prices.
///
/// Upserts are last-write-wins: remembering an existing key replaces the
/// entry and refreshes its timestamp, so there is never more than one
/// current value and no price history.
#[derive(Default, Serialize, Deserialize)]
pub struct PriceBook {
    entries: Vec<PriceMemory>,

    /// Key → position in `entries`. Not serialized; rebuilt after load.
    #[serde(skip)]
    index: HashMap<PriceKey, usize>,
}

impl PriceBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repopulates the key index. Must be called after deserialization.
    pub fn rebuild_index(&mut self) {
        self.index = self
            .entries
            .iter()
            .enumerate()
            .map(|(i, e)| (e.key(), i))
            .collect();
    }

    /// Remembers (upserts) a price for `(member, vendor, item)`.
    pub fn remember(
        &mut self,
        member: Uuid,
        vendor: &str,
        item_name: &str,
        unit_price: f64,
        currency: &str,
    ) {
        let entry = PriceMemory {
            member,
            vendor: vendor.to_string(),
            item_name: item_name.to_string(),
            normalized_name: normalize_item_name(item_name),
            quote: PriceQuote {
                unit_price,
                currency: currency.to_string(),
                last_used_at: Utc::now(),
            },
        };
        tracing::debug!(vendor, item = item_name, unit_price, "price book: remembered");
        match self.index.get(&entry.key()) {
            Some(&i) => self.entries[i] = entry,
            None => {
                self.index.insert(entry.key(), self.entries.len());
                self.entries.push(entry);
            }
        }
    }

    /// Looks up the remembered price for `(member, vendor, item)`.
    ///
    /// Exact match on the normalized name; `None` when nothing was ever
    /// remembered for this key (a "no data" condition, not an error).
    pub fn suggest(&self, member: Uuid, vendor: &str, item_name: &str) -> Option<&PriceQuote> {
        let key = PriceKey {
            member,
            vendor: vendor.to_string(),
            normalized_name: normalize_item_name(item_name),
        };
        self.index.get(&key).map(|&i| &self.entries[i].quote)
    }

    /// All remembered prices for a member at one vendor, keyed by
    /// normalized item name. Used to pre-fill the price-entry form.
    pub fn for_vendor(&self, member: Uuid, vendor: &str) -> HashMap<&str, &PriceQuote> {
        self.entries
            .iter()
            .filter(|e| e.member == member && e.vendor == vendor)
            .map(|e| (e.normalized_name.as_str(), &e.quote))
            .collect()
    }

    /// Total number of remembered prices (all members, all vendors).
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ─── normalize_item_name ───────────────────────────────────

    #[test]
    fn normalize_lowercases_and_trims() {
        assert_eq!(normalize_item_name("  Milk  "), "milk");
    }

    #[test]
    fn normalize_collapses_internal_whitespace() {
        assert_eq!(normalize_item_name("גבינה   צהובה"), "גבינה צהובה");
    }

    #[test]
    fn normalize_strips_punctuation_keeps_hebrew() {
        assert_eq!(normalize_item_name("עגבניות!!"), "עגבניות");
        assert_eq!(normalize_item_name("קוטג' 5%"), "קוטג 5");
    }

    #[test]
    fn normalize_is_total_on_junk_input() {
        assert_eq!(normalize_item_name("!!! ???"), "");
    }

    // ─── PriceBook ─────────────────────────────────────────────

    fn member() -> Uuid {
        Uuid::new_v4()
    }

    #[test]
    fn remember_then_suggest_roundtrip() {
        let m = member();
        let mut book = PriceBook::new();
        book.remember(m, "Shufersal", "Tomatoes", 5.90, "ILS");

        let quote = book.suggest(m, "Shufersal", "tomatoes").unwrap();
        assert_eq!(quote.unit_price, 5.90);
        assert_eq!(quote.currency, "ILS");

        // Same item at another vendor: no memory.
        assert!(book.suggest(m, "OtherStore", "tomatoes").is_none());
    }

    #[test]
    fn resave_overwrites_old_price() {
        let m = member();
        let mut book = PriceBook::new();
        book.remember(m, "שופרסל", "חלב", 6.50, "ILS");
        book.remember(m, "שופרסל", "חלב", 7.10, "ILS");

        assert_eq!(book.suggest(m, "שופרסל", "חלב").unwrap().unit_price, 7.10);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn lookup_is_normalization_insensitive() {
        let m = member();
        let mut book = PriceBook::new();
        book.remember(m, "שופרסל", "גבינה  צהובה", 24.90, "ILS");

        assert!(book.suggest(m, "שופרסל", "  גבינה צהובה  ").is_some());
        assert!(book.suggest(m, "שופרסל", "גבינה צהובה!").is_some());
    }

    #[test]
    fn prices_are_scoped_per_member() {
        let mut book = PriceBook::new();
        let a = member();
        let b = member();
        book.remember(a, "שופרסל", "חלב", 6.50, "ILS");

        assert!(book.suggest(a, "שופרסל", "חלב").is_some());
        assert!(book.suggest(b, "שופרסל", "חלב").is_none());
    }

    #[test]
    fn for_vendor_filters_by_member_and_vendor() {
        let m = member();
        let mut book = PriceBook::new();
        book.remember(m, "שופרסל", "חלב", 6.50, "ILS");
        book.remember(m, "שופרסל", "לחם", 8.00, "ILS");
        book.remember(m, "רמי לוי", "חלב", 5.90, "ILS");

        let map = book.for_vendor(m, "שופרסל");
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("חלב").unwrap().unit_price, 6.50);
    }

    #[test]
    fn index_survives_serde_roundtrip() {
        let m = member();
        let mut book = PriceBook::new();
        book.remember(m, "שופרסל", "חלב", 6.50, "ILS");

        let json = serde_json::to_string(&book).unwrap();
        let mut loaded: PriceBook = serde_json::from_str(&json).unwrap();
        loaded.rebuild_index();

        assert_eq!(loaded.suggest(m, "שופרסל", "חלב").unwrap().unit_price, 6.50);
    }
}
