//! # Missing-Item Analyzer
//!
//! Answers "what am I missing?" by comparing shopping history against
//! the current list. Items the household buys often but has not put on
//! today's list are the suggestions.
//!
//! ## Pipeline
//!
//! ```text
//! completed lists ──► frequency table (key: lowercased name)
//!                           │ representative = first occurrence seen
//!                           ▼
//!                     drop names already on the current list
//!                           ▼
//!                     optional exact category filter
//!                           ▼
//!                     rank: count desc, then name (Hebrew code-point order)
//!                           ▼
//!                     cap at 10 ──► fresh unpurchased copies, quantity 1
//! ```
//!
//! Pure: reads the store, never mutates it. The returned items carry
//! fresh UUIDs so accepting a suggestion can push them onto the current
//! list as-is.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::core::{Category, ListItem, ListStore};

/// Maximum number of suggestions returned per query.
pub const MAX_SUGGESTIONS: usize = 10;

/// One entry of the frequency table: a representative item plus how many
/// times its (lowercased) name appeared across completed lists.
struct FrequencyEntry {
    representative: ListItem,
    count: usize,
}

/// Suggests items that appear in completed history but are absent from
/// the current list for `date`, optionally restricted to one category.
///
/// The category filter is exact: uncategorized history items never match
/// a category query, and `None` means "all categories".
pub fn missing_items(
    store: &ListStore,
    date: NaiveDate,
    category: Option<Category>,
) -> Vec<ListItem> {
    // ─── Frequency table over history ─────────────────────────────
    let mut table: HashMap<String, FrequencyEntry> = HashMap::new();
    for list in store.completed_lists() {
        for item in &list.items {
            let key = item.name.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            table
                .entry(key)
                .and_modify(|e| e.count += 1)
                .or_insert_with(|| FrequencyEntry {
                    representative: item.clone(),
                    count: 1,
                });
        }
    }

    // ─── Set difference against the current list ──────────────────
    let on_list: Vec<String> = store
        .current(date)
        .map(|l| {
            l.items
                .iter()
                .map(|i| i.name.trim().to_lowercase())
                .collect()
        })
        .unwrap_or_default();

    let mut candidates: Vec<FrequencyEntry> = table
        .into_iter()
        .filter(|(key, _)| !on_list.contains(key))
        .map(|(_, entry)| entry)
        .filter(|e| match category {
            Some(cat) => e.representative.category == Some(cat),
            None => true,
        })
        .collect();

    // ─── Rank and cap ─────────────────────────────────────────────
    candidates.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.representative.name.cmp(&b.representative.name))
    });
    candidates.truncate(MAX_SUGGESTIONS);

    candidates
        .iter()
        .map(|e| e.representative.as_fresh_copy())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    /// History with `n` completed lists, each containing the given items.
    fn history(store: &mut ListStore, days: &[(u32, &[(&str, Option<Category>)])]) {
        for (day, items) in days {
            for (name, cat) in *items {
                store.add_item(date(*day), ListItem::new(*name, *cat));
            }
            store.complete(date(*day)).unwrap();
        }
    }

    #[test]
    fn suggests_frequent_items_absent_from_current_list() {
        let mut store = ListStore::new();
        history(
            &mut store,
            &[
                (1, &[("Milk", Some(Category::Dairy)), ("Bread", Some(Category::Bakery))]),
                (2, &[("Milk", Some(Category::Dairy))]),
            ],
        );
        store.add_item(date(20), ListItem::new("Bread", Some(Category::Bakery)));

        let missing = missing_items(&store, date(20), None);
        assert_eq!(missing.len(), 1);
        assert_eq!(missing[0].name, "Milk");
        assert_eq!(missing[0].quantity, 1);
        assert!(!missing[0].purchased);
    }

    #[test]
    fn frequency_orders_before_name() {
        let mut store = ListStore::new();
        history(
            &mut store,
            &[
                (1, &[("חלב", None), ("אורז", None)]),
                (2, &[("חלב", None)]),
                (3, &[("חלב", None)]),
            ],
        );

        let missing = missing_items(&store, date(20), None);
        // חלב appeared 3 times, אורז once.
        assert_eq!(missing[0].name, "חלב");
        assert_eq!(missing[1].name, "אורז");
    }

    #[test]
    fn ties_break_alphabetically() {
        let mut store = ListStore::new();
        history(&mut store, &[(1, &[("גבינה", None), ("אורז", None), ("במבה", None)])]);

        let names: Vec<_> = missing_items(&store, date(20), None)
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["אורז", "במבה", "גבינה"]);
    }

    #[test]
    fn category_filter_is_exact() {
        let mut store = ListStore::new();
        history(
            &mut store,
            &[(
                1,
                &[
                    ("חלב", Some(Category::Dairy)),
                    ("עגבניות", Some(Category::Produce)),
                    ("משהו", None), // uncategorized — never matches a filter
                ],
            )],
        );

        let dairy = missing_items(&store, date(20), Some(Category::Dairy));
        assert_eq!(dairy.len(), 1);
        assert_eq!(dairy[0].name, "חלב");

        let frozen = missing_items(&store, date(20), Some(Category::Frozen));
        assert!(frozen.is_empty());
    }

    #[test]
    fn capped_at_ten_suggestions() {
        let mut store = ListStore::new();
        let names: Vec<String> = (0..15).map(|i| format!("פריט{i:02}")).collect();
        for name in &names {
            store.add_item(date(1), ListItem::new(name.clone(), None));
        }
        store.complete(date(1)).unwrap();

        assert_eq!(missing_items(&store, date(20), None).len(), MAX_SUGGESTIONS);
    }

    #[test]
    fn name_matching_ignores_case_and_edges() {
        let mut store = ListStore::new();
        history(&mut store, &[(1, &[("Milk", None)])]);
        store.add_item(date(20), ListItem::new("  milk ", None));

        assert!(missing_items(&store, date(20), None).is_empty());
    }

    #[test]
    fn empty_history_suggests_nothing() {
        let store = ListStore::new();
        assert!(missing_items(&store, date(20), None).is_empty());
    }
}
