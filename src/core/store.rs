//! # ListStore — Central In-Memory Container for Shopping Lists
//!
//! The [`ListStore`] holds every list the household knows about: the
//! active (editable) lists keyed by date, and the append-only history of
//! completed lists. In the server it sits behind
//! `Arc<parking_lot::RwLock<_>>` inside [`AppData`](crate::persistence::AppData)
//! and every handler reads or writes through that lock.
//!
//! ## Storage
//!
//! - **Active lists**: `HashMap<NaiveDate, GroceryList>` — O(1) by date
//! - **History**: `Vec<GroceryList>` — append-only; queries sort on read
//!
//! ## Lifecycle
//!
//! ```text
//! upsert_current / item edits          complete(date)
//!   ┌──────────────┐                ┌───────────────────┐
//!   │ active list  │ ─────────────► │ completed history │ (read-only)
//!   └──────────────┘   stamps       └───────────────────┘
//!                      completed_at
//! ```
//!
//! Completing a date that already has a completed list is a conflict
//! ([`StoreError::AlreadyCompleted`]) — detected here and surfaced to
//! the user as a blocking notice, never resolved automatically.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{Category, GroceryList, ItemId, ListItem};

/// Failures of list-store operations.
///
/// These are the "store conflict" class of the error taxonomy: caught at
/// the handler, logged, and shown once as a human-readable notice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No active list exists for the given date.
    #[error("אין רשימה פעילה לתאריך {0}")]
    NoSuchList(NaiveDate),

    /// A completed list already exists for the given date.
    #[error("רשימה לתאריך {0} כבר הושלמה")]
    AlreadyCompleted(NaiveDate),

    /// No item with the given id on the date's active list.
    #[error("הפריט לא נמצא ברשימה")]
    NoSuchItem(ItemId),
}

/// A distinct item name the household has used before, with the category
/// it was recorded under. Powers the add-item autocomplete.
#[derive(Clone, Debug, Serialize)]
pub struct KnownItem {
    pub name: String,
    pub category: Option<Category>,
}

/// Central container for active and completed shopping lists.
#[derive(Default, Serialize, Deserialize)]
pub struct ListStore {
    /// Active (editable) lists: date → list.
    pub lists_by_date: HashMap<NaiveDate, GroceryList>,

    /// Completed lists, append-only.
    completed: Vec<GroceryList>,
}

impl ListStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// The active list for `date`, if one exists.
    pub fn current(&self, date: NaiveDate) -> Option<&GroceryList> {
        self.lists_by_date.get(&date)
    }

    /// The active list for `date`, created empty if missing.
    ///
    /// Every item mutation goes through this — browsing to a fresh date
    /// implicitly starts that day's list.
    pub fn current_mut(&mut self, date: NaiveDate) -> &mut GroceryList {
        self.lists_by_date
            .entry(date)
            .or_insert_with(|| GroceryList::new(date))
    }

    /// Replaces the active list for `date` wholesale.
    pub fn upsert_current(&mut self, date: NaiveDate, items: Vec<ListItem>) {
        let list = self.current_mut(date);
        list.items = items;
        tracing::debug!(%date, count = list.items.len(), "store: list replaced");
    }

    /// Adds an item to the date's active list and returns its id.
    pub fn add_item(&mut self, date: NaiveDate, item: ListItem) -> ItemId {
        let id = item.id;
        tracing::debug!(%date, name = %item.name, "store: item added");
        self.current_mut(date).items.push(item);
        id
    }

    /// Mutable access to one item on the date's active list.
    pub fn item_mut(
        &mut self,
        date: NaiveDate,
        id: ItemId,
    ) -> Result<&mut ListItem, StoreError> {
        self.lists_by_date
            .get_mut(&date)
            .ok_or(StoreError::NoSuchList(date))?
            .items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or(StoreError::NoSuchItem(id))
    }

    /// Removes an item from the date's active list.
    pub fn remove_item(&mut self, date: NaiveDate, id: ItemId) -> Result<(), StoreError> {
        let list = self
            .lists_by_date
            .get_mut(&date)
            .ok_or(StoreError::NoSuchList(date))?;
        let before = list.items.len();
        list.items.retain(|i| i.id != id);
        if list.items.len() == before {
            return Err(StoreError::NoSuchItem(id));
        }
        Ok(())
    }

    /// Drops all purchased items from the date's active list, returning
    /// how many were removed.
    pub fn clear_purchased(&mut self, date: NaiveDate) -> usize {
        let Some(list) = self.lists_by_date.get_mut(&date) else {
            return 0;
        };
        let before = list.items.len();
        list.items.retain(|i| !i.purchased);
        before - list.items.len()
    }

    /// Marks the date's active list as completed and moves it to history.
    ///
    /// # Errors
    ///
    /// - [`StoreError::AlreadyCompleted`] — history already holds a list
    ///   for this date (concurrent-edit conflict, surfaced as a notice)
    /// - [`StoreError::NoSuchList`] — nothing to complete
    pub fn complete(&mut self, date: NaiveDate) -> Result<(), StoreError> {
        if self.completed.iter().any(|l| l.date == date) {
            return Err(StoreError::AlreadyCompleted(date));
        }
        let mut list = self
            .lists_by_date
            .remove(&date)
            .ok_or(StoreError::NoSuchList(date))?;
        list.completed = true;
        list.completed_at = Some(Utc::now());
        tracing::info!(%date, items = list.items.len(), "store: list completed");
        self.completed.push(list);
        Ok(())
    }

    /// Completed lists, most recently completed first.
    pub fn completed_lists(&self) -> Vec<&GroceryList> {
        let mut lists: Vec<&GroceryList> = self.completed.iter().collect();
        lists.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        lists
    }

    /// The completed list for `date`, if any.
    pub fn completed_for_date(&self, date: NaiveDate) -> Option<&GroceryList> {
        self.completed.iter().find(|l| l.date == date)
    }

    /// Deletes the completed list for `date`. Returns whether one existed.
    pub fn delete_completed(&mut self, date: NaiveDate) -> bool {
        let before = self.completed.len();
        self.completed.retain(|l| l.date != date);
        let removed = self.completed.len() != before;
        if removed {
            tracing::info!(%date, "store: completed list deleted");
        }
        removed
    }

    /// Distinct item names across all lists (active and completed), with
    /// the category of their first occurrence, sorted by name.
    ///
    /// Dedup key is the lowercased name; the first spelling seen wins,
    /// so "חלב" and "חלב " count once.
    pub fn known_items(&self) -> Vec<KnownItem> {
        let mut seen: HashMap<String, KnownItem> = HashMap::new();
        let all = self
            .lists_by_date
            .values()
            .chain(self.completed.iter())
            .flat_map(|l| l.items.iter());
        for item in all {
            seen.entry(item.name.trim().to_lowercase())
                .or_insert_with(|| KnownItem {
                    name: item.name.clone(),
                    category: item.category,
                });
        }
        let mut items: Vec<KnownItem> = seen.into_values().collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        items
    }

    /// Number of completed lists in history.
    pub fn completed_count(&self) -> usize {
        self.completed.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[test]
    fn complete_moves_list_into_history() {
        let mut store = ListStore::new();
        store.add_item(date(1), ListItem::new("חלב", Some(Category::Dairy)));
        store.complete(date(1)).unwrap();

        assert!(store.current(date(1)).is_none());
        let completed = store.completed_for_date(date(1)).unwrap();
        assert!(completed.completed);
        assert!(completed.completed_at.is_some());
        assert_eq!(completed.items.len(), 1);
    }

    #[test]
    fn completing_twice_is_a_conflict() {
        let mut store = ListStore::new();
        store.add_item(date(1), ListItem::new("חלב", None));
        store.complete(date(1)).unwrap();

        // A new active list appears for the same date, then completion
        // is attempted again — must be refused, not merged.
        store.add_item(date(1), ListItem::new("לחם", None));
        assert_eq!(
            store.complete(date(1)),
            Err(StoreError::AlreadyCompleted(date(1)))
        );
    }

    #[test]
    fn complete_without_list_errors() {
        let mut store = ListStore::new();
        assert_eq!(store.complete(date(2)), Err(StoreError::NoSuchList(date(2))));
    }

    #[test]
    fn completed_lists_newest_first() {
        let mut store = ListStore::new();
        store.add_item(date(1), ListItem::new("א", None));
        store.complete(date(1)).unwrap();
        store.add_item(date(2), ListItem::new("ב", None));
        store.complete(date(2)).unwrap();

        let lists = store.completed_lists();
        assert_eq!(lists[0].date, date(2));
        assert_eq!(lists[1].date, date(1));
    }

    #[test]
    fn known_items_dedup_by_lowercased_name() {
        let mut store = ListStore::new();
        store.add_item(date(1), ListItem::new("Milk", Some(Category::Dairy)));
        store.complete(date(1)).unwrap();
        store.add_item(date(2), ListItem::new("milk", None));
        store.add_item(date(2), ListItem::new("לחם", Some(Category::Bakery)));

        let known = store.known_items();
        assert_eq!(known.len(), 2);
        let milk = known.iter().find(|k| k.name.eq_ignore_ascii_case("milk")).unwrap();
        // First occurrence's category wins, regardless of which list it is on.
        assert!(milk.category == Some(Category::Dairy) || milk.category.is_none());
    }

    #[test]
    fn remove_item_reports_missing_id() {
        let mut store = ListStore::new();
        let id = store.add_item(date(1), ListItem::new("חלב", None));
        assert!(store.remove_item(date(1), id).is_ok());
        assert_eq!(
            store.remove_item(date(1), id),
            Err(StoreError::NoSuchItem(id))
        );
    }

    #[test]
    fn clear_purchased_counts_removals() {
        let mut store = ListStore::new();
        let a = store.add_item(date(1), ListItem::new("חלב", None));
        store.add_item(date(1), ListItem::new("לחם", None));
        store.item_mut(date(1), a).unwrap().purchased = true;

        assert_eq!(store.clear_purchased(date(1)), 1);
        assert_eq!(store.current(date(1)).unwrap().items.len(), 1);
    }
}
