//! # ListItem & GroceryList — The Units of a Shopping List
//!
//! A [`ListItem`] is one line on a shopping list; a [`GroceryList`] is
//! one day's list. Items are mutated in place (quantity, purchased,
//! prices) while their list is active; once the list is completed it
//! becomes part of the read-only history and is never edited again.
//!
//! ## Fields
//!
//! | Field | Type | Notes |
//! |-------|------|-------|
//! | `id` | UUID v4 | Opaque identity, generated at creation |
//! | `name` | String | User-entered label, kept verbatim (not normalized) |
//! | `quantity` | u32 | Invariant: always ≥ 1 |
//! | `category` | Option<Category> | `None` = uncategorized |
//! | `purchased` | bool | Checked off during shopping |
//! | `unit_price` / `line_total` / `currency` | optional | Filled from the price-entry flow |

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::Category;

/// Alias for a list item's identifier (UUID v4).
pub type ItemId = Uuid;

/// One line on a shopping list.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ListItem {
    /// Unique identifier, generated at creation.
    pub id: ItemId,

    /// User-entered item name, preserved exactly as typed.
    /// Matching (autocomplete, suggestions, price memory) lowercases or
    /// normalizes a *copy* — the stored name is never rewritten.
    pub name: String,

    /// How many to buy. Never below 1.
    pub quantity: u32,

    /// Product category, if the user picked one.
    pub category: Option<Category>,

    /// Whether the item was checked off during shopping.
    pub purchased: bool,

    /// Price per unit, recorded from a receipt or entered manually.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,

    /// `unit_price × quantity` at the time the price was applied.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_total: Option<f64>,

    /// ISO currency code for the prices above (normally "ILS").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl ListItem {
    /// Creates a new unpurchased item with quantity 1 and no prices.
    pub fn new(name: impl Into<String>, category: Option<Category>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            quantity: 1,
            category,
            purchased: false,
            unit_price: None,
            line_total: None,
            currency: None,
        }
    }

    /// Adjusts quantity by `delta`, clamped so it never drops below 1.
    pub fn adjust_quantity(&mut self, delta: i32) {
        let next = self.quantity as i64 + delta as i64;
        self.quantity = next.max(1) as u32;
    }

    /// Records a unit price on the item and derives the line total.
    pub fn apply_price(&mut self, unit_price: f64, currency: &str) {
        self.unit_price = Some(unit_price);
        self.line_total = Some(unit_price * self.quantity as f64);
        self.currency = Some(currency.to_string());
    }

    /// Copy of this item suitable for re-adding to a list: fresh id,
    /// quantity reset to 1, not purchased, prices cleared.
    ///
    /// Used both for chat suggestions and for accepting a suggestion
    /// batch — every insertion gets a brand-new UUID.
    pub fn as_fresh_copy(&self) -> ListItem {
        ListItem {
            id: Uuid::new_v4(),
            name: self.name.clone(),
            quantity: 1,
            category: self.category,
            purchased: false,
            unit_price: None,
            line_total: None,
            currency: None,
        }
    }
}

/// One day's shopping list.
///
/// Active lists live in [`ListStore::lists_by_date`](super::ListStore);
/// completing a list stamps `completed_at` and moves it into history,
/// after which it is only ever read (by the history view and by the
/// chat assistant's frequency analysis).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GroceryList {
    /// The calendar day this list belongs to.
    pub date: NaiveDate,

    /// The items, in insertion order.
    pub items: Vec<ListItem>,

    /// Whether the list has been completed.
    pub completed: bool,

    /// When the list was completed. `None` while active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}

impl GroceryList {
    /// Creates an empty active list for `date`.
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            items: Vec::new(),
            completed: false,
            completed_at: None,
        }
    }

    /// Number of purchased items.
    pub fn purchased_count(&self) -> usize {
        self.items.iter().filter(|i| i.purchased).count()
    }

    /// True when the list is non-empty and everything is checked off.
    pub fn all_purchased(&self) -> bool {
        !self.items.is_empty() && self.items.iter().all(|i| i.purchased)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_item_starts_at_quantity_one() {
        let item = ListItem::new("חלב", Some(Category::Dairy));
        assert_eq!(item.quantity, 1);
        assert!(!item.purchased);
    }

    #[test]
    fn quantity_never_drops_below_one() {
        let mut item = ListItem::new("לחם", None);
        item.adjust_quantity(-5);
        assert_eq!(item.quantity, 1);
        item.adjust_quantity(3);
        assert_eq!(item.quantity, 4);
        item.adjust_quantity(-2);
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn apply_price_derives_line_total() {
        let mut item = ListItem::new("עגבניות", Some(Category::Produce));
        item.adjust_quantity(2); // quantity = 3
        item.apply_price(5.90, "ILS");
        assert_eq!(item.unit_price, Some(5.90));
        assert_eq!(item.line_total, Some(5.90 * 3.0));
        assert_eq!(item.currency.as_deref(), Some("ILS"));
    }

    #[test]
    fn fresh_copy_resets_state_and_identity() {
        let mut item = ListItem::new("גבינה", Some(Category::Dairy));
        item.purchased = true;
        item.adjust_quantity(4);
        item.apply_price(12.0, "ILS");

        let copy = item.as_fresh_copy();
        assert_ne!(copy.id, item.id);
        assert_eq!(copy.name, "גבינה");
        assert_eq!(copy.category, Some(Category::Dairy));
        assert_eq!(copy.quantity, 1);
        assert!(!copy.purchased);
        assert!(copy.unit_price.is_none());
    }

    #[test]
    fn all_purchased_requires_items() {
        let mut list = GroceryList::new(NaiveDate::from_ymd_opt(2026, 8, 26).unwrap());
        assert!(!list.all_purchased());
        list.items.push(ListItem::new("חלב", None));
        assert!(!list.all_purchased());
        list.items[0].purchased = true;
        assert!(list.all_purchased());
    }
}
