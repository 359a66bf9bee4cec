//! # Core Module — Fundamental Domain Types
//!
//! Everything in the application revolves around these types:
//!
//! - [`Category`] — fixed set of product categories + keyword table
//! - [`ListItem`] — one line on a shopping list (quantity ≥ 1 invariant)
//! - [`GroceryList`] — one day's list; completed lists become history
//! - [`ListStore`] — central container of active + completed lists
//! - [`PriceBook`] — remembered unit prices per member/vendor/item
//!
//! The core is pure, synchronous, in-memory state. The web layer wraps
//! it in `Arc<RwLock<_>>`; the assistant reads it without ever mutating.

/// Product categories and their keyword table.
pub mod category;

/// List items and daily lists.
pub mod item;

/// Remembered prices per vendor.
pub mod price_book;

/// The central list container and its operations.
pub mod store;

// Re-exports for convenience — `crate::core::Category` etc.
pub use category::Category;
pub use item::{GroceryList, ItemId, ListItem};
pub use price_book::{normalize_item_name, PriceBook, PriceQuote};
pub use store::{KnownItem, ListStore, StoreError};
