//! # Category — Product Categories and Their Keyword Table
//!
//! A [`Category`] is one of a fixed set of product categories a grocery
//! item can belong to. The enum is exhaustive and every mapping on it is
//! total — there is no runtime dictionary that can silently return
//! nothing for an unknown key.
//!
//! | Variant | Display label (Hebrew) |
//! |---------|------------------------|
//! | `Produce` | פירות וירקות |
//! | `Dairy` | מוצרי חלב |
//! | `Meat` | בשר |
//! | `Fish` | דגים |
//! | `Bakery` | מאפייה |
//! | `Pantry` | מזווה |
//! | `Frozen` | קפואים |
//! | `Drinks` | משקאות |
//! | `Other` | אחר |
//!
//! "No category" is represented by `Option<Category>` at the item level,
//! never by a sentinel variant.
//!
//! ## Keyword Table
//!
//! Each category carries an ordered list of Hebrew keywords used by the
//! chat assistant's classifier ([`crate::assistant::classifier`]). The
//! table is read-only configuration: some words deliberately appear in
//! more than one category (e.g. "קפה" is both Pantry and Drinks) and the
//! classifier's ordering rules decide which one wins. The one constraint
//! the table must uphold: no category's keyword may be a substring of
//! another category's display label, or label classification stops being
//! idempotent.

use serde::{Deserialize, Serialize};

/// A product category for grocery items.
///
/// Derives `Copy` — categories are plain labels, passed by value
/// everywhere. Serialized by variant name so stored lists stay readable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Fruit and vegetables.
    Produce,
    /// Milk products.
    Dairy,
    /// Meat and poultry.
    Meat,
    /// Fish.
    Fish,
    /// Bread and baked goods.
    Bakery,
    /// Dry goods and staples.
    Pantry,
    /// Frozen goods.
    Frozen,
    /// Beverages.
    Drinks,
    /// Anything that fits nowhere else.
    Other,
}

impl Category {
    /// All categories, in declaration order.
    ///
    /// This order is the stable secondary order the classifier falls
    /// back on when two categories have equally long keywords.
    pub const ALL: [Category; 9] = [
        Category::Produce,
        Category::Dairy,
        Category::Meat,
        Category::Fish,
        Category::Bakery,
        Category::Pantry,
        Category::Frozen,
        Category::Drinks,
        Category::Other,
    ];

    /// Hebrew display label, total over all variants.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Produce => "פירות וירקות",
            Category::Dairy => "מוצרי חלב",
            Category::Meat => "בשר",
            Category::Fish => "דגים",
            Category::Bakery => "מאפייה",
            Category::Pantry => "מזווה",
            Category::Frozen => "קפואים",
            Category::Drinks => "משקאות",
            Category::Other => "אחר",
        }
    }

    /// Keywords that signal this category inside a free-text utterance.
    ///
    /// Lowercase Hebrew, matched by substring. Order within the list is
    /// not significant — the classifier re-sorts longest-first.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Category::Produce => &[
                "פירות",
                "ירקות",
                "פירות וירקות",
                "ירק",
                "פרי",
                "סלט",
                "עגבניות",
                "מלפפונים",
                "בננות",
                "תפוחים",
                "גזר",
                "חסה",
                "ברוקולי",
                "כרוב",
            ],
            Category::Dairy => &[
                "חלב",
                "מוצרי חלב",
                "גבינה",
                "יוגורט",
                "חמאה",
                "שמנת",
                "חלבון",
                "קוטג'",
                "ריקוטה",
                "מוצרלה",
                "צהובה",
            ],
            Category::Meat => &[
                "בשר",
                "עוף",
                "סטייק",
                "המבורגר",
                "נקניקיות",
                "נקניק",
                "כבד",
                "קציצות",
                "שווארמה",
            ],
            Category::Fish => &[
                "דגים",
                "דג",
                "סלמון",
                "טונה",
                "פילה",
                "דג מלוח",
                "דג טרי",
                "סרדינים",
            ],
            Category::Bakery => &[
                "מאפייה",
                "לחם",
                "פיתה",
                "בגט",
                "עוגה",
                "עוגיות",
                "מאפה",
                "בייגל",
                "קרואסון",
                "בורקס",
                "לחמניות",
            ],
            Category::Pantry => &[
                "מזווה",
                "פסטה",
                "אורז",
                "קמח",
                "סוכר",
                "שמן",
                "תבלינים",
                "קטניות",
                "שעועית",
                "עדשים",
                "חומוס",
                "בורגול",
                "קוסקוס",
                "קפה",
                "תה",
                "דגנים",
            ],
            Category::Frozen => &[
                "קפואים",
                "קפוא",
                "גלידה",
                "פיצה קפואה",
                "ירקות קפואים",
                "בשר קפוא",
                "גלידות",
            ],
            Category::Drinks => &[
                "משקאות",
                "משקה",
                "מים",
                "מיץ",
                "קולה",
                "בירה",
                "יין",
                "סודה",
                "משקאות קלים",
                "קפה",
                "תה",
                // "חלב" is deliberately NOT a Drinks keyword: Drinks is
                // scanned before Dairy (longer max keyword) and would
                // hijack the Dairy display label "מוצרי חלב".
            ],
            Category::Other => &["אחר", "שונות"],
        }
    }

    /// Length in characters of this category's longest keyword.
    ///
    /// The classifier sorts categories descending by this value so that
    /// a category with a long, specific phrase is tried before one whose
    /// only hit would be a short generic word.
    pub fn longest_keyword_len(&self) -> usize {
        self.keywords()
            .iter()
            .map(|k| k.chars().count())
            .max()
            .unwrap_or(0)
    }

    /// Resolves a display label back to its category (exact match).
    pub fn from_label(label: &str) -> Option<Category> {
        Category::ALL.iter().copied().find(|c| c.label() == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn label_roundtrip_for_every_category() {
        for cat in Category::ALL {
            assert_eq!(Category::from_label(cat.label()), Some(cat));
        }
    }

    #[test]
    fn every_category_has_keywords() {
        for cat in Category::ALL {
            assert!(!cat.keywords().is_empty(), "{:?} has no keywords", cat);
        }
    }

    #[test]
    fn longest_keyword_len_counts_chars_not_bytes() {
        // "פירות וירקות" is 12 chars but 23 bytes in UTF-8.
        assert_eq!(Category::Produce.longest_keyword_len(), 12);
    }
}
