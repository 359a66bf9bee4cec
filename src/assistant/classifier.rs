//! # Category Classifier
//!
//! Maps a free-text user utterance to one of the fixed product
//! categories using substring keyword matching. The assistant uses the
//! result to scope "what's missing?" queries to one category.
//!
//! ## Strategy (two phases)
//!
//! ```text
//! Utterance
//!   ├── 1. Keyword scan
//!   │      categories sorted by longest-keyword length (desc),
//!   │      keywords within a category longest-first,
//!   │      first substring hit wins
//!   └── 2. Display-label fallback
//!          exact label, "מקטגוריית <label>" connector phrases,
//!          or plain label containment
//! ```
//!
//! Longest-match ordering keeps a short generic keyword from shadowing a
//! category whose signal is a longer, more specific phrase. It is a
//! heuristic, not a parser: when two categories share a keyword (e.g.
//! "קפה" is both Pantry and Drinks) the sort order decides, with the
//! declaration order of [`Category::ALL`] as the stable tie-break.
//!
//! Total function: any input yields `Some(category)` or `None`, never an
//! error.

use crate::core::Category;

/// Connector phrases meaning "from category X" that precede a display
/// label in natural queries.
const CONNECTOR_PHRASES: [&str; 4] = [
    "מקטגוריית ",
    "מהקטגוריה ",
    "קטגוריית ",
    "קטגוריה ",
];

/// Classifies an utterance into a product category, if one is mentioned.
///
/// Case-insensitive; matching is plain substring containment over the
/// lowercased utterance. Returns `None` when no keyword and no display
/// label is found ("no category detected").
pub fn classify(utterance: &str) -> Option<Category> {
    let lowered = utterance.to_lowercase();

    // ─── Phase 1: keyword scan, longest-keyword category first ────
    let mut categories = Category::ALL;
    categories.sort_by(|a, b| b.longest_keyword_len().cmp(&a.longest_keyword_len()));

    for category in categories {
        let mut keywords: Vec<&str> = category.keywords().to_vec();
        keywords.sort_by(|a, b| b.chars().count().cmp(&a.chars().count()));
        for keyword in keywords {
            if lowered.contains(keyword) {
                return Some(category);
            }
        }
    }

    // ─── Phase 2: display-label fallback ──────────────────────────
    for category in Category::ALL {
        let label = category.label().to_lowercase();
        if lowered == label {
            return Some(category);
        }
        if CONNECTOR_PHRASES
            .iter()
            .any(|prefix| lowered.contains(&format!("{prefix}{label}")))
        {
            return Some(category);
        }
        if lowered.contains(&label) {
            return Some(category);
        }
    }

    None
}
