//! # Conversational Dispatcher
//!
//! Routes a chat message to the right behavior and phrases the reply in
//! Hebrew. No NLP — intent detection is keyword containment, which for a
//! two-intent household assistant is both sufficient and debuggable.
//!
//! ## Decision tree
//!
//! ```text
//! message
//!   ├── mentions a missing-items keyword?
//!   │     ├── yes → analyze (with detected category, if any)
//!   │     │         ├── results   → count message + suggestions
//!   │     │         └── no result → category-specific or generic
//!   │     │                         "nothing missing" message
//!   │     └── no
//!   ├── mentions a category anyway? → implicit missing-items query
//!   └── otherwise → help message listing example questions
//! ```
//!
//! Pure function of `(store, date, message)`: the dispatcher never
//! mutates state. Accepting a suggestion is a separate request handled
//! by the web layer.

use chrono::NaiveDate;

use crate::core::{Category, ListItem, ListStore};

use super::{analyzer, classifier};

/// Phrases indicating the user is asking about missing items. A message
/// matches when it contains any of them (several are redundant with the
/// shorter "חסר"/"מה יש" but kept for clarity of intent coverage).
const MISSING_KEYWORDS: [&str; 16] = [
    "חסר",
    "חסרים",
    "מה חסר",
    "מה חסרים",
    "מה אני צריך",
    "מה צריך",
    "הצע",
    "הצעות",
    "מה להוסיף",
    "מה כדאי",
    "מה שכחתי",
    "מה יש",
    "מה אין",
    "מה יש לי",
    "מה אין לי",
    "מה יש ברשימה",
];

/// The assistant's opening message, shown when the chat panel is first
/// rendered.
pub const GREETING: &str = "שלום! אני כאן כדי לעזור לך עם רשימת הקניות שלך. אתה יכול לשאול אותי שאלות כמו:\n• 'האם חסר לי משהו ברשימה?'\n• 'מה אני צריך להוסיף?'\n• 'מה חסר לי מקטגוריית מזווה?'\n• 'הצע לי פריטים ממוצרי חלב'";

/// Reply shown after the user dismisses a suggestion batch.
pub const DISMISSED: &str = "אין בעיה! אם תרצה הצעות אחרות, פשוט תשאל אותי שוב.";

/// A reply from the assistant: text plus zero or more suggested items
/// ready to be added to the current list.
#[derive(Debug)]
pub struct BotReply {
    pub text: String,
    pub suggestions: Vec<ListItem>,
}

impl BotReply {
    fn text_only(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            suggestions: Vec::new(),
        }
    }
}

/// "פריט" or "פריטים" depending on count.
fn items_word(count: usize) -> &'static str {
    if count == 1 {
        "פריט"
    } else {
        "פריטים"
    }
}

/// Reply confirming that `count` suggestions were added to the list.
pub fn added_reply(count: usize) -> String {
    format!("הוספתי {count} {} לרשימה שלך!", items_word(count))
}

/// Produces the assistant's reply to one user message.
pub fn respond(store: &ListStore, date: NaiveDate, message: &str) -> BotReply {
    let lowered = message.to_lowercase();
    let asks_missing = MISSING_KEYWORDS.iter().any(|k| lowered.contains(k));
    let category = classifier::classify(message);

    tracing::debug!(
        asks_missing,
        category = ?category,
        "chat: dispatching message"
    );

    if asks_missing {
        let missing = analyzer::missing_items(store, date, category);
        if missing.is_empty() {
            return match category {
                Some(cat) => BotReply::text_only(format!(
                    "לא מצאתי פריטים שחסרים מקטגוריית {}. נסה לשאול על קטגוריה אחרת או 'מה חסר לי?' לכל הקטגוריות.",
                    cat.label()
                )),
                None => BotReply::text_only(
                    "לא מצאתי פריטים שחסרים. הרשימה שלך נראית מלאה! אם יש משהו ספציפי שאתה מחפש, תגיד לי.",
                ),
            };
        }

        let mut text = format!(
            "מצאתי {} {} שהיו ברשימות הקודמות שלך אבל לא ברשימה הנוכחית",
            missing.len(),
            items_word(missing.len())
        );
        if let Some(cat) = category {
            text.push_str(&format!(" מקטגוריית {}", cat.label()));
        }
        text.push_str(". האם תרצה להוסיף אותם?");
        return BotReply {
            text,
            suggestions: missing,
        };
    }

    // Category mentioned without a missing keyword: treat as an implicit
    // missing-items query scoped to that category.
    if let Some(cat) = category {
        let missing = analyzer::missing_items(store, date, Some(cat));
        if missing.is_empty() {
            return BotReply::text_only(format!(
                "לא מצאתי פריטים מקטגוריית {} שחסרים ברשימה שלך.",
                cat.label()
            ));
        }
        return BotReply {
            text: format!(
                "מצאתי {} {} מקטגוריית {} שהיו ברשימות הקודמות שלך אבל לא ברשימה הנוכחית. האם תרצה להוסיף אותם?",
                missing.len(),
                items_word(missing.len()),
                cat.label()
            ),
            suggestions: missing,
        };
    }

    BotReply::text_only(
        "אני יכול לעזור לך לבדוק מה חסר ברשימה שלך בהשוואה לרשימות הקודמות. נסה לשאול 'האם חסר לי משהו ברשימה?', 'מה אני צריך להוסיף?' או 'מה חסר לי מקטגוריית מזווה?'",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Category;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    fn store_with_history(items: &[(&str, Option<Category>)]) -> ListStore {
        let mut store = ListStore::new();
        for (name, cat) in items {
            store.add_item(date(1), ListItem::new(*name, *cat));
        }
        store.complete(date(1)).unwrap();
        store
    }

    #[test]
    fn missing_query_returns_suggestions() {
        let store = store_with_history(&[
            ("חלב", Some(Category::Dairy)),
            ("לחם", Some(Category::Bakery)),
        ]);

        let reply = respond(&store, date(20), "מה חסר לי?");
        assert_eq!(reply.suggestions.len(), 2);
        assert!(reply.text.contains("מצאתי 2 פריטים"));
        assert!(reply.text.contains("האם תרצה להוסיף אותם?"));
    }

    #[test]
    fn single_result_uses_singular_noun() {
        let store = store_with_history(&[("חלב", Some(Category::Dairy))]);
        let reply = respond(&store, date(20), "מה חסר?");
        assert!(reply.text.contains("מצאתי 1 פריט "));
    }

    #[test]
    fn category_scoped_zero_results_names_the_category() {
        // History has dairy only; Pantry query finds nothing and the
        // reply must say so for Pantry specifically.
        let store = store_with_history(&[("חלב", Some(Category::Dairy))]);

        let reply = respond(&store, date(20), "מה חסר לי מקטגוריית מזווה?");
        assert!(reply.suggestions.is_empty());
        assert!(reply.text.contains("מזווה"), "got: {}", reply.text);
        assert!(reply.text.contains("לא מצאתי"));
    }

    #[test]
    fn generic_zero_results_message() {
        let store = ListStore::new();
        let reply = respond(&store, date(20), "חסר לי משהו?");
        assert!(reply.suggestions.is_empty());
        assert!(reply.text.contains("הרשימה שלך נראית מלאה"));
    }

    #[test]
    fn category_mention_without_missing_keyword_is_implicit_query() {
        let store = store_with_history(&[("עגבניות", Some(Category::Produce))]);

        let reply = respond(&store, date(20), "פירות וירקות");
        assert_eq!(reply.suggestions.len(), 1);
        assert_eq!(reply.suggestions[0].name, "עגבניות");
    }

    #[test]
    fn unrelated_message_gets_help_text() {
        let store = ListStore::new();
        let reply = respond(&store, date(20), "מה נשמע?");
        assert!(reply.suggestions.is_empty());
        assert!(reply.text.contains("אני יכול לעזור"));
    }

    #[test]
    fn dispatcher_does_not_mutate_store() {
        let store = store_with_history(&[("חלב", Some(Category::Dairy))]);
        let before = store.completed_count();
        let _ = respond(&store, date(20), "מה חסר לי?");
        assert_eq!(store.completed_count(), before);
    }

    #[test]
    fn added_reply_pluralizes() {
        assert_eq!(added_reply(1), "הוספתי 1 פריט לרשימה שלך!");
        assert!(added_reply(3).contains("3 פריטים"));
    }
}
