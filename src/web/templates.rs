//! # Maud Templates — Server-Side Hebrew UI
//!
//! All HTML is rendered server-side with [`maud`](https://maud.lambda.xyz/)
//! and driven by HTMX: handlers return fragments, the browser swaps them
//! into place, and no application-level JavaScript exists beyond HTMX
//! itself. The page is `dir="rtl"` throughout — the UI language is
//! Hebrew.
//!
//! ## Templates
//!
//! | Function | Kind | Swapped into |
//! |----------|------|--------------|
//! | [`full_page`] | complete page | — |
//! | [`list_fragment`] | fragment | `#list-panel` |
//! | [`history_sidebar`] | fragment | `#history-panel` |
//! | [`history_view`] | fragment | `#list-panel` |
//! | [`members_fragment`] | fragment | `#members-panel` |
//! | [`receipts_fragment`] | fragment | `#receipts-list` |
//! | [`price_entry`] | fragment | `.price-entry` in the price form |
//! | [`chat_turn`] | fragment | `#chat-messages` (beforeend) |
//! | [`bot_message`] | fragment | `#chat-messages` (beforeend) |
//! | [`notice`] / [`error_notice`] | fragment | `#notice-area` |

use chrono::NaiveDate;
use maud::{html, Markup, DOCTYPE};
use uuid::Uuid;

use crate::assistant::{BotReply, GREETING};
use crate::core::{Category, GroceryList, KnownItem, ListItem, ListStore, PriceQuote};
use crate::receipts::ReceiptLog;
use crate::session::Household;

/// The complete page: list panel, history sidebar, members bar, chat.
pub fn full_page(
    store: &ListStore,
    household: &Household,
    receipts: &ReceiptLog,
    date: NaiveDate,
) -> Markup {
    html! {
        (DOCTYPE)
        html lang="he" dir="rtl" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { "רשימת קניות משפחתית" }
                link rel="stylesheet" href="/assets/style.css";
                script src="https://unpkg.com/htmx.org@2.0.4" {}
            }
            body {
                nav class="nav-bar" {
                    span class="nav-brand" { "🛒 רשימת קניות" }
                    form class="date-picker" hx-get="/list" hx-target="#list-panel" {
                        input type="date" name="date" value=(date)
                            hx-get="/list" hx-target="#list-panel" hx-trigger="change";
                    }
                    div id="members-panel" { (members_fragment(household)) }
                }
                div id="notice-area" {}
                div class="app-container" {
                    main id="list-panel" class="list-panel" {
                        (list_fragment(store, date, None))
                    }
                    aside class="history-panel" {
                        div id="history-panel" {
                            (history_sidebar(store))
                        }
                        form class="receipt-upload" hx-post="/receipts/upload"
                            hx-encoding="multipart/form-data" hx-target="#notice-area" {
                            h3 { "העלאת קבלה" }
                            input type="hidden" name="date" value=(date);
                            input type="file" name="file" accept="image/*" required;
                            button type="submit" { "העלה" }
                        }
                        div id="receipts-list" {
                            (receipts_fragment(receipts, household.active_member().map(|m| m.id)))
                        }
                    }
                    section class="chat-panel" {
                        div id="chat-messages" class="chat-messages" {
                            (bot_message(GREETING))
                        }
                        form class="chat-input"
                            hx-post="/chat" hx-target="#chat-messages" hx-swap="beforeend"
                            "hx-on::after-request"="this.reset()" {
                            input type="hidden" name="date" value=(date);
                            input type="text" name="message" placeholder="שאל אותי מה חסר..."
                                autocomplete="off" required;
                            button type="submit" { "שלח" }
                        }
                    }
                }
            }
        }
    }
}

// ─── List panel ──────────────────────────────────────────────────

/// The editable list for one date, with the add-item form. `conflict`
/// carries a notice shown above the list (e.g. "already completed").
pub fn list_fragment(store: &ListStore, date: NaiveDate, conflict: Option<&str>) -> Markup {
    let list = store.current(date);
    let known = store.known_items();
    html! {
        @if let Some(text) = conflict {
            (notice(text))
        }
        h2 class="list-title" { "רשימה ליום " (date.format("%d/%m/%Y")) }
        (add_item_form(date, &known))
        @match list {
            Some(list) if !list.items.is_empty() => {
                ul class="item-list" {
                    @for item in &list.items {
                        (item_row(date, item))
                    }
                }
                div class="list-actions" {
                    span class="list-progress" {
                        (list.purchased_count()) " מתוך " (list.items.len()) " נקנו"
                    }
                    @if list.all_purchased() {
                        span class="all-done" { "הכל נקנה ✓" }
                    }
                    button hx-post="/items/clear-purchased" hx-vals=(date_vals(date))
                        hx-target="#list-panel" { "נקה פריטים שנקנו" }
                    button class="primary" hx-post="/list/complete" hx-vals=(date_vals(date))
                        hx-target="#list-panel"
                        hx-confirm="לסיים את הרשימה? היא תעבור להיסטוריה." {
                        "סיים רשימה"
                    }
                }
            }
            _ => {
                p class="empty-list" { "הרשימה ריקה — הוסיפו פריט ראשון" }
            }
        }
    }
}

/// One item row: checkbox, name + category badge, quantity stepper,
/// price info, delete.
fn item_row(date: NaiveDate, item: &ListItem) -> Markup {
    html! {
        li .item-row.purchased[item.purchased] {
            input type="checkbox" checked[item.purchased]
                hx-post={ "/items/" (item.id) "/toggle" } hx-vals=(date_vals(date))
                hx-target="#list-panel";
            span class="item-name" { (item.name) }
            @if let Some(cat) = item.category {
                span class="item-category" { (cat.label()) }
            }
            span class="quantity-stepper" {
                button hx-post={ "/items/" (item.id) "/quantity" }
                    hx-vals=(delta_vals(date, -1)) hx-target="#list-panel" { "−" }
                span class="quantity" { (item.quantity) }
                button hx-post={ "/items/" (item.id) "/quantity" }
                    hx-vals=(delta_vals(date, 1)) hx-target="#list-panel" { "+" }
            }
            @if let (Some(total), Some(currency)) = (item.line_total, item.currency.as_deref()) {
                span class="item-price" { (format!("{total:.2} {currency}")) }
            }
            button class="delete" hx-delete={ "/items/" (item.id) }
                hx-vals=(date_vals(date)) hx-target="#list-panel" { "✕" }
            // Price entry appears once the item is checked off.
            // Entering a vendor fetches the remembered price for it and
            // swaps in a prefilled price input.
            @if item.purchased && item.unit_price.is_none() {
                form class="price-form" hx-post="/prices" hx-target="#list-panel" {
                    input type="hidden" name="date" value=(date);
                    input type="hidden" name="item_id" value=(item.id);
                    input type="hidden" name="item" value=(item.name);
                    input type="text" name="vendor" placeholder="חנות" required
                        hx-get="/prices/suggest" hx-trigger="change"
                        hx-include="closest form" hx-target="next .price-entry"
                        hx-swap="outerHTML";
                    (price_entry(None, &[]))
                    button type="submit" { "שמור מחיר" }
                }
            }
        }
    }
}

/// Add-item form with a datalist of every name the household has used.
fn add_item_form(date: NaiveDate, known: &[KnownItem]) -> Markup {
    html! {
        form class="add-item" hx-post="/items" hx-target="#list-panel" {
            input type="hidden" name="date" value=(date);
            input type="text" name="name" list="known-items"
                placeholder="מה להוסיף?" autocomplete="off" required;
            datalist id="known-items" {
                @for item in known {
                    option value=(item.name) {}
                }
            }
            select name="category" {
                option value="" { "ללא קטגוריה" }
                @for cat in Category::ALL {
                    option value=(cat.label()) { (cat.label()) }
                }
            }
            button type="submit" { "הוסף" }
        }
    }
}

// ─── History ─────────────────────────────────────────────────────

/// Sidebar listing completed lists, newest first.
pub fn history_sidebar(store: &ListStore) -> Markup {
    let lists = store.completed_lists();
    html! {
        h3 { "היסטוריה" }
        @if lists.is_empty() {
            p class="empty-history" { "אין עדיין רשימות שהושלמו" }
        } @else {
            ul class="history-list" {
                @for list in lists {
                    li class="history-entry" {
                        a hx-get={ "/history/" (list.date) } hx-target="#list-panel" {
                            (list.date.format("%d/%m/%Y")) " · " (list.items.len()) " פריטים"
                        }
                        button class="delete" hx-delete={ "/history/" (list.date) }
                            hx-target="#history-panel"
                            hx-confirm="למחוק את הרשימה מההיסטוריה?" { "✕" }
                    }
                }
            }
        }
    }
}

/// Read-only view of one completed list.
pub fn history_view(list: &GroceryList) -> Markup {
    html! {
        h2 class="list-title" {
            "רשימה שהושלמה — " (list.date.format("%d/%m/%Y"))
        }
        ul class="item-list readonly" {
            @for item in &list.items {
                li .item-row.purchased[item.purchased] {
                    span class="item-name" { (item.name) }
                    @if let Some(cat) = item.category {
                        span class="item-category" { (cat.label()) }
                    }
                    span class="quantity" { "× " (item.quantity) }
                    @if let (Some(total), Some(currency)) =
                        (item.line_total, item.currency.as_deref()) {
                        span class="item-price" { (format!("{total:.2} {currency}")) }
                    }
                }
            }
        }
        // No date value: the server resolves a missing date to today.
        button hx-get="/list" hx-target="#list-panel" {
            "חזרה לרשימה של היום"
        }
    }
}

// ─── Members ─────────────────────────────────────────────────────

/// Member badges with selection, plus the add/remove controls.
pub fn members_fragment(household: &Household) -> Markup {
    let active = household.active_member().map(|m| m.id);
    html! {
        div class="members" {
            @for member in &household.members {
                span .member-badge.active[Some(member.id) == active]
                    style=[member.color.as_ref().map(|c| format!("--badge-color: {c}"))] {
                    button hx-post="/session/user"
                        hx-vals=(format!(r#"{{"member":"{}"}}"#, member.id))
                        hx-target="#members-panel" { (member.name) }
                    button class="delete" hx-delete={ "/users/" (member.id) }
                        hx-target="#members-panel"
                        hx-confirm="להסיר את בן המשפחה?" { "✕" }
                }
            }
            form class="add-member" hx-post="/users" hx-target="#members-panel"
                "hx-on::after-request"="this.reset()" {
                input type="text" name="name" placeholder="שם בן משפחה" required;
                button type="submit" { "+" }
            }
        }
    }
}

// ─── Prices ──────────────────────────────────────────────────────

/// The price half of the price-entry form: the price input, prefilled
/// from a remembered quote when one exists, plus a hint line with the
/// vendor's other remembered prices.
pub fn price_entry(quote: Option<&PriceQuote>, vendor_prices: &[(String, f64)]) -> Markup {
    html! {
        span class="price-entry" {
            input type="number" name="price" step="0.01" min="0"
                placeholder="מחיר ליחידה" required
                value=[quote.map(|q| format!("{:.2}", q.unit_price))];
            @if !vendor_prices.is_empty() {
                span class="price-hints" {
                    "עוד מחירים בחנות: "
                    @for (i, (name, price)) in vendor_prices.iter().enumerate() {
                        @if i > 0 { ", " }
                        (name) " " (format!("{price:.2}"))
                    }
                }
            }
        }
    }
}

// ─── Receipts ────────────────────────────────────────────────────

/// Recent receipt uploads of the acting member, newest first.
pub fn receipts_fragment(log: &ReceiptLog, member: Option<Uuid>) -> Markup {
    let records = member.map(|m| log.for_member(m)).unwrap_or_default();
    html! {
        h4 { "קבלות אחרונות" }
        @if records.is_empty() {
            p class="empty-history" { "אין קבלות שמורות" }
        } @else {
            ul class="receipt-list" {
                @for record in records.iter().take(5) {
                    li {
                        a href={ "/receipts/files/" (record.image_path) } target="_blank" {
                            (record.uploaded_at.format("%d/%m/%Y"))
                            @if let Some(d) = record.list_date {
                                " · רשימה של " (d.format("%d/%m"))
                            }
                        }
                    }
                }
            }
        }
    }
}

// ─── Chat ────────────────────────────────────────────────────────

/// One full chat turn: the user's message followed by the bot's reply.
pub fn chat_turn(date: NaiveDate, user_text: &str, reply: &BotReply) -> Markup {
    html! {
        div class="message user-message" {
            div class="message-content" { (user_text) }
        }
        (bot_reply(date, reply))
    }
}

/// A bot reply, with suggestion buttons when the reply carries any.
fn bot_reply(date: NaiveDate, reply: &BotReply) -> Markup {
    html! {
        div class="message bot-message" {
            div class="message-content" { (reply.text) }
            @if !reply.suggestions.is_empty() {
                ul class="suggestions" {
                    @for item in &reply.suggestions {
                        li {
                            button class="suggestion-add" hx-post="/items"
                                hx-vals=(suggestion_vals(date, item))
                                hx-target="#list-panel" {
                                "+ " (item.name)
                                @if let Some(cat) = item.category {
                                    " (" (cat.label()) ")"
                                }
                            }
                        }
                    }
                }
                div class="suggestion-actions" {
                    button class="primary" hx-post="/chat/accept-all"
                        hx-vals=(accept_all_vals(date, &reply.suggestions))
                        hx-target="#chat-messages" hx-swap="beforeend" {
                        "הוסף הכל"
                    }
                    button hx-post="/chat/dismiss"
                        hx-target="#chat-messages" hx-swap="beforeend" {
                        "לא תודה"
                    }
                }
            }
        }
    }
}

/// A plain bot text message (greeting, confirmations, dismissals).
pub fn bot_message(text: &str) -> Markup {
    html! {
        div class="message bot-message" {
            div class="message-content" { (text) }
        }
    }
}

// ─── Notices ─────────────────────────────────────────────────────

pub fn notice(text: &str) -> Markup {
    html! { div class="notice" { (text) } }
}

pub fn error_notice(text: &str) -> Markup {
    html! { div class="notice error" { "⚠ " (text) } }
}

// ─── hx-vals helpers ─────────────────────────────────────────────
//
// HTMX sends `hx-vals` JSON as extra form fields; serde_json does the
// escaping so Hebrew names and quotes survive.

fn date_vals(date: NaiveDate) -> String {
    format!(r#"{{"date":"{date}"}}"#)
}

fn delta_vals(date: NaiveDate, delta: i32) -> String {
    format!(r#"{{"date":"{date}","delta":{delta}}}"#)
}

fn suggestion_vals(date: NaiveDate, item: &ListItem) -> String {
    serde_json::json!({
        "date": date,
        "name": item.name,
        "category": item.category.map(|c| c.label()),
    })
    .to_string()
}

fn accept_all_vals(date: NaiveDate, items: &[ListItem]) -> String {
    serde_json::json!({
        "date": date,
        "items": serde_json::to_string(
            &items
                .iter()
                .map(|i| (i.name.as_str(), i.category.map(|c| c.label())))
                .collect::<Vec<_>>()
        )
        .unwrap_or_default(),
    })
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ListStore;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 26).unwrap()
    }

    #[test]
    fn full_page_is_rtl_hebrew() {
        let html = full_page(
            &ListStore::new(),
            &Household::new(),
            &ReceiptLog::default(),
            date(),
        )
        .into_string();
        assert!(html.contains(r#"dir="rtl""#));
        assert!(html.contains(r#"lang="he""#));
        assert!(html.contains("רשימת קניות"));
    }

    #[test]
    fn empty_list_shows_placeholder() {
        let html = list_fragment(&ListStore::new(), date(), None).into_string();
        assert!(html.contains("הרשימה ריקה"));
    }

    #[test]
    fn conflict_notice_is_rendered_before_list() {
        let html = list_fragment(&ListStore::new(), date(), Some("כבר הושלמה")).into_string();
        assert!(html.contains("כבר הושלמה"));
    }

    #[test]
    fn item_row_escapes_user_input() {
        let mut store = ListStore::new();
        store.add_item(date(), ListItem::new("<script>alert(1)</script>", None));
        let html = list_fragment(&store, date(), None).into_string();
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn fully_purchased_list_shows_completion_hint() {
        let mut store = ListStore::new();
        let id = store.add_item(date(), ListItem::new("חלב", None));

        let html = list_fragment(&store, date(), None).into_string();
        assert!(!html.contains("הכל נקנה"));

        store.item_mut(date(), id).unwrap().purchased = true;
        let html = list_fragment(&store, date(), None).into_string();
        assert!(html.contains("הכל נקנה"));
    }

    #[test]
    fn price_entry_prefills_remembered_quote() {
        let quote = PriceQuote {
            unit_price: 6.5,
            currency: "ILS".into(),
            last_used_at: chrono::Utc::now(),
        };
        let html = price_entry(Some(&quote), &[("לחם".into(), 8.0)]).into_string();
        assert!(html.contains(r#"value="6.50""#));
        assert!(html.contains("לחם"));

        let bare = price_entry(None, &[]).into_string();
        assert!(!bare.contains("value="));
        assert!(!bare.contains("עוד מחירים"));
    }

    #[test]
    fn vendor_input_requests_price_suggestion() {
        let mut store = ListStore::new();
        let id = store.add_item(date(), ListItem::new("חלב", None));
        store.item_mut(date(), id).unwrap().purchased = true;

        let html = list_fragment(&store, date(), None).into_string();
        assert!(html.contains(r#"hx-get="/prices/suggest""#));
    }

    #[test]
    fn receipts_fragment_without_member_is_empty() {
        let html = receipts_fragment(&ReceiptLog::default(), None).into_string();
        assert!(html.contains("אין קבלות"));
    }

    #[test]
    fn bot_reply_with_suggestions_renders_buttons() {
        let reply = BotReply {
            text: "מצאתי 1 פריט".into(),
            suggestions: vec![ListItem::new("חלב", Some(Category::Dairy))],
        };
        let html = chat_turn(date(), "מה חסר?", &reply).into_string();
        assert!(html.contains("הוסף הכל"));
        assert!(html.contains("לא תודה"));
        assert!(html.contains("חלב"));
    }
}
