//! # HTTP Handlers — The Application's Endpoints
//!
//! Every public function here is an Axum handler, mapped to a route in
//! [`super::create_router()`]. Handlers follow the HTMX fragment
//! pattern: they return HTML fragments (not full pages) which HTMX swaps
//! into the DOM.
//!
//! ## Response pattern
//!
//! | Handler | Method | Returns |
//! |---------|--------|---------|
//! | `index` | GET | full page |
//! | `list` | GET | list fragment (conflict notice for completed dates) |
//! | `add_item`, `toggle_item`, `adjust_quantity`, `delete_item`, `clear_purchased` | POST/DELETE | list fragment |
//! | `complete_list` | POST | notice + read-only view of the completed list |
//! | `history`, `history_view`, `delete_history` | GET/DELETE | history fragments |
//! | `chat`, `chat_accept_all`, `chat_dismiss` | POST | chat fragments |
//! | `price_suggest` | GET | prefilled price-entry fragment |
//! | `apply_price` | POST | list fragment |
//! | `upload_receipt` | POST | confirmation/error fragment |
//! | `add_member`, `delete_member`, `select_member` | POST/DELETE | members fragment |
//!
//! ## Mutation discipline
//!
//! Mutating handlers hold the write lock only while touching state, then
//! call `state.saver.notify()` — persistence happens in the background
//! saver after its quiet period, never inline in a request.

use axum::extract::{Multipart, Path, Query, State};
use axum::response::Html;
use chrono::{NaiveDate, Utc};
use maud::html;
use uuid::Uuid;

use super::state::AppState;
use super::templates;
use crate::assistant;
use crate::core::{normalize_item_name, Category, ListItem};
use crate::receipts::{ReceiptKind, ReceiptRecord, ReceiptStore, UploadError};
use crate::session::SessionContext;

/// Converts Maud markup into Axum's `Html<String>` response.
fn markup_to_html(m: maud::Markup) -> Html<String> {
    Html(m.into_string())
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

// ─── Pages ───────────────────────────────────────────────────────

/// GET `/` — the full page for today's list.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let data = state.data.read();
    markup_to_html(templates::full_page(
        &data.store,
        &data.household,
        &data.receipts,
        today(),
    ))
}

// ─── List fragments ──────────────────────────────────────────────

/// Query/form fields shared by the list endpoints. A missing date means
/// "today".
#[derive(serde::Deserialize)]
pub struct DateParam {
    pub date: Option<NaiveDate>,
}

impl DateParam {
    fn resolve(&self) -> NaiveDate {
        self.date.unwrap_or_else(today)
    }
}

/// GET `/list?date=` — the list fragment for a date.
///
/// A date whose list was already completed is blocked: the completed
/// list is shown read-only behind a notice instead of an editable list.
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<DateParam>,
) -> Html<String> {
    let date = params.resolve();
    let data = state.data.read();
    if let Some(completed) = data.store.completed_for_date(date) {
        return markup_to_html(html! {
            (templates::notice(&format!(
                "הרשימה לתאריך {} כבר הושלמה ונמצאת בהיסטוריה",
                date.format("%d/%m/%Y")
            )))
            (templates::history_view(completed))
        });
    }
    markup_to_html(templates::list_fragment(&data.store, date, None))
}

/// Form for POST `/items`: name, optional category label, date.
#[derive(serde::Deserialize)]
pub struct AddItemForm {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    pub date: Option<NaiveDate>,
}

/// POST `/items` — adds an item to the date's list. Also used by the
/// chat's per-suggestion add buttons.
pub async fn add_item(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<AddItemForm>,
) -> Html<String> {
    let name = form.name.trim().to_string();
    let date = form.date.unwrap_or_else(today);
    if name.is_empty() {
        let data = state.data.read();
        return markup_to_html(templates::list_fragment(&data.store, date, None));
    }
    let category = form
        .category
        .as_deref()
        .filter(|s| !s.is_empty())
        .and_then(Category::from_label);

    let mut data = state.data.write();
    data.store.add_item(date, ListItem::new(name, category));
    let markup = templates::list_fragment(&data.store, date, None);
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

/// POST `/items/{id}/toggle` — flips the purchased flag.
pub async fn toggle_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Form(form): axum::Form<DateParam>,
) -> Html<String> {
    let date = form.resolve();
    let mut data = state.data.write();
    let markup = match data.store.item_mut(date, id) {
        Ok(item) => {
            item.purchased = !item.purchased;
            templates::list_fragment(&data.store, date, None)
        }
        Err(e) => templates::list_fragment(&data.store, date, Some(&e.to_string())),
    };
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

/// Form for POST `/items/{id}/quantity`.
#[derive(serde::Deserialize)]
pub struct QuantityForm {
    pub date: Option<NaiveDate>,
    pub delta: i32,
}

/// POST `/items/{id}/quantity` — adjusts quantity by ±1 (never below 1).
pub async fn adjust_quantity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    axum::Form(form): axum::Form<QuantityForm>,
) -> Html<String> {
    let date = form.date.unwrap_or_else(today);
    let mut data = state.data.write();
    let markup = match data.store.item_mut(date, id) {
        Ok(item) => {
            item.adjust_quantity(form.delta);
            templates::list_fragment(&data.store, date, None)
        }
        Err(e) => templates::list_fragment(&data.store, date, Some(&e.to_string())),
    };
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

/// DELETE `/items/{id}` — removes an item from the date's list.
///
/// htmx sends DELETE values as URL parameters, not a form body, so the
/// date arrives on the query string.
pub async fn delete_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(form): Query<DateParam>,
) -> Html<String> {
    let date = form.resolve();
    let mut data = state.data.write();
    let conflict = data.store.remove_item(date, id).err().map(|e| e.to_string());
    let markup = templates::list_fragment(&data.store, date, conflict.as_deref());
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

/// POST `/items/clear-purchased` — drops every purchased item.
pub async fn clear_purchased(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<DateParam>,
) -> Html<String> {
    let date = form.resolve();
    let mut data = state.data.write();
    let removed = data.store.clear_purchased(date);
    tracing::debug!(%date, removed, "clear purchased");
    let markup = templates::list_fragment(&data.store, date, None);
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

/// POST `/list/complete` — moves the date's list into history.
///
/// On conflict (a completed list already exists for the date) the
/// current list is left untouched and the fragment opens with the
/// conflict notice.
pub async fn complete_list(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<DateParam>,
) -> Html<String> {
    let date = form.resolve();
    let mut data = state.data.write();
    let panel = match data.store.complete(date) {
        Ok(()) => {
            let notice = format!(
                "הרשימה של {} הושלמה ונשמרה בהיסטוריה",
                date.format("%d/%m/%Y")
            );
            match data.store.completed_for_date(date) {
                Some(completed) => html! {
                    (templates::notice(&notice))
                    (templates::history_view(completed))
                },
                None => templates::notice(&notice),
            }
        }
        Err(e) => {
            tracing::warn!(%date, error = %e, "list completion refused");
            templates::list_fragment(&data.store, date, Some(&e.to_string()))
        }
    };
    let markup = html! {
        (panel)
        div hx-swap-oob="innerHTML:#history-panel" {
            (templates::history_sidebar(&data.store))
        }
    };
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

// ─── History ─────────────────────────────────────────────────────

/// GET `/history` — the history sidebar fragment.
pub async fn history(State(state): State<AppState>) -> Html<String> {
    let data = state.data.read();
    markup_to_html(templates::history_sidebar(&data.store))
}

/// GET `/history/{date}` — read-only view of a completed list.
pub async fn history_view(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Html<String> {
    let data = state.data.read();
    match data.store.completed_for_date(date) {
        Some(list) => markup_to_html(templates::history_view(list)),
        None => markup_to_html(templates::error_notice("הרשימה לא נמצאה בהיסטוריה")),
    }
}

/// DELETE `/history/{date}` — removes a completed list from history.
pub async fn delete_history(
    State(state): State<AppState>,
    Path(date): Path<NaiveDate>,
) -> Html<String> {
    let mut data = state.data.write();
    data.store.delete_completed(date);
    let markup = templates::history_sidebar(&data.store);
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

// ─── Chat ────────────────────────────────────────────────────────

/// Form for POST `/chat`.
#[derive(serde::Deserialize)]
pub struct ChatForm {
    pub message: String,
    pub date: Option<NaiveDate>,
}

/// POST `/chat` — one chat turn: the user's message plus the assistant's
/// reply, with suggestion buttons when the reply carries any.
pub async fn chat(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<ChatForm>,
) -> Html<String> {
    let text = form.message.trim().to_string();
    if text.is_empty() {
        return markup_to_html(html! {});
    }
    let date = form.date.unwrap_or_else(today);
    let data = state.data.read();
    let reply = assistant::respond(&data.store, date, &text);
    tracing::info!(suggestions = reply.suggestions.len(), "chat turn");
    markup_to_html(templates::chat_turn(date, &text, &reply))
}

/// Form for POST `/chat/accept-all`: the suggestion batch as a JSON
/// array of `[name, category-label]` pairs (HTMX sends `hx-vals` fields
/// as strings, hence the inner JSON).
#[derive(serde::Deserialize)]
pub struct AcceptAllForm {
    pub date: Option<NaiveDate>,
    pub items: String,
}

/// POST `/chat/accept-all` — adds every suggested item to the list and
/// confirms in the chat. The refreshed list goes out-of-band.
pub async fn chat_accept_all(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<AcceptAllForm>,
) -> Html<String> {
    let date = form.date.unwrap_or_else(today);
    let batch: Vec<(String, Option<String>)> =
        serde_json::from_str(&form.items).unwrap_or_default();
    if batch.is_empty() {
        return markup_to_html(templates::bot_message(
            "לא נמצאו פריטים להוספה. נסה לשאול שוב מה חסר.",
        ));
    }

    let mut data = state.data.write();
    let count = batch.len();
    for (name, label) in batch {
        let category = label.as_deref().and_then(Category::from_label);
        data.store.add_item(date, ListItem::new(name, category));
    }
    let markup = html! {
        (templates::bot_message(&assistant::added_reply(count)))
        div hx-swap-oob="innerHTML:#list-panel" {
            (templates::list_fragment(&data.store, date, None))
        }
    };
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

/// POST `/chat/dismiss` — acknowledges a declined suggestion batch.
pub async fn chat_dismiss() -> Html<String> {
    markup_to_html(templates::bot_message(assistant::DISMISSED))
}

// ─── Prices ──────────────────────────────────────────────────────

/// Query for GET `/prices/suggest`. The price form's other fields ride
/// along via `hx-include` and are ignored here.
#[derive(serde::Deserialize)]
pub struct PriceSuggestQuery {
    pub vendor: String,
    pub item: String,
}

/// GET `/prices/suggest?vendor=&item=` — the price-entry fragment,
/// prefilled with the price the acting member last saw for this item at
/// this vendor. The vendor input fetches it on change and htmx swaps it
/// into the price form.
pub async fn price_suggest(
    State(state): State<AppState>,
    Query(query): Query<PriceSuggestQuery>,
) -> Html<String> {
    let data = state.data.read();
    let session = SessionContext::for_household(&data.household);
    let Some(member) = session.member_id else {
        return markup_to_html(templates::price_entry(None, &[]));
    };
    let quote = data.prices.suggest(member, &query.vendor, &query.item);

    // Other remembered prices at this vendor become a hint line under
    // the input; the item being priced is already in the input itself.
    let current = normalize_item_name(&query.item);
    let mut vendor_prices: Vec<(String, f64)> = data
        .prices
        .for_vendor(member, &query.vendor)
        .into_iter()
        .filter(|(name, _)| *name != current.as_str())
        .map(|(name, q)| (name.to_string(), q.unit_price))
        .collect();
    vendor_prices.sort_by(|a, b| a.0.cmp(&b.0));

    markup_to_html(templates::price_entry(quote, &vendor_prices))
}

/// Form for POST `/prices`.
#[derive(serde::Deserialize)]
pub struct PriceForm {
    pub date: Option<NaiveDate>,
    pub item_id: Uuid,
    pub vendor: String,
    pub price: f64,
    #[serde(default)]
    pub currency: Option<String>,
}

/// POST `/prices` — applies a unit price to one item and remembers it
/// for the acting member at this vendor.
pub async fn apply_price(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<PriceForm>,
) -> Html<String> {
    let date = form.date.unwrap_or_else(today);
    let currency = form.currency.as_deref().unwrap_or("ILS");
    let mut data = state.data.write();

    let member = SessionContext::for_household(&data.household).member_id;
    let markup = match data.store.item_mut(date, form.item_id) {
        Ok(item) => {
            item.apply_price(form.price, currency);
            let name = item.name.clone();
            if let Some(member) = member {
                data.prices
                    .remember(member, &form.vendor, &name, form.price, currency);
            }
            templates::list_fragment(&data.store, date, None)
        }
        Err(e) => templates::list_fragment(&data.store, date, Some(&e.to_string())),
    };
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

// ─── Receipts ────────────────────────────────────────────────────

/// POST `/receipts/upload` — multipart upload of a receipt image.
///
/// ## Flow
///
/// ```text
/// 1. read "file" field (+ optional "date", "type")
/// 2. resolve acting member (required)
/// 3. validate content type (image/*) and size (≤ 10MB)
/// 4. write blob under data/receipts/<member>/<receipt>/
/// 5. append ReceiptRecord to state
///    └── on failure: remove the blob again (best effort)
/// ```
pub async fn upload_receipt(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Html<String> {
    let mut file: Option<(String, String, Vec<u8>)> = None;
    let mut list_date: Option<NaiveDate> = None;
    let mut kind = ReceiptKind::Receipt;

    while let Ok(Some(field)) = multipart.next_field().await {
        match field.name().unwrap_or("") {
            "file" => {
                let filename = field.file_name().unwrap_or("receipt.jpg").to_string();
                let content_type = field.content_type().unwrap_or("").to_string();
                match field.bytes().await {
                    Ok(bytes) => file = Some((filename, content_type, bytes.to_vec())),
                    Err(e) => {
                        tracing::warn!(error = %e, "receipt upload read failed");
                        return markup_to_html(templates::error_notice(
                            "קריאת הקובץ נכשלה, נסו שוב",
                        ));
                    }
                }
            }
            "date" => {
                list_date = field
                    .text()
                    .await
                    .ok()
                    .and_then(|s| s.parse::<NaiveDate>().ok());
            }
            "type" => {
                if matches!(field.text().await.as_deref(), Ok("photo")) {
                    kind = ReceiptKind::Photo;
                }
            }
            _ => {}
        }
    }

    let Some((filename, content_type, bytes)) = file else {
        return markup_to_html(templates::error_notice(&UploadError::MissingFile.to_string()));
    };
    let session = { SessionContext::for_household(&state.data.read().household) };
    let Some(member) = session.member_id else {
        return markup_to_html(templates::error_notice(
            &UploadError::MissingMember.to_string(),
        ));
    };
    if let Err(e) = ReceiptStore::validate(&content_type, bytes.len()) {
        tracing::warn!(%content_type, size = bytes.len(), error = %e, "upload refused");
        return markup_to_html(templates::error_notice(&e.to_string()));
    }

    let receipt_id = Uuid::new_v4();
    let image_path = match state
        .receipts
        .store_image(member, receipt_id, &filename, &bytes)
    {
        Ok(path) => path,
        Err(e) => {
            tracing::error!(error = %e, "storing receipt image failed");
            return markup_to_html(templates::error_notice("שמירת התמונה נכשלה"));
        }
    };

    // Record after blob; if the record cannot be added, take the blob
    // back out so no orphan remains.
    {
        let mut data = state.data.write();
        if data.household.member(member).is_none() {
            drop(data);
            state.receipts.remove_image(&image_path);
            return markup_to_html(templates::error_notice("בן המשפחה לא נמצא"));
        }
        data.receipts.add(ReceiptRecord {
            id: receipt_id,
            member_id: member,
            list_date,
            kind,
            image_path: image_path.clone(),
            currency: "ILS".to_string(),
            uploaded_at: Utc::now(),
        });
    }
    state.saver.notify();

    let data = state.data.read();
    let receipts_panel = templates::receipts_fragment(&data.receipts, Some(member));
    markup_to_html(html! {
        div class="notice" {
            "הקבלה נשמרה בהצלחה. "
            a href={ "/receipts/files/" (image_path) } target="_blank" { "צפייה בתמונה" }
        }
        div hx-swap-oob="innerHTML:#receipts-list" { (receipts_panel) }
    })
}

// ─── Members ─────────────────────────────────────────────────────

/// Form for POST `/users`.
#[derive(serde::Deserialize)]
pub struct AddMemberForm {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

/// POST `/users` — adds a household member.
pub async fn add_member(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<AddMemberForm>,
) -> Html<String> {
    let name = form.name.trim().to_string();
    let mut data = state.data.write();
    if !name.is_empty() {
        data.household.add_member(name, form.color);
    }
    let markup = templates::members_fragment(&data.household);
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

/// DELETE `/users/{id}` — removes a member. The acting-member preference
/// falls back to the oldest remaining member.
pub async fn delete_member(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Html<String> {
    let mut data = state.data.write();
    data.household.remove_member(id);
    let markup = templates::members_fragment(&data.household);
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

/// Form for POST `/session/user`.
#[derive(serde::Deserialize)]
pub struct SelectMemberForm {
    pub member: Uuid,
}

/// POST `/session/user` — records the acting member.
pub async fn select_member(
    State(state): State<AppState>,
    axum::Form(form): axum::Form<SelectMemberForm>,
) -> Html<String> {
    let mut data = state.data.write();
    if !data.household.select_member(form.member) {
        tracing::warn!(member = %form.member, "selecting unknown member ignored");
    }
    let markup = templates::members_fragment(&data.household);
    drop(data);
    state.saver.notify();
    markup_to_html(markup)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use parking_lot::RwLock;

    use crate::persistence::{spawn_saver, AppData};
    use crate::receipts::ReceiptStore;

    fn test_state() -> (AppState, std::path::PathBuf) {
        let dir = std::env::temp_dir().join(format!("grocery-handlers-{}", Uuid::new_v4()));
        let receipts = ReceiptStore::open(&dir).unwrap();
        let data = Arc::new(RwLock::new(AppData::default()));
        let saver = spawn_saver(data.clone());
        (AppState::new(data, receipts, saver), dir)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, d).unwrap()
    }

    #[tokio::test]
    async fn delete_item_targets_the_requested_date() {
        // htmx sends DELETE values as URL parameters, so the handler
        // must read the date from the query string; a body-only
        // extractor would silently fall back to today and miss the list.
        let (state, dir) = test_state();
        let id = state
            .data
            .write()
            .store
            .add_item(date(1), ListItem::new("חלב", None));

        delete_item(
            State(state.clone()),
            Path(id),
            Query(DateParam { date: Some(date(1)) }),
        )
        .await;

        let data = state.data.read();
        assert!(data.store.current(date(1)).unwrap().items.is_empty());
        drop(data);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn price_suggest_prefills_remembered_price() {
        let (state, dir) = test_state();
        {
            let mut data = state.data.write();
            let member = data.household.add_member("אמא", None);
            data.prices.remember(member, "שופרסל", "עגבניות", 5.90, "ILS");
            data.prices.remember(member, "שופרסל", "לחם", 8.00, "ILS");
        }

        let Html(html) = price_suggest(
            State(state),
            Query(PriceSuggestQuery {
                vendor: "שופרסל".into(),
                item: "עגבניות".into(),
            }),
        )
        .await;

        assert!(html.contains(r#"value="5.90""#), "got: {html}");
        // The vendor's other prices show as a hint; the item being
        // priced does not repeat itself there.
        assert!(html.contains("לחם"));
        assert!(!html.contains("עגבניות"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn price_suggest_without_members_returns_bare_input() {
        let (state, dir) = test_state();
        let Html(html) = price_suggest(
            State(state),
            Query(PriceSuggestQuery {
                vendor: "שופרסל".into(),
                item: "חלב".into(),
            }),
        )
        .await;

        assert!(html.contains(r#"name="price""#));
        assert!(!html.contains("value="));
        std::fs::remove_dir_all(&dir).ok();
    }
}
