//! # Web Module — The Shopping-List Interface
//!
//! The whole web layer is built with **Axum** + **HTMX** + **Maud**:
//! the server renders Hebrew HTML fragments and HTMX swaps them into
//! the page, so the UI needs no application-level JavaScript.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Browser (HTMX, dir=rtl)                                 │
//! ├─────────────────────────────────────────────────────────┤
//! │ Axum Router (this module)                               │
//! │  ├── GET  /                      → full page            │
//! │  ├── GET  /list                  → list fragment        │
//! │  ├── POST /items                 → add item             │
//! │  ├── POST /items/{id}/toggle     → purchased flag       │
//! │  ├── POST /items/{id}/quantity   → quantity ±1          │
//! │  ├── DEL  /items/{id}            → remove item          │
//! │  ├── POST /items/clear-purchased → drop purchased       │
//! │  ├── POST /list/complete         → move to history      │
//! │  ├── GET/DEL /history/{date}     → view / delete        │
//! │  ├── POST /chat                  → assistant turn       │
//! │  ├── POST /chat/accept-all       → add suggestion batch │
//! │  ├── GET  /prices/suggest        → prefill fragment     │
//! │  ├── POST /prices                → apply + remember     │
//! │  ├── POST /receipts/upload       → multipart (10MB)     │
//! │  └── /users, /session/user       → household members    │
//! ├─────────────────────────────────────────────────────────┤
//! │ Static files (tower_http::ServeDir)                     │
//! │  ├── /assets/*          → assets/                       │
//! │  └── /receipts/files/*  → data/receipts/                │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submodules
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`state`] | Shared state (`AppState`) |
//! | [`handlers`] | Axum handlers for each route |
//! | [`templates`] | Maud templates (server-side Hebrew HTML) |

pub mod handlers;
pub mod state;
pub mod templates;

use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::services::ServeDir;

use crate::receipts::MAX_RECEIPT_BYTES;
use state::AppState;

/// Builds the Axum router with every application route.
///
/// The upload route carries its own body limit matching the receipt
/// size cap (plus headroom for multipart framing). Receipt images are
/// served read-only from the blob root.
pub fn create_router(state: AppState) -> Router {
    let receipt_files = ServeDir::new(state.receipts.root().to_path_buf());
    Router::new()
        // ── Page ──────────────────────────────────────────────
        .route("/", get(handlers::index))
        // ── List ──────────────────────────────────────────────
        .route("/list", get(handlers::list))
        .route("/items", post(handlers::add_item))
        .route("/items/{id}/toggle", post(handlers::toggle_item))
        .route("/items/{id}/quantity", post(handlers::adjust_quantity))
        .route("/items/{id}", delete(handlers::delete_item))
        .route("/items/clear-purchased", post(handlers::clear_purchased))
        .route("/list/complete", post(handlers::complete_list))
        // ── History ───────────────────────────────────────────
        .route("/history", get(handlers::history))
        .route(
            "/history/{date}",
            get(handlers::history_view).delete(handlers::delete_history),
        )
        // ── Chat ──────────────────────────────────────────────
        .route("/chat", post(handlers::chat))
        .route("/chat/accept-all", post(handlers::chat_accept_all))
        .route("/chat/dismiss", post(handlers::chat_dismiss))
        // ── Prices ────────────────────────────────────────────
        .route("/prices/suggest", get(handlers::price_suggest))
        .route("/prices", post(handlers::apply_price))
        // ── Receipts ──────────────────────────────────────────
        .route(
            "/receipts/upload",
            post(handlers::upload_receipt)
                .layer(DefaultBodyLimit::max(MAX_RECEIPT_BYTES + 64 * 1024)),
        )
        // ── Household ─────────────────────────────────────────
        .route("/users", post(handlers::add_member))
        .route("/users/{id}", delete(handlers::delete_member))
        .route("/session/user", post(handlers::select_member))
        // ── Static files ──────────────────────────────────────
        .nest_service("/assets", ServeDir::new("assets"))
        .nest_service("/receipts/files", receipt_files)
        .with_state(state)
}
