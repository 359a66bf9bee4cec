#![allow(dead_code)]
//! # Grocery Chat — Household Shopping Lists with a Hebrew Assistant
//!
//! **Entry point** of the application: one server per household, serving
//! daily shopping lists, purchase history, remembered prices, receipt
//! uploads, and a chat assistant that suggests items the household
//! usually buys but forgot to list.
//!
//! ## Startup flow
//!
//! ```text
//! main()
//!   ├── configure tracing (RUST_LOG, default "info")
//!   ├── load data/app.json (or start empty)
//!   ├── open the receipt blob store (data/receipts/)
//!   ├── spawn the debounced saver task
//!   ├── build AppState + Router
//!   └── serve on 0.0.0.0:3000
//! ```
//!
//! ## Usage
//!
//! ```bash
//! cargo run                    # default logs (info)
//! RUST_LOG=debug cargo run     # verbose
//! # open http://localhost:3000
//! ```

/// `assistant` module — category detection, missing-item analysis, chat.
mod assistant;

/// `core` module — categories, items, lists, the store, price memory.
mod core;

/// `persistence` module — JSON snapshot + debounced background saver.
mod persistence;

/// `receipts` module — receipt image blobs and records.
mod receipts;

/// `session` module — household members and the acting member.
mod session;

/// `web` module — Axum server, handlers, Maud templates.
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tracing_subscriber::EnvFilter;

use crate::receipts::ReceiptStore;
use crate::web::state::AppState;

/// Receipt image blobs live next to the JSON snapshot.
const RECEIPTS_DIR: &str = "data/receipts";

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🛒 grocery-chat starting");

    let data = Arc::new(RwLock::new(persistence::load_data()?));
    let receipts = ReceiptStore::open(RECEIPTS_DIR)?;
    let saver = persistence::spawn_saver(data.clone());

    let state = AppState::new(data, receipts, saver);
    let router = web::create_router(state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .context("binding port 3000")?;
    tracing::info!("listening on http://localhost:3000");
    axum::serve(listener, router).await.context("server error")?;
    Ok(())
}
