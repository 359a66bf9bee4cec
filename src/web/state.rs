//! # Web Application State
//!
//! One [`AppState`] is cloned into every handler via Axum's `State`
//! extractor. All persistent data sits behind a single
//! `Arc<parking_lot::RwLock<AppData>>` — handlers take the lock for the
//! shortest span that covers their read or mutation, and signal the
//! debounced saver after every mutation instead of writing to disk
//! themselves.

use std::sync::Arc;

use crate::persistence::{SaveSignal, SharedData};
use crate::receipts::ReceiptStore;

/// Shared state of the Axum application.
#[derive(Clone)]
pub struct AppState {
    /// All persistent data (lists, prices, household, receipt records).
    pub data: SharedData,
    /// Blob store for receipt images.
    pub receipts: Arc<ReceiptStore>,
    /// Signals the background saver after a mutation.
    pub saver: SaveSignal,
}

impl AppState {
    pub fn new(data: SharedData, receipts: ReceiptStore, saver: SaveSignal) -> Self {
        Self {
            data,
            receipts: Arc::new(receipts),
            saver,
        }
    }
}
