//! # Persistence — Application State on Disk
//!
//! Serializes the whole [`AppData`] as pretty-printed JSON in
//! `data/app.json` so the file stays hand-inspectable. Receipt image
//! blobs live next to it under `data/receipts/` and are managed by
//! [`ReceiptStore`](crate::receipts::ReceiptStore), not serialized here.
//!
//! ## When is state saved?
//!
//! Never directly from a handler. Every mutation sends a signal to the
//! saver task spawned by [`spawn_saver`], which waits for a 500 ms quiet
//! period before writing — a burst of edits (typing a quantity, checking
//! several items off) collapses into one write:
//!
//! ```text
//! signal ──► (re)start 500 ms timer ──► timer fires ──► save_data()
//!   ▲                                        │
//!   └──── another signal restarts it ────────┘
//! ```
//!
//! ## ⚠️ Atomicity
//!
//! The write is not atomic — a crash mid-write can corrupt the file.
//! Acceptable for a single-household app; the write-rename pattern is
//! the upgrade path if it ever bites.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::core::{ListStore, PriceBook};
use crate::receipts::ReceiptLog;
use crate::session::Household;

/// Path of the state file, relative to the working directory.
const DATA_PATH: &str = "data/app.json";

/// Quiet period after the last mutation before state hits disk.
const SAVE_DEBOUNCE: Duration = Duration::from_millis(500);

/// Everything the application persists, behind one lock.
#[derive(Default, serde::Serialize, serde::Deserialize)]
pub struct AppData {
    pub store: ListStore,
    pub prices: PriceBook,
    pub household: Household,
    pub receipts: ReceiptLog,
}

/// Shared handle to the application state.
pub type SharedData = Arc<RwLock<AppData>>;

/// Saves the state to disk as pretty-printed JSON, creating `data/` if
/// needed. Takes a read lock only for the serialization itself.
pub fn save_data(data: &SharedData) -> Result<()> {
    let path = Path::new(DATA_PATH);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).context("creating data/ directory")?;
    }
    let json = {
        let guard = data.read();
        serde_json::to_string_pretty(&*guard).context("serializing application state")?
    };
    std::fs::write(path, json).context("writing data/app.json")?;
    tracing::debug!("persistence: state saved");
    Ok(())
}

/// Loads the state from disk, or starts empty when no file exists.
///
/// # Errors
///
/// Fails when the file exists but cannot be read or no longer matches
/// the current schema — better to stop than to silently overwrite a
/// household's history with an empty state.
pub fn load_data() -> Result<AppData> {
    let path = Path::new(DATA_PATH);
    if !path.exists() {
        tracing::info!("no {} found, starting with empty state", DATA_PATH);
        return Ok(AppData::default());
    }
    let json = std::fs::read_to_string(path).context("reading data/app.json")?;
    let mut data: AppData = serde_json::from_str(&json).context("parsing data/app.json")?;
    // The price index is #[serde(skip)] and must be rebuilt after load.
    data.prices.rebuild_index();
    tracing::info!(
        active_lists = data.store.lists_by_date.len(),
        completed = data.store.completed_count(),
        prices = data.prices.len(),
        "persistence: state loaded"
    );
    Ok(data)
}

/// Handle used by handlers to signal "state changed, save soon".
///
/// The channel never blocks: if a signal is already pending the new one
/// is redundant and dropped.
#[derive(Clone)]
pub struct SaveSignal {
    tx: mpsc::Sender<()>,
}

impl SaveSignal {
    pub fn notify(&self) {
        let _ = self.tx.try_send(());
    }
}

/// Spawns the debounced saver task and returns its signal handle.
///
/// The task waits for a signal, then keeps restarting a 500 ms timer for
/// as long as further signals arrive; when the timer finally fires the
/// state is written once. Save failures are logged and the task keeps
/// running — losing one write must not kill persistence for the rest of
/// the process.
pub fn spawn_saver(data: SharedData) -> SaveSignal {
    let (tx, mut rx) = mpsc::channel::<()>(8);
    tokio::spawn(async move {
        while rx.recv().await.is_some() {
            loop {
                tokio::select! {
                    more = rx.recv() => {
                        if more.is_none() {
                            return;
                        }
                        // Timer restarts on the next loop iteration.
                    }
                    _ = tokio::time::sleep(SAVE_DEBOUNCE) => {
                        if let Err(e) = save_data(&data) {
                            tracing::error!(error = %e, "persistence: save failed");
                        }
                        break;
                    }
                }
            }
        }
    });
    SaveSignal { tx }
}
