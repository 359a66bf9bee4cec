//! # Receipts — Uploaded Receipt Images and Their Records
//!
//! A receipt upload has two halves that must stay consistent:
//!
//! 1. the image blob, written under `data/receipts/<member>/<receipt>/original.<ext>`
//! 2. the [`ReceiptRecord`] in application state, pointing at the blob
//!
//! [`ReceiptStore`] owns the blob side and validates uploads before any
//! byte touches disk (content type must be `image/*`, size at most
//! [`MAX_RECEIPT_BYTES`]). When record creation fails after the blob was
//! written, the caller removes the blob again with
//! [`ReceiptStore::remove_image`] — best effort, an orphaned file is a
//! nuisance, a dangling record is a bug.

use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Upload size cap: 10 MB.
pub const MAX_RECEIPT_BYTES: usize = 10 * 1024 * 1024;

/// What the uploaded image depicts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReceiptKind {
    /// A purchase receipt.
    Receipt,
    /// A photo of the groceries themselves.
    Photo,
}

impl Default for ReceiptKind {
    fn default() -> Self {
        ReceiptKind::Receipt
    }
}

/// Why an upload was refused. All variants map to a user-facing notice.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UploadError {
    #[error("לא צורף קובץ")]
    MissingFile,

    #[error("יש לבחור בן משפחה לפני העלאת קבלה")]
    MissingMember,

    #[error("הקובץ חייב להיות תמונה")]
    NotAnImage,

    #[error("גודל הקובץ חייב להיות עד 10MB")]
    TooLarge,
}

/// One stored receipt, serialized as part of the application state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ReceiptRecord {
    pub id: Uuid,
    pub member_id: Uuid,
    /// Date of the list this receipt belongs to, if known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub list_date: Option<NaiveDate>,
    #[serde(default)]
    pub kind: ReceiptKind,
    /// Blob path relative to the receipts root, e.g.
    /// `"<member>/<receipt>/original.jpg"`.
    pub image_path: String,
    pub currency: String,
    pub uploaded_at: DateTime<Utc>,
}

/// Filesystem store for receipt image blobs.
pub struct ReceiptStore {
    root: PathBuf,
}

impl ReceiptStore {
    /// Opens (and creates if needed) the blob root directory.
    pub fn open(root: impl Into<PathBuf>) -> anyhow::Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("creating receipts dir {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validates an upload before anything is written.
    pub fn validate(content_type: &str, size: usize) -> Result<(), UploadError> {
        if !content_type.starts_with("image/") {
            return Err(UploadError::NotAnImage);
        }
        if size > MAX_RECEIPT_BYTES {
            return Err(UploadError::TooLarge);
        }
        Ok(())
    }

    /// Writes the image blob for a new receipt and returns its relative
    /// path. The extension comes from the uploaded filename, defaulting
    /// to `jpg`.
    pub fn store_image(
        &self,
        member_id: Uuid,
        receipt_id: Uuid,
        original_filename: &str,
        bytes: &[u8],
    ) -> anyhow::Result<String> {
        let extension = Path::new(original_filename)
            .extension()
            .and_then(|e| e.to_str())
            .filter(|e| e.chars().all(|c| c.is_ascii_alphanumeric()))
            .unwrap_or("jpg");
        let relative = format!("{member_id}/{receipt_id}/original.{extension}");
        let full = self.root.join(&relative);

        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        std::fs::write(&full, bytes)
            .with_context(|| format!("writing {}", full.display()))?;
        tracing::info!(path = %relative, size = bytes.len(), "receipts: image stored");
        Ok(relative)
    }

    /// Removes a stored blob (and its now-empty receipt directory).
    ///
    /// Best effort: used to compensate when record creation fails after
    /// the blob was written. Failures are logged, not propagated.
    pub fn remove_image(&self, relative: &str) {
        let full = self.root.join(relative);
        if let Err(e) = std::fs::remove_file(&full) {
            tracing::warn!(path = %relative, error = %e, "receipts: cleanup failed");
            return;
        }
        if let Some(dir) = full.parent() {
            let _ = std::fs::remove_dir(dir);
        }
    }
}

/// Log of receipt records, kept in application state alongside the lists.
#[derive(Default, Serialize, Deserialize)]
pub struct ReceiptLog {
    records: Vec<ReceiptRecord>,
}

impl ReceiptLog {
    pub fn add(&mut self, record: ReceiptRecord) {
        self.records.push(record);
    }

    /// Records for one member, newest first.
    pub fn for_member(&self, member_id: Uuid) -> Vec<&ReceiptRecord> {
        let mut records: Vec<&ReceiptRecord> = self
            .records
            .iter()
            .filter(|r| r.member_id == member_id)
            .collect();
        records.sort_by(|a, b| b.uploaded_at.cmp(&a.uploaded_at));
        records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_non_images() {
        assert_eq!(
            ReceiptStore::validate("application/pdf", 100),
            Err(UploadError::NotAnImage)
        );
        assert!(ReceiptStore::validate("image/png", 100).is_ok());
    }

    #[test]
    fn validate_enforces_size_cap() {
        assert!(ReceiptStore::validate("image/jpeg", MAX_RECEIPT_BYTES).is_ok());
        assert_eq!(
            ReceiptStore::validate("image/jpeg", MAX_RECEIPT_BYTES + 1),
            Err(UploadError::TooLarge)
        );
    }

    #[test]
    fn store_and_remove_image_roundtrip() {
        let dir = std::env::temp_dir().join(format!("receipts-test-{}", Uuid::new_v4()));
        let store = ReceiptStore::open(&dir).unwrap();
        let member = Uuid::new_v4();
        let receipt = Uuid::new_v4();

        let rel = store
            .store_image(member, receipt, "kabala.png", b"not-really-a-png")
            .unwrap();
        assert_eq!(rel, format!("{member}/{receipt}/original.png"));
        assert!(dir.join(&rel).exists());

        store.remove_image(&rel);
        assert!(!dir.join(&rel).exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn odd_filenames_fall_back_to_jpg() {
        let dir = std::env::temp_dir().join(format!("receipts-test-{}", Uuid::new_v4()));
        let store = ReceiptStore::open(&dir).unwrap();

        let rel = store
            .store_image(Uuid::new_v4(), Uuid::new_v4(), "no-extension", b"x")
            .unwrap();
        assert!(rel.ends_with("original.jpg"));

        // Traversal attempts in the extension are not honored.
        let rel = store
            .store_image(Uuid::new_v4(), Uuid::new_v4(), "evil.%2e%2e", b"x")
            .unwrap();
        assert!(rel.ends_with("original.jpg"));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn log_filters_and_orders_per_member() {
        let mut log = ReceiptLog::default();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        for (member, secs) in [(a, 1), (b, 2), (a, 3)] {
            log.add(ReceiptRecord {
                id: Uuid::new_v4(),
                member_id: member,
                list_date: None,
                kind: ReceiptKind::Receipt,
                image_path: String::new(),
                currency: "ILS".into(),
                uploaded_at: Utc::now() + chrono::Duration::seconds(secs),
            });
        }

        let mine = log.for_member(a);
        assert_eq!(mine.len(), 2);
        assert!(mine[0].uploaded_at > mine[1].uploaded_at);
    }
}
