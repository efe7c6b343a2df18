//! Screenshot evidence: the upload payload and its persistence.
//!
//! A single algorithm covers every submission. The image (if any) is written
//! to [`EvidenceStorage`] first, then the screenshot row is inserted with the
//! resulting reference. If the insert fails the file is removed again.
//! Permission gaps write no file and store an empty reference.

use std::path::{Path, PathBuf};

use crate::error::CoreError;
use crate::timer::{StoreError, TimerStore};
use crate::tracking::{NewScreenshot, Screenshot};
use crate::types::{DbId, Timestamp};

/// One tick's worth of evidence, ready to submit.
#[derive(Debug, Clone)]
pub struct EvidenceUpload {
    pub time_entry_id: DbId,
    pub captured_at: Timestamp,
    /// Encoded still image; `None` for a permission gap.
    pub image: Option<Vec<u8>>,
    pub permission_flag: bool,
}

impl EvidenceUpload {
    /// A successful capture.
    pub fn captured(time_entry_id: DbId, captured_at: Timestamp, image: Vec<u8>) -> Self {
        Self {
            time_entry_id,
            captured_at,
            image: Some(image),
            permission_flag: true,
        }
    }

    /// A permission gap: capture attempted but denied or unavailable.
    pub fn gap(time_entry_id: DbId, captured_at: Timestamp) -> Self {
        Self {
            time_entry_id,
            captured_at,
            image: None,
            permission_flag: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EvidenceError {
    #[error("an image is required when permission_flag is true")]
    MissingImage,

    #[error("unsupported image format (expected PNG or JPEG)")]
    UnsupportedFormat,

    #[error("evidence I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<EvidenceError> for CoreError {
    fn from(err: EvidenceError) -> Self {
        match err {
            EvidenceError::MissingImage | EvidenceError::UnsupportedFormat => {
                CoreError::Validation(err.to_string())
            }
            EvidenceError::Io(e) => CoreError::Internal(e.to_string()),
            EvidenceError::Store(e) => e.into(),
        }
    }
}

/// File extension for an accepted still-image encoding, sniffed from its
/// magic bytes.
pub fn image_extension(bytes: &[u8]) -> Option<&'static str> {
    match image::guess_format(bytes).ok()? {
        image::ImageFormat::Png => Some("png"),
        image::ImageFormat::Jpeg => Some("jpg"),
        _ => None,
    }
}

/// Directory holding screenshot image files.
///
/// References are file names relative to the root, so the directory can be
/// relocated without rewriting rows.
#[derive(Debug, Clone)]
pub struct EvidenceStorage {
    root: PathBuf,
}

impl EvidenceStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute-or-root-relative path of a stored reference.
    pub fn resolve(&self, image_ref: &str) -> PathBuf {
        self.root.join(image_ref)
    }

    /// Write an image for `time_entry_id` and return its reference.
    pub async fn write(&self, time_entry_id: DbId, bytes: &[u8]) -> Result<String, EvidenceError> {
        let ext = image_extension(bytes).ok_or(EvidenceError::UnsupportedFormat)?;
        tokio::fs::create_dir_all(&self.root).await?;

        let image_ref = format!("{time_entry_id}-{}.{ext}", uuid::Uuid::now_v7());
        tokio::fs::write(self.resolve(&image_ref), bytes).await?;
        Ok(image_ref)
    }

    /// Best-effort removal of a stored image.
    pub async fn remove(&self, image_ref: &str) {
        if let Err(e) = tokio::fs::remove_file(self.resolve(image_ref)).await {
            tracing::warn!(image_ref, error = %e, "Failed to remove orphaned screenshot file");
        }
    }
}

/// Persist one upload: image file first, then the screenshot row.
pub async fn record_evidence<S: TimerStore>(
    store: &S,
    storage: &EvidenceStorage,
    upload: EvidenceUpload,
) -> Result<Screenshot, EvidenceError> {
    let image_ref = match (upload.permission_flag, upload.image.as_deref()) {
        (true, Some(bytes)) if !bytes.is_empty() => {
            storage.write(upload.time_entry_id, bytes).await?
        }
        (true, _) => return Err(EvidenceError::MissingImage),
        (false, _) => String::new(),
    };

    let input = NewScreenshot {
        time_entry_id: upload.time_entry_id,
        captured_at: upload.captured_at,
        image_ref,
        permission_flag: upload.permission_flag,
    };

    match store.create_screenshot(&input).await {
        Ok(screenshot) => Ok(screenshot),
        Err(e) => {
            if !input.image_ref.is_empty() {
                storage.remove(&input.image_ref).await;
            }
            Err(e.into())
        }
    }
}
