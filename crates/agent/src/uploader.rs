//! Evidence uploaders: move one tick's screenshot to the server.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;
use worktrace_core::evidence::{image_extension, EvidenceUpload};
use worktrace_core::tracking::Screenshot;

use crate::client::{ApiClient, ClientError};

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("upload transport failed: {0}")]
    Transport(String),

    #[error("upload rejected ({status}): {message}")]
    Rejected { status: u16, message: String },
}

impl From<ClientError> for UploadError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Transport(e) => UploadError::Transport(e.to_string()),
            ClientError::Rejected { status, message } => UploadError::Rejected {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl UploadError {
    /// The entry the screenshot belonged to no longer accepts evidence.
    pub fn is_missing_entry(&self) -> bool {
        matches!(self, UploadError::Rejected { status, .. } if *status == StatusCode::NOT_FOUND.as_u16())
    }
}

/// Persists one screenshot record (image plus metadata).
#[async_trait]
pub trait EvidenceUploader: Send + Sync {
    async fn upload(&self, upload: EvidenceUpload) -> Result<Screenshot, UploadError>;
}

/// Uploads evidence to `POST /api/v1/screenshots` as multipart form data.
#[derive(Debug, Clone)]
pub struct HttpEvidenceUploader {
    client: ApiClient,
}

impl HttpEvidenceUploader {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

/// Build the multipart body for one upload. A gap carries no image part.
pub fn evidence_form(upload: EvidenceUpload) -> Form {
    let mut form = Form::new()
        .text("time_entry_id", upload.time_entry_id.to_string())
        .text("permission_flag", upload.permission_flag.to_string())
        .text("captured_at", upload.captured_at.to_rfc3339());

    if let (true, Some(image)) = (upload.permission_flag, upload.image) {
        let ext = image_extension(&image).unwrap_or("bin");
        let file_name = format!("screenshot.{ext}");
        form = form.part("image", Part::bytes(image).file_name(file_name));
    }
    form
}

#[async_trait]
impl EvidenceUploader for HttpEvidenceUploader {
    async fn upload(&self, upload: EvidenceUpload) -> Result<Screenshot, UploadError> {
        Ok(self.client.submit_screenshot(evidence_form(upload)).await?)
    }
}
