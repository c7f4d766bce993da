use serde_json::Value;
use tracing::{info, instrument};

use crate::error::AppError;

/// Client for the hosted media service that stores practice recordings.
/// The service takes raw file bytes plus an unsigned upload preset and
/// answers with a public URL.
#[derive(Clone)]
pub struct MediaUploader {
    upload_url: String,
    upload_preset: String,
}

impl MediaUploader {
    pub fn from_env() -> Option<Self> {
        let upload_url = std::env::var("MEDIA_UPLOAD_URL")
            .ok()
            .filter(|s| !s.is_empty())?;
        let upload_preset = std::env::var("MEDIA_UPLOAD_PRESET").unwrap_or_default();
        Some(Self {
            upload_url,
            upload_preset,
        })
    }

    // Blocking; callers on the async side go through spawn_blocking
    #[instrument(skip(self, bytes))]
    pub fn upload(&self, bytes: &[u8]) -> Result<String, AppError> {
        info!(size = bytes.len(), "Uploading recording to media host");

        let url = format!("{}?upload_preset={}", self.upload_url, self.upload_preset);
        let response = ureq::post(&url)
            .header("content-type", "application/octet-stream")
            .send(bytes)
            .map_err(|e| AppError::Media(format!("Upload failed: {}", e)))?;

        let body: Value = response
            .into_body()
            .read_json()
            .map_err(|e| AppError::Media(format!("Unreadable media host response: {}", e)))?;

        body.get("secure_url")
            .or_else(|| body.get("url"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| AppError::Media("Media host response carried no URL".to_string()))
    }
}
