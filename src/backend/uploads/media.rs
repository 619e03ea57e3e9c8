/**
 * Media Host Integration
 *
 * Uploaded images are not stored by the server; they are forwarded to a
 * hosted media service and the public URL it returns is handed back to the
 * client. `MediaStore` is the seam; `HostedMediaStore` talks to a
 * Cloudinary-compatible unsigned upload endpoint.
 */

use async_trait::async_trait;
use bytes::Bytes;
use serde::Deserialize;
use thiserror::Error;

use crate::backend::server::config::MediaConfig;

/// Errors talking to the media host
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media host request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("media host rejected the upload ({status}): {message}")]
    Rejected { status: u16, message: String },
}

/// An image received from a client
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Somewhere to put uploaded images
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `file` and return its public URL
    async fn store(&self, file: UploadedFile) -> Result<String, MediaError>;
}

/// Unsigned uploads to a hosted media service
#[derive(Debug, Clone)]
pub struct HostedMediaStore {
    client: reqwest::Client,
    endpoint: String,
    upload_preset: String,
    folder: String,
}

#[derive(Debug, Deserialize)]
struct HostedUploadResponse {
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct HostedErrorResponse {
    error: HostedErrorBody,
}

#[derive(Debug, Deserialize)]
struct HostedErrorBody {
    message: String,
}

impl HostedMediaStore {
    /// Store for the configured cloud account
    pub fn new(config: &MediaConfig) -> Self {
        let endpoint = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            config.cloud_name
        );
        Self::with_endpoint(endpoint, &config.upload_preset, &config.folder)
    }

    /// Store posting to an explicit endpoint URL
    pub fn with_endpoint(
        endpoint: impl Into<String>,
        upload_preset: impl Into<String>,
        folder: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: endpoint.into(),
            upload_preset: upload_preset.into(),
            folder: folder.into(),
        }
    }
}

#[async_trait]
impl MediaStore for HostedMediaStore {
    async fn store(&self, file: UploadedFile) -> Result<String, MediaError> {
        let part = reqwest::multipart::Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)?;
        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("upload_preset", self.upload_preset.clone())
            .text("folder", self.folder.clone());

        tracing::info!("Forwarding {} to media host", file.file_name);
        let response = self.client.post(&self.endpoint).multipart(form).send().await?;

        let status = response.status();
        if !status.is_success() {
            let message = match response.json::<HostedErrorResponse>().await {
                Ok(body) => body.error.message,
                Err(_) => status.canonical_reason().unwrap_or("upload failed").to_string(),
            };
            tracing::warn!("Media host rejected upload: {} {}", status, message);
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let body: HostedUploadResponse = response.json().await?;
        Ok(body.secure_url)
    }
}
