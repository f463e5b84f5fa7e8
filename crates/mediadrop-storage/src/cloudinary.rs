//! Cloudinary backend
//!
//! Uses the signed upload REST API directly: `POST {api_base}/{cloud}/auto/upload`
//! with a SHA-256 request signature, so no SDK is needed.

use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter, Result as FmtResult};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tokio_util::io::ReaderStream;

use crate::traits::{HostedMedia, MediaHost, StorageError, StorageResult};
use crate::MediaHostBackend;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(300);

pub struct CloudinaryHost {
    http_client: reqwest::Client,
    cloud_name: String,
    api_key: String,
    api_secret: String,
    api_base: String,
}

impl Debug for CloudinaryHost {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("CloudinaryHost")
            .field("cloud_name", &self.cloud_name)
            .field("api_base", &self.api_base)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
    #[serde(default)]
    bytes: u64,
    format: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Hex SHA-256 of the `&`-joined, key-sorted parameters followed by the secret.
pub fn sign_params(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let to_sign = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

impl CloudinaryHost {
    pub fn new(
        cloud_name: String,
        api_key: String,
        api_secret: String,
        api_base: String,
    ) -> StorageResult<Self> {
        if cloud_name.is_empty() || api_key.is_empty() || api_secret.is_empty() {
            return Err(StorageError::ConfigError(
                "CLOUD_NAME, CLOUD_KEY and CLOUD_SECRET must all be set".to_string(),
            ));
        }

        let http_client = reqwest::Client::builder()
            .timeout(UPLOAD_TIMEOUT)
            .build()
            .map_err(|e| StorageError::ConfigError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            cloud_name,
            api_key,
            api_secret,
            api_base: api_base.trim_end_matches('/').to_string(),
        })
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/auto/upload", self.api_base, self.cloud_name)
    }

    fn ping_url(&self) -> String {
        format!("{}/{}/resources/image", self.api_base, self.cloud_name)
    }

    async fn error_message(response: reqwest::Response) -> String {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        serde_json::from_str::<ErrorEnvelope>(&text)
            .map(|envelope| envelope.error.message)
            .unwrap_or(text)
    }
}

#[async_trait]
impl MediaHost for CloudinaryHost {
    #[tracing::instrument(skip(self, path), fields(cloud = %self.cloud_name))]
    async fn upload_file(
        &self,
        path: &Path,
        filename: &str,
        content_type: &str,
    ) -> StorageResult<HostedMedia> {
        let file = tokio::fs::File::open(path).await?;
        let size = file.metadata().await?.len();
        let start = std::time::Instant::now();

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let mut params = BTreeMap::new();
        params.insert("timestamp", timestamp.clone());
        let signature = sign_params(&params, &self.api_secret);

        let body = reqwest::Body::wrap_stream(ReaderStream::new(file));
        let file_part = Part::stream_with_length(body, size)
            .file_name(filename.to_string())
            .mime_str(content_type)
            .map_err(|e| StorageError::UploadFailed(format!("Invalid content type: {}", e)))?;

        let form = Form::new()
            .part("file", file_part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http_client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| StorageError::BackendError(format!("Failed to reach Cloudinary: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let message = Self::error_message(response).await;
            tracing::warn!(status = status.as_u16(), error = %message, "Cloudinary rejected upload");
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let uploaded: UploadResponse = response.json().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to parse Cloudinary response: {}", e))
        })?;

        tracing::info!(
            public_id = %uploaded.public_id,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Cloudinary upload successful"
        );

        Ok(HostedMedia {
            public_id: uploaded.public_id,
            secure_url: uploaded.secure_url,
            bytes: if uploaded.bytes > 0 {
                uploaded.bytes
            } else {
                size
            },
            format: uploaded.format,
        })
    }

    async fn health_check(&self) -> StorageResult<()> {
        let response = self
            .http_client
            .get(self.ping_url())
            .query(&[("max_results", "1")])
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .timeout(Duration::from_secs(5))
            .send()
            .await
            .map_err(|e| StorageError::BackendError(format!("Failed to reach Cloudinary: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(StorageError::Rejected {
                status: status.as_u16(),
                message: Self::error_message(response).await,
            });
        }
        Ok(())
    }

    fn backend_type(&self) -> MediaHostBackend {
        MediaHostBackend::Cloudinary
    }
}
