//! Media host abstraction trait

use std::path::Path;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::MediaHostBackend;

/// Media host operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Media host rejected the request ({status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Media host backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for media host operations
pub type StorageResult<T> = Result<T, StorageError>;

/// A file that is now publicly reachable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HostedMedia {
    /// Backend-specific identifier.
    pub public_id: String,
    /// Public HTTPS (or, for the local backend, configured base) URL.
    pub secure_url: String,
    pub bytes: u64,
    /// Format reported by the host, e.g. `jpg` or `mp4`.
    pub format: Option<String>,
}

/// Backend that turns a local file into a public URL.
///
/// The caller owns `path` and removes it after `upload_file` returns; backends
/// must not move or delete it.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload_file(
        &self,
        path: &Path,
        filename: &str,
        content_type: &str,
    ) -> StorageResult<HostedMedia>;

    /// Cheap reachability probe used by `/health`.
    async fn health_check(&self) -> StorageResult<()>;

    fn backend_type(&self) -> MediaHostBackend;
}
