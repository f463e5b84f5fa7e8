use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use crate::traits::{HostedMedia, MediaHost, StorageError, StorageResult};
use crate::MediaHostBackend;

const MEDIA_PREFIX: &str = "media";

/// Stores uploads on the local filesystem; this service serves them back under `/media`.
#[derive(Debug, Clone)]
pub struct LocalHost {
    base_path: PathBuf,
    base_url: String,
}

impl LocalHost {
    /// Create the `media/` directory under `base_path` if needed.
    ///
    /// `base_url` is the public origin files are served from, e.g. `http://localhost:3000`.
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();
        let media_dir = base_path.join(MEDIA_PREFIX);

        fs::create_dir_all(&media_dir).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                media_dir.display(),
                e
            ))
        })?;

        Ok(Self {
            base_path,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn media_dir(&self) -> PathBuf {
        self.base_path.join(MEDIA_PREFIX)
    }

    /// Resolve a key to a path below `base_path`, rejecting anything that could escape it.
    fn key_to_path(&self, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = key.is_empty()
            || relative
                .components()
                .any(|c| !matches!(c, Component::Normal(_)));
        if escapes {
            return Err(StorageError::InvalidKey(format!(
                "Storage key '{}' must be a relative path without '..'",
                key
            )));
        }
        Ok(self.base_path.join(relative))
    }

    fn generate_key(filename: &str) -> String {
        match extension_of(filename) {
            Some(ext) => format!("{}/{}.{}", MEDIA_PREFIX, Uuid::new_v4(), ext),
            None => format!("{}/{}", MEDIA_PREFIX, Uuid::new_v4()),
        }
    }

    fn generate_url(&self, key: &str) -> String {
        format!("{}/{}", self.base_url, key)
    }
}

/// Lowercased extension, kept only if it is short and alphanumeric.
fn extension_of(filename: &str) -> Option<String> {
    Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.len() <= 10 && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(|e| e.to_ascii_lowercase())
}

#[async_trait]
impl MediaHost for LocalHost {
    async fn upload_file(
        &self,
        path: &Path,
        filename: &str,
        _content_type: &str,
    ) -> StorageResult<HostedMedia> {
        let key = Self::generate_key(filename);
        let target = self.key_to_path(&key)?;
        let start = std::time::Instant::now();

        let size = fs::copy(path, &target).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "Failed to copy {} to {}: {}",
                path.display(),
                target.display(),
                e
            ))
        })?;

        let url = self.generate_url(&key);

        tracing::info!(
            path = %target.display(),
            key = %key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(HostedMedia {
            public_id: key,
            secure_url: url,
            bytes: size,
            format: extension_of(filename),
        })
    }

    async fn health_check(&self) -> StorageResult<()> {
        let meta = fs::metadata(self.media_dir()).await?;
        if !meta.is_dir() {
            return Err(StorageError::BackendError(format!(
                "{} is not a directory",
                self.media_dir().display()
            )));
        }
        Ok(())
    }

    fn backend_type(&self) -> MediaHostBackend {
        MediaHostBackend::Local
    }
}
