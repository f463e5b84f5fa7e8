#[cfg(feature = "host-cloudinary")]
use crate::CloudinaryHost;
#[cfg(feature = "host-local")]
use crate::LocalHost;
use crate::{MediaHost, MediaHostBackend, StorageError, StorageResult};
use mediadrop_core::Config;
use std::sync::Arc;

/// Create the media host selected by `MEDIA_HOST`.
pub async fn create_media_host(config: &Config) -> StorageResult<Arc<dyn MediaHost>> {
    match config.media_host() {
        #[cfg(feature = "host-cloudinary")]
        MediaHostBackend::Cloudinary => {
            let required = |value: Option<&str>, name: &str| {
                value
                    .map(String::from)
                    .ok_or_else(|| StorageError::ConfigError(format!("{} not configured", name)))
            };
            let host = CloudinaryHost::new(
                required(config.cloud_name(), "CLOUD_NAME")?,
                required(config.cloud_key(), "CLOUD_KEY")?,
                required(config.cloud_secret(), "CLOUD_SECRET")?,
                config.cloudinary_api_base().to_string(),
            )?;
            Ok(Arc::new(host))
        }

        #[cfg(not(feature = "host-cloudinary"))]
        MediaHostBackend::Cloudinary => Err(StorageError::ConfigError(
            "Cloudinary backend not available (host-cloudinary feature not enabled)".to_string(),
        )),

        #[cfg(feature = "host-local")]
        MediaHostBackend::Local => {
            let base_path = config.local_storage_path().ok_or_else(|| {
                StorageError::ConfigError("LOCAL_STORAGE_PATH not configured".to_string())
            })?;
            let base_url = config
                .local_storage_base_url()
                .map(String::from)
                .ok_or_else(|| {
                    StorageError::ConfigError("LOCAL_STORAGE_BASE_URL not configured".to_string())
                })?;

            let host = LocalHost::new(base_path, base_url).await?;
            Ok(Arc::new(host))
        }

        #[cfg(not(feature = "host-local"))]
        MediaHostBackend::Local => Err(StorageError::ConfigError(
            "Local backend not available (host-local feature not enabled)".to_string(),
        )),
    }
}
