//! Configuration module
//!
//! This module provides configuration structures for the service, including
//! media host credentials, upload limits and drawing/frame-extraction settings.
//! Values come from the process environment (and a `.env` file when present).

use std::env;

use crate::constants::{DEFAULT_CLOUDINARY_API_BASE, DEFAULT_PORT};
use crate::host_types::MediaHostBackend;

// Common constants
const MAX_FILE_SIZE_MB: usize = 10;
const MAX_VIDEO_SIZE_MB: usize = 200;
const MAX_FRAMES: u32 = 20;
const MAX_CANVAS_DIMENSION: u32 = 4096;
const JPEG_QUALITY: u8 = 85;
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// Base configuration shared by every deployment
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub cors_origins: Vec<String>,
    pub environment: String,
    pub request_timeout_secs: u64,
    pub public_dir: String,
}

/// Service configuration: media host, upload limits, processing knobs
#[derive(Clone, Debug)]
pub struct ServiceConfig {
    pub base: BaseConfig,
    // Media host configuration
    pub media_host: MediaHostBackend,
    pub cloud_name: Option<String>,
    pub cloud_key: Option<String>,
    pub cloud_secret: Option<String>,
    pub cloudinary_api_base: String,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    // Upload limits
    pub upload_tmp_dir: Option<String>,
    pub max_file_size_bytes: usize,
    pub allowed_extensions: Vec<String>,
    pub allowed_content_types: Vec<String>,
    pub max_video_size_bytes: usize,
    pub video_allowed_extensions: Vec<String>,
    pub video_allowed_content_types: Vec<String>,
    // Processing
    pub ffmpeg_path: String,
    pub max_frames: u32,
    pub max_canvas_dimension: u32,
    pub jpeg_quality: u8,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config(pub Box<ServiceConfig>);

impl Config {
    fn as_service(&self) -> &ServiceConfig {
        &self.0
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        is_production_name(&self.as_service().base.environment)
    }

    pub fn from_env() -> Result<Self, anyhow::Error> {
        let config = ServiceConfig::from_env()?;
        Ok(Config(Box::new(config)))
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        self.as_service().validate()
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.as_service().base.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.as_service().base.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.as_service().base.environment
    }

    pub fn request_timeout_secs(&self) -> u64 {
        self.as_service().base.request_timeout_secs
    }

    pub fn public_dir(&self) -> &str {
        &self.as_service().base.public_dir
    }

    pub fn media_host(&self) -> MediaHostBackend {
        self.as_service().media_host
    }

    pub fn cloud_name(&self) -> Option<&str> {
        self.as_service().cloud_name.as_deref()
    }

    pub fn cloud_key(&self) -> Option<&str> {
        self.as_service().cloud_key.as_deref()
    }

    pub fn cloud_secret(&self) -> Option<&str> {
        self.as_service().cloud_secret.as_deref()
    }

    pub fn cloudinary_api_base(&self) -> &str {
        &self.as_service().cloudinary_api_base
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.as_service().local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.as_service().local_storage_base_url.as_deref()
    }

    pub fn upload_tmp_dir(&self) -> Option<&str> {
        self.as_service().upload_tmp_dir.as_deref()
    }

    pub fn max_file_size_bytes(&self) -> usize {
        self.as_service().max_file_size_bytes
    }

    pub fn allowed_extensions(&self) -> &[String] {
        &self.as_service().allowed_extensions
    }

    pub fn allowed_content_types(&self) -> &[String] {
        &self.as_service().allowed_content_types
    }

    pub fn max_video_size_bytes(&self) -> usize {
        self.as_service().max_video_size_bytes
    }

    pub fn video_allowed_extensions(&self) -> &[String] {
        &self.as_service().video_allowed_extensions
    }

    pub fn video_allowed_content_types(&self) -> &[String] {
        &self.as_service().video_allowed_content_types
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.as_service().ffmpeg_path
    }

    pub fn max_frames(&self) -> u32 {
        self.as_service().max_frames
    }

    pub fn max_canvas_dimension(&self) -> u32 {
        self.as_service().max_canvas_dimension
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.as_service().jpeg_quality
    }
}

fn is_production_name(environment: &str) -> bool {
    let env = environment.to_lowercase();
    env == "production" || env == "prod"
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable source.
    ///
    /// `from_env` passes the process environment; tests pass a map.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|s| !s.trim().is_empty());

        let environment = var("ENVIRONMENT")
            .or_else(|| var("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins_str = var("CORS_ORIGINS").unwrap_or_else(|| "*".to_string());
        if is_production_name(&environment) && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }
        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let base = BaseConfig {
            server_port: match var("PORT") {
                Some(port) => port
                    .parse()
                    .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
                None => DEFAULT_PORT,
            },
            cors_origins,
            environment,
            request_timeout_secs: var("REQUEST_TIMEOUT_SECS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(REQUEST_TIMEOUT_SECS),
            public_dir: var("PUBLIC_DIR").unwrap_or_else(|| "public".to_string()),
        };

        let media_host = match var("MEDIA_HOST") {
            Some(raw) => raw.parse()?,
            None => MediaHostBackend::Cloudinary,
        };

        let max_file_size_mb = var("MAX_FILE_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_FILE_SIZE_MB);
        let max_video_size_mb = var("MAX_VIDEO_SIZE_MB")
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(MAX_VIDEO_SIZE_MB);

        let config = ServiceConfig {
            base,
            media_host,
            cloud_name: var("CLOUD_NAME"),
            cloud_key: var("CLOUD_KEY"),
            cloud_secret: var("CLOUD_SECRET"),
            cloudinary_api_base: var("CLOUDINARY_API_BASE")
                .unwrap_or_else(|| DEFAULT_CLOUDINARY_API_BASE.to_string()),
            local_storage_path: var("LOCAL_STORAGE_PATH"),
            local_storage_base_url: var("LOCAL_STORAGE_BASE_URL"),
            upload_tmp_dir: var("UPLOAD_TMP_DIR"),
            max_file_size_bytes: max_file_size_mb * 1024 * 1024,
            allowed_extensions: split_list(
                &var("ALLOWED_EXTENSIONS").unwrap_or_else(|| "jpg,jpeg,png,gif,webp".to_string()),
            ),
            allowed_content_types: split_list(
                &var("ALLOWED_CONTENT_TYPES")
                    .unwrap_or_else(|| "image/jpeg,image/png,image/gif,image/webp".to_string()),
            ),
            max_video_size_bytes: max_video_size_mb * 1024 * 1024,
            video_allowed_extensions: split_list(
                &var("VIDEO_ALLOWED_EXTENSIONS")
                    .unwrap_or_else(|| "mp4,mov,avi,webm,mkv".to_string()),
            ),
            video_allowed_content_types: split_list(
                &var("VIDEO_ALLOWED_CONTENT_TYPES").unwrap_or_else(|| {
                    "video/mp4,video/quicktime,video/x-msvideo,video/webm,video/x-matroska"
                        .to_string()
                }),
            ),
            ffmpeg_path: var("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            max_frames: var("MAX_FRAMES")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_FRAMES),
            max_canvas_dimension: var("MAX_CANVAS_DIMENSION")
                .and_then(|s| s.parse().ok())
                .unwrap_or(MAX_CANVAS_DIMENSION),
            jpeg_quality: match var("JPEG_QUALITY") {
                Some(q) => q
                    .parse()
                    .map_err(|_| anyhow::anyhow!("JPEG_QUALITY must be a number between 1 and 100"))?,
                None => JPEG_QUALITY,
            },
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.media_host {
            MediaHostBackend::Cloudinary => {
                if self.cloud_name.is_none()
                    || self.cloud_key.is_none()
                    || self.cloud_secret.is_none()
                {
                    return Err(anyhow::anyhow!(
                        "CLOUD_NAME, CLOUD_KEY and CLOUD_SECRET must be set when using the cloudinary media host"
                    ));
                }
            }
            MediaHostBackend::Local => {
                if self.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using the local media host"
                    ));
                }
                if self.local_storage_base_url.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_BASE_URL must be set when using the local media host"
                    ));
                }
            }
        }

        if !(1..=100).contains(&self.jpeg_quality) {
            return Err(anyhow::anyhow!("JPEG_QUALITY must be between 1 and 100"));
        }

        if self.max_frames == 0 {
            return Err(anyhow::anyhow!("MAX_FRAMES must be greater than zero"));
        }

        if self.max_canvas_dimension == 0 {
            return Err(anyhow::anyhow!(
                "MAX_CANVAS_DIMENSION must be greater than zero"
            ));
        }

        if self.max_file_size_bytes == 0 || self.max_video_size_bytes == 0 {
            return Err(anyhow::anyhow!(
                "MAX_FILE_SIZE_MB and MAX_VIDEO_SIZE_MB must be greater than zero"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn cloudinary_vars() -> Vec<(&'static str, &'static str)> {
        vec![
            ("CLOUD_NAME", "demo"),
            ("CLOUD_KEY", "123456"),
            ("CLOUD_SECRET", "shh"),
        ]
    }

    #[test]
    fn test_defaults_with_cloudinary_credentials() {
        let config = ServiceConfig::from_lookup(lookup_from(&cloudinary_vars())).unwrap();
        assert_eq!(config.base.server_port, 3000);
        assert_eq!(config.media_host, MediaHostBackend::Cloudinary);
        assert_eq!(config.cloudinary_api_base, DEFAULT_CLOUDINARY_API_BASE);
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.jpeg_quality, 85);
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert!(config.allowed_extensions.contains(&"png".to_string()));
    }

    #[test]
    fn test_cloudinary_requires_credentials() {
        let err = ServiceConfig::from_lookup(lookup_from(&[("CLOUD_NAME", "demo")])).unwrap_err();
        assert!(err.to_string().contains("CLOUD_SECRET"));
    }

    #[test]
    fn test_local_host_requires_path_and_url() {
        let err = ServiceConfig::from_lookup(lookup_from(&[
            ("MEDIA_HOST", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/media"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("LOCAL_STORAGE_BASE_URL"));

        let config = ServiceConfig::from_lookup(lookup_from(&[
            ("MEDIA_HOST", "local"),
            ("LOCAL_STORAGE_PATH", "/tmp/media"),
            ("LOCAL_STORAGE_BASE_URL", "http://localhost:3000"),
        ]))
        .unwrap();
        assert_eq!(config.media_host, MediaHostBackend::Local);
    }

    #[test]
    fn test_wildcard_cors_rejected_in_production() {
        let mut vars = cloudinary_vars();
        vars.push(("ENVIRONMENT", "production"));
        let err = ServiceConfig::from_lookup(lookup_from(&vars)).unwrap_err();
        assert!(err.to_string().contains("CORS_ORIGINS"));

        vars.push(("CORS_ORIGINS", "https://a.example, https://b.example"));
        let config = ServiceConfig::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(
            config.base.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(Config(Box::new(config)).is_production());
    }

    #[test]
    fn test_invalid_port_and_quality_are_errors() {
        let mut vars = cloudinary_vars();
        vars.push(("PORT", "not-a-port"));
        assert!(ServiceConfig::from_lookup(lookup_from(&vars)).is_err());

        let mut vars = cloudinary_vars();
        vars.push(("JPEG_QUALITY", "0"));
        assert!(ServiceConfig::from_lookup(lookup_from(&vars)).is_err());
    }

    #[test]
    fn test_lists_are_trimmed_and_lowercased() {
        let mut vars = cloudinary_vars();
        vars.push(("ALLOWED_EXTENSIONS", " PNG, Jpg ,,"));
        let config = ServiceConfig::from_lookup(lookup_from(&vars)).unwrap();
        assert_eq!(config.allowed_extensions, vec!["png", "jpg"]);
    }
}
