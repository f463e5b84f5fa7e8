//! Multipart upload spooling
//!
//! The `file` part is streamed to a named temp file so large videos never sit in
//! memory. The temp file is deleted when the returned [`SpooledUpload`] drops,
//! on success and on every error path.

use std::path::Path;

use axum::extract::multipart::{Field, MultipartError};
use axum::extract::Multipart;
use axum::http::StatusCode;
use mediadrop_core::constants::UPLOAD_FIELD_NAME;
use mediadrop_core::AppError;
use mediadrop_processing::{
    content_type_for_extension, mime_essence, MediaKind, MediaValidator, ValidationError,
};
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::error::HttpAppError;
use crate::state::MediaState;

const MAX_FILENAME_LENGTH: usize = 255;
const FALLBACK_FILENAME: &str = "file";

/// An uploaded file on local disk, removed on drop.
#[derive(Debug)]
pub struct SpooledUpload {
    file: NamedTempFile,
    pub filename: String,
    pub content_type: String,
    pub kind: MediaKind,
    pub size: usize,
}

impl SpooledUpload {
    pub fn path(&self) -> &Path {
        self.file.path()
    }
}

fn multipart_error(err: MultipartError) -> HttpAppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        return AppError::PayloadTooLarge(err.body_text()).into();
    }
    AppError::InvalidInput(format!("Failed to read multipart: {}", err.body_text())).into()
}

/// Strip directories and replace anything outside `[A-Za-z0-9._-]`.
pub fn sanitize_filename(filename: &str) -> Result<String, AppError> {
    let filename_only = Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(filename);

    if filename_only.contains("..") {
        return Err(AppError::InvalidInput(
            "Filename contains invalid path traversal".to_string(),
        ));
    }

    let sanitized: String = filename_only
        .chars()
        .take(MAX_FILENAME_LENGTH)
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if sanitized.trim_matches(|c| c == '.' || c == '_').is_empty() {
        return Ok(FALLBACK_FILENAME.to_string());
    }

    Ok(sanitized)
}

/// Declared content type, or a guess from the extension when the client sent none.
fn resolve_content_type(declared: Option<&str>, filename: &str) -> Result<String, AppError> {
    declared
        .map(mime_essence)
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream")
        .or_else(|| content_type_for_extension(filename).map(String::from))
        .ok_or_else(|| {
            AppError::InvalidInput(
                "Could not determine the file type; send a Content-Type for the file part"
                    .to_string(),
            )
        })
}

fn create_temp_file(tmp_dir: Option<&Path>) -> Result<NamedTempFile, AppError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix("mediadrop-upload-");
    let file = match tmp_dir {
        Some(dir) => builder.tempfile_in(dir),
        None => builder.tempfile(),
    };
    file.map_err(|e| AppError::Internal(format!("Failed to create temp file: {}", e)))
}

async fn write_field(
    field: &mut Field<'_>,
    file: &NamedTempFile,
    validator: &MediaValidator,
) -> Result<usize, HttpAppError> {
    let mut out = tokio::fs::File::from_std(file.reopen().map_err(AppError::from)?);
    let mut size = 0usize;

    while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
        size += chunk.len();
        if size > validator.max_file_size() {
            return Err(ValidationError::FileTooLarge {
                size,
                max: validator.max_file_size(),
            }
            .into());
        }
        out.write_all(&chunk).await.map_err(AppError::from)?;
    }
    out.flush().await.map_err(AppError::from)?;

    Ok(size)
}

/// Spool the single `file` part to disk.
///
/// Returns `Ok(None)` when the form has no `file` part. Parts with other names are
/// skipped; a second `file` part is rejected.
pub async fn spool_upload(
    mut multipart: Multipart,
    media: &MediaState,
    accept: &[MediaKind],
) -> Result<Option<SpooledUpload>, HttpAppError> {
    let mut spooled: Option<SpooledUpload> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(UPLOAD_FIELD_NAME) {
            continue;
        }
        if spooled.is_some() {
            return Err(AppError::InvalidInput(
                "Multiple file fields are not allowed; send exactly one field named 'file'"
                    .to_string(),
            )
            .into());
        }

        let filename = sanitize_filename(field.file_name().unwrap_or(FALLBACK_FILENAME))?;
        let content_type = resolve_content_type(field.content_type(), &filename)?;
        let kind = MediaKind::from_content_type(&content_type)
            .filter(|kind| accept.contains(kind))
            .ok_or_else(|| {
                AppError::InvalidInput(format!("Unsupported media type: {}", content_type))
            })?;

        let validator = media.validator_for(kind);
        validator.validate_metadata(&filename, &content_type)?;

        let file = create_temp_file(media.upload_tmp_dir.as_deref())?;
        let size = write_field(&mut field, &file, validator).await?;
        validator.validate_file_size(size)?;

        tracing::debug!(
            filename = %filename,
            content_type = %content_type,
            size_bytes = size,
            path = %file.path().display(),
            "Upload spooled to disk"
        );

        spooled = Some(SpooledUpload {
            file,
            filename,
            content_type,
            kind,
            size,
        });
    }

    Ok(spooled)
}
