//! Video frame extraction: upload a video, get JPEG stills back as base64.

use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Query, State};
use axum::Json;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use mediadrop_core::constants::{DEFAULT_FRAME_COUNT, DEFAULT_FRAME_INTERVAL_SECS};
use mediadrop_core::AppError;
use mediadrop_processing::{FrameOptions, MediaKind};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::constants::NO_FILE_MESSAGE;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::spool_upload;
use crate::ErrorResponse;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FramesQuery {
    /// Number of frames to extract (default 5)
    pub count: Option<String>,
    /// Seconds between frames (default 1.0)
    pub interval: Option<String>,
    /// Output width in pixels; height keeps the aspect ratio
    pub width: Option<String>,
}

impl FramesQuery {
    fn options(&self) -> Result<FrameOptions, AppError> {
        fn parse<T: std::str::FromStr>(name: &str, raw: Option<&str>) -> Result<Option<T>, AppError> {
            raw.map(|v| {
                v.trim()
                    .parse::<T>()
                    .map_err(|_| AppError::InvalidInput(format!("{} is not a valid number: '{}'", name, v)))
            })
            .transpose()
        }

        Ok(FrameOptions {
            count: parse("count", self.count.as_deref())?.unwrap_or(DEFAULT_FRAME_COUNT),
            interval_secs: parse("interval", self.interval.as_deref())?
                .unwrap_or(DEFAULT_FRAME_INTERVAL_SECS),
            width: parse("width", self.width.as_deref())?,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FramesResponse {
    pub success: bool,
    pub count: usize,
    /// Base64-encoded JPEG frames in timeline order.
    pub frames: Vec<String>,
}

/// Extract still frames from an uploaded video
#[utoipa::path(
    post,
    path = "/api/video/frames",
    tag = "media",
    params(FramesQuery),
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Extracted frames", body = FramesResponse),
        (status = 400, description = "No file sent or invalid options", body = ErrorResponse),
        (status = 413, description = "Video too large", body = ErrorResponse),
        (status = 422, description = "Video could not be decoded", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, query, multipart), fields(operation = "extract_frames"))]
pub async fn extract_frames(
    State(state): State<Arc<AppState>>,
    Query(query): Query<FramesQuery>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<FramesResponse>, HttpAppError> {
    let no_file = || HttpAppError(AppError::BadRequest(NO_FILE_MESSAGE.to_string()));

    let options = query.options()?;
    options.validate(state.max_frames)?;

    let multipart = multipart.map_err(|_| no_file())?;
    let upload = spool_upload(multipart, &state.media, &[MediaKind::Video])
        .await?
        .ok_or_else(no_file)?;

    let frames = state.frames.extract_frames(upload.path(), &options).await?;

    tracing::info!(
        filename = %upload.filename,
        size_bytes = upload.size,
        frames = frames.len(),
        "Frames extracted"
    );

    let frames: Vec<String> = frames.iter().map(|f| STANDARD.encode(f)).collect();
    Ok(Json(FramesResponse {
        success: true,
        count: frames.len(),
        frames,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(count: Option<&str>, interval: Option<&str>, width: Option<&str>) -> FramesQuery {
        FramesQuery {
            count: count.map(String::from),
            interval: interval.map(String::from),
            width: width.map(String::from),
        }
    }

    #[test]
    fn test_options_defaults() {
        let opts = query(None, None, None).options().unwrap();
        assert_eq!(opts.count, DEFAULT_FRAME_COUNT);
        assert_eq!(opts.interval_secs, DEFAULT_FRAME_INTERVAL_SECS);
        assert_eq!(opts.width, None);
    }

    #[test]
    fn test_options_parsed() {
        let opts = query(Some("3"), Some("0.5"), Some("320")).options().unwrap();
        assert_eq!(opts.count, 3);
        assert_eq!(opts.interval_secs, 0.5);
        assert_eq!(opts.width, Some(320));
    }

    #[test]
    fn test_options_rejects_garbage() {
        assert!(query(Some("many"), None, None).options().is_err());
        assert!(query(None, Some(""), None).options().is_err());
        assert!(query(None, None, Some("-4")).options().is_err());
    }
}
