use std::sync::Arc;

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, State};
use axum::http::{header, HeaderMap};
use axum::Json;
use mediadrop_core::AppError;
use mediadrop_processing::MediaKind;
use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::NO_FILE_MESSAGE;
use crate::error::HttpAppError;
use crate::state::AppState;
use crate::utils::upload::spool_upload;
use crate::ErrorResponse;

const FORWARDED_PROTO: &str = "x-forwarded-proto";

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadResponse {
    pub success: bool,
    /// Public URL of the hosted file.
    pub image_url: String,
    /// Link to this service's viewer page for the file.
    pub viewer_link: String,
}

/// `{proto}://{host}/?img={url}`; the proto comes from `X-Forwarded-Proto` when a proxy sets it.
pub fn viewer_link(headers: &HeaderMap, fallback_host: &str, image_url: &str) -> String {
    let protocol = headers
        .get(FORWARDED_PROTO)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("http");
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or(fallback_host);

    format!("{}://{}/?img={}", protocol, host, image_url)
}

/// Upload an image or video to the configured media host
#[utoipa::path(
    post,
    path = "/api/upload",
    tag = "media",
    request_body(content = inline(Object), content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "File hosted", body = UploadResponse),
        (status = 400, description = "No file sent or invalid file", body = ErrorResponse),
        (status = 413, description = "File too large", body = ErrorResponse),
        (status = 502, description = "Media host unavailable", body = ErrorResponse)
    )
)]
#[tracing::instrument(skip(state, headers, multipart), fields(operation = "upload_media"))]
pub async fn upload_media(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, HttpAppError> {
    let no_file = || HttpAppError(AppError::BadRequest(NO_FILE_MESSAGE.to_string()));

    let multipart = multipart.map_err(|_| no_file())?;
    let upload = spool_upload(multipart, &state.media, &[MediaKind::Image, MediaKind::Video])
        .await?
        .ok_or_else(no_file)?;

    let hosted = state
        .media
        .host
        .upload_file(upload.path(), &upload.filename, &upload.content_type)
        .await?;

    tracing::info!(
        public_id = %hosted.public_id,
        kind = ?upload.kind,
        size_bytes = upload.size,
        backend = %state.media.host.backend_type(),
        "Upload hosted"
    );

    let fallback_host = format!("localhost:{}", state.config.server_port());
    let viewer_link = viewer_link(&headers, &fallback_host, &hosted.secure_url);

    Ok(Json(UploadResponse {
        success: true,
        image_url: hosted.secure_url,
        viewer_link,
    }))
}
