//! HTTP error response conversion
//!
//! Handlers return `Result<_, HttpAppError>`. Crate-local errors (media host,
//! validation, raster, canvas, frames) convert into `AppError` here so every
//! failure renders with the same status table and JSON body.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use mediadrop_core::{AppError, ErrorMetadata, LogLevel};
use mediadrop_infra::ErrorResponse;
use mediadrop_processing::{CanvasError, FrameError, RasterError, ValidationError};
use mediadrop_storage::StorageError;

/// Wrapper type so `IntoResponse` can be implemented for `AppError` (orphan rule).
#[derive(Debug)]
pub struct HttpAppError(pub AppError);

impl From<AppError> for HttpAppError {
    fn from(err: AppError) -> Self {
        HttpAppError(err)
    }
}

impl From<anyhow::Error> for HttpAppError {
    fn from(err: anyhow::Error) -> Self {
        HttpAppError(AppError::from(err))
    }
}

fn log_error(error: &AppError) {
    let error_type = error.error_type();
    match error.log_level() {
        LogLevel::Debug => {
            tracing::debug!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Warn => {
            tracing::warn!(error = %error, error_type = error_type, "Error occurred");
        }
        LogLevel::Error => {
            tracing::error!(error = %error, error_type = error_type, "Error occurred");
        }
    }
}

fn is_production_env() -> bool {
    std::env::var("ENVIRONMENT")
        .or_else(|_| std::env::var("APP_ENV"))
        .map(|env| matches!(env.to_lowercase().as_str(), "production" | "prod"))
        .unwrap_or(false)
}

/// Build the JSON body; details are only included outside production and for non-sensitive errors.
pub fn error_body(error: &AppError, is_production: bool) -> ErrorResponse {
    let show_details = !is_production && !error.is_sensitive();
    ErrorResponse {
        error: error.client_message(),
        details: show_details.then(|| error.detailed_message()),
        error_type: show_details.then(|| error.error_type().to_string()),
        code: error.error_code().to_string(),
        recoverable: error.is_recoverable(),
        suggested_action: error.suggested_action().map(String::from),
    }
}

impl IntoResponse for HttpAppError {
    fn into_response(self) -> Response {
        let app_error = &self.0;
        let status = StatusCode::from_u16(app_error.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        log_error(app_error);

        (status, Json(error_body(app_error, is_production_env()))).into_response()
    }
}

/// 4xx from the host that is about the file rather than our credentials.
fn is_client_rejection(status: u16) -> bool {
    (400..500).contains(&status) && status != 401 && status != 403
}

impl From<StorageError> for HttpAppError {
    fn from(err: StorageError) -> Self {
        let app = match err {
            StorageError::Rejected { status, message } if is_client_rejection(status) => {
                AppError::BadRequest(format!("Media host rejected the file: {}", message))
            }
            StorageError::Rejected { status, message } => {
                AppError::MediaHost(format!("{}: {}", status, message))
            }
            StorageError::UploadFailed(msg) | StorageError::BackendError(msg) => {
                AppError::MediaHost(msg)
            }
            StorageError::InvalidKey(msg) => AppError::InvalidInput(msg),
            StorageError::IoError(err) => AppError::Internal(format!("IO error: {}", err)),
            StorageError::ConfigError(msg) => AppError::Internal(msg),
        };
        HttpAppError(app)
    }
}

impl From<ValidationError> for HttpAppError {
    fn from(err: ValidationError) -> Self {
        let app = match err {
            ValidationError::FileTooLarge { .. } => AppError::PayloadTooLarge(err.to_string()),
            _ => AppError::InvalidInput(err.to_string()),
        };
        HttpAppError(app)
    }
}

impl From<RasterError> for HttpAppError {
    fn from(err: RasterError) -> Self {
        HttpAppError(AppError::InvalidCoordinate(err.to_string()))
    }
}

impl From<CanvasError> for HttpAppError {
    fn from(err: CanvasError) -> Self {
        let app = match err {
            CanvasError::EmptyDimensions { .. }
            | CanvasError::TooLarge { .. }
            | CanvasError::InvalidColor(_) => AppError::InvalidInput(err.to_string()),
            CanvasError::InvalidQuality(_) | CanvasError::Encode(_) => {
                AppError::Internal(err.to_string())
            }
        };
        HttpAppError(app)
    }
}

impl From<FrameError> for HttpAppError {
    fn from(err: FrameError) -> Self {
        let app = match err {
            FrameError::InvalidCount { .. }
            | FrameError::InvalidInterval(_)
            | FrameError::InvalidWidth => AppError::InvalidInput(err.to_string()),
            FrameError::Ffmpeg(_) | FrameError::NoFrames | FrameError::Timeout(_) => {
                AppError::MediaConversion(err.to_string())
            }
            FrameError::Spawn { .. } | FrameError::Io(_) => AppError::Internal(err.to_string()),
        };
        HttpAppError(app)
    }
}
