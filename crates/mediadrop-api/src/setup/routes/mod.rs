//! Route configuration and setup.
//!
//! API handlers live under `/api`, probes in [health](health), and everything
//! else falls through to the static viewer in `PUBLIC_DIR`.

mod health;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use mediadrop_core::{Config, MediaHostBackend};
use mediadrop_infra::{request_id_middleware, security_headers_middleware, SecurityHeaders};
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::constants::{API_PREFIX, HTTP_CONCURRENCY_LIMIT};
use crate::handlers;
use crate::state::AppState;

/// Room for multipart boundaries and part headers on top of the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Setup all application routes
pub fn setup_routes(config: &Config, state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(config)?;

    let body_limit = config
        .max_video_size_bytes()
        .max(config.max_file_size_bytes())
        .saturating_add(MULTIPART_OVERHEAD_BYTES);
    let request_timeout_secs = config.request_timeout_secs().max(1);
    tracing::info!(
        body_limit,
        request_timeout_secs,
        http_concurrency_limit = HTTP_CONCURRENCY_LIMIT,
        "HTTP limits configured"
    );

    let mut app = api_routes()
        .route("/health", get(health::health_check))
        .route("/health/live", get(health::liveness_check))
        .route(
            &format!("{}/openapi.json", API_PREFIX),
            get(|| async { Json(crate::api_doc::get_openapi_spec()) }),
        )
        .merge(utoipa_rapidoc::RapiDoc::new("/api/openapi.json").path("/docs"));

    if config.media_host() == MediaHostBackend::Local {
        if let Some(root) = config.local_storage_path() {
            let media_dir = Path::new(root).join("media");
            tracing::info!(dir = %media_dir.display(), "Serving locally hosted media at /media");
            app = app.nest_service("/media", ServeDir::new(media_dir));
        }
    }

    let app = app
        .fallback_service(ServeDir::new(config.public_dir()))
        .layer(ConcurrencyLimitLayer::new(HTTP_CONCURRENCY_LIMIT))
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(DefaultBodyLimit::disable())
        .layer(TimeoutLayer::new(Duration::from_secs(request_timeout_secs)))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .layer(axum::middleware::from_fn_with_state(
            SecurityHeaders {
                hsts: config.is_production(),
            },
            security_headers_middleware,
        ))
        .with_state(state);

    Ok(app)
}

fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            &format!("{}/upload", API_PREFIX),
            post(handlers::upload::upload_media),
        )
        .route(
            &format!("{}/video/frames", API_PREFIX),
            post(handlers::frames::extract_frames),
        )
        .route(
            &format!("{}/draw", API_PREFIX),
            get(handlers::draw::draw_lines),
        )
        .route(
            &format!("{}/draw/rect", API_PREFIX),
            get(handlers::draw::draw_rect),
        )
}

fn setup_cors(config: &Config) -> Result<CorsLayer, anyhow::Error> {
    let methods = [Method::GET, Method::POST, Method::OPTIONS];
    let cors = if config.cors_origins().iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(methods)
            .allow_headers(Any)
    } else {
        let origins = config
            .cors_origins()
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(Any)
    };
    Ok(cors)
}
