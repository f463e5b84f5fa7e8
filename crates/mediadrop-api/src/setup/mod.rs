//! Application setup and initialization

pub mod routes;
pub mod server;

use std::sync::Arc;

use anyhow::{Context, Result};
use mediadrop_core::Config;
use mediadrop_infra::{init_telemetry, LogFormat};
use mediadrop_storage::create_media_host;

use crate::constants::SERVICE_NAME;
use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    let log_format = match std::env::var("LOG_FORMAT") {
        Ok(raw) => raw.parse::<LogFormat>().map_err(|e| anyhow::anyhow!(e))?,
        Err(_) if config.is_production() => LogFormat::Json,
        Err(_) => LogFormat::Pretty,
    };
    init_telemetry(SERVICE_NAME, config.environment(), log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        media_host = %config.media_host(),
        "Configuration loaded"
    );

    let host = create_media_host(&config)
        .await
        .context("Failed to initialize media host")?;

    let state = Arc::new(AppState::new(config.clone(), host));
    let router = routes::setup_routes(&config, state.clone())?;

    Ok((state, router))
}
