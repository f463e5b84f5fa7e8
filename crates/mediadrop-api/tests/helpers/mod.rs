//! Test helpers: build AppState and router for integration tests.
//!
//! Run from workspace root: `cargo test -p mediadrop-api`. The media host is a
//! `LocalHost` rooted in a temp dir, so no network access is needed.

#![allow(dead_code)]

pub mod fixtures;

use std::collections::HashMap;
use std::sync::Arc;

use axum_test::TestServer;
use mediadrop_api::constants;
use mediadrop_api::setup::routes;
use mediadrop_api::state::AppState;
use mediadrop_core::{Config, ServiceConfig};
use mediadrop_storage::{LocalHost, MediaHost};
use tempfile::TempDir;

pub const TEST_BASE_URL: &str = "http://localhost:3000";

/// API path prefix for tests.
pub fn api_path(path: &str) -> String {
    format!("{}{}", constants::API_PREFIX, path)
}

/// Test application: server plus the temp dir backing media and static files.
pub struct TestApp {
    pub server: TestServer,
    pub temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }
}

pub fn create_test_config(temp_dir: &TempDir, overrides: &[(&str, &str)]) -> Config {
    let public_dir = temp_dir.path().join("public");
    let storage_dir = temp_dir.path().join("storage");

    let mut vars: HashMap<String, String> = HashMap::from([
        ("ENVIRONMENT".to_string(), "test".to_string()),
        ("MEDIA_HOST".to_string(), "local".to_string()),
        (
            "LOCAL_STORAGE_PATH".to_string(),
            storage_dir.to_string_lossy().into_owned(),
        ),
        ("LOCAL_STORAGE_BASE_URL".to_string(), TEST_BASE_URL.to_string()),
        (
            "PUBLIC_DIR".to_string(),
            public_dir.to_string_lossy().into_owned(),
        ),
        ("FFMPEG_PATH".to_string(), "/nonexistent/ffmpeg".to_string()),
        ("MAX_FILE_SIZE_MB".to_string(), "1".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }

    let service = ServiceConfig::from_lookup(|key| vars.get(key).cloned())
        .expect("Failed to build test config");
    Config(Box::new(service))
}

/// Setup test app with a local media host and a static `index.html`.
pub async fn setup_test_app() -> TestApp {
    setup_test_app_with(&[]).await
}

pub async fn setup_test_app_with(overrides: &[(&str, &str)]) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let config = create_test_config(&temp_dir, overrides);

    let public_dir = temp_dir.path().join("public");
    std::fs::create_dir_all(&public_dir).expect("Failed to create public dir");
    std::fs::write(public_dir.join("index.html"), fixtures::INDEX_HTML)
        .expect("Failed to write index.html");

    let storage_path = config
        .local_storage_path()
        .expect("local storage path is set")
        .to_string();
    let host: Arc<dyn MediaHost> = Arc::new(
        LocalHost::new(storage_path, TEST_BASE_URL.to_string())
            .await
            .expect("Failed to create local media host"),
    );

    let state = Arc::new(AppState::new(config.clone(), host));
    let app = routes::setup_routes(&config, state).expect("Failed to setup routes");
    let server = TestServer::new(app.into_make_service()).expect("Failed to create test server");

    TestApp { server, temp_dir }
}
