//! API-level constants

/// Prefix shared by every JSON/image endpoint.
pub const API_PREFIX: &str = "/api";

/// Name reported in logs and the OpenAPI document.
pub const SERVICE_NAME: &str = "mediadrop";

/// Error message for an upload request without a `file` part.
pub const NO_FILE_MESSAGE: &str = "No file sent";

/// Budget for a single dependency probe in `/health`.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Upper bound on requests processed at once.
pub const HTTP_CONCURRENCY_LIMIT: usize = 1_024;

/// Share of the request timeout reserved for spooling the upload and encoding the response.
pub const FRAME_EXTRACTION_MARGIN_SECS: u64 = 10;
