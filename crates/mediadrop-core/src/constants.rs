//! Application-wide constants.

/// Default listen port, matching the port the service has always used.
pub const DEFAULT_PORT: u16 = 3000;

/// Default Cloudinary REST endpoint; the cloud name is appended per request.
pub const DEFAULT_CLOUDINARY_API_BASE: &str = "https://api.cloudinary.com/v1_1";

/// Multipart field that carries the uploaded file.
pub const UPLOAD_FIELD_NAME: &str = "file";

/// Canvas defaults for the draw endpoints.
pub const DEFAULT_CANVAS_WIDTH: u32 = 256;
pub const DEFAULT_CANVAS_HEIGHT: u32 = 256;
pub const DEFAULT_BACKGROUND: &str = "#ffffffff";
pub const DEFAULT_STROKE: &str = "#000000ff";

/// Interval between extracted video frames when the client does not pass one.
pub const DEFAULT_FRAME_INTERVAL_SECS: f64 = 1.0;

/// Number of frames extracted when the client does not pass `count`.
pub const DEFAULT_FRAME_COUNT: u32 = 5;
