//! Mediadrop Processing Library
//!
//! Pixel-level work that the service does itself (line rasterization), plus the
//! thin wrappers around the libraries and tools it delegates to: canvas fill and
//! JPEG encoding via `image`/`imageproc`, frame extraction via `ffmpeg`, and
//! upload validation.

pub mod raster;
pub mod validator;

#[cfg(feature = "image")]
pub mod image;

#[cfg(feature = "video")]
pub mod video;

pub use raster::{draw_line, PixelBuffer, PixelGrid, Point, RasterError, COORDINATE_LIMIT};
pub use validator::{
    content_type_for_extension, mime_essence, MediaKind, MediaValidator, ValidationError,
};

#[cfg(feature = "image")]
pub use self::image::{parse_color, Canvas, CanvasError};

#[cfg(feature = "video")]
pub use self::video::{FrameError, FrameExtractor, FrameOptions};
