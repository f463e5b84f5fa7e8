//! Image module
//!
//! In-memory RGBA canvas that lines and rectangles are drawn onto before the
//! result is encoded as JPEG.

pub mod canvas;

pub use canvas::{parse_color, Canvas, CanvasError};
