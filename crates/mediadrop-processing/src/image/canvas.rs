use ::image::codecs::jpeg::JpegEncoder;
use ::image::{DynamicImage, ImageError, Rgba, RgbaImage};
use imageproc::drawing::draw_filled_rect_mut;
use imageproc::rect::Rect;
use thiserror::Error;

use crate::raster::{self, Point};

/// Hard ceiling on either canvas side, independent of configuration.
pub const MAX_DIMENSION: u32 = 16_384;

#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Canvas dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions { width: u32, height: u32 },

    #[error("Canvas {width}x{height} exceeds the maximum side of {max}")]
    TooLarge { width: u32, height: u32, max: u32 },

    #[error("Invalid color '{0}'")]
    InvalidColor(String),

    #[error("JPEG quality must be between 1 and 100, got {0}")]
    InvalidQuality(u8),

    #[error("Encoding failed: {0}")]
    Encode(#[from] ImageError),
}

/// RGBA drawing surface.
#[derive(Debug, Clone)]
pub struct Canvas {
    image: RgbaImage,
}

impl Canvas {
    pub fn new(width: u32, height: u32, background: u32) -> Result<Self, CanvasError> {
        Self::bounded(width, height, background, MAX_DIMENSION)
    }

    /// Like [`Canvas::new`] with a tighter cap on either side.
    pub fn bounded(
        width: u32,
        height: u32,
        background: u32,
        max_dimension: u32,
    ) -> Result<Self, CanvasError> {
        if width == 0 || height == 0 {
            return Err(CanvasError::EmptyDimensions { width, height });
        }
        let max = max_dimension.min(MAX_DIMENSION);
        if width > max || height > max {
            return Err(CanvasError::TooLarge { width, height, max });
        }

        Ok(Self {
            image: RgbaImage::from_pixel(width, height, Rgba(background.to_be_bytes())),
        })
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn draw_line(&mut self, from: Point, to: Point, color: u32) {
        raster::draw_line(&mut self.image, from, to, color);
    }

    /// Fill the axis-aligned rectangle at (`x`, `y`); parts outside the canvas are clipped.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: u32) {
        let left = i64::from(x).max(0);
        let top = i64::from(y).max(0);
        let right = (i64::from(x) + i64::from(width)).min(i64::from(self.width()));
        let bottom = (i64::from(y) + i64::from(height)).min(i64::from(self.height()));
        if right <= left || bottom <= top {
            return;
        }

        // Clipped bounds lie inside the canvas, so they fit `Rect`'s i32/u32 fields.
        let rect = Rect::at(left as i32, top as i32)
            .of_size((right - left) as u32, (bottom - top) as u32);
        draw_filled_rect_mut(&mut self.image, rect, Rgba(color.to_be_bytes()));
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.image
    }

    /// Encode as baseline JPEG. Alpha is discarded.
    pub fn encode_jpeg(&self, quality: u8) -> Result<Vec<u8>, CanvasError> {
        if !(1..=100).contains(&quality) {
            return Err(CanvasError::InvalidQuality(quality));
        }

        let rgb = DynamicImage::ImageRgba8(self.image.clone()).to_rgb8();
        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        rgb.write_with_encoder(encoder)?;

        tracing::debug!(
            width = self.width(),
            height = self.height(),
            quality = quality,
            size_bytes = buffer.len(),
            "Canvas encoded as JPEG"
        );

        Ok(buffer)
    }
}

/// Parse a color into `0xRRGGBBAA`.
///
/// Accepts `#rrggbb` (opaque), `#rrggbbaa`, `0xRRGGBBAA` and plain decimal.
pub fn parse_color(input: &str) -> Result<u32, CanvasError> {
    let trimmed = input.trim();
    let invalid = || CanvasError::InvalidColor(input.to_string());

    if let Some(hex) = trimmed.strip_prefix('#') {
        if !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        return match hex.len() {
            6 => u32::from_str_radix(hex, 16)
                .map(|rgb| (rgb << 8) | 0xff)
                .map_err(|_| invalid()),
            8 => u32::from_str_radix(hex, 16).map_err(|_| invalid()),
            _ => Err(invalid()),
        };
    }

    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        if hex.is_empty() || hex.len() > 8 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(invalid());
        }
        return u32::from_str_radix(hex, 16).map_err(|_| invalid());
    }

    trimmed.parse::<u32>().map_err(|_| invalid())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f64, y: f64) -> Point {
        Point::new(x, y).unwrap()
    }

    #[test]
    fn test_new_fills_background() {
        let canvas = Canvas::new(3, 2, 0x0a0b0cff).unwrap();
        assert_eq!(canvas.width(), 3);
        assert_eq!(canvas.height(), 2);
        assert!(canvas
            .as_image()
            .pixels()
            .all(|px| px.0 == [0x0a, 0x0b, 0x0c, 0xff]));
    }

    #[test]
    fn test_new_rejects_zero_and_oversized() {
        assert!(matches!(
            Canvas::new(0, 10, 0),
            Err(CanvasError::EmptyDimensions { .. })
        ));
        assert!(matches!(
            Canvas::bounded(513, 10, 0, 512),
            Err(CanvasError::TooLarge { max: 512, .. })
        ));
        assert!(Canvas::bounded(512, 512, 0, 512).is_ok());
    }

    #[test]
    fn test_draw_line_writes_into_canvas() {
        let mut canvas = Canvas::new(8, 8, 0xffffffff).unwrap();
        canvas.draw_line(p(0.0, 0.0), p(7.0, 7.0), 0x000000ff);

        let img = canvas.as_image();
        for i in 0..8 {
            assert_eq!(img.get_pixel(i, i).0, [0, 0, 0, 0xff]);
        }
        assert_eq!(img.get_pixel(1, 0).0, [0xff; 4]);
    }

    #[test]
    fn test_fill_rect_is_clipped() {
        let mut canvas = Canvas::new(4, 4, 0).unwrap();
        canvas.fill_rect(2, -1, 10, 2, 0x112233ff);

        let img = canvas.as_image();
        assert_eq!(img.get_pixel(2, 0).0, [0x11, 0x22, 0x33, 0xff]);
        assert_eq!(img.get_pixel(3, 0).0, [0x11, 0x22, 0x33, 0xff]);
        assert_eq!(img.get_pixel(1, 0).0, [0; 4]);
        assert_eq!(img.get_pixel(2, 1).0, [0; 4]);
    }

    #[test]
    fn test_fill_rect_extreme_offsets_do_not_overflow() {
        let mut canvas = Canvas::new(4, 4, 0).unwrap();
        canvas.fill_rect(i32::MAX, 0, 10, 2, 0xffffffff);
        canvas.fill_rect(0, i32::MAX, 2, u32::MAX, 0xffffffff);
        canvas.fill_rect(i32::MIN, i32::MIN, 10, 10, 0xffffffff);
        assert!(canvas.as_image().pixels().all(|px| px.0 == [0; 4]));

        canvas.fill_rect(-5, 3, u32::MAX, u32::MAX, 0x112233ff);
        let img = canvas.as_image();
        for x in 0..4 {
            assert_eq!(img.get_pixel(x, 3).0, [0x11, 0x22, 0x33, 0xff]);
            assert_eq!(img.get_pixel(x, 2).0, [0; 4]);
        }
    }

    #[test]
    fn test_fill_rect_zero_size_is_noop() {
        let mut canvas = Canvas::new(4, 4, 0).unwrap();
        canvas.fill_rect(0, 0, 0, 3, 0xffffffff);
        assert!(canvas.as_image().pixels().all(|px| px.0 == [0; 4]));
    }

    #[test]
    fn test_encode_jpeg_produces_decodable_image() {
        let mut canvas = Canvas::new(32, 16, 0xffffffff).unwrap();
        canvas.draw_line(p(0.0, 8.0), p(31.0, 8.0), 0xff0000ff);

        let jpeg = canvas.encode_jpeg(85).unwrap();
        assert_eq!(&jpeg[..2], &[0xff, 0xd8]);

        let decoded = ::image::load_from_memory(&jpeg).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 16));
    }

    #[test]
    fn test_encode_jpeg_rejects_bad_quality() {
        let canvas = Canvas::new(2, 2, 0).unwrap();
        assert!(matches!(
            canvas.encode_jpeg(0),
            Err(CanvasError::InvalidQuality(0))
        ));
        assert!(canvas.encode_jpeg(101).is_err());
    }

    #[test]
    fn test_parse_color_formats() {
        assert_eq!(parse_color("#ff0000").unwrap(), 0xff0000ff);
        assert_eq!(parse_color("#FF000080").unwrap(), 0xff000080);
        assert_eq!(parse_color("0x00ff00ff").unwrap(), 0x00ff00ff);
        assert_eq!(parse_color(" 255 ").unwrap(), 255);
    }

    #[test]
    fn test_parse_color_rejects_garbage() {
        for bad in ["", "#fff", "#gg0000", "0x", "0x1234567890", "red", "-1", "#+f0000"] {
            assert!(parse_color(bad).is_err(), "{bad} should be rejected");
        }
    }
}
