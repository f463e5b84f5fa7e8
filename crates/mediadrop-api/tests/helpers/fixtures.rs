//! Test fixtures: small images and raw blobs.

use std::io::Cursor;

pub const INDEX_HTML: &str = "<!doctype html><title>viewer</title>";

/// Encode a solid-color PNG of the given size.
pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)
        .expect("Failed to encode PNG");
    out.into_inner()
}

/// Bytes that claim to be an MP4 but are not decodable.
pub fn create_fake_mp4() -> Vec<u8> {
    let mut data = vec![0x00, 0x00, 0x00, 0x18];
    data.extend_from_slice(b"ftypmp42");
    data.extend_from_slice(&[0u8; 64]);
    data
}
