//! Test fixtures: small encoded images.

use image::{ImageFormat, Rgb, RgbImage};
use std::io::Cursor;

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let img = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 30 % 256) as u8, (y * 50 % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, format)
        .expect("Failed to encode fixture image");
    out.into_inner()
}

pub fn create_test_png(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

pub fn create_test_jpeg(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

/// Bytes that carry an image extension but decode as nothing.
pub fn create_corrupt_image() -> Vec<u8> {
    b"\x89PNG\r\n\x1a\nthis is not really a png".to_vec()
}
