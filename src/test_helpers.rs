//! Shared test utilities: synthetic images and encoders.
//!
//! Compression behaviour depends heavily on content, so tests build their
//! inputs here instead of shipping fixture files. Noise is seeded, so every
//! run sees the same bytes.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let original = jpeg_bytes(&noise_rgb(600, 600, 2), 100);
//! let png = encoded(DynamicImage::ImageRgba8(noise_rgba(64, 48, 7)), ImageFormat::Png);
//! ```

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageEncoder, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::io::Cursor;
use std::path::Path;

// =========================================================================
// Synthetic images
// =========================================================================

/// Uniform RGB noise; close to incompressible.
pub fn noise_rgb(width: u32, height: u32, seed: u64) -> RgbImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbImage::from_fn(width, height, |_, _| {
        Rgb([rng.random(), rng.random(), rng.random()])
    })
}

/// Uniform RGBA noise, alpha included.
pub fn noise_rgba(width: u32, height: u32, seed: u64) -> RgbaImage {
    let mut rng = StdRng::seed_from_u64(seed);
    RgbaImage::from_fn(width, height, |_, _| {
        Rgba([rng.random(), rng.random(), rng.random(), rng.random()])
    })
}

/// Smooth two-axis gradient; compresses well.
pub fn smooth_rgb(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 255 / width.max(1)) as u8, (y * 255 / height.max(1)) as u8, 128])
    })
}

// =========================================================================
// Encoders
// =========================================================================

pub fn jpeg_bytes(img: &RgbImage, quality: u8) -> Vec<u8> {
    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, quality)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            image::ExtendedColorType::Rgb8,
        )
        .unwrap();
    buf
}

pub fn encoded(img: DynamicImage, format: ImageFormat) -> Vec<u8> {
    let mut cursor = Cursor::new(Vec::new());
    img.write_to(&mut cursor, format).unwrap();
    cursor.into_inner()
}

// =========================================================================
// Filesystem
// =========================================================================

/// Write `data` to `path`, creating parent directories.
pub fn write_file(path: &Path, data: &[u8]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, data).unwrap();
}
