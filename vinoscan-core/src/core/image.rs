//! Image downscaling and re-encoding ahead of storage and analysis.
//!
//! Stored galleries and analysis uploads both want small payloads, so every
//! incoming photo is bounded to [`MAX_DIMENSION`] on its larger side and
//! re-encoded as lossy JPEG. The operation is pure: decode failures fall
//! back to returning the caller's bytes unchanged instead of failing.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;

/// Upper bound for the larger of width/height after compression.
pub const MAX_DIMENSION: u32 = 800;

/// JPEG quality for re-encoded images, out of 100.
const JPEG_QUALITY: u8 = 70;

/// Downscales and re-encodes a raw image.
///
/// The larger dimension is capped at [`MAX_DIMENSION`] with aspect ratio
/// preserved; images already within the bound keep their dimensions but are
/// still re-encoded. On decode or encode failure the input bytes are
/// returned unmodified.
#[must_use]
pub fn compress(bytes: &[u8]) -> Vec<u8> {
    match try_compress(bytes) {
        Some(out) => out,
        None => bytes.to_vec(),
    }
}

/// Data-URL variant of [`compress`] for galleries that store
/// `data:image/...;base64,` references. Any failure (a malformed URL, bad
/// base64, an undecodable image) returns the input unchanged.
#[must_use]
pub fn compress_data_url(data_url: &str) -> String {
    let payload = data_url
        .split_once(',')
        .map_or(data_url, |(_, rest)| rest);
    let raw = match BASE64.decode(payload) {
        Ok(raw) => raw,
        Err(_) => return data_url.to_string(),
    };
    match try_compress(&raw) {
        Some(out) => format!("data:image/jpeg;base64,{}", BASE64.encode(out)),
        None => data_url.to_string(),
    }
}

fn try_compress(bytes: &[u8]) -> Option<Vec<u8>> {
    let img = image::load_from_memory(bytes).ok()?;
    let (width, height) = (img.width(), img.height());
    let (new_width, new_height) = bounded_dimensions(width, height);

    let resized = if (new_width, new_height) == (width, height) {
        img
    } else {
        img.resize_exact(new_width, new_height, FilterType::Lanczos3)
    };

    let mut out = Vec::new();
    let encoder = JpegEncoder::new_with_quality(&mut out, JPEG_QUALITY);
    resized.to_rgb8().write_with_encoder(encoder).ok()?;
    Some(out)
}

/// Scales `(width, height)` so the larger side does not exceed
/// [`MAX_DIMENSION`]. The smaller side scales in proportion, below the bound
/// if need be; dimensions already within the bound are untouched (never
/// upscaled).
fn bounded_dimensions(width: u32, height: u32) -> (u32, u32) {
    if width > height {
        if width > MAX_DIMENSION {
            let scaled = (f64::from(height) * f64::from(MAX_DIMENSION) / f64::from(width)).round();
            return (MAX_DIMENSION, (scaled as u32).max(1));
        }
    } else if height > MAX_DIMENSION {
        let scaled = (f64::from(width) * f64::from(MAX_DIMENSION) / f64::from(height)).round();
        return ((scaled as u32).max(1), MAX_DIMENSION);
    }
    (width, height)
}
