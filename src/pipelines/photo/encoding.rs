// SPDX-License-Identifier: GPL-3.0-only

//! JPEG encoding helpers
//!
//! Journal images are always stored and exported as JPEG. Quality is carried
//! around as a factor in (0, 1] and mapped to the encoder's 1-100 scale here.

use crate::errors::PhotoError;
use image::{DynamicImage, ImageFormat, RgbImage};
use tracing::debug;

/// Map a quality factor in (0, 1] to a JPEG quality value (1-100)
pub fn jpeg_quality(factor: f32) -> Result<u8, PhotoError> {
    if !(factor > 0.0 && factor <= 1.0) {
        return Err(PhotoError::InvalidQuality(factor));
    }
    Ok((factor * 100.0).round().clamp(1.0, 100.0) as u8)
}

/// Encode an RGB image as JPEG
pub fn encode_jpeg(image: &RgbImage, quality: f32) -> Result<Vec<u8>, PhotoError> {
    let quality = jpeg_quality(quality)?;
    let mut buffer = Vec::new();

    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut buffer, quality);
    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| PhotoError::Encode(format!("JPEG encoding failed: {}", e)))?;

    debug!(
        width = image.width(),
        height = image.height(),
        quality,
        size = buffer.len(),
        "JPEG encoded"
    );
    Ok(buffer)
}

/// Decode image bytes of any supported format
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PhotoError> {
    image::load_from_memory(bytes).map_err(|e| PhotoError::Decode(e.to_string()))
}

/// Check whether bytes are already JPEG
pub fn is_jpeg(bytes: &[u8]) -> bool {
    matches!(image::guess_format(bytes), Ok(ImageFormat::Jpeg))
}

/// Return JPEG bytes for any supported image, re-encoding only when needed
pub fn ensure_jpeg(bytes: &[u8], quality: f32) -> Result<Vec<u8>, PhotoError> {
    if is_jpeg(bytes) {
        return Ok(bytes.to_vec());
    }
    let decoded = decode(bytes)?;
    encode_jpeg(&decoded.to_rgb8(), quality)
}
