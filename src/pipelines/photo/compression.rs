// SPDX-License-Identifier: GPL-3.0-only

//! Image compression
//!
//! One routine shrinks every journal image, whether it comes from the camera,
//! an import or a later "compress library" pass:
//!
//! 1. Downscale to `min(width, target_width)`, keeping the aspect ratio
//! 2. Re-encode as JPEG with the quality factor
//! 3. Crop the last pixel row and column (resampling leaves a faint edge line)
//!
//! The caller decides whether to keep the result; [`compress_if_smaller`] keeps
//! it only when it is strictly smaller than the original bytes.

use super::encoding;
use crate::constants::compression as limits;
use crate::errors::PhotoError;
use image::imageops::{self, FilterType};
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Tunable compression settings shared by every compression call site
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompressionParameters {
    /// Display width in pixels the multiplier applies to
    pub reference_width: u32,
    /// Target width as a multiple of the reference width
    pub width_multiplier: f32,
    /// JPEG quality factor in (0, 1]
    pub quality: f32,
}

impl Default for CompressionParameters {
    fn default() -> Self {
        Self {
            reference_width: limits::DEFAULT_REFERENCE_WIDTH,
            width_multiplier: limits::DEFAULT_WIDTH_MULTIPLIER,
            quality: limits::DEFAULT_QUALITY,
        }
    }
}

impl CompressionParameters {
    /// Copy with every value forced into its allowed range
    ///
    /// Non-finite values fall back to the defaults.
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        let clamp = |value: f32, min: f32, max: f32, default: f32| {
            if value.is_finite() {
                value.clamp(min, max)
            } else {
                default
            }
        };

        Self {
            reference_width: self
                .reference_width
                .clamp(limits::MIN_REFERENCE_WIDTH, limits::MAX_REFERENCE_WIDTH),
            width_multiplier: clamp(
                self.width_multiplier,
                limits::MIN_WIDTH_MULTIPLIER,
                limits::MAX_WIDTH_MULTIPLIER,
                defaults.width_multiplier,
            ),
            quality: clamp(
                self.quality,
                limits::MIN_QUALITY,
                limits::MAX_QUALITY,
                defaults.quality,
            ),
        }
    }

    /// Maximum output width in pixels
    pub fn target_width(&self) -> u32 {
        ((self.reference_width as f32 * self.width_multiplier).round() as u32).max(1)
    }
}

/// Re-encoded image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressedImage {
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Output size for a source size and target width (before the edge crop)
pub fn scaled_dimensions(width: u32, height: u32, target_width: u32) -> (u32, u32) {
    if width <= target_width {
        return (width, height);
    }
    let scaled_height = (height as f64 * target_width as f64 / width as f64).round() as u32;
    (target_width, scaled_height.max(1))
}

/// Compress a decoded bitmap
///
/// Fails if the parameters are invalid or the bitmap cannot be encoded.
pub fn compress_image(
    image: &DynamicImage,
    target_width: u32,
    quality: f32,
) -> Result<CompressedImage, PhotoError> {
    if target_width == 0 {
        return Err(PhotoError::InvalidWidth);
    }
    // Validate before doing the expensive resize
    encoding::jpeg_quality(quality)?;

    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(PhotoError::Decode("image has no pixels".to_string()));
    }

    let (new_width, new_height) = scaled_dimensions(width, height, target_width);
    let mut rgb = if (new_width, new_height) == (width, height) {
        image.to_rgb8()
    } else {
        image
            .resize_exact(new_width, new_height, FilterType::Triangle)
            .to_rgb8()
    };

    if new_width > 1 && new_height > 1 {
        rgb = imageops::crop_imm(&rgb, 0, 0, new_width - 1, new_height - 1).to_image();
    }

    let data = encoding::encode_jpeg(&rgb, quality)?;
    debug!(
        from_width = width,
        from_height = height,
        width = rgb.width(),
        height = rgb.height(),
        size = data.len(),
        "Image compressed"
    );

    Ok(CompressedImage {
        width: rgb.width(),
        height: rgb.height(),
        data,
    })
}

/// Decode and compress encoded image bytes
pub fn compress_bytes(
    bytes: &[u8],
    target_width: u32,
    quality: f32,
) -> Result<CompressedImage, PhotoError> {
    let image = encoding::decode(bytes)?;
    compress_image(&image, target_width, quality)
}

/// Why the original bytes were kept
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeepReason {
    /// Compressed output was not smaller
    NotSmaller { original: usize, compressed: usize },
    /// Decoding or encoding failed
    Failed(String),
}

/// Result of the compress-and-compare policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompressionOutcome {
    /// Compressed bytes are strictly smaller and should replace the original
    Replaced {
        image: CompressedImage,
        original_size: usize,
    },
    /// The original bytes stay as they are
    Kept(KeepReason),
}

impl CompressionOutcome {
    /// Bytes saved by the replacement (0 when kept)
    pub fn saved_bytes(&self) -> usize {
        match self {
            CompressionOutcome::Replaced {
                image,
                original_size,
            } => original_size.saturating_sub(image.data.len()),
            CompressionOutcome::Kept(_) => 0,
        }
    }
}

/// Compress encoded bytes, keeping the original unless the result is smaller
///
/// Failures are logged and never surface to the caller: the original is kept.
pub fn compress_if_smaller(original: &[u8], params: &CompressionParameters) -> CompressionOutcome {
    let params = params.clamped();

    match compress_bytes(original, params.target_width(), params.quality) {
        Ok(image) if image.data.len() < original.len() => {
            info!(
                original = original.len(),
                compressed = image.data.len(),
                width = image.width,
                "Compressed image replaces original"
            );
            CompressionOutcome::Replaced {
                image,
                original_size: original.len(),
            }
        }
        Ok(image) => {
            debug!(
                original = original.len(),
                compressed = image.data.len(),
                "Compressed image is not smaller, keeping original"
            );
            CompressionOutcome::Kept(KeepReason::NotSmaller {
                original: original.len(),
                compressed: image.data.len(),
            })
        }
        Err(e) => {
            warn!(error = %e, "Compression failed, keeping original");
            CompressionOutcome::Kept(KeepReason::Failed(e.to_string()))
        }
    }
}

/// [`compress_if_smaller`] on a blocking background task
pub async fn compress_in_background(
    original: Vec<u8>,
    params: CompressionParameters,
) -> CompressionOutcome {
    tokio::task::spawn_blocking(move || compress_if_smaller(&original, &params))
        .await
        .unwrap_or_else(|e| {
            warn!(error = %e, "Compression task failed, keeping original");
            CompressionOutcome::Kept(KeepReason::Failed(e.to_string()))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn flat(width: u32, height: u32) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, Rgb([120, 80, 40])))
    }

    #[test]
    fn scaled_dimensions_keep_aspect_ratio() {
        assert_eq!(scaled_dimensions(3000, 4000, 1200), (1200, 1600));
        assert_eq!(scaled_dimensions(800, 600, 1200), (800, 600));
        assert_eq!(scaled_dimensions(1000, 1, 10), (10, 1));
    }

    #[test]
    fn wide_image_is_cropped_to_target_minus_edge() {
        let out = compress_image(&flat(400, 200), 100, 0.8).unwrap();
        assert_eq!((out.width, out.height), (99, 49));
    }

    #[test]
    fn single_pixel_row_is_not_cropped_away() {
        let out = compress_image(&flat(50, 1), 100, 0.8).unwrap();
        assert_eq!((out.width, out.height), (50, 1));
    }

    #[test]
    fn invalid_parameters_return_no_result() {
        assert!(matches!(
            compress_image(&flat(10, 10), 0, 0.8),
            Err(PhotoError::InvalidWidth)
        ));
        assert!(matches!(
            compress_image(&flat(10, 10), 10, 0.0),
            Err(PhotoError::InvalidQuality(_))
        ));
    }

    #[test]
    fn garbage_bytes_keep_original() {
        let outcome = compress_if_smaller(b"definitely not an image", &CompressionParameters::default());
        assert!(matches!(outcome, CompressionOutcome::Kept(KeepReason::Failed(_))));
        assert_eq!(outcome.saved_bytes(), 0);
    }

    #[test]
    fn clamping_pulls_values_into_range() {
        let params = CompressionParameters {
            reference_width: 1,
            width_multiplier: 10.0,
            quality: f32::NAN,
        }
        .clamped();

        assert_eq!(params.reference_width, limits::MIN_REFERENCE_WIDTH);
        assert_eq!(params.width_multiplier, limits::MAX_WIDTH_MULTIPLIER);
        assert_eq!(params.quality, limits::DEFAULT_QUALITY);
    }

    #[test]
    fn target_width_scales_reference() {
        let params = CompressionParameters {
            reference_width: 1000,
            width_multiplier: 1.5,
            quality: 0.8,
        };
        assert_eq!(params.target_width(), 1500);
    }
}
