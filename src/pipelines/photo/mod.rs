// SPDX-License-Identifier: MPL-2.0

//! Async photo pipeline
//!
//! ```text
//! Camera Backend → Capture → RGBA→RGB → Compression (resize, JPEG, edge crop)
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Capture**: Grab a frame from the camera backend (blocking task)
//! 2. **Post-Processing**: Drop the alpha channel
//! 3. **Compression**: Downscale and encode with the shared [`CompressionParameters`]
//!
//! Imports and library-wide compression reuse stage 3 through
//! [`compression::compress_if_smaller`].

pub mod capture;
pub mod compression;
pub mod encoding;
pub mod overlay;
pub mod processing;

pub use capture::PhotoCapture;
pub use compression::{
    CompressedImage, CompressionOutcome, CompressionParameters, KeepReason, compress_bytes,
    compress_if_smaller, compress_image,
};
pub use overlay::GhostOverlay;

use crate::backends::camera::types::{CameraFacing, CameraFrame};
use crate::errors::PhotoError;
use chrono::{DateTime, Local};
use image::DynamicImage;
use std::sync::Arc;
use tracing::info;

/// A captured photo ready to be stored
#[derive(Debug, Clone)]
pub struct CapturedPhoto {
    /// JPEG bytes
    pub data: Vec<u8>,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Local>,
    pub facing: CameraFacing,
    pub flash_fired: bool,
}

/// Complete photo pipeline
///
/// Turns a raw camera frame into compressed JPEG bytes.
#[derive(Debug, Clone, Default)]
pub struct PhotoPipeline {
    params: CompressionParameters,
}

impl PhotoPipeline {
    /// Create a pipeline with the given compression settings
    pub fn new(params: CompressionParameters) -> Self {
        Self {
            params: params.clamped(),
        }
    }

    pub fn params(&self) -> &CompressionParameters {
        &self.params
    }

    /// Update compression settings
    pub fn set_params(&mut self, params: CompressionParameters) {
        self.params = params.clamped();
    }

    /// Process a captured frame asynchronously
    pub async fn process(&self, frame: Arc<CameraFrame>) -> Result<CapturedPhoto, PhotoError> {
        let captured_at = frame.captured_at;
        let facing = frame.facing;
        let flash_fired = frame.flash_fired;

        // Stage 1: drop alpha
        let rgb = processing::frame_to_rgb(frame).await?;

        // Stage 2: compress (CPU-bound)
        let target_width = self.params.target_width();
        let quality = self.params.quality;
        let compressed = tokio::task::spawn_blocking(move || {
            compress_image(&DynamicImage::ImageRgb8(rgb), target_width, quality)
        })
        .await
        .map_err(|e| PhotoError::TaskFailed(e.to_string()))??;

        info!(
            width = compressed.width,
            height = compressed.height,
            size = compressed.data.len(),
            "Photo processed"
        );

        Ok(CapturedPhoto {
            data: compressed.data,
            width: compressed.width,
            height: compressed.height,
            captured_at,
            facing,
            flash_fired,
        })
    }
}
