// SPDX-License-Identifier: MPL-2.0

//! Post-processing for captured frames
//!
//! Converts the backend's RGBA frame into the RGB bitmap the encoder expects.

use crate::backends::camera::types::CameraFrame;
use crate::errors::PhotoError;
use image::RgbImage;
use std::sync::Arc;
use tracing::debug;

/// Convert RGBA data to RGB image (drop alpha channel)
pub fn convert_rgba_to_rgb(rgba_data: &[u8], width: u32, height: u32) -> Result<RgbImage, PhotoError> {
    let pixel_count = width as usize * height as usize;
    if rgba_data.len() < pixel_count * 4 {
        return Err(PhotoError::InvalidFrame {
            width,
            height,
            len: rgba_data.len(),
        });
    }

    let rgb_data: Vec<u8> = rgba_data
        .chunks_exact(4)
        .take(pixel_count)
        .flat_map(|rgba| [rgba[0], rgba[1], rgba[2]])
        .collect();

    RgbImage::from_raw(width, height, rgb_data).ok_or(PhotoError::InvalidFrame {
        width,
        height,
        len: rgba_data.len(),
    })
}

/// Convert a captured frame on a blocking background task
pub async fn frame_to_rgb(frame: Arc<CameraFrame>) -> Result<RgbImage, PhotoError> {
    debug!(width = frame.width, height = frame.height, "Converting frame to RGB");

    tokio::task::spawn_blocking(move || convert_rgba_to_rgb(&frame.data, frame.width, frame.height))
        .await
        .map_err(|e| PhotoError::TaskFailed(e.to_string()))?
}
