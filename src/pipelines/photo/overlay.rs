// SPDX-License-Identifier: MPL-2.0

//! Ghost overlay
//!
//! Blends a translucent reference image over the live preview so a shot can be
//! framed like an earlier one. Only previews are composited; captured photos
//! never carry the overlay.

use super::encoding;
use crate::errors::PhotoError;
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

fn clamp_opacity(opacity: f32) -> f32 {
    if opacity.is_finite() {
        opacity.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Reference image plus blend strength
#[derive(Debug, Clone)]
pub struct GhostOverlay {
    reference: RgbaImage,
    opacity: f32,
}

impl GhostOverlay {
    /// Create an overlay; opacity is clamped to [0, 1]
    pub fn new(reference: RgbaImage, opacity: f32) -> Self {
        Self {
            reference,
            opacity: clamp_opacity(opacity),
        }
    }

    /// Create an overlay from encoded image bytes (e.g. a journal entry)
    pub fn from_bytes(bytes: &[u8], opacity: f32) -> Result<Self, PhotoError> {
        Ok(Self::new(encoding::decode(bytes)?.to_rgba8(), opacity))
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = clamp_opacity(opacity);
    }

    /// Composite the reference over a preview frame
    ///
    /// The reference is stretched to the preview size. The result is opaque.
    pub fn apply(&self, preview: &RgbaImage) -> RgbaImage {
        let (width, height) = preview.dimensions();
        let reference = if self.reference.dimensions() == (width, height) {
            self.reference.clone()
        } else {
            imageops::resize(&self.reference, width, height, FilterType::Triangle)
        };

        let alpha = self.opacity;
        RgbaImage::from_fn(width, height, |x, y| {
            let base = preview.get_pixel(x, y);
            let ghost = reference.get_pixel(x, y);
            let blend = |b: u8, g: u8| (b as f32 * (1.0 - alpha) + g as f32 * alpha).round() as u8;
            Rgba([
                blend(base[0], ghost[0]),
                blend(base[1], ghost[1]),
                blend(base[2], ghost[2]),
                255,
            ])
        })
    }
}
