// SPDX-License-Identifier: GPL-3.0-only
// Shared types for camera backend abstraction

//! Shared types for camera backends

use chrono::{DateTime, Local};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Which way the active camera points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CameraFacing {
    /// Rear camera (default)
    #[default]
    Back,
    /// Selfie camera
    Front,
}

impl CameraFacing {
    /// The opposite facing
    pub fn toggled(&self) -> Self {
        match self {
            CameraFacing::Back => CameraFacing::Front,
            CameraFacing::Front => CameraFacing::Back,
        }
    }

    /// Lowercase name, also used as the source sub-directory name
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraFacing::Back => "back",
            CameraFacing::Front => "front",
        }
    }
}

impl std::fmt::Display for CameraFacing {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CameraFacing {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "back" | "rear" => Ok(CameraFacing::Back),
            "front" | "selfie" => Ok(CameraFacing::Front),
            other => Err(format!("unknown camera facing '{}'", other)),
        }
    }
}

/// Outcome of asking the platform for camera access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
}

/// Represents a camera device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraDevice {
    pub name: String,
    /// Where frames come from (device node or source directory)
    pub path: PathBuf,
    pub facing: CameraFacing,
}

/// A single captured frame
///
/// Pixel data is tightly packed RGBA8 and shared via `Arc` so frames can be
/// handed to background tasks without copying.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub data: Arc<[u8]>,
    /// Wall-clock time the frame was captured
    pub captured_at: DateTime<Local>,
    pub facing: CameraFacing,
    /// Flash was enabled for this capture
    pub flash_fired: bool,
}

impl CameraFrame {
    /// Build a frame from a decoded RGBA image
    pub fn from_rgba(image: RgbaImage, facing: CameraFacing) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            data: Arc::from(image.into_raw()),
            captured_at: Local::now(),
            facing,
            flash_fired: false,
        }
    }

    /// Number of bytes a well-formed frame of this size holds
    pub fn expected_len(&self) -> usize {
        self.width as usize * self.height as usize * 4
    }

    /// Copy the frame into an owned RGBA image (None if the buffer size is wrong)
    pub fn to_rgba_image(&self) -> Option<RgbaImage> {
        RgbaImage::from_raw(self.width, self.height, self.data.to_vec())
    }
}

/// Result type for backend operations
pub type BackendResult<T> = Result<T, BackendError>;

/// Error types for backend operations
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// Backend is not available on this system
    #[error("Backend not available: {0}")]
    NotAvailable(String),
    /// Failed to initialize backend
    #[error("Initialization failed: {0}")]
    InitializationFailed(String),
    /// Camera device not found
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
    /// Operation needs an initialized backend
    #[error("Camera is not initialized")]
    NotInitialized,
    /// Capture call failed
    #[error("Capture failed: {0}")]
    CaptureFailed(String),
    /// General I/O error
    #[error("I/O error: {0}")]
    IoError(String),
    /// Other errors
    #[error("Error: {0}")]
    Other(String),
}

impl From<std::io::Error> for BackendError {
    fn from(err: std::io::Error) -> Self {
        BackendError::IoError(err.to_string())
    }
}
