// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Reserved tag that selects every entry
pub const TAG_ALL: &str = "all";

/// Reserved tag that selects entries without a tag
pub const TAG_UNTAGGED: &str = "untagged";

/// Sentinel tags, in the order they head every tag list
pub const SENTINEL_TAGS: [&str; 2] = [TAG_ALL, TAG_UNTAGGED];

/// Note attached to entries created from an inbound file
pub const IMPORT_PLACEHOLDER_NOTE: &str = "Imported photo";

/// Application directory name under the platform data/config dirs
pub const APP_DIR_NAME: &str = "photo-journal";

/// Default folder name for exports under the documents directory
pub const DEFAULT_EXPORT_FOLDER: &str = "Photo Journal";

/// Countdown tick interval
pub const COUNTDOWN_TICK: Duration = Duration::from_secs(1);

/// Compression parameter bounds and defaults
pub mod compression {
    /// Reference display width in pixels the width multiplier applies to
    pub const DEFAULT_REFERENCE_WIDTH: u32 = 1290;
    pub const MIN_REFERENCE_WIDTH: u32 = 64;
    pub const MAX_REFERENCE_WIDTH: u32 = 8192;

    pub const DEFAULT_WIDTH_MULTIPLIER: f32 = 1.0;
    pub const MIN_WIDTH_MULTIPLIER: f32 = 0.25;
    pub const MAX_WIDTH_MULTIPLIER: f32 = 3.0;

    pub const DEFAULT_QUALITY: f32 = 0.8;
    pub const MIN_QUALITY: f32 = 0.1;
    pub const MAX_QUALITY: f32 = 1.0;
}

/// Ghost overlay defaults
pub mod overlay {
    pub const DEFAULT_OPACITY: f32 = 0.35;
}

/// Slideshow defaults
pub mod slideshow {
    pub const DEFAULT_INTERVAL_SECS: u64 = 3;
    pub const MIN_INTERVAL_SECS: u64 = 1;
}

/// Photo timer presets
///
/// The capture delay cycles through these, mirroring the timer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PhotoTimerSetting {
    /// Capture immediately
    #[default]
    Off,
    /// 3 second countdown
    Sec3,
    /// 5 second countdown
    Sec5,
    /// 10 second countdown
    Sec10,
}

impl PhotoTimerSetting {
    /// All presets in cycle order
    pub const ALL: [PhotoTimerSetting; 4] = [
        PhotoTimerSetting::Off,
        PhotoTimerSetting::Sec3,
        PhotoTimerSetting::Sec5,
        PhotoTimerSetting::Sec10,
    ];

    /// Countdown length in seconds (0 = no countdown)
    pub fn seconds(&self) -> u32 {
        match self {
            PhotoTimerSetting::Off => 0,
            PhotoTimerSetting::Sec3 => 3,
            PhotoTimerSetting::Sec5 => 5,
            PhotoTimerSetting::Sec10 => 10,
        }
    }

    /// Next preset in the cycle
    pub fn next(&self) -> Self {
        match self {
            PhotoTimerSetting::Off => PhotoTimerSetting::Sec3,
            PhotoTimerSetting::Sec3 => PhotoTimerSetting::Sec5,
            PhotoTimerSetting::Sec5 => PhotoTimerSetting::Sec10,
            PhotoTimerSetting::Sec10 => PhotoTimerSetting::Off,
        }
    }

    /// Get display name for the preset
    pub fn display_name(&self) -> &'static str {
        match self {
            PhotoTimerSetting::Off => "Off",
            PhotoTimerSetting::Sec3 => "3s",
            PhotoTimerSetting::Sec5 => "5s",
            PhotoTimerSetting::Sec10 => "10s",
        }
    }
}

impl std::str::FromStr for PhotoTimerSetting {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().trim_end_matches('s') {
            "off" | "0" => Ok(PhotoTimerSetting::Off),
            "3" => Ok(PhotoTimerSetting::Sec3),
            "5" => Ok(PhotoTimerSetting::Sec5),
            "10" => Ok(PhotoTimerSetting::Sec10),
            _ => Err(format!("unknown timer '{}' (expected off, 3, 5 or 10)", s)),
        }
    }
}

/// File format constants
pub mod file_formats {
    /// Supported image extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "bmp", "gif", "tiff"];

    /// Check if an extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}
