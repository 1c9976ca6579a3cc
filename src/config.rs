// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::types::CameraFacing;
use crate::constants::{PhotoTimerSetting, overlay, slideshow};
use crate::errors::ConfigError;
use crate::pipelines::photo::CompressionParameters;
use crate::storage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Capture defaults remembered between runs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraSettings {
    /// Image file or folder the file-backed camera reads (default: Pictures)
    pub source: Option<PathBuf>,
    /// Camera facing used when a session starts
    pub facing: CameraFacing,
    /// Flash state used when a session starts
    pub flash_enabled: bool,
    /// Photo timer preset
    pub timer: PhotoTimerSetting,
    /// Composite the latest journal image over the preview
    pub ghost_overlay: bool,
    /// Ghost overlay opacity in [0, 1]
    pub ghost_opacity: f32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            source: None,
            facing: CameraFacing::default(),
            flash_enabled: false,
            timer: PhotoTimerSetting::default(),
            ghost_overlay: false,
            ghost_opacity: overlay::DEFAULT_OPACITY,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Config format version
    pub version: u32,
    /// Journal database (default: `<data dir>/photo-journal/journal.db`)
    pub library_path: Option<PathBuf>,
    /// Parent folder for exports (default: `<documents>/Photo Journal`)
    pub export_dir: Option<PathBuf>,
    /// Compression applied to captures, imports and library passes
    pub compression: CompressionParameters,
    pub camera: CameraSettings,
    /// Compress imported images when that makes them smaller
    pub compress_imports: bool,
    /// Seconds each slide stays up
    pub slideshow_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: Self::VERSION,
            library_path: None,
            export_dir: None,
            compression: CompressionParameters::default(),
            camera: CameraSettings::default(),
            compress_imports: true,
            slideshow_interval_secs: slideshow::DEFAULT_INTERVAL_SECS,
        }
    }
}

impl Config {
    pub const VERSION: u32 = 1;

    /// Load from `path`; a missing file yields the defaults
    ///
    /// Out-of-range values are clamped rather than rejected.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No config file, using defaults");
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        let config: Config = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!(path = %path.display(), version = config.version, "Config loaded");
        Ok(config.clamped())
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let io_error = |source: std::io::Error| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_error)?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        std::fs::write(path, json).map_err(io_error)?;

        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Copy with every bounded value forced into range
    pub fn clamped(mut self) -> Self {
        self.compression = self.compression.clamped();
        self.camera.ghost_opacity = if self.camera.ghost_opacity.is_finite() {
            self.camera.ghost_opacity.clamp(0.0, 1.0)
        } else {
            overlay::DEFAULT_OPACITY
        };
        self.slideshow_interval_secs = self
            .slideshow_interval_secs
            .max(slideshow::MIN_INTERVAL_SECS);
        self.version = Self::VERSION;
        self
    }

    pub fn library_path(&self) -> PathBuf {
        self.library_path
            .clone()
            .unwrap_or_else(storage::default_library_path)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(storage::default_export_dir)
    }

    pub fn camera_source(&self) -> PathBuf {
        self.camera
            .source
            .clone()
            .unwrap_or_else(storage::default_camera_source)
    }

    pub fn slideshow_interval(&self) -> Duration {
        Duration::from_secs(self.slideshow_interval_secs)
    }
}
