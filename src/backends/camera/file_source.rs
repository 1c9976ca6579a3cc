// SPDX-License-Identifier: GPL-3.0-only

//! File-backed camera
//!
//! Serves frames from image files instead of hardware. The source is either a
//! single image or a directory of images; a directory may contain `back/` and
//! `front/` sub-directories, one per camera facing. Each capture returns the
//! next image in name order, wrapping around.

use super::CameraBackend;
use super::types::*;
use crate::constants::file_formats;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Load an image file as an RGBA camera frame
pub fn load_image_as_frame(path: &Path, facing: CameraFacing) -> BackendResult<CameraFrame> {
    debug!(path = %path.display(), "Loading image file");

    let img = image::open(path).map_err(|e| {
        BackendError::CaptureFailed(format!("Failed to load image '{}': {}", path.display(), e))
    })?;

    let frame = CameraFrame::from_rgba(img.to_rgba8(), facing);
    debug!(width = frame.width, height = frame.height, "Image loaded successfully");
    Ok(frame)
}

/// List supported images in a directory, sorted by file name
fn list_images(dir: &Path) -> BackendResult<Vec<PathBuf>> {
    let mut images: Vec<PathBuf> = std::fs::read_dir(dir)?
        .flatten()
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(file_formats::is_image_extension)
        })
        .collect();
    images.sort();
    Ok(images)
}

/// Camera backend that reads frames from image files
pub struct FileCamera {
    root: PathBuf,
    device: Option<CameraDevice>,
    frames: Vec<PathBuf>,
    next_frame: usize,
    flash_enabled: bool,
}

impl FileCamera {
    /// Create a camera over an image file or directory (not opened yet)
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            device: None,
            frames: Vec::new(),
            next_frame: 0,
            flash_enabled: false,
        }
    }

    /// Directory (or file) that serves the given facing
    fn source_for(&self, facing: CameraFacing) -> PathBuf {
        let per_facing = self.root.join(facing.as_str());
        if per_facing.is_dir() {
            per_facing
        } else {
            self.root.clone()
        }
    }

    fn open(&mut self, facing: CameraFacing) -> BackendResult<()> {
        let source = self.source_for(facing);

        let frames = if source.is_file() {
            vec![source.clone()]
        } else if source.is_dir() {
            list_images(&source)?
        } else {
            return Err(BackendError::DeviceNotFound(format!(
                "{} does not exist",
                source.display()
            )));
        };

        if frames.is_empty() {
            return Err(BackendError::InitializationFailed(format!(
                "no images in {}",
                source.display()
            )));
        }

        info!(source = %source.display(), frames = frames.len(), %facing, "File camera opened");

        self.device = Some(CameraDevice {
            name: format!("File camera ({})", facing),
            path: source,
            facing,
        });
        self.frames = frames;
        self.next_frame = 0;
        Ok(())
    }

    fn facing(&self) -> CameraFacing {
        self.device.as_ref().map(|d| d.facing).unwrap_or_default()
    }
}

impl CameraBackend for FileCamera {
    fn check_permission(&self) -> PermissionStatus {
        // Unreadable source is the file-system equivalent of a denied camera
        let probe = if self.root.is_dir() {
            std::fs::read_dir(&self.root).map(|_| ())
        } else {
            std::fs::File::open(&self.root).map(|_| ())
        };

        match probe {
            Err(e) if e.kind() == ErrorKind::PermissionDenied => {
                warn!(path = %self.root.display(), "Camera source is not readable");
                PermissionStatus::Denied
            }
            _ => PermissionStatus::Granted,
        }
    }

    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        let mut cameras: Vec<CameraDevice> = [CameraFacing::Back, CameraFacing::Front]
            .into_iter()
            .filter_map(|facing| {
                let path = self.root.join(facing.as_str());
                path.is_dir().then(|| CameraDevice {
                    name: format!("File camera ({})", facing),
                    path,
                    facing,
                })
            })
            .collect();

        if cameras.is_empty() && self.root.exists() {
            cameras.push(CameraDevice {
                name: "File camera".to_string(),
                path: self.root.clone(),
                facing: CameraFacing::Back,
            });
        }
        cameras
    }

    fn initialize(&mut self, facing: CameraFacing) -> BackendResult<()> {
        self.open(facing)
    }

    fn shutdown(&mut self) -> BackendResult<()> {
        if let Some(device) = self.device.take() {
            debug!(device = %device.name, "File camera closed");
        }
        self.frames.clear();
        self.next_frame = 0;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.device.is_some()
    }

    fn switch_camera(&mut self, facing: CameraFacing) -> BackendResult<()> {
        if !self.is_initialized() {
            return Err(BackendError::NotInitialized);
        }
        self.open(facing)
    }

    fn set_flash(&mut self, enabled: bool) -> BackendResult<()> {
        self.flash_enabled = enabled;
        Ok(())
    }

    fn capture_photo(&mut self) -> BackendResult<CameraFrame> {
        if self.frames.is_empty() {
            return Err(BackendError::NotInitialized);
        }

        let path = self.frames[self.next_frame % self.frames.len()].clone();
        self.next_frame = (self.next_frame + 1) % self.frames.len();

        let mut frame = load_image_as_frame(&path, self.facing())?;
        frame.flash_fired = self.flash_enabled;
        info!(path = %path.display(), width = frame.width, height = frame.height, "Frame captured");
        Ok(frame)
    }

    fn preview_frame(&self) -> Option<CameraFrame> {
        let path = self.frames.get(self.next_frame % self.frames.len().max(1))?;
        load_image_as_frame(path, self.facing()).ok()
    }

    fn current_device(&self) -> Option<&CameraDevice> {
        self.device.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn write_image(path: &Path, shade: u8) {
        RgbImage::from_pixel(8, 6, Rgb([shade, shade, shade]))
            .save(path)
            .expect("write test image");
    }

    #[test]
    fn captures_cycle_through_directory() {
        let dir = tempfile::tempdir().unwrap();
        write_image(&dir.path().join("a.png"), 10);
        write_image(&dir.path().join("b.png"), 200);
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let mut camera = FileCamera::new(dir.path());
        camera.initialize(CameraFacing::Back).unwrap();

        let first = camera.capture_photo().unwrap();
        let second = camera.capture_photo().unwrap();
        let third = camera.capture_photo().unwrap();

        assert_eq!(first.data[0], 10);
        assert_eq!(second.data[0], 200);
        assert_eq!(third.data[0], 10);
    }

    #[test]
    fn facing_subdirectories_are_separate_cameras() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("front")).unwrap();
        std::fs::create_dir(dir.path().join("back")).unwrap();
        write_image(&dir.path().join("front/selfie.png"), 50);
        write_image(&dir.path().join("back/scene.png"), 150);

        let mut camera = FileCamera::new(dir.path());
        assert_eq!(camera.enumerate_cameras().len(), 2);

        camera.initialize(CameraFacing::Back).unwrap();
        assert_eq!(camera.capture_photo().unwrap().data[0], 150);

        camera.switch_camera(CameraFacing::Front).unwrap();
        let frame = camera.capture_photo().unwrap();
        assert_eq!(frame.data[0], 50);
        assert_eq!(frame.facing, CameraFacing::Front);
    }

    #[test]
    fn empty_directory_fails_to_initialize() {
        let dir = tempfile::tempdir().unwrap();
        let mut camera = FileCamera::new(dir.path());

        assert!(matches!(
            camera.initialize(CameraFacing::Back),
            Err(BackendError::InitializationFailed(_))
        ));
        assert!(!camera.is_initialized());
    }

    #[test]
    fn capture_before_initialize_is_rejected() {
        let mut camera = FileCamera::new("/nonexistent");
        assert!(matches!(
            camera.capture_photo(),
            Err(BackendError::NotInitialized)
        ));
    }
}
