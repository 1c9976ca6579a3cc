// SPDX-License-Identifier: GPL-3.0-only

//! Camera backend lifecycle manager
//!
//! The manager provides:
//! - Backend lifecycle management (initialization, shutdown)
//! - Thread-safe backend access, so blocking calls can move to background tasks

use super::CameraBackend;
use super::types::*;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, warn};

/// Camera backend manager
///
/// Thread-safe and cheap to clone; clones share the same backend.
#[derive(Clone)]
pub struct CameraBackendManager {
    backend: Arc<Mutex<Box<dyn CameraBackend>>>,
}

impl CameraBackendManager {
    /// Create a manager around a concrete backend
    pub fn new(backend: Box<dyn CameraBackend>) -> Self {
        Self {
            backend: Arc::new(Mutex::new(backend)),
        }
    }

    /// Lock the backend, recovering from a poisoned lock
    ///
    /// A panic inside a backend call leaves the backend itself usable.
    fn lock(&self) -> MutexGuard<'_, Box<dyn CameraBackend>> {
        self.backend.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Ask the backend for camera access
    pub fn check_permission(&self) -> PermissionStatus {
        let status = self.lock().check_permission();
        debug!(?status, "Camera permission checked");
        status
    }

    /// Enumerate available cameras
    pub fn enumerate_cameras(&self) -> BackendResult<Vec<CameraDevice>> {
        let cameras = self.lock().enumerate_cameras();
        if cameras.is_empty() {
            Err(BackendError::DeviceNotFound("No cameras found".to_string()))
        } else {
            Ok(cameras)
        }
    }

    /// Initialize the backend
    pub fn initialize(&self, facing: CameraFacing) -> BackendResult<()> {
        info!(%facing, "Initializing backend");
        self.lock().initialize(facing)
    }

    /// Shutdown the backend
    pub fn shutdown(&self) -> BackendResult<()> {
        info!("Shutting down backend");
        self.lock().shutdown()
    }

    /// Check if initialized
    pub fn is_initialized(&self) -> bool {
        self.lock().is_initialized()
    }

    /// Switch to a different camera
    pub fn switch_camera(&self, facing: CameraFacing) -> BackendResult<()> {
        info!(%facing, "Switching camera");
        self.lock().switch_camera(facing)
    }

    /// Enable or disable the flash
    pub fn set_flash(&self, enabled: bool) -> BackendResult<()> {
        self.lock().set_flash(enabled)
    }

    /// Capture a photo
    pub fn capture_photo(&self) -> BackendResult<CameraFrame> {
        self.lock().capture_photo()
    }

    /// Current preview frame
    pub fn preview_frame(&self) -> Option<CameraFrame> {
        self.lock().preview_frame()
    }

    /// Get current device
    pub fn current_device(&self) -> Option<CameraDevice> {
        self.lock().current_device().cloned()
    }
}

impl Drop for CameraBackendManager {
    fn drop(&mut self) {
        // Last handle releases the device
        if Arc::strong_count(&self.backend) == 1 {
            let mut backend = self.lock();
            if backend.is_initialized() {
                if let Err(e) = backend.shutdown() {
                    warn!(error = %e, "Failed to shut down camera backend");
                }
            }
        }
    }
}

impl std::fmt::Debug for CameraBackendManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraBackendManager")
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
