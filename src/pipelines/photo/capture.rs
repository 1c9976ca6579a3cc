// SPDX-License-Identifier: MPL-2.0

//! Photo capture from camera backend
//!
//! The hardware capture call blocks, so it runs on a background task while the
//! session owner awaits the frame.

use crate::backends::camera::CameraBackendManager;
use crate::backends::camera::types::{BackendError, CameraFrame};
use std::sync::Arc;
use tracing::{debug, info};

/// Photo capture handler
pub struct PhotoCapture;

impl PhotoCapture {
    /// Capture a photo from the camera backend
    ///
    /// # Returns
    /// * `Ok(Arc<CameraFrame>)` - Captured frame (zero-copy via Arc)
    /// * `Err(BackendError)` - Capture failed or the task died
    pub async fn capture_from_backend(
        backend: &CameraBackendManager,
    ) -> Result<Arc<CameraFrame>, BackendError> {
        info!("Capturing photo from camera backend");

        let backend = backend.clone();
        let frame = tokio::task::spawn_blocking(move || backend.capture_photo())
            .await
            .map_err(|e| BackendError::CaptureFailed(format!("capture task failed: {}", e)))??;

        debug!(
            width = frame.width,
            height = frame.height,
            flash = frame.flash_fired,
            "Frame captured from backend"
        );

        Ok(Arc::new(frame))
    }
}
