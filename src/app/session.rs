// SPDX-License-Identifier: GPL-3.0-only

//! Capture session controller
//!
//! Owns the camera backend and drives [`SessionState`] through permission,
//! configuration, countdown and capture. Blocking backend calls run on
//! background tasks; only the owner of the session mutates its state, so
//! overlapping captures are rejected by the state machine instead of raced.

use super::state::{SessionEvent, SessionState};
use crate::backends::camera::CameraBackendManager;
use crate::backends::camera::types::{
    BackendError, CameraDevice, CameraFacing, PermissionStatus,
};
use crate::constants::COUNTDOWN_TICK;
use crate::errors::{PhotoError, SessionError};
use crate::pipelines::photo::{CapturedPhoto, GhostOverlay, PhotoCapture, PhotoPipeline};
use image::RgbaImage;
use std::future::Future;
use tokio::sync::broadcast;
use tracing::{debug, error, info, warn};

/// Buffered state changes per subscriber
const STATE_CHANNEL_CAPACITY: usize = 64;

/// Capture session
pub struct CaptureSession {
    backend: CameraBackendManager,
    pipeline: PhotoPipeline,
    state: SessionState,
    state_tx: broadcast::Sender<SessionState>,
    facing: CameraFacing,
    flash_enabled: bool,
    ghost: Option<GhostOverlay>,
}

impl CaptureSession {
    /// Create a session around a backend; nothing is touched until [`Self::open`]
    pub fn new(backend: CameraBackendManager, pipeline: PhotoPipeline) -> Self {
        let (state_tx, _) = broadcast::channel(STATE_CHANNEL_CAPACITY);
        Self {
            backend,
            pipeline,
            state: SessionState::Uninitialized,
            state_tx,
            facing: CameraFacing::default(),
            flash_enabled: false,
            ghost: None,
        }
    }

    /// Camera facing used when the session starts
    pub fn with_facing(mut self, facing: CameraFacing) -> Self {
        self.facing = facing;
        self
    }

    /// Flash setting used when the session starts
    pub fn with_flash(mut self, enabled: bool) -> Self {
        self.flash_enabled = enabled;
        self
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn facing(&self) -> CameraFacing {
        self.facing
    }

    pub fn flash_enabled(&self) -> bool {
        self.flash_enabled
    }

    /// Device the backend has open, if any
    pub fn device(&self) -> Option<CameraDevice> {
        self.backend.current_device()
    }

    /// Receive every state change from now on
    pub fn subscribe(&self) -> broadcast::Receiver<SessionState> {
        self.state_tx.subscribe()
    }

    pub fn pipeline_mut(&mut self) -> &mut PhotoPipeline {
        &mut self.pipeline
    }

    fn apply(&mut self, event: SessionEvent) -> Result<SessionState, SessionError> {
        let next = self.state.transition(event)?;
        debug!(from = %self.state, to = %next, %event, "Session transition");
        self.state = next;
        // No subscribers is fine
        let _ = self.state_tx.send(next);
        Ok(next)
    }

    fn require_controls(&self, action: &str) -> Result<(), SessionError> {
        if self.state.accepts_controls() {
            Ok(())
        } else {
            Err(SessionError::InvalidTransition {
                from: self.state,
                event: action.to_string(),
            })
        }
    }

    // =========================================================================
    // Lifecycle
    // =========================================================================

    /// Ask the backend for camera access
    pub fn request_permission(&mut self) -> Result<PermissionStatus, SessionError> {
        // Reject before asking the platform again
        self.state.transition(SessionEvent::PermissionGranted)?;

        let status = self.backend.check_permission();
        match status {
            PermissionStatus::Granted => {
                self.apply(SessionEvent::PermissionGranted)?;
            }
            PermissionStatus::Denied => {
                warn!("Camera permission denied");
                self.apply(SessionEvent::PermissionDenied)?;
            }
        }
        Ok(status)
    }

    /// Attach the device and start the session on a background task
    ///
    /// On failure the error is logged and the session stays `Configuring`.
    pub async fn start(&mut self) -> Result<(), SessionError> {
        self.state.transition(SessionEvent::SessionStarted)?;

        let backend = self.backend.clone();
        let facing = self.facing;
        let flash = self.flash_enabled;
        let result = tokio::task::spawn_blocking(move || {
            let cameras = backend.enumerate_cameras()?;
            debug!(count = cameras.len(), "Cameras available");
            backend.initialize(facing)?;
            backend.set_flash(flash)
        })
        .await
        .map_err(|e| SessionError::TaskFailed(e.to_string()))?;

        if let Err(e) = result {
            error!(error = %e, "Camera configuration failed");
            return Err(e.into());
        }

        self.apply(SessionEvent::SessionStarted)?;
        info!(facing = %self.facing, "Capture session running");
        Ok(())
    }

    /// Request permission and start the session
    pub async fn open(&mut self) -> Result<(), SessionError> {
        match self.request_permission()? {
            PermissionStatus::Denied => Err(SessionError::PermissionDenied),
            PermissionStatus::Granted => self.start().await,
        }
    }

    // =========================================================================
    // Controls
    // =========================================================================

    /// Switch between front and back camera
    pub fn switch_facing(&mut self) -> Result<CameraFacing, SessionError> {
        self.require_controls("switch camera")?;

        let next = self.facing.toggled();
        self.backend.switch_camera(next)?;
        self.facing = next;
        info!(facing = %next, "Camera switched");
        Ok(next)
    }

    /// Toggle the flash for subsequent captures
    pub fn toggle_flash(&mut self) -> Result<bool, SessionError> {
        self.require_controls("toggle flash")?;

        let enabled = !self.flash_enabled;
        self.backend.set_flash(enabled)?;
        self.flash_enabled = enabled;
        info!(flash_enabled = enabled, "Flash toggled");
        Ok(enabled)
    }

    /// Set or clear the ghost overlay shown on previews
    pub fn set_ghost_overlay(&mut self, overlay: Option<GhostOverlay>) {
        self.ghost = overlay;
    }

    pub fn ghost_overlay(&self) -> Option<&GhostOverlay> {
        self.ghost.as_ref()
    }

    /// Current preview with the ghost overlay composited
    pub fn preview(&self) -> Result<RgbaImage, SessionError> {
        if !matches!(
            self.state,
            SessionState::Running | SessionState::CountingDown(_)
        ) {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                event: "show preview".to_string(),
            });
        }

        let frame = self
            .backend
            .preview_frame()
            .ok_or(BackendError::NotInitialized)?;
        let image = frame.to_rgba_image().ok_or(PhotoError::InvalidFrame {
            width: frame.width,
            height: frame.height,
            len: frame.data.len(),
        })?;

        Ok(match &self.ghost {
            Some(ghost) => ghost.apply(&image),
            None => image,
        })
    }

    // =========================================================================
    // Capture
    // =========================================================================

    /// Capture a photo after `delay_secs` seconds of countdown
    pub async fn capture(&mut self, delay_secs: u32) -> Result<CapturedPhoto, SessionError> {
        self.capture_until(delay_secs, std::future::pending()).await
    }

    /// Capture a photo, aborting the countdown if `abort` completes first
    ///
    /// Once the capture itself has started it runs to completion. Dropping
    /// the future early returns the session to `Running`.
    pub async fn capture_until<F>(
        &mut self,
        delay_secs: u32,
        abort: F,
    ) -> Result<CapturedPhoto, SessionError>
    where
        F: Future<Output = ()>,
    {
        let mut session = InFlightCapture(self);
        session.apply(SessionEvent::StartCapture { delay_secs })?;
        if delay_secs > 0 {
            info!(seconds = delay_secs, "Starting photo timer countdown");
        }

        tokio::pin!(abort);
        while let SessionState::CountingDown(remaining) = session.state {
            if remaining == 0 {
                info!("Photo timer countdown complete - capturing");
                session.apply(SessionEvent::CountdownElapsed)?;
                break;
            }

            tokio::select! {
                _ = &mut abort => {
                    info!(remaining, "Photo timer countdown aborted");
                    session.apply(SessionEvent::AbortCountdown)?;
                    return Err(SessionError::Aborted);
                }
                _ = tokio::time::sleep(COUNTDOWN_TICK) => {
                    session.apply(SessionEvent::Tick)?;
                    debug!(remaining = remaining - 1, "Photo timer tick");
                }
            }
        }

        match session.take_photo().await {
            Ok(photo) => {
                session.apply(SessionEvent::PhotoDelivered)?;
                Ok(photo)
            }
            Err(e) => {
                error!(error = %e, "Photo capture failed");
                session.apply(SessionEvent::CaptureFailed)?;
                Err(e)
            }
        }
    }

    /// Return to `Running` after a capture was cut short
    fn settle_interrupted(&mut self) {
        let event = match self.state {
            SessionState::CountingDown(_) => SessionEvent::AbortCountdown,
            SessionState::Capturing => SessionEvent::CaptureFailed,
            _ => return,
        };
        warn!(state = %self.state, "Capture dropped before completion");
        if let Err(e) = self.apply(event) {
            error!(error = %e, "Could not reset interrupted capture");
        }
    }

    async fn take_photo(&self) -> Result<CapturedPhoto, SessionError> {
        let frame = PhotoCapture::capture_from_backend(&self.backend).await?;
        Ok(self.pipeline.process(frame).await?)
    }
}

/// Borrow of a session with a capture in progress
struct InFlightCapture<'a>(&'a mut CaptureSession);

impl std::ops::Deref for InFlightCapture<'_> {
    type Target = CaptureSession;

    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl std::ops::DerefMut for InFlightCapture<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0
    }
}

impl Drop for InFlightCapture<'_> {
    fn drop(&mut self) {
        self.0.settle_interrupted();
    }
}

impl std::fmt::Debug for CaptureSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureSession")
            .field("state", &self.state)
            .field("facing", &self.facing)
            .field("flash_enabled", &self.flash_enabled)
            .field("ghost", &self.ghost.is_some())
            .finish()
    }
}
