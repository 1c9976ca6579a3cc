// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture session controller

use image::{Rgba, RgbaImage};
use photo_journal::app::{CaptureSession, SessionState};
use photo_journal::backends::camera::{
    BackendError, BackendResult, CameraBackend, CameraBackendManager, CameraDevice, CameraFacing,
    CameraFrame, PermissionStatus,
};
use photo_journal::errors::SessionError;
use photo_journal::pipelines::photo::{GhostOverlay, PhotoPipeline, encoding};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::broadcast;

/// Backend that hands out solid-color frames and counts captures
struct MockCamera {
    permission: PermissionStatus,
    fail_initialize: bool,
    fail_capture: bool,
    no_devices: bool,
    captures: Arc<AtomicUsize>,
    device: Option<CameraDevice>,
    flash: bool,
}

impl MockCamera {
    fn new(captures: Arc<AtomicUsize>) -> Self {
        Self {
            permission: PermissionStatus::Granted,
            fail_initialize: false,
            fail_capture: false,
            no_devices: false,
            captures,
            device: None,
            flash: false,
        }
    }

    fn frame(&self) -> CameraFrame {
        let facing = self
            .device
            .as_ref()
            .map(|d| d.facing)
            .unwrap_or_default();
        let mut frame =
            CameraFrame::from_rgba(RgbaImage::from_pixel(64, 48, Rgba([200, 0, 0, 255])), facing);
        frame.flash_fired = self.flash;
        frame
    }
}

impl CameraBackend for MockCamera {
    fn check_permission(&self) -> PermissionStatus {
        self.permission
    }

    fn enumerate_cameras(&self) -> Vec<CameraDevice> {
        if self.no_devices {
            return Vec::new();
        }
        [CameraFacing::Back, CameraFacing::Front]
            .into_iter()
            .map(|facing| CameraDevice {
                name: format!("mock {}", facing),
                path: PathBuf::from(format!("/dev/mock-{}", facing)),
                facing,
            })
            .collect()
    }

    fn initialize(&mut self, facing: CameraFacing) -> BackendResult<()> {
        if self.fail_initialize {
            return Err(BackendError::InitializationFailed(
                "no capture input".to_string(),
            ));
        }
        self.device = self
            .enumerate_cameras()
            .into_iter()
            .find(|d| d.facing == facing);
        Ok(())
    }

    fn shutdown(&mut self) -> BackendResult<()> {
        self.device = None;
        Ok(())
    }

    fn is_initialized(&self) -> bool {
        self.device.is_some()
    }

    fn switch_camera(&mut self, facing: CameraFacing) -> BackendResult<()> {
        self.initialize(facing)
    }

    fn set_flash(&mut self, enabled: bool) -> BackendResult<()> {
        self.flash = enabled;
        Ok(())
    }

    fn capture_photo(&mut self) -> BackendResult<CameraFrame> {
        if self.device.is_none() {
            return Err(BackendError::NotInitialized);
        }
        if self.fail_capture {
            return Err(BackendError::CaptureFailed("sensor timeout".to_string()));
        }
        self.captures.fetch_add(1, Ordering::SeqCst);
        Ok(self.frame())
    }

    fn preview_frame(&self) -> Option<CameraFrame> {
        self.device.as_ref().map(|_| self.frame())
    }

    fn current_device(&self) -> Option<&CameraDevice> {
        self.device.as_ref()
    }
}

fn session_with(configure: impl FnOnce(&mut MockCamera)) -> (CaptureSession, Arc<AtomicUsize>) {
    let captures = Arc::new(AtomicUsize::new(0));
    let mut camera = MockCamera::new(captures.clone());
    configure(&mut camera);
    let session = CaptureSession::new(
        CameraBackendManager::new(Box::new(camera)),
        PhotoPipeline::default(),
    );
    (session, captures)
}

fn drain(rx: &mut broadcast::Receiver<SessionState>) -> Vec<SessionState> {
    let mut states = Vec::new();
    while let Ok(state) = rx.try_recv() {
        states.push(state);
    }
    states
}

#[tokio::test(start_paused = true)]
async fn test_delayed_capture_counts_down_then_captures_once() {
    let (mut session, captures) = session_with(|_| {});
    session.open().await.unwrap();
    assert_eq!(session.state(), SessionState::Running);

    let mut rx = session.subscribe();
    let photo = session.capture(5).await.unwrap();

    assert_eq!(
        drain(&mut rx),
        vec![
            SessionState::CountingDown(5),
            SessionState::CountingDown(4),
            SessionState::CountingDown(3),
            SessionState::CountingDown(2),
            SessionState::CountingDown(1),
            SessionState::CountingDown(0),
            SessionState::Capturing,
            SessionState::Running,
        ]
    );
    assert_eq!(captures.load(Ordering::SeqCst), 1);
    assert!(encoding::is_jpeg(&photo.data));
}

#[tokio::test(start_paused = true)]
async fn test_countdown_takes_one_second_per_step() {
    let (mut session, _) = session_with(|_| {});
    session.open().await.unwrap();

    let started = tokio::time::Instant::now();
    session.capture(3).await.unwrap();
    assert_eq!(started.elapsed(), Duration::from_secs(3));
}

#[tokio::test]
async fn test_zero_delay_captures_immediately() {
    let (mut session, captures) = session_with(|_| {});
    session.open().await.unwrap();

    let mut rx = session.subscribe();
    let photo = session.capture(0).await.unwrap();

    assert_eq!(
        drain(&mut rx),
        vec![SessionState::Capturing, SessionState::Running]
    );
    assert_eq!(captures.load(Ordering::SeqCst), 1);
    // 64 px wide frame stays at its width minus the edge crop
    assert_eq!((photo.width, photo.height), (63, 47));
}

#[tokio::test]
async fn test_permission_denied_blocks_capture() {
    let (mut session, captures) = session_with(|camera| {
        camera.permission = PermissionStatus::Denied;
    });

    let err = session.open().await.unwrap_err();
    assert!(matches!(err, SessionError::PermissionDenied));
    assert_eq!(session.state(), SessionState::PermissionDenied);

    let err = session.capture(0).await.unwrap_err();
    assert!(matches!(err, SessionError::InvalidTransition { .. }));
    assert_eq!(captures.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_configuration_failure_stays_configuring() {
    let (mut session, _) = session_with(|camera| {
        camera.fail_initialize = true;
    });

    let err = session.open().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Backend(BackendError::InitializationFailed(_))
    ));
    assert_eq!(session.state(), SessionState::Configuring);
    assert!(session.capture(0).await.is_err());
}

#[tokio::test]
async fn test_controls_only_while_running() {
    let (mut session, _) = session_with(|_| {});
    assert!(session.switch_facing().is_err());
    assert!(session.toggle_flash().is_err());

    session.open().await.unwrap();
    assert_eq!(session.device().unwrap().facing, CameraFacing::Back);
    assert_eq!(session.switch_facing().unwrap(), CameraFacing::Front);
    assert_eq!(session.device().unwrap().name, "mock front");
    assert!(session.toggle_flash().unwrap());

    let photo = session.capture(0).await.unwrap();
    assert_eq!(photo.facing, CameraFacing::Front);
    assert!(photo.flash_fired);
}

#[tokio::test(start_paused = true)]
async fn test_abort_during_countdown_returns_to_running() {
    let (mut session, captures) = session_with(|_| {});
    session.open().await.unwrap();

    let mut rx = session.subscribe();
    let err = session
        .capture_until(5, tokio::time::sleep(Duration::from_millis(2500)))
        .await
        .unwrap_err();

    assert!(matches!(err, SessionError::Aborted));
    assert_eq!(session.state(), SessionState::Running);
    assert_eq!(captures.load(Ordering::SeqCst), 0);
    assert_eq!(
        drain(&mut rx),
        vec![
            SessionState::CountingDown(5),
            SessionState::CountingDown(4),
            SessionState::CountingDown(3),
            SessionState::Running,
        ]
    );

    // Session is usable again
    session.capture(0).await.unwrap();
    assert_eq!(captures.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_capture_returns_to_running() {
    let (mut session, captures) = session_with(|_| {});
    session.open().await.unwrap();

    let mut rx = session.subscribe();
    let timed_out = tokio::time::timeout(Duration::from_millis(1500), session.capture(5)).await;
    assert!(timed_out.is_err());
    assert_eq!(session.state(), SessionState::Running);
    assert_eq!(
        drain(&mut rx),
        vec![
            SessionState::CountingDown(5),
            SessionState::CountingDown(4),
            SessionState::Running,
        ]
    );

    session.capture(0).await.unwrap();
    assert_eq!(captures.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_no_cameras_stays_configuring() {
    let (mut session, _) = session_with(|camera| {
        camera.no_devices = true;
    });

    let err = session.open().await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Backend(BackendError::DeviceNotFound(_))
    ));
    assert_eq!(session.state(), SessionState::Configuring);
    assert!(session.device().is_none());
}

#[tokio::test]
async fn test_capture_failure_returns_to_running() {
    let (mut session, _) = session_with(|camera| {
        camera.fail_capture = true;
    });
    session.open().await.unwrap();

    let err = session.capture(0).await.unwrap_err();
    assert!(matches!(
        err,
        SessionError::Backend(BackendError::CaptureFailed(_))
    ));
    assert_eq!(session.state(), SessionState::Running);
}

#[tokio::test]
async fn test_preview_applies_ghost_overlay() {
    let (mut session, _) = session_with(|_| {});
    assert!(session.preview().is_err());

    session.open().await.unwrap();
    let plain = session.preview().unwrap();
    assert_eq!(plain.get_pixel(0, 0), &Rgba([200, 0, 0, 255]));

    let reference = RgbaImage::from_pixel(64, 48, Rgba([0, 0, 200, 255]));
    session.set_ghost_overlay(Some(GhostOverlay::new(reference, 1.0)));
    let ghosted = session.preview().unwrap();
    assert_eq!(ghosted.get_pixel(10, 10), &Rgba([0, 0, 200, 255]));
}
