// SPDX-License-Identifier: MPL-2.0

//! Camera backend abstraction
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │   CaptureSession    │
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │ CameraBackendManager│  ← Thread-safe shared access
//! └──────────┬──────────┘
//!            │
//!            ▼
//! ┌─────────────────────┐
//! │  CameraBackend Trait│  ← Common interface
//! └──────────┬──────────┘
//!            │
//!            ▼
//!      ┌──────────┐
//!      │FileCamera│  ← Frames from image files
//!      └──────────┘
//! ```

pub mod file_source;
pub mod manager;
pub mod types;

pub use file_source::FileCamera;
pub use manager::CameraBackendManager;
pub use types::*;

/// Camera backend trait
///
/// All camera backends must implement this trait to provide:
/// - Access permission checks
/// - Device enumeration
/// - Lifecycle management (initialization, shutdown)
/// - Side-effect controls (facing, flash)
/// - Photo capture and preview frames
pub trait CameraBackend: Send {
    // ===== Permission =====

    /// Ask whether the camera may be used
    fn check_permission(&self) -> PermissionStatus;

    // ===== Enumeration =====

    /// Enumerate available cameras on this backend
    fn enumerate_cameras(&self) -> Vec<CameraDevice>;

    // ===== Lifecycle =====

    /// Attach the camera with the given facing and start delivering frames
    ///
    /// Must be called before any capture or preview operations.
    fn initialize(&mut self, facing: CameraFacing) -> BackendResult<()>;

    /// Stop the session and release the device
    fn shutdown(&mut self) -> BackendResult<()>;

    /// Check if the backend is currently initialized and operational
    fn is_initialized(&self) -> bool;

    // ===== Operations =====

    /// Switch to the camera with the given facing
    fn switch_camera(&mut self, facing: CameraFacing) -> BackendResult<()>;

    /// Enable or disable the flash for subsequent captures
    fn set_flash(&mut self, enabled: bool) -> BackendResult<()>;

    // ===== Capture =====

    /// Capture a single photo frame (RGBA)
    fn capture_photo(&mut self) -> BackendResult<CameraFrame>;

    /// Current preview frame, if the session is running
    fn preview_frame(&self) -> Option<CameraFrame>;

    // ===== Metadata =====

    /// Get the currently active camera device (if initialized)
    fn current_device(&self) -> Option<&CameraDevice>;
}
