// SPDX-License-Identifier: GPL-3.0-only

//! Capture session and playback
//!
//! - [`state`]: the capture session state machine
//! - [`session`]: the controller that drives it against a camera backend
//! - [`slideshow`]: timed playback over journal entries

pub mod session;
pub mod slideshow;
pub mod state;

pub use session::CaptureSession;
pub use slideshow::{Slideshow, SlideshowOptions};
pub use state::{SessionEvent, SessionState};
