// SPDX-License-Identifier: GPL-3.0-only

//! Capture session state machine
//!
//! ```text
//! Uninitialized ──granted──▶ Configuring ──started──▶ Running ◀────────────┐
//!       │                                              │  │                 │
//!     denied                                  delay > 0  delay = 0          │
//!       ▼                                              ▼  │                 │
//! PermissionDenied                          CountingDown(n)│── aborted ─────┤
//!                                      tick: n → n-1   │   │                │
//!                                         elapsed at 0 ▼   ▼                │
//!                                                  Capturing ── delivered ──┘
//! ```
//!
//! Transitions are pure: [`SessionState::transition`] returns the next state
//! or rejects the event, and the controller applies the result.

use crate::errors::SessionError;

/// Capture session state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// Permission not yet requested
    #[default]
    Uninitialized,
    /// Camera access denied; only the system settings can change this
    PermissionDenied,
    /// Permission granted, device not attached yet (or attaching failed)
    Configuring,
    /// Session running, ready to capture
    Running,
    /// Delayed capture; seconds remaining
    CountingDown(u32),
    /// Hardware capture in flight
    Capturing,
}

impl SessionState {
    /// Compute the next state for an event
    pub fn transition(self, event: SessionEvent) -> Result<SessionState, SessionError> {
        use SessionEvent as E;
        use SessionState as S;

        let next = match (self, event) {
            (S::Uninitialized, E::PermissionGranted) => S::Configuring,
            (S::Uninitialized, E::PermissionDenied) => S::PermissionDenied,
            (S::Configuring, E::SessionStarted) => S::Running,
            (S::Running, E::StartCapture { delay_secs: 0 }) => S::Capturing,
            (S::Running, E::StartCapture { delay_secs }) => S::CountingDown(delay_secs),
            (S::CountingDown(n), E::Tick) if n > 0 => S::CountingDown(n - 1),
            (S::CountingDown(0), E::CountdownElapsed) => S::Capturing,
            (S::CountingDown(_), E::AbortCountdown) => S::Running,
            (S::Capturing, E::PhotoDelivered | E::CaptureFailed) => S::Running,
            (from, event) => {
                return Err(SessionError::InvalidTransition {
                    from,
                    event: event.to_string(),
                });
            }
        };
        Ok(next)
    }

    /// Side-effect controls (facing, flash) are only available while running
    pub fn accepts_controls(&self) -> bool {
        matches!(self, SessionState::Running)
    }

    /// Countdown seconds remaining, if counting down
    pub fn countdown(&self) -> Option<u32> {
        match self {
            SessionState::CountingDown(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Uninitialized => write!(f, "uninitialized"),
            SessionState::PermissionDenied => write!(f, "permission denied"),
            SessionState::Configuring => write!(f, "configuring"),
            SessionState::Running => write!(f, "running"),
            SessionState::CountingDown(n) => write!(f, "counting down ({}s)", n),
            SessionState::Capturing => write!(f, "capturing"),
        }
    }
}

/// Inputs that drive the state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    PermissionGranted,
    PermissionDenied,
    /// Device attached and session started
    SessionStarted,
    /// User pressed the shutter
    StartCapture { delay_secs: u32 },
    /// One countdown second passed
    Tick,
    /// Countdown reached zero
    CountdownElapsed,
    /// User cancelled the countdown
    AbortCountdown,
    /// Photo buffer arrived from the backend
    PhotoDelivered,
    /// Backend capture failed
    CaptureFailed,
}

impl std::fmt::Display for SessionEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionEvent::PermissionGranted => write!(f, "grant permission"),
            SessionEvent::PermissionDenied => write!(f, "deny permission"),
            SessionEvent::SessionStarted => write!(f, "start session"),
            SessionEvent::StartCapture { delay_secs } => {
                write!(f, "start capture (delay {}s)", delay_secs)
            }
            SessionEvent::Tick => write!(f, "tick countdown"),
            SessionEvent::CountdownElapsed => write!(f, "finish countdown"),
            SessionEvent::AbortCountdown => write!(f, "abort countdown"),
            SessionEvent::PhotoDelivered => write!(f, "deliver photo"),
            SessionEvent::CaptureFailed => write!(f, "fail capture"),
        }
    }
}
