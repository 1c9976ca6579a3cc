// SPDX-License-Identifier: MPL-2.0

//! Error types for the photo journal

use crate::app::state::SessionState;
use crate::backends::camera::types::BackendError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;

/// Main application error type
#[derive(Debug, Error)]
pub enum AppError {
    /// Capture session errors
    #[error("Capture error: {0}")]
    Session(#[from] SessionError),
    /// Photo processing errors
    #[error("Photo error: {0}")]
    Photo(#[from] PhotoError),
    /// Journal store errors
    #[error("Library error: {0}")]
    Library(#[from] LibraryError),
    /// Tag list errors
    #[error("Tag error: {0}")]
    Tag(#[from] TagError),
    /// Inbound file errors
    #[error("Import error: {0}")]
    Import(#[from] ImportError),
    /// Export errors
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Terminal or filesystem errors outside the store
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    /// Generic error with message
    #[error("{0}")]
    Other(String),
}

/// Capture session errors
#[derive(Debug, Error)]
pub enum SessionError {
    /// The requested event is not valid in the current state
    #[error("cannot {event} while {from}")]
    InvalidTransition { from: SessionState, event: String },
    /// Camera access was denied by the user
    #[error("camera access denied; grant access in the system settings and try again")]
    PermissionDenied,
    /// The countdown was cancelled before the capture
    #[error("countdown aborted")]
    Aborted,
    /// Backend failure (device or session setup, capture)
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// The captured frame could not be turned into a photo
    #[error(transparent)]
    Photo(#[from] PhotoError),
    /// A background task panicked or was cancelled
    #[error("background task failed: {0}")]
    TaskFailed(String),
}

/// Photo processing errors
#[derive(Debug, Error)]
pub enum PhotoError {
    /// Quality factor outside (0, 1]
    #[error("quality factor {0} is outside (0, 1]")]
    InvalidQuality(f32),
    /// Target width of zero
    #[error("target width must be positive")]
    InvalidWidth,
    /// Source bytes could not be decoded
    #[error("decoding failed: {0}")]
    Decode(String),
    /// Bitmap could not be encoded
    #[error("encoding failed: {0}")]
    Encode(String),
    /// Frame buffer does not match its declared size
    #[error("frame buffer holds {len} bytes, expected {width}x{height} RGBA")]
    InvalidFrame { width: u32, height: u32, len: usize },
    /// A background task panicked or was cancelled
    #[error("processing task failed: {0}")]
    TaskFailed(String),
}

/// Journal store errors
#[derive(Debug, Error)]
pub enum LibraryError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
    #[error(transparent)]
    Io(#[from] io::Error),
    /// No entry matches the id or prefix
    #[error("no entry matches '{0}'")]
    NotFound(String),
    /// More than one entry matches the prefix
    #[error("'{prefix}' matches {matches} entries; use a longer id")]
    AmbiguousId { prefix: String, matches: usize },
    /// Tag rule violated while writing
    #[error(transparent)]
    Tag(#[from] TagError),
}

/// Tag list errors
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TagError {
    #[error("tag name is empty")]
    Empty,
    #[error("'{0}' is a reserved tag")]
    Reserved(String),
    #[error("no tag named '{0}'")]
    NotFound(String),
    #[error("position {index} is out of range (0-{max})")]
    OutOfRange { index: usize, max: usize },
}

/// Inbound file errors
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{0} is not a supported image")]
    NotAnImage(PathBuf),
    #[error("unsupported location '{0}'")]
    InvalidLocation(String),
}

/// Export errors
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: PhotoError,
    },
    #[error("export task failed: {0}")]
    TaskFailed(String),
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

// Conversion from String for ad-hoc CLI errors
impl From<String> for AppError {
    fn from(msg: String) -> Self {
        AppError::Other(msg)
    }
}

impl From<&str> for AppError {
    fn from(msg: &str) -> Self {
        AppError::Other(msg.to_string())
    }
}
