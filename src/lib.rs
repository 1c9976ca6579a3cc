// SPDX-License-Identifier: MPL-2.0

//! Photo Journal - a camera-first photo diary
//!
//! This library provides the core of the Photo Journal application: the
//! capture session, image compression, and the journal store that keeps
//! photos together with their notes, tags and locations.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Capture session state machine, controller and slideshow
//! - [`backends`]: Camera backend abstraction
//! - [`pipelines`]: Photo capture and compression pipeline
//! - [`journal`]: Entries, tags, SQLite store, import and export
//! - [`config`]: User configuration handling
//! - [`storage`]: Default locations and the ghost overlay source
//!
//! # Example
//!
//! ```no_run
//! use photo_journal::journal::{Library, NewEntry, TagFilter};
//!
//! let library = Library::open_in_memory()?;
//! library.add_tag("travel")?;
//! library.insert(NewEntry::new().note("Lisbon").tag("travel"))?;
//! let travel = library.entries(&TagFilter::from_name("travel"))?;
//! assert_eq!(travel.len(), 1);
//! # Ok::<(), photo_journal::errors::LibraryError>(())
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod journal;
pub mod pipelines;
pub mod storage;

// Re-export commonly used types
pub use app::{CaptureSession, SessionEvent, SessionState};
pub use config::Config;
pub use constants::PhotoTimerSetting;
pub use errors::{AppError, AppResult};
pub use journal::{JournalEntry, Library, NewEntry, TagFilter, TagSet};
pub use pipelines::photo::{CompressionParameters, PhotoPipeline};
