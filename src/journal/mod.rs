// SPDX-License-Identifier: MPL-2.0

//! Journal entries and their storage
//!
//! - [`entry`]: entry records and the builder for new ones
//! - [`tags`]: the ordered tag list and listing filters
//! - [`library`]: SQLite persistence
//! - [`timeline`]: day grouping for listings
//! - [`import`] / [`export`]: moving images in and out

pub mod entry;
pub mod export;
pub mod import;
pub mod library;
pub mod tags;
pub mod timeline;

pub use entry::{GeoLocation, JournalEntry, NewEntry};
pub use export::{ExportSummary, export_entries, export_in_background};
pub use import::{read_inbound, resolve_location};
pub use library::{Library, LibraryResult, LibraryStats};
pub use tags::{TagFilter, TagSet};
pub use timeline::{TimelineDay, group_by_day};
