// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for captured and imported photos
//!
//! Heavy operations (decode, resize, encode) run in blocking background tasks
//! so the capture session and timers keep running.
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌──────────────┐
//! │ Camera Frame │ ──▶ │  Photo Pipeline   │ ──▶ │  JPEG bytes  │
//! │   (RGBA)     │     │  - RGBA→RGB       │     │  (journal)   │
//! │              │     │  - Resize + crop  │     │              │
//! │              │     │  - JPEG encoding  │     │              │
//! └──────────────┘     └───────────────────┘     └──────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Capture processing, compression and the ghost overlay

pub mod photo;
