// SPDX-License-Identifier: MPL-2.0

//! Export entry images to a timestamped folder
//!
//! Every export gets its own `Journal_Export_<date>_<time>` folder. Images are
//! written as `photo_<index>_<timestamp>.jpg` in listing order; entries without
//! an image are skipped.

use super::entry::JournalEntry;
use crate::errors::ExportError;
use crate::pipelines::photo::encoding;
use chrono::{DateTime, Local};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Result of an export run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub folder: PathBuf,
    pub files: Vec<PathBuf>,
    /// Entries that had no image
    pub skipped: usize,
}

/// Folder name for an export started at `now`
pub fn export_folder_name(now: DateTime<Local>) -> String {
    format!("Journal_Export_{}", now.format("%Y-%m-%d_%H-%M-%S"))
}

/// File name for the `index`-th exported image (1-based)
pub fn photo_file_name(index: usize, taken: DateTime<Local>) -> String {
    format!("photo_{:04}_{}.jpg", index, taken.format("%Y%m%d_%H%M%S"))
}

/// Create a fresh export folder under `base_dir`
///
/// A numeric suffix is added when an export from the same second exists.
fn create_export_folder(base_dir: &Path, now: DateTime<Local>) -> Result<PathBuf, ExportError> {
    std::fs::create_dir_all(base_dir).map_err(|source| ExportError::Io {
        path: base_dir.to_path_buf(),
        source,
    })?;

    let name = export_folder_name(now);
    let mut folder = base_dir.join(&name);
    let mut attempt = 1;
    loop {
        match std::fs::create_dir(&folder) {
            Ok(()) => return Ok(folder),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                attempt += 1;
                folder = base_dir.join(format!("{}_{}", name, attempt));
            }
            Err(source) => return Err(ExportError::Io { path: folder, source }),
        }
    }
}

/// Write every entry image into a new folder under `base_dir`
///
/// JPEG images are copied byte for byte; other formats are re-encoded at
/// `quality`.
pub fn export_entries(
    entries: &[JournalEntry],
    base_dir: &Path,
    now: DateTime<Local>,
    quality: f32,
) -> Result<ExportSummary, ExportError> {
    let folder = create_export_folder(base_dir, now)?;
    let mut files = Vec::new();
    let mut skipped = 0;

    for entry in entries {
        let Some(image) = entry.image.as_deref() else {
            skipped += 1;
            continue;
        };

        let path = folder.join(photo_file_name(files.len() + 1, entry.local_time()));
        let jpeg = encoding::ensure_jpeg(image, quality).map_err(|source| ExportError::Encode {
            path: path.clone(),
            source,
        })?;
        std::fs::write(&path, &jpeg).map_err(|source| ExportError::Io {
            path: path.clone(),
            source,
        })?;

        debug!(path = %path.display(), size = jpeg.len(), "Photo exported");
        files.push(path);
    }

    if skipped > 0 {
        warn!(skipped, "Entries without an image were not exported");
    }
    info!(folder = %folder.display(), count = files.len(), "Export complete");

    Ok(ExportSummary {
        folder,
        files,
        skipped,
    })
}

/// Run [`export_entries`] on a blocking task
pub async fn export_in_background(
    entries: Vec<JournalEntry>,
    base_dir: PathBuf,
    quality: f32,
) -> Result<ExportSummary, ExportError> {
    let now = Local::now();
    tokio::task::spawn_blocking(move || export_entries(&entries, &base_dir, now, quality))
        .await
        .map_err(|e| ExportError::TaskFailed(e.to_string()))?
}
