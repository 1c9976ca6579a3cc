// SPDX-License-Identifier: MPL-2.0

//! Storage locations and the ghost overlay source

use crate::constants::{APP_DIR_NAME, DEFAULT_EXPORT_FOLDER};
use crate::journal::Library;
use crate::pipelines::photo::GhostOverlay;
use std::path::PathBuf;
use tracing::{debug, warn};

const DATABASE_FILE: &str = "journal.db";
const CONFIG_FILE: &str = "config.json";

fn home_or_current() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Application data directory (holds the journal database)
pub fn data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(home_or_current)
        .join(APP_DIR_NAME)
}

/// Default journal database path
pub fn default_library_path() -> PathBuf {
    data_dir().join(DATABASE_FILE)
}

/// Default parent folder for exports
pub fn default_export_dir() -> PathBuf {
    dirs::document_dir()
        .unwrap_or_else(home_or_current)
        .join(DEFAULT_EXPORT_FOLDER)
}

/// Default folder the file-backed camera reads from
pub fn default_camera_source() -> PathBuf {
    dirs::picture_dir().unwrap_or_else(home_or_current)
}

/// Default config file path, if the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR_NAME).join(CONFIG_FILE))
}

/// Build the ghost overlay from the most recent journal image
///
/// Returns `None` when the journal has no image or the latest one can't be
/// decoded; the session then runs without an overlay.
pub async fn load_ghost_overlay(library: &Library, opacity: f32) -> Option<GhostOverlay> {
    let bytes = match library.latest_image() {
        Ok(Some(bytes)) => bytes,
        Ok(None) => {
            debug!("No journal image for the ghost overlay");
            return None;
        }
        Err(e) => {
            warn!(error = %e, "Failed to read latest journal image");
            return None;
        }
    };

    debug!(size = bytes.len(), "Loading ghost overlay");
    let decoded = tokio::task::spawn_blocking(move || GhostOverlay::from_bytes(&bytes, opacity))
        .await
        .ok()?;

    match decoded {
        Ok(overlay) => Some(overlay),
        Err(e) => {
            warn!(error = %e, "Latest journal image is not decodable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::journal::NewEntry;
    use std::io::Cursor;

    fn png_bytes() -> Vec<u8> {
        let mut bytes = Vec::new();
        image::RgbImage::from_pixel(4, 4, image::Rgb([200, 10, 10]))
            .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn default_paths_end_in_app_folders() {
        assert!(default_library_path().ends_with("photo-journal/journal.db"));
        assert!(default_export_dir().ends_with(DEFAULT_EXPORT_FOLDER));
    }

    #[tokio::test]
    async fn ghost_overlay_uses_latest_image() {
        let library = Library::open_in_memory().unwrap();
        assert!(load_ghost_overlay(&library, 0.35).await.is_none());

        library.insert(NewEntry::new().image(png_bytes())).unwrap();
        let overlay = load_ghost_overlay(&library, 0.35).await.unwrap();
        assert!((overlay.opacity() - 0.35).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn undecodable_latest_image_gives_no_overlay() {
        let library = Library::open_in_memory().unwrap();
        library.insert(NewEntry::new().image(vec![1, 2, 3])).unwrap();
        assert!(load_ghost_overlay(&library, 0.35).await.is_none());
    }
}
