// SPDX-License-Identifier: MPL-2.0

//! Inbound image files
//!
//! Files arrive as a plain path or a `file://` URL (what file managers put on
//! the command line). Each one becomes an entry with the placeholder note.

use super::entry::NewEntry;
use crate::constants::IMPORT_PLACEHOLDER_NOTE;
use crate::errors::ImportError;
use std::path::PathBuf;
use tracing::{debug, info};

/// Turn a path or `file://` URL into a filesystem path
pub fn resolve_location(location: &str) -> Result<PathBuf, ImportError> {
    let location = location.trim();
    if location.is_empty() {
        return Err(ImportError::InvalidLocation(location.to_string()));
    }

    let Some(rest) = location.strip_prefix("file://") else {
        if location.contains("://") {
            return Err(ImportError::InvalidLocation(location.to_string()));
        }
        return Ok(PathBuf::from(location));
    };

    // file:///path or file://localhost/path
    let path = rest.strip_prefix("localhost").unwrap_or(rest);
    if !path.starts_with('/') {
        return Err(ImportError::InvalidLocation(location.to_string()));
    }
    percent_decode(path)
        .map(PathBuf::from)
        .ok_or_else(|| ImportError::InvalidLocation(location.to_string()))
}

fn percent_decode(input: &str) -> Option<String> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3)?;
            if !hex.iter().all(u8::is_ascii_hexdigit) {
                return None;
            }
            let hex = std::str::from_utf8(hex).ok()?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}

/// Read an inbound file into an unsaved entry
///
/// The bytes are kept as they are; the caller decides whether to compress.
pub fn read_inbound(location: &str) -> Result<NewEntry, ImportError> {
    let path = resolve_location(location)?;
    let bytes = std::fs::read(&path).map_err(|source| ImportError::Io {
        path: path.clone(),
        source,
    })?;

    let format = image::guess_format(&bytes).map_err(|_| ImportError::NotAnImage(path.clone()))?;
    debug!(path = %path.display(), ?format, size = bytes.len(), "Inbound image read");

    info!(path = %path.display(), "Importing photo");
    Ok(NewEntry::new().image(bytes).note(IMPORT_PLACEHOLDER_NOTE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_plain_paths_and_file_urls() {
        assert_eq!(
            resolve_location("/tmp/a.jpg").unwrap(),
            PathBuf::from("/tmp/a.jpg")
        );
        assert_eq!(
            resolve_location("file:///home/me/My%20Photos/b.png").unwrap(),
            PathBuf::from("/home/me/My Photos/b.png")
        );
        assert_eq!(
            resolve_location("file://localhost/srv/c.jpg").unwrap(),
            PathBuf::from("/srv/c.jpg")
        );
    }

    #[test]
    fn rejects_other_schemes_and_bad_escapes() {
        assert!(resolve_location("https://example.com/a.jpg").is_err());
        assert!(resolve_location("file://host/share/a.jpg").is_err());
        assert!(resolve_location("file:///bad%zzescape").is_err());
        assert!(resolve_location("file:///a%+fb").is_err());
        assert!(resolve_location("file:///trailing%2").is_err());
        assert!(resolve_location("  ").is_err());
    }

    #[test]
    fn text_file_is_not_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.jpg");
        std::fs::write(&path, b"just some words").unwrap();

        let err = read_inbound(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, ImportError::NotAnImage(_)));
    }

    #[test]
    fn imported_entry_carries_placeholder_note() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pixel.png");
        image::RgbImage::new(2, 2).save(&path).unwrap();

        let entry = read_inbound(&format!("file://{}", path.display())).unwrap();
        assert_eq!(entry.note.as_deref(), Some(IMPORT_PLACEHOLDER_NOTE));
        assert!(entry.image.is_some());
        assert!(entry.tag.is_none());
    }
}
