// SPDX-License-Identifier: MPL-2.0

//! Journal entry data structures

use super::tags::TagSet;
use chrono::{DateTime, Local, Utc};
use uuid::Uuid;

/// Where a photo was taken
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Compass heading in degrees, when known
    pub heading: Option<f64>,
}

impl std::fmt::Display for GeoLocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.5}, {:.5}", self.latitude, self.longitude)?;
        if let Some(heading) = self.heading {
            write!(f, " (heading {:.0}°)", heading)?;
        }
        Ok(())
    }
}

/// One journal record
#[derive(Debug, Clone, PartialEq)]
pub struct JournalEntry {
    pub id: Uuid,
    /// Creation time, or the time the user set
    pub timestamp: DateTime<Utc>,
    /// Encoded image bytes (JPEG for captures, as-imported otherwise)
    pub image: Option<Vec<u8>>,
    pub note: Option<String>,
    /// `None` means untagged
    pub tag: Option<String>,
    pub location: Option<GeoLocation>,
}

impl JournalEntry {
    /// First eight characters of the id, enough to address an entry from the CLI
    pub fn short_id(&self) -> String {
        self.id.simple().to_string()[..8].to_string()
    }

    pub fn local_time(&self) -> DateTime<Local> {
        self.timestamp.with_timezone(&Local)
    }

    pub fn image_size(&self) -> usize {
        self.image.as_ref().map_or(0, Vec::len)
    }

    /// Tag as seen through the current tag list
    ///
    /// A tag that no longer exists in `tags` reads as untagged.
    pub fn effective_tag<'a>(&'a self, tags: &TagSet) -> Option<&'a str> {
        self.tag
            .as_deref()
            .filter(|tag| tags.user_tags().iter().any(|t| t == tag))
    }
}

/// Fields for an entry that is not stored yet
#[derive(Debug, Clone, PartialEq)]
pub struct NewEntry {
    pub timestamp: DateTime<Utc>,
    pub image: Option<Vec<u8>>,
    pub note: Option<String>,
    pub tag: Option<String>,
    pub location: Option<GeoLocation>,
}

impl Default for NewEntry {
    fn default() -> Self {
        Self::new()
    }
}

impl NewEntry {
    /// Empty entry stamped with the current time
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now(),
            image: None,
            note: None,
            tag: None,
            location: None,
        }
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }

    pub fn image(mut self, bytes: Vec<u8>) -> Self {
        self.image = Some(bytes);
        self
    }

    pub fn note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn location(mut self, location: GeoLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Assign a fresh id
    pub fn into_entry(self) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4(),
            timestamp: self.timestamp,
            image: self.image,
            note: self.note,
            tag: self.tag,
            location: self.location,
        }
    }
}
