// SPDX-License-Identifier: MPL-2.0

//! SQLite journal store
//!
//! Entries and the tag list live in one database file. Images are stored
//! inline as BLOBs so an entry is never separated from its photo.

use super::entry::{GeoLocation, JournalEntry, NewEntry};
use super::tags::{TagFilter, TagSet};
use crate::constants::{TAG_ALL, TAG_UNTAGGED};
use crate::errors::{LibraryError, TagError};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

pub type LibraryResult<T> = Result<T, LibraryError>;

const ENTRY_COLUMNS: &str =
    "id, timestamp_ms, image, note, tag, latitude, longitude, heading";

/// Summary numbers for the `stats` view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LibraryStats {
    pub entries: u64,
    pub with_image: u64,
    pub image_bytes: u64,
    pub oldest: Option<DateTime<Utc>>,
    pub newest: Option<DateTime<Utc>>,
}

/// The journal database
pub struct Library {
    conn: Connection,
    db_path: Option<PathBuf>,
}

impl Library {
    /// Open or create the database at `path`
    pub fn open(path: impl AsRef<Path>) -> LibraryResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        info!(path = %path.display(), "Journal database opened");

        let library = Library {
            conn,
            db_path: Some(path.to_path_buf()),
        };
        library.init_schema()?;
        Ok(library)
    }

    /// Database that lives only as long as the value
    pub fn open_in_memory() -> LibraryResult<Self> {
        let library = Library {
            conn: Connection::open_in_memory()?,
            db_path: None,
        };
        library.init_schema()?;
        Ok(library)
    }

    fn init_schema(&self) -> LibraryResult<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS entries (
                id              TEXT PRIMARY KEY,
                timestamp_ms    INTEGER NOT NULL,
                image           BLOB,
                note            TEXT,
                tag             TEXT,
                latitude        REAL,
                longitude       REAL,
                heading         REAL
            );
            CREATE INDEX IF NOT EXISTS idx_entries_timestamp
                ON entries(timestamp_ms DESC);
            CREATE INDEX IF NOT EXISTS idx_entries_tag
                ON entries(tag);
            CREATE TABLE IF NOT EXISTS tags (
                name            TEXT PRIMARY KEY,
                position        INTEGER NOT NULL
            );",
        )?;

        let tag_rows: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tags", [], |row| row.get(0))?;
        if tag_rows == 0 {
            self.save_tags(&TagSet::new())?;
        }

        debug!("Journal schema initialized");
        Ok(())
    }

    /// Database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        self.db_path.as_deref()
    }

    // =========================================================================
    // Entries
    // =========================================================================

    /// Store a new entry
    ///
    /// A tag of `untagged` stores no tag; any other tag must exist.
    pub fn insert(&self, new: NewEntry) -> LibraryResult<JournalEntry> {
        let mut entry = new.into_entry();
        entry.tag = self.resolve_tag(entry.tag.as_deref())?;

        let location = entry.location;
        self.conn.execute(
            "INSERT INTO entries (id, timestamp_ms, image, note, tag, latitude, longitude, heading)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                entry.id.to_string(),
                entry.timestamp.timestamp_millis(),
                entry.image,
                entry.note,
                entry.tag,
                location.map(|l| l.latitude),
                location.map(|l| l.longitude),
                location.and_then(|l| l.heading),
            ],
        )?;

        info!(
            id = %entry.short_id(),
            image_bytes = entry.image_size(),
            tag = entry.tag.as_deref().unwrap_or(TAG_UNTAGGED),
            "Entry saved"
        );
        Ok(entry)
    }

    pub fn get(&self, id: Uuid) -> LibraryResult<JournalEntry> {
        let sql = format!("SELECT {} FROM entries WHERE id = ?1", ENTRY_COLUMNS);
        self.conn
            .query_row(&sql, [id.to_string()], row_to_entry)
            .optional()?
            .ok_or_else(|| LibraryError::NotFound(id.to_string()))
    }

    /// Look an entry up by full id or unique id prefix
    pub fn find(&self, id_or_prefix: &str) -> LibraryResult<JournalEntry> {
        let prefix = id_or_prefix.trim().to_lowercase();
        if prefix.is_empty() || !prefix.chars().all(|c| c.is_ascii_hexdigit() || c == '-') {
            return Err(LibraryError::NotFound(id_or_prefix.to_string()));
        }

        let pattern = format!("{}%", prefix);
        let matches: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM entries WHERE id LIKE ?1",
            [&pattern],
            |row| row.get(0),
        )?;

        match matches {
            0 => Err(LibraryError::NotFound(id_or_prefix.to_string())),
            1 => {
                let sql = format!("SELECT {} FROM entries WHERE id LIKE ?1", ENTRY_COLUMNS);
                Ok(self.conn.query_row(&sql, [&pattern], row_to_entry)?)
            }
            n => Err(LibraryError::AmbiguousId {
                prefix,
                matches: n as usize,
            }),
        }
    }

    /// Entries passing `filter`, newest first
    pub fn entries(&self, filter: &TagFilter) -> LibraryResult<Vec<JournalEntry>> {
        let tags = self.tags()?;
        let sql = format!(
            "SELECT {} FROM entries ORDER BY timestamp_ms DESC, id",
            ENTRY_COLUMNS
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map([], row_to_entry)?;

        let mut entries = Vec::new();
        for entry in rows {
            let entry = entry?;
            if filter.matches(&entry, &tags) {
                entries.push(entry);
            }
        }
        debug!(filter = %filter, count = entries.len(), "Entries loaded");
        Ok(entries)
    }

    pub fn set_note(&self, id: Uuid, note: Option<&str>) -> LibraryResult<()> {
        self.update(id, "UPDATE entries SET note = ?2 WHERE id = ?1", note)
    }

    /// Change an entry's tag; `None` or `untagged` clears it
    pub fn set_tag(&self, id: Uuid, tag: Option<&str>) -> LibraryResult<()> {
        let tag = self.resolve_tag(tag)?;
        self.update(id, "UPDATE entries SET tag = ?2 WHERE id = ?1", tag)
    }

    pub fn set_timestamp(&self, id: Uuid, timestamp: DateTime<Utc>) -> LibraryResult<()> {
        self.update(
            id,
            "UPDATE entries SET timestamp_ms = ?2 WHERE id = ?1",
            timestamp.timestamp_millis(),
        )
    }

    pub fn set_location(&self, id: Uuid, location: Option<GeoLocation>) -> LibraryResult<()> {
        let changed = self.conn.execute(
            "UPDATE entries SET latitude = ?2, longitude = ?3, heading = ?4 WHERE id = ?1",
            params![
                id.to_string(),
                location.map(|l| l.latitude),
                location.map(|l| l.longitude),
                location.and_then(|l| l.heading),
            ],
        )?;
        if changed == 0 {
            return Err(LibraryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn replace_image(&self, id: Uuid, image: Vec<u8>) -> LibraryResult<()> {
        self.update(id, "UPDATE entries SET image = ?2 WHERE id = ?1", image)
    }

    fn update<T: rusqlite::ToSql>(&self, id: Uuid, sql: &str, value: T) -> LibraryResult<()> {
        let changed = self.conn.execute(sql, params![id.to_string(), value])?;
        if changed == 0 {
            return Err(LibraryError::NotFound(id.to_string()));
        }
        Ok(())
    }

    pub fn delete(&self, id: Uuid) -> LibraryResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM entries WHERE id = ?1", [id.to_string()])?;
        if changed == 0 {
            return Err(LibraryError::NotFound(id.to_string()));
        }
        info!(id = %id, "Entry deleted");
        Ok(())
    }

    /// Delete every entry older than `cutoff`; returns how many went
    pub fn delete_before(&self, cutoff: DateTime<Utc>) -> LibraryResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM entries WHERE timestamp_ms < ?1",
            [cutoff.timestamp_millis()],
        )?;
        info!(removed, cutoff = %cutoff, "Old entries pruned");
        Ok(removed)
    }

    pub fn count(&self) -> LibraryResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM entries", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    pub fn stats(&self) -> LibraryResult<LibraryStats> {
        let (entries, with_image, image_bytes, oldest, newest): (
            i64,
            i64,
            i64,
            Option<i64>,
            Option<i64>,
        ) = self.conn.query_row(
            "SELECT COUNT(*), COUNT(image), COALESCE(SUM(LENGTH(image)), 0),
                    MIN(timestamp_ms), MAX(timestamp_ms)
             FROM entries",
            [],
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?)),
        )?;

        Ok(LibraryStats {
            entries: entries as u64,
            with_image: with_image as u64,
            image_bytes: image_bytes as u64,
            oldest: oldest.and_then(DateTime::from_timestamp_millis),
            newest: newest.and_then(DateTime::from_timestamp_millis),
        })
    }

    /// Image of the most recent entry that has one (ghost overlay source)
    pub fn latest_image(&self) -> LibraryResult<Option<Vec<u8>>> {
        Ok(self
            .conn
            .query_row(
                "SELECT image FROM entries WHERE image IS NOT NULL
                 ORDER BY timestamp_ms DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    pub fn tags(&self) -> LibraryResult<TagSet> {
        let mut stmt = self
            .conn
            .prepare("SELECT name FROM tags ORDER BY position")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(TagSet::from_names(names))
    }

    /// Replace the stored tag list
    pub fn save_tags(&self, tags: &TagSet) -> LibraryResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        write_tags(&tx, tags)?;
        tx.commit()?;
        debug!(count = tags.len(), "Tag list saved");
        Ok(())
    }

    /// Append a tag; `Ok(false)` if it already exists
    pub fn add_tag(&self, name: &str) -> LibraryResult<bool> {
        let mut tags = self.tags()?;
        let added = tags.add(name).map_err(tag_error)?;
        if added {
            self.save_tags(&tags)?;
        }
        Ok(added)
    }

    /// Delete a tag and clear it from every entry
    ///
    /// Returns the number of entries that lost the tag, or `None` when
    /// nothing was deleted (sentinel or unknown tag).
    pub fn delete_tag(&self, name: &str) -> LibraryResult<Option<usize>> {
        let mut tags = self.tags()?;
        if !tags.delete(name) {
            return Ok(None);
        }

        let tx = self.conn.unchecked_transaction()?;
        let cleared = tx.execute("UPDATE entries SET tag = NULL WHERE tag = ?1", [name])?;
        write_tags(&tx, &tags)?;
        tx.commit()?;

        info!(tag = name, cleared, "Tag deleted");
        Ok(Some(cleared))
    }

    /// Move a user tag between positions in the user tag order
    pub fn move_tag(&self, from: usize, to: usize) -> LibraryResult<TagSet> {
        let mut tags = self.tags()?;
        tags.move_tag(from, to).map_err(tag_error)?;
        self.save_tags(&tags)?;
        Ok(tags)
    }

    fn resolve_tag(&self, tag: Option<&str>) -> LibraryResult<Option<String>> {
        let Some(tag) = tag.map(str::trim) else {
            return Ok(None);
        };
        match tag {
            TAG_UNTAGGED => Ok(None),
            TAG_ALL => Err(tag_error(TagError::Reserved(tag.to_string()))),
            "" => Err(tag_error(TagError::Empty)),
            tag if self.tags()?.contains(tag) => Ok(Some(tag.to_string())),
            tag => Err(tag_error(TagError::NotFound(tag.to_string()))),
        }
    }
}

impl std::fmt::Debug for Library {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Library")
            .field("db_path", &self.db_path)
            .finish()
    }
}

fn write_tags(conn: &Connection, tags: &TagSet) -> rusqlite::Result<()> {
    conn.execute("DELETE FROM tags", [])?;
    let mut stmt = conn.prepare("INSERT INTO tags (name, position) VALUES (?1, ?2)")?;
    for (position, name) in tags.names().iter().enumerate() {
        stmt.execute(params![name, position as i64])?;
    }
    Ok(())
}

fn tag_error(err: TagError) -> LibraryError {
    LibraryError::Tag(err)
}

fn row_to_entry(row: &Row<'_>) -> rusqlite::Result<JournalEntry> {
    let id: String = row.get(0)?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(0, Type::Text, Box::new(e)))?;

    let millis: i64 = row.get(1)?;
    let timestamp = DateTime::from_timestamp_millis(millis)
        .ok_or(rusqlite::Error::IntegralValueOutOfRange(1, millis))?;

    let latitude: Option<f64> = row.get(5)?;
    let longitude: Option<f64> = row.get(6)?;
    let heading: Option<f64> = row.get(7)?;
    let location = match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Some(GeoLocation {
            latitude,
            longitude,
            heading,
        }),
        _ => None,
    };

    Ok(JournalEntry {
        id,
        timestamp,
        image: row.get(2)?,
        note: row.get(3)?,
        tag: row.get(4)?,
        location,
    })
}
