// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the journal store, tags, import and export

use chrono::{Local, TimeZone, Utc};
use image::{ImageFormat, Rgb, RgbImage};
use photo_journal::constants::IMPORT_PLACEHOLDER_NOTE;
use photo_journal::errors::{LibraryError, TagError};
use photo_journal::journal::{
    Library, NewEntry, TagFilter, TagSet, export_entries, export::photo_file_name, read_inbound,
};
use photo_journal::pipelines::photo::encoding;
use std::io::Cursor;

fn png(width: u32, height: u32) -> Vec<u8> {
    let mut bytes = Vec::new();
    RgbImage::from_pixel(width, height, Rgb([20, 120, 220]))
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    bytes
}

fn notes(library: &Library, filter: &TagFilter) -> Vec<String> {
    library
        .entries(filter)
        .unwrap()
        .into_iter()
        .filter_map(|e| e.note)
        .collect()
}

#[test]
fn test_library_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("journal.db");

    let id = {
        let library = Library::open(&path).unwrap();
        library.add_tag("travel").unwrap();
        library
            .insert(NewEntry::new().note("harbor").tag("travel"))
            .unwrap()
            .id
    };

    let library = Library::open(&path).unwrap();
    let entry = library.get(id).unwrap();
    assert_eq!(entry.note.as_deref(), Some("harbor"));
    assert_eq!(entry.tag.as_deref(), Some("travel"));
    assert_eq!(library.tags().unwrap().user_tags(), &["travel"]);
}

#[test]
fn test_filters_select_by_tag() {
    let library = Library::open_in_memory().unwrap();
    library.add_tag("food").unwrap();
    library.add_tag("work").unwrap();

    let day = |d| Utc.with_ymd_and_hms(2024, 6, d, 9, 0, 0).unwrap();
    library
        .insert(NewEntry::new().timestamp(day(1)).note("ramen").tag("food"))
        .unwrap();
    library
        .insert(NewEntry::new().timestamp(day(2)).note("standup").tag("work"))
        .unwrap();
    library
        .insert(NewEntry::new().timestamp(day(3)).note("sunset"))
        .unwrap();

    assert_eq!(
        notes(&library, &TagFilter::from_name("all")),
        vec!["sunset", "standup", "ramen"]
    );
    assert_eq!(notes(&library, &TagFilter::from_name("untagged")), vec!["sunset"]);
    assert_eq!(notes(&library, &TagFilter::from_name("food")), vec!["ramen"]);
}

#[test]
fn test_deleting_tag_untags_entries() {
    let library = Library::open_in_memory().unwrap();
    library.add_tag("food").unwrap();
    library.insert(NewEntry::new().note("ramen").tag("food")).unwrap();

    assert_eq!(library.delete_tag("food").unwrap(), Some(1));
    assert_eq!(notes(&library, &TagFilter::Untagged), vec!["ramen"]);
    assert!(notes(&library, &TagFilter::from_name("food")).is_empty());
}

#[test]
fn test_sentinel_tags_survive_delete() {
    let library = Library::open_in_memory().unwrap();
    assert_eq!(library.delete_tag("all").unwrap(), None);
    assert_eq!(library.delete_tag("untagged").unwrap(), None);
    assert_eq!(library.tags().unwrap().names(), &["all", "untagged"]);
}

#[test]
fn test_orphaned_tag_reads_as_untagged() {
    let library = Library::open_in_memory().unwrap();
    library.add_tag("food").unwrap();
    library.insert(NewEntry::new().note("ramen").tag("food")).unwrap();

    // Tag list replaced without clearing entries
    library.save_tags(&TagSet::new()).unwrap();

    assert_eq!(notes(&library, &TagFilter::Untagged), vec!["ramen"]);
    assert!(notes(&library, &TagFilter::from_name("food")).is_empty());
}

#[test]
fn test_tag_order_is_kept() {
    let library = Library::open_in_memory().unwrap();
    for tag in ["a", "b", "c"] {
        library.add_tag(tag).unwrap();
    }
    assert!(!library.add_tag("b").unwrap());
    assert!(matches!(
        library.add_tag("all"),
        Err(LibraryError::Tag(TagError::Reserved(_)))
    ));

    let tags = library.move_tag(2, 0).unwrap();
    assert_eq!(tags.names(), &["all", "untagged", "c", "a", "b"]);
    assert_eq!(library.tags().unwrap(), tags);
}

#[test]
fn test_ambiguous_prefix_is_reported() {
    let library = Library::open_in_memory().unwrap();
    // 17 ids over 16 leading hex digits: at least two share a first digit
    let ids: Vec<String> = (0..17)
        .map(|_| library.insert(NewEntry::new()).unwrap().id.to_string())
        .collect();

    let shared = ids
        .iter()
        .map(|id| &id[..1])
        .find(|first| ids.iter().filter(|id| id.starts_with(*first)).count() > 1)
        .unwrap();

    assert!(matches!(
        library.find(shared),
        Err(LibraryError::AmbiguousId { matches, .. }) if matches > 1
    ));
    assert_eq!(library.find(&ids[0]).unwrap().id.to_string(), ids[0]);
}

#[test]
fn test_edits_are_stored() {
    let library = Library::open_in_memory().unwrap();
    library.add_tag("work").unwrap();
    let entry = library.insert(NewEntry::new().note("draft")).unwrap();
    let new_time = Utc.with_ymd_and_hms(2023, 12, 24, 18, 30, 0).unwrap();

    library.set_note(entry.id, Some("final")).unwrap();
    library.set_tag(entry.id, Some("work")).unwrap();
    library.set_timestamp(entry.id, new_time).unwrap();
    library.replace_image(entry.id, vec![9, 9, 9]).unwrap();

    let stored = library.get(entry.id).unwrap();
    assert_eq!(stored.note.as_deref(), Some("final"));
    assert_eq!(stored.tag.as_deref(), Some("work"));
    assert_eq!(stored.timestamp, new_time);
    assert_eq!(stored.image, Some(vec![9, 9, 9]));

    library.set_tag(entry.id, Some("untagged")).unwrap();
    assert_eq!(library.get(entry.id).unwrap().tag, None);

    library.delete(entry.id).unwrap();
    assert!(matches!(
        library.get(entry.id),
        Err(LibraryError::NotFound(_))
    ));
}

#[test]
fn test_import_then_export_writes_jpegs() {
    let dir = tempfile::tempdir().unwrap();
    let inbound = dir.path().join("inbound.png");
    std::fs::write(&inbound, png(32, 24)).unwrap();

    let library = Library::open_in_memory().unwrap();
    let imported = library
        .insert(read_inbound(&format!("file://{}", inbound.display())).unwrap())
        .unwrap();
    assert_eq!(imported.note.as_deref(), Some(IMPORT_PLACEHOLDER_NOTE));
    library.insert(NewEntry::new().note("text only")).unwrap();

    let entries = library.entries(&TagFilter::All).unwrap();
    let now = Local.with_ymd_and_hms(2024, 2, 29, 23, 59, 58).unwrap();
    let summary = export_entries(&entries, &dir.path().join("exports"), now, 0.8).unwrap();

    assert!(
        summary
            .folder
            .ends_with("exports/Journal_Export_2024-02-29_23-59-58")
    );
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.files.len(), 1);

    let file = &summary.files[0];
    assert_eq!(
        file.file_name().unwrap().to_string_lossy(),
        photo_file_name(1, imported.local_time())
    );
    let written = std::fs::read(file).unwrap();
    assert!(encoding::is_jpeg(&written));
}

#[test]
fn test_jpeg_export_is_byte_identical() {
    let dir = tempfile::tempdir().unwrap();
    let jpeg = encoding::encode_jpeg(&RgbImage::new(16, 16), 0.5).unwrap();

    let library = Library::open_in_memory().unwrap();
    library.insert(NewEntry::new().image(jpeg.clone())).unwrap();

    let summary = export_entries(
        &library.entries(&TagFilter::All).unwrap(),
        dir.path(),
        Local::now(),
        0.8,
    )
    .unwrap();
    assert_eq!(std::fs::read(&summary.files[0]).unwrap(), jpeg);
}

#[test]
fn test_export_into_unwritable_location_fails() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"file").unwrap();

    let library = Library::open_in_memory().unwrap();
    library.insert(NewEntry::new().image(png(4, 4))).unwrap();
    let entries = library.entries(&TagFilter::All).unwrap();

    assert!(export_entries(&entries, &blocker, Local::now(), 0.8).is_err());
}
