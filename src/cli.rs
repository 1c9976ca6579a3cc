// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for the photo journal
//!
//! This module provides command-line functionality for:
//! - Capturing photos through the capture session
//! - Importing, listing, editing and deleting entries
//! - Tag management, settings, export, slideshow and statistics

use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use clap::{Args, Subcommand};
use photo_journal::app::{CaptureSession, SessionState, Slideshow, SlideshowOptions};
use photo_journal::backends::camera::{CameraBackendManager, CameraFacing, FileCamera};
use photo_journal::config::Config;
use photo_journal::constants::{PhotoTimerSetting, TAG_UNTAGGED};
use photo_journal::errors::{AppError, AppResult, SessionError, TagError};
use photo_journal::journal::{
    self, GeoLocation, JournalEntry, Library, NewEntry, TagFilter, group_by_day,
};
use photo_journal::pipelines::photo::compression::compress_in_background;
use photo_journal::pipelines::photo::{CompressionOutcome, PhotoPipeline};
use photo_journal::storage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

type CliResult = AppResult<()>;

/// Settings and locations shared by every command
pub struct Context {
    pub config: Config,
    pub config_path: Option<PathBuf>,
    library_override: Option<PathBuf>,
}

impl Context {
    pub fn load(
        config_path: Option<PathBuf>,
        library_override: Option<PathBuf>,
    ) -> AppResult<Self> {
        let config_path = config_path.or_else(storage::default_config_path);
        let config = match &config_path {
            Some(path) => Config::load_from(path)?,
            None => Config::default(),
        };
        Ok(Self {
            config,
            config_path,
            library_override,
        })
    }

    fn library_path(&self) -> PathBuf {
        self.library_override
            .clone()
            .unwrap_or_else(|| self.config.library_path())
    }

    fn open_library(&self) -> AppResult<Library> {
        Ok(Library::open(self.library_path())?)
    }
}

/// Resolve Ctrl+C into a notification
///
/// The handler can only be installed once per process, which is all any
/// single command needs.
fn ctrl_c_notify() -> AppResult<Arc<Notify>> {
    let notify = Arc::new(Notify::new());
    let handler_notify = notify.clone();
    ctrlc::set_handler(move || {
        handler_notify.notify_one();
    })
    .map_err(|e| AppError::Other(format!("Could not install Ctrl+C handler: {}", e)))?;
    Ok(notify)
}

fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

fn entry_line(entry: &JournalEntry, tags: &journal::TagSet) -> String {
    format!(
        "{}  {}  {:<12}  {:>9}  {}",
        entry.short_id(),
        entry.local_time().format("%Y-%m-%d %H:%M"),
        entry.effective_tag(tags).unwrap_or("-"),
        if entry.image.is_some() {
            format_size(entry.image_size() as u64)
        } else {
            "no image".to_string()
        },
        entry.note.as_deref().unwrap_or("")
    )
}

/// Parse `YYYY-MM-DD HH:MM[:SS]` or `YYYY-MM-DD` as local time, or RFC 3339
fn parse_timestamp(input: &str) -> Result<DateTime<Utc>, String> {
    let input = input.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(input) {
        return Ok(at.with_timezone(&Utc));
    }

    let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .map(|date| date.and_time(NaiveTime::MIN))
        })
        .ok_or_else(|| format!("Unrecognized date '{}' (expected YYYY-MM-DD [HH:MM])", input))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|at| at.with_timezone(&Utc))
        .ok_or_else(|| format!("'{}' does not exist in the local time zone", input))
}

// =============================================================================
// Capture
// =============================================================================

#[derive(Args)]
pub struct CaptureArgs {
    /// Countdown in seconds before the shot (default from settings)
    #[arg(short, long)]
    delay: Option<u32>,

    /// Camera to use: back or front
    #[arg(short, long)]
    facing: Option<CameraFacing>,

    /// Fire the flash
    #[arg(long)]
    flash: bool,

    /// Image file or folder the camera reads from (default from settings)
    #[arg(short, long)]
    source: Option<PathBuf>,

    /// Overlay the latest journal photo on the preview
    #[arg(long)]
    ghost: bool,

    /// Write the preview (with ghost overlay) to this file before capturing
    #[arg(long)]
    preview: Option<PathBuf>,

    /// Note for the new entry
    #[arg(short, long)]
    note: Option<String>,

    /// Tag for the new entry
    #[arg(short, long)]
    tag: Option<String>,

    /// Latitude where the photo was taken
    #[arg(long, requires = "lon", allow_negative_numbers = true)]
    lat: Option<f64>,

    /// Longitude where the photo was taken
    #[arg(long, requires = "lat", allow_negative_numbers = true)]
    lon: Option<f64>,

    /// Compass heading in degrees
    #[arg(long, requires = "lat")]
    heading: Option<f64>,
}

/// Take a photo through the capture session and store it
pub fn capture(ctx: &Context, args: CaptureArgs) -> CliResult {
    let library = ctx.open_library()?;
    let camera = &ctx.config.camera;

    // Validate the tag before the countdown, not after the shot
    if let Some(tag) = args.tag.as_deref().map(str::trim)
        && tag != TAG_UNTAGGED
        && library.tags()?.position(tag).is_none()
    {
        return Err(TagError::NotFound(tag.to_string()).into());
    }

    let source = args.source.clone().unwrap_or_else(|| ctx.config.camera_source());
    let manager = CameraBackendManager::new(Box::new(FileCamera::new(source)));
    let mut session = CaptureSession::new(manager, PhotoPipeline::new(ctx.config.compression))
        .with_facing(args.facing.unwrap_or(camera.facing))
        .with_flash(args.flash || camera.flash_enabled);
    let delay = args.delay.unwrap_or_else(|| camera.timer.seconds());
    let ghost = args.ghost || camera.ghost_overlay;

    let abort = ctrl_c_notify()?;
    let rt = tokio::runtime::Runtime::new()?;
    let photo = rt.block_on(async {
        if let Err(e) = session.open().await {
            if matches!(e, SessionError::PermissionDenied) {
                eprintln!("Camera access was denied.");
            }
            return Err(e);
        }
        if let Some(device) = session.device() {
            println!("Camera: {}", device.name);
        }

        if ghost {
            let overlay = storage::load_ghost_overlay(&library, camera.ghost_opacity).await;
            if overlay.is_none() {
                println!("No journal photo to use as a ghost overlay.");
            }
            session.set_ghost_overlay(overlay);
        }

        if let Some(path) = &args.preview {
            let preview = session.preview()?;
            match preview.save(path) {
                Ok(()) => println!("Preview saved: {}", path.display()),
                Err(e) => eprintln!("Could not save preview: {}", e),
            }
        }

        if delay > 0 {
            println!("Timer: {}s (press Ctrl+C to cancel)", delay);
        }

        let mut states = session.subscribe();
        let capture = session.capture_until(delay, async move { abort.notified().await });
        tokio::pin!(capture);
        loop {
            tokio::select! {
                biased;
                Ok(state) = states.recv() => match state {
                    SessionState::CountingDown(n) if n > 0 => println!("{}...", n),
                    SessionState::Capturing => println!("Capturing..."),
                    _ => {}
                },
                result = &mut capture => break result,
            }
        }
    });

    let photo = match photo {
        Ok(photo) => photo,
        Err(SessionError::Aborted) => {
            println!("Capture cancelled.");
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    let mut entry = NewEntry::new()
        .timestamp(photo.captured_at.with_timezone(&Utc))
        .image(photo.data);
    if let Some(note) = args.note {
        entry = entry.note(note);
    }
    if let Some(tag) = args.tag {
        entry = entry.tag(tag);
    }
    if let (Some(latitude), Some(longitude)) = (args.lat, args.lon) {
        entry = entry.location(GeoLocation {
            latitude,
            longitude,
            heading: args.heading,
        });
    }

    let saved = library.insert(entry)?;
    println!(
        "Photo saved: {} ({}x{}, {})",
        saved.short_id(),
        photo.width,
        photo.height,
        format_size(saved.image_size() as u64)
    );
    Ok(())
}

// =============================================================================
// Entries
// =============================================================================

/// Import image files as new entries
pub fn import(ctx: &Context, locations: &[String], tag: Option<&str>, allow_compress: bool) -> CliResult {
    let library = ctx.open_library()?;
    let compress = allow_compress && ctx.config.compress_imports;
    let rt = tokio::runtime::Runtime::new()?;

    for location in locations {
        let mut entry = journal::read_inbound(location)?;
        if let Some(tag) = tag {
            entry = entry.tag(tag);
        }

        if compress && let Some(original) = entry.image.take() {
            entry.image = Some(
                match rt.block_on(compress_in_background(original.clone(), ctx.config.compression)) {
                    CompressionOutcome::Replaced { image, .. } => image.data,
                    CompressionOutcome::Kept(_) => original,
                },
            );
        }

        let saved = library.insert(entry)?;
        println!(
            "Imported {} as {} ({})",
            location,
            saved.short_id(),
            format_size(saved.image_size() as u64)
        );
    }
    Ok(())
}

/// List entries matching a tag filter
pub fn list(ctx: &Context, tag: &str, by_day: bool) -> CliResult {
    let library = ctx.open_library()?;
    let tags = library.tags()?;
    let filter = TagFilter::from_name(tag);
    let entries = library.entries(&filter)?;

    if entries.is_empty() {
        println!("No entries.");
        return Ok(());
    }

    if by_day {
        for day in group_by_day(entries) {
            println!("{}", day.date.format("%A, %B %-d %Y"));
            for entry in &day.entries {
                println!("  {}", entry_line(entry, &tags));
            }
            println!();
        }
    } else {
        for entry in &entries {
            println!("{}", entry_line(entry, &tags));
        }
    }
    Ok(())
}

/// Print one entry, optionally writing its image out
pub fn show(ctx: &Context, id: &str, output: Option<PathBuf>) -> CliResult {
    let library = ctx.open_library()?;
    let tags = library.tags()?;
    let entry = library.find(id)?;

    println!("Id:       {}", entry.id);
    println!("Date:     {}", entry.local_time().format("%Y-%m-%d %H:%M:%S"));
    println!(
        "Tag:      {}",
        entry.effective_tag(&tags).unwrap_or("untagged")
    );
    if let Some(note) = &entry.note {
        println!("Note:     {}", note);
    }
    if let Some(location) = &entry.location {
        println!("Location: {}", location);
    }
    match &entry.image {
        Some(image) => {
            println!("Image:    {}", format_size(image.len() as u64));
            if let Some(path) = output {
                std::fs::write(&path, image)?;
                println!("Image written to {}", path.display());
            }
        }
        None => println!("Image:    none"),
    }
    Ok(())
}

#[derive(Args)]
pub struct EditArgs {
    /// Entry id or unique id prefix
    id: String,

    /// New note
    #[arg(short, long, conflicts_with = "clear_note")]
    note: Option<String>,

    /// Remove the note
    #[arg(long)]
    clear_note: bool,

    /// New tag ("untagged" clears it)
    #[arg(short, long)]
    tag: Option<String>,

    /// New date (YYYY-MM-DD [HH:MM], local time, or RFC 3339)
    #[arg(short, long)]
    date: Option<String>,
}

/// Change fields of an entry
pub fn edit(ctx: &Context, args: EditArgs) -> CliResult {
    let library = ctx.open_library()?;
    let entry = library.find(&args.id)?;
    let mut changed = false;

    if args.clear_note {
        library.set_note(entry.id, None)?;
        changed = true;
    } else if let Some(note) = args.note.as_deref() {
        library.set_note(entry.id, Some(note))?;
        changed = true;
    }

    if let Some(tag) = args.tag.as_deref() {
        library.set_tag(entry.id, Some(tag))?;
        changed = true;
    }

    if let Some(date) = args.date.as_deref() {
        library.set_timestamp(entry.id, parse_timestamp(date)?)?;
        changed = true;
    }

    if changed {
        println!("Updated {}", entry.short_id());
    } else {
        println!("Nothing to change.");
    }
    Ok(())
}

/// Delete one entry
pub fn delete(ctx: &Context, id: &str) -> CliResult {
    let library = ctx.open_library()?;
    let entry = library.find(id)?;
    library.delete(entry.id)?;
    println!("Deleted {}", entry.short_id());
    Ok(())
}

/// Delete entries older than a date
pub fn prune(ctx: &Context, before: &str, dry_run: bool) -> CliResult {
    let library = ctx.open_library()?;
    let cutoff = parse_timestamp(before)?;

    if dry_run {
        let count = library
            .entries(&TagFilter::All)?
            .iter()
            .filter(|entry| entry.timestamp < cutoff)
            .count();
        println!("{} entries would be deleted.", count);
        return Ok(());
    }

    let removed = library.delete_before(cutoff)?;
    println!("Deleted {} entries.", removed);
    Ok(())
}

/// Recompress stored images, keeping whichever version is smaller
pub fn compress(ctx: &Context, id: Option<&str>) -> CliResult {
    let library = ctx.open_library()?;
    let entries = match id {
        Some(id) => vec![library.find(id)?],
        None => library.entries(&TagFilter::All)?,
    };

    let params = ctx.config.compression;
    let rt = tokio::runtime::Runtime::new()?;
    let mut replaced = 0;
    let mut saved = 0;

    for entry in entries {
        let Some(image) = entry.image else {
            continue;
        };
        let outcome = rt.block_on(compress_in_background(image, params));
        saved += outcome.saved_bytes();
        if let CompressionOutcome::Replaced { image, .. } = outcome {
            library.replace_image(entry.id, image.data)?;
            replaced += 1;
        }
    }

    println!(
        "Recompressed {} images, saved {}.",
        replaced,
        format_size(saved as u64)
    );
    Ok(())
}

/// Export entry images to a new folder
pub fn export(ctx: &Context, tag: &str, dir: Option<PathBuf>, reveal: bool) -> CliResult {
    let library = ctx.open_library()?;
    let entries = library.entries(&TagFilter::from_name(tag))?;
    let base_dir = dir.unwrap_or_else(|| ctx.config.export_dir());

    let rt = tokio::runtime::Runtime::new()?;
    let summary = rt.block_on(journal::export_in_background(
        entries,
        base_dir,
        ctx.config.compression.quality,
    ))?;

    println!(
        "Exported {} photos to {}",
        summary.files.len(),
        summary.folder.display()
    );
    if summary.skipped > 0 {
        println!("{} entries had no image.", summary.skipped);
    }

    if reveal && let Err(e) = open::that(&summary.folder) {
        eprintln!("Could not open {}: {}", summary.folder.display(), e);
    }
    Ok(())
}

// =============================================================================
// Tags
// =============================================================================

#[derive(Subcommand)]
pub enum TagsCommand {
    /// List tags in order
    List,
    /// Add a tag at the end of the list
    Add { name: String },
    /// Delete a tag and clear it from every entry
    Delete { name: String },
    /// Move a tag to a new position (1 = first user tag)
    Move { name: String, position: usize },
}

pub fn tags(ctx: &Context, action: TagsCommand) -> CliResult {
    let library = ctx.open_library()?;

    match action {
        TagsCommand::List => {
            let tags = library.tags()?;
            for name in tags.names().iter().take(tags.len() - tags.user_tags().len()) {
                println!("   {}", name);
            }
            for (index, name) in tags.user_tags().iter().enumerate() {
                println!("{:>2} {}", index + 1, name);
            }
        }
        TagsCommand::Add { name } => {
            if library.add_tag(&name)? {
                println!("Added tag '{}'", name.trim());
            } else {
                println!("Tag '{}' already exists", name.trim());
            }
        }
        TagsCommand::Delete { name } => match library.delete_tag(&name)? {
            Some(cleared) => println!("Deleted tag '{}' ({} entries untagged)", name, cleared),
            None => println!("Tag '{}' can't be deleted", name),
        },
        TagsCommand::Move { name, position } => {
            let tags = library.tags()?;
            let from = tags
                .position(&name)
                .ok_or_else(|| TagError::NotFound(name.clone()))?;
            let max = tags.user_tags().len();
            let to = position
                .checked_sub(1)
                .filter(|to| *to < max)
                .ok_or(TagError::OutOfRange {
                    index: position,
                    max,
                })?;
            library.move_tag(from, to)?;
            println!("Moved '{}' to position {}", name, position);
        }
    }
    Ok(())
}

// =============================================================================
// Settings
// =============================================================================

#[derive(Subcommand)]
pub enum SettingsCommand {
    /// Print the current settings
    Show,
    /// Change settings and save them
    Set(SettingsArgs),
}

#[derive(Args)]
pub struct SettingsArgs {
    /// Target width as a multiple of the reference width (0.25-3.0)
    #[arg(long)]
    width_multiplier: Option<f32>,

    /// JPEG quality factor (0.1-1.0)
    #[arg(long)]
    quality: Option<f32>,

    /// Reference display width in pixels
    #[arg(long)]
    reference_width: Option<u32>,

    /// Photo timer: off, 3, 5 or 10
    #[arg(long)]
    timer: Option<PhotoTimerSetting>,

    /// Default camera: back or front
    #[arg(long)]
    facing: Option<CameraFacing>,

    /// Flash on by default
    #[arg(long)]
    flash: Option<bool>,

    /// Show the ghost overlay by default
    #[arg(long)]
    ghost: Option<bool>,

    /// Ghost overlay opacity (0-1)
    #[arg(long)]
    ghost_opacity: Option<f32>,

    /// Image file or folder the camera reads from
    #[arg(long)]
    source: Option<PathBuf>,

    /// Journal database file
    #[arg(long)]
    library_path: Option<PathBuf>,

    /// Parent folder for exports
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Compress imported images
    #[arg(long)]
    compress_imports: Option<bool>,

    /// Seconds per slideshow slide
    #[arg(long)]
    slideshow_interval: Option<u64>,
}

pub fn settings(ctx: Context, action: SettingsCommand) -> CliResult {
    match action {
        SettingsCommand::Show => {
            let json = serde_json::to_string_pretty(&ctx.config)
                .map_err(|e| AppError::Other(e.to_string()))?;
            println!("{}", json);
            println!();
            println!(
                "Target width: {} px",
                ctx.config.compression.target_width()
            );
            if let Some(path) = &ctx.config_path {
                println!("Config file:  {}", path.display());
            }
            println!("Library:      {}", ctx.library_path().display());
        }
        SettingsCommand::Set(args) => {
            let path = ctx
                .config_path
                .clone()
                .ok_or("No config file location; pass --config")?;
            let mut config = ctx.config;

            if let Some(v) = args.width_multiplier {
                config.compression.width_multiplier = v;
            }
            if let Some(v) = args.quality {
                config.compression.quality = v;
            }
            if let Some(v) = args.reference_width {
                config.compression.reference_width = v;
            }
            if let Some(v) = args.timer {
                config.camera.timer = v;
            }
            if let Some(v) = args.facing {
                config.camera.facing = v;
            }
            if let Some(v) = args.flash {
                config.camera.flash_enabled = v;
            }
            if let Some(v) = args.ghost {
                config.camera.ghost_overlay = v;
            }
            if let Some(v) = args.ghost_opacity {
                config.camera.ghost_opacity = v;
            }
            if let Some(v) = args.source {
                config.camera.source = Some(v);
            }
            if let Some(v) = args.library_path {
                config.library_path = Some(v);
            }
            if let Some(v) = args.export_dir {
                config.export_dir = Some(v);
            }
            if let Some(v) = args.compress_imports {
                config.compress_imports = v;
            }
            if let Some(v) = args.slideshow_interval {
                config.slideshow_interval_secs = v;
            }

            let config = config.clamped();
            config.save_to(&path)?;
            println!("Settings saved to {}", path.display());
        }
    }
    Ok(())
}

// =============================================================================
// Playback and statistics
// =============================================================================

/// Print entries one at a time until the end or Ctrl+C
pub fn slideshow(ctx: &Context, tag: &str, interval: Option<u64>, looping: bool) -> CliResult {
    let library = ctx.open_library()?;
    let entries: Vec<JournalEntry> = library
        .entries(&TagFilter::from_name(tag))?
        .into_iter()
        .filter(|entry| entry.image.is_some())
        .collect();

    if entries.is_empty() {
        println!("No photos to show.");
        return Ok(());
    }

    let options = SlideshowOptions {
        interval: interval
            .map(|secs| Duration::from_secs(secs.max(1)))
            .unwrap_or_else(|| ctx.config.slideshow_interval()),
        looping,
    };
    let total = entries.len();
    let stop = ctrl_c_notify()?;

    let rt = tokio::runtime::Runtime::new()?;
    let shown = rt.block_on(async {
        Slideshow::new(&entries)
            .play(options, async move { stop.notified().await }, |position, entry| {
                println!(
                    "[{}/{}] {}  {}",
                    position + 1,
                    total,
                    entry.local_time().format("%Y-%m-%d %H:%M"),
                    entry.note.as_deref().unwrap_or("")
                );
            })
            .await
    });

    println!("Showed {} slides.", shown);
    Ok(())
}

/// Print journal statistics
pub fn stats(ctx: &Context) -> CliResult {
    let library = ctx.open_library()?;
    let stats = library.stats()?;
    let tags = library.tags()?;

    println!("Entries:      {}", stats.entries);
    println!("With photos:  {}", stats.with_image);
    println!("Photo data:   {}", format_size(stats.image_bytes));
    println!("Tags:         {}", tags.user_tags().len());
    if let (Some(oldest), Some(newest)) = (stats.oldest, stats.newest) {
        println!(
            "Range:        {} to {}",
            oldest.with_timezone(&Local).format("%Y-%m-%d"),
            newest.with_timezone(&Local).format("%Y-%m-%d")
        );
    }
    Ok(())
}
