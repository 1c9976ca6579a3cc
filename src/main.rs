// SPDX-License-Identifier: GPL-3.0-only

use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

#[derive(Parser)]
#[command(name = "photo-journal")]
#[command(about = "Camera-first photo journal")]
#[command(version = env!("GIT_VERSION"))]
struct Cli {
    /// Config file (default: ~/.config/photo-journal/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Journal database, overriding the configured one
    #[arg(long, global = true)]
    library: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Take a photo and add it to the journal
    Capture(cli::CaptureArgs),

    /// Add image files (paths or file:// URLs) to the journal
    Import {
        /// Files to import
        #[arg(required = true)]
        locations: Vec<String>,

        /// Tag for the new entries
        #[arg(short, long)]
        tag: Option<String>,

        /// Store the files as they are, even when compression would shrink them
        #[arg(long)]
        no_compress: bool,
    },

    /// List entries, newest first
    List {
        /// Only entries with this tag ("all", "untagged" or a tag name)
        #[arg(short, long, default_value = "all")]
        tag: String,

        /// Group entries by day
        #[arg(short, long)]
        days: bool,
    },

    /// Show one entry
    Show {
        /// Entry id or unique id prefix
        id: String,

        /// Also write the entry image to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Change an entry's note, tag or date
    Edit(cli::EditArgs),

    /// Delete an entry
    Delete {
        /// Entry id or unique id prefix
        id: String,
    },

    /// Delete every entry older than a date
    Prune {
        /// Cutoff date (YYYY-MM-DD, local time)
        #[arg(long)]
        before: String,

        /// Only report what would be deleted
        #[arg(long)]
        dry_run: bool,
    },

    /// Recompress stored images with the current settings
    Compress {
        /// Entry id or prefix (default: every entry)
        id: Option<String>,
    },

    /// Export entry images as JPEG files
    Export {
        /// Only entries with this tag
        #[arg(short, long, default_value = "all")]
        tag: String,

        /// Parent folder for the export (default: ~/Documents/Photo Journal)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Open the export folder afterwards
        #[arg(long)]
        reveal: bool,
    },

    /// Manage tags
    Tags {
        #[command(subcommand)]
        action: cli::TagsCommand,
    },

    /// Show or change settings
    Settings {
        #[command(subcommand)]
        action: cli::SettingsCommand,
    },

    /// Play entries one after another (Ctrl+C to stop)
    Slideshow {
        /// Only entries with this tag
        #[arg(short, long, default_value = "all")]
        tag: String,

        /// Seconds per slide (default from settings)
        #[arg(short, long)]
        interval: Option<u64>,

        /// Start over after the last slide
        #[arg(short, long = "loop")]
        looping: bool,
    },

    /// Journal statistics
    Stats,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    // Set RUST_LOG environment variable to control log level
    // Examples: RUST_LOG=debug, RUST_LOG=photo_journal=debug, RUST_LOG=info
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_target(true)
        .with_level(true)
        .init();

    let args = Cli::parse();
    let ctx = cli::Context::load(args.config, args.library)?;

    let result = match args.command {
        Commands::Capture(capture) => cli::capture(&ctx, capture),
        Commands::Import {
            locations,
            tag,
            no_compress,
        } => cli::import(&ctx, &locations, tag.as_deref(), !no_compress),
        Commands::List { tag, days } => cli::list(&ctx, &tag, days),
        Commands::Show { id, output } => cli::show(&ctx, &id, output),
        Commands::Edit(edit) => cli::edit(&ctx, edit),
        Commands::Delete { id } => cli::delete(&ctx, &id),
        Commands::Prune { before, dry_run } => cli::prune(&ctx, &before, dry_run),
        Commands::Compress { id } => cli::compress(&ctx, id.as_deref()),
        Commands::Export { tag, dir, reveal } => cli::export(&ctx, &tag, dir, reveal),
        Commands::Tags { action } => cli::tags(&ctx, action),
        Commands::Settings { action } => cli::settings(ctx, action),
        Commands::Slideshow {
            tag,
            interval,
            looping,
        } => cli::slideshow(&ctx, &tag, interval, looping),
        Commands::Stats => cli::stats(&ctx),
    };
    Ok(result?)
}
