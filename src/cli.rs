//! CLI struct definitions for the lectio command-line interface.
//!
//! All clap-derived types live here. Dispatch lives in `lib.rs`.

use crate::core::curriculum::Locale;
use crate::plugins::status::MeditationStatus;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[clap(
    name = "lectio",
    version = env!("CARGO_PKG_VERSION"),
    about = "Two chapters a day through the Pauline epistles, with progress, reflections and an archive kept on this device."
)]
pub(crate) struct Cli {
    /// Config file (default: $LECTIO_CONFIG, then ~/.lectio/config.toml).
    #[clap(long, global = true)]
    pub config: Option<PathBuf>,
    /// Display language: 'ko' or 'en'. Overrides the config file.
    #[clap(long, global = true)]
    pub locale: Option<Locale>,
    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Command {
    /// Make NAME the active user
    Login { name: String },
    /// Clear the active user
    Logout,
    /// Print the active user
    Whoami,
    /// Show the next reading for the active user
    Today,
    /// Show the reading assigned to day N
    Day {
        #[clap(allow_negative_numbers = true)]
        n: i64,
    },
    /// List one full pass of the plan
    Schedule,
    /// Archive a finished reading and move on
    Complete(CompleteCli),
    /// Meditation status ledger
    Status(StatusCli),
    /// Archived readings
    Archive(ArchiveCli),
    /// Dashboard figures
    Stats {
        /// Output format: 'text' or 'json'.
        #[clap(long, default_value = "text")]
        format: String,
    },
    /// Export the active user's data as JSON
    Backup {
        /// Write to this file instead of stdout.
        #[clap(long)]
        out: Option<PathBuf>,
    },
    /// Import a backup document and make its user active
    Restore {
        file: PathBuf,
        /// User to activate (defaults to the active user).
        #[clap(long)]
        user: Option<String>,
    },
}

#[derive(clap::Args, Debug)]
pub(crate) struct CompleteCli {
    /// Plan day (defaults to the next unread day).
    pub day: Option<u32>,
    /// Free selection: zero-based book index in the plan.
    #[clap(long, requires = "chapter", conflicts_with = "day")]
    pub book: Option<usize>,
    /// Free selection: starting chapter.
    #[clap(long, requires = "book")]
    pub chapter: Option<u32>,
    /// Reflection to keep with the archived reading.
    #[clap(long)]
    pub note: Option<String>,
}

#[derive(clap::Args, Debug)]
pub(crate) struct StatusCli {
    #[clap(subcommand)]
    pub command: StatusCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum StatusCommand {
    /// Every recorded day
    List,
    /// Set DAY to STATUS, or clear it if it already has that status
    Toggle { day: u32, status: MeditationStatus },
}

#[derive(clap::Args, Debug)]
pub(crate) struct ArchiveCli {
    #[clap(subcommand)]
    pub command: ArchiveCommand,
}

#[derive(Subcommand, Debug)]
pub(crate) enum ArchiveCommand {
    /// Every archived reading, newest first
    List,
    /// One archived reading in full
    Show {
        /// Day number or manual key, as printed by `archive list`.
        id: String,
    },
}
