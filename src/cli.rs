//! Command-line interface definitions for `finv`.
//!
//! Shared between the binary and the xtask man page generator.
//!
//! Field-level documentation is provided via clap attributes, so missing_docs
//! is allowed here.

#![allow(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "finv",
    version = crate::VERSION,
    about = "Catalog files across disks and find the ones without a backup",
    long_about = "Indexes files per storage source into a SQLite catalog, skipping \
                  unchanged files by size and modification time, and reports which \
                  files have no identical copy on any other source"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Catalog database file (default: ~/index.db)
    #[arg(long, global = true, env = "FINV_DB", value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Config file (default: ~/.config/fileinventory/config.toml)
    #[arg(long, global = true, env = "FINV_CONFIG", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Root and source label shared by every scanning command.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Directory to scan (default: current directory)
    pub path: Option<PathBuf>,

    /// Label of the disk or machine the files live on
    #[arg(short, long)]
    pub source: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Hash new and changed files and record them in the catalog
    Index {
        #[command(flatten)]
        scan: ScanArgs,

        /// Category to assign to every indexed file
        #[arg(long)]
        category: Option<String>,

        /// Subcategory, only applied together with --category
        #[arg(long)]
        subcategory: Option<String>,

        /// Label to assign to every indexed file
        #[arg(long)]
        label: Option<String>,

        /// Free-form tags to assign to every indexed file
        #[arg(long)]
        tags: Option<String>,

        /// Rehash files even when size and modification time are unchanged
        #[arg(long)]
        reindex_all: bool,

        /// Show which files would be hashed, without hashing or writing
        #[arg(short = 'n', long)]
        dry_run: bool,
    },

    /// List scanned files grouped by directory, without writing to the catalog
    #[command(alias = "show")]
    Ls {
        #[command(flatten)]
        scan: ScanArgs,

        /// Only list files that are unknown or have no copy on another source
        #[arg(long)]
        new: bool,
    },

    /// Report how many files also exist on another source
    Health {
        #[command(flatten)]
        scan: ScanArgs,

        /// Print every file that exists only on this source
        #[arg(short, long)]
        list: bool,
    },

    /// Generate shell completion scripts
    Completion {
        #[arg(value_enum)]
        shell: Shell,
    },
}
