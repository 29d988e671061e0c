#![warn(missing_docs)]
#![allow(clippy::arithmetic_side_effects)] // Counters and byte totals
#![allow(clippy::indexing_slicing)] // Bounds checked by logic

//! # fileinventory
//!
//! Catalogs files found under a directory into a SQLite database, one storage
//! source (a disk, a machine) at a time, and answers whether each file also
//! exists with identical content on some other source.
//!
//! Rescans are cheap: a file whose size and modification time match the
//! catalog is not read again. Only new or changed files are hashed.
//!
//! ## Architecture
//!
//! - [`scanner`]: directory walk producing [`storage::ScanDescriptor`]s
//! - [`classify`]: extension to coarse type table
//! - [`storage`]: the [`storage::Catalog`] and its record types
//! - [`reconcile`]: the two-tier reconciliation engine
//! - [`redundancy`]: cross-source health and new-file analysis
//! - [`output`]: terminal rendering and the console observer
//! - [`commands`]: one module per `finv` subcommand
//!
//! ## Example Usage
//!
//! ```no_run
//! use fileinventory::reconcile::{NoopObserver, ReconcileOptions, ReconciliationEngine};
//! use fileinventory::scanner::Walker;
//! use fileinventory::storage::Catalog;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut catalog = Catalog::open("/tmp/index.db")?;
//! let walk = Walker::new("/mnt/photos", "nas").walk()?;
//!
//! let mut engine = ReconciliationEngine::new(&mut catalog, ReconcileOptions::default());
//! let report = engine.run(walk.into_descriptors(), &mut NoopObserver)?;
//! println!("{} new files", report.stats.new);
//! # Ok(())
//! # }
//! ```

/// Command-line interface definitions (argument parsing structures).
pub mod cli;

/// Extension to file type classification.
pub mod classify;

/// Subcommand implementations.
pub mod commands;

/// Configuration file loading.
pub mod config;

/// Tracing subscriber setup.
pub mod logging;

/// Output formatting and progress display.
pub mod output;

/// Two-tier reconciliation of walked files against the catalog.
pub mod reconcile;

/// Cross-source redundancy and health analysis.
pub mod redundancy;

/// Filesystem scanning.
pub mod scanner;

/// Catalog storage and record types.
pub mod storage;

/// Helpers shared by tests across modules.
#[cfg(test)]
pub mod test_utils;

/// Utility functions and helpers.
pub mod utils;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{Config, ConfigError};
use crate::storage::Catalog;

/// Current version of the finv binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Catalog file used when nothing else names one, relative to home.
pub const DEFAULT_DB_FILE: &str = "index.db";

/// Default configuration file path relative to home directory.
pub const DEFAULT_CONFIG_PATH: &str = ".config/fileinventory/config.toml";

/// Resolved locations and settings for one invocation.
///
/// Command-line flags (which clap also fills from `FINV_DB` and
/// `FINV_CONFIG`) win over the config file, which wins over the built-in
/// defaults.
#[derive(Debug, Clone)]
pub struct InventoryContext {
    /// Catalog database file.
    pub db_path: PathBuf,

    /// Configuration file, which may not exist.
    pub config_path: PathBuf,

    /// Loaded configuration settings.
    pub config: Config,
}

impl InventoryContext {
    /// Resolves the config and database paths and loads the config.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is needed but unknown, or the
    /// config file exists but is invalid.
    pub fn new(db: Option<PathBuf>, config: Option<PathBuf>) -> Result<Self> {
        let config_path = match config {
            Some(path) => path,
            None => home_dir()?.join(DEFAULT_CONFIG_PATH),
        };
        let loaded = Config::load(&config_path)?;

        let db_path = match (db, loaded.core.database_path.as_deref()) {
            (Some(path), _) => path,
            (None, Some(configured)) => utils::expand_tilde(configured)
                .with_context(|| format!("Invalid database_path in {}", config_path.display()))?,
            (None, None) => home_dir()?.join(DEFAULT_DB_FILE),
        };

        Ok(Self {
            db_path,
            config_path,
            config: loaded,
        })
    }

    /// Builds a context around an already loaded config, for tests and
    /// embedding.
    #[must_use]
    pub fn new_explicit(db_path: PathBuf, config: Config) -> Self {
        Self {
            db_path,
            config_path: PathBuf::new(),
            config,
        }
    }

    /// The source label for this run.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSource`] if neither the flag nor the
    /// config provides one.
    pub fn resolve_source(&self, cli_source: Option<&str>) -> Result<String, ConfigError> {
        self.config.resolve_source(cli_source)
    }

    /// Scan root, defaulting to the current directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the current directory is needed and unavailable.
    pub fn resolve_root(&self, path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(path) => Ok(path.to_path_buf()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }

    /// Opens (creating if needed) the catalog database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or initialized.
    pub fn open_catalog(&self) -> Result<Catalog> {
        Catalog::open(&self.db_path)
            .with_context(|| format!("Failed to open catalog at {}", self.db_path.display()))
    }
}

fn home_dir() -> Result<PathBuf, ConfigError> {
    dirs::home_dir().ok_or(ConfigError::NoHome)
}
