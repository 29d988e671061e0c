use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Problems with user configuration, all fatal before any scanning starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("Failed to read config file {path}: {source}")]
    Read {
        /// Config file location
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
    /// The config file is not valid TOML or has fields of the wrong type.
    #[error("Invalid config file {path}: {source}")]
    Parse {
        /// Config file location
        path: PathBuf,
        /// TOML parse error
        source: toml::de::Error,
    },
    /// Every indexed file belongs to a source; there is no implicit default.
    #[error("No source given: pass --source or set [defaults] source in the config file")]
    MissingSource,
    /// `$HOME` could not be determined for a default path.
    #[error("Could not find home directory")]
    NoHome,
}

/// Contents of `config.toml`. Every section and key is optional.
///
/// ```toml
/// [core]
/// database_path = "~/catalogs/index.db"
///
/// [scan]
/// match_mtime = true
/// ignore_patterns = ["node_modules", "*.tmp"]
///
/// [defaults]
/// source = "laptop"
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// `[core]`: where the catalog lives
    #[serde(default)]
    pub core: CoreConfig,
    /// `[scan]`: walk and reconciliation behavior
    #[serde(default)]
    pub scan: ScanConfig,
    /// `[defaults]`: values for omitted flags
    #[serde(default)]
    pub defaults: DefaultsConfig,
}

/// The `[core]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Catalog database file; `~` is expanded. Unset means `~/index.db`.
    #[serde(default)]
    pub database_path: Option<String>,
}

/// The `[scan]` section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Rehash every file on every run instead of trusting metadata matches.
    #[serde(default)]
    pub reindex_discovered: bool,
    /// Compare modification times in the metadata match, not only sizes.
    #[serde(default = "default_match_mtime")]
    pub match_mtime: bool,
    /// Glob patterns matched against file and directory names.
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

/// The `[defaults]` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Source label used when `--source` is omitted.
    #[serde(default)]
    pub source: Option<String>,
}

const fn default_match_mtime() -> bool {
    true
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            reindex_discovered: false,
            match_mtime: default_match_mtime(),
            ignore_patterns: Vec::new(),
        }
    }
}

impl Config {
    /// Loads configuration from `path`. A missing file yields the defaults and
    /// is not created.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input or unknown value types.
    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Picks the source label: the command-line value if non-empty, else the
    /// configured default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingSource`] when neither is set.
    pub fn resolve_source(&self, cli_source: Option<&str>) -> Result<String, ConfigError> {
        cli_source
            .filter(|s| !s.trim().is_empty())
            .or_else(|| {
                self.defaults
                    .source
                    .as_deref()
                    .filter(|s| !s.trim().is_empty())
            })
            .map(str::to_string)
            .ok_or(ConfigError::MissingSource)
    }
}
