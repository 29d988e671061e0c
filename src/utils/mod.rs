//! Utility functions and helpers.
//!
//! - Path manipulation (tilde expansion)
//! - Hidden-name and ignore-pattern checks used by the walker
//!
//! # Submodules
//!
//! - [`formatters`]: Output formatting
//! - [`hash`]: Content digests
//!
//! # Examples
//!
//! ```
//! use fileinventory::utils::{expand_tilde, is_hidden};
//!
//! # fn main() -> anyhow::Result<()> {
//! let path = expand_tilde("~/index.db")?;
//! assert!(is_hidden(".git"));
//! # Ok(())
//! # }
//! ```

/// Output formatting and colorization
pub mod formatters;
/// Streamed content hashing
pub mod hash;

use anyhow::Result;
use std::path::{Path, PathBuf};

/// Expands a path starting with `~` to the user's home directory.
///
/// # Errors
///
/// Returns an error if the path is empty.
pub fn expand_tilde(path: &str) -> Result<PathBuf> {
    if path.is_empty() {
        anyhow::bail!("Path cannot be empty");
    }
    if path.starts_with("~/")
        && let Some(home) = dirs::home_dir()
    {
        return Ok(home.join(&path[2..]));
    }
    Ok(PathBuf::from(path))
}

/// Names starting with `.` are hidden. The empty name is not.
#[must_use]
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Compiles glob patterns, rejecting the first invalid one.
///
/// # Errors
///
/// Returns the offending pattern and the parse error.
pub fn compile_patterns(patterns: &[String]) -> Result<Vec<glob::Pattern>, (String, glob::PatternError)> {
    patterns
        .iter()
        .map(|p| glob::Pattern::new(p).map_err(|e| (p.clone(), e)))
        .collect()
}

/// True when the final component of `path` matches any of `patterns`.
#[must_use]
pub fn should_ignore(path: &Path, patterns: &[glob::Pattern]) -> bool {
    let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
        return false;
    };
    patterns.iter().any(|p| p.matches(name))
}
