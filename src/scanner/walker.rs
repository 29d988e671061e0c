use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use thiserror::Error;
use walkdir::WalkDir;

use crate::classify;
use crate::storage::ScanDescriptor;
use crate::utils::{compile_patterns, is_hidden, should_ignore};

/// Errors that abort a walk. A scan is complete-or-retry, never partial.
#[derive(Debug, Error)]
pub enum WalkError {
    /// The scan root does not exist or cannot be resolved.
    #[error("Cannot scan {path}: {source}")]
    Root {
        /// Root as given by the caller
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
    /// A directory or file could not be read during traversal.
    #[error("Failed to walk directory tree: {source}")]
    Traverse {
        /// Entry that failed, when known
        path: Option<PathBuf>,
        /// Underlying walkdir error
        source: walkdir::Error,
    },
    /// File metadata lacks a usable modification time.
    #[error("Cannot read modification time of {path}: {source}")]
    Metadata {
        /// File being described
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
    /// An ignore pattern from the configuration is not a valid glob.
    #[error("Invalid ignore pattern {pattern:?}: {source}")]
    Pattern {
        /// Pattern text
        pattern: String,
        /// Parse error
        source: glob::PatternError,
    },
}

impl From<walkdir::Error> for WalkError {
    fn from(source: walkdir::Error) -> Self {
        Self::Traverse {
            path: source.path().map(Path::to_path_buf),
            source,
        }
    }
}

/// Walks one root on behalf of one source.
///
/// Hidden directories are pruned and reported, hidden files are dropped, and
/// symlinks are not followed. The root itself is never considered hidden.
#[derive(Debug, Clone)]
pub struct Walker {
    root: PathBuf,
    source: String,
    ignore: Vec<glob::Pattern>,
    exclude: Vec<PathBuf>,
}

/// Everything a completed walk found.
///
/// Descriptors are grouped by parent directory: a stable sort on the parent
/// path string, with name order kept inside each directory.
#[derive(Debug, Default)]
pub struct WalkOutput {
    descriptors: Vec<ScanDescriptor>,
    skipped_dirs: Vec<PathBuf>,
    dirs_scanned: usize,
}

impl WalkOutput {
    /// Files found, grouped by directory.
    #[must_use]
    pub fn descriptors(&self) -> &[ScanDescriptor] {
        &self.descriptors
    }

    /// Directories pruned because they were hidden or ignored, in walk order.
    #[must_use]
    pub fn skipped_dirs(&self) -> &[PathBuf] {
        &self.skipped_dirs
    }

    /// Number of directories descended into, the root included.
    #[must_use]
    pub const fn dirs_scanned(&self) -> usize {
        self.dirs_scanned
    }

    /// Number of files found.
    #[must_use]
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// True when the walk found no files.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Consumes the output, keeping only the files.
    #[must_use]
    pub fn into_descriptors(self) -> Vec<ScanDescriptor> {
        self.descriptors
    }
}

impl IntoIterator for WalkOutput {
    type Item = ScanDescriptor;
    type IntoIter = std::vec::IntoIter<ScanDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.descriptors.into_iter()
    }
}

impl Walker {
    /// Walker for `root`, labelling every file with `source`.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            source: source.into(),
            ignore: Vec::new(),
            exclude: Vec::new(),
        }
    }

    /// Drops these exact files from the output, wherever they sit in the tree.
    ///
    /// The files need not exist yet; their parent directory is resolved so
    /// they compare equal to entries under the canonical root.
    #[must_use]
    pub fn excluding(mut self, paths: impl IntoIterator<Item = PathBuf>) -> Self {
        self.exclude
            .extend(paths.into_iter().map(|path| resolve_parent(&path)));
        self
    }

    /// Adds glob patterns matched against entry names; matching directories
    /// are pruned and matching files dropped.
    ///
    /// # Errors
    ///
    /// Returns [`WalkError::Pattern`] for the first pattern that does not parse.
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Result<Self, WalkError> {
        self.ignore = compile_patterns(patterns)
            .map_err(|(pattern, source)| WalkError::Pattern { pattern, source })?;
        Ok(self)
    }

    /// Root as given, not yet canonicalized.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walks the whole tree and returns the buffered result.
    ///
    /// # Errors
    ///
    /// Fails on the first unreadable entry; nothing found before it is returned.
    pub fn walk(&self) -> Result<WalkOutput, WalkError> {
        let root = self.root.canonicalize().map_err(|source| WalkError::Root {
            path: self.root.clone(),
            source,
        })?;
        let scan_time = Utc::now();
        let mut output = WalkOutput::default();

        let mut entries = WalkDir::new(&root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter();

        while let Some(entry) = entries.next() {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy();

            if entry.file_type().is_dir() {
                if entry.depth() > 0
                    && (is_hidden(&name) || should_ignore(entry.path(), &self.ignore))
                {
                    tracing::info!("Skipping folder {}", entry.path().display());
                    output.skipped_dirs.push(entry.path().to_path_buf());
                    entries.skip_current_dir();
                    continue;
                }
                tracing::info!("Scanning folder {}", entry.path().display());
                output.dirs_scanned += 1;
                continue;
            }

            if !entry.file_type().is_file()
                || is_hidden(&name)
                || should_ignore(entry.path(), &self.ignore)
            {
                continue;
            }
            if self.exclude.iter().any(|p| p == entry.path()) {
                tracing::debug!("Excluding {}", entry.path().display());
                continue;
            }

            let metadata = entry.metadata()?;
            let modified = metadata.modified().map_err(|source| WalkError::Metadata {
                path: entry.path().to_path_buf(),
                source,
            })?;
            output
                .descriptors
                .push(self.describe(entry.path(), metadata.len(), modified.into(), scan_time));
        }

        output
            .descriptors
            .sort_by(|a, b| a.parent_dir().cmp(b.parent_dir()));
        Ok(output)
    }

    fn describe(
        &self,
        path: &Path,
        size: u64,
        modified: DateTime<Utc>,
        scan_time: DateTime<Utc>,
    ) -> ScanDescriptor {
        let (extension, file_type) = classify::classify(path);
        ScanDescriptor {
            source: self.source.clone(),
            path: path.to_string_lossy().into_owned(),
            fs_path: path.to_path_buf(),
            name: path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            extension,
            file_type: file_type.to_string(),
            size,
            modified,
            scan_time,
        }
    }
}

fn resolve_parent(path: &Path) -> PathBuf {
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            parent
                .canonicalize()
                .map_or_else(|_| path.to_path_buf(), |dir| dir.join(name))
        }
        _ => path.to_path_buf(),
    }
}
