//! Cross-source redundancy analysis.
//!
//! Answers whether the files under one source also exist, byte for byte, on
//! any other source. Everything here is read-only against the catalog.

use crate::storage::{Catalog, CatalogError, FileRecord, ScanDescriptor};

/// A catalogued file together with its copies elsewhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileHealth {
    /// Record on the analyzed source
    pub record: FileRecord,
    /// Records with the same digest on other sources
    pub other_sources: Vec<FileRecord>,
}

/// Aggregate redundancy of one source's walked files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HealthReport {
    /// Catalogued files that have at least one copy on another source
    pub found: usize,
    /// Catalogued files with no copy anywhere else
    pub not_found: usize,
    /// Walked files with no cheap match in the catalog; not part of the score
    pub not_indexed: usize,
    /// The `not_found` records, in walk order
    pub without_other_sources: Vec<FileRecord>,
    /// The `found` records with their copies, in walk order
    pub redundant: Vec<FileHealth>,
}

impl HealthReport {
    /// Percentage of catalogued files that exist on another source.
    ///
    /// `None` when no walked file was catalogued.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn health(&self) -> Option<f64> {
        let total = self.found + self.not_found;
        if total == 0 {
            return None;
        }
        Some(self.found as f64 / total as f64 * 100.0)
    }
}

/// Redundancy verdict for one walked file in new-files mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NewFileStatus {
    /// Catalogued, and copies exist on other sources.
    Redundant {
        /// Same-digest records on other sources
        matches: Vec<FileRecord>,
    },
    /// Catalogued, but this source holds the only copy.
    WithoutOtherSources {
        /// The only catalogued copy
        record: FileRecord,
    },
    /// Not catalogued here, but some source has a file of the same size and
    /// modification time.
    Similar {
        /// Records matching on size and modification time
        matches: Vec<FileRecord>,
    },
    /// Not catalogued and nothing similar anywhere.
    Unknown,
}

impl NewFileStatus {
    /// Whether the file deserves attention: at risk or entirely unknown.
    #[must_use]
    pub const fn flagged(&self) -> bool {
        matches!(self, Self::WithoutOtherSources { .. } | Self::Unknown)
    }
}

/// Per-file verdicts for a walk, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewFilesReport {
    /// Each walked file with its verdict
    pub entries: Vec<(ScanDescriptor, NewFileStatus)>,
}

impl NewFilesReport {
    /// Number of files that are at risk or unknown.
    #[must_use]
    pub fn flagged_count(&self) -> usize {
        self.entries.iter().filter(|(_, status)| status.flagged()).count()
    }

    /// Status of the walked file at `path`, if it was part of the walk.
    #[must_use]
    pub fn status_of(&self, path: &str) -> Option<&NewFileStatus> {
        self.entries
            .iter()
            .find(|(descriptor, _)| descriptor.path == path)
            .map(|(_, status)| status)
    }
}

/// Read-only queries over a catalog.
pub struct RedundancyAnalyzer<'c> {
    catalog: &'c Catalog,
}

impl<'c> RedundancyAnalyzer<'c> {
    /// Analyzer over `catalog`.
    #[must_use]
    pub const fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Copies of `record` held by other sources.
    ///
    /// # Errors
    ///
    /// Returns an error if the catalog query fails.
    pub fn other_sources(&self, record: &FileRecord) -> Result<Vec<FileRecord>, CatalogError> {
        self.catalog
            .find_in_other_sources(&record.digest, &record.source)
    }

    /// Health of the walked files of one source.
    ///
    /// Files are resolved through the cheap metadata match only; nothing is
    /// hashed.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog query fails.
    pub fn health(&self, descriptors: &[ScanDescriptor]) -> Result<HealthReport, CatalogError> {
        let mut report = HealthReport::default();
        for descriptor in descriptors {
            let Some(record) = self.cheap_match(descriptor)? else {
                report.not_indexed += 1;
                continue;
            };
            let other_sources = self.other_sources(&record)?;
            if other_sources.is_empty() {
                report.not_found += 1;
                report.without_other_sources.push(record);
            } else {
                report.found += 1;
                report.redundant.push(FileHealth {
                    record,
                    other_sources,
                });
            }
        }
        Ok(report)
    }

    /// Classifies each walked file by whether it is known and redundant.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog query fails.
    pub fn new_files(&self, descriptors: &[ScanDescriptor]) -> Result<NewFilesReport, CatalogError> {
        let mut report = NewFilesReport::default();
        for descriptor in descriptors {
            let status = match self.cheap_match(descriptor)? {
                Some(record) => {
                    let matches = self.other_sources(&record)?;
                    if matches.is_empty() {
                        NewFileStatus::WithoutOtherSources { record }
                    } else {
                        NewFileStatus::Redundant { matches }
                    }
                }
                None => {
                    let matches = self
                        .catalog
                        .find_similar(descriptor.size, descriptor.modified)?;
                    if matches.is_empty() {
                        NewFileStatus::Unknown
                    } else {
                        NewFileStatus::Similar { matches }
                    }
                }
            };
            report.entries.push((descriptor.clone(), status));
        }
        Ok(report)
    }

    fn cheap_match(&self, descriptor: &ScanDescriptor) -> Result<Option<FileRecord>, CatalogError> {
        self.catalog.find_cheap_match(
            &descriptor.source,
            &descriptor.path,
            descriptor.size,
            descriptor.modified,
        )
    }
}
