/// Per-file outcomes and run counters.
pub mod disposition;
/// Callback seam between the engine and whatever renders its progress.
pub mod observer;

pub use disposition::{Disposition, DispositionKind, RunStats};
pub use observer::{NoopObserver, ReconcileObserver};

use std::path::PathBuf;

use chrono::Utc;
use thiserror::Error;

use crate::storage::{Catalog, CatalogError, FileRecord, ScanDescriptor};
use crate::utils::hash::{ContentHasher, Xxh3Hasher};

/// Failures that abort a reconciliation run.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A catalog lookup or write failed.
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    /// A file listed by the walker could not be read for hashing.
    #[error("Failed to hash {path}: {source}")]
    Hash {
        /// On-disk location of the file
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

/// Whether a run persists what it decides.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Upsert every disposition.
    #[default]
    Commit,
    /// Decide and report, never write. Cheap matches come back as `Skipped`.
    Preview,
}

/// User-supplied classification applied to every record a run touches.
///
/// Empty strings count as not supplied. A subcategory without a category is
/// dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overrides {
    category: Option<String>,
    subcategory: Option<String>,
    label: Option<String>,
    tags: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

impl Overrides {
    /// Collects the classification flags, dropping empty values and a
    /// subcategory that has no category to belong to.
    #[must_use]
    pub fn new(
        category: Option<String>,
        subcategory: Option<String>,
        label: Option<String>,
        tags: Option<String>,
    ) -> Self {
        let category = non_empty(category);
        let subcategory = if category.is_some() {
            non_empty(subcategory)
        } else {
            None
        };
        Self {
            category,
            subcategory,
            label: non_empty(label),
            tags: non_empty(tags),
        }
    }

    /// True when no field would be changed by [`Overrides::apply`].
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.category.is_none()
            && self.subcategory.is_none()
            && self.label.is_none()
            && self.tags.is_none()
    }

    /// Writes every supplied field onto `record`, leaving the others alone.
    pub fn apply(&self, record: &mut FileRecord) {
        if let Some(category) = &self.category {
            record.category.clone_from(category);
            if let Some(subcategory) = &self.subcategory {
                record.subcategory.clone_from(subcategory);
            }
        }
        if let Some(label) = &self.label {
            record.label.clone_from(label);
        }
        if let Some(tags) = &self.tags {
            record.tags.clone_from(tags);
        }
    }
}

/// Knobs for one reconciliation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Rehash every file, ignoring cheap matches.
    pub reindex_discovered: bool,
    /// Include the modification time in the cheap match. When off, only
    /// `(source, path, size)` is compared.
    pub match_mtime: bool,
    /// Classification written onto every record the run touches.
    pub overrides: Overrides,
    /// Commit or preview.
    pub mode: RunMode,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            reindex_discovered: false,
            match_mtime: true,
            overrides: Overrides::default(),
            mode: RunMode::Commit,
        }
    }
}

/// One descriptor with the outcome of its cheap-match lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanItem {
    /// File as found by the walker
    pub descriptor: ScanDescriptor,
    /// Catalog record whose metadata matched, if any
    pub cheap_match: Option<FileRecord>,
}

impl PlanItem {
    /// Whether the confirm tier must hash this file.
    #[must_use]
    pub const fn needs_hash(&self) -> bool {
        self.cheap_match.is_none()
    }
}

/// Result of the cheap-match tier over a whole walk, in walk order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanPlan {
    items: Vec<PlanItem>,
}

impl ScanPlan {
    /// Every planned file, in walk order.
    #[must_use]
    pub fn items(&self) -> &[PlanItem] {
        &self.items
    }

    /// Descriptors that will be hashed, in walk order.
    pub fn to_process(&self) -> impl Iterator<Item = &ScanDescriptor> {
        self.items
            .iter()
            .filter(|item| item.needs_hash())
            .map(|item| &item.descriptor)
    }

    /// Number of files that will be hashed.
    #[must_use]
    pub fn process_count(&self) -> usize {
        self.items.iter().filter(|item| item.needs_hash()).count()
    }

    /// Number of files let through on a cheap match.
    #[must_use]
    pub fn skip_count(&self) -> usize {
        self.items.len() - self.process_count()
    }

    /// Number of planned files.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True when the walk found nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Everything one run decided.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Counters over all dispositions
    pub stats: RunStats,
    /// One entry per descriptor, in walk order
    pub dispositions: Vec<Disposition>,
}

/// Two-tier reconciliation of walked files against the catalog.
///
/// The cheap tier compares `(source, path, size, modified)` and lets matching
/// files through without reading them. Everything else is hashed and looked up
/// by `(source, path, digest)`. Each upsert commits on its own, so an aborted
/// run leaves every file handled so far in the catalog.
pub struct ReconciliationEngine<'c, H = Xxh3Hasher> {
    catalog: &'c mut Catalog,
    hasher: H,
    options: ReconcileOptions,
}

impl<'c> ReconciliationEngine<'c, Xxh3Hasher> {
    /// Engine hashing with XXH3-128.
    #[must_use]
    pub fn new(catalog: &'c mut Catalog, options: ReconcileOptions) -> Self {
        Self::with_hasher(catalog, Xxh3Hasher::new(), options)
    }
}

impl<'c, H: ContentHasher> ReconciliationEngine<'c, H> {
    /// Engine with a custom [`ContentHasher`].
    #[must_use]
    pub const fn with_hasher(catalog: &'c mut Catalog, hasher: H, options: ReconcileOptions) -> Self {
        Self {
            catalog,
            hasher,
            options,
        }
    }

    /// Options the engine was built with.
    #[must_use]
    pub const fn options(&self) -> &ReconcileOptions {
        &self.options
    }

    /// Hands the hasher back, mostly so tests can inspect what it was asked.
    #[must_use]
    pub fn into_hasher(self) -> H {
        self.hasher
    }

    /// Runs the cheap-match tier only. Reads the catalog, never the files.
    ///
    /// # Errors
    ///
    /// Returns an error if a catalog lookup fails.
    pub fn plan(&self, descriptors: Vec<ScanDescriptor>) -> Result<ScanPlan, ReconcileError> {
        let mut items = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let cheap_match = if self.options.reindex_discovered {
                None
            } else if self.options.match_mtime {
                self.catalog.find_cheap_match(
                    &descriptor.source,
                    &descriptor.path,
                    descriptor.size,
                    descriptor.modified,
                )?
            } else {
                self.catalog
                    .find_by_size(&descriptor.source, &descriptor.path, descriptor.size)?
            };
            if cheap_match.is_some() {
                tracing::debug!("Cheap match for {}", descriptor.path);
            }
            items.push(PlanItem {
                descriptor,
                cheap_match,
            });
        }
        Ok(ScanPlan { items })
    }

    /// Runs the confirm tier over a plan and, in commit mode, writes the result.
    ///
    /// # Errors
    ///
    /// Returns an error on the first unreadable file or failed catalog call.
    /// Records written before the failure stay written.
    pub fn execute(
        &mut self,
        plan: ScanPlan,
        observer: &mut dyn ReconcileObserver,
    ) -> Result<RunReport, ReconcileError> {
        observer.on_plan(&plan);
        let mut report = RunReport {
            stats: RunStats::default(),
            dispositions: Vec::with_capacity(plan.len()),
        };

        for item in plan.items {
            let disposition = match item.cheap_match {
                Some(record) => self.keep(&item.descriptor, record)?,
                None => self.confirm(&item.descriptor, &mut report.stats)?,
            };
            report.stats.record(&disposition);
            observer.on_disposition(&disposition);
            report.dispositions.push(disposition);
        }

        observer.on_finish(&report.stats);
        Ok(report)
    }

    /// [`plan`](Self::plan) followed by [`execute`](Self::execute).
    ///
    /// # Errors
    ///
    /// See [`execute`](Self::execute).
    pub fn run(
        &mut self,
        descriptors: Vec<ScanDescriptor>,
        observer: &mut dyn ReconcileObserver,
    ) -> Result<RunReport, ReconcileError> {
        let plan = self.plan(descriptors)?;
        self.execute(plan, observer)
    }

    fn keep(
        &self,
        descriptor: &ScanDescriptor,
        mut record: FileRecord,
    ) -> Result<Disposition, ReconcileError> {
        if self.options.mode == RunMode::Preview {
            return Ok(Disposition {
                kind: DispositionKind::Skipped,
                record,
                hashed: false,
            });
        }

        record.refresh_from(descriptor);
        record.last_checked = Utc::now();
        self.options.overrides.apply(&mut record);
        self.catalog.upsert(&record)?;
        Ok(Disposition {
            kind: DispositionKind::Unchanged,
            record,
            hashed: false,
        })
    }

    fn confirm(
        &mut self,
        descriptor: &ScanDescriptor,
        stats: &mut RunStats,
    ) -> Result<Disposition, ReconcileError> {
        let digest = self
            .hasher
            .digest(&descriptor.fs_path)
            .map_err(|source| ReconcileError::Hash {
                path: descriptor.fs_path.clone(),
                source,
            })?;
        stats.bytes_hashed += digest.bytes_read;
        tracing::debug!("{} {}", digest.hex, descriptor.path);

        let now = Utc::now();
        let (kind, mut record) = if let Some(mut existing) =
            self.catalog
                .find_by_digest(&descriptor.source, &descriptor.path, &digest.hex)?
        {
            existing.refresh_from(descriptor);
            existing.last_checked = now;
            (DispositionKind::ContentConfirmedUnchanged, existing)
        } else {
            let history = self.catalog.find_by_path(&descriptor.source, &descriptor.path)?;
            let record = FileRecord::from_descriptor(descriptor, digest.hex, now);
            match history.into_iter().next() {
                Some(previous) => {
                    tracing::warn!(
                        "Content changed: {} ({} -> {})",
                        descriptor.path,
                        previous.digest,
                        record.digest
                    );
                    (
                        DispositionKind::ContentChanged {
                            previous_digest: previous.digest,
                        },
                        record,
                    )
                }
                None => (DispositionKind::New, record),
            }
        };

        self.options.overrides.apply(&mut record);
        if self.options.mode == RunMode::Commit {
            self.catalog.upsert(&record)?;
        }
        Ok(Disposition {
            kind,
            record,
            hashed: true,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io;
    use std::path::Path;

    use chrono::{DateTime, TimeZone};

    use crate::utils::hash::{FileDigest, hash_bytes};

    /// Hasher backed by a path -> content map, counting calls.
    #[derive(Default)]
    struct MapHasher {
        contents: HashMap<String, Vec<u8>>,
        calls: Vec<String>,
    }

    impl MapHasher {
        fn set(&mut self, path: &str, content: &[u8]) {
            self.contents.insert(path.to_string(), content.to_vec());
        }
    }

    impl ContentHasher for MapHasher {
        fn digest(&mut self, path: &Path) -> io::Result<FileDigest> {
            let key = path.to_string_lossy().into_owned();
            self.calls.push(key.clone());
            let content = self
                .contents
                .get(&key)
                .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, key))?;
            Ok(FileDigest {
                hex: hash_bytes(content),
                bytes_read: content.len() as u64,
            })
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).single().unwrap_or_default()
    }

    fn descriptor(path: &str, size: u64, modified: i64) -> ScanDescriptor {
        ScanDescriptor {
            source: "disk1".to_string(),
            path: path.to_string(),
            fs_path: PathBuf::from(path),
            name: Path::new(path)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
            extension: "txt".to_string(),
            file_type: "text".to_string(),
            size,
            modified: at(modified),
            scan_time: Utc::now(),
        }
    }

    fn run(
        catalog: &mut Catalog,
        hasher: MapHasher,
        options: ReconcileOptions,
        descriptors: Vec<ScanDescriptor>,
    ) -> anyhow::Result<(RunReport, MapHasher)> {
        let mut engine = ReconciliationEngine::with_hasher(catalog, hasher, options);
        let report = engine.run(descriptors, &mut NoopObserver)?;
        Ok((report, engine.into_hasher()))
    }

    #[test]
    fn test_overrides_filter_empty_and_orphan_subcategory() {
        let overrides = Overrides::new(None, Some("sub".into()), Some(String::new()), None);
        assert!(overrides.is_empty());

        let overrides = Overrides::new(Some("photos".into()), Some("2019".into()), None, None);
        let mut record = FileRecord::from_descriptor(&descriptor("/a.txt", 1, 0), "d".into(), at(0));
        record.label = "kept".into();
        overrides.apply(&mut record);
        assert_eq!(record.category, "photos");
        assert_eq!(record.subcategory, "2019");
        assert_eq!(record.label, "kept");
    }

    #[test]
    fn test_first_run_is_new() -> anyhow::Result<()> {
        let mut catalog = Catalog::open_in_memory()?;
        let mut hasher = MapHasher::default();
        hasher.set("/a.txt", b"alpha");

        let (report, _) = run(
            &mut catalog,
            hasher,
            ReconcileOptions::default(),
            vec![descriptor("/a.txt", 5, 100)],
        )?;
        assert_eq!(report.stats.new, 1);
        assert_eq!(report.stats.bytes_hashed, 5);
        assert_eq!(report.dispositions[0].kind, DispositionKind::New);
        assert_eq!(catalog.count()?, 1);
        Ok(())
    }

    #[test]
    fn test_skip_mode_does_not_rehash() -> anyhow::Result<()> {
        let mut catalog = Catalog::open_in_memory()?;
        let mut hasher = MapHasher::default();
        hasher.set("/a.txt", b"alpha");
        let (first, hasher) = run(
            &mut catalog,
            hasher,
            ReconcileOptions::default(),
            vec![descriptor("/a.txt", 5, 100)],
        )?;
        let discovered = first.dispositions[0].record.discovered;

        let (second, hasher) = run(
            &mut catalog,
            hasher,
            ReconcileOptions::default(),
            vec![descriptor("/a.txt", 5, 100)],
        )?;
        assert_eq!(hasher.calls.len(), 1);
        assert_eq!(second.stats.skipped, 1);
        let disposition = &second.dispositions[0];
        assert_eq!(disposition.kind, DispositionKind::Unchanged);
        assert!(!disposition.hashed);
        assert_eq!(disposition.record.discovered, discovered);
        assert!(disposition.record.last_checked >= first.dispositions[0].record.last_checked);
        assert_eq!(catalog.count()?, 1);
        Ok(())
    }

    #[test]
    fn test_reindex_confirms_unchanged_content() -> anyhow::Result<()> {
        let mut catalog = Catalog::open_in_memory()?;
        let mut hasher = MapHasher::default();
        hasher.set("/a.txt", b"alpha");
        let options = ReconcileOptions {
            overrides: Overrides::new(Some("docs".into()), None, None, None),
            ..ReconcileOptions::default()
        };
        let (_, hasher) = run(&mut catalog, hasher, options, vec![descriptor("/a.txt", 5, 100)])?;

        let options = ReconcileOptions {
            reindex_discovered: true,
            ..ReconcileOptions::default()
        };
        let (report, hasher) = run(&mut catalog, hasher, options, vec![descriptor("/a.txt", 5, 200)])?;
        assert_eq!(hasher.calls.len(), 2);
        assert_eq!(report.stats.previous, 1);
        let record = &report.dispositions[0].record;
        assert_eq!(report.dispositions[0].kind, DispositionKind::ContentConfirmedUnchanged);
        assert_eq!(record.category, "docs");
        assert_eq!(record.modified, at(200));
        assert_eq!(catalog.count()?, 1);
        Ok(())
    }

    #[test]
    fn test_content_change_creates_new_identity() -> anyhow::Result<()> {
        let mut catalog = Catalog::open_in_memory()?;
        let mut hasher = MapHasher::default();
        hasher.set("/a.txt", b"alpha");
        let (first, mut hasher) = run(
            &mut catalog,
            hasher,
            ReconcileOptions::default(),
            vec![descriptor("/a.txt", 5, 100)],
        )?;
        let old = first.dispositions[0].record.clone();

        hasher.set("/a.txt", b"gamma");
        let (second, _) = run(
            &mut catalog,
            hasher,
            ReconcileOptions::default(),
            vec![descriptor("/a.txt", 5, 300)],
        )?;
        assert_eq!(second.stats.changed, 1);
        assert_eq!(
            second.dispositions[0].kind,
            DispositionKind::ContentChanged {
                previous_digest: old.digest.clone()
            }
        );
        assert_eq!(catalog.count()?, 2);
        assert_eq!(catalog.find_by_digest("disk1", "/a.txt", &old.digest)?, Some(old));
        Ok(())
    }

    #[test]
    fn test_size_only_cheap_match() -> anyhow::Result<()> {
        let mut catalog = Catalog::open_in_memory()?;
        let mut hasher = MapHasher::default();
        hasher.set("/a.txt", b"alpha");
        let (_, hasher) = run(
            &mut catalog,
            hasher,
            ReconcileOptions::default(),
            vec![descriptor("/a.txt", 5, 100)],
        )?;

        let options = ReconcileOptions {
            match_mtime: false,
            ..ReconcileOptions::default()
        };
        let (report, hasher) = run(&mut catalog, hasher, options, vec![descriptor("/a.txt", 5, 999)])?;
        assert_eq!(hasher.calls.len(), 1);
        assert_eq!(report.dispositions[0].kind, DispositionKind::Unchanged);
        assert_eq!(report.dispositions[0].record.modified, at(999));
        Ok(())
    }

    #[test]
    fn test_preview_never_writes() -> anyhow::Result<()> {
        let mut catalog = Catalog::open_in_memory()?;
        let mut hasher = MapHasher::default();
        hasher.set("/a.txt", b"alpha");
        hasher.set("/b.txt", b"beta");
        let (first, hasher) = run(
            &mut catalog,
            hasher,
            ReconcileOptions::default(),
            vec![descriptor("/a.txt", 5, 100)],
        )?;

        let options = ReconcileOptions {
            mode: RunMode::Preview,
            ..ReconcileOptions::default()
        };
        let (report, _) = run(
            &mut catalog,
            hasher,
            options,
            vec![descriptor("/a.txt", 5, 100), descriptor("/b.txt", 4, 100)],
        )?;
        assert_eq!(report.dispositions[0].kind, DispositionKind::Skipped);
        assert_eq!(report.dispositions[1].kind, DispositionKind::New);
        assert_eq!(catalog.count()?, 1);
        let stored = catalog.find_by_path("disk1", "/a.txt")?;
        assert_eq!(stored[0].last_checked, first.dispositions[0].record.last_checked);
        Ok(())
    }

    #[test]
    fn test_hash_failure_aborts_run() -> anyhow::Result<()> {
        let mut catalog = Catalog::open_in_memory()?;
        let mut hasher = MapHasher::default();
        hasher.set("/a.txt", b"alpha");
        let mut engine =
            ReconciliationEngine::with_hasher(&mut catalog, hasher, ReconcileOptions::default());
        let result = engine.run(
            vec![descriptor("/a.txt", 5, 100), descriptor("/gone.txt", 1, 100)],
            &mut NoopObserver,
        );
        assert!(matches!(result, Err(ReconcileError::Hash { .. })));
        drop(engine);
        assert_eq!(catalog.count()?, 1);
        Ok(())
    }
}
