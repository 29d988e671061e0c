#![allow(dead_code)]

use anyhow::Result;
use filetime::FileTime;
use fileinventory::reconcile::{NoopObserver, ReconcileOptions, ReconciliationEngine, RunReport};
use fileinventory::scanner::Walker;
use fileinventory::storage::{Catalog, ScanDescriptor};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Scratch directory holding a scanned tree under `files/` and a catalog
/// file under `db/`, so the catalog never ends up in its own scan.
pub struct Fixture {
    pub temp_dir: TempDir,
}

impl Fixture {
    pub fn new() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        fs::create_dir_all(temp_dir.path().join("files"))?;
        Ok(Self { temp_dir })
    }

    pub fn root(&self) -> PathBuf {
        self.temp_dir.path().join("files")
    }

    pub fn db_path(&self) -> PathBuf {
        self.temp_dir.path().join("db/index.db")
    }

    pub fn catalog(&self) -> Result<Catalog> {
        Ok(Catalog::open(self.db_path())?)
    }

    /// Writes `content` at `name` under the root and pins its mtime.
    pub fn write(&self, name: &str, content: &str, mtime_secs: i64) -> Result<PathBuf> {
        let path = self.root().join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        set_mtime(&path, mtime_secs)?;
        Ok(path)
    }

    pub fn walk(&self, source: &str) -> Result<Vec<ScanDescriptor>> {
        self.walk_dir(&self.root(), source)
    }

    pub fn walk_dir(&self, dir: &Path, source: &str) -> Result<Vec<ScanDescriptor>> {
        Ok(Walker::new(dir, source).walk()?.into_descriptors())
    }
}

pub fn set_mtime(path: &Path, secs: i64) -> Result<()> {
    filetime::set_file_mtime(path, FileTime::from_unix_time(secs, 0))?;
    Ok(())
}

/// One committed run with the default hasher.
pub fn index(
    catalog: &mut Catalog,
    descriptors: Vec<ScanDescriptor>,
    options: ReconcileOptions,
) -> Result<RunReport> {
    let mut engine = ReconciliationEngine::new(catalog, options);
    Ok(engine.run(descriptors, &mut NoopObserver)?)
}
