/// `finv health`: redundancy score of a source against the others.
pub mod health;
/// `finv index`: reconcile a tree into the catalog.
pub mod index;
/// `finv ls` / `finv show`: grouped listing with new-file annotations.
pub mod ls;

use anyhow::{Context, Result};
use std::path::Path;

use crate::InventoryContext;
use crate::output;
use crate::scanner::{WalkOutput, Walker};
use crate::storage::Catalog;

/// Walks `root` for `source`, applying the configured ignore patterns, and
/// reports what was found. The catalog's own files are never part of a scan.
///
/// # Errors
///
/// Returns an error if the patterns are invalid or the walk fails.
pub fn scan(ctx: &InventoryContext, root: &Path, source: &str) -> Result<WalkOutput> {
    output::info(&format!("Scanning {} as {source}", root.display()));
    let walk = Walker::new(root, source)
        .with_ignore_patterns(&ctx.config.scan.ignore_patterns)?
        .excluding(Catalog::database_files(&ctx.db_path))
        .walk()
        .with_context(|| format!("Failed to scan {}", root.display()))?;

    let skipped = walk.skipped_dirs().len();
    if skipped > 0 {
        output::info(&format!(
            "Found {} files in {} folders, skipped {skipped} hidden or ignored",
            walk.len(),
            walk.dirs_scanned()
        ));
    } else {
        output::info(&format!(
            "Found {} files in {} folders",
            walk.len(),
            walk.dirs_scanned()
        ));
    }
    for dir in walk.skipped_dirs() {
        output::verbose(&format!("Skipped {}", dir.display()));
    }
    Ok(walk)
}
