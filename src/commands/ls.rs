use anyhow::Result;

use crate::InventoryContext;
use crate::cli::ScanArgs;
use crate::output::{self, report::{ListingRow, print_listing, summary_line}};
use crate::reconcile::{DispositionKind, NoopObserver, ReconcileOptions, ReconciliationEngine, RunMode};
use crate::redundancy::{NewFileStatus, NewFilesReport, RedundancyAnalyzer};

fn note_for(kind: &DispositionKind, status: &NewFileStatus) -> String {
    let state = match kind {
        DispositionKind::New => Some("new"),
        DispositionKind::ContentChanged { .. } => Some("changed"),
        _ => None,
    };
    let redundancy = match status {
        NewFileStatus::WithoutOtherSources { .. } => Some("only copy"),
        NewFileStatus::Unknown => Some("not on any source"),
        NewFileStatus::Similar { .. } => Some("similar elsewhere"),
        NewFileStatus::Redundant { .. } => None,
    };
    let parts: Vec<_> = state.into_iter().chain(redundancy).collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("[{}]", parts.join(", "))
    }
}

/// Lists the scanned files grouped by directory with what indexing would do
/// to each, without touching the catalog.
///
/// # Errors
///
/// Returns an error if no source is known, the walk fails, a file cannot be
/// hashed, or the catalog cannot be read.
pub fn execute(ctx: &InventoryContext, scan: &ScanArgs, only_new: bool) -> Result<NewFilesReport> {
    let source = ctx.resolve_source(scan.source.as_deref())?;
    let root = ctx.resolve_root(scan.path.as_deref())?;
    let mut catalog = ctx.open_catalog()?;

    let walk = super::scan(ctx, &root, &source)?;
    if walk.is_empty() {
        output::info("No files found");
        return Ok(NewFilesReport::default());
    }

    let redundancy = RedundancyAnalyzer::new(&catalog).new_files(walk.descriptors())?;

    let options = ReconcileOptions {
        reindex_discovered: false,
        match_mtime: ctx.config.scan.match_mtime,
        overrides: crate::reconcile::Overrides::default(),
        mode: RunMode::Preview,
    };
    let report = ReconciliationEngine::new(&mut catalog, options)
        .run(walk.into_descriptors(), &mut NoopObserver)?;

    let rows: Vec<ListingRow<'_>> = redundancy
        .entries
        .iter()
        .zip(&report.dispositions)
        .filter(|((_, status), _)| !only_new || status.flagged())
        .map(|((descriptor, status), disposition)| ListingRow {
            descriptor,
            discovered: disposition.record.discovered,
            note: note_for(&disposition.kind, status),
        })
        .collect();

    if rows.is_empty() {
        output::success("Every file is indexed and has a copy on another source");
    } else {
        print_listing(&rows);
    }
    println!("\n{}", summary_line(&report.stats));
    if redundancy.flagged_count() > 0 {
        output::warning(&format!(
            "{} file(s) exist only on {source} or are not indexed anywhere",
            redundancy.flagged_count()
        ));
    }
    Ok(redundancy)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::index::{self, IndexOptions};
    use crate::test_utils::fixtures::TestTree;

    #[test]
    fn test_note_for() {
        assert_eq!(
            note_for(&DispositionKind::New, &NewFileStatus::Unknown),
            "[new, not on any source]"
        );
        assert_eq!(
            note_for(
                &DispositionKind::Skipped,
                &NewFileStatus::Redundant { matches: Vec::new() }
            ),
            ""
        );
    }

    #[test]
    fn test_ls_does_not_write() -> Result<()> {
        let tree = TestTree::new("disk1")?;
        tree.create_file("a.txt", "alpha")?;
        tree.create_file("b.txt", "beta")?;
        index::execute(&tree.context, &tree.scan_args(), IndexOptions::default())?;
        tree.create_file("c.txt", "gamma")?;

        let report = execute(&tree.context, &tree.scan_args(), true)?;
        assert_eq!(report.entries.len(), 3);
        assert_eq!(report.flagged_count(), 3);
        assert_eq!(tree.context.open_catalog()?.count()?, 2);
        Ok(())
    }
}
