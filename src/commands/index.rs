use anyhow::{Context, Result};

use crate::InventoryContext;
use crate::cli::ScanArgs;
use crate::output::report::{ListingRow, print_listing, summary_line};
use crate::output::{self, ConsoleReporter};
use crate::reconcile::{Overrides, ReconcileOptions, ReconciliationEngine, RunMode, RunStats};

/// Flags of `finv index` beyond the scan root and source.
#[derive(Debug, Clone, Default)]
pub struct IndexOptions {
    /// Classification from `--category`, `--label` and friends
    pub overrides: Overrides,
    /// `--reindex-all`: hash every file regardless of metadata matches
    pub reindex_all: bool,
    /// `--dry-run`: plan only, list what would be hashed
    pub dry_run: bool,
}

/// Walks, hashes what the catalog cannot vouch for, and records the results.
///
/// Returns the run counters; a dry run returns the counters the plan implies
/// with nothing hashed.
///
/// # Errors
///
/// Returns an error if no source is known, the walk fails, a file cannot be
/// hashed, or the catalog cannot be read or written.
pub fn execute(ctx: &InventoryContext, scan: &ScanArgs, options: IndexOptions) -> Result<RunStats> {
    let source = ctx.resolve_source(scan.source.as_deref())?;
    let root = ctx.resolve_root(scan.path.as_deref())?;
    let mut catalog = ctx.open_catalog()?;

    let walk = super::scan(ctx, &root, &source)?;
    if walk.is_empty() {
        output::info("No files found");
        return Ok(RunStats::default());
    }

    let reconcile = ReconcileOptions {
        reindex_discovered: options.reindex_all || ctx.config.scan.reindex_discovered,
        match_mtime: ctx.config.scan.match_mtime,
        overrides: options.overrides,
        mode: RunMode::Commit,
    };
    let mut engine = ReconciliationEngine::new(&mut catalog, reconcile);
    let plan = engine
        .plan(walk.into_descriptors())
        .context("Failed to look up files in the catalog")?;

    if options.dry_run {
        output::action("Dry run:", "nothing will be hashed or written");
        let rows: Vec<_> = plan.to_process().map(ListingRow::new).collect();
        print_listing(&rows);
        let stats = RunStats {
            new: plan.process_count(),
            skipped: plan.skip_count(),
            ..RunStats::default()
        };
        println!(
            "\nTo process: {}   Unchanged: {}",
            plan.process_count(),
            plan.skip_count()
        );
        return Ok(stats);
    }

    if plan.process_count() == 0 {
        output::info("No new files found");
    } else if output::get_verbosity() == output::Verbosity::Verbose {
        let rows: Vec<_> = plan.to_process().map(ListingRow::new).collect();
        print_listing(&rows);
    }

    let report = engine.execute(plan, &mut ConsoleReporter::new())?;
    if report.stats.changed > 0 {
        output::warning(&format!(
            "{} file(s) changed content since they were last indexed",
            report.stats.changed
        ));
    }
    println!("\n{}", summary_line(&report.stats));
    Ok(report.stats)
}
