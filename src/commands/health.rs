use anyhow::Result;

use crate::InventoryContext;
use crate::cli::ScanArgs;
use crate::output::{self, report::render_health};
use crate::redundancy::{HealthReport, RedundancyAnalyzer};

/// Prints how many of the scanned files have a copy on another source.
///
/// # Errors
///
/// Returns an error if no source is known, the walk fails, or the catalog
/// cannot be read.
pub fn execute(ctx: &InventoryContext, scan: &ScanArgs, list: bool) -> Result<HealthReport> {
    let source = ctx.resolve_source(scan.source.as_deref())?;
    let root = ctx.resolve_root(scan.path.as_deref())?;
    let catalog = ctx.open_catalog()?;

    let walk = super::scan(ctx, &root, &source)?;
    let report = RedundancyAnalyzer::new(&catalog).health(walk.descriptors())?;

    print!("{}", render_health(&source, &report, list));
    if report.not_found > 0 && !list {
        output::info("Run with --list to see the files without other sources");
    }
    if report.not_indexed > 0 {
        output::info(&format!(
            "{} file(s) are not indexed yet; run `finv index` first",
            report.not_indexed
        ));
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::index::{self, IndexOptions};
    use crate::test_utils::fixtures::TestTree;

    #[test]
    fn test_health_across_two_sources() -> Result<()> {
        let tree = TestTree::new("laptop")?;
        tree.create_file("work/shared.txt", "same bytes")?;
        tree.create_file("work/only-here.txt", "unique bytes")?;
        tree.create_file("backup/shared-copy.txt", "same bytes")?;

        let mut laptop = tree.scan_args();
        laptop.path = Some(tree.root().join("work"));
        index::execute(&tree.context, &laptop, IndexOptions::default())?;

        let mut backup = tree.scan_args();
        backup.path = Some(tree.root().join("backup"));
        backup.source = Some("usb".into());
        index::execute(&tree.context, &backup, IndexOptions::default())?;

        let report = execute(&tree.context, &laptop, true)?;
        assert_eq!(report.found, 1);
        assert_eq!(report.not_found, 1);
        assert_eq!(report.health(), Some(50.0));
        assert!(report.without_other_sources[0].path.ends_with("only-here.txt"));
        Ok(())
    }
}
