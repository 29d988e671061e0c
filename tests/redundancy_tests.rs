mod common;

use anyhow::Result;
use common::{Fixture, index};
use fileinventory::reconcile::ReconcileOptions;
use fileinventory::redundancy::{NewFileStatus, RedundancyAnalyzer};

/// Two sources on one machine: `laptop/` and `usb/` under the fixture root.
fn two_sources(fixture: &Fixture) -> Result<()> {
    fixture.write("laptop/shared.jpg", "same picture", 1_600_000_000)?;
    fixture.write("laptop/unique.jpg", "only here", 1_600_000_000)?;
    fixture.write("usb/copy-of-shared.jpg", "same picture", 1_600_000_100)?;

    let mut catalog = fixture.catalog()?;
    index(
        &mut catalog,
        fixture.walk_dir(&fixture.root().join("laptop"), "laptop")?,
        ReconcileOptions::default(),
    )?;
    index(
        &mut catalog,
        fixture.walk_dir(&fixture.root().join("usb"), "usb")?,
        ReconcileOptions::default(),
    )?;
    Ok(())
}

#[test]
fn test_shared_digest_lists_both_sources() -> Result<()> {
    let fixture = Fixture::new()?;
    two_sources(&fixture)?;
    let catalog = fixture.catalog()?;
    let analyzer = RedundancyAnalyzer::new(&catalog);

    let laptop = analyzer.health(&fixture.walk_dir(&fixture.root().join("laptop"), "laptop")?)?;
    assert_eq!(laptop.found, 1);
    assert_eq!(laptop.redundant[0].other_sources[0].source, "usb");
    assert_eq!(laptop.without_other_sources.len(), 1);
    assert!(laptop.without_other_sources[0].path.ends_with("unique.jpg"));

    let usb = analyzer.health(&fixture.walk_dir(&fixture.root().join("usb"), "usb")?)?;
    assert_eq!(usb.health(), Some(100.0));
    assert_eq!(usb.redundant[0].other_sources[0].source, "laptop");
    Ok(())
}

#[test]
fn test_unindexed_files_do_not_count_against_health() -> Result<()> {
    let fixture = Fixture::new()?;
    two_sources(&fixture)?;
    fixture.write("laptop/later.jpg", "added after indexing", 1_600_000_200)?;

    let catalog = fixture.catalog()?;
    let report = RedundancyAnalyzer::new(&catalog)
        .health(&fixture.walk_dir(&fixture.root().join("laptop"), "laptop")?)?;
    assert_eq!(report.not_indexed, 1);
    assert_eq!(report.health(), Some(50.0));
    Ok(())
}

#[test]
fn test_new_files_finds_similar_file_on_other_source() -> Result<()> {
    let fixture = Fixture::new()?;
    two_sources(&fixture)?;
    // Same size and mtime as the usb copy, but never indexed for this source.
    fixture.write("desktop/renamed.jpg", "same picture", 1_600_000_100)?;
    fixture.write("desktop/brand-new.jpg", "nobody has this", 1_700_000_000)?;

    let catalog = fixture.catalog()?;
    let report = RedundancyAnalyzer::new(&catalog)
        .new_files(&fixture.walk_dir(&fixture.root().join("desktop"), "desktop")?)?;

    let similar = report
        .entries
        .iter()
        .find(|(d, _)| d.name == "renamed.jpg")
        .map(|(_, status)| status);
    assert!(matches!(similar, Some(NewFileStatus::Similar { matches }) if matches[0].source == "usb"));
    assert_eq!(report.flagged_count(), 1);
    Ok(())
}
