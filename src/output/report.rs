use std::fmt::Write as _;

use chrono::{DateTime, Utc};
use colored::Colorize;

use super::{Progress, Verbosity, get_verbosity, warning};
use crate::reconcile::{Disposition, DispositionKind, ReconcileObserver, RunStats, ScanPlan};
use crate::redundancy::HealthReport;
use crate::storage::ScanDescriptor;
use crate::utils::formatters::{format_health, format_kilobytes, format_listing_time};

const LISTING_HEADER: &str = "Discovered          Modified            Size (KB)    Type        Name";

/// One line of a directory-grouped listing.
#[derive(Debug, Clone)]
pub struct ListingRow<'a> {
    /// File being listed
    pub descriptor: &'a ScanDescriptor,
    /// First-seen time from the catalog, or the scan time for unknown files
    pub discovered: DateTime<Utc>,
    /// Trailing annotation such as `[new]`, empty for none
    pub note: String,
}

impl<'a> ListingRow<'a> {
    /// Row with no note, dated by the scan time.
    #[must_use]
    pub fn new(descriptor: &'a ScanDescriptor) -> Self {
        Self {
            descriptor,
            discovered: descriptor.scan_time,
            note: String::new(),
        }
    }
}

/// Renders rows grouped under a heading per parent directory, with a column
/// header after each heading. Rows must already be in walk order.
#[must_use]
pub fn render_listing(rows: &[ListingRow<'_>]) -> String {
    let mut out = String::new();
    let mut current_dir: Option<&str> = None;

    for row in rows {
        let dir = row.descriptor.parent_dir();
        if current_dir != Some(dir) {
            let _ = write!(out, "\n{dir}\n{LISTING_HEADER}\n");
            current_dir = Some(dir);
        }
        let _ = write!(
            out,
            "{}    {}    {}    {:<8}    {}",
            format_listing_time(row.discovered),
            format_listing_time(row.descriptor.modified),
            format_kilobytes(row.descriptor.size),
            row.descriptor.file_type,
            row.descriptor.name
        );
        if !row.note.is_empty() {
            let _ = write!(out, "  {}", row.note);
        }
        out.push('\n');
    }
    out
}

/// [`render_listing`] to stdout.
pub fn print_listing(rows: &[ListingRow<'_>]) {
    print!("{}", render_listing(rows));
}

/// `New: N   Previous: N   Changed: N   Skipped: N`
#[must_use]
pub fn summary_line(stats: &RunStats) -> String {
    format!(
        "New: {}   Previous: {}   Changed: {}   Skipped: {}",
        stats.new, stats.previous, stats.changed, stats.skipped
    )
}

/// Health block for one source; with `list`, every at-risk path follows.
#[must_use]
pub fn render_health(source: &str, report: &HealthReport, list: bool) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Source:        {source}");
    let _ = writeln!(out, "Found:         {}", report.found);
    let _ = writeln!(out, "Not found:     {}", report.not_found);
    let _ = writeln!(out, "Not indexed:   {}", report.not_indexed);
    let _ = writeln!(out, "Health:        {}", format_health(report.health()));

    if list && !report.without_other_sources.is_empty() {
        let _ = writeln!(out, "\nWithout other sources:");
        for record in &report.without_other_sources {
            let _ = writeln!(out, "    {}", record.path);
        }
    }
    out
}

/// Observer that draws hashing progress and surfaces content changes.
pub struct ConsoleReporter {
    progress: Option<Progress>,
}

impl Default for ConsoleReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsoleReporter {
    /// Reporter with no progress line until a plan arrives.
    #[must_use]
    pub const fn new() -> Self {
        Self { progress: None }
    }
}

impl ReconcileObserver for ConsoleReporter {
    fn on_plan(&mut self, plan: &ScanPlan) {
        let total = plan.process_count();
        if total > 0 && get_verbosity() != Verbosity::Quiet {
            self.progress = Some(Progress::new("Hashing files", total));
        }
    }

    fn on_disposition(&mut self, disposition: &Disposition) {
        if disposition.hashed
            && let Some(progress) = self.progress.as_mut()
        {
            progress.advance(disposition.record.size);
        }

        if let DispositionKind::ContentChanged { previous_digest } = &disposition.kind {
            warning(&format!(
                "Content changed: {} (was {previous_digest})",
                disposition.record.path
            ));
        } else if get_verbosity() == Verbosity::Verbose && disposition.hashed {
            eprintln!(
                "{:>9} {}",
                disposition.kind.label().dimmed(),
                disposition.record.path
            );
        }
    }

    fn on_finish(&mut self, _stats: &RunStats) {
        if let Some(mut progress) = self.progress.take() {
            progress.finish();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn descriptor(path: &str, size: u64) -> ScanDescriptor {
        let at = Utc.timestamp_opt(1_600_000_000, 0).single().unwrap_or_default();
        ScanDescriptor {
            source: "disk1".into(),
            path: path.into(),
            fs_path: path.into(),
            name: path.rsplit('/').next().unwrap_or(path).into(),
            extension: "jpg".into(),
            file_type: "image".into(),
            size,
            modified: at,
            scan_time: at,
        }
    }

    #[test]
    fn test_listing_groups_by_directory() {
        let files = [
            descriptor("/photos/a.jpg", 2_000),
            descriptor("/photos/b.jpg", 3_000),
            descriptor("/photos/2020/c.jpg", 500),
        ];
        let mut rows: Vec<_> = files.iter().map(ListingRow::new).collect();
        rows[1].note = "[new]".into();

        let text = render_listing(&rows);
        assert_eq!(text.matches(LISTING_HEADER).count(), 2);
        assert!(text.contains("\n/photos\n"));
        assert!(text.contains("\n/photos/2020\n"));
        assert!(text.contains("b.jpg  [new]"));
        let a = text.find("a.jpg").unwrap_or(usize::MAX);
        let c = text.find("c.jpg").unwrap_or(0);
        assert!(a < c);
    }

    #[test]
    fn test_summary_line() {
        let stats = RunStats {
            new: 2,
            previous: 1,
            changed: 0,
            skipped: 5,
            ..RunStats::default()
        };
        assert_eq!(
            summary_line(&stats),
            "New: 2   Previous: 1   Changed: 0   Skipped: 5"
        );
    }

    #[test]
    fn test_render_health_lists_only_on_request() {
        let report = HealthReport {
            found: 7,
            not_found: 3,
            ..HealthReport::default()
        };
        let text = render_health("disk1", &report, true);
        assert!(text.contains("Health:        70.0%"));
        assert!(!text.contains("Without other sources"));

        let empty = render_health("disk1", &HealthReport::default(), false);
        assert!(empty.contains("n/a"));
    }
}
