use super::disposition::{Disposition, RunStats};
use super::ScanPlan;

/// Receives reconciliation events as they happen.
///
/// The engine knows nothing about rendering; progress bars, summaries and
/// warnings all live behind this trait. Every method has an empty default.
pub trait ReconcileObserver {
    /// Called once the cheap-match tier has split the descriptors.
    fn on_plan(&mut self, _plan: &ScanPlan) {}

    /// Called after each file is resolved (and, outside preview, written).
    fn on_disposition(&mut self, _disposition: &Disposition) {}

    /// Called once after the last file.
    fn on_finish(&mut self, _stats: &RunStats) {}
}

/// Observer that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl ReconcileObserver for NoopObserver {}
