use crate::storage::FileRecord;

/// How one walked file was resolved against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispositionKind {
    /// First time this `(source, path)` has been seen.
    New,
    /// Cheap metadata match; not rehashed, `last_checked` refreshed.
    Unchanged,
    /// Rehashed and the digest matched the recorded identity.
    ContentConfirmedUnchanged,
    /// Rehashed and the digest differs from what was recorded at this path.
    /// A new identity was created; the old row is untouched.
    ContentChanged {
        /// Digest of the most recently checked earlier identity
        previous_digest: String,
    },
    /// Cheap metadata match during a preview run; nothing refreshed.
    Skipped,
}

impl DispositionKind {
    /// Short label used in listings and logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Unchanged => "unchanged",
            Self::ContentConfirmedUnchanged => "confirmed",
            Self::ContentChanged { .. } => "changed",
            Self::Skipped => "skipped",
        }
    }
}

/// Outcome of reconciling one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Disposition {
    /// Which way the file was resolved
    pub kind: DispositionKind,
    /// Record as it was (or, in preview, would have been) written
    pub record: FileRecord,
    /// Whether the content digest was computed during this run
    pub hashed: bool,
}

/// Run-level counters. Never persisted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    /// Hashed with no earlier identity at the path
    pub new: usize,
    /// Digest confirmed against an existing identity
    pub previous: usize,
    /// Hashed to a digest different from the one recorded at the path
    pub changed: usize,
    /// Cheap-matched and not rehashed
    pub skipped: usize,
    /// Files whose content was read this run
    pub hashed: usize,
    /// Total bytes read while hashing
    pub bytes_hashed: u64,
}

impl RunStats {
    pub(super) fn record(&mut self, disposition: &Disposition) {
        match disposition.kind {
            DispositionKind::New => self.new += 1,
            DispositionKind::ContentConfirmedUnchanged => self.previous += 1,
            DispositionKind::ContentChanged { .. } => self.changed += 1,
            DispositionKind::Unchanged | DispositionKind::Skipped => self.skipped += 1,
        }
        if disposition.hashed {
            self.hashed += 1;
        }
    }

    /// Files that went through the confirm tier.
    #[must_use]
    pub const fn processed(&self) -> usize {
        self.new + self.previous + self.changed
    }
}
