/// SQLite-backed catalog of observed files.
pub mod catalog;
/// Table definitions and schema setup for the catalog database.
mod schema;

pub use catalog::{Catalog, CatalogError};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One observed file instance, as persisted in the catalog.
///
/// The natural key is `(source, path, digest)`. When the content at a path
/// changes, the new digest produces a new row and the old row stays behind as
/// history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Storage origin the path belongs to (a disk, a machine)
    pub source: String,
    /// Absolute path on the source
    pub path: String,
    /// Content digest, empty until computed
    pub digest: String,
    /// File name component of `path`
    pub name: String,
    /// Lowercased extension without the leading dot
    pub extension: String,
    /// Coarse type label derived from the extension
    pub file_type: String,
    /// Size in bytes as reported by filesystem metadata
    pub size: u64,
    /// Modification time from filesystem metadata
    pub modified: DateTime<Utc>,
    /// User-assigned category, empty when unset
    pub category: String,
    /// User-assigned subcategory, only set alongside a category
    pub subcategory: String,
    /// Free-form user label
    pub label: String,
    /// Free-form user tags
    pub tags: String,
    /// First time this identity was seen
    pub discovered: DateTime<Utc>,
    /// Most recent reconciliation of this identity
    pub last_checked: DateTime<Utc>,
}

impl FileRecord {
    /// Builds a brand-new identity for a descriptor whose digest is known.
    ///
    /// Classification fields start empty; `discovered` and `last_checked`
    /// are both set to `now`.
    #[must_use]
    pub fn from_descriptor(descriptor: &ScanDescriptor, digest: String, now: DateTime<Utc>) -> Self {
        Self {
            source: descriptor.source.clone(),
            path: descriptor.path.clone(),
            digest,
            name: descriptor.name.clone(),
            extension: descriptor.extension.clone(),
            file_type: descriptor.file_type.clone(),
            size: descriptor.size,
            modified: descriptor.modified,
            category: String::new(),
            subcategory: String::new(),
            label: String::new(),
            tags: String::new(),
            discovered: now,
            last_checked: now,
        }
    }

    /// Copies the volatile metadata of a fresh descriptor onto a known record.
    ///
    /// Identity fields (`source`, `path`, `digest`, `discovered`) and the
    /// user classification fields are left alone.
    pub fn refresh_from(&mut self, descriptor: &ScanDescriptor) {
        self.name.clone_from(&descriptor.name);
        self.extension.clone_from(&descriptor.extension);
        self.file_type.clone_from(&descriptor.file_type);
        self.size = descriptor.size;
        self.modified = descriptor.modified;
    }
}

/// A file found by the walker during one run. Never persisted directly.
///
/// `path` is the catalog key and may be a lossy rendering of a name that is
/// not valid UTF-8. Anything that touches the filesystem goes through
/// `fs_path` instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanDescriptor {
    /// Source the walk was run for
    pub source: String,
    /// Absolute path as stored in the catalog
    pub path: String,
    /// Real on-disk location, used for hashing
    pub fs_path: PathBuf,
    /// File name component of `path`
    pub name: String,
    /// Lowercased extension without the leading dot
    pub extension: String,
    /// Coarse type label derived from the extension
    pub file_type: String,
    /// Size in bytes from filesystem metadata
    pub size: u64,
    /// Modification time from filesystem metadata
    pub modified: DateTime<Utc>,
    /// When the walk that produced this descriptor started
    pub scan_time: DateTime<Utc>,
}

impl ScanDescriptor {
    /// Directory containing the file, as a string. Empty for bare file names.
    #[must_use]
    pub fn parent_dir(&self) -> &str {
        Path::new(&self.path)
            .parent()
            .and_then(Path::to_str)
            .unwrap_or("")
    }
}

/// Converts a timestamp to nanoseconds since the Unix epoch for storage.
///
/// Timestamps outside the representable range (years 1677..2262) saturate.
#[must_use]
pub fn to_epoch_nanos(timestamp: DateTime<Utc>) -> i64 {
    timestamp.timestamp_nanos_opt().unwrap_or_else(|| {
        if timestamp.timestamp() < 0 {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

/// Inverse of [`to_epoch_nanos`].
#[must_use]
pub fn from_epoch_nanos(nanos: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_nanos(nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn descriptor() -> ScanDescriptor {
        let modified = Utc.with_ymd_and_hms(2021, 3, 4, 5, 6, 7).unwrap();
        ScanDescriptor {
            source: "laptop".to_string(),
            path: "/data/movies/clip.mp4".to_string(),
            fs_path: PathBuf::from("/data/movies/clip.mp4"),
            name: "clip.mp4".to_string(),
            extension: "mp4".to_string(),
            file_type: "video".to_string(),
            size: 2048,
            modified,
            scan_time: modified,
        }
    }

    #[test]
    fn test_parent_dir() {
        assert_eq!(descriptor().parent_dir(), "/data/movies");

        let mut bare = descriptor();
        bare.path = "clip.mp4".to_string();
        assert_eq!(bare.parent_dir(), "");
    }

    #[test]
    fn test_from_descriptor_starts_unclassified() {
        let now = Utc::now();
        let record = FileRecord::from_descriptor(&descriptor(), "abc".to_string(), now);
        assert_eq!(record.digest, "abc");
        assert_eq!(record.discovered, now);
        assert_eq!(record.last_checked, now);
        assert!(record.category.is_empty());
        assert!(record.tags.is_empty());
    }

    #[test]
    fn test_refresh_keeps_identity_and_classification() {
        let then = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let mut record = FileRecord::from_descriptor(&descriptor(), "abc".to_string(), then);
        record.category = "family".to_string();

        let mut fresh = descriptor();
        fresh.size = 4096;
        fresh.file_type = "video".to_string();
        record.refresh_from(&fresh);

        assert_eq!(record.size, 4096);
        assert_eq!(record.discovered, then);
        assert_eq!(record.category, "family");
        assert_eq!(record.digest, "abc");
    }

    #[test]
    fn test_epoch_nanos_round_trip() {
        let ts = Utc.timestamp_opt(1_600_000_000, 123_456_789).unwrap();
        assert_eq!(from_epoch_nanos(to_epoch_nanos(ts)), ts);
    }
}
