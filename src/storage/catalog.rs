use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use super::schema::{self, RECORD_COLUMNS};
use super::{FileRecord, from_epoch_nanos, to_epoch_nanos};

/// Errors returned by catalog queries and writes.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The database file could not be opened or created.
    #[error("Could not open catalog at {path}: {source}")]
    Open {
        /// Database location
        path: PathBuf,
        /// Underlying SQLite error
        source: rusqlite::Error,
    },
    /// Failed to create the directory holding the database file.
    #[error("Could not create catalog directory {path}: {source}")]
    CreateDir {
        /// Directory that could not be created
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
    /// Database is locked by another writer.
    #[error("Catalog database is busy")]
    Busy,
    /// SQLite query failed.
    #[error("Catalog query failed: {0}")]
    Sql(rusqlite::Error),
}

impl From<rusqlite::Error> for CatalogError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(sql_err, _)
                if sql_err.code == rusqlite::ErrorCode::DatabaseBusy =>
            {
                Self::Busy
            }
            other => Self::Sql(other),
        }
    }
}

/// Persistent record store for [`FileRecord`]s.
///
/// One table, keyed by `(source, path, digest)`. Every write commits on its
/// own; there is no batching across files, so an interrupted run leaves every
/// already-processed file recorded.
pub struct Catalog {
    connection: Connection,
    path: Option<PathBuf>,
}

impl Catalog {
    /// Open (or create) the catalog database at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created, the file
    /// cannot be opened as SQLite, or the schema cannot be applied.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CatalogError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|source| CatalogError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let connection = Connection::open(path).map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Opened catalog at {}", path.display());

        let catalog = Self {
            connection,
            path: Some(path.to_path_buf()),
        };
        catalog.apply_pragmas()?;
        schema::apply_schema(&catalog.connection)?;
        Ok(catalog)
    }

    /// Open a throwaway catalog that lives only in memory.
    ///
    /// # Errors
    ///
    /// Returns an error if SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, CatalogError> {
        let connection = Connection::open_in_memory()?;
        schema::apply_schema(&connection)?;
        Ok(Self {
            connection,
            path: None,
        })
    }

    /// Location of the database file, `None` for in-memory catalogs.
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// The database file at `path` together with the journal files SQLite
    /// keeps next to it.
    #[must_use]
    pub fn database_files(path: &Path) -> Vec<PathBuf> {
        let mut files = vec![path.to_path_buf()];
        for suffix in ["-wal", "-shm", "-journal"] {
            let mut name = path.as_os_str().to_owned();
            name.push(suffix);
            files.push(PathBuf::from(name));
        }
        files
    }

    fn apply_pragmas(&self) -> Result<(), CatalogError> {
        self.connection.execute_batch(
            "PRAGMA journal_mode=WAL;
             PRAGMA synchronous = NORMAL;
             PRAGMA busy_timeout=5000;
             PRAGMA temp_store=MEMORY;",
        )?;
        Ok(())
    }

    /// Exact lookup by natural key.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_by_digest(
        &self,
        source: &str,
        path: &str,
        digest: &str,
    ) -> Result<Option<FileRecord>, CatalogError> {
        self.query_one(
            &format!(
                "SELECT {RECORD_COLUMNS} FROM found_files
                 WHERE source = ?1 AND path = ?2 AND digest = ?3"
            ),
            params![source, path, digest],
        )
    }

    /// Most recently checked record at `(source, path)` with the given size.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_by_size(
        &self,
        source: &str,
        path: &str,
        size: u64,
    ) -> Result<Option<FileRecord>, CatalogError> {
        self.query_one(
            &format!(
                "SELECT {RECORD_COLUMNS} FROM found_files
                 WHERE source = ?1 AND path = ?2 AND size = ?3
                 ORDER BY last_checked_ns DESC LIMIT 1"
            ),
            params![source, path, size_param(size)],
        )
    }

    /// Metadata-only match: same source, path, size and modification time.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_cheap_match(
        &self,
        source: &str,
        path: &str,
        size: u64,
        modified: DateTime<Utc>,
    ) -> Result<Option<FileRecord>, CatalogError> {
        self.query_one(
            &format!(
                "SELECT {RECORD_COLUMNS} FROM found_files
                 WHERE source = ?1 AND path = ?2 AND size = ?3 AND modified_ns = ?4
                 ORDER BY last_checked_ns DESC LIMIT 1"
            ),
            params![source, path, size_param(size), to_epoch_nanos(modified)],
        )
    }

    /// Every identity ever recorded at `(source, path)`, newest check first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_by_path(&self, source: &str, path: &str) -> Result<Vec<FileRecord>, CatalogError> {
        self.query_many(
            &format!(
                "SELECT {RECORD_COLUMNS} FROM found_files
                 WHERE source = ?1 AND path = ?2
                 ORDER BY last_checked_ns DESC"
            ),
            params![source, path],
        )
    }

    /// Records with the given digest under any source other than `exclude_source`.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_in_other_sources(
        &self,
        digest: &str,
        exclude_source: &str,
    ) -> Result<Vec<FileRecord>, CatalogError> {
        self.query_many(
            &format!(
                "SELECT {RECORD_COLUMNS} FROM found_files
                 WHERE digest = ?1 AND source != ?2
                 ORDER BY source, path"
            ),
            params![digest, exclude_source],
        )
    }

    /// Records on any source sharing size and modification time.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn find_similar(
        &self,
        size: u64,
        modified: DateTime<Utc>,
    ) -> Result<Vec<FileRecord>, CatalogError> {
        self.query_many(
            &format!(
                "SELECT {RECORD_COLUMNS} FROM found_files
                 WHERE size = ?1 AND modified_ns = ?2
                 ORDER BY source, path"
            ),
            params![size_param(size), to_epoch_nanos(modified)],
        )
    }

    /// Insert a record, or update every mutable column of the row that
    /// already holds its `(source, path, digest)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub fn upsert(&self, record: &FileRecord) -> Result<(), CatalogError> {
        self.connection
            .prepare_cached(
                "INSERT INTO found_files (source, path, digest, name, extension, type, size,
                                          modified_ns, category, subcategory, label, tags,
                                          discovered_ns, last_checked_ns)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                 ON CONFLICT (source, path, digest) DO UPDATE SET
                    name = excluded.name,
                    extension = excluded.extension,
                    type = excluded.type,
                    size = excluded.size,
                    modified_ns = excluded.modified_ns,
                    category = excluded.category,
                    subcategory = excluded.subcategory,
                    label = excluded.label,
                    tags = excluded.tags,
                    discovered_ns = excluded.discovered_ns,
                    last_checked_ns = excluded.last_checked_ns",
            )?
            .execute(params![
                record.source,
                record.path,
                record.digest,
                record.name,
                record.extension,
                record.file_type,
                size_param(record.size),
                to_epoch_nanos(record.modified),
                record.category,
                record.subcategory,
                record.label,
                record.tags,
                to_epoch_nanos(record.discovered),
                to_epoch_nanos(record.last_checked),
            ])?;
        Ok(())
    }

    /// Total number of rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count(&self) -> Result<u64, CatalogError> {
        let count: i64 = self
            .connection
            .query_row("SELECT COUNT(*) FROM found_files", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    /// Number of rows recorded for one source.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn count_for_source(&self, source: &str) -> Result<u64, CatalogError> {
        let count: i64 = self.connection.query_row(
            "SELECT COUNT(*) FROM found_files WHERE source = ?1",
            params![source],
            |row| row.get(0),
        )?;
        Ok(u64::try_from(count).unwrap_or(0))
    }

    fn query_one(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Option<FileRecord>, CatalogError> {
        let record = self
            .connection
            .prepare_cached(sql)?
            .query_row(params, record_from_row)
            .optional()?;
        Ok(record)
    }

    fn query_many(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<FileRecord>, CatalogError> {
        let mut stmt = self.connection.prepare_cached(sql)?;
        let rows = stmt
            .query_map(params, record_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

#[allow(clippy::cast_possible_wrap)]
const fn size_param(size: u64) -> i64 {
    size as i64
}

#[allow(clippy::cast_sign_loss)]
fn record_from_row(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
    Ok(FileRecord {
        source: row.get(0)?,
        path: row.get(1)?,
        digest: row.get(2)?,
        name: row.get(3)?,
        extension: row.get(4)?,
        file_type: row.get(5)?,
        size: row.get::<_, i64>(6)? as u64,
        modified: from_epoch_nanos(row.get(7)?),
        category: row.get(8)?,
        subcategory: row.get(9)?,
        label: row.get(10)?,
        tags: row.get(11)?,
        discovered: from_epoch_nanos(row.get(12)?),
        last_checked: from_epoch_nanos(row.get(13)?),
    })
}
