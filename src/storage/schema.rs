use rusqlite::Connection;

use super::catalog::CatalogError;

/// Columns selected by every record query, in `record_from_row` order.
pub(super) const RECORD_COLUMNS: &str = "source, path, digest, name, extension, type, size, \
     modified_ns, category, subcategory, label, tags, discovered_ns, last_checked_ns";

pub(super) fn apply_schema(connection: &Connection) -> Result<(), CatalogError> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS found_files (
            source TEXT NOT NULL,
            path TEXT NOT NULL,
            digest TEXT NOT NULL,
            name TEXT NOT NULL,
            extension TEXT NOT NULL,
            type TEXT NOT NULL DEFAULT '',
            size INTEGER NOT NULL,
            modified_ns INTEGER NOT NULL,
            category TEXT NOT NULL DEFAULT '',
            subcategory TEXT NOT NULL DEFAULT '',
            label TEXT NOT NULL DEFAULT '',
            tags TEXT NOT NULL DEFAULT '',
            discovered_ns INTEGER NOT NULL,
            last_checked_ns INTEGER NOT NULL,
            UNIQUE(source, path, digest)
         );
         CREATE INDEX IF NOT EXISTS idx_found_files_cheap_match
            ON found_files (source, path, size, modified_ns);
         CREATE INDEX IF NOT EXISTS idx_found_files_digest
            ON found_files (digest, source);
         CREATE INDEX IF NOT EXISTS idx_found_files_size_modified
            ON found_files (size, modified_ns);",
    )?;
    Ok(())
}
