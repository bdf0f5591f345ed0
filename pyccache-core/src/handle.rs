//! Storage handle: connection ownership, configuration, and schema.

use std::path::Path;

use pyccache_db::Connection;
use tracing::debug;

use crate::error::{CacheError, CacheResult};

/// Configuration applied to every connection before first use.
///
/// * `page_size=16384` -- fixed page size for large-blob locality.
/// * `journal_mode=WAL` -- readers never block the writer and vice versa.
/// * `synchronous=NORMAL` -- WAL commits survive a process crash without
///   paying a full fsync per transaction (an OS crash may lose the tail).
/// * `mmap_size` -- bounded memory-mapped reads.
/// * `wal_autocheckpoint` -- periodic checkpointing so the WAL file stays
///   bounded under sustained write traffic.
const PRAGMA_SQL: &str = "\
    PRAGMA page_size=16384;\
    PRAGMA journal_mode=WAL;\
    PRAGMA synchronous=NORMAL;\
    PRAGMA mmap_size=134217728;\
    PRAGMA wal_autocheckpoint=1000;";

/// One row per cached module; the path is the unique key. `STRICT` makes
/// the engine reject writes of the wrong type instead of coercing them.
const SCHEMA_SQL: &str =
    "CREATE TABLE IF NOT EXISTS pyc (path TEXT PRIMARY KEY, data BLOB NOT NULL) STRICT";

/// Version tag stamped into the engine's `user_version` metadata so an
/// incompatible on-disk layout is detected on open (detection only --
/// migration is a caller concern).
const SCHEMA_VERSION: i64 = 1;

/// Owns the open connection to the storage file.
///
/// Created by [`Cache::open`](crate::Cache::open); the connection closes
/// when the handle drops, which the facade sequences after statement
/// finalization.
pub(crate) struct StorageHandle {
    conn: Connection,
}

impl StorageHandle {
    /// Opens (creating if absent) the storage file, applies configuration,
    /// verifies the schema version, and ensures the schema. Fail-fast: any
    /// failure aborts the open with the first error encountered.
    pub(crate) fn open(path: &Path) -> CacheResult<Self> {
        let conn = Connection::open(path).map_err(CacheError::Open)?;
        conn.execute_batch(PRAGMA_SQL).map_err(CacheError::Config)?;
        Self::check_schema_version(&conn)?;
        conn.execute_batch(SCHEMA_SQL).map_err(CacheError::Schema)?;
        debug!(path = %path.display(), "cache storage ready");
        Ok(Self { conn })
    }

    /// Reads the `user_version` tag: a fresh file (0) is stamped with the
    /// current version, the current version passes, anything else is an
    /// incompatible on-disk format.
    fn check_schema_version(conn: &Connection) -> CacheResult<()> {
        let found = conn
            .query_row("PRAGMA user_version", &[], |stmt| Ok(stmt.column_i64(0)))
            .map_err(CacheError::Config)?;
        match found {
            0 => conn
                .execute_batch(&format!("PRAGMA user_version={SCHEMA_VERSION}"))
                .map_err(CacheError::Config),
            v if v == SCHEMA_VERSION => Ok(()),
            v => Err(CacheError::SchemaVersion {
                found: v,
                expected: SCHEMA_VERSION,
            }),
        }
    }

    /// Returns the connection for statement preparation.
    pub(crate) const fn conn(&self) -> &Connection {
        &self.conn
    }
}

impl std::fmt::Debug for StorageHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StorageHandle").finish_non_exhaustive()
    }
}
