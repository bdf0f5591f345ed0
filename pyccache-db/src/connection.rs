//! Safe wrapper around a `SQLite` database connection.

use std::ffi::{CStr, CString};
use std::os::raw::{c_char, c_uint, c_void};
use std::path::Path;

use super::error::{DbError, DbResult};
use super::ffi;
use super::statement::{Statement, StepResult};
use super::value::Value;

/// A `SQLite` database connection.
///
/// The connection is closed when dropped (`sqlite3_close_v2`, which defers
/// the actual close until any statements still attached to the handle are
/// finalized). It is **not** `Sync` -- all access must happen from a
/// single thread at a time.
pub struct Connection {
    /// Raw `sqlite3*` handle.
    db: *mut c_void,
}

// Safety: Connection is not Sync but is Send -- it can be moved to another
// thread as long as only one thread accesses it at a time. The handle is
// opened with SQLITE_OPEN_FULLMUTEX so the engine serialises its own
// internals regardless.
unsafe impl Send for Connection {}

impl Connection {
    /// Opens (or creates) a read-write database at `path`.
    ///
    /// The path is passed to the engine UTF-8 encoded on all platforms.
    ///
    /// # Errors
    ///
    /// Returns the engine's open error (permissions, disk, corruption),
    /// or an error for a path containing an interior NUL byte.
    pub fn open(path: &Path) -> DbResult<Self> {
        let path_str = path.to_string_lossy();
        let c_path = CString::new(path_str.as_bytes())
            .map_err(|e| DbError::new(ffi::SQLITE_ERROR, format!("invalid path: {e}")))?;

        let flags =
            ffi::SQLITE_OPEN_READWRITE | ffi::SQLITE_OPEN_CREATE | ffi::SQLITE_OPEN_FULLMUTEX;

        let mut db: *mut c_void = std::ptr::null_mut();
        let rc = unsafe { ffi::sqlite3_open_v2(c_path.as_ptr(), &mut db, flags, std::ptr::null()) };
        if rc != ffi::SQLITE_OK {
            // If open failed but we got a handle, extract the error and close.
            let msg = if db.is_null() {
                format!("sqlite3_open_v2 returned {rc}")
            } else {
                let m = Self::errmsg_raw(db);
                unsafe {
                    ffi::sqlite3_close_v2(db);
                }
                m
            };
            return Err(DbError::new(rc, msg));
        }
        Ok(Self { db })
    }

    /// Opens an in-memory database.
    #[cfg(test)]
    pub fn open_in_memory() -> DbResult<Self> {
        Self::open(Path::new(":memory:"))
    }

    // ── execute_batch ───────────────────────────────────────────────────

    /// Executes one or more SQL statements separated by semicolons.
    ///
    /// No result rows are returned. This is suitable for DDL, PRAGMAs, and
    /// multi-statement scripts.
    ///
    /// # Errors
    ///
    /// Returns the engine error for the first failing statement.
    pub fn execute_batch(&self, sql: &str) -> DbResult<()> {
        let c_sql = CString::new(sql)
            .map_err(|e| DbError::new(ffi::SQLITE_ERROR, format!("nul in SQL: {e}")))?;
        let mut errmsg: *mut c_char = std::ptr::null_mut();
        let rc = unsafe { ffi::sqlite3_exec(self.db, c_sql.as_ptr(), &mut errmsg) };
        if rc != ffi::SQLITE_OK {
            let msg = if errmsg.is_null() {
                self.errmsg()
            } else {
                let s = unsafe { CStr::from_ptr(errmsg) }.to_string_lossy().into_owned();
                unsafe {
                    ffi::sqlite3_free(errmsg.cast());
                }
                s
            };
            return Err(DbError::new(rc, msg));
        }
        Ok(())
    }

    // ── prepare ─────────────────────────────────────────────────────────

    /// Prepares a single SQL statement.
    ///
    /// # Errors
    ///
    /// Returns the engine's compile error for invalid SQL.
    pub fn prepare(&self, sql: &str) -> DbResult<Statement> {
        self.prepare_with_flags(sql, 0)
    }

    /// Prepares a single SQL statement marked persistent.
    ///
    /// The engine is told to keep the compiled program optimised for
    /// repeated reuse (`SQLITE_PREPARE_PERSISTENT`) rather than treating
    /// it as one-shot.
    ///
    /// # Errors
    ///
    /// Returns the engine's compile error for invalid SQL.
    pub fn prepare_persistent(&self, sql: &str) -> DbResult<Statement> {
        self.prepare_with_flags(sql, ffi::SQLITE_PREPARE_PERSISTENT)
    }

    fn prepare_with_flags(&self, sql: &str, flags: c_uint) -> DbResult<Statement> {
        let c_sql = CString::new(sql)
            .map_err(|e| DbError::new(ffi::SQLITE_ERROR, format!("nul in SQL: {e}")))?;
        let mut stmt: *mut c_void = std::ptr::null_mut();
        let rc = unsafe {
            ffi::sqlite3_prepare_v3(
                self.db,
                c_sql.as_ptr(),
                -1,
                flags,
                &mut stmt,
                std::ptr::null_mut(),
            )
        };
        if rc != ffi::SQLITE_OK || stmt.is_null() {
            return Err(DbError::new(rc, self.errmsg()));
        }
        Ok(unsafe { Statement::from_raw(stmt, self.db) })
    }

    // ── execute (single statement) ──────────────────────────────────────

    /// Prepares and executes a single SQL statement with the given
    /// parameters.
    ///
    /// Returns the number of rows changed.
    ///
    /// # Errors
    ///
    /// Returns the engine error from prepare, bind, or step.
    pub fn execute(&self, sql: &str, params: &[Value]) -> DbResult<usize> {
        let mut stmt = self.prepare(sql)?;
        stmt.bind_values(params)?;
        stmt.step()?;
        Ok(self.changes())
    }

    // ── query_row ───────────────────────────────────────────────────────

    /// Prepares and executes a statement, mapping exactly one result row.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or returns no row.
    pub fn query_row<T>(
        &self,
        sql: &str,
        params: &[Value],
        mapper: impl FnOnce(&Statement) -> DbResult<T>,
    ) -> DbResult<T> {
        let mut stmt = self.prepare(sql)?;
        stmt.bind_values(params)?;
        match stmt.step()? {
            StepResult::Row => mapper(&stmt),
            StepResult::Done => Err(DbError::new(ffi::SQLITE_DONE, "query returned no rows")),
        }
    }

    /// Like [`query_row`](Self::query_row) but returns `Ok(None)` when no
    /// row is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the query itself fails.
    pub fn query_row_optional<T>(
        &self,
        sql: &str,
        params: &[Value],
        mapper: impl FnOnce(&Statement) -> DbResult<T>,
    ) -> DbResult<Option<T>> {
        let mut stmt = self.prepare(sql)?;
        stmt.bind_values(params)?;
        match stmt.step()? {
            StepResult::Row => mapper(&stmt).map(Some),
            StepResult::Done => Ok(None),
        }
    }

    // ── changes ─────────────────────────────────────────────────────────

    /// Returns the number of rows changed by the most recent statement.
    #[must_use]
    pub fn changes(&self) -> usize {
        let n = unsafe { ffi::sqlite3_changes(self.db) };
        usize::try_from(n).unwrap_or(0)
    }

    // ── Error helpers ───────────────────────────────────────────────────

    fn errmsg(&self) -> String {
        Self::errmsg_raw(self.db)
    }

    fn errmsg_raw(db: *mut c_void) -> String {
        unsafe {
            let ptr = ffi::sqlite3_errmsg(db);
            if ptr.is_null() {
                "unknown error".to_string()
            } else {
                CStr::from_ptr(ptr).to_string_lossy().into_owned()
            }
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection").finish_non_exhaustive()
    }
}

impl Drop for Connection {
    fn drop(&mut self) {
        if !self.db.is_null() {
            unsafe {
                ffi::sqlite3_close_v2(self.db);
            }
            self.db = std::ptr::null_mut();
        }
    }
}
