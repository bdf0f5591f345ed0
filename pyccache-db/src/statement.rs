//! Safe wrapper around a `SQLite` prepared statement.

use std::ffi::CStr;
use std::os::raw::{c_int, c_void};

use super::error::{DbError, DbResult};
use super::ffi;
use super::value::Value;

/// Result of a single `sqlite3_step` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepResult {
    /// A result row is available (`SQLITE_ROW`).
    Row,
    /// The statement has finished executing (`SQLITE_DONE`).
    Done,
}

/// Storage class of a result column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    /// 64-bit signed integer.
    Integer,
    /// IEEE floating point.
    Float,
    /// UTF-8 text.
    Text,
    /// Binary blob.
    Blob,
    /// SQL NULL.
    Null,
}

/// A prepared `SQLite` statement.
///
/// Statements are created via [`Connection::prepare`] (or
/// [`Connection::prepare_persistent`]) and finalized when dropped; use
/// [`finalize`](Self::finalize) to observe the engine's teardown result.
///
/// A statement holds mutable bind/step state between calls: after a step
/// reports a row, any blob or text pointers the row exposed stay valid
/// only until the next step or reset on the same statement. The column
/// readers here copy into owned memory before returning, so callers never
/// see the raw window.
///
/// [`Connection::prepare`]: super::Connection::prepare
/// [`Connection::prepare_persistent`]: super::Connection::prepare_persistent
pub struct Statement {
    /// Raw `sqlite3_stmt*` handle. Null only after explicit finalization.
    stmt: *mut c_void,
    /// Raw `sqlite3*` handle -- kept for error messages.
    db: *mut c_void,
}

// Safety: the wrapper enforces single-owner semantics; the raw pointers
// are not shared across threads. The owning Connection is not Sync, so
// statements will not cross threads concurrently.
unsafe impl Send for Statement {}

impl Statement {
    /// Creates a new `Statement` wrapping a raw pointer pair.
    ///
    /// # Safety
    ///
    /// `stmt` must be a valid, non-null `sqlite3_stmt*`.
    /// `db` must be the owning `sqlite3*` handle.
    pub(super) unsafe fn from_raw(stmt: *mut c_void, db: *mut c_void) -> Self {
        debug_assert!(!stmt.is_null());
        Self { stmt, db }
    }

    // ── Binding ─────────────────────────────────────────────────────────

    /// Binds UTF-8 text to parameter `idx` (1-indexed).
    ///
    /// The engine copies the bytes at bind time (`SQLITE_TRANSIENT`), so
    /// the caller's string does not need to outlive the call.
    ///
    /// # Errors
    ///
    /// Returns the engine's bind error (e.g. parameter index out of range).
    pub fn bind_text(&mut self, idx: usize, value: &str) -> DbResult<()> {
        let rc = unsafe {
            ffi::sqlite3_bind_text(
                self.stmt,
                idx as c_int,
                value.as_ptr().cast(),
                value.len() as c_int,
                ffi::SQLITE_TRANSIENT,
            )
        };
        self.check_ok(rc)
    }

    /// Binds a binary blob to parameter `idx` (1-indexed).
    ///
    /// The engine copies the bytes at bind time (`SQLITE_TRANSIENT`).
    /// Zero-length slices bind as an empty blob, not as NULL.
    ///
    /// # Errors
    ///
    /// Returns the engine's bind error.
    pub fn bind_blob(&mut self, idx: usize, value: &[u8]) -> DbResult<()> {
        // An empty slice must still produce a blob value: bind_blob with a
        // null/dangling pointer would bind NULL instead.
        let rc = if value.is_empty() {
            unsafe { ffi::sqlite3_bind_zeroblob(self.stmt, idx as c_int, 0) }
        } else {
            unsafe {
                ffi::sqlite3_bind_blob(
                    self.stmt,
                    idx as c_int,
                    value.as_ptr().cast(),
                    value.len() as c_int,
                    ffi::SQLITE_TRANSIENT,
                )
            }
        };
        self.check_ok(rc)
    }

    /// Binds a 64-bit integer to parameter `idx` (1-indexed).
    ///
    /// # Errors
    ///
    /// Returns the engine's bind error.
    pub fn bind_i64(&mut self, idx: usize, value: i64) -> DbResult<()> {
        let rc = unsafe { ffi::sqlite3_bind_int64(self.stmt, idx as c_int, value) };
        self.check_ok(rc)
    }

    /// Binds SQL NULL to parameter `idx` (1-indexed).
    ///
    /// # Errors
    ///
    /// Returns the engine's bind error.
    pub fn bind_null(&mut self, idx: usize) -> DbResult<()> {
        let rc = unsafe { ffi::sqlite3_bind_null(self.stmt, idx as c_int) };
        self.check_ok(rc)
    }

    /// Binds a slice of [`Value`]s to the statement parameters (1-indexed).
    ///
    /// # Errors
    ///
    /// Returns the engine's bind error for the first failing parameter.
    pub fn bind_values(&mut self, values: &[Value]) -> DbResult<()> {
        for (i, val) in values.iter().enumerate() {
            match val {
                Value::Integer(v) => self.bind_i64(i + 1, *v)?,
                Value::Blob(v) => self.bind_blob(i + 1, v)?,
                Value::Text(v) => self.bind_text(i + 1, v)?,
                Value::Null => self.bind_null(i + 1)?,
            }
        }
        Ok(())
    }

    // ── Stepping ────────────────────────────────────────────────────────

    /// Executes a single step.
    ///
    /// # Errors
    ///
    /// Returns the engine error for any result other than `SQLITE_ROW` or
    /// `SQLITE_DONE` (including `SQLITE_BUSY` when another writer holds
    /// the write lock).
    pub fn step(&mut self) -> DbResult<StepResult> {
        let rc = unsafe { ffi::sqlite3_step(self.stmt) };
        match rc {
            ffi::SQLITE_ROW => Ok(StepResult::Row),
            ffi::SQLITE_DONE => Ok(StepResult::Done),
            _ => Err(self.last_error(rc)),
        }
    }

    /// Resets the statement so it can be stepped again.
    ///
    /// Reset is the only transition out of the row-available state; any
    /// blob or text pointers the current row exposed become invalid.
    ///
    /// # Errors
    ///
    /// Returns the deferred error from the most recent step, if any.
    pub fn reset(&mut self) -> DbResult<()> {
        let rc = unsafe { ffi::sqlite3_reset(self.stmt) };
        self.check_ok(rc)
    }

    /// Clears all bound parameters back to NULL.
    ///
    /// Releases the engine's internal copies of previously bound blobs
    /// and text, so no buffer is retained between uses.
    ///
    /// # Errors
    ///
    /// Returns the engine error, which current engines never produce here.
    pub fn clear_bindings(&mut self) -> DbResult<()> {
        let rc = unsafe { ffi::sqlite3_clear_bindings(self.stmt) };
        self.check_ok(rc)
    }

    // ── Column reading ──────────────────────────────────────────────────

    /// Reads a column as `i64`.
    #[must_use]
    pub fn column_i64(&self, idx: usize) -> i64 {
        unsafe { ffi::sqlite3_column_int64(self.stmt, idx as c_int) }
    }

    /// Reads a column as a blob, copied into a fresh `Vec`.
    ///
    /// The copy happens before this call returns, inside the narrow
    /// validity window of the engine's row buffer. Returns an empty `Vec`
    /// for NULL.
    #[must_use]
    pub fn column_blob(&self, idx: usize) -> Vec<u8> {
        unsafe {
            let ptr = ffi::sqlite3_column_blob(self.stmt, idx as c_int);
            let len = ffi::sqlite3_column_bytes(self.stmt, idx as c_int);
            if ptr.is_null() || len <= 0 {
                return Vec::new();
            }
            std::slice::from_raw_parts(ptr.cast::<u8>(), len as usize).to_vec()
        }
    }

    /// Reads a column as a UTF-8 string. Returns an empty string for NULL.
    #[must_use]
    pub fn column_text(&self, idx: usize) -> String {
        unsafe {
            let ptr = ffi::sqlite3_column_text(self.stmt, idx as c_int);
            if ptr.is_null() {
                return String::new();
            }
            CStr::from_ptr(ptr).to_string_lossy().into_owned()
        }
    }

    /// Returns the storage class of column `idx`.
    #[must_use]
    pub fn column_type(&self, idx: usize) -> ColumnType {
        match unsafe { ffi::sqlite3_column_type(self.stmt, idx as c_int) } {
            ffi::SQLITE_INTEGER => ColumnType::Integer,
            ffi::SQLITE_FLOAT => ColumnType::Float,
            ffi::SQLITE_TEXT => ColumnType::Text,
            ffi::SQLITE_BLOB => ColumnType::Blob,
            _ => ColumnType::Null,
        }
    }

    /// Returns `true` if the column is SQL NULL.
    #[must_use]
    pub fn is_column_null(&self, idx: usize) -> bool {
        self.column_type(idx) == ColumnType::Null
    }

    // ── Teardown ────────────────────────────────────────────────────────

    /// Finalizes the statement, releasing the compiled program.
    ///
    /// Equivalent to dropping, but reports the engine's result so callers
    /// can log teardown failures instead of losing them.
    ///
    /// # Errors
    ///
    /// Returns the deferred error from the most recent step, if any.
    pub fn finalize(mut self) -> DbResult<()> {
        let rc = unsafe { ffi::sqlite3_finalize(self.stmt) };
        self.stmt = std::ptr::null_mut();
        if rc == ffi::SQLITE_OK {
            Ok(())
        } else {
            // The statement handle is gone; only the connection's error
            // message is still available.
            Err(self.last_error(rc))
        }
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn check_ok(&self, rc: c_int) -> DbResult<()> {
        if rc == ffi::SQLITE_OK {
            Ok(())
        } else {
            Err(self.last_error(rc))
        }
    }

    fn last_error(&self, code: c_int) -> DbError {
        let msg = unsafe {
            let ptr = ffi::sqlite3_errmsg(self.db);
            if ptr.is_null() {
                "unknown error".to_string()
            } else {
                CStr::from_ptr(ptr).to_string_lossy().into_owned()
            }
        };
        DbError::new(code, msg)
    }
}

impl std::fmt::Debug for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Statement").finish_non_exhaustive()
    }
}

impl Drop for Statement {
    fn drop(&mut self) {
        if !self.stmt.is_null() {
            unsafe {
                ffi::sqlite3_finalize(self.stmt);
            }
            self.stmt = std::ptr::null_mut();
        }
    }
}
