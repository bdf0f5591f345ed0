//! The statement cache: two persistent compiled programs and the
//! bind/step/reset protocol around them.
//!
//! Each statement carries mutable state between calls -- bound parameters
//! and, after a step that produced a row, a materialised row whose blob
//! pointers stay valid only until the next step or reset on that same
//! statement. The protocol here keeps both statements idle between
//! public calls and copies row data out inside the validity window.

use pyccache_db::error::codes;
use pyccache_db::{ColumnType, Connection, DbError, Statement, StepResult};
use tracing::warn;

use crate::error::{CacheError, CacheResult};

/// Point lookup by path.
const LOOKUP_SQL: &str = "SELECT data FROM pyc WHERE path = ?";

/// Atomic insert-or-replace by path.
const UPSERT_SQL: &str = "INSERT OR REPLACE INTO pyc (path, data) VALUES (?, ?)";

/// Owns the two reusable query programs bound to the storage handle.
///
/// Construction is fail-fast, so a `StatementCache` always holds both
/// compiled programs; the unprepared state is unrepresentable.
pub(crate) struct StatementCache {
    lookup: Statement,
    upsert: Statement,
}

impl StatementCache {
    /// Compiles both programs once, marked persistent so the engine keeps
    /// them optimised for repeated reuse.
    pub(crate) fn prepare(conn: &Connection) -> CacheResult<Self> {
        let lookup = conn.prepare_persistent(LOOKUP_SQL).map_err(|source| {
            CacheError::Prepare {
                statement: LOOKUP_SQL,
                source,
            }
        })?;
        let upsert = conn.prepare_persistent(UPSERT_SQL).map_err(|source| {
            CacheError::Prepare {
                statement: UPSERT_SQL,
                source,
            }
        })?;
        Ok(Self { lookup, upsert })
    }

    /// Fetches the blob stored for `key`, or `None` if absent.
    pub(crate) fn lookup(&mut self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        match self.lookup_inner(key) {
            Ok(value) => {
                // After any read, proactively release blob copies the
                // write path may still hold from a prior set.
                self.release_pending_buffers()?;
                Ok(value)
            }
            Err(err) => {
                // Leave the statement idle for the next call. The reset
                // outcome is a secondary diagnostic; the primary error is
                // what the caller sees.
                if let Err(reset_err) = self.lookup.reset() {
                    warn!(error = %reset_err, "lookup statement reset failed after error");
                }
                Err(err)
            }
        }
    }

    fn lookup_inner(&mut self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        // Reset also clears the previously bound key, so the statement is
        // in a known state even on first use.
        self.lookup
            .reset()
            .map_err(|e| CacheError::step("lookup reset", e))?;
        self.lookup
            .bind_text(1, key)
            .map_err(|e| CacheError::bind("lookup", e))?;

        match self
            .lookup
            .step()
            .map_err(|e| CacheError::step("lookup", e))?
        {
            StepResult::Done => Ok(None),
            StepResult::Row => {
                let found = self.lookup.column_type(0);
                if found != ColumnType::Blob {
                    return Err(CacheError::SchemaViolation {
                        key: key.to_owned(),
                        found,
                    });
                }
                // Copy out now: the row buffer is only valid until the
                // next engine call on this statement.
                let data = self.lookup.column_blob(0);
                // The path is the primary key, so draining the result set
                // must complete in one more step.
                match self
                    .lookup
                    .step()
                    .map_err(|e| CacheError::step("lookup drain", e))?
                {
                    StepResult::Done => Ok(Some(data)),
                    StepResult::Row => Err(CacheError::step(
                        "lookup drain",
                        DbError::new(codes::ROW, "point lookup produced more than one row"),
                    )),
                }
            }
        }
    }

    /// Stores `value` under `key`, replacing any existing entry.
    pub(crate) fn upsert(&mut self, key: &str, value: &[u8]) -> CacheResult<()> {
        let result = self.upsert_inner(key, value);
        if result.is_err() {
            // Best-effort: put the statement back to idle and drop its
            // bound copies without masking the primary error.
            if let Err(cleanup_err) = self.release_pending_buffers() {
                warn!(error = %cleanup_err, "upsert cleanup failed after error");
            }
        }
        result
    }

    fn upsert_inner(&mut self, key: &str, value: &[u8]) -> CacheResult<()> {
        self.upsert
            .bind_text(1, key)
            .map_err(|e| CacheError::bind("upsert", e))?;
        self.upsert
            .bind_blob(2, value)
            .map_err(|e| CacheError::bind("upsert", e))?;
        match self
            .upsert
            .step()
            .map_err(|e| CacheError::step("upsert", e))?
        {
            StepResult::Done => self.release_pending_buffers(),
            StepResult::Row => Err(CacheError::step(
                "upsert",
                DbError::new(codes::ROW, "write statement produced a row"),
            )),
        }
    }

    /// Resets the write statement and clears its bindings back to NULL,
    /// releasing the engine's copy of the most recently written blob.
    ///
    /// Runs after every write and after every successful read, so mixed
    /// get/set traffic cannot retain native memory between calls.
    pub(crate) fn release_pending_buffers(&mut self) -> CacheResult<()> {
        // Attempt both even if the reset reports a deferred step error.
        let reset = self.upsert.reset();
        let cleared = self.upsert.clear_bindings();
        reset
            .and(cleared)
            .map_err(|e| CacheError::step("upsert release", e))
    }

    /// Releases both compiled programs, exactly once. Must run before the
    /// owning connection closes; failures are logged, not surfaced --
    /// there is nothing callers can do with a teardown error.
    pub(crate) fn finalize(self) {
        let Self { lookup, upsert } = self;
        if let Err(err) = lookup.finalize() {
            warn!(error = %err, statement = "lookup", "statement finalize failed");
        }
        if let Err(err) = upsert.finalize() {
            warn!(error = %err, statement = "upsert", "statement finalize failed");
        }
    }
}

impl std::fmt::Debug for StatementCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatementCache").finish_non_exhaustive()
    }
}
