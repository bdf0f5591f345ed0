//! Error taxonomy for the bytecode cache.
//!
//! Every engine-backed variant carries the underlying [`DbError`] (result
//! code plus engine message) and the name of the failing operation, so
//! nothing the engine reports is swallowed on the way up. A cache miss is
//! not an error; it is `Ok(None)` from [`Cache::get`](crate::Cache::get).

use pyccache_db::{ColumnType, DbError};
use thiserror::Error;

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Errors raised by the bytecode cache.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The storage file could not be created or opened. Fatal to open.
    #[error("failed to open cache database: {0}")]
    Open(#[source] DbError),

    /// A required configuration directive was rejected by the engine.
    /// Fatal to open.
    #[error("failed to configure cache database: {0}")]
    Config(#[source] DbError),

    /// Schema creation failed (e.g. a conflicting on-disk definition).
    /// Fatal to open.
    #[error("failed to create cache schema: {0}")]
    Schema(#[source] DbError),

    /// The on-disk schema version tag does not match this build.
    /// Detection only; no migration is attempted. Fatal to open.
    #[error("incompatible cache schema version {found} (expected {expected})")]
    SchemaVersion {
        /// Version tag found in the storage file.
        found: i64,
        /// Version tag this build writes and understands.
        expected: i64,
    },

    /// A query program failed to compile. Fatal to open.
    #[error("failed to compile statement `{statement}`: {source}")]
    Prepare {
        /// Text of the statement that failed to compile.
        statement: &'static str,
        /// Engine compile error.
        source: DbError,
    },

    /// Parameter binding failed. Local to the failing call.
    #[error("failed to bind parameters for {operation}: {source}")]
    Bind {
        /// Name of the failing operation.
        operation: &'static str,
        /// Engine bind error.
        source: DbError,
    },

    /// Execution did not reach the expected row/completion state. Local
    /// to the failing call; the statement is reset on the way out.
    #[error("statement step failed during {operation}: {source}")]
    Step {
        /// Name of the failing operation.
        operation: &'static str,
        /// Engine step error, or a synthesised error carrying the
        /// unexpected result code.
        source: DbError,
    },

    /// A stored value does not have the blob storage class. Signals
    /// on-disk corruption or a foreign writer; never coerced.
    #[error("cache entry for `{key}` holds a {found:?} value where a blob was expected")]
    SchemaViolation {
        /// Key whose entry is corrupt.
        key: String,
        /// Storage class actually found.
        found: ColumnType,
    },

    /// Another connection holds the write lock. Surfaced, not retried.
    #[error("cache database is busy during {operation}: {source}")]
    Busy {
        /// Name of the contended operation.
        operation: &'static str,
        /// Engine busy error.
        source: DbError,
    },
}

impl CacheError {
    /// Classifies an engine failure on the step path, surfacing write-lock
    /// contention as [`CacheError::Busy`].
    pub(crate) fn step(operation: &'static str, source: DbError) -> Self {
        if source.is_busy() {
            Self::Busy { operation, source }
        } else {
            Self::Step { operation, source }
        }
    }

    pub(crate) fn bind(operation: &'static str, source: DbError) -> Self {
        Self::Bind { operation, source }
    }
}
