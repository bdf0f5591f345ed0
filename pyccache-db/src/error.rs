//! Database error types for the safe `SQLite` wrapper.

use std::fmt;

/// Well-known engine result codes surfaced to consumers.
pub mod codes {
    /// Another row of output is available (`SQLITE_ROW`).
    pub const ROW: i32 = crate::ffi::SQLITE_ROW;
    /// A held write lock (`SQLITE_BUSY`).
    pub const BUSY: i32 = crate::ffi::SQLITE_BUSY;
}

/// Result code returned by `SQLite` operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DbErrorCode(pub i32);

impl fmt::Display for DbErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned by database operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbError {
    /// `SQLite` result code.
    pub code: DbErrorCode,
    /// Human-readable error message (from `sqlite3_errmsg` when available).
    pub message: String,
}

impl DbError {
    /// Creates a new database error from a raw result code and message.
    ///
    /// Public so that callers layering protocols on [`Statement`]s can
    /// synthesise errors that carry the engine's own result codes (e.g. a
    /// point lookup observing an unexpected second row).
    ///
    /// [`Statement`]: crate::Statement
    #[must_use]
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code: DbErrorCode(code),
            message: message.into(),
        }
    }

    /// Returns `true` if the engine reported a held write lock
    /// (`SQLITE_BUSY`).
    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.code.0 == codes::BUSY
    }
}

impl fmt::Display for DbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sqlite error {}: {}", self.code, self.message)
    }
}

impl std::error::Error for DbError {}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;
