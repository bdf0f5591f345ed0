//! Minimal safe `SQLite` wrapper for the pyccache bytecode cache.
//!
//! This crate provides a small, safe Rust API over the `SQLite` C FFI.
//! The raw symbols come from `libsqlite3-sys` with the `bundled` feature,
//! which compiles the amalgamation into the crate -- no system library or
//! network access is needed at build time.
//!
//! Consumer code (the cache facade and its statement cache) uses only the
//! safe types defined here and never touches raw FFI directly. The `ffi`
//! module is the **only** file that contains `unsafe` code or C types.
//!
//! Thread model: [`Connection`] and [`Statement`] are `Send` but not
//! `Sync`. The underlying handle is opened with `SQLITE_OPEN_FULLMUTEX`,
//! so the engine serialises its own internals, but statement bind/step
//! state is still per-handle mutable state -- callers serialise access.

mod ffi;

mod connection;
pub mod error;
mod statement;
pub mod value;

pub use connection::Connection;
pub use error::{DbError, DbErrorCode, DbResult};
pub use statement::{ColumnType, Statement, StepResult};
pub use value::Value;

#[cfg(test)]
mod tests;
