//! Persistent `SQLite`-backed cache for compiled Python bytecode.
//!
//! On a hot import path, loading previously compiled bytecode beats
//! recompiling the source. This crate stores opaque bytecode blobs keyed
//! by the module's filesystem path in a single `SQLite` database file,
//! durable across process restarts.
//!
//! The public surface is [`Cache`]: open it at a path, `get`/`set` blobs,
//! close it. Internally the crate is split the way the storage layers
//! own their resources:
//!
//! * a storage handle owning the connection, its configuration pragmas,
//!   and the schema (including the `user_version` compatibility tag);
//! * a statement cache owning the two persistent compiled programs
//!   (point lookup, upsert) and the bind/step/reset protocol around
//!   them, including copy-on-read of blob memory whose validity ends at
//!   the next step or reset;
//! * the facade, which sequences the two and translates engine failures
//!   into [`CacheError`].
//!
//! All calls are synchronous and blocking. A `Cache` is exclusively
//! owned (`get`/`set` take `&mut self`); cross-process concurrency is
//! handled by the engine's write-ahead journaling, with write-lock
//! contention surfaced as [`CacheError::Busy`] rather than retried.

mod cache;
mod error;
mod handle;
mod statements;

pub use cache::Cache;
pub use error::{CacheError, CacheResult};

// Engine-level types that appear in the public error surface.
pub use pyccache_db::{ColumnType, DbError};
