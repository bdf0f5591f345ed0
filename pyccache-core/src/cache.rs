//! Public cache facade.

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::CacheResult;
use crate::handle::StorageHandle;
use crate::statements::StatementCache;

/// A persistent, path-keyed cache for compiled bytecode blobs.
///
/// Opening returns a fully constructed cache or no cache at all; there is
/// no half-initialised state for `get`/`set` to guard against. `get` and
/// `set` take `&mut self` because the underlying prepared statements
/// carry mutable bind/step state -- callers needing concurrent access
/// keep one cache per thread or serialise externally.
///
/// ```no_run
/// use pyccache_core::Cache;
///
/// let mut cache = Cache::open("cache.db")?;
/// if cache.get("mod_a.py")?.is_none() {
///     cache.set("mod_a.py", b"\x01\x02\x03")?;
/// }
/// cache.close();
/// # Ok::<(), pyccache_core::CacheError>(())
/// ```
pub struct Cache {
    // Declaration order is teardown order: the statements are finalized
    // before the connection they reference is closed.
    stmts: StatementCache,
    handle: StorageHandle,
}

impl Cache {
    /// Opens (creating if absent) the cache database at `path` and
    /// prepares its statements.
    ///
    /// Fail-fast: on any failure the first error propagates and no cache
    /// exists.
    ///
    /// # Errors
    ///
    /// [`Open`](crate::CacheError::Open), [`Config`](crate::CacheError::Config),
    /// [`Schema`](crate::CacheError::Schema),
    /// [`SchemaVersion`](crate::CacheError::SchemaVersion), or
    /// [`Prepare`](crate::CacheError::Prepare).
    pub fn open(path: impl AsRef<Path>) -> CacheResult<Self> {
        let path = path.as_ref();
        let handle = StorageHandle::open(path)?;
        let stmts = StatementCache::prepare(handle.conn())?;
        debug!(path = %path.display(), "bytecode cache ready");
        Ok(Self { stmts, handle })
    }

    /// Fetches the blob stored for `key`.
    ///
    /// Returns `Ok(None)` for a key that was never written -- a miss is a
    /// regular outcome, not an error. The returned bytes are an owned
    /// copy; they stay valid regardless of later cache calls.
    ///
    /// # Errors
    ///
    /// [`Bind`](crate::CacheError::Bind), [`Step`](crate::CacheError::Step),
    /// [`SchemaViolation`](crate::CacheError::SchemaViolation), or
    /// [`Busy`](crate::CacheError::Busy).
    pub fn get(&mut self, key: &str) -> CacheResult<Option<Vec<u8>>> {
        let value = self.stmts.lookup(key)?;
        debug!(key, hit = value.is_some(), "cache get");
        Ok(value)
    }

    /// Stores `value` under `key`, atomically replacing any existing
    /// entry (last writer wins). `value` may be empty.
    ///
    /// The caller's buffer is copied at bind time and may be released as
    /// soon as this returns.
    ///
    /// # Errors
    ///
    /// [`Bind`](crate::CacheError::Bind), [`Step`](crate::CacheError::Step),
    /// or [`Busy`](crate::CacheError::Busy).
    pub fn set(&mut self, key: &str, value: &[u8]) -> CacheResult<()> {
        self.stmts.upsert(key, value)?;
        debug!(key, len = value.len(), "cache set");
        Ok(())
    }

    /// Tears the cache down: statements are finalized first, then the
    /// connection closes.
    ///
    /// Consuming `self` makes double-close and use-after-close
    /// unrepresentable. Teardown failures are logged best-effort; there
    /// is no error surface. Dropping a `Cache` without calling `close`
    /// performs the same ordered teardown.
    pub fn close(self) {
        debug!("closing bytecode cache");
        let Self { stmts, handle } = self;
        stmts.finalize();
        drop(handle);
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("stmts", &self.stmts)
            .field("handle", &self.handle)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_temp() -> (tempfile::TempDir, Cache) {
        let dir = tempfile::tempdir().expect("tempdir");
        let cache = Cache::open(dir.path().join("cache.db")).expect("open cache");
        (dir, cache)
    }

    #[test]
    fn test_miss_then_round_trip() {
        let (_dir, mut cache) = open_temp();
        assert_eq!(cache.get("mod_a.py").expect("get"), None);
        cache.set("mod_a.py", b"\x01\x02\x03").expect("set");
        assert_eq!(
            cache.get("mod_a.py").expect("get"),
            Some(vec![0x01, 0x02, 0x03])
        );
    }

    #[test]
    fn test_zero_length_value() {
        let (_dir, mut cache) = open_temp();
        cache.set("mod_a.py", b"").expect("set empty");
        assert_eq!(cache.get("mod_a.py").expect("get"), Some(Vec::new()));
    }

    #[test]
    fn test_overwrite_keeps_single_entry() {
        let (_dir, mut cache) = open_temp();
        cache.set("mod_a.py", b"first").expect("set v1");
        cache.set("mod_a.py", b"second").expect("set v2");
        assert_eq!(
            cache.get("mod_a.py").expect("get"),
            Some(b"second".to_vec())
        );

        let count = cache
            .handle
            .conn()
            .query_row(
                "SELECT COUNT(*) FROM pyc WHERE path = ?1",
                pyccache_db::params!["mod_a.py"],
                |stmt| Ok(stmt.column_i64(0)),
            )
            .expect("count");
        assert_eq!(count, 1);
    }

    #[test]
    fn test_release_after_mixed_traffic() {
        let (_dir, mut cache) = open_temp();
        cache.set("mod_a.py", &[0xAB; 4096]).expect("set");
        // Reads run the release barrier over the write statement; the
        // write path must keep working afterwards.
        assert!(cache.get("mod_a.py").expect("get").is_some());
        cache.stmts.release_pending_buffers().expect("release");
        cache.set("mod_b.py", b"next").expect("set after release");
        assert_eq!(cache.get("mod_b.py").expect("get"), Some(b"next".to_vec()));
    }
}
