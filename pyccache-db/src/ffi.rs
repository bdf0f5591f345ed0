//! Raw FFI bindings to `SQLite`, normalised over `libsqlite3-sys`.
//!
//! All pointer types use `*mut c_void` so that the backend crate's opaque
//! types (`sqlite3`, `sqlite3_stmt`) do not leak into the rest of the
//! code; each wrapper casts through to the `libsqlite3-sys` symbol.

#![allow(dead_code)]

use std::os::raw::{c_char, c_int, c_uint, c_void};

use libsqlite3_sys as sys;

// ── SQLite result codes ─────────────────────────────────────────────────

pub const SQLITE_OK: c_int = sys::SQLITE_OK as c_int;
pub const SQLITE_ERROR: c_int = sys::SQLITE_ERROR as c_int;
pub const SQLITE_BUSY: c_int = sys::SQLITE_BUSY as c_int;
pub const SQLITE_MISUSE: c_int = sys::SQLITE_MISUSE as c_int;
pub const SQLITE_ROW: c_int = sys::SQLITE_ROW as c_int;
pub const SQLITE_DONE: c_int = sys::SQLITE_DONE as c_int;

// Column type constants
pub const SQLITE_INTEGER: c_int = sys::SQLITE_INTEGER as c_int;
pub const SQLITE_FLOAT: c_int = sys::SQLITE_FLOAT as c_int;
pub const SQLITE_TEXT: c_int = sys::SQLITE_TEXT as c_int;
pub const SQLITE_BLOB: c_int = sys::SQLITE_BLOB as c_int;
pub const SQLITE_NULL: c_int = sys::SQLITE_NULL as c_int;

// Open flags
pub const SQLITE_OPEN_READWRITE: c_int = sys::SQLITE_OPEN_READWRITE as c_int;
pub const SQLITE_OPEN_CREATE: c_int = sys::SQLITE_OPEN_CREATE as c_int;
pub const SQLITE_OPEN_FULLMUTEX: c_int = sys::SQLITE_OPEN_FULLMUTEX as c_int;

// Prepare flags
pub const SQLITE_PREPARE_PERSISTENT: c_uint = sys::SQLITE_PREPARE_PERSISTENT as c_uint;

// Destructor sentinel (transient = -1 means SQLite copies the data at
// bind time; anything else binds static, caller keeps the buffer alive).
pub const SQLITE_TRANSIENT: isize = -1;

fn destructor(sentinel: isize) -> sys::sqlite3_destructor_type {
    if sentinel == SQLITE_TRANSIENT {
        sys::SQLITE_TRANSIENT()
    } else {
        sys::SQLITE_STATIC()
    }
}

// ── Connection lifecycle ────────────────────────────────────────────────

pub unsafe fn sqlite3_open_v2(
    filename: *const c_char,
    pp_db: *mut *mut c_void,
    flags: c_int,
    z_vfs: *const c_char,
) -> c_int {
    let pp = pp_db.cast::<*mut sys::sqlite3>();
    sys::sqlite3_open_v2(filename, pp, flags, z_vfs)
}

pub unsafe fn sqlite3_close_v2(db: *mut c_void) -> c_int {
    // `libsqlite3-sys` blocklists this symbol in its generated bindings, but
    // the bundled amalgamation still exports it, so bind it directly.
    extern "C" {
        fn sqlite3_close_v2(db: *mut sys::sqlite3) -> c_int;
    }
    sqlite3_close_v2(db.cast())
}

// ── Execution ───────────────────────────────────────────────────────────

pub unsafe fn sqlite3_exec(
    db: *mut c_void,
    sql: *const c_char,
    errmsg: *mut *mut c_char,
) -> c_int {
    sys::sqlite3_exec(db.cast(), sql, None, std::ptr::null_mut(), errmsg)
}

pub unsafe fn sqlite3_free(ptr: *mut c_void) {
    sys::sqlite3_free(ptr);
}

// ── Prepared statements ─────────────────────────────────────────────────

pub unsafe fn sqlite3_prepare_v3(
    db: *mut c_void,
    z_sql: *const c_char,
    n_byte: c_int,
    prep_flags: c_uint,
    pp_stmt: *mut *mut c_void,
    pz_tail: *mut *const c_char,
) -> c_int {
    let pp = pp_stmt.cast::<*mut sys::sqlite3_stmt>();
    sys::sqlite3_prepare_v3(db.cast(), z_sql, n_byte, prep_flags, pp, pz_tail)
}

pub unsafe fn sqlite3_step(stmt: *mut c_void) -> c_int {
    sys::sqlite3_step(stmt.cast())
}

pub unsafe fn sqlite3_reset(stmt: *mut c_void) -> c_int {
    sys::sqlite3_reset(stmt.cast())
}

pub unsafe fn sqlite3_clear_bindings(stmt: *mut c_void) -> c_int {
    sys::sqlite3_clear_bindings(stmt.cast())
}

pub unsafe fn sqlite3_finalize(stmt: *mut c_void) -> c_int {
    sys::sqlite3_finalize(stmt.cast())
}

// ── Parameter binding ───────────────────────────────────────────────────

pub unsafe fn sqlite3_bind_int64(stmt: *mut c_void, index: c_int, value: i64) -> c_int {
    sys::sqlite3_bind_int64(stmt.cast(), index, value)
}

pub unsafe fn sqlite3_bind_blob(
    stmt: *mut c_void,
    index: c_int,
    value: *const c_void,
    n: c_int,
    dtor: isize,
) -> c_int {
    sys::sqlite3_bind_blob(stmt.cast(), index, value, n, destructor(dtor))
}

pub unsafe fn sqlite3_bind_zeroblob(stmt: *mut c_void, index: c_int, n: c_int) -> c_int {
    sys::sqlite3_bind_zeroblob(stmt.cast(), index, n)
}

pub unsafe fn sqlite3_bind_text(
    stmt: *mut c_void,
    index: c_int,
    value: *const c_char,
    n: c_int,
    dtor: isize,
) -> c_int {
    sys::sqlite3_bind_text(stmt.cast(), index, value, n, destructor(dtor))
}

pub unsafe fn sqlite3_bind_null(stmt: *mut c_void, index: c_int) -> c_int {
    sys::sqlite3_bind_null(stmt.cast(), index)
}

// ── Column reading ──────────────────────────────────────────────────────

pub unsafe fn sqlite3_column_int64(stmt: *mut c_void, i_col: c_int) -> i64 {
    sys::sqlite3_column_int64(stmt.cast(), i_col)
}

pub unsafe fn sqlite3_column_blob(stmt: *mut c_void, i_col: c_int) -> *const c_void {
    sys::sqlite3_column_blob(stmt.cast(), i_col)
}

pub unsafe fn sqlite3_column_bytes(stmt: *mut c_void, i_col: c_int) -> c_int {
    sys::sqlite3_column_bytes(stmt.cast(), i_col)
}

pub unsafe fn sqlite3_column_text(stmt: *mut c_void, i_col: c_int) -> *const c_char {
    sys::sqlite3_column_text(stmt.cast(), i_col).cast()
}

pub unsafe fn sqlite3_column_type(stmt: *mut c_void, i_col: c_int) -> c_int {
    sys::sqlite3_column_type(stmt.cast(), i_col)
}

// ── Error reporting ─────────────────────────────────────────────────────

pub unsafe fn sqlite3_errmsg(db: *mut c_void) -> *const c_char {
    sys::sqlite3_errmsg(db.cast())
}

// ── Changes ─────────────────────────────────────────────────────────────

pub unsafe fn sqlite3_changes(db: *mut c_void) -> c_int {
    sys::sqlite3_changes(db.cast())
}
