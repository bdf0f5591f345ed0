//! Unit tests for the safe `SQLite` wrapper.

use super::statement::StepResult;
use super::*;

#[test]
fn test_open_in_memory() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, val TEXT);")
        .expect("create table");
    conn.execute(
        "INSERT INTO t (id, val) VALUES (?1, ?2)",
        params![1_i64, "hello"],
    )
    .expect("insert");
    let result = conn
        .query_row("SELECT val FROM t WHERE id = ?1", params![1_i64], |stmt| {
            Ok(stmt.column_text(0))
        })
        .expect("query");
    assert_eq!(result, "hello");
}

#[test]
fn test_query_row_optional_none() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY);")
        .expect("create table");
    let result = conn
        .query_row_optional("SELECT id FROM t WHERE id = 999", &[], |stmt| {
            Ok(stmt.column_i64(0))
        })
        .expect("query");
    assert!(result.is_none());
}

#[test]
fn test_blob_round_trip() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, data BLOB);")
        .expect("create table");
    let data = vec![0xDE, 0xAD, 0xBE, 0xEF];
    conn.execute(
        "INSERT INTO t (id, data) VALUES (?1, ?2)",
        params![1_i64, data.as_slice()],
    )
    .expect("insert");
    let result = conn
        .query_row("SELECT data FROM t WHERE id = 1", &[], |stmt| {
            Ok(stmt.column_blob(0))
        })
        .expect("query");
    assert_eq!(result, data);
}

#[test]
fn test_empty_blob_is_not_null() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, data BLOB NOT NULL);")
        .expect("create table");
    conn.execute(
        "INSERT INTO t (id, data) VALUES (?1, ?2)",
        params![1_i64, b"".as_slice()],
    )
    .expect("empty blob must satisfy NOT NULL");
    let (ty, data) = conn
        .query_row("SELECT data FROM t WHERE id = 1", &[], |stmt| {
            Ok((stmt.column_type(0), stmt.column_blob(0)))
        })
        .expect("query");
    assert_eq!(ty, ColumnType::Blob);
    assert!(data.is_empty());
}

#[test]
fn test_null_handling() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, val TEXT);")
        .expect("create table");
    conn.execute(
        "INSERT INTO t (id, val) VALUES (?1, ?2)",
        params![1_i64, Value::Null],
    )
    .expect("insert");
    let result = conn
        .query_row("SELECT val FROM t WHERE id = 1", &[], |stmt| {
            Ok(stmt.is_column_null(0))
        })
        .expect("query");
    assert!(result);
}

#[test]
fn test_persistent_statement_reuse() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, data BLOB NOT NULL);")
        .expect("create table");

    let mut insert = conn
        .prepare_persistent("INSERT OR REPLACE INTO t (id, data) VALUES (?1, ?2)")
        .expect("prepare insert");
    let mut select = conn
        .prepare_persistent("SELECT data FROM t WHERE id = ?1")
        .expect("prepare select");

    for round in 0..100_i64 {
        let payload = vec![u8::try_from(round % 251).expect("fits"); 16];

        insert.reset().expect("reset insert");
        insert.bind_i64(1, round % 7).expect("bind id");
        insert.bind_blob(2, &payload).expect("bind data");
        assert_eq!(insert.step().expect("step insert"), StepResult::Done);
        insert.clear_bindings().expect("clear bindings");

        select.reset().expect("reset select");
        select.bind_i64(1, round % 7).expect("bind id");
        assert_eq!(select.step().expect("step select"), StepResult::Row);
        assert_eq!(select.column_blob(0), payload);
        assert_eq!(select.step().expect("drain select"), StepResult::Done);
    }

    select.finalize().expect("finalize select");
    insert.finalize().expect("finalize insert");
}

#[test]
fn test_cleared_bindings_revert_to_null() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, data BLOB NOT NULL);")
        .expect("create table");

    let mut insert = conn
        .prepare_persistent("INSERT INTO t (id, data) VALUES (?1, ?2)")
        .expect("prepare insert");
    insert.bind_i64(1, 1).expect("bind id");
    insert.bind_blob(2, b"payload").expect("bind data");
    insert.reset().expect("reset");
    insert.clear_bindings().expect("clear bindings");

    // Both parameters are NULL again, so the NOT NULL column rejects the
    // insert: nothing from the earlier binding survives.
    let err = insert.step().expect_err("step with cleared bindings");
    assert!(err.message.contains("NOT NULL"), "unexpected: {err}");
}

#[test]
fn test_step_error_reports_engine_code() {
    let conn = Connection::open_in_memory().expect("open in-memory db");
    conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY);")
        .expect("create table");
    let err = conn.prepare("SELECT nope FROM t").expect_err("unknown column");
    assert_ne!(err.code.0, 0);
    assert!(!err.message.is_empty());
    assert!(!err.is_busy());
}

#[test]
fn test_on_disk_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("wrapper.db");

    {
        let conn = Connection::open(&path).expect("create db");
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY, val TEXT);")
            .expect("create table");
        conn.execute("INSERT INTO t (id, val) VALUES (1, 'persisted')", &[])
            .expect("insert");
    }

    let conn = Connection::open(&path).expect("reopen db");
    let val = conn
        .query_row("SELECT val FROM t WHERE id = 1", &[], |stmt| {
            Ok(stmt.column_text(0))
        })
        .expect("query");
    assert_eq!(val, "persisted");
}

#[test]
fn test_open_invalid_path() {
    let dir = tempfile::tempdir().expect("tempdir");
    // A directory is not a database file.
    let err = Connection::open(dir.path()).expect_err("open directory");
    assert_ne!(err.code.0, 0);
}
