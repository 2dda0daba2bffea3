use portal_core::db::migrations::latest_version;
use portal_core::db::{open_db, open_db_in_memory, DbError};
use rusqlite::Connection;

fn user_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn kv_columns(conn: &Connection) -> Vec<String> {
    let mut stmt = conn.prepare("PRAGMA table_info(kv_store);").unwrap();
    let columns = stmt
        .query_map([], |row| row.get::<_, String>(1))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap();
    columns
}

#[test]
fn fresh_store_has_kv_table_and_update_index() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(user_version(&conn), latest_version());
    assert_eq!(kv_columns(&conn), vec!["key", "value", "updated_at"]);
    let index_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master
             WHERE type = 'index' AND name = 'idx_kv_store_updated_at';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(index_count, 1);
}

#[test]
fn reopening_a_store_file_keeps_saved_values() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("portal.db");

    let conn = open_db(&path).unwrap();
    conn.execute(
        "INSERT INTO kv_store (key, value) VALUES ('studentTeacherPortal', '{}');",
        [],
    )
    .unwrap();
    drop(conn);

    let conn = open_db(&path).unwrap();
    assert_eq!(user_version(&conn), latest_version());
    let (value, updated_at): (String, i64) = conn
        .query_row(
            "SELECT value, updated_at FROM kv_store WHERE key = 'studentTeacherPortal';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(value, "{}");
    assert!(updated_at > 0);
}

#[test]
fn store_from_a_newer_build_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.db");
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 999;")
        .unwrap();

    let err = open_db(&path).unwrap_err();

    assert_eq!(err.code(), "schema_too_new");
    assert!(matches!(
        err,
        DbError::UnsupportedSchemaVersion {
            db_version: 999,
            ..
        }
    ));
}

#[test]
fn failed_migration_reports_version_and_rolls_back() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("half_migrated.db");
    // Version 1 recorded without its table: the index migration cannot apply.
    Connection::open(&path)
        .unwrap()
        .execute_batch("PRAGMA user_version = 1;")
        .unwrap();

    let err = open_db(&path).unwrap_err();

    assert!(matches!(err, DbError::Migration { version: 2, .. }));
    assert!(err.to_string().contains("migration 2"));
    let conn = Connection::open(&path).unwrap();
    assert_eq!(user_version(&conn), 1);
}

#[test]
fn unreachable_store_path_names_the_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("portal.db");

    let err = open_db(&path).unwrap_err();

    match &err {
        DbError::Open { path: failed, .. } => assert_eq!(failed, &path),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(err.code(), "store_open_failed");
}
