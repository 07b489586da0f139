use marksheet_core::db::migrations::latest_version;
use marksheet_core::db::{open_db, prepare_store, DbError};
use marksheet_core::StoreConfig;
use rusqlite::Connection;

#[test]
fn prepare_store_applies_all_migrations_and_seeds_generator() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("marksheet.sqlite3"));
    prepare_store(&config).unwrap();

    let conn = open_db(&config).unwrap();
    assert_eq!(schema_version(&conn), latest_version());
    assert_table_exists(&conn, "customers");
    assert_table_exists(&conn, "sequences");

    let (name, last_value): (String, i64) = conn
        .query_row(
            "SELECT name, last_value FROM sequences
             WHERE table_name = 'customers' AND column_name = 'id';",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )
        .unwrap();
    assert_eq!(name, "customers_id_seq");
    assert_eq!(last_value, 0);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("marksheet.sqlite3"));

    let conn_first = open_db(&config).unwrap();
    conn_first
        .execute(
            "UPDATE sequences SET last_value = 7 WHERE name = 'customers_id_seq';",
            [],
        )
        .unwrap();
    drop(conn_first);

    let conn_second = open_db(&config).unwrap();
    assert_eq!(schema_version(&conn_second), latest_version());
    let last_value: i64 = conn_second
        .query_row(
            "SELECT last_value FROM sequences WHERE name = 'customers_id_seq';",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(last_value, 7, "reopening must not reseed the generator");
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&StoreConfig::new(&path)).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn prepare_store_fails_when_directory_is_missing() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("missing").join("marksheet.sqlite3"));

    let err = prepare_store(&config).unwrap_err();
    assert!(matches!(err, DbError::Sqlite(_)));
}

#[test]
fn schema_rejects_blank_names() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new(dir.path().join("marksheet.sqlite3"));
    let conn = open_db(&config).unwrap();

    let result = conn.execute(
        "INSERT INTO customers (id, name, marks) VALUES (1, '   ', 10);",
        [],
    );
    assert!(result.is_err());
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
