//! Record store gateway contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/insert APIs over the `customers` table.
//! - Classify store failures into uniqueness conflicts and everything else.
//!
//! # Invariants
//! - Every operation opens its own connection and releases it on every exit
//!   path; nothing is held across operations.
//! - Store failures never escape as panics; they are always a `GatewayError`.
//!
//! # See also
//! - `repo::sequence_repo` for the generator the insert path draws from.

use crate::config::StoreConfig;
use crate::db::{open_db, DbError};
use crate::model::record::{NewRecord, Record, RecordId};
use crate::repo::sequence_repo::draw_next_id;
use log::{debug, warn};
use rusqlite::{ffi, params, ErrorCode, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

pub type GatewayResult<T> = Result<T, GatewayError>;

/// Typed store failure returned by gateway operations.
#[derive(Debug)]
pub enum GatewayError {
    /// Primary-key or unique index collision.
    UniqueConstraint(DbError),
    /// Any other failure: connectivity, schema, check constraints.
    Store(DbError),
}

impl GatewayError {
    pub fn is_unique_constraint(&self) -> bool {
        matches!(self, Self::UniqueConstraint(_))
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UniqueConstraint(_) => "unique_violation",
            Self::Store(_) => "store_error",
        }
    }
}

impl Display for GatewayError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UniqueConstraint(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for GatewayError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::UniqueConstraint(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<DbError> for GatewayError {
    fn from(value: DbError) -> Self {
        let unique = matches!(&value, DbError::Sqlite(err) if is_unique_violation(err));
        if unique {
            Self::UniqueConstraint(value)
        } else {
            Self::Store(value)
        }
    }
}

impl From<rusqlite::Error> for GatewayError {
    fn from(value: rusqlite::Error) -> Self {
        Self::from(DbError::Sqlite(value))
    }
}

/// Read/write gateway for customer marks records.
pub trait RecordGateway {
    /// Lists at most `limit` records, newest `created_at` first.
    fn list_recent(&self, limit: u32) -> GatewayResult<Vec<Record>>;
    /// Appends one record and returns its store-generated id.
    fn insert(&self, record: &NewRecord) -> GatewayResult<RecordId>;
}

/// SQLite-backed gateway opening one connection per call.
pub struct SqliteRecordGateway<'cfg> {
    config: &'cfg StoreConfig,
}

impl<'cfg> SqliteRecordGateway<'cfg> {
    pub fn new(config: &'cfg StoreConfig) -> Self {
        Self { config }
    }
}

impl RecordGateway for SqliteRecordGateway<'_> {
    fn list_recent(&self, limit: u32) -> GatewayResult<Vec<Record>> {
        let started_at = Instant::now();
        let result = list_recent_inner(self.config, limit);
        match &result {
            Ok(records) => debug!(
                "event=record_list module=gateway status=ok rows={} duration_ms={}",
                records.len(),
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=record_list module=gateway status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.error_code(),
                err
            ),
        }
        result
    }

    fn insert(&self, record: &NewRecord) -> GatewayResult<RecordId> {
        let started_at = Instant::now();
        let result = insert_inner(self.config, record);
        match &result {
            Ok(id) => debug!(
                "event=record_insert module=gateway status=ok id={} duration_ms={}",
                id,
                started_at.elapsed().as_millis()
            ),
            Err(err) => warn!(
                "event=record_insert module=gateway status=error duration_ms={} error_code={} error={}",
                started_at.elapsed().as_millis(),
                err.error_code(),
                err
            ),
        }
        result
    }
}

fn list_recent_inner(config: &StoreConfig, limit: u32) -> GatewayResult<Vec<Record>> {
    let conn = open_db(config)?;
    let mut stmt = conn.prepare(
        "SELECT id, created_at, name, marks
         FROM customers
         ORDER BY created_at DESC, id DESC
         LIMIT ?1;",
    )?;
    let records = stmt
        .query_map([i64::from(limit)], parse_record_row)?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

fn insert_inner(config: &StoreConfig, record: &NewRecord) -> GatewayResult<RecordId> {
    let conn = open_db(config)?;
    match draw_next_id(&conn)? {
        Some(id) => {
            conn.execute(
                "INSERT INTO customers (id, name, marks) VALUES (?1, ?2, ?3);",
                params![id, record.name(), record.marks()],
            )?;
            Ok(id)
        }
        None => {
            conn.execute(
                "INSERT INTO customers (name, marks) VALUES (?1, ?2);",
                params![record.name(), record.marks()],
            )?;
            Ok(conn.last_insert_rowid())
        }
    }
}

fn parse_record_row(row: &Row<'_>) -> rusqlite::Result<Record> {
    Ok(Record {
        id: row.get("id")?,
        created_at: row.get("created_at")?,
        name: row.get("name")?,
        marks: row.get("marks")?,
    })
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(failure, _) => {
            failure.code == ErrorCode::ConstraintViolation
                && matches!(
                    failure.extended_code,
                    ffi::SQLITE_CONSTRAINT_PRIMARYKEY | ffi::SQLITE_CONSTRAINT_UNIQUE
                )
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::{is_unique_violation, GatewayError};
    use crate::db::DbError;
    use rusqlite::Connection;

    fn failure_of(sql: &str) -> rusqlite::Error {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(
            "CREATE TABLE t (id INTEGER PRIMARY KEY, label TEXT UNIQUE, n INTEGER CHECK (n > 0));
             INSERT INTO t (id, label, n) VALUES (1, 'a', 1);",
        )
        .unwrap();
        conn.execute_batch(sql).unwrap_err()
    }

    #[test]
    fn primary_key_and_unique_collisions_are_conflicts() {
        assert!(is_unique_violation(&failure_of(
            "INSERT INTO t (id, label, n) VALUES (1, 'b', 1);"
        )));
        assert!(is_unique_violation(&failure_of(
            "INSERT INTO t (id, label, n) VALUES (2, 'a', 1);"
        )));
    }

    #[test]
    fn check_constraint_is_a_plain_store_error() {
        let err = GatewayError::from(DbError::Sqlite(failure_of(
            "INSERT INTO t (id, label, n) VALUES (2, 'b', 0);",
        )));
        assert!(matches!(err, GatewayError::Store(_)));
    }
}
