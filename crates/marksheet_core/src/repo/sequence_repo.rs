//! Primary-key generator access and realignment.
//!
//! # Responsibility
//! - Own all SQL touching the `sequences` generator table.
//! - Realign the `customers.id` generator to the current maximum id.
//!
//! # Invariants
//! - Realignment is best-effort: failures are logged and reported as an
//!   outcome value, never returned as an error and never panicking.
//! - Realigning twice with no intervening insert is a no-op the second time.
//! - Drawing a value commits on its own, independent of the insert using it.

use crate::config::StoreConfig;
use crate::db::{open_db, DbError};
use crate::model::record::RecordId;
use log::{error, info, warn};
use rusqlite::{params, Connection, OptionalExtension, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Table whose identity column the generator feeds.
pub const RECORD_TABLE: &str = "customers";
/// Identity column bound to the generator.
pub const RECORD_ID_COLUMN: &str = "id";

/// Failure while inspecting or realigning the generator.
#[derive(Debug)]
pub enum ReconcileError {
    Db(DbError),
}

impl Display for ReconcileError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "sequence realign failed: {err}"),
        }
    }
}

impl Error for ReconcileError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for ReconcileError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ReconcileError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Result of one `realign()` call.
#[derive(Debug)]
pub enum RealignOutcome {
    /// Generator now hands out `max_id + 1` next.
    Realigned { sequence: String, max_id: RecordId },
    /// No generator is bound to the identity column; nothing to do.
    NoGenerator,
    /// Realignment failed and was logged.
    Failed(ReconcileError),
}

impl RealignOutcome {
    pub fn is_realigned(&self) -> bool {
        matches!(self, Self::Realigned { .. })
    }
}

/// Repairs the identity generator of the records table.
pub trait SequenceReconciler {
    /// Aligns the generator to the current maximum id. Never fails loudly.
    fn realign(&self) -> RealignOutcome;
}

/// SQLite-backed generator reconciler.
pub struct SqliteSequenceReconciler<'cfg> {
    config: &'cfg StoreConfig,
}

impl<'cfg> SqliteSequenceReconciler<'cfg> {
    pub fn new(config: &'cfg StoreConfig) -> Self {
        Self { config }
    }

    /// Returns the id the generator would hand out next, or `None` when no
    /// generator is bound to the identity column.
    pub fn next_value(&self) -> Result<Option<RecordId>, ReconcileError> {
        let conn = open_db(self.config)?;
        let last_value = conn
            .query_row(
                "SELECT last_value
                 FROM sequences
                 WHERE table_name = ?1 AND column_name = ?2;",
                params![RECORD_TABLE, RECORD_ID_COLUMN],
                |row| row.get::<_, i64>(0),
            )
            .optional()?;
        Ok(last_value.map(|value| value + 1))
    }

    fn try_realign(&self) -> Result<Option<(String, RecordId)>, ReconcileError> {
        let mut conn = open_db(self.config)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(sequence) = find_generator(&tx)? else {
            return Ok(None);
        };

        let max_id: RecordId =
            tx.query_row("SELECT COALESCE(MAX(id), 0) FROM customers;", [], |row| {
                row.get(0)
            })?;

        tx.execute(
            "UPDATE sequences SET last_value = ?1 WHERE name = ?2;",
            params![max_id, sequence],
        )?;
        tx.commit()?;

        Ok(Some((sequence, max_id)))
    }
}

impl SequenceReconciler for SqliteSequenceReconciler<'_> {
    fn realign(&self) -> RealignOutcome {
        let started_at = Instant::now();
        match self.try_realign() {
            Ok(Some((sequence, max_id))) => {
                info!(
                    "event=sequence_realign module=sequence status=ok sequence={} max_id={} duration_ms={}",
                    sequence,
                    max_id,
                    started_at.elapsed().as_millis()
                );
                RealignOutcome::Realigned { sequence, max_id }
            }
            Ok(None) => {
                warn!(
                    "event=sequence_realign module=sequence status=skipped reason=no_generator table={} column={}",
                    RECORD_TABLE, RECORD_ID_COLUMN
                );
                RealignOutcome::NoGenerator
            }
            Err(err) => {
                error!(
                    "event=sequence_realign module=sequence status=error duration_ms={} error={}",
                    started_at.elapsed().as_millis(),
                    err
                );
                RealignOutcome::Failed(err)
            }
        }
    }
}

/// Advances the generator and returns the drawn id.
///
/// Runs as its own autocommit statement. Returns `None` when no generator is
/// bound, leaving id assignment to SQLite.
pub(crate) fn draw_next_id(conn: &Connection) -> Result<Option<RecordId>, rusqlite::Error> {
    conn.query_row(
        "UPDATE sequences
         SET last_value = last_value + 1
         WHERE table_name = ?1 AND column_name = ?2
         RETURNING last_value;",
        params![RECORD_TABLE, RECORD_ID_COLUMN],
        |row| row.get(0),
    )
    .optional()
}

fn find_generator(conn: &Connection) -> Result<Option<String>, rusqlite::Error> {
    conn.query_row(
        "SELECT name FROM sequences WHERE table_name = ?1 AND column_name = ?2;",
        params![RECORD_TABLE, RECORD_ID_COLUMN],
        |row| row.get(0),
    )
    .optional()
}
