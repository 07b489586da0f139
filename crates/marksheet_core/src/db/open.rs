//! Scoped connection bootstrap for SQLite.
//!
//! # Responsibility
//! - Open one file-backed connection per store operation.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and the configured busy timeout.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use crate::config::StoreConfig;
use log::{debug, error, info};
use rusqlite::Connection;
use std::time::Instant;

/// Opens a fresh connection to the configured database file.
///
/// The caller owns the connection for exactly one operation; dropping it
/// releases the underlying handle on every exit path.
///
/// # Side effects
/// - Applies pending migrations (a single `PRAGMA` read when up to date).
/// - Emits `db_open` logging events on failure.
pub fn open_db(config: &StoreConfig) -> DbResult<Connection> {
    let started_at = Instant::now();

    let mut conn = match Connection::open(&config.database_path) {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    if let Err(err) = bootstrap_connection(&mut conn, config) {
        error!(
            "event=db_open module=db status=error duration_ms={} error_code=db_bootstrap_failed error={}",
            started_at.elapsed().as_millis(),
            err
        );
        return Err(err);
    }

    debug!(
        "event=db_open module=db status=ok duration_ms={}",
        started_at.elapsed().as_millis()
    );
    Ok(conn)
}

/// Creates the database file if needed and brings its schema up to date.
///
/// Called once at startup so schema problems surface before the listener
/// accepts requests.
pub fn prepare_store(config: &StoreConfig) -> DbResult<()> {
    info!(
        "event=store_prepare module=db status=start path={}",
        config.database_path.display()
    );
    let conn = open_db(config)?;
    drop(conn);
    info!("event=store_prepare module=db status=ok");
    Ok(())
}

fn bootstrap_connection(conn: &mut Connection, config: &StoreConfig) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(config.busy_timeout)?;
    apply_migrations(conn)?;
    Ok(())
}
