//! Connection bootstrap utilities for SQLite.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have the `company`/`computer` tables.

use super::schema::ensure_schema;
use super::{ConnectionError, StoreConfig, StoreLocation};
use log::{error, info};
use rusqlite::Connection;
use std::time::Instant;

/// Opens the store described by `config` and prepares it for use.
///
/// # Side effects
/// - Creates the database file and tables when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_store(config: &StoreConfig) -> Result<Connection, ConnectionError> {
    let started_at = Instant::now();
    let mode = config.location.mode();
    info!("event=db_open module=db status=start mode={mode}");

    let opened = match &config.location {
        StoreLocation::File(path) => Connection::open(path),
        StoreLocation::Memory => Connection::open_in_memory(),
    };
    let conn = match opened {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(ConnectionError::Open {
                target: config.location.to_string(),
                source: err,
            });
        }
    };

    match bootstrap_connection(&conn, config) {
        Ok(()) => {
            info!(
                "event=db_open module=db status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error_code=db_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(ConnectionError::Bootstrap(err))
        }
    }
}

fn bootstrap_connection(conn: &Connection, config: &StoreConfig) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(config.busy_timeout)?;
    ensure_schema(conn)
}
