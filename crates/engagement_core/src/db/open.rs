//! Connection bootstrap.
//!
//! # Invariants
//! - Returned connections are fully migrated with `foreign_keys=ON`.
//! - Writers wait up to [`BUSY_TIMEOUT`] for the lock before failing busy.
//! - File databases use WAL so reads proceed during a write transaction.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{debug, error};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens (creating if needed) the database file at `path`.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    let path = path.as_ref();
    logged_open("file", || {
        let mut conn = Connection::open(path)?;
        let _mode: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;
        configure(&mut conn)?;
        Ok(conn)
    })
}

/// Opens a private in-memory database. Used by tests and tooling.
pub fn open_db_in_memory() -> DbResult<Connection> {
    logged_open("memory", || {
        let mut conn = Connection::open_in_memory()?;
        configure(&mut conn)?;
        Ok(conn)
    })
}

fn configure(conn: &mut Connection) -> DbResult<()> {
    conn.pragma_update(None, "foreign_keys", true)?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    apply_migrations(conn)?;
    Ok(())
}

fn logged_open(
    mode: &'static str,
    open: impl FnOnce() -> DbResult<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = open();
    let duration_ms = started_at.elapsed().as_millis();
    match &result {
        Ok(_) => debug!(
            "event=db_open module=db status=ok mode={} duration_ms={}",
            mode, duration_ms
        ),
        Err(err) => error!(
            "event=db_open module=db status=error mode={} duration_ms={} error={}",
            mode, duration_ms, err
        ),
    }
    result
}
