//! Schema migrations, tracked through `PRAGMA user_version`.
//!
//! # Invariants
//! - Steps are listed in strictly increasing version order.
//! - All pending steps and the version bump commit together or not at all.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::{Connection, TransactionBehavior};

/// `(version, script)` pairs in apply order.
const STEPS: &[(u32, &str)] = &[(1, include_str!("0001_init.sql"))];

/// Schema version this binary migrates to.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _)| *version)
}

/// Brings `conn` up to [`latest_version`].
///
/// Returns the versions applied by this call, empty when already current.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<Vec<u32>> {
    let latest = latest_version();
    if schema_version(conn)? == latest {
        return Ok(Vec::new());
    }

    // Write lock first, then re-read: a second process opening the same
    // file may have migrated while we waited.
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let from = schema_version(&tx)?;
    if from > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: latest,
        });
    }

    let mut applied = Vec::new();
    for (version, script) in STEPS.iter().filter(|(version, _)| *version > from) {
        tx.execute_batch(script)?;
        tx.pragma_update(None, "user_version", version)?;
        applied.push(*version);
    }
    tx.commit()?;

    if !applied.is_empty() {
        info!(
            "event=db_migrate module=db status=ok from_version={} to_version={}",
            from, latest
        );
    }
    Ok(applied)
}

pub(crate) fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}
