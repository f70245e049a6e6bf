//! Ordered schema steps for the journal database.
//!
//! Step `n` in `STEPS` upgrades the file to version `n + 1`.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

const STEPS: &[&str] = &[include_str!("0001_kv_entries.sql")];

/// Schema version this build writes.
pub const SCHEMA_VERSION: u32 = STEPS.len() as u32;

/// Reads the file's schema version.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

/// Runs every step above the stored version in one transaction.
///
/// Returns the version found before migrating.
pub fn migrate(conn: &mut Connection) -> DbResult<u32> {
    let found = schema_version(conn)?;
    if found > SCHEMA_VERSION {
        return Err(DbError::SchemaTooNew {
            found,
            supported: SCHEMA_VERSION,
        });
    }
    if found == SCHEMA_VERSION {
        return Ok(found);
    }

    let tx = conn.transaction()?;
    for sql in &STEPS[found as usize..] {
        tx.execute_batch(sql)?;
    }
    tx.pragma_update(None, "user_version", SCHEMA_VERSION)?;
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={}",
        found, SCHEMA_VERSION
    );
    Ok(found)
}
