use super::schema::migrate;
use super::{DbError, DbResult, DbTarget};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens the journal database file, creating its directory when missing.
pub fn open_db(path: impl AsRef<Path>) -> DbResult<Connection> {
    open_target(&DbTarget::File(path.as_ref().to_path_buf()))
}

/// Opens a private in-memory journal database.
pub fn open_db_in_memory() -> DbResult<Connection> {
    open_target(&DbTarget::Memory)
}

/// Opens `target` and brings its schema up to date.
///
/// Logs one `db_open` line with the outcome and elapsed time.
pub fn open_target(target: &DbTarget) -> DbResult<Connection> {
    let started_at = Instant::now();
    let result = connect(target).and_then(|mut conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let from_version = migrate(&mut conn)?;
        Ok((conn, from_version))
    });
    let elapsed_ms = started_at.elapsed().as_millis();

    match result {
        Ok((conn, from_version)) => {
            info!(
                "event=db_open module=db status=ok mode={} from_version={} duration_ms={}",
                target.mode(),
                from_version,
                elapsed_ms
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={} duration_ms={} error={}",
                target.mode(),
                elapsed_ms,
                err
            );
            Err(err)
        }
    }
}

fn connect(target: &DbTarget) -> DbResult<Connection> {
    match target {
        DbTarget::Memory => Ok(Connection::open_in_memory()?),
        DbTarget::File(path) => {
            if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
                std::fs::create_dir_all(dir).map_err(|source| DbError::DataDir {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            Ok(Connection::open(path)?)
        }
    }
}
