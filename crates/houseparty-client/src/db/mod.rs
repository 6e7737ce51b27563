mod migrations;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::OpenFlags;
use std::path::Path;

use crate::error::ClientResult;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Open (creating if needed) the session database shared by every client
/// process pointed at the same path.
pub fn create_pool(sqlite_path: &str) -> ClientResult<DbPool> {
    if let Some(parent) = Path::new(sqlite_path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let manager = SqliteConnectionManager::file(sqlite_path)
        .with_flags(
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_FULL_MUTEX,
        )
        .with_init(|conn| {
            conn.execute_batch(
                "PRAGMA journal_mode = WAL;
                 PRAGMA busy_timeout = 5000;",
            )
        });

    let pool = Pool::builder().max_size(4).build(manager)?;

    let conn = pool.get()?;
    migrations::run(&conn)?;

    Ok(pool)
}
