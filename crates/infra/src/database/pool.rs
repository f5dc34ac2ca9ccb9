//! SQLite connection pool.
//!
//! Every store operation follows acquire → statements → commit → release on
//! a pooled connection; nothing holds a connection across an await point.

use std::path::Path;
use std::time::Duration;

use agenda_domain::Result;
use r2d2_sqlite::SqliteConnectionManager;
use tracing::debug;

use crate::errors::InfraError;

/// Pool of plain SQLite connections.
pub type DbPool = r2d2::Pool<SqliteConnectionManager>;

/// A connection checked out of the pool for the duration of one operation.
pub type DbConnection = r2d2::PooledConnection<SqliteConnectionManager>;

const BUSY_TIMEOUT_MS: u32 = 5_000;

/// Create a connection pool for the database at `path`.
///
/// Each fresh connection gets WAL journaling (concurrent readers while the
/// scheduler tick writes), foreign keys, and a busy timeout so interleaved
/// writers queue instead of failing immediately.
pub fn create_pool<P: AsRef<Path>>(path: P, max_size: u32) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(path.as_ref()).with_init(|conn| {
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(Duration::from_millis(u64::from(BUSY_TIMEOUT_MS)))?;
        Ok(())
    });

    let pool = r2d2::Pool::builder()
        .max_size(max_size.max(1))
        .build(manager)
        .map_err(InfraError::from)?;

    debug!(path = %path.as_ref().display(), max_size, "sqlite pool created");
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn pool_hands_out_working_connections() {
        let temp_dir = TempDir::new().unwrap();
        let pool = create_pool(temp_dir.path().join("pool.db"), 2).unwrap();

        let conn = pool.get().unwrap();
        let one: i32 = conn.query_row("SELECT 1", [], |row| row.get(0)).unwrap();
        assert_eq!(one, 1);
    }

    #[test]
    fn zero_max_size_is_clamped_to_one() {
        let temp_dir = TempDir::new().unwrap();
        let pool = create_pool(temp_dir.path().join("pool.db"), 0).unwrap();
        assert_eq!(pool.max_size(), 1);
    }
}
