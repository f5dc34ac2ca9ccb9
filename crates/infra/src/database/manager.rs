//! Database connection manager and versioned schema migrations.
//!
//! Migrations are ordered, idempotent steps gated by a `schema_migrations`
//! table: a step that has already been applied is skipped silently, while a
//! step that fails surfaces a `Migration` error naming its version - the two
//! outcomes are never conflated.

use std::path::{Path, PathBuf};

use agenda_domain::{AgendaError, Result};
use rusqlite::params;
use tracing::{debug, info};

use super::pool::{create_pool, DbConnection, DbPool};
use crate::errors::InfraError;

/// Ordered schema history. Version 1 is the legacy pre-tag layout; later
/// steps replay the evolutions that grew out of it, so an old database file
/// migrates to the current shape and a fresh one replays the same path.
const MIGRATIONS: &[(i64, &str)] = &[
    (
        1,
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL,
            title TEXT NOT NULL,
            date TEXT NOT NULL,
            time TEXT NOT NULL
        );",
    ),
    (
        2,
        "ALTER TABLE events ADD COLUMN tag TEXT NOT NULL DEFAULT '';
         ALTER TABLE events ADD COLUMN status TEXT NOT NULL DEFAULT 'active';",
    ),
    (
        3,
        "CREATE TABLE IF NOT EXISTS user_settings (
            owner_id INTEGER PRIMARY KEY,
            notifications_enabled INTEGER NOT NULL DEFAULT 1,
            remind_lead_minutes INTEGER NOT NULL DEFAULT 60
        );",
    ),
    (
        4,
        "CREATE INDEX IF NOT EXISTS idx_events_owner_date ON events(owner_id, date);",
    ),
];

/// Database manager that wraps the shared SQLite pool.
pub struct DbManager {
    pool: DbPool,
    path: PathBuf,
}

impl DbManager {
    /// Create a new manager with the given pool size.
    pub fn new<P: AsRef<Path>>(db_path: P, pool_size: u32) -> Result<Self> {
        let path = db_path.as_ref().to_path_buf();
        let pool = create_pool(&path, pool_size)?;

        info!(db_path = %path.display(), pool_size, "sqlite pool initialised");

        Ok(Self { pool, path })
    }

    /// Acquire a connection from the pool.
    pub fn get_connection(&self) -> Result<DbConnection> {
        self.pool.get().map_err(|err| InfraError::from(err).into())
    }

    /// Bring the schema up to the current version. Safe to call repeatedly.
    pub fn run_migrations(&self) -> Result<()> {
        let mut conn = self.get_connection()?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at INTEGER NOT NULL
            )",
            [],
        )
        .map_err(|err| migration_error(0, &err))?;

        let current: i64 = conn
            .query_row("SELECT COALESCE(MAX(version), 0) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .map_err(|err| migration_error(0, &err))?;

        for (version, sql) in MIGRATIONS {
            if *version <= current {
                debug!(version, "migration already applied");
                continue;
            }

            let tx = conn.transaction().map_err(|err| migration_error(*version, &err))?;
            tx.execute_batch(sql).map_err(|err| migration_error(*version, &err))?;
            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at)
                 VALUES (?1, CAST(strftime('%s','now') AS INTEGER))",
                params![version],
            )
            .map_err(|err| migration_error(*version, &err))?;
            tx.commit().map_err(|err| migration_error(*version, &err))?;

            info!(version, "applied schema migration");
        }

        Ok(())
    }

    /// Highest applied migration version, 0 for a pristine database.
    pub fn schema_version(&self) -> Result<i64> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT COALESCE(MAX(version), 0) FROM schema_migrations", [], |row| {
            row.get(0)
        })
        .map_err(|err| InfraError::from(err).into())
    }

    /// Return the configured database path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Perform a health check to verify database connectivity.
    pub fn health_check(&self) -> Result<()> {
        let conn = self.get_connection()?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i32>(0))
            .map_err(InfraError::from)?;
        Ok(())
    }
}

fn migration_error(version: i64, err: &rusqlite::Error) -> AgendaError {
    AgendaError::Migration(format!("migration step {version} failed: {err}"))
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn manager() -> (DbManager, TempDir) {
        let temp_dir = TempDir::new().expect("temp dir created");
        let db_path = temp_dir.path().join("test.db");
        let manager = DbManager::new(&db_path, 4).expect("manager created");
        (manager, temp_dir)
    }

    #[test]
    fn migrations_reach_current_version() {
        let (manager, _temp) = manager();
        manager.run_migrations().expect("migrations run");

        assert_eq!(manager.schema_version().unwrap(), 4);
    }

    #[test]
    fn migrations_are_idempotent() {
        let (manager, _temp) = manager();
        manager.run_migrations().expect("first run");
        // A second run must be a silent no-op, in particular the ALTER TABLE
        // step must not attempt to add existing columns again.
        manager.run_migrations().expect("second run");

        assert_eq!(manager.schema_version().unwrap(), 4);
    }

    #[test]
    fn migration_upgrades_legacy_layout() {
        let (manager, _temp) = manager();

        // Simulate a database created before tags and statuses existed.
        {
            let conn = manager.get_connection().unwrap();
            conn.execute_batch(
                "CREATE TABLE events (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    owner_id INTEGER NOT NULL,
                    title TEXT NOT NULL,
                    date TEXT NOT NULL,
                    time TEXT NOT NULL
                );
                INSERT INTO events (owner_id, title, date, time)
                VALUES (1, 'Legacy', '2025-07-11', '14:00');",
            )
            .unwrap();
        }

        manager.run_migrations().expect("migrations run");

        let conn = manager.get_connection().unwrap();
        let (tag, status): (String, String) = conn
            .query_row("SELECT tag, status FROM events WHERE title = 'Legacy'", [], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })
            .unwrap();
        assert_eq!(tag, "");
        assert_eq!(status, "active");
    }

    #[test]
    fn health_check_succeeds_for_valid_database() {
        let (manager, _temp) = manager();
        manager.run_migrations().expect("migrations run");
        manager.health_check().expect("health check passed");
    }
}
