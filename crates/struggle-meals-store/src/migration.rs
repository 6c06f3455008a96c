//! Database schema migrations for SQLite.
//!
//! Versioned migrations: each one moves the schema from version N to N+1
//! inside a single transaction.

use rusqlite::Connection;

use struggle_meals_core::now_millis;

use crate::error::{Result, StoreError};

/// Current schema version.
pub const CURRENT_VERSION: u32 = 1;

/// Initialize or migrate the database schema.
///
/// Idempotent: running it against an up-to-date database does nothing.
pub fn migrate(conn: &mut Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at INTEGER NOT NULL
        )",
        [],
    )?;

    let current: u32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;

    if current < CURRENT_VERSION {
        let tx = conn.transaction()?;

        for version in (current + 1)..=CURRENT_VERSION {
            apply_migration(&tx, version)?;

            tx.execute(
                "INSERT INTO schema_migrations (version, applied_at) VALUES (?1, ?2)",
                rusqlite::params![version, now_millis()],
            )?;
        }

        tx.commit()?;
    }

    Ok(())
}

fn apply_migration(conn: &Connection, version: u32) -> Result<()> {
    match version {
        1 => apply_v1(conn),
        _ => Err(StoreError::Migration(format!(
            "unknown migration version: {}",
            version
        ))),
    }
}

/// Migration v1: meals and remixes.
fn apply_v1(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE meals (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            description TEXT,
            image_url TEXT,
            ingredients BLOB,                 -- CBOR array of text
            tools BLOB,                       -- CBOR array of text
            steps BLOB,                       -- CBOR array of text
            time_in_minutes INTEGER,
            estimated_cost REAL,
            struggle_score INTEGER,
            verifications INTEGER,
            remixes INTEGER,
            is_verified INTEGER,              -- 0/1
            author_name TEXT,
            author_handle TEXT,
            author_avatar TEXT,
            created_at INTEGER NOT NULL       -- Unix ms
        );

        CREATE TABLE remixes (
            id TEXT PRIMARY KEY,
            parent_meal_id TEXT,              -- no foreign key; orphans are allowed
            title TEXT NOT NULL,
            description TEXT,
            image_url TEXT,
            ingredients BLOB,
            tools BLOB,
            steps BLOB,
            time_in_minutes INTEGER,
            estimated_cost REAL,
            struggle_score INTEGER,
            author_name TEXT,
            author_handle TEXT,
            author_avatar TEXT,
            created_at INTEGER NOT NULL
        );

        CREATE INDEX idx_meals_struggle_score ON meals(struggle_score);
        CREATE INDEX idx_meals_created_at ON meals(created_at);
        CREATE INDEX idx_remixes_parent ON remixes(parent_meal_id);
        CREATE INDEX idx_remixes_created_at ON remixes(created_at);
        "#,
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_creates_tables() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();

        let tables: Vec<String> = conn
            .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
            .unwrap()
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<std::result::Result<Vec<_>, _>>()
            .unwrap();

        assert!(tables.contains(&"meals".to_string()));
        assert!(tables.contains(&"remixes".to_string()));
        assert!(tables.contains(&"schema_migrations".to_string()));
    }

    #[test]
    fn test_migration_idempotent() {
        let mut conn = Connection::open_in_memory().unwrap();
        migrate(&mut conn).unwrap();
        migrate(&mut conn).unwrap();

        let version: u32 = conn
            .query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
                row.get(0)
            })
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }
}
