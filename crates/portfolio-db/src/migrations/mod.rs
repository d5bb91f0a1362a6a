//! Schema versioning for the image store.
//!
//! The only table is `image_store`. Its migration uses `IF NOT EXISTS`, so a
//! database created before `schema_migrations` existed is adopted as
//! version 1 instead of failing.

use rusqlite::{Connection, Result};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Migration {0} failed: {1}")]
    Failed(usize, String),
}

struct Migration {
    version: usize,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    name: "image_store",
    sql: include_str!("001_image_store.sql"),
}];

fn create_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY NOT NULL,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;
    Ok(())
}

fn recorded_version(conn: &Connection) -> Result<usize> {
    conn.query_row("SELECT MAX(version) FROM schema_migrations", [], |row| {
        row.get::<_, Option<usize>>(0)
    })
    .map(Option::unwrap_or_default)
}

/// Apply the migrations newer than the recorded version and return how many ran.
///
/// Each migration and its version row commit together.
pub fn run_migrations(conn: &Connection) -> Result<usize, MigrationError> {
    create_version_table(conn)?;
    let recorded = recorded_version(conn)?;

    let mut applied = 0;
    for migration in MIGRATIONS.iter().filter(|m| m.version > recorded) {
        let failed = |e: rusqlite::Error| MigrationError::Failed(migration.version, e.to_string());

        let tx = conn.unchecked_transaction()?;
        tx.execute_batch(migration.sql).map_err(failed)?;
        tx.execute(
            "INSERT INTO schema_migrations (version, name) VALUES (?1, ?2)",
            rusqlite::params![migration.version, migration.name],
        )
        .map_err(failed)?;
        tx.commit().map_err(failed)?;

        applied += 1;
        tracing::info!("Applied migration {}: {}", migration.version, migration.name);
    }

    Ok(applied)
}

/// Bring the schema up to date. Safe to call on every open.
pub fn ensure_schema(conn: &Connection) -> Result<(), MigrationError> {
    if run_migrations(conn)? == 0 {
        tracing::debug!("Schema up to date at version {}", latest_version());
    }
    Ok(())
}

/// Recorded schema version, without applying anything.
pub fn current_version(conn: &Connection) -> Result<usize, MigrationError> {
    create_version_table(conn)?;
    Ok(recorded_version(conn)?)
}

/// Version of the newest embedded migration.
pub fn latest_version() -> usize {
    MIGRATIONS.last().map(|m| m.version).unwrap_or(0)
}
