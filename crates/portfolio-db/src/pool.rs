//! Database connection pool management.
//!
//! This module provides connection pooling for SQLite using r2d2.
//! It handles pool initialization and schema creation.
//!
//! The pool holds a single connection. Every store operation is serialized
//! through it, and an in-memory database is shared by all callers instead of
//! each pooled connection getting a private one.

use std::path::Path;

use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use portfolio_common::{Error, Result};

use crate::migrations;

/// Type alias for the database connection pool.
pub type DbPool = Pool<SqliteConnectionManager>;

/// Type alias for a pooled database connection.
pub type PooledConnection = r2d2::PooledConnection<SqliteConnectionManager>;

/// Initialize a new database pool with the given file path.
///
/// This function will:
/// - Create the SQLite database file if it doesn't exist
/// - Set up connection pooling with r2d2
/// - Ensure the image table exists
///
/// # Arguments
///
/// * `db_path` - Path to the SQLite database file, used as given (no UTF-8
///   conversion)
///
/// # Example
///
/// ```no_run
/// use portfolio_db::pool::init_pool;
///
/// let pool = init_pool("/var/lib/portfolio/portfolio.db").unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_pool<P: AsRef<Path>>(db_path: P) -> Result<DbPool> {
    let manager = SqliteConnectionManager::file(db_path)
        .with_init(|conn| conn.execute_batch("PRAGMA busy_timeout = 5000;"));

    build_pool(manager)
}

/// Initialize an in-memory database pool for testing.
///
/// The database will be lost when the pool is dropped.
///
/// # Example
///
/// ```
/// use portfolio_db::pool::init_memory_pool;
///
/// let pool = init_memory_pool().unwrap();
/// let conn = pool.get().unwrap();
/// ```
pub fn init_memory_pool() -> Result<DbPool> {
    build_pool(SqliteConnectionManager::memory())
}

fn build_pool(manager: SqliteConnectionManager) -> Result<DbPool> {
    let pool = Pool::builder()
        .max_size(1)
        .build(manager)
        .map_err(|e| Error::storage(format!("Failed to create connection pool: {}", e)))?;

    let conn = pool
        .get()
        .map_err(|e| Error::storage(format!("Failed to get connection for migrations: {}", e)))?;

    migrations::ensure_schema(&conn)
        .map_err(|e| Error::storage(format!("Failed to create schema: {}", e)))?;

    Ok(pool)
}

/// Get a connection from the pool.
///
/// Blocks until the single connection is free or the pool's timeout expires.
pub fn get_conn(pool: &DbPool) -> Result<PooledConnection> {
    pool.get()
        .map_err(|e| Error::storage(format!("Failed to get connection from pool: {}", e)))
}
