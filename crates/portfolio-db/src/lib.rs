//! Portfolio-DB: Database schema, migrations, and query operations
//!
//! This crate provides the persistent image store for the portfolio gallery
//! using SQLite with rusqlite and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Idempotent schema creation
//! - `pool` - Connection pool management
//! - `models` - Rust models matching the database schema
//! - `queries` - Database query operations
//!
//! # Example
//!
//! ```
//! use portfolio_db::pool::{init_memory_pool, get_conn};
//! use portfolio_db::queries::images;
//!
//! let pool = init_memory_pool().unwrap();
//! let conn = get_conn(&pool).unwrap();
//!
//! let id = images::insert_image(&conn, "headshot.jpg", &[0xFF, 0xD8, 0xFF, 0xD9]).unwrap();
//! let stored = images::list_images(&conn).unwrap();
//! assert_eq!(stored[0].id, id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
