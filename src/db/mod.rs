//! Database layer
//!
//! SQLite storage behind a `DatabasePool` trait object. Repositories take a
//! `DynDatabasePool` so tests can run against an in-memory database.
//!
//! # Usage
//!
//! ```ignore
//! use frontpage::config::DatabaseConfig;
//! use frontpage::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! pool.ping().await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, DatabasePool, DynDatabasePool, SqliteDatabase};
