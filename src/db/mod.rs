//! Database layer
//!
//! SQLite persistence for Newsdesk:
//! - `pool` - connection pool creation (file-backed or in-memory)
//! - `migrations` - embedded, versioned schema migrations
//! - `repositories` - per-entity data access behind traits
//!
//! # Usage
//!
//! ```ignore
//! use newsdesk::config::DatabaseConfig;
//! use newsdesk::db::{create_pool, migrations};
//!
//! let pool = create_pool(&DatabaseConfig::default()).await?;
//! migrations::run_migrations(&pool).await?;
//! ```

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use pool::{create_pool, create_test_pool, ping, DbPool};
