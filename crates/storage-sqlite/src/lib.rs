//! SQLite storage implementation for Goalshare.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `goalshare-core` and contains:
//! - Database connection pooling and management
//! - Embedded Diesel migrations
//! - Repository implementations for users, goals, login codes and analytics
//! - Database-specific model types (with Diesel derives)
//!
//! Reads go through the r2d2 pool; every write is funnelled through the
//! single writer actor behind [`WriteHandle`].

pub mod analytics;
pub mod auth;
pub mod db;
pub mod errors;
pub mod goals;
pub mod schema;
pub mod users;

#[cfg(test)]
pub(crate) mod test_utils;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export repositories
pub use analytics::AnalyticsRepository;
pub use auth::LoginCodeRepository;
pub use goals::GoalRepository;
pub use users::UserRepository;

// Re-export from goalshare-core for convenience
pub use goalshare_core::errors::{DatabaseError, Error, Result};
