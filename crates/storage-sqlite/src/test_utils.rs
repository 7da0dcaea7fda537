//! Shared fixtures for repository tests.

use std::sync::Arc;

use tempfile::TempDir;

use crate::db::{create_pool, get_connection, init, run_migrations, spawn_writer};
use crate::db::{DbConnection, DbPool, WriteHandle};

pub struct TestDb {
    pub pool: Arc<DbPool>,
    pub writer: WriteHandle,
    // Keeps the database file alive for the duration of the test.
    _dir: TempDir,
}

impl TestDb {
    pub fn conn(&self) -> DbConnection {
        get_connection(&self.pool).expect("Failed to get connection")
    }
}

/// Creates a migrated database in a temp directory. Must run inside a Tokio runtime.
pub fn setup_db() -> TestDb {
    let dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = dir.path().join("test.db").to_string_lossy().to_string();
    init(&db_path).expect("Failed to init database");
    let pool = create_pool(&db_path).expect("Failed to create pool");
    run_migrations(&pool).expect("Failed to run migrations");
    let writer = spawn_writer((*pool).clone());
    TestDb {
        pool,
        writer,
        _dir: dir,
    }
}
