// ABOUTME: Database management over an SQLite pool with per-domain migrations
// ABOUTME: All queries are owner-scoped; cross-user access is indistinguishable from absence
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Database Management
//!
//! Provides the [`Database`] handle used by every store in the system.
//! Tables are created idempotently at startup; each domain file owns its
//! own `migrate_*` step and query set.

mod chat;
mod tasks;
mod users;

pub use tasks::{parse_due_date, NewTask, TaskPatch};

use crate::errors::AppResult;
use sqlx::{Pool, Sqlite, SqlitePool};

/// Database manager for users, tasks, and conversations
#[derive(Clone)]
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    /// Create a new database connection and run migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established or a
    /// migration statement fails.
    pub async fn new(database_url: &str) -> AppResult<Self> {
        // Ensure SQLite creates the database file if it doesn't exist
        let connection_options = if database_url.starts_with("sqlite:")
            && !database_url.contains("mode=")
            && !database_url.ends_with(":memory:")
        {
            format!("{database_url}?mode=rwc")
        } else {
            database_url.to_owned()
        };

        let pool = SqlitePool::connect(&connection_options).await?;

        let db = Self { pool };
        db.migrate().await?;

        Ok(db)
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub fn pool(&self) -> &Pool<Sqlite> {
        &self.pool
    }

    /// Run database migrations
    ///
    /// # Errors
    ///
    /// Returns an error if any table or index creation fails.
    pub async fn migrate(&self) -> AppResult<()> {
        self.migrate_users().await?;
        self.migrate_tasks().await?;
        self.migrate_conversations().await?;
        Ok(())
    }
}
