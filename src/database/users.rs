// ABOUTME: User account database operations: registration lookups and credential storage
// ABOUTME: Emails are unique; password hashes are stored as opaque bcrypt strings
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

use super::Database;
use crate::errors::{AppError, AppResult};
use crate::models::User;
use chrono::{DateTime, Utc};
use sqlx::Row;

impl Database {
    /// Create the users table
    pub(super) async fn migrate_users(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_users_email ON users(email)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Create a new user account
    ///
    /// # Errors
    ///
    /// Returns `ResourceAlreadyExists` if the email is taken, or a
    /// database error otherwise.
    pub async fn create_user(&self, email: &str, password_hash: &str) -> AppResult<User> {
        let now = Utc::now();

        if self.get_user_by_email(email).await?.is_some() {
            return Err(AppError::already_exists(format!(
                "A user with email {email} already exists"
            )));
        }

        let result = sqlx::query(
            r"
            INSERT INTO users (email, password_hash, created_at)
            VALUES ($1, $2, $3)
            ",
        )
        .bind(email)
        .bind(password_hash)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            email: email.to_owned(),
            password_hash: password_hash.to_owned(),
            created_at: now,
        })
    }

    /// Get a user by id
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_user(&self, user_id: i64) -> AppResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Self::row_to_user(&r)))
    }

    /// Get a user by email
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Self::row_to_user(&r)))
    }

    fn row_to_user(r: &sqlx::sqlite::SqliteRow) -> User {
        User {
            id: r.get("id"),
            email: r.get("email"),
            password_hash: r.get("password_hash"),
            created_at: r.get::<DateTime<Utc>, _>("created_at"),
        }
    }
}
