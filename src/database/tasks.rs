// ABOUTME: Task store: owner-scoped CRUD with partial updates and lenient metadata parsing
// ABOUTME: Every query filters by (task id, owner id) so other users' tasks look nonexistent
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Task store operations.
//!
//! Invalid enum or date input is never an error here: creation falls
//! back to defaults, updates preserve the stored value. Ownership is
//! enforced inside the SQL itself, not by fetch-then-check.

use super::Database;
use crate::errors::AppResult;
use crate::models::{Task, TaskCategory, TaskPriority};
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use sqlx::Row;

/// Fields accepted when creating a task
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    /// Task title, required
    pub title: String,
    /// Optional description
    pub description: Option<String>,
    /// Priority text; unrecognized values coerce to MEDIUM
    pub priority: Option<String>,
    /// Category text; unrecognized values coerce to OTHER
    pub category: Option<String>,
    /// Due date text, parsed through the fallback chain
    pub due_date: Option<String>,
}

/// Partial update for a task; only supplied fields are applied
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// New title
    pub title: Option<String>,
    /// New description
    pub description: Option<String>,
    /// New completion flag
    pub completed: Option<bool>,
    /// Priority text; unrecognized values leave the stored value unchanged
    pub priority: Option<String>,
    /// Category text; unrecognized values leave the stored value unchanged
    pub category: Option<String>,
    /// Outer `Some` means the key was present; inner `None` (or an empty
    /// string) clears the due date, invalid text leaves it unchanged
    pub due_date: Option<Option<String>>,
}

/// Parse a due-date string through the supported fallback formats.
///
/// Tried in order: ISO-8601 date-time (with offset, seconds, or minutes
/// precision), `"YYYY-MM-DD HH:MM:SS"`, `"YYYY-MM-DD HH:MM"`, then a bare
/// `"YYYY-MM-DD"` interpreted as midnight. Anything else yields `None`.
#[must_use]
pub fn parse_due_date(raw: &str) -> Option<NaiveDateTime> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_utc());
    }

    const FORMATS: &[&str] = &[
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d %H:%M",
    ];
    for format in FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt);
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(|d| d.and_time(NaiveTime::MIN))
}

impl Database {
    /// Create the tasks table
    pub(super) async fn migrate_tasks(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS tasks (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                title TEXT NOT NULL,
                description TEXT,
                completed BOOLEAN NOT NULL DEFAULT 0,
                priority TEXT NOT NULL DEFAULT 'MEDIUM',
                category TEXT NOT NULL DEFAULT 'OTHER',
                due_date TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_tasks_user_id ON tasks(user_id)")
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Create a new task for a user
    ///
    /// Unrecognized priority/category text silently coerces to the
    /// default; an unparseable due date is stored as unset.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_task(&self, owner: i64, new: &NewTask) -> AppResult<Task> {
        let now = Utc::now();
        let priority = new
            .priority
            .as_deref()
            .and_then(TaskPriority::parse)
            .unwrap_or_default();
        let category = new
            .category
            .as_deref()
            .and_then(TaskCategory::parse)
            .unwrap_or_default();
        let due_date = new.due_date.as_deref().and_then(parse_due_date);

        let result = sqlx::query(
            r"
            INSERT INTO tasks (user_id, title, description, completed, priority, category, due_date, created_at, updated_at)
            VALUES ($1, $2, $3, 0, $4, $5, $6, $7, $7)
            ",
        )
        .bind(owner)
        .bind(&new.title)
        .bind(new.description.as_deref())
        .bind(priority.as_str())
        .bind(category.as_str())
        .bind(due_date)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Task {
            id: result.last_insert_rowid(),
            user_id: owner,
            title: new.title.clone(),
            description: new.description.clone(),
            completed: false,
            priority,
            category,
            due_date,
            created_at: now,
            updated_at: now,
        })
    }

    /// List a user's tasks, newest first, optionally filtered by completion
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_tasks(&self, owner: i64, completed: Option<bool>) -> AppResult<Vec<Task>> {
        let rows = match completed {
            Some(flag) => {
                sqlx::query(
                    r"
                    SELECT id, user_id, title, description, completed, priority, category, due_date, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1 AND completed = $2
                    ORDER BY created_at DESC, id DESC
                    ",
                )
                .bind(owner)
                .bind(flag)
                .fetch_all(&self.pool)
                .await?
            }
            None => {
                sqlx::query(
                    r"
                    SELECT id, user_id, title, description, completed, priority, category, due_date, created_at, updated_at
                    FROM tasks
                    WHERE user_id = $1
                    ORDER BY created_at DESC, id DESC
                    ",
                )
                .bind(owner)
                .fetch_all(&self.pool)
                .await?
            }
        };

        Ok(rows.iter().map(Self::row_to_task).collect())
    }

    /// Get a task by id, owner-scoped
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_task(&self, owner: i64, task_id: i64) -> AppResult<Option<Task>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, title, description, completed, priority, category, due_date, created_at, updated_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(task_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(Self::row_to_task))
    }

    /// Apply a partial update to a task, owner-scoped
    ///
    /// Only supplied fields change. Unrecognized priority/category text
    /// preserves the stored value; invalid due-date text is a no-op while
    /// an explicitly empty value clears it. Always bumps `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn update_task(
        &self,
        owner: i64,
        task_id: i64,
        patch: &TaskPatch,
    ) -> AppResult<Option<Task>> {
        let Some(mut task) = self.get_task(owner, task_id).await? else {
            return Ok(None);
        };

        if let Some(title) = &patch.title {
            task.title = title.clone();
        }
        if let Some(description) = &patch.description {
            task.description = Some(description.clone());
        }
        if let Some(completed) = patch.completed {
            task.completed = completed;
        }
        if let Some(priority) = patch.priority.as_deref().and_then(TaskPriority::parse) {
            task.priority = priority;
        }
        if let Some(category) = patch.category.as_deref().and_then(TaskCategory::parse) {
            task.category = category;
        }
        if let Some(raw) = &patch.due_date {
            match raw.as_deref().map(str::trim) {
                None | Some("") => task.due_date = None,
                Some(s) => {
                    if let Some(dt) = parse_due_date(s) {
                        task.due_date = Some(dt);
                    }
                }
            }
        }
        task.updated_at = Utc::now();

        sqlx::query(
            r"
            UPDATE tasks
            SET title = $1, description = $2, completed = $3, priority = $4,
                category = $5, due_date = $6, updated_at = $7
            WHERE id = $8 AND user_id = $9
            ",
        )
        .bind(&task.title)
        .bind(task.description.as_deref())
        .bind(task.completed)
        .bind(task.priority.as_str())
        .bind(task.category.as_str())
        .bind(task.due_date)
        .bind(task.updated_at)
        .bind(task_id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        Ok(Some(task))
    }

    /// Delete a task, owner-scoped
    ///
    /// Returns `false` when the task does not exist for this owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_task(&self, owner: i64, task_id: i64) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(owner)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Set the completion flag on a task, owner-scoped; bumps `updated_at`
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn set_task_completed(
        &self,
        owner: i64,
        task_id: i64,
        completed: bool,
    ) -> AppResult<Option<Task>> {
        let now = Utc::now();
        let result = sqlx::query(
            r"
            UPDATE tasks
            SET completed = $1, updated_at = $2
            WHERE id = $3 AND user_id = $4
            ",
        )
        .bind(completed)
        .bind(now)
        .bind(task_id)
        .bind(owner)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_task(owner, task_id).await
    }

    fn row_to_task(r: &sqlx::sqlite::SqliteRow) -> Task {
        Task {
            id: r.get("id"),
            user_id: r.get("user_id"),
            title: r.get("title"),
            description: r.get("description"),
            completed: r.get("completed"),
            priority: TaskPriority::parse(&r.get::<String, _>("priority")).unwrap_or_default(),
            category: TaskCategory::parse(&r.get::<String, _>("category")).unwrap_or_default(),
            due_date: r.get::<Option<NaiveDateTime>, _>("due_date"),
            created_at: r.get::<DateTime<Utc>, _>("created_at"),
            updated_at: r.get::<DateTime<Utc>, _>("updated_at"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    #[test]
    fn test_parse_bare_date_is_midnight() {
        let dt = parse_due_date("2026-02-21").unwrap();
        assert_eq!((dt.year(), dt.month(), dt.day()), (2026, 2, 21));
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (0, 0, 0));
    }

    #[test]
    fn test_parse_iso_datetime_minutes_precision() {
        let dt = parse_due_date("2026-02-21T15:30").unwrap();
        assert_eq!((dt.hour(), dt.minute()), (15, 30));
    }

    #[test]
    fn test_parse_space_separated_datetime() {
        let dt = parse_due_date("2026-02-21 15:30:00").unwrap();
        assert_eq!((dt.hour(), dt.minute(), dt.second()), (15, 30, 0));

        let dt = parse_due_date("2026-02-21 09:05").unwrap();
        assert_eq!((dt.hour(), dt.minute()), (9, 5));
    }

    #[test]
    fn test_parse_rfc3339_with_offset() {
        let dt = parse_due_date("2026-02-21T15:30:00Z").unwrap();
        assert_eq!((dt.hour(), dt.minute()), (15, 30));
    }

    #[test]
    fn test_parse_garbage_yields_none() {
        assert!(parse_due_date("not-a-date").is_none());
        assert!(parse_due_date("").is_none());
        assert!(parse_due_date("2026-13-45").is_none());
    }

    async fn test_db() -> (Database, i64) {
        let db = Database::new("sqlite::memory:").await.unwrap();
        let user = db.create_user("owner@example.com", "hash").await.unwrap();
        (db, user.id)
    }

    #[tokio::test]
    async fn test_create_defaults_unknown_enum_text() {
        let (db, owner) = test_db().await;
        let task = db
            .create_task(
                owner,
                &NewTask {
                    title: "Buy milk".into(),
                    priority: Some("mega-urgent".into()),
                    category: Some("groceries".into()),
                    ..NewTask::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(task.priority, TaskPriority::Medium);
        assert_eq!(task.category, TaskCategory::Other);
        assert!(!task.completed);
    }

    #[tokio::test]
    async fn test_update_preserves_unknown_enum_text() {
        let (db, owner) = test_db().await;
        let task = db
            .create_task(
                owner,
                &NewTask {
                    title: "Write report".into(),
                    priority: Some("high".into()),
                    ..NewTask::default()
                },
            )
            .await
            .unwrap();

        let updated = db
            .update_task(
                owner,
                task.id,
                &TaskPatch {
                    priority: Some("mega-urgent".into()),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        // Unknown text on update keeps the previous value, it does not default
        assert_eq!(updated.priority, TaskPriority::High);
    }

    #[tokio::test]
    async fn test_update_clears_and_preserves_due_date() {
        let (db, owner) = test_db().await;
        let task = db
            .create_task(
                owner,
                &NewTask {
                    title: "Dentist".into(),
                    due_date: Some("2026-02-21".into()),
                    ..NewTask::default()
                },
            )
            .await
            .unwrap();
        assert!(task.due_date.is_some());

        // Invalid text leaves the stored value unchanged
        let unchanged = db
            .update_task(
                owner,
                task.id,
                &TaskPatch {
                    due_date: Some(Some("whenever".into())),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(unchanged.due_date.is_some());

        // Explicit empty value clears it
        let cleared = db
            .update_task(
                owner,
                task.id,
                &TaskPatch {
                    due_date: Some(None),
                    ..TaskPatch::default()
                },
            )
            .await
            .unwrap()
            .unwrap();
        assert!(cleared.due_date.is_none());
    }

    #[tokio::test]
    async fn test_cross_user_access_looks_nonexistent() {
        let (db, owner) = test_db().await;
        let stranger = db.create_user("other@example.com", "hash").await.unwrap();

        let task = db
            .create_task(
                owner,
                &NewTask {
                    title: "Private".into(),
                    ..NewTask::default()
                },
            )
            .await
            .unwrap();

        assert!(db.get_task(stranger.id, task.id).await.unwrap().is_none());
        assert!(!db.delete_task(stranger.id, task.id).await.unwrap());
        assert!(db
            .update_task(stranger.id, task.id, &TaskPatch::default())
            .await
            .unwrap()
            .is_none());

        // Still visible to the owner afterwards
        assert!(db.get_task(owner, task.id).await.unwrap().is_some());
    }
}
