// ABOUTME: Owner-scoped task CRUD routes under /api/{user_id}/tasks
// ABOUTME: Path user id must match the token subject (403); absent tasks are 404
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Task CRUD endpoints.
//!
//! Two distinct failure modes are kept apart on purpose: a path user id
//! that differs from the authenticated user is a 403, while a task that
//! does not exist for that owner (including tasks owned by someone else)
//! is a 404 with no further detail.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Deserializer};

use crate::auth::AuthResult;
use crate::database::{NewTask, TaskPatch};
use crate::errors::AppError;
use crate::resources::ServerResources;

/// Request body for creating a task
#[derive(Debug, Deserialize)]
pub struct CreateTaskRequest {
    /// Task title, required
    pub title: String,
    /// Optional description
    #[serde(default)]
    pub description: Option<String>,
    /// Priority text; unrecognized values default to MEDIUM
    #[serde(default)]
    pub priority: Option<String>,
    /// Category text; unrecognized values default to OTHER
    #[serde(default)]
    pub category: Option<String>,
    /// Due date text, parsed leniently
    #[serde(default)]
    pub due_date: Option<String>,
}

/// Request body for a partial task update
#[derive(Debug, Default, Deserialize)]
pub struct UpdateTaskRequest {
    /// New title
    #[serde(default)]
    pub title: Option<String>,
    /// New description
    #[serde(default)]
    pub description: Option<String>,
    /// New completion flag
    #[serde(default)]
    pub completed: Option<bool>,
    /// New priority; unrecognized text preserves the stored value
    #[serde(default)]
    pub priority: Option<String>,
    /// New category; unrecognized text preserves the stored value
    #[serde(default)]
    pub category: Option<String>,
    /// Due date; an explicit `null` or empty string clears it, a missing
    /// key leaves it alone
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<String>>,
}

/// Query parameters for listing tasks
#[derive(Debug, Deserialize)]
pub struct ListTasksQuery {
    /// Optional completion filter
    pub completed: Option<bool>,
}

/// Distinguish a present-but-null JSON key from an absent one
fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Task CRUD routes
pub struct TaskRoutes;

impl TaskRoutes {
    /// Build the tasks router
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/:user_id/tasks", post(Self::create_task))
            .route("/api/:user_id/tasks", get(Self::list_tasks))
            .route("/api/:user_id/tasks/:task_id", get(Self::get_task))
            .route("/api/:user_id/tasks/:task_id", put(Self::update_task))
            .route("/api/:user_id/tasks/:task_id", delete(Self::delete_task))
            .with_state(resources)
    }

    /// Authenticate and check that the path user id matches the token
    fn authorize(
        headers: &HeaderMap,
        resources: &ServerResources,
        path_user_id: i64,
    ) -> Result<AuthResult, AppError> {
        let auth = resources.auth_manager.authenticate(headers)?;
        if auth.user_id != path_user_id {
            return Err(AppError::forbidden("You can only access your own tasks"));
        }
        Ok(auth)
    }

    async fn create_task(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<i64>,
        headers: HeaderMap,
        Json(request): Json<CreateTaskRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authorize(&headers, &resources, user_id)?;

        if request.title.trim().is_empty() {
            return Err(AppError::invalid_input("Task title must not be empty"));
        }

        let new = NewTask {
            title: request.title,
            description: request.description,
            priority: request.priority,
            category: request.category,
            due_date: request.due_date,
        };
        let task = resources.database.create_task(auth.user_id, &new).await?;

        Ok((StatusCode::CREATED, Json(task)).into_response())
    }

    async fn list_tasks(
        State(resources): State<Arc<ServerResources>>,
        Path(user_id): Path<i64>,
        Query(query): Query<ListTasksQuery>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authorize(&headers, &resources, user_id)?;

        let tasks = resources
            .database
            .list_tasks(auth.user_id, query.completed)
            .await?;

        Ok(Json(tasks).into_response())
    }

    async fn get_task(
        State(resources): State<Arc<ServerResources>>,
        Path((user_id, task_id)): Path<(i64, i64)>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authorize(&headers, &resources, user_id)?;

        let task = resources
            .database
            .get_task(auth.user_id, task_id)
            .await?
            .ok_or_else(|| AppError::not_found("Task"))?;

        Ok(Json(task).into_response())
    }

    async fn update_task(
        State(resources): State<Arc<ServerResources>>,
        Path((user_id, task_id)): Path<(i64, i64)>,
        headers: HeaderMap,
        Json(request): Json<UpdateTaskRequest>,
    ) -> Result<Response, AppError> {
        let auth = Self::authorize(&headers, &resources, user_id)?;

        let patch = TaskPatch {
            title: request.title,
            description: request.description,
            completed: request.completed,
            priority: request.priority,
            category: request.category,
            due_date: request.due_date,
        };

        let task = resources
            .database
            .update_task(auth.user_id, task_id, &patch)
            .await?
            .ok_or_else(|| AppError::not_found("Task"))?;

        Ok(Json(task).into_response())
    }

    async fn delete_task(
        State(resources): State<Arc<ServerResources>>,
        Path((user_id, task_id)): Path<(i64, i64)>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = Self::authorize(&headers, &resources, user_id)?;

        let deleted = resources.database.delete_task(auth.user_id, task_id).await?;
        if !deleted {
            return Err(AppError::not_found("Task"));
        }

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Probe {
        #[serde(default, deserialize_with = "double_option")]
        due_date: Option<Option<String>>,
    }

    #[test]
    fn test_double_option_distinguishes_null_from_missing() {
        let missing: Probe = serde_json::from_str("{}").unwrap();
        assert_eq!(missing.due_date, None);

        let null: Probe = serde_json::from_str(r#"{"due_date": null}"#).unwrap();
        assert_eq!(null.due_date, Some(None));

        let value: Probe = serde_json::from_str(r#"{"due_date": "2026-02-21"}"#).unwrap();
        assert_eq!(value.due_date, Some(Some("2026-02-21".into())));
    }
}
