// ABOUTME: Fixed catalogue of task-management tools callable by the chat agent
// ABOUTME: Dispatch is total: every outcome, including unknown tools, renders as text
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Tool Registry
//!
//! The agent's callable surface: seven task operations with JSON-schema
//! declarations, dispatched by name against the task store. The owner id
//! always comes from the authenticated request, never from the model, so
//! the schemas deliberately carry no user parameter.
//!
//! Dispatch never returns an error. Domain failures (task not found, bad
//! arguments, unknown tool name) become short human-readable text because
//! every result is fed back to the model as conversational context.

use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, warn};

use crate::database::{Database, NewTask, TaskPatch};
use crate::errors::AppError;
use crate::llm::FunctionDeclaration;
use crate::models::Task;

/// The closed set of tools the agent may invoke
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskTool {
    /// Create a new task
    CreateTask,
    /// List tasks, optionally filtered by completion
    ListTasks,
    /// Fetch one task's details
    GetTask,
    /// Partially update a task
    UpdateTask,
    /// Delete a task
    DeleteTask,
    /// Mark a task complete
    MarkTaskComplete,
    /// Mark a task incomplete
    MarkTaskIncomplete,
    /// Any name outside the catalogue
    Unsupported,
}

impl TaskTool {
    /// Resolve a tool name; anything unknown maps to [`Self::Unsupported`]
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "create_task" => Self::CreateTask,
            "list_tasks" => Self::ListTasks,
            "get_task" => Self::GetTask,
            "update_task" => Self::UpdateTask,
            "delete_task" => Self::DeleteTask,
            "mark_task_complete" => Self::MarkTaskComplete,
            "mark_task_incomplete" => Self::MarkTaskIncomplete,
            _ => Self::Unsupported,
        }
    }
}

/// Build the tool declarations advertised to the model
#[must_use]
pub fn tool_declarations() -> Vec<FunctionDeclaration> {
    let task_id_schema = json!({
        "type": "object",
        "properties": {
            "task_id": {"type": "integer", "description": "The ID of the task"}
        },
        "required": ["task_id"]
    });

    vec![
        FunctionDeclaration {
            name: "create_task".into(),
            description: "Create a new task for the user".into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "title": {"type": "string", "description": "The title of the task"},
                    "description": {"type": "string", "description": "Optional description of the task"},
                    "priority": {"type": "string", "description": "Priority: LOW, MEDIUM, HIGH, or URGENT"},
                    "category": {"type": "string", "description": "Category: PERSONAL, WORK, SHOPPING, HEALTH, LEARNING, PROJECT, or OTHER"},
                    "due_date": {"type": "string", "description": "Due date, YYYY-MM-DD or YYYY-MM-DDTHH:MM"}
                },
                "required": ["title"]
            })),
        },
        FunctionDeclaration {
            name: "list_tasks".into(),
            description: "List all tasks for the user, optionally filtered by completion status"
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "completed": {"type": "boolean", "description": "Filter by completion status (optional)"}
                }
            })),
        },
        FunctionDeclaration {
            name: "get_task".into(),
            description: "Get details of a specific task".into(),
            parameters: Some(task_id_schema.clone()),
        },
        FunctionDeclaration {
            name: "update_task".into(),
            description: "Update a task's title, description, completion status, priority, category, or due date"
                .into(),
            parameters: Some(json!({
                "type": "object",
                "properties": {
                    "task_id": {"type": "integer", "description": "The ID of the task to update"},
                    "title": {"type": "string", "description": "New title (optional)"},
                    "description": {"type": "string", "description": "New description (optional)"},
                    "completed": {"type": "boolean", "description": "New completion status (optional)"},
                    "priority": {"type": "string", "description": "New priority (optional)"},
                    "category": {"type": "string", "description": "New category (optional)"},
                    "due_date": {"type": "string", "description": "New due date; empty string clears it (optional)"}
                },
                "required": ["task_id"]
            })),
        },
        FunctionDeclaration {
            name: "delete_task".into(),
            description: "Delete a task".into(),
            parameters: Some(task_id_schema.clone()),
        },
        FunctionDeclaration {
            name: "mark_task_complete".into(),
            description: "Mark a task as complete".into(),
            parameters: Some(task_id_schema.clone()),
        },
        FunctionDeclaration {
            name: "mark_task_incomplete".into(),
            description: "Mark a task as incomplete".into(),
            parameters: Some(task_id_schema),
        },
    ]
}

/// Dispatches named tool calls to the task store
pub struct ToolRegistry {
    database: Arc<Database>,
}

impl ToolRegistry {
    /// Create a registry bound to a database
    #[must_use]
    pub fn new(database: Arc<Database>) -> Self {
        Self { database }
    }

    /// Execute a tool call on behalf of the authenticated owner
    ///
    /// Total over any input: unknown names, missing arguments, absent
    /// tasks, and database failures all come back as text.
    pub async fn dispatch(&self, owner: i64, name: &str, args: &Value) -> String {
        match TaskTool::from_name(name) {
            TaskTool::CreateTask => self.create_task(owner, args).await,
            TaskTool::ListTasks => self.list_tasks(owner, args).await,
            TaskTool::GetTask => self.get_task(owner, args).await,
            TaskTool::UpdateTask => self.update_task(owner, args).await,
            TaskTool::DeleteTask => self.delete_task(owner, args).await,
            TaskTool::MarkTaskComplete => self.set_completed(owner, args, true).await,
            TaskTool::MarkTaskIncomplete => self.set_completed(owner, args, false).await,
            TaskTool::Unsupported => {
                warn!(tool = %name, "Model requested a tool outside the catalogue");
                format!("Unknown tool: {name}")
            }
        }
    }

    async fn create_task(&self, owner: i64, args: &Value) -> String {
        let Some(title) = arg_str(args, "title") else {
            return "A task title is required.".into();
        };

        let new = NewTask {
            title,
            description: arg_str(args, "description"),
            priority: arg_str(args, "priority"),
            category: arg_str(args, "category"),
            due_date: arg_str(args, "due_date"),
        };

        match self.database.create_task(owner, &new).await {
            Ok(task) => format!(
                "Task created successfully! ID: {}, Title: {}, Priority: {}, Category: {}",
                task.id,
                task.title,
                task.priority.as_str(),
                task.category.as_str()
            ),
            Err(e) => render_store_error("create_task", &e),
        }
    }

    async fn list_tasks(&self, owner: i64, args: &Value) -> String {
        let completed = args.get("completed").and_then(Value::as_bool);

        match self.database.list_tasks(owner, completed).await {
            Ok(tasks) if tasks.is_empty() => "No tasks found.".into(),
            Ok(tasks) => tasks
                .iter()
                .map(render_task_line)
                .collect::<Vec<_>>()
                .join("\n"),
            Err(e) => render_store_error("list_tasks", &e),
        }
    }

    async fn get_task(&self, owner: i64, args: &Value) -> String {
        let Some(task_id) = arg_i64(args, "task_id") else {
            return "Task not found.".into();
        };

        match self.database.get_task(owner, task_id).await {
            Ok(Some(task)) => {
                let status = if task.completed {
                    "Complete"
                } else {
                    "Incomplete"
                };
                format!(
                    "Task ID: {}\nTitle: {}\nDescription: {}\nStatus: {}\nCreated: {}",
                    task.id,
                    task.title,
                    task.description.as_deref().unwrap_or_default(),
                    status,
                    task.created_at
                )
            }
            Ok(None) => "Task not found.".into(),
            Err(e) => render_store_error("get_task", &e),
        }
    }

    async fn update_task(&self, owner: i64, args: &Value) -> String {
        let Some(task_id) = arg_i64(args, "task_id") else {
            return "Task not found.".into();
        };

        // Presence of the due_date key matters: null or "" clears the date
        let due_date = args
            .get("due_date")
            .map(|v| v.as_str().map(ToOwned::to_owned));

        let patch = TaskPatch {
            title: arg_str(args, "title"),
            description: arg_str(args, "description"),
            completed: args.get("completed").and_then(Value::as_bool),
            priority: arg_str(args, "priority"),
            category: arg_str(args, "category"),
            due_date,
        };

        match self.database.update_task(owner, task_id, &patch).await {
            Ok(Some(task)) => format!(
                "Task {} '{}' updated successfully! Priority: {}, Category: {}",
                task.id,
                task.title,
                task.priority.as_str(),
                task.category.as_str()
            ),
            Ok(None) => "Task not found.".into(),
            Err(e) => render_store_error("update_task", &e),
        }
    }

    async fn delete_task(&self, owner: i64, args: &Value) -> String {
        let Some(task_id) = arg_i64(args, "task_id") else {
            return "Task not found.".into();
        };

        // Fetch first so the confirmation can name the task
        let task = match self.database.get_task(owner, task_id).await {
            Ok(Some(task)) => task,
            Ok(None) => return "Task not found.".into(),
            Err(e) => return render_store_error("delete_task", &e),
        };

        match self.database.delete_task(owner, task_id).await {
            Ok(true) => format!("Task '{}' deleted successfully!", task.title),
            Ok(false) => "Task not found.".into(),
            Err(e) => render_store_error("delete_task", &e),
        }
    }

    async fn set_completed(&self, owner: i64, args: &Value, completed: bool) -> String {
        let Some(task_id) = arg_i64(args, "task_id") else {
            return "Task not found.".into();
        };

        match self
            .database
            .set_task_completed(owner, task_id, completed)
            .await
        {
            Ok(Some(task)) if completed => {
                format!("Task '{}' marked as complete! \u{2713}", task.title)
            }
            Ok(Some(task)) => format!("Task '{}' marked as incomplete.", task.title),
            Ok(None) => "Task not found.".into(),
            Err(e) => render_store_error("set_completed", &e),
        }
    }
}

fn render_task_line(task: &Task) -> String {
    let status = if task.completed { "\u{2713}" } else { "\u{25cb}" };
    match task.description.as_deref() {
        Some(description) if !description.is_empty() => {
            format!("{status} [{}] {} - {description}", task.id, task.title)
        }
        _ => format!("{status} [{}] {}", task.id, task.title),
    }
}

fn render_store_error(tool: &str, err: &AppError) -> String {
    error!(tool = %tool, error = %err, "Tool execution failed");
    "An internal error occurred while handling the task operation.".into()
}

fn arg_str(args: &Value, key: &str) -> Option<String> {
    args.get(key)
        .and_then(Value::as_str)
        .map(ToOwned::to_owned)
}

fn arg_i64(args: &Value, key: &str) -> Option<i64> {
    args.get(key).and_then(Value::as_i64)
}
