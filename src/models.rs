// ABOUTME: Core domain types: users, tasks, conversations, and their enum metadata
// ABOUTME: Task priority/category enums parse leniently so bad LLM output never errors
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Domain models for the task management backend.
//!
//! Priority and category parsing is intentionally lenient: unrecognized
//! text yields `None` so callers can choose between defaulting (create)
//! and preserving the stored value (update).

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A registered user account
#[derive(Debug, Clone, Serialize)]
pub struct User {
    /// Unique user id
    pub id: i64,
    /// Login email, unique
    pub email: String,
    /// Bcrypt password hash, never serialized
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Task priority levels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskPriority {
    /// Low priority
    Low,
    /// Default priority
    #[default]
    Medium,
    /// High priority
    High,
    /// Urgent priority
    Urgent,
}

impl TaskPriority {
    /// String token stored in the database and exposed in JSON
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Urgent => "URGENT",
        }
    }

    /// Case-insensitive parse; unknown text yields `None` rather than an error
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Some(Self::Low),
            "MEDIUM" => Some(Self::Medium),
            "HIGH" => Some(Self::High),
            "URGENT" => Some(Self::Urgent),
            _ => None,
        }
    }
}

/// Task categories
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskCategory {
    /// Personal errands
    Personal,
    /// Work items
    Work,
    /// Shopping lists
    Shopping,
    /// Health and fitness
    Health,
    /// Study and learning
    Learning,
    /// Side projects
    Project,
    /// Default bucket
    #[default]
    Other,
}

impl TaskCategory {
    /// String token stored in the database and exposed in JSON
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "PERSONAL",
            Self::Work => "WORK",
            Self::Shopping => "SHOPPING",
            Self::Health => "HEALTH",
            Self::Learning => "LEARNING",
            Self::Project => "PROJECT",
            Self::Other => "OTHER",
        }
    }

    /// Case-insensitive parse; unknown text yields `None` rather than an error
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PERSONAL" => Some(Self::Personal),
            "WORK" => Some(Self::Work),
            "SHOPPING" => Some(Self::Shopping),
            "HEALTH" => Some(Self::Health),
            "LEARNING" => Some(Self::Learning),
            "PROJECT" => Some(Self::Project),
            "OTHER" => Some(Self::Other),
            _ => None,
        }
    }
}

/// A task record owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task id
    pub id: i64,
    /// Owning user id, immutable once set
    pub user_id: i64,
    /// Task title
    pub title: String,
    /// Optional free-text description
    pub description: Option<String>,
    /// Completion flag
    pub completed: bool,
    /// Priority, defaults to MEDIUM
    pub priority: TaskPriority,
    /// Category, defaults to OTHER
    pub category: TaskCategory,
    /// Optional due date-time (no timezone; interpreted as local wall clock)
    pub due_date: Option<NaiveDateTime>,
    /// When the task was created
    pub created_at: DateTime<Utc>,
    /// When the task was last modified
    pub updated_at: DateTime<Utc>,
}

/// A chat conversation owned by exactly one user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    /// Unique conversation id
    pub id: i64,
    /// Owning user id, immutable once set
    pub user_id: i64,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
    /// Bumped whenever a message is appended
    pub updated_at: DateTime<Utc>,
}

/// Summary of a conversation for listing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// Conversation id
    pub id: i64,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
    /// When the conversation was last updated
    pub updated_at: DateTime<Utc>,
    /// Number of messages in the conversation
    pub message_count: i64,
}

/// A single persisted message within a conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationMessage {
    /// Unique message id
    pub id: i64,
    /// Parent conversation id
    pub conversation_id: i64,
    /// Role string: "user" or "assistant"
    pub role: String,
    /// Message text
    pub content: String,
    /// When the message was created
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_priority_parse_is_case_insensitive() {
        assert_eq!(TaskPriority::parse("urgent"), Some(TaskPriority::Urgent));
        assert_eq!(TaskPriority::parse("  High "), Some(TaskPriority::High));
        assert_eq!(TaskPriority::parse("LOW"), Some(TaskPriority::Low));
    }

    #[test]
    fn test_priority_parse_rejects_unknown() {
        assert_eq!(TaskPriority::parse("critical"), None);
        assert_eq!(TaskPriority::parse(""), None);
    }

    #[test]
    fn test_category_parse_roundtrip() {
        for category in [
            TaskCategory::Personal,
            TaskCategory::Work,
            TaskCategory::Shopping,
            TaskCategory::Health,
            TaskCategory::Learning,
            TaskCategory::Project,
            TaskCategory::Other,
        ] {
            assert_eq!(TaskCategory::parse(category.as_str()), Some(category));
        }
    }

    #[test]
    fn test_enum_json_tokens_are_uppercase() {
        let json = serde_json::to_string(&TaskPriority::Medium).unwrap();
        assert_eq!(json, "\"MEDIUM\"");
        let json = serde_json::to_string(&TaskCategory::Other).unwrap();
        assert_eq!(json, "\"OTHER\"");
    }

    #[test]
    fn test_user_password_hash_never_serialized() {
        let user = User {
            id: 1,
            email: "a@example.com".into(),
            password_hash: "secret-hash".into(),
            created_at: Utc::now(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret-hash"));
    }
}
