// ABOUTME: Conversation store: chat history persistence for the agent endpoint
// ABOUTME: Appending a message bumps the parent conversation's updated_at
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Conversation and message persistence.
//!
//! Conversations are owner-scoped like tasks. Messages are only ever
//! reached through a conversation the caller already resolved, so the
//! message queries key on `conversation_id` alone.

use super::Database;
use crate::errors::AppResult;
use crate::models::{Conversation, ConversationMessage, ConversationSummary};
use chrono::{DateTime, Utc};
use sqlx::Row;

impl Database {
    /// Create the conversations and messages tables
    pub(super) async fn migrate_conversations(&self) -> AppResult<()> {
        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS conversations (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL REFERENCES users(id),
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r"
            CREATE TABLE IF NOT EXISTS conversation_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                conversation_id INTEGER NOT NULL REFERENCES conversations(id),
                role TEXT NOT NULL,
                content TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            ",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversations_user_id ON conversations(user_id)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_conversation_messages_conversation_id
             ON conversation_messages(conversation_id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Create a new conversation for a user
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_conversation(&self, owner: i64) -> AppResult<Conversation> {
        let now = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO conversations (user_id, created_at, updated_at)
            VALUES ($1, $2, $2)
            ",
        )
        .bind(owner)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(Conversation {
            id: result.last_insert_rowid(),
            user_id: owner,
            created_at: now,
            updated_at: now,
        })
    }

    /// Get a conversation by id, owner-scoped
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_conversation(
        &self,
        owner: i64,
        conversation_id: i64,
    ) -> AppResult<Option<Conversation>> {
        let row = sqlx::query(
            r"
            SELECT id, user_id, created_at, updated_at
            FROM conversations
            WHERE id = $1 AND user_id = $2
            ",
        )
        .bind(conversation_id)
        .bind(owner)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Conversation {
            id: r.get("id"),
            user_id: r.get("user_id"),
            created_at: r.get::<DateTime<Utc>, _>("created_at"),
            updated_at: r.get::<DateTime<Utc>, _>("updated_at"),
        }))
    }

    /// List a user's conversations with message counts, most recent first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn list_conversations(&self, owner: i64) -> AppResult<Vec<ConversationSummary>> {
        let rows = sqlx::query(
            r"
            SELECT c.id, c.created_at, c.updated_at, COUNT(m.id) AS message_count
            FROM conversations c
            LEFT JOIN conversation_messages m ON m.conversation_id = c.id
            WHERE c.user_id = $1
            GROUP BY c.id
            ORDER BY c.updated_at DESC, c.id DESC
            ",
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| ConversationSummary {
                id: r.get("id"),
                created_at: r.get::<DateTime<Utc>, _>("created_at"),
                updated_at: r.get::<DateTime<Utc>, _>("updated_at"),
                message_count: r.get("message_count"),
            })
            .collect())
    }

    /// Get all messages in a conversation, oldest first
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn get_conversation_messages(
        &self,
        conversation_id: i64,
    ) -> AppResult<Vec<ConversationMessage>> {
        let rows = sqlx::query(
            r"
            SELECT id, conversation_id, role, content, created_at
            FROM conversation_messages
            WHERE conversation_id = $1
            ORDER BY created_at ASC, id ASC
            ",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .iter()
            .map(|r| ConversationMessage {
                id: r.get("id"),
                conversation_id: r.get("conversation_id"),
                role: r.get("role"),
                content: r.get("content"),
                created_at: r.get::<DateTime<Utc>, _>("created_at"),
            })
            .collect())
    }

    /// Append a message to a conversation and touch its `updated_at`
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn append_conversation_message(
        &self,
        conversation_id: i64,
        role: &str,
        content: &str,
    ) -> AppResult<ConversationMessage> {
        let now = Utc::now();

        let result = sqlx::query(
            r"
            INSERT INTO conversation_messages (conversation_id, role, content, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(conversation_id)
        .bind(role)
        .bind(content)
        .bind(now)
        .execute(&self.pool)
        .await?;

        sqlx::query("UPDATE conversations SET updated_at = $1 WHERE id = $2")
            .bind(now)
            .bind(conversation_id)
            .execute(&self.pool)
            .await?;

        Ok(ConversationMessage {
            id: result.last_insert_rowid(),
            conversation_id,
            role: role.to_owned(),
            content: content.to_owned(),
            created_at: now,
        })
    }

    /// Delete a conversation and all its messages, owner-scoped
    ///
    /// Messages and the conversation row go in one transaction so a
    /// failure never leaves orphaned messages. Returns `false` when the
    /// conversation does not exist for this owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn delete_conversation(&self, owner: i64, conversation_id: i64) -> AppResult<bool> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r"
            DELETE FROM conversation_messages
            WHERE conversation_id IN (
                SELECT id FROM conversations WHERE id = $1 AND user_id = $2
            )
            ",
        )
        .bind(conversation_id)
        .bind(owner)
        .execute(&mut *tx)
        .await?;

        let result = sqlx::query("DELETE FROM conversations WHERE id = $1 AND user_id = $2")
            .bind(conversation_id)
            .bind(owner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
