// ABOUTME: Chat agent endpoint plus conversation read, list, and delete routes
// ABOUTME: Model failures never surface as HTTP errors once the conversation resolves
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Conversational task management.
//!
//! The chat handler is the only state machine in the system and it is a
//! short one: resolve the conversation, persist the inbound message, run
//! the model's tool loop, persist whatever comes back. The inbound
//! message is written before the model call so it survives provider
//! outages, and the assistant row is written on both the success and the
//! apology path.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::llm::{prompts::task_agent_system_prompt, ChatMessage, CompletionRequest};
use crate::models::ConversationMessage;
use crate::resources::ServerResources;
use crate::tools::{tool_declarations, ToolRegistry};

/// Maximum number of tool round trips before the turn is abandoned
const MAX_TOOL_ITERATIONS: usize = 10;

/// Fallback reply when the model call fails for any reason
const FALLBACK_REPLY: &str = "I'm sorry, I encountered an error processing your request. \
Please try again or contact support if the issue persists.";

/// Request body for a chat turn
#[derive(Debug, Deserialize)]
pub struct ChatTurnRequest {
    /// The user's message
    pub message: String,
    /// Existing conversation to continue; absent starts a new one
    #[serde(default)]
    pub conversation_id: Option<i64>,
}

/// Response body for a chat turn
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatTurnResponse {
    /// The assistant's reply (real or fallback)
    pub message: String,
    /// Conversation the turn was recorded in
    pub conversation_id: i64,
}

/// A conversation with its full ordered message history
#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationDetailResponse {
    /// Conversation id
    pub id: i64,
    /// Owning user id
    pub user_id: i64,
    /// When the conversation was created
    pub created_at: DateTime<Utc>,
    /// When the conversation was last updated
    pub updated_at: DateTime<Utc>,
    /// Messages, oldest first
    pub messages: Vec<ConversationMessage>,
}

/// Chat routes
pub struct ChatRoutes;

impl ChatRoutes {
    /// Build the chat router
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat", post(Self::chat))
            .route("/api/chat", get(Self::list_conversations))
            .route("/api/chat/:conversation_id", get(Self::get_conversation))
            .route(
                "/api/chat/:conversation_id",
                delete(Self::delete_conversation),
            )
            .with_state(resources)
    }

    /// One conversational turn with the task agent
    ///
    /// Once the conversation is resolved this handler always answers 200:
    /// provider errors degrade to [`FALLBACK_REPLY`] rather than an HTTP
    /// failure, and both sides of the turn are persisted either way.
    async fn chat(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(request): Json<ChatTurnRequest>,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        // Resolve the conversation and capture history from before this turn
        let (conversation, history) = match request.conversation_id {
            Some(id) => {
                let conversation = resources
                    .database
                    .get_conversation(auth.user_id, id)
                    .await?
                    .ok_or_else(|| AppError::not_found("Conversation"))?;
                let history = resources.database.get_conversation_messages(id).await?;
                (conversation, history)
            }
            None => {
                let conversation = resources.database.create_conversation(auth.user_id).await?;
                (conversation, Vec::new())
            }
        };

        // Persist the inbound message first so it survives a model outage
        resources
            .database
            .append_conversation_message(conversation.id, "user", &request.message)
            .await?;

        let reply =
            match Self::run_agent_turn(&resources, auth.user_id, &request.message, &history).await
            {
                Ok(reply) => reply,
                Err(e) => {
                    warn!(conversation_id = conversation.id, error = %e, "Agent turn failed, sending fallback reply");
                    FALLBACK_REPLY.to_owned()
                }
            };

        resources
            .database
            .append_conversation_message(conversation.id, "assistant", &reply)
            .await?;

        Ok(Json(ChatTurnResponse {
            message: reply,
            conversation_id: conversation.id,
        })
        .into_response())
    }

    /// Run the bounded tool loop for one turn
    ///
    /// The model may answer in text straight away or request tool calls;
    /// each result is fed back as a user-role message until it produces
    /// text or the iteration budget runs out.
    async fn run_agent_turn(
        resources: &ServerResources,
        owner: i64,
        message: &str,
        history: &[ConversationMessage],
    ) -> Result<String, AppError> {
        let registry = ToolRegistry::new(resources.database.clone());
        let tools = tool_declarations();

        let mut messages = Vec::with_capacity(history.len() + 2);
        messages.push(ChatMessage::system(task_agent_system_prompt()));
        for entry in history {
            match entry.role.as_str() {
                "user" => messages.push(ChatMessage::user(&entry.content)),
                "assistant" => messages.push(ChatMessage::assistant(&entry.content)),
                _ => {}
            }
        }
        messages.push(ChatMessage::user(message));

        for iteration in 0..MAX_TOOL_ITERATIONS {
            let request = CompletionRequest::new(messages.clone()).with_tools(tools.clone());
            let response = resources.provider.complete(&request).await?;

            if !response.has_function_calls() {
                return Ok(response.content.unwrap_or_default());
            }

            info!(
                iteration,
                calls = response.function_calls.len(),
                "Executing tool calls"
            );

            // Keep any interim text the model produced alongside its calls
            if let Some(text) = &response.content {
                if !text.is_empty() {
                    messages.push(ChatMessage::assistant(text));
                }
            }

            for call in &response.function_calls {
                let result = registry.dispatch(owner, &call.name, &call.args).await;
                messages.push(ChatMessage::user(format!(
                    "[Tool Result for {}]: {result}",
                    call.name
                )));
            }
        }

        Err(AppError::external_service(
            "Model did not produce a final reply within the tool iteration budget",
        ))
    }

    async fn get_conversation(
        State(resources): State<Arc<ServerResources>>,
        Path(conversation_id): Path<i64>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        let conversation = resources
            .database
            .get_conversation(auth.user_id, conversation_id)
            .await?
            .ok_or_else(|| AppError::not_found("Conversation"))?;

        let messages = resources
            .database
            .get_conversation_messages(conversation_id)
            .await?;

        Ok(Json(ConversationDetailResponse {
            id: conversation.id,
            user_id: conversation.user_id,
            created_at: conversation.created_at,
            updated_at: conversation.updated_at,
            messages,
        })
        .into_response())
    }

    async fn list_conversations(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        let summaries = resources.database.list_conversations(auth.user_id).await?;

        Ok(Json(summaries).into_response())
    }

    async fn delete_conversation(
        State(resources): State<Arc<ServerResources>>,
        Path(conversation_id): Path<i64>,
        headers: HeaderMap,
    ) -> Result<Response, AppError> {
        let auth = resources.auth_manager.authenticate(&headers)?;

        let deleted = resources
            .database
            .delete_conversation(auth.user_id, conversation_id)
            .await?;
        if !deleted {
            return Err(AppError::not_found("Conversation"));
        }

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
