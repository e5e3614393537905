// ABOUTME: LLM provider abstraction layer for pluggable model integration
// ABOUTME: Defines the completion contract the chat orchestrator depends on
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # LLM Provider Service Provider Interface
//!
//! The contract a model backend must implement to drive the chat agent.
//! A completion either carries text or function calls; the orchestrator
//! executes the calls and feeds results back until the model answers in
//! plain text. Tests substitute a scripted implementation, so nothing in
//! the crate other than [`GeminiProvider`] talks to a real API.

mod gemini;
pub mod prompts;

pub use gemini::GeminiProvider;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AppError;

// ============================================================================
// Message Types
// ============================================================================

/// Role of a message in the conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System instruction message
    System,
    /// User input message
    User,
    /// Assistant response message
    Assistant,
}

impl MessageRole {
    /// Convert to string representation for API calls and persistence
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// A single message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender
    pub role: MessageRole,
    /// Content of the message
    pub content: String,
}

impl ChatMessage {
    /// Create a new chat message
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    /// Create a system message
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    /// Create a user message
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    /// Create an assistant message
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

// ============================================================================
// Function Calling Types
// ============================================================================

/// Function call requested by the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Name of the function to call
    pub name: String,
    /// Arguments for the function as a JSON object
    pub args: serde_json::Value,
}

/// Function declaration exposed to the model as a callable tool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunctionDeclaration {
    /// Name of the function
    pub name: String,
    /// Description of what the function does
    pub description: String,
    /// Parameters schema (JSON Schema format)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Configuration for a chat completion request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Conversation messages, system instruction included
    pub messages: Vec<ChatMessage>,
    /// Model identifier (provider-specific); `None` uses the provider default
    pub model: Option<String>,
    /// Temperature for response randomness (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Tool declarations the model may call; empty disables function calling
    pub tools: Vec<FunctionDeclaration>,
}

impl CompletionRequest {
    /// Create a new completion request with messages
    #[must_use]
    pub const fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            model: None,
            temperature: None,
            tools: Vec::new(),
        }
    }

    /// Attach tool declarations
    #[must_use]
    pub fn with_tools(mut self, tools: Vec<FunctionDeclaration>) -> Self {
        self.tools = tools;
        self
    }

    /// Set the temperature
    #[must_use]
    pub const fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// Response from a chat completion
///
/// Exactly one of `content` or `function_calls` is meaningful: a model
/// turn either answers in text or asks for tools to run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    /// Generated message content (`None` when function calls are present)
    pub content: Option<String>,
    /// Function calls requested by the model
    pub function_calls: Vec<FunctionCall>,
    /// Finish reason (stop, length, etc.)
    pub finish_reason: Option<String>,
}

impl CompletionResponse {
    /// Build a plain text response
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            function_calls: Vec::new(),
            finish_reason: Some("stop".into()),
        }
    }

    /// Check if this response contains function calls
    #[must_use]
    pub fn has_function_calls(&self) -> bool {
        !self.function_calls.is_empty()
    }
}

// ============================================================================
// Provider Trait
// ============================================================================

/// LLM provider trait for chat completion with function calling
///
/// Implementations must be cheap to share behind an `Arc` and safe to
/// call concurrently.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Unique provider identifier (e.g., "gemini")
    fn name(&self) -> &'static str;

    /// Default model to use if not specified in the request
    fn default_model(&self) -> &str;

    /// Perform a chat completion
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream API is unreachable or rejects
    /// the request.
    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, AppError>;
}
