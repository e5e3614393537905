// ABOUTME: Shared setup for integration tests: in-memory resources and a scripted provider
// ABOUTME: MockProvider replays a fixed sequence of model responses without any network
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![allow(
    dead_code,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic
)]

//! Shared test utilities for `taskmind`.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use serde_json::Value;
use taskmind::{
    auth::AuthManager,
    database::Database,
    errors::AppError,
    llm::{CompletionRequest, CompletionResponse, FunctionCall, LlmProvider},
    resources::ServerResources,
};

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging once per test process
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_test_writer()
            .init();
    });
}

/// One scripted step of the mock model
pub enum ScriptStep {
    /// Reply with plain text
    Text(String),
    /// Request a single tool call
    ToolCall {
        /// Tool name
        name: String,
        /// Tool arguments
        args: Value,
    },
    /// Fail the completion call
    Failure(String),
}

/// Scripted `LlmProvider` replaying a fixed response sequence
///
/// Once the script is exhausted every further call answers with a
/// generic text reply, so over-long loops fail assertions rather than
/// panicking inside the provider.
pub struct MockProvider {
    script: Mutex<VecDeque<ScriptStep>>,
}

impl MockProvider {
    pub fn script(steps: Vec<ScriptStep>) -> Self {
        Self {
            script: Mutex::new(steps.into()),
        }
    }

    /// A provider that always answers with the given text
    pub fn text(reply: &str) -> Self {
        Self::script(vec![ScriptStep::Text(reply.to_owned())])
    }

    /// A provider whose first call fails
    pub fn failing() -> Self {
        Self::script(vec![ScriptStep::Failure("model unavailable".to_owned())])
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, AppError> {
        let step = self
            .script
            .lock()
            .expect("script lock poisoned")
            .pop_front();

        match step {
            Some(ScriptStep::Text(text)) => Ok(CompletionResponse::text(text)),
            Some(ScriptStep::ToolCall { name, args }) => Ok(CompletionResponse {
                content: None,
                function_calls: vec![FunctionCall { name, args }],
                finish_reason: Some("tool_calls".into()),
            }),
            Some(ScriptStep::Failure(message)) => Err(AppError::external_service(message)),
            None => Ok(CompletionResponse::text("OK")),
        }
    }
}

/// Build server resources over an in-memory database and the given provider
pub async fn test_resources_with(provider: Arc<dyn LlmProvider>) -> Arc<ServerResources> {
    init_test_logging();
    let database = Database::new("sqlite::memory:")
        .await
        .expect("in-memory database");
    let auth_manager = AuthManager::new(b"integration-test-secret-0123456789".to_vec(), 24);
    Arc::new(ServerResources::new(database, auth_manager, provider))
}

/// Resources with a provider that always answers in plain text
pub async fn test_resources() -> Arc<ServerResources> {
    test_resources_with(Arc::new(MockProvider::text("Happy to help with your tasks!"))).await
}

/// Create a user directly and issue a token for them
pub async fn create_user_with_token(
    resources: &ServerResources,
    email: &str,
) -> (i64, String) {
    let hash = resources
        .auth_manager
        .hash_password("test-password-123")
        .expect("hash password");
    let user = resources
        .database
        .create_user(email, &hash)
        .await
        .expect("create user");
    let (token, _) = resources
        .auth_manager
        .generate_token(&user)
        .expect("generate token");
    (user.id, token)
}
