// ABOUTME: Shared server resources wired once at startup and injected into every handler
// ABOUTME: The LLM provider is held behind a trait object so tests can substitute a script
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Centralized dependency container. Handlers receive an
//! `Arc<ServerResources>` as axum state instead of constructing their own
//! clients, which keeps resource creation at the composition root.

use std::sync::Arc;

use crate::auth::AuthManager;
use crate::database::Database;
use crate::llm::LlmProvider;

/// Long-lived resources shared by all request handlers
pub struct ServerResources {
    /// Database handle (pooled, cheap to clone)
    pub database: Arc<Database>,
    /// Token and password management
    pub auth_manager: Arc<AuthManager>,
    /// Language-model backend driving the chat agent
    pub provider: Arc<dyn LlmProvider>,
}

impl ServerResources {
    /// Assemble the resource container
    #[must_use]
    pub fn new(database: Database, auth_manager: AuthManager, provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            database: Arc::new(database),
            auth_manager: Arc::new(auth_manager),
            provider,
        }
    }
}
