// ABOUTME: HTTP route composition: auth, task CRUD, chat agent, and liveness probe
// ABOUTME: Handlers authenticate per request; there is no middleware-held session
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # HTTP Routes
//!
//! Route modules are grouped by domain and merged into one [`Router`]
//! here. Every handler takes `State<Arc<ServerResources>>` and returns
//! `Result<Response, AppError>` so error bodies stay uniform.

pub mod auth;
pub mod chat;
pub mod tasks;

pub use auth::AuthRoutes;
pub use chat::ChatRoutes;
pub use tasks::TaskRoutes;

use std::sync::Arc;

use axum::{response::IntoResponse, routing::get, Json, Router};
use serde_json::json;
use tower_http::trace::TraceLayer;

use crate::resources::ServerResources;

/// Build the full application router
#[must_use]
pub fn router(resources: Arc<ServerResources>) -> Router {
    Router::new()
        .merge(AuthRoutes::routes(resources.clone()))
        .merge(TaskRoutes::routes(resources.clone()))
        .merge(ChatRoutes::routes(resources))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
}

/// Liveness probe for deploy environments and keep-alive pingers
async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}
