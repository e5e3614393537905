// ABOUTME: Server binary: wires config, database, auth, and the Gemini provider together
// ABOUTME: Serves the axum router with CORS and graceful shutdown on ctrl-c
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # TaskMind Server Binary
//!
//! Starts the task-management backend: loads environment configuration,
//! opens (and migrates) the SQLite database, and serves the HTTP API.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use clap::Parser;
use taskmind::{
    auth::AuthManager,
    config::ServerConfig,
    database::Database,
    llm::{GeminiProvider, LlmProvider},
    logging,
    resources::ServerResources,
    routes,
};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

#[derive(Parser)]
#[command(name = "taskmind-server")]
#[command(about = "TaskMind - personal task management with a conversational agent")]
struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    logging::init_from_env()?;

    info!("Starting TaskMind server");
    info!("{}", config.summary());

    let database = Database::new(&config.database_url)
        .await
        .context("failed to open database")?;
    info!("Database ready: {}", config.database_url);

    let auth_manager = AuthManager::new(
        config.jwt_secret.clone().into_bytes(),
        config.jwt_expiry_hours,
    );

    let provider: Arc<dyn LlmProvider> = Arc::new(GeminiProvider::from_env()?);
    info!("LLM provider configured: {}", provider.name());

    let resources = Arc::new(ServerResources::new(database, auth_manager, provider));
    let router = routes::router(resources).layer(cors_layer(&config)?);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Listening on {addr}");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Shutdown complete");
    Ok(())
}

fn cors_layer(config: &ServerConfig) -> Result<CorsLayer> {
    if config.cors_allow_any() {
        return Ok(CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any));
    }

    let origins = config
        .cors_allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
