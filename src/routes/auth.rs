// ABOUTME: Account routes: registration with bcrypt hashing and JWT login
// ABOUTME: Login failures are deliberately vague; email existence is never confirmed
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Registration and login endpoints.

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::models::User;
use crate::resources::ServerResources;

/// Minimum accepted password length
const MIN_PASSWORD_LENGTH: usize = 8;

/// Request to register a new account
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    /// Login email
    pub email: String,
    /// Plaintext password, hashed before storage
    pub password: String,
}

/// Response for a successful registration
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    /// Id of the new user
    pub user_id: i64,
    /// Human-readable confirmation
    pub message: String,
}

/// Request to log in
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Login email
    pub email: String,
    /// Plaintext password
    pub password: String,
}

/// Response for a successful login
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests
    pub jwt_token: String,
    /// Token expiry time
    pub expires_at: DateTime<Utc>,
    /// The authenticated user (password hash omitted)
    pub user: User,
}

/// Account registration and login routes
pub struct AuthRoutes;

impl AuthRoutes {
    /// Build the auth router
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::register))
            .route("/api/auth/login", post(Self::login))
            .with_state(resources)
    }

    async fn register(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<RegisterRequest>,
    ) -> Result<Response, AppError> {
        let email = request.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(AppError::invalid_input("A valid email address is required"));
        }
        if request.password.len() < MIN_PASSWORD_LENGTH {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_LENGTH} characters"
            )));
        }

        let password_hash = resources.auth_manager.hash_password(&request.password)?;
        let user = resources.database.create_user(email, &password_hash).await?;

        info!(user_id = user.id, "Registered new user");

        Ok((
            StatusCode::CREATED,
            Json(RegisterResponse {
                user_id: user.id,
                message: "User registered successfully".into(),
            }),
        )
            .into_response())
    }

    async fn login(
        State(resources): State<Arc<ServerResources>>,
        Json(request): Json<LoginRequest>,
    ) -> Result<Response, AppError> {
        let user = resources
            .database
            .get_user_by_email(request.email.trim())
            .await?
            .ok_or_else(|| AppError::auth_invalid("Invalid email or password"))?;

        let verified = resources
            .auth_manager
            .verify_password(&request.password, &user.password_hash)?;
        if !verified {
            return Err(AppError::auth_invalid("Invalid email or password"));
        }

        let (jwt_token, expires_at) = resources.auth_manager.generate_token(&user)?;

        info!(user_id = user.id, "User logged in");

        Ok(Json(LoginResponse {
            jwt_token,
            expires_at,
            user,
        })
        .into_response())
    }
}
