// ABOUTME: Environment-driven server configuration with sensible development defaults
// ABOUTME: Reads HTTP_PORT, DATABASE_URL, JWT_SECRET and friends at startup
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Server configuration loaded from environment variables.
//!
//! | Variable | Default | Meaning |
//! |---|---|---|
//! | `HTTP_PORT` | `8080` | Port the HTTP server binds to |
//! | `DATABASE_URL` | `sqlite:data/taskmind.db` | SQLite database location |
//! | `JWT_SECRET` | required | HMAC secret for signing session tokens |
//! | `JWT_EXPIRY_HOURS` | `24` | Session token lifetime |
//! | `CORS_ALLOWED_ORIGINS` | `*` | Comma-separated list, or `*` |

use crate::errors::{AppError, AppResult};
use std::env;

/// Top-level server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Port the HTTP server binds to
    pub http_port: u16,
    /// SQLite database URL
    pub database_url: String,
    /// Secret used to sign and verify JWTs
    pub jwt_secret: String,
    /// Session token lifetime in hours
    pub jwt_expiry_hours: i64,
    /// Allowed CORS origins; `*` means any
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_SECRET` is missing or a numeric variable
    /// cannot be parsed.
    pub fn from_env() -> AppResult<Self> {
        let http_port = env::var("HTTP_PORT").map_or(Ok(8080), |v| {
            v.parse::<u16>()
                .map_err(|e| AppError::config(format!("Invalid HTTP_PORT '{v}': {e}")))
        })?;

        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data/taskmind.db".to_owned());

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| AppError::config("JWT_SECRET environment variable not set"))?;

        let jwt_expiry_hours = env::var("JWT_EXPIRY_HOURS").map_or(Ok(24), |v| {
            v.parse::<i64>()
                .map_err(|e| AppError::config(format!("Invalid JWT_EXPIRY_HOURS '{v}': {e}")))
        })?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_owned())
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect();

        Ok(Self {
            http_port,
            database_url,
            jwt_secret,
            jwt_expiry_hours,
            cors_allowed_origins,
        })
    }

    /// One-line startup summary, safe to log (no secrets)
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "taskmind-server v{} on port {} (database: {}, token expiry: {}h)",
            env!("CARGO_PKG_VERSION"),
            self.http_port,
            self.database_url,
            self.jwt_expiry_hours
        )
    }

    /// Whether CORS should allow any origin
    #[must_use]
    pub fn cors_allow_any(&self) -> bool {
        self.cors_allowed_origins.iter().any(|o| o == "*")
    }
}
