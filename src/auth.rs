// ABOUTME: JWT-based user authentication: token issue, validation, and password hashing
// ABOUTME: Handlers call authenticate() per request; there is no server-held session state
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! # Authentication
//!
//! JWT session tokens signed with an HMAC secret, plus bcrypt password
//! hashing for the credential store. Every protected route extracts the
//! bearer token from the `Authorization` header and resolves it to an
//! [`AuthResult`]; a missing or invalid token is a 401, never a panic.

use crate::errors::{AppError, AppResult};
use crate::models::User;
use axum::http::HeaderMap;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// `JWT` claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id as a string
    pub sub: String,
    /// User email
    pub email: String,
    /// Issued at timestamp
    pub iat: i64,
    /// Expiration timestamp
    pub exp: i64,
}

/// Authenticated request context
#[derive(Debug, Clone)]
pub struct AuthResult {
    /// Authenticated user id
    pub user_id: i64,
    /// Authenticated user email
    pub email: String,
}

/// Authentication manager handling tokens and password hashes
pub struct AuthManager {
    jwt_secret: Vec<u8>,
    expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager
    #[must_use]
    pub fn new(jwt_secret: Vec<u8>, expiry_hours: i64) -> Self {
        Self {
            jwt_secret,
            expiry_hours,
        }
    }

    /// Hash a password for storage
    ///
    /// # Errors
    ///
    /// Returns an error if bcrypt hashing fails.
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        bcrypt::hash(password, bcrypt::DEFAULT_COST)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))
    }

    /// Verify a password against a stored hash
    ///
    /// # Errors
    ///
    /// Returns an error if the stored hash is malformed.
    pub fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        bcrypt::verify(password, hash)
            .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))
    }

    /// Generate a session token for a user
    ///
    /// Returns the encoded token and its expiry time.
    ///
    /// # Errors
    ///
    /// Returns an error if token encoding fails.
    pub fn generate_token(&self, user: &User) -> AppResult<(String, DateTime<Utc>)> {
        let now = Utc::now();
        let expires_at = now + Duration::hours(self.expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(&self.jwt_secret),
        )
        .map_err(|e| AppError::internal(format!("Token encoding failed: {e}")))?;

        Ok((token, expires_at))
    }

    /// Validate a session token and return its claims
    ///
    /// # Errors
    ///
    /// Returns `AuthExpired` for expired tokens and `AuthInvalid` for
    /// anything else that fails validation.
    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        decode::<Claims>(
            token,
            &DecodingKey::from_secret(&self.jwt_secret),
            &Validation::default(),
        )
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => AppError::auth_expired(),
            _ => AppError::auth_invalid(format!("Invalid token: {e}")),
        })
    }

    /// Authenticate a request from its headers
    ///
    /// Expects `Authorization: Bearer <token>`.
    ///
    /// # Errors
    ///
    /// Returns `AuthRequired` when the header is missing and `AuthInvalid`
    /// when the token does not validate or carries a malformed subject.
    pub fn authenticate(&self, headers: &HeaderMap) -> AppResult<AuthResult> {
        let header = headers
            .get("authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(AppError::auth_required)?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::auth_invalid("Authorization header must be a bearer token"))?;

        let claims = self.validate_token(token)?;
        let user_id = claims
            .sub
            .parse::<i64>()
            .map_err(|_| AppError::auth_invalid("Malformed token subject"))?;

        Ok(AuthResult {
            user_id,
            email: claims.email,
        })
    }
}
