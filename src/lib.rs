// ABOUTME: Main library entry point for the TaskMind task-management backend
// ABOUTME: Exposes task CRUD, account auth, and an LLM-driven chat agent over HTTP
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

#![deny(unsafe_code)]

//! # TaskMind
//!
//! A personal task-management backend with a conversational agent. Users
//! register, manage their own tasks (priority, category, due date), and
//! can drive everything through a chat endpoint where a language model
//! manipulates tasks via a fixed tool catalogue.
//!
//! ## Architecture
//!
//! - **models**: domain types with lenient enum parsing
//! - **database**: `SQLite` stores for users, tasks, and conversations,
//!   every query owner-scoped
//! - **auth**: bcrypt credentials and JWT session tokens
//! - **llm**: pluggable completion provider (Gemini by default)
//! - **tools**: the agent's callable task operations
//! - **routes**: axum handlers for auth, task CRUD, and chat
//!
//! ## Example
//!
//! ```rust,no_run
//! use taskmind::config::ServerConfig;
//! use taskmind::errors::AppResult;
//!
//! fn main() -> AppResult<()> {
//!     let config = ServerConfig::from_env()?;
//!     println!("TaskMind configured on port {}", config.http_port);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod database;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod resources;
pub mod routes;
pub mod tools;
