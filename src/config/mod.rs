// ABOUTME: Configuration management module for centralized server settings
// ABOUTME: All configuration is environment-driven; no config files are read
//
// Licensed under either of Apache License, Version 2.0 or MIT License at your option.

//! Configuration module for the taskmind server.

/// Environment and server configuration
pub mod environment;

pub use environment::ServerConfig;
