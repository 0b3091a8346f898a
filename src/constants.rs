// ABOUTME: System-wide constants and configuration defaults for the Wayfinder server
// ABOUTME: Environment variable names, default values, and completion prompt text
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Constants Module
//!
//! Environment variable names and the defaults used when they are absent.
//! Survey limits live in `wayfinder_core::constants`.

/// Service name used in structured logs
pub const SERVICE_NAME: &str = "wayfinder";

/// Environment variable names
pub mod env_keys {
    /// Bind address
    pub const HOST: &str = "HOST";
    /// HTTP port
    pub const HTTP_PORT: &str = "HTTP_PORT";
    /// Database URL
    pub const DATABASE_URL: &str = "DATABASE_URL";
    /// Deployment environment
    pub const ENVIRONMENT: &str = "ENVIRONMENT";
    /// Comma-separated CORS origins
    pub const CORS_ALLOWED_ORIGINS: &str = "CORS_ALLOWED_ORIGINS";
    /// Request body limit
    pub const MAX_REQUEST_BODY_BYTES: &str = "MAX_REQUEST_BODY_BYTES";
    /// Completion credential
    pub const OPENAI_API_KEY: &str = "OPENAI_API_KEY";
    /// Completion base URL
    pub const LLM_BASE_URL: &str = "LLM_BASE_URL";
    /// Completion model
    pub const LLM_MODEL: &str = "LLM_MODEL";
    /// Connect timeout in seconds
    pub const LLM_CONNECT_TIMEOUT_SECS: &str = "LLM_CONNECT_TIMEOUT_SECS";
    /// Request timeout in seconds
    pub const LLM_REQUEST_TIMEOUT_SECS: &str = "LLM_REQUEST_TIMEOUT_SECS";
    /// Chat reply token limit
    pub const CHAT_MAX_TOKENS: &str = "CHAT_MAX_TOKENS";
    /// Chat sampling temperature
    pub const CHAT_TEMPERATURE: &str = "CHAT_TEMPERATURE";
    /// Metaphor token limit
    pub const METAPHOR_MAX_TOKENS: &str = "METAPHOR_MAX_TOKENS";
    /// Metaphor sampling temperature
    pub const METAPHOR_TEMPERATURE: &str = "METAPHOR_TEMPERATURE";
}

/// Default configuration values
pub mod defaults {
    /// Bind address
    pub const HOST: &str = "127.0.0.1";
    /// HTTP port
    pub const HTTP_PORT: u16 = 8081;
    /// `SQLite` file used when `DATABASE_URL` is unset
    pub const DATABASE_PATH: &str = "./data/wayfinder.db";
    /// Request body limit
    pub const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;
    /// OpenAI-compatible API root
    pub const LLM_BASE_URL: &str = "https://api.openai.com/v1";
    /// Completion model
    pub const LLM_MODEL: &str = "gpt-4o-mini";
    /// Connect timeout
    pub const LLM_CONNECT_TIMEOUT_SECS: u64 = 10;
    /// Request timeout
    pub const LLM_REQUEST_TIMEOUT_SECS: u64 = 60;
    /// Chat reply token limit
    pub const CHAT_MAX_TOKENS: u32 = 300;
    /// Chat sampling temperature
    pub const CHAT_TEMPERATURE: f32 = 0.8;
    /// Metaphor token limit
    pub const METAPHOR_MAX_TOKENS: u32 = 200;
    /// Metaphor sampling temperature
    pub const METAPHOR_TEMPERATURE: f32 = 0.8;
}
