// ABOUTME: Configuration management module for Wayfinder server settings
// ABOUTME: Re-exports the environment-driven server configuration types
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the Wayfinder server
//!
//! All settings come from environment variables, parsed once at startup into
//! an immutable [`ServerConfig`]. Malformed values abort startup with a
//! [`ConfigError`].

/// Environment and server configuration
pub mod environment;

pub use environment::{
    CompletionSettings, ConfigError, DatabaseUrl, Environment, LlmConfig, ServerConfig,
};
