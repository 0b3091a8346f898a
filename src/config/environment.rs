// ABOUTME: Environment configuration management for deployment-specific settings
// ABOUTME: Parses environment variables into typed server, database, and completion settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Environment-based configuration management

use crate::constants::{defaults, env_keys};
use serde_json::{json, Value};
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable present but not parseable
    #[error("Invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        /// Variable name
        key: &'static str,
        /// Raw value
        value: String,
        /// Parser message
        reason: String,
    },

    /// Value parsed but outside its accepted range
    #[error("Value out of range for {key}: {reason}")]
    OutOfRange {
        /// Variable name
        key: &'static str,
        /// Accepted range
        reason: &'static str,
    },

    /// Database URL scheme not supported
    #[error("Unsupported database URL: {0}")]
    UnsupportedDatabase(String),
}

/// Environment type for security and other configurations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    /// Local development
    #[default]
    Development,
    /// Deployed service
    Production,
    /// Automated tests
    Testing,
}

impl Environment {
    /// Parse from string with fallback
    #[must_use]
    pub fn from_str_or_default(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            "testing" | "test" => Self::Testing,
            _ => Self::Development,
        }
    }

    /// Check if this is a production environment
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Development => write!(f, "development"),
            Self::Production => write!(f, "production"),
            Self::Testing => write!(f, "testing"),
        }
    }
}

/// Type-safe database configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DatabaseUrl {
    /// `SQLite` database file
    SQLite {
        /// File path
        path: PathBuf,
    },
    /// In-memory `SQLite` (for testing)
    Memory,
}

impl DatabaseUrl {
    /// Parse from string with validation
    ///
    /// # Errors
    ///
    /// Returns an error for non-`SQLite` URLs
    pub fn parse_url(s: &str) -> Result<Self, ConfigError> {
        if let Some(path) = s.strip_prefix("sqlite:") {
            let path = path.trim_start_matches("//");
            if path == ":memory:" {
                Ok(Self::Memory)
            } else {
                Ok(Self::SQLite {
                    path: PathBuf::from(path),
                })
            }
        } else if s.contains("://") {
            Err(ConfigError::UnsupportedDatabase(s.to_owned()))
        } else {
            // Bare path: treat as SQLite file
            Ok(Self::SQLite {
                path: PathBuf::from(s),
            })
        }
    }

    /// Convert to connection string
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::SQLite { path } => format!("sqlite:{}", path.display()),
            Self::Memory => "sqlite::memory:".to_owned(),
        }
    }

    /// Check if this is an in-memory database
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::SQLite {
            path: PathBuf::from(defaults::DATABASE_PATH),
        }
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_connection_string())
    }
}

/// Output limits for one kind of completion request
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionSettings {
    /// Maximum output tokens
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// Completion endpoint configuration
#[derive(Clone)]
pub struct LlmConfig {
    /// Bearer credential; `None` disables completions
    pub api_key: Option<String>,
    /// Base URL of the OpenAI-compatible API
    pub base_url: String,
    /// Model identifier
    pub model: String,
    /// TCP connect timeout
    pub connect_timeout: Duration,
    /// Whole-request timeout
    pub request_timeout: Duration,
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("connect_timeout", &self.connect_timeout)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Complete server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// HTTP API port
    pub http_port: u16,
    /// Deployment environment
    pub environment: Environment,
    /// Database location
    pub database_url: DatabaseUrl,
    /// Allowed CORS origins; `*` allows any
    pub cors_allowed_origins: Vec<String>,
    /// Request body size limit in bytes
    pub max_request_body_bytes: usize,
    /// Completion endpoint
    pub llm: LlmConfig,
    /// Chat reply limits
    pub chat: CompletionSettings,
    /// Metaphor generation limits
    pub metaphors: CompletionSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns an error if any value is present but malformed
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let chat = CompletionSettings {
            max_tokens: parse_or(&var, env_keys::CHAT_MAX_TOKENS, defaults::CHAT_MAX_TOKENS)?,
            temperature: parse_or(&var, env_keys::CHAT_TEMPERATURE, defaults::CHAT_TEMPERATURE)?,
        };
        let metaphors = CompletionSettings {
            max_tokens: parse_or(
                &var,
                env_keys::METAPHOR_MAX_TOKENS,
                defaults::METAPHOR_MAX_TOKENS,
            )?,
            temperature: parse_or(
                &var,
                env_keys::METAPHOR_TEMPERATURE,
                defaults::METAPHOR_TEMPERATURE,
            )?,
        };
        validate_completion(env_keys::CHAT_MAX_TOKENS, env_keys::CHAT_TEMPERATURE, chat)?;
        validate_completion(
            env_keys::METAPHOR_MAX_TOKENS,
            env_keys::METAPHOR_TEMPERATURE,
            metaphors,
        )?;

        let max_request_body_bytes = parse_or(
            &var,
            env_keys::MAX_REQUEST_BODY_BYTES,
            defaults::MAX_REQUEST_BODY_BYTES,
        )?;
        if max_request_body_bytes == 0 {
            return Err(ConfigError::OutOfRange {
                key: env_keys::MAX_REQUEST_BODY_BYTES,
                reason: "must be greater than zero",
            });
        }

        Ok(Self {
            host: var(env_keys::HOST).unwrap_or_else(|| defaults::HOST.to_owned()),
            http_port: parse_or(&var, env_keys::HTTP_PORT, defaults::HTTP_PORT)?,
            environment: var(env_keys::ENVIRONMENT)
                .map(|value| Environment::from_str_or_default(&value))
                .unwrap_or_default(),
            database_url: var(env_keys::DATABASE_URL)
                .map(|value| DatabaseUrl::parse_url(&value))
                .transpose()?
                .unwrap_or_default(),
            cors_allowed_origins: parse_origins(
                &var(env_keys::CORS_ALLOWED_ORIGINS).unwrap_or_else(|| "*".to_owned()),
            ),
            max_request_body_bytes,
            llm: LlmConfig {
                api_key: var(env_keys::OPENAI_API_KEY),
                base_url: var(env_keys::LLM_BASE_URL)
                    .unwrap_or_else(|| defaults::LLM_BASE_URL.to_owned()),
                model: var(env_keys::LLM_MODEL).unwrap_or_else(|| defaults::LLM_MODEL.to_owned()),
                connect_timeout: Duration::from_secs(parse_or(
                    &var,
                    env_keys::LLM_CONNECT_TIMEOUT_SECS,
                    defaults::LLM_CONNECT_TIMEOUT_SECS,
                )?),
                request_timeout: Duration::from_secs(parse_or(
                    &var,
                    env_keys::LLM_REQUEST_TIMEOUT_SECS,
                    defaults::LLM_REQUEST_TIMEOUT_SECS,
                )?),
            },
            chat,
            metaphors,
        })
    }

    /// Redacted summary for startup logging
    #[must_use]
    pub fn summary(&self) -> Value {
        json!({
            "host": self.host,
            "http_port": self.http_port,
            "environment": self.environment.to_string(),
            "database_url": self.database_url.to_string(),
            "cors_allowed_origins": self.cors_allowed_origins,
            "max_request_body_bytes": self.max_request_body_bytes,
            "llm": {
                "configured": self.llm.api_key.is_some(),
                "base_url": self.llm.base_url,
                "model": self.llm.model,
            },
        })
    }
}

fn parse_or<T, V>(var: &V, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
    V: Fn(&str) -> Option<String>,
{
    var(key).map_or(Ok(default), |value| {
        value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value,
            reason: e.to_string(),
        })
    })
}

fn validate_completion(
    tokens_key: &'static str,
    temperature_key: &'static str,
    settings: CompletionSettings,
) -> Result<(), ConfigError> {
    if settings.max_tokens == 0 {
        return Err(ConfigError::OutOfRange {
            key: tokens_key,
            reason: "must be greater than zero",
        });
    }
    if !(0.0..=2.0).contains(&settings.temperature) {
        return Err(ConfigError::OutOfRange {
            key: temperature_key,
            reason: "must be between 0.0 and 2.0",
        });
    }
    Ok(())
}

/// Parse comma-separated CORS origins
fn parse_origins(origins_str: &str) -> Vec<String> {
    if origins_str.trim() == "*" {
        vec!["*".to_owned()]
    } else {
        origins_str
            .split(',')
            .map(|s| s.trim().to_owned())
            .filter(|s| !s.is_empty())
            .collect()
    }
}
