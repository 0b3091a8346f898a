// ABOUTME: Shared resource container handed to every route and flow operation
// ABOUTME: Holds immutable configuration, the connection pool, and the optional completion provider
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Server Resources Module
//!
//! Built once at startup and shared behind an `Arc`. Nothing inside is
//! mutated after construction.

use std::sync::Arc;

use tracing::{info, warn};
use wayfinder_core::errors::AppResult;

use crate::config::ServerConfig;
use crate::database::Database;
use crate::llm::{LlmProvider, OpenAiCompatibleProvider};

/// Centralized resource container for dependency injection
#[derive(Clone)]
pub struct ServerResources {
    /// Immutable server configuration
    pub config: Arc<ServerConfig>,
    /// Connection pool
    pub database: Database,
    /// Completion provider; `None` when no credential is configured
    pub llm: Option<Arc<dyn LlmProvider>>,
}

impl ServerResources {
    /// Assemble resources from already-constructed parts
    #[must_use]
    pub fn new(
        config: Arc<ServerConfig>,
        database: Database,
        llm: Option<Arc<dyn LlmProvider>>,
    ) -> Self {
        Self {
            config,
            database,
            llm,
        }
    }

    /// Open the database and build the completion provider from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated, or the HTTP
    /// client cannot be built
    pub async fn from_config(config: ServerConfig) -> AppResult<Self> {
        let database = Database::new(&config.database_url).await?;

        let llm: Option<Arc<dyn LlmProvider>> =
            match OpenAiCompatibleProvider::from_llm_config(&config.llm)? {
                Some(provider) => {
                    info!(model = provider.default_model(), "Completion provider configured");
                    Some(Arc::new(provider))
                }
                None => {
                    warn!("OPENAI_API_KEY not set; chat replies and metaphors will fall back");
                    None
                }
            };

        Ok(Self::new(Arc::new(config), database, llm))
    }

    /// Borrow the completion provider, if any
    #[must_use]
    pub fn llm(&self) -> Option<&dyn LlmProvider> {
        self.llm.as_deref()
    }
}
