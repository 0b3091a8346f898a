// ABOUTME: Main library entry point for the Wayfinder research survey backend
// ABOUTME: Session flow, persona chat, metaphor generation, and interaction logging over HTTP
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Wayfinder
//!
//! Backend for a single-visit research survey. A participant's session moves
//! through a fixed sequence of stages: describing a situation, a pre-survey
//! with affect ratings, a landscape self-report, a chat with one of four
//! personas, a second landscape self-report, and a post-survey. Every step is
//! recorded in an append-only interaction log for later analysis.
//!
//! ## Architecture
//!
//! - **Flow**: the session state machine and stage submissions
//! - **Database**: `SQLite` storage with stage-guarded writes
//! - **LLM**: an OpenAI-compatible completion client behind a provider trait
//! - **Personas**: the four compiled-in chat personas
//! - **Routes**: thin axum handlers over the flow
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use wayfinder::config::ServerConfig;
//! use wayfinder::resources::ServerResources;
//! use wayfinder::server::WayfinderServer;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::from_env()?;
//!     let resources = ServerResources::from_config(config).await?;
//!     WayfinderServer::new(Arc::new(resources)).run().await
//! }
//! ```

/// Environment-driven configuration
pub mod config;

/// Environment variable names and defaults
pub mod constants;

/// Persona reply generation with fallback
pub mod conversation;

/// `SQLite` storage for sessions and interactions
pub mod database;

/// Session state machine and stage submissions
pub mod flow;

/// Completion provider abstraction and the OpenAI-compatible client
pub mod llm;

/// Structured logging setup and flow event helpers
pub mod logging;

/// Landscape metaphor generation
pub mod metaphors;

/// HTTP middleware
pub mod middleware;

/// Chat persona catalogue
pub mod personas;

/// Shared server resources
pub mod resources;

/// HTTP route groups
pub mod routes;

/// HTTP server assembly
pub mod server;

pub use wayfinder_core::errors;
pub use wayfinder_core::models;
