// ABOUTME: Persona catalogue routes listing the four chat personas of the two-by-two grid
// ABOUTME: Stateless; persona definitions are compiled into the binary
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde_json::json;
use wayfinder_core::errors::AppError;

use super::success;
use crate::personas::{self, Persona, PersonaSummary};

/// Persona routes handler
pub struct PersonaRoutes;

impl PersonaRoutes {
    /// Create the persona catalogue routes
    pub fn routes() -> Router {
        Router::new()
            .route("/api/personas", get(Self::list))
            .route("/api/personas/:key", get(Self::get))
    }

    async fn list() -> Result<Response, AppError> {
        let summaries: Vec<PersonaSummary> = personas::all().iter().map(Persona::summary).collect();
        success(
            StatusCode::OK,
            &json!({ "total": summaries.len(), "personas": summaries }),
        )
    }

    async fn get(Path(key): Path<String>) -> Result<Response, AppError> {
        let persona = personas::lookup(&key)
            .ok_or_else(|| AppError::not_found(format!("Persona {key}")))?;
        success(StatusCode::OK, &json!({ "persona": persona.summary() }))
    }
}
