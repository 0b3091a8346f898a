// ABOUTME: Metaphor generation route returning a start and destination landscape pair
// ABOUTME: Generation failures answer with an error status and a fallback pair in the body
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde_json::json;
use wayfinder_core::errors::AppError;

use super::{body, success};
use crate::flow::requests::MetaphorRequest;
use crate::flow::SessionFlow;
use crate::resources::ServerResources;

/// Metaphor routes handler
pub struct MetaphorRoutes;

impl MetaphorRoutes {
    /// Create the metaphor generation route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/generate-metaphors", post(Self::generate))
            .with_state(resources)
    }

    async fn generate(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<MetaphorRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let flow = SessionFlow::new(&resources);
        let situation = flow.metaphor_situation(body(payload)?).await?;

        match flow.generate_landscape_metaphors(&situation).await {
            Ok(pair) => success(StatusCode::OK, &json!({ "metaphors": pair })),
            Err(e) => Ok(e.into_response()),
        }
    }
}
