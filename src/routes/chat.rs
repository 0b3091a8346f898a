// ABOUTME: Persona chat route handler for the bounded ten-exchange conversation
// ABOUTME: Delegates to the session flow, which logs both sides and ends the chat at the limit
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use wayfinder_core::errors::AppError;

use super::{body, success};
use crate::flow::requests::ChatTurnRequest;
use crate::flow::SessionFlow;
use crate::resources::ServerResources;

/// Chat routes handler
pub struct ChatRoutes;

impl ChatRoutes {
    /// Create the chat route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/chat", post(Self::chat_turn))
            .with_state(resources)
    }

    /// Run one exchange; upstream faults still answer 200 with the fallback reply
    async fn chat_turn(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<ChatTurnRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let outcome = SessionFlow::new(&resources)
            .chat_turn(body(payload)?)
            .await?;
        success(StatusCode::OK, &outcome)
    }
}
