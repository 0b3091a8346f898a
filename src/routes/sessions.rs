// ABOUTME: Session route handlers for every stage submission and the generic interaction log
// ABOUTME: Thin handlers that extract bodies and delegate to the session flow controller
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Session routes
//!
//! Stage submissions each carry `sessionId` in the body. Reads take the id
//! from the path.

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::Response;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use wayfinder_core::errors::AppError;
use wayfinder_core::models::{LandscapePhase, SessionId};

use super::{body, success};
use crate::flow::requests::{
    FinishChatRequest, InteractionRequest, LandscapeRequest, PersonaSelectionRequest,
    PostSurveyRequest, PreSurveyRequest, SituationRequest,
};
use crate::flow::SessionFlow;
use crate::resources::ServerResources;

/// Session routes handler
pub struct SessionRoutes;

impl SessionRoutes {
    /// Create all session routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/sessions", post(Self::start_session))
            .route("/api/sessions/:id", get(Self::get_session))
            .route(
                "/api/sessions/:id/interactions",
                get(Self::list_interactions),
            )
            // Stage submissions
            .route("/api/sessions/situation", post(Self::describe_situation))
            .route("/api/sessions/survey", post(Self::submit_pre_survey))
            .route(
                "/api/sessions/pre-landscape",
                post(Self::submit_pre_landscape),
            )
            .route("/api/sessions/persona", post(Self::select_persona))
            .route("/api/sessions/chat/finish", post(Self::finish_chat_early))
            .route("/api/sessions/landscape", post(Self::submit_post_landscape))
            .route("/api/sessions/post-survey", post(Self::submit_post_survey))
            // Client-side events
            .route("/api/interactions", post(Self::log_interaction))
            .with_state(resources)
    }

    fn parse_id(raw: &str) -> Result<SessionId, AppError> {
        raw.parse()
    }

    /// Start a new session
    async fn start_session(
        State(resources): State<Arc<ServerResources>>,
    ) -> Result<Response, AppError> {
        let outcome = SessionFlow::new(&resources).start_session().await?;
        success(StatusCode::CREATED, &outcome)
    }

    /// Read a full session record
    async fn get_session(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = Self::parse_id(&id)?;
        let session = SessionFlow::new(&resources).session(id).await?;
        success(StatusCode::OK, &json!({ "session": session }))
    }

    /// List a session's interactions in insertion order
    async fn list_interactions(
        State(resources): State<Arc<ServerResources>>,
        Path(id): Path<String>,
    ) -> Result<Response, AppError> {
        let id = Self::parse_id(&id)?;
        let interactions = SessionFlow::new(&resources).interactions(id).await?;
        success(
            StatusCode::OK,
            &json!({ "total": interactions.len(), "interactions": interactions }),
        )
    }

    async fn describe_situation(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<SituationRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let outcome = SessionFlow::new(&resources)
            .describe_situation(body(payload)?)
            .await?;
        success(StatusCode::OK, &outcome)
    }

    async fn submit_pre_survey(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<PreSurveyRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let outcome = SessionFlow::new(&resources)
            .submit_pre_survey(body(payload)?)
            .await?;
        success(StatusCode::OK, &outcome)
    }

    async fn submit_pre_landscape(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<LandscapeRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let outcome = SessionFlow::new(&resources)
            .submit_landscape(LandscapePhase::Pre, body(payload)?)
            .await?;
        success(StatusCode::OK, &outcome)
    }

    async fn select_persona(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<PersonaSelectionRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let outcome = SessionFlow::new(&resources)
            .select_persona(body(payload)?)
            .await?;
        success(StatusCode::OK, &outcome)
    }

    async fn finish_chat_early(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<FinishChatRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let outcome = SessionFlow::new(&resources)
            .finish_chat_early(body(payload)?)
            .await?;
        success(StatusCode::OK, &outcome)
    }

    async fn submit_post_landscape(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<LandscapeRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let outcome = SessionFlow::new(&resources)
            .submit_landscape(LandscapePhase::Post, body(payload)?)
            .await?;
        success(StatusCode::OK, &outcome)
    }

    async fn submit_post_survey(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<PostSurveyRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let outcome = SessionFlow::new(&resources)
            .submit_post_survey(body(payload)?)
            .await?;
        success(StatusCode::OK, &outcome)
    }

    /// Append a client-reported event
    async fn log_interaction(
        State(resources): State<Arc<ServerResources>>,
        payload: Result<Json<InteractionRequest>, JsonRejection>,
    ) -> Result<Response, AppError> {
        let id = SessionFlow::new(&resources)
            .log_interaction(body(payload)?)
            .await?;
        success(StatusCode::CREATED, &json!({ "id": id }))
    }
}
