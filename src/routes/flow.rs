// ABOUTME: Navigation guard route deciding whether a session may view a stage page
// ABOUTME: Allowed pages receive their state as JSON; everything else is redirected with 303
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Page navigation guard
//!
//! `GET /flow/:page?session=..&persona=..&post=true` either returns the page
//! state or redirects the client to the page matching the session's stage.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::routing::get;
use axum::Router;
use serde::Deserialize;
use serde_json::json;
use tracing::debug;
use wayfinder_core::errors::AppError;

use super::success;
use crate::flow::{Navigation, SessionFlow};
use crate::resources::ServerResources;

/// Query parameters carried by stage page links
#[derive(Debug, Default, Deserialize)]
pub struct FlowQuery {
    session: Option<String>,
    persona: Option<String>,
    #[serde(default)]
    post: bool,
}

/// Navigation guard routes handler
pub struct FlowRoutes;

impl FlowRoutes {
    /// Create the navigation guard route
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/flow/:page", get(Self::page))
            .with_state(resources)
    }

    async fn page(
        State(resources): State<Arc<ServerResources>>,
        Path(page): Path<String>,
        Query(query): Query<FlowQuery>,
    ) -> Result<Response, AppError> {
        let navigation = SessionFlow::new(&resources)
            .navigate(
                &page,
                query.session.as_deref(),
                query.persona.as_deref(),
                query.post,
            )
            .await?;

        match navigation {
            Navigation::Render(state) => success(StatusCode::OK, &json!({ "page": state })),
            Navigation::Redirect(location) => {
                debug!(page = %page, location = %location, "Redirecting page request");
                Ok(Redirect::to(&location).into_response())
            }
        }
    }
}
