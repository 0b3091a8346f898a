// ABOUTME: Route module organization for the Wayfinder HTTP endpoints
// ABOUTME: Domain route groups plus the shared success-response and body-extraction helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Route module for the Wayfinder server
//!
//! Each domain module contains only route definitions and thin handlers that
//! delegate to the session flow.

/// Persona chat turn route
pub mod chat;
/// Navigation guard for stage pages
pub mod flow;
/// Liveness and readiness routes
pub mod health;
/// Metaphor generation route
pub mod metaphors;
/// Persona catalogue routes
pub mod personas;
/// Session stage and interaction logging routes
pub mod sessions;

/// Chat route handlers
pub use chat::ChatRoutes;
/// Navigation guard route handlers
pub use flow::FlowRoutes;
/// Health check route handlers
pub use health::HealthRoutes;
/// Metaphor route handlers
pub use metaphors::MetaphorRoutes;
/// Persona route handlers
pub use personas::PersonaRoutes;
/// Session route handlers
pub use sessions::SessionRoutes;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::{json, Value};
use wayfinder_core::errors::AppError;

use crate::resources::ServerResources;

/// Every route group merged into one router
pub fn api_router(resources: &Arc<ServerResources>) -> Router {
    Router::new()
        .merge(HealthRoutes::routes(Arc::clone(resources)))
        .merge(SessionRoutes::routes(Arc::clone(resources)))
        .merge(ChatRoutes::routes(Arc::clone(resources)))
        .merge(MetaphorRoutes::routes(Arc::clone(resources)))
        .merge(PersonaRoutes::routes())
        .merge(FlowRoutes::routes(Arc::clone(resources)))
}

/// Unwrap a JSON body, mapping malformed input into the error envelope
pub(crate) fn body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AppError> {
    payload.map(|Json(inner)| inner).map_err(AppError::from)
}

/// Serialize `data` with `"success": true` folded into the top-level object
pub(crate) fn success<T: Serialize>(status: StatusCode, data: &T) -> Result<Response, AppError> {
    let body = match serde_json::to_value(data)? {
        Value::Object(mut map) => {
            map.insert("success".to_owned(), Value::Bool(true));
            Value::Object(map)
        }
        other => json!({ "success": true, "data": other }),
    };
    Ok((status, Json(body)).into_response())
}
