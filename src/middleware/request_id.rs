// ABOUTME: Request tracing helpers for correlation and structured logging
// ABOUTME: Every request span carries the x-request-id assigned at the edge
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use axum::extract::Request;
use tracing::{info_span, Span};

/// Correlation header set on every request and echoed on every response
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Create the `http_request` span for a request
///
/// Used as the `make_span_with` hook of the trace layer. The request id has
/// already been assigned by the set-request-id layer.
pub fn make_request_span(request: &Request) -> Span {
    let request_id = request
        .headers()
        .get(REQUEST_ID_HEADER)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    info_span!(
        "http_request",
        method = %request.method(),
        uri = %request.uri().path(),
        request_id = %request_id,
    )
}
