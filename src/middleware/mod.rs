// ABOUTME: HTTP middleware for cross-origin access and request correlation
// ABOUTME: CORS from configuration plus x-request-id generation and span creation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// CORS configuration
pub mod cors;
/// Request id and span creation
pub mod request_id;

pub use cors::setup_cors;
pub use request_id::{make_request_span, REQUEST_ID_HEADER};
