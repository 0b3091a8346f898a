// ABOUTME: Landscape metaphor generation from a participant's situation description
// ABOUTME: Structured JSON prompt, code-fence tolerant parsing, and errors carrying a fallback pair
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Metaphor Generator
//!
//! Asks the completion provider for a start and destination metaphor. Unlike
//! chat replies, failures are reported to the caller, always together with
//! [`MetaphorPair::fallback`] so the page can still render.

use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error, warn};
use wayfinder_core::errors::AppError;
use wayfinder_core::models::MetaphorPair;

use crate::config::CompletionSettings;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::logging::FlowLogger;

/// System role for metaphor generation
pub const SYSTEM_PROMPT: &str = "You are a creative assistant that generates metaphoric phrases for emotional journeys. Always respond with valid JSON in the exact requested format.";

/// Reasons metaphor generation can fail
#[derive(Debug, Error)]
pub enum MetaphorError {
    /// Situation missing or blank
    #[error("Situation description is required and must be a non-empty string")]
    EmptySituation,
    /// No completion credential configured
    #[error("OpenAI API key not configured")]
    MissingCredential,
    /// Transport or API failure
    #[error("Failed to generate metaphors: {0}")]
    Upstream(#[source] AppError),
    /// Completion returned no content
    #[error("No response from OpenAI")]
    EmptyOutput,
    /// Completion was not JSON
    #[error("Invalid JSON response from OpenAI")]
    Unparsable(#[source] serde_json::Error),
    /// JSON lacked the required metaphors or phrases
    #[error("Invalid metaphor structure received")]
    InvalidStructure,
}

impl MetaphorError {
    /// HTTP status for this failure
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::EmptySituation => StatusCode::BAD_REQUEST,
            Self::MissingCredential => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream(_) | Self::EmptyOutput | Self::Unparsable(_) | Self::InvalidStructure => {
                StatusCode::BAD_GATEWAY
            }
        }
    }
}

impl IntoResponse for MetaphorError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "Metaphor generation failed");
        } else {
            warn!(error = %self, "Metaphor generation rejected");
        }
        let body = json!({
            "error": self.to_string(),
            "fallback": MetaphorPair::fallback(),
        });
        (status, Json(body)).into_response()
    }
}

/// User prompt for a situation
#[must_use]
pub fn build_prompt(situation: &str) -> String {
    format!(
        r#"Based on this personal situation: "{situation}"

Generate two metaphoric phrases that represent an emotional journey:

1. STARTING POINT: How the person likely feels now (current emotional state)
2. DESIRED DESTINATION: Where they want to be emotionally

Each phrase should combine:
- One emotion adjective (e.g., lonely, confident, anxious, peaceful, overwhelmed, empowered)
- One geography/landscape term (e.g., valley, hill, river, mountain, desert, meadow, peak, cliff, forest, bridge)

Examples:
- "anxious valley" → "confident peak"
- "lonely river" → "connected meadow"
- "overwhelmed forest" → "peaceful clearing"

Return only a JSON object with this exact format:
{{
  "startMetaphor": {{
    "emotion": "word",
    "geography": "word",
    "phrase": "emotion word + geography word"
  }},
  "endMetaphor": {{
    "emotion": "word",
    "geography": "word",
    "phrase": "emotion word + geography word"
  }}
}}"#
    )
}

/// Remove a surrounding markdown code fence, if any
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening line
    let body = rest.split_once('\n').map_or(rest, |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Parse and validate a completion into a metaphor pair
///
/// # Errors
///
/// Returns an error if the output is empty, is not JSON, or lacks either phrase
pub fn parse_metaphors(raw: &str) -> Result<MetaphorPair, MetaphorError> {
    let text = strip_code_fence(raw);
    if text.is_empty() {
        return Err(MetaphorError::EmptyOutput);
    }

    let value: Value = serde_json::from_str(text).map_err(MetaphorError::Unparsable)?;
    let has_phrase = |key: &str| {
        value
            .get(key)
            .and_then(|m| m.get("phrase"))
            .and_then(Value::as_str)
            .is_some_and(|phrase| !phrase.trim().is_empty())
    };
    if !has_phrase("startMetaphor") || !has_phrase("endMetaphor") {
        return Err(MetaphorError::InvalidStructure);
    }

    serde_json::from_value(value).map_err(|_| MetaphorError::InvalidStructure)
}

/// Generates metaphor pairs through the completion provider
pub struct MetaphorGenerator<'a> {
    provider: Option<&'a dyn LlmProvider>,
    settings: CompletionSettings,
}

impl<'a> MetaphorGenerator<'a> {
    /// Generator over an optional provider; `None` means no credential is configured
    #[must_use]
    pub const fn new(provider: Option<&'a dyn LlmProvider>, settings: CompletionSettings) -> Self {
        Self { provider, settings }
    }

    /// Generate a start and destination metaphor for `situation`
    ///
    /// # Errors
    ///
    /// Returns a [`MetaphorError`] for a blank situation, a missing credential,
    /// an upstream failure, or unusable output
    pub async fn generate(&self, situation: &str) -> Result<MetaphorPair, MetaphorError> {
        if situation.trim().is_empty() {
            return Err(MetaphorError::EmptySituation);
        }
        let provider = self.provider.ok_or(MetaphorError::MissingCredential)?;

        let mut request = ChatRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(build_prompt(situation)),
        ])
        .with_max_tokens(self.settings.max_tokens)
        .with_temperature(self.settings.temperature);
        if provider.capabilities().supports_json_mode() {
            request = request.with_json_mode();
        }

        let started = Instant::now();
        let result = provider.complete(&request).await;
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        FlowLogger::log_completion("metaphors", provider.name(), result.is_ok(), elapsed);

        let response = result.map_err(MetaphorError::Upstream)?;
        debug!(chars = response.content.len(), "Metaphor completion received");
        parse_metaphors(&response.content)
    }
}
