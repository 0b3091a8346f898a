// ABOUTME: Request bodies accepted by the session flow, kept as raw JSON where validation applies
// ABOUTME: Ratings stay untyped so that wrong types surface as field-level validation errors
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::Deserialize;
use serde_json::{Map, Value};
use wayfinder_core::errors::{AppError, AppResult};
use wayfinder_core::models::SessionId;

/// Parse the `sessionId` field every stage submission carries
///
/// # Errors
///
/// Returns an error if the id is absent or not a UUID
pub fn session_id(raw: Option<&str>) -> AppResult<SessionId> {
    match raw {
        Some(raw) if !raw.trim().is_empty() => raw.parse(),
        _ => Err(AppError::missing_field("sessionId")),
    }
}

/// Body of `POST /api/sessions/situation`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SituationRequest {
    /// Session identifier
    pub session_id: Option<String>,
    /// Free-text situation
    pub situation_description: Option<String>,
}

/// Body of `POST /api/sessions/survey`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreSurveyRequest {
    /// Session identifier
    pub session_id: Option<String>,
    /// Likert item 1
    pub pre_item1: Option<Value>,
    /// Likert item 2
    pub pre_item2: Option<Value>,
    /// Likert item 3
    pub pre_item3: Option<Value>,
    /// Affect ratings keyed by item name
    pub panas_data: Option<Map<String, Value>>,
}

/// Body of `POST /api/sessions/pre-landscape` and `POST /api/sessions/landscape`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LandscapeRequest {
    /// Session identifier
    pub session_id: Option<String>,
    /// Phrase generated for the starting point
    pub generated_start_phrase: Option<String>,
    /// Phrase generated for the destination
    pub generated_end_phrase: Option<String>,
    /// Participant override for the starting point
    pub edited_start_phrase: Option<String>,
    /// Participant override for the destination
    pub edited_end_phrase: Option<String>,
    /// Progress along the journey, 1-7
    pub journey_progress: Option<Value>,
    /// Willingness to continue, 1-7
    pub willingness_to_continue: Option<Value>,
}

/// Body of `POST /api/sessions/persona`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonaSelectionRequest {
    /// Session identifier
    pub session_id: Option<String>,
    /// Persona key; takes precedence over `quadrant`
    pub persona: Option<String>,
    /// Grid position label
    pub quadrant: Option<String>,
}

/// One prior or new chat turn
#[derive(Debug, Clone, Deserialize)]
pub struct ChatTurnMessage {
    /// `user` or `assistant`
    pub role: String,
    /// Turn text
    pub content: String,
}

/// Body of `POST /api/chat`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnRequest {
    /// Session identifier
    pub session_id: Option<String>,
    /// Persona key from navigation state
    pub persona: Option<String>,
    /// Ordered history ending with the new user turn
    #[serde(default)]
    pub messages: Vec<ChatTurnMessage>,
}

/// Body of `POST /api/sessions/chat/finish`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinishChatRequest {
    /// Session identifier
    pub session_id: Option<String>,
}

/// Body of `POST /api/generate-metaphors`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaphorRequest {
    /// Session whose stored situation is used
    pub session_id: Option<String>,
    /// Raw situation, used when no session is given
    pub situation: Option<String>,
}

/// Body of `POST /api/sessions/post-survey`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostSurveyRequest {
    /// Session identifier
    pub session_id: Option<String>,
    /// Likert item 1
    pub post_item1: Option<Value>,
    /// Likert item 2
    pub post_item2: Option<Value>,
    /// Likert item 3
    pub post_item3: Option<Value>,
    /// Likert item 4
    pub post_item4: Option<Value>,
    /// Likert item 5
    pub post_item5: Option<Value>,
    /// Likert item 6
    pub post_item6: Option<Value>,
    /// Affect ratings keyed by item name
    pub panas_data: Option<Map<String, Value>>,
    /// Written reflection
    pub open_response: Option<String>,
}

/// Body of `POST /api/interactions`
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InteractionRequest {
    /// Session identifier
    pub session_id: Option<String>,
    /// Event tag
    pub interaction_type: Option<String>,
    /// Event payload; defaults to `{}`
    pub data: Option<Value>,
}
