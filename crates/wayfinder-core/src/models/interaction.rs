// ABOUTME: Append-only interaction log entries recorded for every participant action
// ABOUTME: Known tags are enumerated; clients may add their own through the generic endpoint
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::models::SessionId;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

/// Interaction tags written by the server itself
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    /// Session created
    SessionStarted,
    /// Situation text submitted
    SituationDescribed,
    /// Baseline survey submitted
    PreSurveyCompleted,
    /// Persona chosen on the grid
    GridSelection,
    /// One chat turn, user or assistant
    ChatMessage,
    /// Tenth exchange finished
    ConversationCompleted,
    /// Participant left the chat before the tenth exchange
    ConversationFinishedEarly,
    /// Follow-up survey submitted
    PostSurveyCompleted,
}

impl InteractionKind {
    /// Tag stored in `interactions.interaction_type`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SessionStarted => "session_started",
            Self::SituationDescribed => "situation_described",
            Self::PreSurveyCompleted => "pre_survey_completed",
            Self::GridSelection => "grid_selection",
            Self::ChatMessage => "chat_message",
            Self::ConversationCompleted => "conversation_completed",
            Self::ConversationFinishedEarly => "conversation_finished_early",
            Self::PostSurveyCompleted => "post_survey_completed",
        }
    }
}

/// One stored interaction
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Interaction {
    /// Insertion-ordered identifier
    pub id: i64,
    /// Owning session
    pub session_id: SessionId,
    /// Tag
    pub interaction_type: String,
    /// JSON payload
    pub data: Value,
    /// Append time
    pub created_at: DateTime<Utc>,
}
