// ABOUTME: Session identity and record types for one participant's run through the flow
// ABOUTME: SessionId wraps a v4 UUID stored as TEXT; Session groups each stage's answers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use crate::models::{LandscapeAssessment, PostSurvey, PreSurvey, Stage};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique identifier for a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(Uuid);

impl SessionId {
    /// Generate a new random identifier
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for SessionId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for SessionId {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| AppError::invalid_input(format!("Invalid session ID: {e}")))
    }
}

/// Full session record as stored
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Identifier
    pub id: SessionId,
    /// Stage marker
    pub current_step: Stage,
    /// Situation text, stored verbatim
    pub situation_description: Option<String>,
    /// Baseline survey
    pub pre_survey: Option<PreSurvey>,
    /// Landscape before the chat
    pub pre_landscape: Option<LandscapeAssessment>,
    /// Landscape after the chat
    pub post_landscape: Option<LandscapeAssessment>,
    /// Follow-up survey
    pub post_survey: Option<PostSurvey>,
    /// Set together with the terminal stage
    pub completed_at: Option<DateTime<Utc>>,
    /// Creation time
    pub created_at: DateTime<Utc>,
    /// Last write time
    pub updated_at: DateTime<Utc>,
}

impl Session {
    /// A freshly started session, already past the landing page
    #[must_use]
    pub fn start() -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            current_step: Stage::Situation,
            situation_description: None,
            pre_survey: None,
            pre_landscape: None,
            post_landscape: None,
            post_survey: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether the session accepts no further writes
    #[must_use]
    pub const fn is_completed(&self) -> bool {
        self.current_step.is_terminal()
    }
}
