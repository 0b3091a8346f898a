// ABOUTME: Stage enum describing a participant's position in the survey flow
// ABOUTME: Strict forward ordering with string markers stored in the current_step column
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Position in the survey flow, in strict forward order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Entry page, before a session exists
    Landing,
    /// Describing the personal situation
    Situation,
    /// Baseline survey and affect ratings
    PreSurvey,
    /// Landscape self-report before the chat
    PreLandscape,
    /// Choosing one of the four personas
    PersonaSelection,
    /// Bounded conversation with the chosen persona
    Chat,
    /// Landscape self-report after the chat
    PostLandscape,
    /// Follow-up survey and reflection
    PostSurvey,
    /// Terminal stage
    Completed,
}

impl Stage {
    /// Every stage in flow order
    pub const ALL: [Self; 9] = [
        Self::Landing,
        Self::Situation,
        Self::PreSurvey,
        Self::PreLandscape,
        Self::PersonaSelection,
        Self::Chat,
        Self::PostLandscape,
        Self::PostSurvey,
        Self::Completed,
    ];

    /// Marker stored in `sessions.current_step`
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Landing => "landing",
            Self::Situation => "situation",
            Self::PreSurvey => "pre_survey",
            Self::PreLandscape => "pre_landscape",
            Self::PersonaSelection => "persona_selection",
            Self::Chat => "chat",
            Self::PostLandscape => "post_landscape",
            Self::PostSurvey => "post_survey",
            Self::Completed => "completed",
        }
    }

    /// The stage that follows this one, `None` for the terminal stage
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Landing => Some(Self::Situation),
            Self::Situation => Some(Self::PreSurvey),
            Self::PreSurvey => Some(Self::PreLandscape),
            Self::PreLandscape => Some(Self::PersonaSelection),
            Self::PersonaSelection => Some(Self::Chat),
            Self::Chat => Some(Self::PostLandscape),
            Self::PostLandscape => Some(Self::PostSurvey),
            Self::PostSurvey => Some(Self::Completed),
            Self::Completed => None,
        }
    }

    /// Whether no further writes are accepted
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|stage| stage.as_str() == s)
            .ok_or_else(|| AppError::invalid_input(format!("Unknown stage: {s}")))
    }
}
