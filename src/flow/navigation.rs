// ABOUTME: Stage-to-page mapping and the navigation guard applied to every stage page
// ABOUTME: Invalid or unknown sessions go to the landing page; others resume at their current stage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::Serialize;
use wayfinder_core::errors::{AppError, AppResult};
use wayfinder_core::models::{PersonaKey, Session, SessionId, Stage};

use crate::personas::{self, PersonaSummary};

/// Landing page path
pub const LANDING: &str = "/";

/// Client page names that sit behind the guard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    /// `/situation`
    Situation,
    /// `/survey` (pre) or `/survey?post=true` (post)
    Survey,
    /// `/pre-landscape`
    PreLandscape,
    /// `/experiment`
    Experiment,
    /// `/chat`
    Chat,
    /// `/landscape`
    Landscape,
}

impl Page {
    /// Parse a path segment such as `pre-landscape`
    ///
    /// # Errors
    ///
    /// Returns a not-found error for any other name
    pub fn from_segment(segment: &str) -> AppResult<Self> {
        match segment {
            "situation" => Ok(Self::Situation),
            "survey" => Ok(Self::Survey),
            "pre-landscape" => Ok(Self::PreLandscape),
            "experiment" => Ok(Self::Experiment),
            "chat" => Ok(Self::Chat),
            "landscape" => Ok(Self::Landscape),
            other => Err(AppError::not_found(format!("Page '{other}'"))),
        }
    }

    /// Stage a session must be at to view this page
    #[must_use]
    pub const fn stage(self, post: bool) -> Stage {
        match self {
            Self::Situation => Stage::Situation,
            Self::Survey if post => Stage::PostSurvey,
            Self::Survey => Stage::PreSurvey,
            Self::PreLandscape => Stage::PreLandscape,
            Self::Experiment => Stage::PersonaSelection,
            Self::Chat => Stage::Chat,
            Self::Landscape => Stage::PostLandscape,
        }
    }
}

/// Page path for a session at `stage`
#[must_use]
pub fn page_for(stage: Stage, id: SessionId, persona: Option<PersonaKey>) -> String {
    match stage {
        Stage::Landing => LANDING.to_owned(),
        Stage::Situation => format!("/situation?session={id}"),
        Stage::PreSurvey => format!("/survey?session={id}"),
        Stage::PreLandscape => format!("/pre-landscape?session={id}"),
        Stage::PersonaSelection => format!("/experiment?session={id}"),
        Stage::Chat => persona.map_or_else(
            || format!("/chat?session={id}"),
            |key| format!("/chat?session={id}&persona={key}"),
        ),
        Stage::PostLandscape => format!("/landscape?session={id}"),
        Stage::PostSurvey => format!("/survey?session={id}&post=true"),
        Stage::Completed => format!("/?completed={id}"),
    }
}

/// State handed to a page the session is allowed to view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageState {
    /// Session identifier
    pub session_id: SessionId,
    /// Stage the session is at
    pub stage: Stage,
    /// Stored situation, once described
    pub situation_description: Option<String>,
    /// Chosen persona, on the chat page
    pub persona: Option<PersonaSummary>,
}

/// Result of the navigation guard
#[derive(Debug, Clone)]
pub enum Navigation {
    /// Render the requested page
    Render(PageState),
    /// Send the client elsewhere (303)
    Redirect(String),
}

/// Parse the `session` query parameter; malformed ids count as absent
#[must_use]
pub fn parse_session_param(raw: Option<&str>) -> Option<SessionId> {
    raw.and_then(|raw| raw.parse().ok())
}

/// Decide whether a loaded session may view `page`
#[must_use]
pub fn guard(page: Page, post: bool, session: Option<&Session>, persona: Option<&str>) -> Navigation {
    let Some(session) = session else {
        return Navigation::Redirect(LANDING.to_owned());
    };

    let persona_key = persona.and_then(|raw| raw.parse::<PersonaKey>().ok());
    let required = page.stage(post);
    if session.current_step != required {
        return Navigation::Redirect(page_for(session.current_step, session.id, persona_key));
    }

    let persona = if page == Page::Chat {
        // The chat page cannot render without a persona from navigation state
        let Some(key) = persona_key else {
            return Navigation::Redirect(LANDING.to_owned());
        };
        Some(personas::get(key).summary())
    } else {
        None
    };

    Navigation::Render(PageState {
        session_id: session.id,
        stage: session.current_step,
        situation_description: session.situation_description.clone(),
        persona,
    })
}
