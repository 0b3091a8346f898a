// ABOUTME: Session flow controller sequencing every stage of a participant's run
// ABOUTME: Validates input, performs stage-guarded writes, and appends interaction records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Session Flow
//!
//! Every transition is one conditional write keyed on the expected stage.
//! Validation runs before any write, so a rejected submission leaves no trace.
//! Interaction records for a transition are appended only after the write
//! succeeds, which keeps one record per transition under concurrent submits.

mod chat;
pub mod navigation;
pub mod requests;

pub use chat::ChatTurnOutcome;
pub use navigation::{guard, page_for, Navigation, Page, PageState};

use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::{error, info, instrument};
use wayfinder_core::constants::chat::MAX_EXCHANGES;
use wayfinder_core::errors::{AppError, AppResult};
use wayfinder_core::models::{
    Interaction, InteractionKind, LandscapeAssessment, LandscapePhase, MetaphorPair, PersonaKey,
    PostSurvey, PreSurvey, Quadrant, Session, SessionId, Stage,
};
use wayfinder_core::validation;

use crate::database::GuardedWrite;
use crate::llm::MessageRole;
use crate::logging::FlowLogger;
use crate::metaphors::{MetaphorError, MetaphorGenerator};
use crate::resources::ServerResources;
use requests::{
    session_id, FinishChatRequest, InteractionRequest, LandscapeRequest, MetaphorRequest,
    PersonaSelectionRequest, PostSurveyRequest, PreSurveyRequest, SituationRequest,
};

/// Result of a successful stage transition
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageOutcome {
    /// Session identifier
    pub session_id: SessionId,
    /// Stage the session moved to
    pub stage: Stage,
    /// Page the client should navigate to next
    pub next: String,
}

impl StageOutcome {
    fn new(session_id: SessionId, stage: Stage, persona: Option<PersonaKey>) -> Self {
        Self {
            session_id,
            stage,
            next: page_for(stage, session_id, persona),
        }
    }
}

/// Flow controller over the shared server resources
pub struct SessionFlow<'a> {
    resources: &'a ServerResources,
}

impl<'a> SessionFlow<'a> {
    /// Controller borrowing the shared resources
    #[must_use]
    pub const fn new(resources: &'a ServerResources) -> Self {
        Self { resources }
    }

    /// Create a session at the situation stage (landing to situation)
    ///
    /// # Errors
    ///
    /// Returns a generic persistence error if the session cannot be stored
    #[instrument(skip(self))]
    pub async fn start_session(&self) -> AppResult<StageOutcome> {
        let session = Session::start();

        if let Err(e) = self.resources.database.create_session(&session).await {
            error!(error = %e, "Failed to create session");
            return Err(AppError::database("Failed to create session").with_source(e));
        }

        FlowLogger::log_stage_transition(
            &session.id.to_string(),
            Stage::Landing.as_str(),
            Stage::Situation.as_str(),
        );
        Ok(StageOutcome::new(session.id, session.current_step, None))
    }

    /// Store the situation description (situation to `pre_survey`)
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank or overlong text, or a not-found or
    /// stage-conflict error from the guarded write
    #[instrument(skip(self, request))]
    pub async fn describe_situation(&self, request: SituationRequest) -> AppResult<StageOutcome> {
        let id = session_id(request.session_id.as_deref())?;
        let text = validation::situation(request.situation_description.as_deref())?;

        let write = self.resources.database.update_situation(id, &text).await?;
        expect_applied(id, write, Stage::Situation, Stage::PreSurvey)?;

        self.log(
            id,
            InteractionKind::SituationDescribed,
            &json!({
                "situationDescription": text,
                "characterCount": text.chars().count(),
            }),
        )
        .await?;
        Ok(StageOutcome::new(id, Stage::PreSurvey, None))
    }

    /// Store the baseline survey (`pre_survey` to `pre_landscape`)
    ///
    /// # Errors
    ///
    /// Returns a validation error for any missing or out-of-range rating, or a
    /// not-found or stage-conflict error from the guarded write
    #[instrument(skip(self, request))]
    pub async fn submit_pre_survey(&self, request: PreSurveyRequest) -> AppResult<StageOutcome> {
        let id = session_id(request.session_id.as_deref())?;
        let survey = PreSurvey::from_json(
            [
                request.pre_item1.as_ref(),
                request.pre_item2.as_ref(),
                request.pre_item3.as_ref(),
            ],
            request.panas_data.as_ref(),
        )?;

        let write = self.resources.database.update_pre_survey(id, &survey).await?;
        expect_applied(id, write, Stage::PreSurvey, Stage::PreLandscape)?;

        self.log(
            id,
            InteractionKind::PreSurveyCompleted,
            &json!({
                "pre_item_1": survey.items[0],
                "pre_item_2": survey.items[1],
                "pre_item_3": survey.items[2],
                "panas_data": survey.affect,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        )
        .await?;
        Ok(StageOutcome::new(id, Stage::PreLandscape, None))
    }

    /// Store a landscape self-report for `phase`
    ///
    /// `Pre` moves `pre_landscape` to `persona_selection`; `Post` moves
    /// `post_landscape` to `post_survey`.
    ///
    /// # Errors
    ///
    /// Returns a validation error for blank phrases or invalid ratings, or a
    /// not-found or stage-conflict error from the guarded write
    #[instrument(skip(self, request), fields(phase = phase.as_str()))]
    pub async fn submit_landscape(
        &self,
        phase: LandscapePhase,
        request: LandscapeRequest,
    ) -> AppResult<StageOutcome> {
        let id = session_id(request.session_id.as_deref())?;
        let landscape = LandscapeAssessment::from_json(
            request.generated_start_phrase.as_deref(),
            request.generated_end_phrase.as_deref(),
            request.edited_start_phrase.as_deref(),
            request.edited_end_phrase.as_deref(),
            request.journey_progress.as_ref(),
            request.willingness_to_continue.as_ref(),
        )?;

        let from = phase.stage();
        let to = from
            .next()
            .ok_or_else(|| AppError::internal("Landscape stage has no successor"))?;
        let write = self
            .resources
            .database
            .update_landscape(id, phase, &landscape)
            .await?;
        expect_applied(id, write, from, to)?;

        Ok(StageOutcome::new(id, to, None))
    }

    /// Record the chosen persona (`persona_selection` to chat)
    ///
    /// # Errors
    ///
    /// Returns a validation error when neither a persona nor a quadrant is given,
    /// a not-found error for an unknown persona, or a stage-conflict error
    #[instrument(skip(self, request))]
    pub async fn select_persona(
        &self,
        request: PersonaSelectionRequest,
    ) -> AppResult<StageOutcome> {
        let id = session_id(request.session_id.as_deref())?;
        let key = match (request.persona.as_deref(), request.quadrant.as_deref()) {
            (Some(persona), _) if !persona.trim().is_empty() => persona.trim().parse::<PersonaKey>()?,
            (_, Some(quadrant)) if !quadrant.trim().is_empty() => {
                quadrant.trim().parse::<Quadrant>()?.persona()
            }
            _ => return Err(AppError::missing_field("persona")),
        };

        let write = self
            .resources
            .database
            .advance_stage(id, Stage::PersonaSelection, Stage::Chat)
            .await?;
        expect_applied(id, write, Stage::PersonaSelection, Stage::Chat)?;

        self.log(
            id,
            InteractionKind::GridSelection,
            &json!({
                "quadrant": key.quadrant(),
                "persona": key,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        )
        .await?;
        info!(session.id = %id, persona = %key, "Persona selected");
        Ok(StageOutcome::new(id, Stage::Chat, Some(key)))
    }

    /// End the chat before the exchange limit (chat to `post_landscape`)
    ///
    /// # Errors
    ///
    /// Returns a not-found or stage-conflict error from the guarded write
    #[instrument(skip(self, request))]
    pub async fn finish_chat_early(&self, request: FinishChatRequest) -> AppResult<StageOutcome> {
        let id = session_id(request.session_id.as_deref())?;
        let database = &self.resources.database;

        let write = database
            .advance_stage(id, Stage::Chat, Stage::PostLandscape)
            .await?;
        expect_applied(id, write, Stage::Chat, Stage::PostLandscape)?;

        let total_exchanges = database
            .count_chat_messages(id, MessageRole::Assistant.as_str())
            .await?;
        self.log(
            id,
            InteractionKind::ConversationFinishedEarly,
            &json!({
                "totalExchanges": total_exchanges,
                "maxExchanges": MAX_EXCHANGES,
                "timestamp": Utc::now().to_rfc3339(),
            }),
        )
        .await?;
        Ok(StageOutcome::new(id, Stage::PostLandscape, None))
    }

    /// Resolve the situation the metaphor generator should use
    ///
    /// With a session id the stored situation is used and the session must be
    /// at a landscape stage; otherwise the raw `situation` field is passed on.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown session or a stage conflict
    /// outside the landscape stages
    pub async fn metaphor_situation(&self, request: MetaphorRequest) -> AppResult<String> {
        let Some(raw_id) = request.session_id.as_deref().filter(|s| !s.trim().is_empty()) else {
            return Ok(request.situation.unwrap_or_default());
        };

        let id: SessionId = raw_id.parse()?;
        let session = self.require_session(id).await?;
        if !matches!(
            session.current_step,
            Stage::PreLandscape | Stage::PostLandscape
        ) {
            return Err(conflict(id, session.current_step, Stage::PreLandscape));
        }
        Ok(session.situation_description.unwrap_or_default())
    }

    /// Generate start and destination metaphors for a situation
    ///
    /// # Errors
    ///
    /// Returns a [`MetaphorError`] carrying the fallback pair
    pub async fn generate_landscape_metaphors(
        &self,
        situation: &str,
    ) -> Result<MetaphorPair, MetaphorError> {
        MetaphorGenerator::new(self.resources.llm(), self.resources.config.metaphors)
            .generate(situation)
            .await
    }

    /// Store the follow-up survey and complete the session (`post_survey` to completed)
    ///
    /// # Errors
    ///
    /// Returns a validation error for any invalid rating or a short reflection,
    /// or a not-found or stage-conflict error from the guarded write
    #[instrument(skip(self, request))]
    pub async fn submit_post_survey(&self, request: PostSurveyRequest) -> AppResult<StageOutcome> {
        let id = session_id(request.session_id.as_deref())?;
        let survey = PostSurvey::from_json(
            [
                request.post_item1.as_ref(),
                request.post_item2.as_ref(),
                request.post_item3.as_ref(),
                request.post_item4.as_ref(),
                request.post_item5.as_ref(),
                request.post_item6.as_ref(),
            ],
            request.panas_data.as_ref(),
            request.open_response.as_deref(),
        )?;

        let completed_at = Utc::now();
        let write = self
            .resources
            .database
            .update_post_survey(id, &survey, completed_at)
            .await?;
        expect_applied(id, write, Stage::PostSurvey, Stage::Completed)?;

        let mut payload = Map::new();
        for (index, value) in survey.items.iter().enumerate() {
            payload.insert(format!("post_item_{}", index + 1), json!(value));
        }
        payload.insert("panas_data".to_owned(), json!(survey.affect));
        payload.insert("open_response".to_owned(), json!(survey.open_response));
        payload.insert("timestamp".to_owned(), json!(completed_at.to_rfc3339()));
        self.log(id, InteractionKind::PostSurveyCompleted, &Value::Object(payload))
            .await?;

        info!(session.id = %id, "Session completed");
        Ok(StageOutcome::new(id, Stage::Completed, None))
    }

    /// Append a client-reported event
    ///
    /// # Errors
    ///
    /// Returns a validation error for a malformed tag, not-found for an unknown
    /// session, or a stage conflict for a completed session
    #[instrument(skip(self, request))]
    pub async fn log_interaction(&self, request: InteractionRequest) -> AppResult<i64> {
        let id = session_id(request.session_id.as_deref())?;
        let tag = request
            .interaction_type
            .as_deref()
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .ok_or_else(|| AppError::missing_field("interactionType"))?;
        validation::interaction_type(tag)?;
        let data = request.data.unwrap_or_else(|| json!({}));

        let database = &self.resources.database;
        if let Some(row_id) = database.append_client_interaction(id, tag, &data).await? {
            return Ok(row_id);
        }

        Err(match database.current_stage(id).await? {
            None => AppError::not_found(format!("Session {id}")),
            Some(stage) => conflict(id, stage, stage),
        })
    }

    /// Full session record
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown session
    pub async fn session(&self, id: SessionId) -> AppResult<Session> {
        self.require_session(id).await
    }

    /// Interactions of a session in insertion order
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown session
    pub async fn interactions(&self, id: SessionId) -> AppResult<Vec<Interaction>> {
        if self.resources.database.current_stage(id).await?.is_none() {
            return Err(AppError::not_found(format!("Session {id}")));
        }
        self.resources.database.list_interactions(id).await
    }

    /// Apply the navigation guard to a stage page
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown page name or a database error
    pub async fn navigate(
        &self,
        page: &str,
        session: Option<&str>,
        persona: Option<&str>,
        post: bool,
    ) -> AppResult<Navigation> {
        let page = Page::from_segment(page)?;
        let record = match navigation::parse_session_param(session) {
            Some(id) => self.resources.database.get_session(id).await?,
            None => None,
        };
        Ok(guard(page, post, record.as_ref(), persona))
    }

    async fn require_session(&self, id: SessionId) -> AppResult<Session> {
        self.resources
            .database
            .get_session(id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Session {id}")))
    }

    async fn log(&self, id: SessionId, kind: InteractionKind, data: &Value) -> AppResult<()> {
        self.resources
            .database
            .append_interaction(id, kind, data)
            .await
            .map(|_| ())
    }
}

fn expect_applied(
    id: SessionId,
    write: GuardedWrite,
    from: Stage,
    to: Stage,
) -> AppResult<()> {
    match write {
        GuardedWrite::Applied => {
            FlowLogger::log_stage_transition(&id.to_string(), from.as_str(), to.as_str());
            Ok(())
        }
        GuardedWrite::NotFound => Err(AppError::not_found(format!("Session {id}"))),
        GuardedWrite::WrongStage(actual) => Err(conflict(id, actual, from)),
    }
}

fn conflict(id: SessionId, actual: Stage, expected: Stage) -> AppError {
    FlowLogger::log_stage_conflict(&id.to_string(), expected.as_str(), actual.as_str());
    let message = if actual.is_terminal() {
        "Session is already completed".to_owned()
    } else {
        format!("Session is at stage {actual}, not {expected}")
    };
    AppError::stage_conflict(message).with_details(json!({
        "currentStage": actual,
        "next": page_for(actual, id, None),
    }))
}
