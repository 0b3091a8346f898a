// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: In-memory server resources, a scripted completion provider, and stage fixtures
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used,
    clippy::expect_used
)]
//! Shared test utilities for `wayfinder`

use std::collections::VecDeque;
use std::env;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;
use axum::Router;
use serde_json::{json, Map, Value};
use wayfinder::config::{DatabaseUrl, ServerConfig};
use wayfinder::database::Database;
use wayfinder::errors::AppError;
use wayfinder::flow::requests::{
    LandscapeRequest, PersonaSelectionRequest, PreSurveyRequest, SituationRequest,
};
use wayfinder::flow::SessionFlow;
use wayfinder::llm::{ChatRequest, ChatResponse, LlmCapabilities, LlmProvider};
use wayfinder::models::{LandscapePhase, SessionId, Stage};
use wayfinder::resources::ServerResources;
use wayfinder::server::WayfinderServer;

static INIT_LOGGER: Once = Once::new();

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// One scripted provider answer
#[derive(Debug, Clone)]
pub enum Scripted {
    /// Successful completion with this content
    Reply(String),
    /// Upstream failure
    Fail,
}

/// Completion provider that replays scripted answers and records requests
///
/// Once the script runs out every call answers `"scripted reply"`.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<ChatRequest>>,
    capabilities: LlmCapabilities,
}

impl ScriptedProvider {
    pub fn new(script: impl IntoIterator<Item = Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            requests: Mutex::new(Vec::new()),
            capabilities: LlmCapabilities::openai_compatible(),
        }
    }

    pub fn replying(content: &str) -> Self {
        Self::new([Scripted::Reply(content.to_owned())])
    }

    pub fn failing() -> Self {
        Self::new([Scripted::Fail])
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "scripted"
    }

    fn display_name(&self) -> &'static str {
        "Scripted"
    }

    fn capabilities(&self) -> LlmCapabilities {
        self.capabilities
    }

    fn default_model(&self) -> &str {
        "scripted-model"
    }

    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, AppError> {
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Fail) => Err(AppError::external_service("OpenAI", "scripted failure")),
            Some(Scripted::Reply(content)) => Ok(response(content)),
            None => Ok(response("scripted reply".to_owned())),
        }
    }
}

fn response(content: String) -> ChatResponse {
    ChatResponse {
        content,
        model: "scripted-model".to_owned(),
        usage: None,
        finish_reason: Some("stop".to_owned()),
    }
}

/// Default configuration over an in-memory database
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::from_lookup(|_| None).unwrap();
    config.database_url = DatabaseUrl::Memory;
    config
}

/// Resources over a fresh in-memory database
pub async fn create_test_resources(llm: Option<Arc<dyn LlmProvider>>) -> Arc<ServerResources> {
    init_test_logging();
    let config = test_config();
    let database = Database::new(&config.database_url).await.unwrap();
    Arc::new(ServerResources::new(Arc::new(config), database, llm))
}

/// Resources backed by a scripted provider, returned alongside it
pub async fn create_scripted_resources(
    provider: ScriptedProvider,
) -> (Arc<ServerResources>, Arc<ScriptedProvider>) {
    let provider = Arc::new(provider);
    let llm: Arc<dyn LlmProvider> = provider.clone();
    (create_test_resources(Some(llm)).await, provider)
}

/// Full application router, middleware included
pub fn create_test_router(resources: &Arc<ServerResources>) -> Router {
    WayfinderServer::new(Arc::clone(resources)).router()
}

pub const SITUATION: &str = "I am deciding whether to leave my job to start a bakery";

/// Every affect item rated `value`
pub fn panas(value: u8) -> Map<String, Value> {
    [
        "active",
        "alert",
        "attentive",
        "determined",
        "inspired",
        "afraid",
        "ashamed",
        "hostile",
        "nervous",
        "upset",
    ]
    .into_iter()
    .map(|item| (item.to_owned(), json!(value)))
    .collect()
}

pub fn landscape_request(id: SessionId, progress: u8, willingness: Option<u8>) -> LandscapeRequest {
    LandscapeRequest {
        session_id: Some(id.to_string()),
        generated_start_phrase: Some("uncertain valley".to_owned()),
        generated_end_phrase: Some("confident peak".to_owned()),
        edited_start_phrase: None,
        edited_end_phrase: Some("calm harbor".to_owned()),
        journey_progress: Some(json!(progress)),
        willingness_to_continue: willingness.map(|w| json!(w)),
    }
}

/// Start a session and drive it forward until it sits at `target`
///
/// Supports every stage up to and including `post_survey`.
pub async fn session_at(resources: &ServerResources, target: Stage) -> SessionId {
    let flow = SessionFlow::new(resources);
    let id = flow.start_session().await.unwrap().session_id;
    if target == Stage::Situation {
        return id;
    }

    flow.describe_situation(SituationRequest {
        session_id: Some(id.to_string()),
        situation_description: Some(SITUATION.to_owned()),
    })
    .await
    .unwrap();
    if target == Stage::PreSurvey {
        return id;
    }

    flow.submit_pre_survey(PreSurveyRequest {
        session_id: Some(id.to_string()),
        pre_item1: Some(json!(4)),
        pre_item2: Some(json!(5)),
        pre_item3: Some(json!(3)),
        panas_data: Some(panas(3)),
    })
    .await
    .unwrap();
    if target == Stage::PreLandscape {
        return id;
    }

    flow.submit_landscape(LandscapePhase::Pre, landscape_request(id, 3, Some(5)))
        .await
        .unwrap();
    if target == Stage::PersonaSelection {
        return id;
    }

    flow.select_persona(PersonaSelectionRequest {
        session_id: Some(id.to_string()),
        persona: Some("sycophantic-self".to_owned()),
        quadrant: None,
    })
    .await
    .unwrap();
    if target == Stage::Chat {
        return id;
    }

    let database = &resources.database;
    database
        .advance_stage(id, Stage::Chat, Stage::PostLandscape)
        .await
        .unwrap();
    if target == Stage::PostLandscape {
        return id;
    }

    flow.submit_landscape(LandscapePhase::Post, landscape_request(id, 7, None))
        .await
        .unwrap();
    assert_eq!(target, Stage::PostSurvey, "unsupported fixture stage");
    id
}

/// Interaction tags of a session in insertion order
pub async fn interaction_types(resources: &ServerResources, id: SessionId) -> Vec<String> {
    resources
        .database
        .list_interactions(id)
        .await
        .unwrap()
        .into_iter()
        .map(|interaction| interaction.interaction_type)
        .collect()
}
