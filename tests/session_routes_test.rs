// ABOUTME: Integration tests for the session stage routes and the interaction log
// ABOUTME: Walks a full session over HTTP and checks validation, stage conflicts, and completion
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;
mod helpers;

use axum::http::StatusCode;
use axum::Router;
use common::{
    create_test_resources, create_test_router, interaction_types, panas, session_at, SITUATION,
};
use helpers::axum_test::AxumTestRequest;
use serde_json::{json, Value};
use wayfinder::models::Stage;

async fn setup() -> Router {
    let resources = create_test_resources(None).await;
    create_test_router(&resources)
}

async fn post(router: &Router, uri: &str, body: &Value) -> (StatusCode, Value) {
    let response = AxumTestRequest::post(uri).json(body).send(router.clone()).await;
    let status = response.status_code();
    (status, response.json())
}

async fn start(router: &Router) -> String {
    let response = AxumTestRequest::post("/api/sessions")
        .send(router.clone())
        .await
        .assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    body["sessionId"].as_str().unwrap().to_owned()
}

// ============================================================================
// Full Session
// ============================================================================

#[tokio::test]
async fn test_full_session_reaches_completed() {
    let resources = create_test_resources(None).await;
    let router = create_test_router(&resources);

    let response = AxumTestRequest::post("/api/sessions")
        .send(router.clone())
        .await
        .assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["stage"], "situation");
    let id = body["sessionId"].as_str().unwrap().to_owned();
    assert_eq!(body["next"], format!("/situation?session={id}"));

    let (status, body) = post(
        &router,
        "/api/sessions/situation",
        &json!({ "sessionId": id, "situationDescription": SITUATION }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["stage"], "pre_survey");
    assert_eq!(body["next"], format!("/survey?session={id}"));

    let (status, body) = post(
        &router,
        "/api/sessions/survey",
        &json!({
            "sessionId": id,
            "preItem1": 4,
            "preItem2": 5,
            "preItem3": 2,
            "panasData": panas(3),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["stage"], "pre_landscape");

    let (status, body) = post(
        &router,
        "/api/sessions/pre-landscape",
        &json!({
            "sessionId": id,
            "generatedStartPhrase": "uncertain valley",
            "generatedEndPhrase": "confident peak",
            "journeyProgress": 2,
            "willingnessToContinue": 6,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["stage"], "persona_selection");
    assert_eq!(body["next"], format!("/experiment?session={id}"));

    let (status, body) = post(
        &router,
        "/api/sessions/persona",
        &json!({ "sessionId": id, "quadrant": "top-left" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["stage"], "chat");
    assert_eq!(
        body["next"],
        format!("/chat?session={id}&persona=sycophantic-self")
    );

    let (status, body) = post(&router, "/api/sessions/chat/finish", &json!({ "sessionId": id })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["stage"], "post_landscape");

    let (status, body) = post(
        &router,
        "/api/sessions/landscape",
        &json!({
            "sessionId": id,
            "generatedStartPhrase": "uncertain valley",
            "generatedEndPhrase": "confident peak",
            "editedEndPhrase": "calm harbor",
            "journeyProgress": 7,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["stage"], "post_survey");
    assert_eq!(body["next"], format!("/survey?session={id}&post=true"));

    let (status, body) = post(
        &router,
        "/api/sessions/post-survey",
        &json!({
            "sessionId": id,
            "postItem1": 5, "postItem2": 5, "postItem3": 4,
            "postItem4": 3, "postItem5": 6, "postItem6": 7,
            "panasData": panas(2),
            "openResponse": "The conversation helped me see the next step.",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["stage"], "completed");

    let body: Value = AxumTestRequest::get(&format!("/api/sessions/{id}"))
        .send(router.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    let session = &body["session"];
    assert_eq!(session["currentStep"], "completed");
    assert_eq!(session["situationDescription"], SITUATION);
    assert!(!session["completedAt"].is_null());
    assert_eq!(session["postLandscape"]["willingnessToContinue"], Value::Null);

    let id = id.parse().unwrap();
    assert_eq!(
        interaction_types(&resources, id).await,
        vec![
            "session_started",
            "situation_described",
            "pre_survey_completed",
            "grid_selection",
            "conversation_finished_early",
            "post_survey_completed",
        ]
    );
}

#[tokio::test]
async fn test_interactions_listed_in_order() {
    let router = setup().await;
    let id = start(&router).await;

    for tag in ["landscape_viewed", "metaphor_edited"] {
        let (status, body) = post(
            &router,
            "/api/interactions",
            &json!({ "sessionId": id, "interactionType": tag, "data": { "tag": tag } }),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        assert!(body["id"].as_i64().unwrap() > 0);
    }

    let body: Value = AxumTestRequest::get(&format!("/api/sessions/{id}/interactions"))
        .send(router.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["total"], 3);
    let tags: Vec<&str> = body["interactions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["interactionType"].as_str().unwrap())
        .collect();
    assert_eq!(tags, vec!["session_started", "landscape_viewed", "metaphor_edited"]);
    assert_eq!(body["interactions"][2]["data"]["tag"], "metaphor_edited");
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_situation_validation() {
    let router = setup().await;
    let id = start(&router).await;

    let (status, _) = post(
        &router,
        "/api/sessions/situation",
        &json!({ "sessionId": id, "situationDescription": "   " }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(
        &router,
        "/api/sessions/situation",
        &json!({ "sessionId": id, "situationDescription": "x".repeat(1001) }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["details"]["length"], 1001);

    let (status, _) = post(
        &router,
        "/api/sessions/situation",
        &json!({ "sessionId": id, "situationDescription": "x".repeat(1000) }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_missing_and_malformed_session_ids() {
    let router = setup().await;

    let (status, _) = post(
        &router,
        "/api/sessions/situation",
        &json!({ "situationDescription": SITUATION }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &router,
        "/api/sessions/situation",
        &json!({ "sessionId": "not-a-uuid", "situationDescription": SITUATION }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &router,
        "/api/sessions/situation",
        &json!({
            "sessionId": "7b0c2a5e-8d1f-4e4b-9a51-0c3d2f1e6a77",
            "situationDescription": SITUATION,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    AxumTestRequest::get("/api/sessions/not-a-uuid")
        .send(router.clone())
        .await
        .assert_status(StatusCode::BAD_REQUEST);
    AxumTestRequest::get("/api/sessions/7b0c2a5e-8d1f-4e4b-9a51-0c3d2f1e6a77/interactions")
        .send(router.clone())
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_body_rejected() {
    let router = setup().await;
    AxumTestRequest::post("/api/sessions/situation")
        .raw_json("{\"sessionId\": ")
        .send(router)
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pre_survey_rating_ranges() {
    let resources = create_test_resources(None).await;
    let router = create_test_router(&resources);
    let id = session_at(&resources, Stage::PreSurvey).await.to_string();

    let mut affect = panas(3);
    affect.insert("upset".to_owned(), json!(6));
    let (status, _) = post(
        &router,
        "/api/sessions/survey",
        &json!({
            "sessionId": id, "preItem1": 4, "preItem2": 4, "preItem3": 4, "panasData": affect,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let mut affect = panas(3);
    affect.remove("hostile");
    let (status, _) = post(
        &router,
        "/api/sessions/survey",
        &json!({
            "sessionId": id, "preItem1": 4, "preItem2": 4, "preItem3": 4, "panasData": affect,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &router,
        "/api/sessions/survey",
        &json!({
            "sessionId": id, "preItem1": 8, "preItem2": 4, "preItem3": 4, "panasData": panas(3),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Nothing was stored by the rejected submissions
    let session = resources.database.get_session(id.parse().unwrap()).await.unwrap().unwrap();
    assert_eq!(session.current_step, Stage::PreSurvey);
    assert!(session.pre_survey.is_none());
}

#[tokio::test]
async fn test_willingness_required_below_journey_complete() {
    let resources = create_test_resources(None).await;
    let router = create_test_router(&resources);
    let id = session_at(&resources, Stage::PreLandscape).await.to_string();

    let landscape = |progress: u8, willingness: Option<u8>| {
        let mut body = json!({
            "sessionId": id,
            "generatedStartPhrase": "uncertain valley",
            "generatedEndPhrase": "confident peak",
            "journeyProgress": progress,
        });
        if let Some(willingness) = willingness {
            body["willingnessToContinue"] = json!(willingness);
        }
        body
    };

    let (status, _) = post(&router, "/api/sessions/pre-landscape", &landscape(6, None)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(&router, "/api/sessions/pre-landscape", &landscape(0, Some(3))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // At 7 willingness is optional but still range-checked when given
    let (status, _) = post(&router, "/api/sessions/pre-landscape", &landscape(7, Some(9))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(&router, "/api/sessions/pre-landscape", &landscape(7, Some(4))).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let session = resources.database.get_session(id.parse().unwrap()).await.unwrap().unwrap();
    let stored = session.pre_landscape.unwrap();
    assert_eq!(stored.journey_progress, 7);
    assert_eq!(stored.willingness_to_continue, Some(4));
}

#[tokio::test]
async fn test_persona_selection_inputs() {
    let resources = create_test_resources(None).await;
    let router = create_test_router(&resources);
    let id = session_at(&resources, Stage::PersonaSelection).await.to_string();

    let (status, _) = post(&router, "/api/sessions/persona", &json!({ "sessionId": id })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &router,
        "/api/sessions/persona",
        &json!({ "sessionId": id, "persona": "cheerful-robot" }),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = post(
        &router,
        "/api/sessions/persona",
        &json!({ "sessionId": id, "quadrant": "middle" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Persona wins over a conflicting quadrant
    let (status, body) = post(
        &router,
        "/api/sessions/persona",
        &json!({ "sessionId": id, "persona": "antagonistic-companion", "quadrant": "top-left" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["next"]
        .as_str()
        .unwrap()
        .ends_with("&persona=antagonistic-companion"));
}

#[tokio::test]
async fn test_post_survey_requires_reflection() {
    let resources = create_test_resources(None).await;
    let router = create_test_router(&resources);
    let id = session_at(&resources, Stage::PostSurvey).await.to_string();

    let (status, _) = post(
        &router,
        "/api/sessions/post-survey",
        &json!({
            "sessionId": id,
            "postItem1": 5, "postItem2": 5, "postItem3": 4,
            "postItem4": 3, "postItem5": 6, "postItem6": 7,
            "panasData": panas(2),
            "openResponse": "   too short        ",
        }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let session = resources.database.get_session(id.parse().unwrap()).await.unwrap().unwrap();
    assert_eq!(session.current_step, Stage::PostSurvey);
    assert!(session.completed_at.is_none());
}

#[tokio::test]
async fn test_reflection_stored_verbatim() {
    let resources = create_test_resources(None).await;
    let router = create_test_router(&resources);
    let id = session_at(&resources, Stage::PostSurvey).await;

    let reflection = "  I felt heard today.\n  Thank you.  ";
    let (status, body) = post(
        &router,
        "/api/sessions/post-survey",
        &json!({
            "sessionId": id.to_string(),
            "postItem1": 5, "postItem2": 5, "postItem3": 4,
            "postItem4": 3, "postItem5": 6, "postItem6": 7,
            "panasData": panas(2),
            "openResponse": reflection,
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let session = resources.database.get_session(id).await.unwrap().unwrap();
    assert_eq!(session.post_survey.unwrap().open_response, reflection);

    let interactions = resources.database.list_interactions(id).await.unwrap();
    let completed = interactions.last().unwrap();
    assert_eq!(completed.interaction_type, "post_survey_completed");
    assert_eq!(completed.data["open_response"], reflection);
}

#[tokio::test]
async fn test_interaction_type_validation() {
    let router = setup().await;
    let id = start(&router).await;

    let too_long = "a".repeat(51);
    for tag in ["", "Has-Capitals", "spaces here", too_long.as_str()] {
        let (status, _) = post(
            &router,
            "/api/interactions",
            &json!({ "sessionId": id, "interactionType": tag }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "tag {tag:?}");
    }

    let (status, _) = post(
        &router,
        "/api/interactions",
        &json!({ "sessionId": id, "interactionType": "a".repeat(50) }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
}

// ============================================================================
// Stage Ordering
// ============================================================================

#[tokio::test]
async fn test_out_of_order_submission_conflicts() {
    let router = setup().await;
    let id = start(&router).await;

    let (status, body) = post(
        &router,
        "/api/sessions/survey",
        &json!({
            "sessionId": id, "preItem1": 4, "preItem2": 4, "preItem3": 4, "panasData": panas(3),
        }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["details"]["currentStage"], "situation");
    assert_eq!(
        body["error"]["details"]["next"],
        format!("/situation?session={id}")
    );
}

#[tokio::test]
async fn test_repeated_submission_conflicts() {
    let router = setup().await;
    let id = start(&router).await;
    let body = json!({ "sessionId": id, "situationDescription": SITUATION });

    let (status, _) = post(&router, "/api/sessions/situation", &body).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = post(&router, "/api/sessions/situation", &body).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["details"]["currentStage"], "pre_survey");
}

#[tokio::test]
async fn test_completed_session_rejects_writes() {
    let resources = create_test_resources(None).await;
    let router = create_test_router(&resources);
    let session = session_at(&resources, Stage::PostSurvey).await;
    let id = session.to_string();

    let survey = json!({
        "sessionId": id,
        "postItem1": 5, "postItem2": 5, "postItem3": 4,
        "postItem4": 3, "postItem5": 6, "postItem6": 7,
        "panasData": panas(2),
        "openResponse": "I feel more prepared to talk to my family.",
    });
    let (status, _) = post(&router, "/api/sessions/post-survey", &survey).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = post(&router, "/api/sessions/post-survey", &survey).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "Session is already completed");

    let (status, _) = post(
        &router,
        "/api/interactions",
        &json!({ "sessionId": id, "interactionType": "late_click" }),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let tags = interaction_types(&resources, session).await;
    assert_eq!(tags.last().map(String::as_str), Some("post_survey_completed"));
    assert_eq!(
        tags.iter().filter(|t| *t == "post_survey_completed").count(),
        1
    );
}

#[tokio::test]
async fn test_concurrent_submissions_apply_once() {
    let resources = create_test_resources(None).await;
    let router = create_test_router(&resources);
    let session = session_at(&resources, Stage::Situation).await;
    let body = json!({ "sessionId": session.to_string(), "situationDescription": SITUATION });

    let (first, second) = tokio::join!(
        post(&router, "/api/sessions/situation", &body),
        post(&router, "/api/sessions/situation", &body),
    );
    let mut statuses = [first.0, second.0];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::OK, StatusCode::CONFLICT]);

    let described = interaction_types(&resources, session)
        .await
        .into_iter()
        .filter(|t| t == "situation_described")
        .count();
    assert_eq!(described, 1);
}

// ============================================================================
// Surface
// ============================================================================

#[tokio::test]
async fn test_health_and_readiness() {
    let router = setup().await;

    let body: Value = AxumTestRequest::get("/health")
        .send(router.clone())
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["status"], "healthy");

    let body: Value = AxumTestRequest::get("/ready")
        .send(router)
        .await
        .assert_status(StatusCode::OK)
        .json();
    assert_eq!(body["database"], "ok");
    assert_eq!(body["llmConfigured"], false);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let router = setup().await;

    let response = AxumTestRequest::get("/health").send(router.clone()).await;
    assert!(response.header("x-request-id").is_some());

    let response = AxumTestRequest::get("/health")
        .header("x-request-id", "req-from-client")
        .send(router)
        .await;
    assert_eq!(
        response.header("x-request-id").as_deref(),
        Some("req-from-client")
    );
}

#[tokio::test]
async fn test_oversized_body_rejected() {
    let resources = create_test_resources(None).await;
    let limit = resources.config.max_request_body_bytes;
    let router = create_test_router(&resources);

    let body = format!(
        "{{\"interactionType\":\"big\",\"data\":\"{}\"}}",
        "x".repeat(limit + 1)
    );
    let response = AxumTestRequest::post("/api/interactions")
        .header("content-length", &body.len().to_string())
        .raw_json(&body)
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_streamed_oversized_body_rejected() {
    let resources = create_test_resources(None).await;
    let limit = resources.config.max_request_body_bytes;
    let router = create_test_router(&resources);

    // No content-length: the limit trips while the JSON body is buffered
    let body = format!(
        "{{\"interactionType\":\"big\",\"data\":\"{}\"}}",
        "x".repeat(limit + 1)
    );
    let response = AxumTestRequest::post("/api/interactions")
        .raw_json(&body)
        .send(router)
        .await;
    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = response.json();
    assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
}
