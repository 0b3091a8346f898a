// ABOUTME: Integration tests for SQLite session storage and the interaction log
// ABOUTME: Covers migrations, stage-guarded writes, and round-trips of stored assessments
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::Utc;
use common::{init_test_logging, panas};
use serde_json::json;
use tempfile::TempDir;
use wayfinder::config::DatabaseUrl;
use wayfinder::database::{applied_migrations, Database, GuardedWrite, MIGRATIONS};
use wayfinder::models::{
    AffectItem, InteractionKind, LandscapeAssessment, LandscapePhase, PostSurvey, PreSurvey,
    Session, SessionId, Stage,
};

async fn create_test_database() -> Database {
    init_test_logging();
    Database::new(&DatabaseUrl::Memory).await.unwrap()
}

async fn started(database: &Database) -> Session {
    let session = Session::start();
    database.create_session(&session).await.unwrap();
    session
}

#[tokio::test]
async fn test_migrations_recorded_once() {
    let database = create_test_database().await;
    database.migrate().await.unwrap();

    let applied = applied_migrations(database.pool()).await.unwrap();
    assert_eq!(applied.len(), MIGRATIONS.len());
    for (applied, migration) in applied.iter().zip(MIGRATIONS) {
        assert_eq!(applied.version, migration.version);
        assert_eq!(applied.name, migration.name);
    }
}

#[tokio::test]
async fn test_session_round_trip() {
    let database = create_test_database().await;
    let session = started(&database).await;

    let stored = database.get_session(session.id).await.unwrap().unwrap();
    assert_eq!(stored.id, session.id);
    assert_eq!(stored.current_step, Stage::Situation);
    assert!(stored.situation_description.is_none());
    assert!(stored.pre_survey.is_none());
    assert!(stored.completed_at.is_none());

    assert!(database.get_session(SessionId::new()).await.unwrap().is_none());
    assert_eq!(
        database.current_stage(session.id).await.unwrap(),
        Some(Stage::Situation)
    );
}

#[tokio::test]
async fn test_guarded_write_outcomes() {
    let database = create_test_database().await;
    let session = started(&database).await;

    assert_eq!(
        database.update_situation(session.id, "first").await.unwrap(),
        GuardedWrite::Applied
    );
    assert_eq!(
        database.update_situation(session.id, "second").await.unwrap(),
        GuardedWrite::WrongStage(Stage::PreSurvey)
    );
    assert_eq!(
        database.update_situation(SessionId::new(), "third").await.unwrap(),
        GuardedWrite::NotFound
    );

    // The rejected write left the stored text alone
    let stored = database.get_session(session.id).await.unwrap().unwrap();
    assert_eq!(stored.situation_description.as_deref(), Some("first"));
}

#[tokio::test]
async fn test_surveys_and_landscapes_persist() {
    let database = create_test_database().await;
    let session = started(&database).await;
    let id = session.id;
    database.update_situation(id, "moving abroad").await.unwrap();

    let affect = panas(4);
    let pre = PreSurvey::from_json(
        [Some(&json!(1)), Some(&json!(4)), Some(&json!(7))],
        Some(&affect),
    )
    .unwrap();
    assert_eq!(
        database.update_pre_survey(id, &pre).await.unwrap(),
        GuardedWrite::Applied
    );

    let landscape = LandscapeAssessment::from_json(
        Some("anxious valley"),
        Some("confident peak"),
        Some("anxious forest"),
        None,
        Some(&json!(2)),
        Some(&json!(6)),
    )
    .unwrap();
    assert_eq!(
        database
            .update_landscape(id, LandscapePhase::Pre, &landscape)
            .await
            .unwrap(),
        GuardedWrite::Applied
    );
    // Post phase requires post_landscape
    assert_eq!(
        database
            .update_landscape(id, LandscapePhase::Post, &landscape)
            .await
            .unwrap(),
        GuardedWrite::WrongStage(Stage::PersonaSelection)
    );

    database
        .advance_stage(id, Stage::PersonaSelection, Stage::Chat)
        .await
        .unwrap();
    database
        .advance_stage(id, Stage::Chat, Stage::PostLandscape)
        .await
        .unwrap();
    database
        .update_landscape(id, LandscapePhase::Post, &landscape)
        .await
        .unwrap();

    let post = PostSurvey::from_json(
        [
            Some(&json!(2)),
            Some(&json!(3)),
            Some(&json!(4)),
            Some(&json!(5)),
            Some(&json!(6)),
            Some(&json!(7)),
        ],
        Some(&panas(1)),
        Some("  A long enough reflection on the chat.  "),
    )
    .unwrap();
    let completed_at = Utc::now();
    assert_eq!(
        database
            .update_post_survey(id, &post, completed_at)
            .await
            .unwrap(),
        GuardedWrite::Applied
    );

    let stored = database.get_session(id).await.unwrap().unwrap();
    assert_eq!(stored.current_step, Stage::Completed);
    assert!(stored.is_completed());
    assert!(stored.completed_at.is_some());
    assert_eq!(stored.pre_survey.as_ref().unwrap().items, [1, 4, 7]);
    assert_eq!(
        stored.pre_survey.as_ref().unwrap().affect.get(AffectItem::Nervous),
        4
    );
    let pre_landscape = stored.pre_landscape.unwrap();
    assert_eq!(pre_landscape.edited_start_phrase.as_deref(), Some("anxious forest"));
    assert_eq!(pre_landscape.edited_end_phrase, None);
    assert_eq!(pre_landscape.willingness_to_continue, Some(6));
    let post_survey = stored.post_survey.unwrap();
    assert_eq!(post_survey.items, [2, 3, 4, 5, 6, 7]);
    assert_eq!(post_survey.open_response, "A long enough reflection on the chat.");

    // Terminal: nothing advances a completed session
    assert_eq!(
        database
            .advance_stage(id, Stage::PostSurvey, Stage::Completed)
            .await
            .unwrap(),
        GuardedWrite::WrongStage(Stage::Completed)
    );
}

#[tokio::test]
async fn test_interaction_log_ordering_and_counts() {
    let database = create_test_database().await;
    let first = started(&database).await;
    let second = started(&database).await;

    for role in ["user", "assistant", "user", "assistant"] {
        database
            .append_interaction(
                first.id,
                InteractionKind::ChatMessage,
                &json!({ "role": role, "content": "..." }),
            )
            .await
            .unwrap();
    }

    let log = database.list_interactions(first.id).await.unwrap();
    assert_eq!(log.len(), 5);
    assert!(log.windows(2).all(|pair| pair[0].id < pair[1].id));
    assert!(log.iter().all(|i| i.session_id == first.id));

    assert_eq!(database.list_interactions(second.id).await.unwrap().len(), 1);
    assert_eq!(database.count_chat_messages(first.id, "user").await.unwrap(), 2);
    assert_eq!(
        database.count_chat_messages(first.id, "assistant").await.unwrap(),
        2
    );
    assert_eq!(
        database.count_chat_messages(second.id, "assistant").await.unwrap(),
        0
    );
}

#[tokio::test]
async fn test_chat_messages_guarded_by_stage_and_exchange() {
    let database = create_test_database().await;
    let session = started(&database).await;
    let message = json!({ "role": "user", "content": "hello" });

    // Not chatting yet
    assert!(database
        .append_chat_message(session.id, "user", 1, &message)
        .await
        .unwrap()
        .is_none());

    database
        .advance_stage(session.id, Stage::Situation, Stage::Chat)
        .await
        .unwrap();
    assert!(database
        .append_chat_message(session.id, "user", 1, &message)
        .await
        .unwrap()
        .is_some());

    // Replayed and skipped exchanges write nothing
    assert!(database
        .append_chat_message(session.id, "user", 1, &message)
        .await
        .unwrap()
        .is_none());
    assert!(database
        .append_chat_message(session.id, "user", 3, &message)
        .await
        .unwrap()
        .is_none());
    assert!(database
        .append_chat_message(
            session.id,
            "assistant",
            1,
            &json!({ "role": "assistant", "content": "hi" })
        )
        .await
        .unwrap()
        .is_some());

    database
        .advance_stage(session.id, Stage::Chat, Stage::PostLandscape)
        .await
        .unwrap();
    assert!(database
        .append_chat_message(session.id, "user", 2, &message)
        .await
        .unwrap()
        .is_none());
    assert_eq!(
        database.count_chat_messages(session.id, "user").await.unwrap(),
        1
    );
}

#[tokio::test]
async fn test_client_interactions_refused_for_unknown_or_completed() {
    let database = create_test_database().await;
    let session = started(&database).await;

    let id = database
        .append_client_interaction(session.id, "button_click", &json!({ "x": 1 }))
        .await
        .unwrap();
    assert!(id.is_some());

    assert!(database
        .append_client_interaction(SessionId::new(), "button_click", &json!({}))
        .await
        .unwrap()
        .is_none());

    // Force the terminal stage directly
    sqlx::query("UPDATE sessions SET current_step = 'completed' WHERE id = $1")
        .bind(session.id.to_string())
        .execute(database.pool())
        .await
        .unwrap();
    assert!(database
        .append_client_interaction(session.id, "button_click", &json!({}))
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_session_start_is_atomic() {
    let database = create_test_database().await;
    let session = started(&database).await;

    let log = database.list_interactions(session.id).await.unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].interaction_type, "session_started");

    // A failed start rolls back the log entry with the session row
    assert!(database.create_session(&session).await.is_err());
    assert_eq!(database.list_interactions(session.id).await.unwrap().len(), 1);
    assert_eq!(database.list_sessions().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_sessions_listed_in_creation_order() {
    let database = create_test_database().await;
    let first = started(&database).await;
    let second = started(&database).await;

    let ids: Vec<SessionId> = database
        .list_sessions()
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.id)
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first.id) && ids.contains(&second.id));
}

#[tokio::test]
async fn test_read_only_open_for_export() {
    init_test_logging();
    let dir = TempDir::new().unwrap();
    let url = DatabaseUrl::SQLite {
        path: dir.path().join("wayfinder.db"),
    };
    let writer = Database::new(&url).await.unwrap();
    let session = started(&writer).await;

    let reader = Database::open_read_only(&url).await.unwrap();
    let sessions = reader.list_sessions().await.unwrap();
    assert_eq!(sessions.len(), 1);
    assert_eq!(reader.list_interactions(session.id).await.unwrap().len(), 1);
    assert!(reader.create_session(&Session::start()).await.is_err());

    let missing = dir.path().join("absent.db");
    assert!(Database::open_read_only(&DatabaseUrl::SQLite {
        path: missing.clone()
    })
    .await
    .is_err());
    assert!(!missing.exists());

    assert!(Database::open_read_only(&DatabaseUrl::Memory).await.is_err());
}
