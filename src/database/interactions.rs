// ABOUTME: Append-only interaction log storage keyed by session
// ABOUTME: Server-side appends, stage-guarded client and chat appends, and readers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{parse_timestamp, Database};
use chrono::Utc;
use serde_json::Value;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use wayfinder_core::errors::{AppError, AppResult};
use wayfinder_core::models::{Interaction, InteractionKind, SessionId, Stage};

impl Database {
    /// Append a server-generated interaction
    ///
    /// # Errors
    ///
    /// Returns an error if the session does not exist or the insert fails
    pub async fn append_interaction(
        &self,
        session_id: SessionId,
        kind: InteractionKind,
        data: &Value,
    ) -> AppResult<i64> {
        let result = sqlx::query(
            r"
            INSERT INTO interactions (session_id, interaction_type, data, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(session_id.to_string())
        .bind(kind.as_str())
        .bind(data.to_string())
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to log interaction: {e}")))?;

        Ok(result.last_insert_rowid())
    }

    /// Append a client-reported interaction unless the session is unknown or completed
    ///
    /// Returns `None` when nothing was written.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn append_client_interaction(
        &self,
        session_id: SessionId,
        interaction_type: &str,
        data: &Value,
    ) -> AppResult<Option<i64>> {
        let result = sqlx::query(
            r"
            INSERT INTO interactions (session_id, interaction_type, data, created_at)
            SELECT $1, $2, $3, $4
            WHERE EXISTS (SELECT 1 FROM sessions WHERE id = $1 AND current_step != $5)
            ",
        )
        .bind(session_id.to_string())
        .bind(interaction_type)
        .bind(data.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(Stage::Completed.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to log interaction: {e}")))?;

        Ok((result.rows_affected() > 0).then(|| result.last_insert_rowid()))
    }

    /// Interactions of one session in insertion order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn list_interactions(&self, session_id: SessionId) -> AppResult<Vec<Interaction>> {
        let rows = sqlx::query(
            r"
            SELECT id, session_id, interaction_type, data, created_at
            FROM interactions
            WHERE session_id = $1
            ORDER BY id ASC
            ",
        )
        .bind(session_id.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list interactions: {e}")))?;

        rows.iter().map(row_to_interaction).collect()
    }

    /// Append one side of a chat exchange while the session is chatting
    ///
    /// The row is written only when the session is at the chat stage and the
    /// log holds exactly `exchange - 1` earlier messages of the same role, so
    /// a replayed or concurrent turn and a turn after the chat ended write
    /// nothing. Returns `None` in those cases.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails
    pub async fn append_chat_message(
        &self,
        session_id: SessionId,
        role: &str,
        exchange: u32,
        data: &Value,
    ) -> AppResult<Option<i64>> {
        let result = sqlx::query(
            r"
            INSERT INTO interactions (session_id, interaction_type, data, created_at)
            SELECT $1, $2, $3, $4
            WHERE EXISTS (SELECT 1 FROM sessions WHERE id = $1 AND current_step = $5)
              AND (
                SELECT COUNT(*) FROM interactions
                WHERE session_id = $1
                  AND interaction_type = $2
                  AND json_extract(data, '$.role') = $6
              ) = $7
            ",
        )
        .bind(session_id.to_string())
        .bind(InteractionKind::ChatMessage.as_str())
        .bind(data.to_string())
        .bind(Utc::now().to_rfc3339())
        .bind(Stage::Chat.as_str())
        .bind(role)
        .bind(i64::from(exchange.saturating_sub(1)))
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to log chat message: {e}")))?;

        Ok((result.rows_affected() > 0).then(|| result.last_insert_rowid()))
    }

    /// Number of logged chat messages of one role (`user` or `assistant`)
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails
    pub async fn count_chat_messages(&self, session_id: SessionId, role: &str) -> AppResult<i64> {
        sqlx::query_scalar(
            r"
            SELECT COUNT(*) FROM interactions
            WHERE session_id = $1
              AND interaction_type = $2
              AND json_extract(data, '$.role') = $3
            ",
        )
        .bind(session_id.to_string())
        .bind(InteractionKind::ChatMessage.as_str())
        .bind(role)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to count chat messages: {e}")))
    }
}

fn row_to_interaction(row: &SqliteRow) -> AppResult<Interaction> {
    let session_id: String = row.get("session_id");
    let data: String = row.get("data");
    let created_at: String = row.get("created_at");

    Ok(Interaction {
        id: row.get("id"),
        session_id: session_id
            .parse()
            .map_err(|e: AppError| AppError::database(format!("Corrupt session id: {e}")))?,
        interaction_type: row.get("interaction_type"),
        data: serde_json::from_str(&data)
            .map_err(|e| AppError::database(format!("Corrupt interaction payload: {e}")))?,
        created_at: parse_timestamp("created_at", &created_at)?,
    })
}
