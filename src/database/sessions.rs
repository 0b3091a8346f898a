// ABOUTME: Session table operations with stage-guarded conditional updates
// ABOUTME: Each stage write names its column set and succeeds only at the expected stage
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{parse_timestamp, Database};
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use wayfinder_core::constants::ratings::{POST_SURVEY_ITEMS, PRE_SURVEY_ITEMS};
use wayfinder_core::errors::{AppError, AppResult};
use wayfinder_core::models::{
    AffectItem, AffectRatings, InteractionKind, LandscapeAssessment, LandscapePhase, PostSurvey,
    PreSurvey, Session, SessionId, Stage,
};

/// Outcome of a stage-guarded session write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardedWrite {
    /// Row updated and stage advanced
    Applied,
    /// No session with this id
    NotFound,
    /// Session exists but sits at another stage
    WrongStage(Stage),
}

/// A typed value bound to one `SET` assignment
enum ColumnValue {
    Int(Option<i64>),
    Text(Option<String>),
}

impl From<u8> for ColumnValue {
    fn from(value: u8) -> Self {
        Self::Int(Some(i64::from(value)))
    }
}

impl From<Option<u8>> for ColumnValue {
    fn from(value: Option<u8>) -> Self {
        Self::Int(value.map(i64::from))
    }
}

impl From<&str> for ColumnValue {
    fn from(value: &str) -> Self {
        Self::Text(Some(value.to_owned()))
    }
}

impl From<Option<&str>> for ColumnValue {
    fn from(value: Option<&str>) -> Self {
        Self::Text(value.map(ToOwned::to_owned))
    }
}

type Assignments = Vec<(String, ColumnValue)>;

fn affect_assignments(assignments: &mut Assignments, prefix: &str, affect: &AffectRatings) {
    for (item, value) in affect.iter() {
        assignments.push((format!("{prefix}{}", item.as_str()), value.into()));
    }
}

impl Database {
    /// Insert a freshly started session together with its `session_started` entry
    ///
    /// Both rows are written in one transaction, so a failed start leaves
    /// neither behind.
    ///
    /// # Errors
    ///
    /// Returns an error if either insert or the commit fails
    pub async fn create_session(&self, session: &Session) -> AppResult<()> {
        let failed = |e: sqlx::Error| AppError::database(format!("Failed to create session: {e}"));

        let mut tx = self.pool.begin().await.map_err(failed)?;
        sqlx::query(
            r"
            INSERT INTO sessions (id, current_step, created_at, updated_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(session.id.to_string())
        .bind(session.current_step.as_str())
        .bind(session.created_at.to_rfc3339())
        .bind(session.updated_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(failed)?;

        sqlx::query(
            r"
            INSERT INTO interactions (session_id, interaction_type, data, created_at)
            VALUES ($1, $2, '{}', $3)
            ",
        )
        .bind(session.id.to_string())
        .bind(InteractionKind::SessionStarted.as_str())
        .bind(session.created_at.to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(failed)?;

        tx.commit().await.map_err(failed)
    }

    /// Read a session record
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the stored row is malformed
    pub async fn get_session(&self, id: SessionId) -> AppResult<Option<Session>> {
        let row = sqlx::query("SELECT * FROM sessions WHERE id = $1")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to get session: {e}")))?;

        row.as_ref().map(row_to_session).transpose()
    }

    /// Every session in creation order
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored row is malformed
    pub async fn list_sessions(&self) -> AppResult<Vec<Session>> {
        let rows = sqlx::query("SELECT * FROM sessions ORDER BY created_at ASC, id ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Failed to list sessions: {e}")))?;

        rows.iter().map(row_to_session).collect()
    }

    /// Current stage marker of a session
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or the marker is unknown
    pub async fn current_stage(&self, id: SessionId) -> AppResult<Option<Stage>> {
        let marker: Option<String> =
            sqlx::query_scalar("SELECT current_step FROM sessions WHERE id = $1")
                .bind(id.to_string())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| AppError::database(format!("Failed to read session stage: {e}")))?;

        marker.map(|m| m.parse()).transpose()
    }

    /// Store the situation text (situation to `pre_survey`)
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_situation(&self, id: SessionId, text: &str) -> AppResult<GuardedWrite> {
        let assignments = vec![("situation_description".to_owned(), text.into())];
        self.guarded_update(id, Stage::Situation, Stage::PreSurvey, assignments)
            .await
    }

    /// Store the baseline survey (`pre_survey` to `pre_landscape`)
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_pre_survey(
        &self,
        id: SessionId,
        survey: &PreSurvey,
    ) -> AppResult<GuardedWrite> {
        let mut assignments: Assignments = survey
            .items
            .iter()
            .enumerate()
            .map(|(index, value)| (format!("pre_item_{}", index + 1), (*value).into()))
            .collect();
        affect_assignments(&mut assignments, "pre_affect_", &survey.affect);

        self.guarded_update(id, Stage::PreSurvey, Stage::PreLandscape, assignments)
            .await
    }

    /// Store a landscape self-report under the phase's column set
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_landscape(
        &self,
        id: SessionId,
        phase: LandscapePhase,
        landscape: &LandscapeAssessment,
    ) -> AppResult<GuardedWrite> {
        let prefix = phase.column_prefix();
        let assignments: Assignments = vec![
            (
                format!("{prefix}generated_start_phrase"),
                landscape.generated_start_phrase.as_str().into(),
            ),
            (
                format!("{prefix}generated_end_phrase"),
                landscape.generated_end_phrase.as_str().into(),
            ),
            (
                format!("{prefix}edited_start_phrase"),
                landscape.edited_start_phrase.as_deref().into(),
            ),
            (
                format!("{prefix}edited_end_phrase"),
                landscape.edited_end_phrase.as_deref().into(),
            ),
            (
                format!("{prefix}journey_progress"),
                landscape.journey_progress.into(),
            ),
            (
                format!("{prefix}willingness_to_continue"),
                landscape.willingness_to_continue.into(),
            ),
        ];

        let from = phase.stage();
        let to = from
            .next()
            .ok_or_else(|| AppError::internal("Landscape stage has no successor"))?;
        self.guarded_update(id, from, to, assignments).await
    }

    /// Store the follow-up survey and mark the session completed
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn update_post_survey(
        &self,
        id: SessionId,
        survey: &PostSurvey,
        completed_at: DateTime<Utc>,
    ) -> AppResult<GuardedWrite> {
        let mut assignments: Assignments = survey
            .items
            .iter()
            .enumerate()
            .map(|(index, value)| (format!("post_item_{}", index + 1), (*value).into()))
            .collect();
        affect_assignments(&mut assignments, "post_affect_", &survey.affect);
        assignments.push(("open_response".to_owned(), survey.open_response.as_str().into()));
        assignments.push((
            "completed_at".to_owned(),
            completed_at.to_rfc3339().as_str().into(),
        ));

        self.guarded_update(id, Stage::PostSurvey, Stage::Completed, assignments)
            .await
    }

    /// Move the stage marker without touching any answer column
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails
    pub async fn advance_stage(
        &self,
        id: SessionId,
        from: Stage,
        to: Stage,
    ) -> AppResult<GuardedWrite> {
        self.guarded_update(id, from, to, Vec::new()).await
    }

    async fn guarded_update(
        &self,
        id: SessionId,
        from: Stage,
        to: Stage,
        assignments: Assignments,
    ) -> AppResult<GuardedWrite> {
        // Column names are fixed identifiers; every value is bound
        let mut set_clause: Vec<String> = assignments
            .iter()
            .map(|(column, _)| format!("{column} = ?"))
            .collect();
        set_clause.push("current_step = ?".to_owned());
        set_clause.push("updated_at = ?".to_owned());
        let sql = format!(
            "UPDATE sessions SET {} WHERE id = ? AND current_step = ?",
            set_clause.join(", ")
        );

        let mut query = sqlx::query(&sql);
        for (_, value) in assignments {
            query = match value {
                ColumnValue::Int(value) => query.bind(value),
                ColumnValue::Text(value) => query.bind(value),
            };
        }
        let result = query
            .bind(to.as_str())
            .bind(Utc::now().to_rfc3339())
            .bind(id.to_string())
            .bind(from.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::database(format!("Failed to update session at {from}: {e}"))
            })?;

        if result.rows_affected() > 0 {
            return Ok(GuardedWrite::Applied);
        }

        Ok(match self.current_stage(id).await? {
            None => GuardedWrite::NotFound,
            Some(stage) => GuardedWrite::WrongStage(stage),
        })
    }
}

// ============================================================================
// Row Mapping
// ============================================================================

fn row_to_session(row: &SqliteRow) -> AppResult<Session> {
    let id: String = read(row, "id")?;
    let current_step: String = read(row, "current_step")?;
    let created_at: String = read(row, "created_at")?;
    let updated_at: String = read(row, "updated_at")?;
    let completed_at: Option<String> = read(row, "completed_at")?;

    Ok(Session {
        id: id
            .parse()
            .map_err(|e: AppError| AppError::database(format!("Corrupt session id: {e}")))?,
        current_step: current_step
            .parse()
            .map_err(|e: AppError| AppError::database(format!("Corrupt stage marker: {e}")))?,
        situation_description: read(row, "situation_description")?,
        pre_survey: pre_survey(row)?,
        pre_landscape: landscape(row, LandscapePhase::Pre)?,
        post_landscape: landscape(row, LandscapePhase::Post)?,
        post_survey: post_survey(row)?,
        completed_at: completed_at
            .as_deref()
            .map(|raw| parse_timestamp("completed_at", raw))
            .transpose()?,
        created_at: parse_timestamp("created_at", &created_at)?,
        updated_at: parse_timestamp("updated_at", &updated_at)?,
    })
}

fn read<'r, T>(row: &'r SqliteRow, column: &str) -> AppResult<T>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| AppError::database(format!("Failed to read {column}: {e}")))
}

fn rating(row: &SqliteRow, column: &str) -> AppResult<Option<u8>> {
    read::<Option<i64>>(row, column)?
        .map(|value| {
            u8::try_from(value)
                .map_err(|_| AppError::database(format!("Invalid value in {column}: {value}")))
        })
        .transpose()
}

fn ratings<const N: usize>(row: &SqliteRow, prefix: &str) -> AppResult<Option<[u8; N]>> {
    let mut values = [0_u8; N];
    for (index, slot) in values.iter_mut().enumerate() {
        match rating(row, &format!("{prefix}{}", index + 1))? {
            Some(value) => *slot = value,
            None => return Ok(None),
        }
    }
    Ok(Some(values))
}

fn affect(row: &SqliteRow, prefix: &str) -> AppResult<Option<AffectRatings>> {
    let mut values = [0_u8; 10];
    for (slot, item) in values.iter_mut().zip(AffectItem::ALL) {
        match rating(row, &format!("{prefix}{}", item.as_str()))? {
            Some(value) => *slot = value,
            None => return Ok(None),
        }
    }
    AffectRatings::from_values(values)
        .map(Some)
        .map_err(|e| AppError::database(format!("Corrupt affect ratings: {}", e.message)))
}

fn pre_survey(row: &SqliteRow) -> AppResult<Option<PreSurvey>> {
    let (Some(items), Some(affect)) = (ratings::<PRE_SURVEY_ITEMS>(row, "pre_item_")?, affect(row, "pre_affect_")?)
    else {
        return Ok(None);
    };
    Ok(Some(PreSurvey { items, affect }))
}

fn post_survey(row: &SqliteRow) -> AppResult<Option<PostSurvey>> {
    let (Some(items), Some(affect), Some(open_response)) = (
        ratings::<POST_SURVEY_ITEMS>(row, "post_item_")?,
        affect(row, "post_affect_")?,
        read::<Option<String>>(row, "open_response")?,
    ) else {
        return Ok(None);
    };
    Ok(Some(PostSurvey {
        items,
        affect,
        open_response,
    }))
}

fn landscape(row: &SqliteRow, phase: LandscapePhase) -> AppResult<Option<LandscapeAssessment>> {
    let prefix = phase.column_prefix();
    let column = |name: &str| format!("{prefix}{name}");

    let (Some(generated_start_phrase), Some(generated_end_phrase), Some(journey_progress)) = (
        read::<Option<String>>(row, &column("generated_start_phrase"))?,
        read::<Option<String>>(row, &column("generated_end_phrase"))?,
        rating(row, &column("journey_progress"))?,
    ) else {
        return Ok(None);
    };

    Ok(Some(LandscapeAssessment {
        generated_start_phrase,
        generated_end_phrase,
        edited_start_phrase: read(row, &column("edited_start_phrase"))?,
        edited_end_phrase: read(row, &column("edited_end_phrase"))?,
        journey_progress,
        willingness_to_continue: rating(row, &column("willingness_to_continue"))?,
    }))
}
