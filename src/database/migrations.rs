// ABOUTME: Ordered, versioned schema migrations recorded in the _migrations table
// ABOUTME: Each pending migration runs in its own transaction; any failure aborts startup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Database Migrations
//!
//! Handles schema creation and versioned migrations.

use chrono::Utc;
use serde::Serialize;
use sqlx::{Row, SqlitePool};
use tracing::info;
use wayfinder_core::errors::{AppError, AppResult};

/// One schema change
pub struct Migration {
    /// Monotonic version, starting at 1
    pub version: i64,
    /// Short name recorded alongside the version
    pub name: &'static str,
    /// Statements applied in order inside one transaction
    pub statements: &'static [&'static str],
}

/// Every migration in application order
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "initial_schema",
        statements: &[
            r"
            CREATE TABLE IF NOT EXISTS sessions (
                id TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                situation_description TEXT,
                current_step TEXT NOT NULL DEFAULT 'landing',
                pre_item_1 INTEGER,
                pre_item_2 INTEGER,
                pre_item_3 INTEGER
            )
            ",
            r"
            CREATE TABLE IF NOT EXISTS interactions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_id TEXT NOT NULL REFERENCES sessions(id) ON DELETE CASCADE,
                interaction_type TEXT NOT NULL,
                data TEXT NOT NULL DEFAULT '{}',
                created_at TEXT NOT NULL
            )
            ",
            "CREATE INDEX IF NOT EXISTS idx_interactions_session ON interactions(session_id, id)",
        ],
    },
    Migration {
        version: 2,
        name: "pre_affect_ratings",
        statements: &[
            "ALTER TABLE sessions ADD COLUMN pre_affect_active INTEGER",
            "ALTER TABLE sessions ADD COLUMN pre_affect_alert INTEGER",
            "ALTER TABLE sessions ADD COLUMN pre_affect_attentive INTEGER",
            "ALTER TABLE sessions ADD COLUMN pre_affect_determined INTEGER",
            "ALTER TABLE sessions ADD COLUMN pre_affect_inspired INTEGER",
            "ALTER TABLE sessions ADD COLUMN pre_affect_afraid INTEGER",
            "ALTER TABLE sessions ADD COLUMN pre_affect_ashamed INTEGER",
            "ALTER TABLE sessions ADD COLUMN pre_affect_hostile INTEGER",
            "ALTER TABLE sessions ADD COLUMN pre_affect_nervous INTEGER",
            "ALTER TABLE sessions ADD COLUMN pre_affect_upset INTEGER",
        ],
    },
    Migration {
        version: 3,
        name: "landscape_assessments",
        statements: &[
            "ALTER TABLE sessions ADD COLUMN pre_generated_start_phrase TEXT",
            "ALTER TABLE sessions ADD COLUMN pre_generated_end_phrase TEXT",
            "ALTER TABLE sessions ADD COLUMN pre_edited_start_phrase TEXT",
            "ALTER TABLE sessions ADD COLUMN pre_edited_end_phrase TEXT",
            "ALTER TABLE sessions ADD COLUMN pre_journey_progress INTEGER",
            "ALTER TABLE sessions ADD COLUMN pre_willingness_to_continue INTEGER",
            "ALTER TABLE sessions ADD COLUMN generated_start_phrase TEXT",
            "ALTER TABLE sessions ADD COLUMN generated_end_phrase TEXT",
            "ALTER TABLE sessions ADD COLUMN edited_start_phrase TEXT",
            "ALTER TABLE sessions ADD COLUMN edited_end_phrase TEXT",
            "ALTER TABLE sessions ADD COLUMN journey_progress INTEGER",
            "ALTER TABLE sessions ADD COLUMN willingness_to_continue INTEGER",
        ],
    },
    Migration {
        version: 4,
        name: "post_survey",
        statements: &[
            "ALTER TABLE sessions ADD COLUMN post_item_1 INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_item_2 INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_item_3 INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_item_4 INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_item_5 INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_item_6 INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_affect_active INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_affect_alert INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_affect_attentive INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_affect_determined INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_affect_inspired INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_affect_afraid INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_affect_ashamed INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_affect_hostile INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_affect_nervous INTEGER",
            "ALTER TABLE sessions ADD COLUMN post_affect_upset INTEGER",
            "ALTER TABLE sessions ADD COLUMN open_response TEXT",
            "ALTER TABLE sessions ADD COLUMN completed_at TEXT",
        ],
    },
];

/// A migration already recorded as applied
#[derive(Debug, Clone, Serialize)]
pub struct AppliedMigration {
    /// Version number
    pub version: i64,
    /// Recorded name
    pub name: String,
    /// When it was applied (RFC 3339)
    pub applied_at: String,
}

/// Run all pending migrations
pub(super) async fn run(pool: &SqlitePool) -> AppResult<()> {
    sqlx::query(
        r"
        CREATE TABLE IF NOT EXISTS _migrations (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await
    .map_err(|e| AppError::database(format!("Failed to create migrations table: {e}")))?;

    let current_version = current_version(pool).await?;
    let target_version = MIGRATIONS.last().map_or(0, |m| m.version);
    info!(current_version, target_version, "Checking database migrations");

    for migration in MIGRATIONS.iter().filter(|m| m.version > current_version) {
        apply(pool, migration).await?;
    }

    Ok(())
}

async fn current_version(pool: &SqlitePool) -> AppResult<i64> {
    let row = sqlx::query("SELECT COALESCE(MAX(version), 0) AS version FROM _migrations")
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to read schema version: {e}")))?;

    Ok(row.get("version"))
}

async fn apply(pool: &SqlitePool, migration: &Migration) -> AppResult<()> {
    let failed = |e: sqlx::Error| {
        AppError::database(format!(
            "Migration v{} ({}) failed: {e}",
            migration.version, migration.name
        ))
    };

    let mut tx = pool.begin().await.map_err(failed)?;
    for statement in migration.statements {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(failed)?;
    }
    sqlx::query("INSERT INTO _migrations (version, name, applied_at) VALUES ($1, $2, $3)")
        .bind(migration.version)
        .bind(migration.name)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await
        .map_err(failed)?;
    tx.commit().await.map_err(failed)?;

    info!(
        version = migration.version,
        name = migration.name,
        "Applied database migration"
    );
    Ok(())
}

/// List applied migrations in version order
///
/// # Errors
///
/// Returns an error if the migrations table cannot be read
pub async fn applied_migrations(pool: &SqlitePool) -> AppResult<Vec<AppliedMigration>> {
    let rows = sqlx::query("SELECT version, name, applied_at FROM _migrations ORDER BY version")
        .fetch_all(pool)
        .await
        .map_err(|e| AppError::database(format!("Failed to list migrations: {e}")))?;

    Ok(rows
        .iter()
        .map(|row| AppliedMigration {
            version: row.get("version"),
            name: row.get("name"),
            applied_at: row.get("applied_at"),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_versions_are_contiguous() {
        for (index, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version, i64::try_from(index + 1).unwrap());
            assert!(!migration.statements.is_empty());
        }
    }
}
