// ABOUTME: SQLite persistence gateway for sessions and interaction logs
// ABOUTME: Opens the connection pool, applies migrations, and exposes stage-guarded writes
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Database Management
//!
//! All statements are single, auto-committed, and fully parameterized. Session
//! writes are conditional on the stage marker so that exactly one of two
//! concurrent submissions of the same stage succeeds.

mod interactions;
mod migrations;
mod sessions;

pub use migrations::{applied_migrations, AppliedMigration, MIGRATIONS};
pub use sessions::GuardedWrite;

use crate::config::DatabaseUrl;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use tokio::fs;
use tracing::info;
use wayfinder_core::errors::{AppError, AppResult};

/// Connection pool handle; cheap to clone
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Open (creating if missing) the database and apply pending migrations
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or a migration fails
    pub async fn new(url: &DatabaseUrl) -> AppResult<Self> {
        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL {url}: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = match url {
            DatabaseUrl::Memory => {
                // Every connection to :memory: is a separate database
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
            }
            DatabaseUrl::SQLite { path } => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).await.map_err(|e| {
                        AppError::database(format!(
                            "Failed to create database directory {}: {e}",
                            parent.display()
                        ))
                    })?;
                }
                SqlitePoolOptions::new().connect_with(options).await
            }
        }
        .map_err(|e| AppError::database(format!("Failed to open database {url}: {e}")))?;

        let db = Self { pool };
        db.migrate().await?;
        info!(database = %url, "Database ready");
        Ok(db)
    }

    /// Open an existing, fully migrated database without write access
    ///
    /// Nothing is created and no migration runs.
    ///
    /// # Errors
    ///
    /// Returns an error for an in-memory URL, a missing file, or a schema that
    /// is behind the server's migrations
    pub async fn open_read_only(url: &DatabaseUrl) -> AppResult<Self> {
        if url.is_memory() {
            return Err(AppError::config(
                "An in-memory database cannot be opened read-only",
            ));
        }
        let options = SqliteConnectOptions::from_str(&url.to_connection_string())
            .map_err(|e| AppError::config(format!("Invalid database URL {url}: {e}")))?
            .create_if_missing(false)
            .read_only(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database {url}: {e}")))?;

        let applied = applied_migrations(&pool).await?.len();
        if applied < MIGRATIONS.len() {
            return Err(AppError::database(format!(
                "Database {url} has {applied} of {} migrations applied; start the server once to migrate",
                MIGRATIONS.len()
            )));
        }
        Ok(Self { pool })
    }

    /// Get a reference to the database pool for advanced operations
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Apply every pending migration in order
    ///
    /// # Errors
    ///
    /// Returns an error if any migration fails; the failing migration is rolled back
    pub async fn migrate(&self) -> AppResult<()> {
        migrations::run(&self.pool).await
    }

    /// Liveness probe for readiness checks
    ///
    /// # Errors
    ///
    /// Returns an error if the database does not answer
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::database(format!("Database ping failed: {e}")))?;
        Ok(())
    }
}

fn parse_timestamp(column: &str, raw: &str) -> AppResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| AppError::database(format!("Invalid timestamp in {column}: {e}")))
}
