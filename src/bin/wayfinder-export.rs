// ABOUTME: Research data export tool writing every session with its interaction log as JSON lines
// ABOUTME: Opens the server's SQLite database read-only; never creates or migrates it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Wayfinder Export Binary
//!
//! Each output line is `{"session": ..., "interactions": [...]}` for one
//! session, in creation order.

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::info;
use wayfinder::config::{DatabaseUrl, ServerConfig};
use wayfinder::database::Database;
use wayfinder::logging::LoggingConfig;

#[derive(Parser)]
#[command(name = "wayfinder-export")]
#[command(about = "Export Wayfinder sessions and interactions as JSON lines")]
pub struct Args {
    /// Database URL; defaults to `DATABASE_URL` or the server default
    #[arg(long)]
    database_url: Option<String>,

    /// Output file; stdout when omitted
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    // Logs go to stderr so stdout carries only export lines
    tracing_subscriber::fmt()
        .with_env_filter(LoggingConfig::from_env().env_filter())
        .with_writer(io::stderr)
        .init();

    let url = match args.database_url.as_deref() {
        Some(url) => DatabaseUrl::parse_url(url)?,
        None => ServerConfig::from_env()?.database_url,
    };
    let database = Database::open_read_only(&url).await?;

    let mut lines = Vec::new();
    for session in database.list_sessions().await? {
        let interactions = database.list_interactions(session.id).await?;
        let line = json!({ "session": session, "interactions": interactions });
        lines.push(serde_json::to_string(&line)?);
    }

    match args.output {
        Some(path) => {
            let mut file = File::create(&path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?;
            for line in &lines {
                file.write_all(line.as_bytes()).await?;
                file.write_all(b"\n").await?;
            }
            file.flush().await?;
            info!(sessions = lines.len(), path = %path.display(), "Export written");
        }
        None => {
            let mut out = BufWriter::new(io::stdout().lock());
            for line in &lines {
                writeln!(out, "{line}")?;
            }
            out.flush()?;
            info!(sessions = lines.len(), "Export written to stdout");
        }
    }
    Ok(())
}
