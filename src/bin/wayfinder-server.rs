// ABOUTME: Wayfinder HTTP server binary with environment configuration and CLI overrides
// ABOUTME: Initializes logging, opens the database, and serves until a shutdown signal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Wayfinder Server Binary
//!
//! Starts the survey backend. Settings come from the environment; the flags
//! below override individual values.

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing::info;
use wayfinder::config::{DatabaseUrl, ServerConfig};
use wayfinder::logging;
use wayfinder::resources::ServerResources;
use wayfinder::server::WayfinderServer;

#[derive(Parser)]
#[command(name = "wayfinder-server")]
#[command(about = "Wayfinder - research survey backend")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,

    /// Override bind address
    #[arg(long)]
    host: Option<String>,

    /// Override database URL (`sqlite:path` or `sqlite::memory:`)
    #[arg(long)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }
    if let Some(host) = args.host {
        config.host = host;
    }
    if let Some(url) = args.database_url.as_deref() {
        config.database_url = DatabaseUrl::parse_url(url)?;
    }

    logging::init_from_env()?;
    info!("Starting Wayfinder server");
    info!("{}", config.summary());

    let resources = ServerResources::from_config(config).await?;
    WayfinderServer::new(Arc::new(resources)).run().await
}
