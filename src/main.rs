// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! WHOOP Tools Server
//!
//! Exposes the overview, sleep, recovery, strain and healthspan tools over
//! HTTP for an AI agent, backed by one WHOOP account.

use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use whoop_tools::{config::Config, services::WhoopTools, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize structured JSON logging
    init_logging()?;

    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        port = config.port,
        timezone = %config.timezone,
        auth_required = config.mcp_auth_token.is_some(),
        "Starting WHOOP tools server"
    );

    // Session is established lazily on the first tool call
    let tools = WhoopTools::from_config(&config).context("Failed to build HTTP client")?;

    let state = Arc::new(AppState {
        config: config.clone(),
        tools,
    });

    let app = whoop_tools::routes::create_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
fn init_logging() -> anyhow::Result<()> {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("whoop_tools=debug".parse()?)
                .add_directive("info".parse()?),
        )
        .with(format)
        .init();
    Ok(())
}
