// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token-Refresher Function Server
//!
//! Scans the Appwrite user directory on each invocation and reports OAuth
//! identities whose access tokens are close to expiry.

use anyhow::Context;
use std::sync::Arc;
use token_refresher::{config::Config, services::AppwriteConnector, AppState};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment
    let config = Config::from_env().context("Failed to load configuration")?;

    // Initialize structured JSON logging
    init_logging(&config.log_level);
    tracing::info!(
        port = config.port,
        providers = ?config.refresh_providers,
        missing_expiry_policy = ?config.missing_expiry_policy,
        "Starting Token-Refresher"
    );

    let directory = AppwriteConnector::new(config.http_timeout)
        .context("Failed to build Appwrite HTTP client")?;

    // Build shared state
    let state = Arc::new(AppState {
        config: config.clone(),
        directory: Arc::new(directory),
        refresher: None,
    });

    // Build router
    let app = token_refresher::routes::create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(address = %addr, "Server listening");

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize structured JSON logging.
///
/// `RUST_LOG` overrides `LOG_LEVEL` when set.
fn init_logging(level: &str) {
    let format = tracing_subscriber::fmt::layer()
        .json()
        .with_target(false)
        .with_current_span(true)
        .flatten_event(true);

    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("token_refresher={level},info"))
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(format)
        .init();
}
