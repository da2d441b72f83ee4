// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! HTTP route handlers.

pub mod scan;

use crate::AppState;
use axum::{routing::any, Router};
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

/// Liveness probe. Makes no external calls.
async fn ping() -> &'static str {
    tracing::debug!("Ping request received, responding with Pong");
    "Pong"
}

/// Build the complete router.
///
/// `/ping` answers directly; every other path runs a directory scan.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ping", any(ping))
        .fallback(scan::run_scan)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state)
}
