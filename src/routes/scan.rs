// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scan handler.

use crate::config::InvocationSettings;
use crate::error::Result;
use crate::models::ScanReport;
use crate::services::DirectoryScanner;
use crate::AppState;
use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

/// Run a full directory scan and return the report.
///
/// Settings are resolved once from config and headers, then passed down.
pub async fn run_scan(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<ScanReport>> {
    let settings = InvocationSettings::resolve(&state.config, &headers);
    tracing::info!(
        endpoint = %settings.endpoint,
        project = %settings.project_id,
        api_key_set = !settings.api_key.is_empty(),
        "Starting token scan"
    );

    let client = state.directory.connect(&settings)?;
    let report = DirectoryScanner::new(client, &state.config)
        .with_refresher(state.refresher.clone())
        .scan()
        .await?;

    Ok(Json(report))
}
