// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Directory scan: users → identities → expiry verdicts.
//!
//! Calls are strictly sequential. A failure listing users aborts the scan;
//! a failure for one user or identity is counted in `errors` and the scan
//! moves on.

use crate::config::Config;
use crate::error::DirectoryError;
use crate::models::{DirectoryUser, Identity, RefreshCandidate, ScanReport};
use crate::services::directory::DirectoryClient;
use crate::services::expiry::{ExpiryCheck, ExpiryEvaluator, TokenMaterial};
use crate::services::refresh::TokenRefresher;
use crate::time_utils::format_utc_rfc3339;
use chrono::{DateTime, Utc};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

/// Characters of an access token that may appear in debug logs.
const TOKEN_PREVIEW_CHARS: usize = 10;

/// Walks the directory and reports identities that need a token refresh.
pub struct DirectoryScanner {
    client: Arc<dyn DirectoryClient>,
    providers: HashSet<String>,
    evaluator: ExpiryEvaluator,
    refresher: Option<Arc<dyn TokenRefresher>>,
}

impl DirectoryScanner {
    /// Create a scanner using the provider set and expiry policy from `config`.
    pub fn new(client: Arc<dyn DirectoryClient>, config: &Config) -> Self {
        Self {
            client,
            providers: config.refresh_providers.iter().cloned().collect(),
            evaluator: ExpiryEvaluator::new(
                config.expiry_threshold,
                config.missing_expiry_policy,
            ),
            refresher: None,
        }
    }

    /// Install a refresh hook for flagged identities.
    pub fn with_refresher(mut self, refresher: Option<Arc<dyn TokenRefresher>>) -> Self {
        self.refresher = refresher;
        self
    }

    /// Scan the directory as of now.
    pub async fn scan(&self) -> Result<ScanReport, DirectoryError> {
        self.scan_at(Utc::now()).await
    }

    /// Scan the directory, judging expiry against `now`.
    pub async fn scan_at(&self, now: DateTime<Utc>) -> Result<ScanReport, DirectoryError> {
        let started = Instant::now();
        tracing::info!(at = %format_utc_rfc3339(now), "Token scan started");

        let users = self.client.list_users().await?;
        tracing::info!(total = users.total, "Fetched user list");

        let mut report = ScanReport::default();

        for user in &users.users {
            tracing::debug!(
                user_id = %user.id,
                name = user.display_name(),
                "Processing user"
            );

            let identities = match self.client.list_identities(&user.id).await {
                Ok(list) => list,
                Err(e) => {
                    tracing::error!(
                        user_id = %user.id,
                        error = %e,
                        "Error fetching identities for user"
                    );
                    report.record_error();
                    continue;
                }
            };

            tracing::debug!(
                user_id = %user.id,
                total = identities.total,
                "Fetched identities"
            );

            for identity in &identities.identities {
                if !self.providers.contains(&identity.provider) {
                    tracing::debug!(
                        identity_id = %identity.id,
                        provider = %identity.provider,
                        "Skipping identity from untracked provider"
                    );
                    continue;
                }

                if let Err(e) = self
                    .process_identity(user, identity, now, &mut report)
                    .await
                {
                    tracing::error!(
                        user_id = %user.id,
                        identity_id = %identity.id,
                        error = %e,
                        "Error processing identity"
                    );
                    report.record_error();
                }
            }
        }

        tracing::info!(
            checked = report.checked(),
            needs_refresh = report.needs_refresh(),
            errors = report.errors(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Token scan completed"
        );

        Ok(report)
    }

    /// Evaluate one identity and record the verdict.
    async fn process_identity(
        &self,
        user: &DirectoryUser,
        identity: &Identity,
        now: DateTime<Utc>,
        report: &mut ScanReport,
    ) -> Result<(), DirectoryError> {
        let Some(access_token) = identity.access_token() else {
            tracing::warn!(
                user_id = %user.id,
                identity_id = %identity.id,
                "No access token found for identity"
            );
            return Ok(());
        };

        tracing::debug!(
            identity_id = %identity.id,
            token_preview = %token_preview(access_token),
            "Checking token expiry"
        );

        let check = self.evaluator.check(
            TokenMaterial {
                access_token: Some(access_token),
                expiry: identity.access_token_expiry(),
            },
            now,
        );

        if !self.evaluator.needs_refresh(&check) {
            tracing::debug!(
                identity_id = %identity.id,
                expires_at = ?check.expires_at(),
                "Token valid"
            );
            report.record_valid();
            return Ok(());
        }

        match &check {
            ExpiryCheck::Malformed(e) => tracing::warn!(
                identity_id = %identity.id,
                reason = %e,
                "Unreadable token expiry, assuming refresh needed"
            ),
            ExpiryCheck::Unknown => tracing::info!(
                identity_id = %identity.id,
                "No expiry information, assuming refresh needed"
            ),
            _ => {}
        }

        let expiry_date = identity
            .access_token_expiry()
            .map(str::to_string)
            .or_else(|| check.expires_at().map(format_utc_rfc3339));

        tracing::info!(
            user_id = %user.id,
            identity_id = %identity.id,
            provider = %identity.provider,
            expiry = expiry_date.as_deref().unwrap_or("unknown"),
            "Token needs refresh"
        );

        report.record_refresh(RefreshCandidate::new(
            &user.id,
            &identity.id,
            &identity.provider,
            expiry_date,
        ));

        let sessions = self.client.list_sessions(&user.id).await?;
        tracing::debug!(
            user_id = %user.id,
            sessions = sessions.sessions.len(),
            providers = ?sessions.sessions.iter().map(|s| s.provider.as_str()).collect::<Vec<_>>(),
            "User sessions"
        );

        if let Some(refresher) = &self.refresher {
            self.attempt_refresh(refresher.as_ref(), user, identity).await;
        }

        Ok(())
    }

    /// Hand a flagged identity to the installed refresher. Outcome is logged only.
    async fn attempt_refresh(
        &self,
        refresher: &dyn TokenRefresher,
        user: &DirectoryUser,
        identity: &Identity,
    ) {
        let Some(refresh_token) = identity.refresh_token() else {
            tracing::warn!(
                identity_id = %identity.id,
                "No refresh token stored, cannot refresh"
            );
            return;
        };

        match refresher
            .refresh(&user.id, &identity.id, refresh_token)
            .await
        {
            Ok(token) => tracing::info!(
                user_id = %user.id,
                identity_id = %identity.id,
                expires_at = ?token.expires_at,
                "Token refreshed"
            ),
            Err(e) => tracing::warn!(
                user_id = %user.id,
                identity_id = %identity.id,
                error = %e,
                "Token refresh failed"
            ),
        }
    }
}

/// First few characters of a token, for logs.
fn token_preview(token: &str) -> String {
    let prefix: String = token.chars().take(TOKEN_PREVIEW_CHARS).collect();
    format!("{prefix}...")
}
