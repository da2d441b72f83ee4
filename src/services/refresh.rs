// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Token refresh hook.
//!
//! No refresher ships with this crate. A deployment that wants flagged
//! identities refreshed installs one in `AppState::refresher`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// New credentials returned by a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshedToken {
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum RefreshError {
    #[error("Provider rejected refresh: {0}")]
    Rejected(String),

    #[error("Refresh request failed: {0}")]
    Request(String),
}

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(
        &self,
        user_id: &str,
        identity_id: &str,
        refresh_token: &str,
    ) -> Result<RefreshedToken, RefreshError>;
}
