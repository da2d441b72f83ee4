// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Identity directory abstraction.
//!
//! The scanner only talks to these traits, so it can run against the real
//! Appwrite API or an in-memory directory in tests.

use crate::config::InvocationSettings;
use crate::error::DirectoryError;
use crate::models::{IdentityList, SessionList, UserList};
use async_trait::async_trait;
use std::sync::Arc;

/// Read-only view of a user directory.
///
/// Each call returns a single, complete page; no pagination is attempted.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// List all users.
    async fn list_users(&self) -> Result<UserList, DirectoryError>;

    /// List the identities linked to one user.
    async fn list_identities(&self, user_id: &str) -> Result<IdentityList, DirectoryError>;

    /// List a user's active sessions.
    async fn list_sessions(&self, user_id: &str) -> Result<SessionList, DirectoryError>;
}

/// Builds a directory client for one invocation.
pub trait DirectoryConnector: Send + Sync {
    fn connect(
        &self,
        settings: &InvocationSettings,
    ) -> Result<Arc<dyn DirectoryClient>, DirectoryError>;
}
