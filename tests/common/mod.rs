// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use token_refresher::config::{Config, InvocationSettings};
use token_refresher::error::DirectoryError;
use token_refresher::models::{
    DirectoryUser, Identity, IdentityList, Session, SessionList, UserList,
};
use token_refresher::routes::create_router;
use token_refresher::services::{DirectoryClient, DirectoryConnector, TokenRefresher};
use token_refresher::AppState;

/// In-memory directory that records every call made against it.
#[derive(Clone, Default)]
#[allow(dead_code)]
pub struct FakeDirectory {
    users: Vec<DirectoryUser>,
    identities: HashMap<String, Vec<Identity>>,
    fail_users: Option<String>,
    fail_identities: HashSet<String>,
    fail_sessions: HashSet<String>,
    calls: Arc<AtomicUsize>,
    settings: Arc<Mutex<Option<InvocationSettings>>>,
}

#[allow(dead_code)]
impl FakeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, id: &str, identities: Vec<Identity>) -> Self {
        self.users.push(DirectoryUser {
            id: id.to_string(),
            name: format!("User {id}"),
            email: String::new(),
        });
        self.identities.insert(id.to_string(), identities);
        self
    }

    pub fn failing_users(mut self, message: &str) -> Self {
        self.fail_users = Some(message.to_string());
        self
    }

    pub fn failing_identities(mut self, user_id: &str) -> Self {
        self.fail_identities.insert(user_id.to_string());
        self
    }

    pub fn failing_sessions(mut self, user_id: &str) -> Self {
        self.fail_sessions.insert(user_id.to_string());
        self
    }

    /// Number of directory calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Settings passed to the last `connect`.
    pub fn last_settings(&self) -> Option<InvocationSettings> {
        self.settings.lock().unwrap().clone()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl DirectoryClient for FakeDirectory {
    async fn list_users(&self) -> Result<UserList, DirectoryError> {
        self.record_call();
        if let Some(message) = &self.fail_users {
            return Err(DirectoryError::Status {
                status: 401,
                message: message.clone(),
            });
        }
        Ok(UserList {
            total: self.users.len() as u64,
            users: self.users.clone(),
        })
    }

    async fn list_identities(&self, user_id: &str) -> Result<IdentityList, DirectoryError> {
        self.record_call();
        if self.fail_identities.contains(user_id) {
            return Err(DirectoryError::Status {
                status: 500,
                message: "Server Error".to_string(),
            });
        }
        let identities = self.identities.get(user_id).cloned().unwrap_or_default();
        Ok(IdentityList {
            total: identities.len() as u64,
            identities,
        })
    }

    async fn list_sessions(&self, user_id: &str) -> Result<SessionList, DirectoryError> {
        self.record_call();
        if self.fail_sessions.contains(user_id) {
            return Err(DirectoryError::Decode("bad sessions".to_string()));
        }
        Ok(SessionList {
            total: 1,
            sessions: vec![Session {
                id: format!("session-{user_id}"),
                provider: "google".to_string(),
            }],
        })
    }
}

impl DirectoryConnector for FakeDirectory {
    fn connect(
        &self,
        settings: &InvocationSettings,
    ) -> Result<Arc<dyn DirectoryClient>, DirectoryError> {
        *self.settings.lock().unwrap() = Some(settings.clone());
        Ok(Arc::new(self.clone()))
    }
}

/// Identity with a stored expiry timestamp.
#[allow(dead_code)]
pub fn identity(id: &str, user_id: &str, provider: &str, expiry: DateTime<Utc>) -> Identity {
    Identity {
        id: id.to_string(),
        user_id: user_id.to_string(),
        provider: provider.to_string(),
        provider_access_token: format!("ya29.token-{id}"),
        provider_access_token_expiry: expiry.to_rfc3339(),
        ..Identity::default()
    }
}

/// Create a test app backed by `directory`.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app(directory: FakeDirectory) -> (axum::Router, Arc<AppState>) {
    create_test_app_with(directory, Config::test_default(), None)
}

#[allow(dead_code)]
pub fn create_test_app_with(
    directory: FakeDirectory,
    config: Config,
    refresher: Option<Arc<dyn TokenRefresher>>,
) -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState {
        config,
        directory: Arc::new(directory),
        refresher,
    });

    (create_router(state.clone()), state)
}
