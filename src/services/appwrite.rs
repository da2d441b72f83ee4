// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Appwrite Users API client.
//!
//! Handles:
//! - User listing
//! - Identity listing filtered by user
//! - Session listing
//!
//! Every request carries the project and API key headers. There is no retry
//! and no pagination; each call returns the first page Appwrite hands back.

use crate::config::InvocationSettings;
use crate::error::DirectoryError;
use crate::models::{IdentityList, SessionList, UserList};
use crate::services::directory::{DirectoryClient, DirectoryConnector};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const PROJECT_HEADER: &str = "X-Appwrite-Project";
const KEY_HEADER: &str = "X-Appwrite-Key";

/// Appwrite API client bound to one project and key.
#[derive(Clone)]
pub struct AppwriteClient {
    http: reqwest::Client,
    endpoint: String,
    project_id: String,
    api_key: String,
}

impl AppwriteClient {
    /// Create a client for the given invocation settings.
    pub fn new(http: reqwest::Client, settings: &InvocationSettings) -> Self {
        Self {
            http,
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            project_id: settings.project_id.clone(),
            api_key: settings.api_key.clone(),
        }
    }

    /// Generic GET request with JSON response.
    async fn get_json<T: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, DirectoryError> {
        let url = format!("{}{}", self.endpoint, path);
        tracing::debug!(url = %url, "Appwrite request");

        let response = self
            .http
            .get(&url)
            .header(PROJECT_HEADER, &self.project_id)
            .header(KEY_HEADER, &self.api_key)
            .query(query)
            .send()
            .await?;

        self.check_response_json(response).await
    }

    /// Check response and parse JSON body.
    async fn check_response_json<T: for<'de> Deserialize<'de>>(
        &self,
        response: reqwest::Response,
    ) -> Result<T, DirectoryError> {
        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            // Appwrite errors look like {"message": "...", "code": 401, "type": "..."}
            let message = serde_json::from_str::<AppwriteErrorBody>(&body)
                .map(|e| e.message)
                .unwrap_or(body);

            return Err(DirectoryError::Status {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json()
            .await
            .map_err(|e| DirectoryError::Decode(e.to_string()))
    }
}

#[async_trait]
impl DirectoryClient for AppwriteClient {
    async fn list_users(&self) -> Result<UserList, DirectoryError> {
        self.get_json("/users", &[]).await
    }

    async fn list_identities(&self, user_id: &str) -> Result<IdentityList, DirectoryError> {
        let query = equal_query("userId", user_id);
        self.get_json("/users/identities", &[("queries[]", query)])
            .await
    }

    async fn list_sessions(&self, user_id: &str) -> Result<SessionList, DirectoryError> {
        let path = format!("/users/{}/sessions", urlencoding::encode(user_id));
        self.get_json(&path, &[]).await
    }
}

/// Appwrite JSON query matching `attribute` against a single value.
fn equal_query(attribute: &str, value: &str) -> String {
    serde_json::json!({
        "method": "equal",
        "attribute": attribute,
        "values": [value],
    })
    .to_string()
}

#[derive(Debug, Deserialize)]
struct AppwriteErrorBody {
    message: String,
}

/// Creates `AppwriteClient`s that share one HTTP connection pool.
#[derive(Clone)]
pub struct AppwriteConnector {
    http: reqwest::Client,
}

impl AppwriteConnector {
    pub fn new(timeout: Duration) -> Result<Self, DirectoryError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { http })
    }
}

impl DirectoryConnector for AppwriteConnector {
    fn connect(
        &self,
        settings: &InvocationSettings,
    ) -> Result<Arc<dyn DirectoryClient>, DirectoryError> {
        if settings.endpoint.trim().is_empty() {
            return Err(DirectoryError::Settings("endpoint is empty".to_string()));
        }
        Ok(Arc::new(AppwriteClient::new(self.http.clone(), settings)))
    }
}
