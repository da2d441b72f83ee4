// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Token-Refresher: find OAuth identities whose access tokens are about to expire
//!
//! This crate provides an HTTP function that walks the Appwrite user
//! directory, checks every linked OAuth identity, and reports the ones
//! whose provider access token has less than a day left.

pub mod config;
pub mod error;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use services::{DirectoryConnector, TokenRefresher};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    /// Builds a directory client from each invocation's settings.
    pub directory: Arc<dyn DirectoryConnector>,
    /// Installed refresh hook, if any. Scans only report when this is `None`.
    pub refresher: Option<Arc<dyn TokenRefresher>>,
}
