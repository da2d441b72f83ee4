// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Scan report returned by a directory scan.

use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// An identity whose access token needs refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct RefreshCandidate {
    pub user_id: String,
    pub identity_id: String,
    pub provider: String,
    /// Expiry as reported by the provider, or derived from the token's claims
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expiry_date: Option<String>,
    /// Always `true`; only flagged identities become candidates.
    pub needs_refresh: bool,
}

impl RefreshCandidate {
    pub fn new(
        user_id: impl Into<String>,
        identity_id: impl Into<String>,
        provider: impl Into<String>,
        expiry_date: Option<String>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            identity_id: identity_id.into(),
            provider: provider.into(),
            expiry_date,
            needs_refresh: true,
        }
    }
}

/// Aggregate result of one scan.
///
/// Counters only move forward through the `record_*` methods, which keep
/// `checked >= needs_refresh` and `details.len() == needs_refresh`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(feature = "binding-generation", ts(export, export_to = "bindings/"))]
pub struct ScanReport {
    checked: u32,
    needs_refresh: u32,
    errors: u32,
    details: Vec<RefreshCandidate>,
}

impl ScanReport {
    pub fn checked(&self) -> u32 {
        self.checked
    }

    pub fn needs_refresh(&self) -> u32 {
        self.needs_refresh
    }

    pub fn errors(&self) -> u32 {
        self.errors
    }

    pub fn details(&self) -> &[RefreshCandidate] {
        &self.details
    }

    /// Count a token whose expiry was evaluated and found valid.
    pub fn record_valid(&mut self) {
        self.checked += 1;
    }

    /// Count a token that was evaluated and needs refresh.
    pub fn record_refresh(&mut self, candidate: RefreshCandidate) {
        self.checked += 1;
        self.needs_refresh += 1;
        self.details.push(candidate);
    }

    pub fn record_error(&mut self) {
        self.errors += 1;
    }
}
