// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Access token expiry evaluation.
//!
//! Expiry comes from one of two places:
//! - the separately stored expiry timestamp (`providerAccessTokenExpiry`), or
//! - the `exp` claim of a compact `header.payload.signature` token.
//!
//! The timestamp wins when present. Any malformed expiry information counts
//! as needing refresh. Missing expiry information is decided by
//! [`MissingExpiryPolicy`].

use crate::time_utils::parse_timestamp;
use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use chrono::{DateTime, TimeDelta, Utc};
use serde_json::Value;
use std::str::FromStr;

/// Base64url that tolerates both padded and unpadded segments.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// How to treat a token that carries no expiry information at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MissingExpiryPolicy {
    /// Assume the token is stale.
    #[default]
    Refresh,
    /// Assume the token is still valid.
    AssumeValid,
}

impl FromStr for MissingExpiryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "refresh" => Ok(Self::Refresh),
            "assume-valid" | "assume_valid" | "valid" => Ok(Self::AssumeValid),
            other => Err(format!("unknown missing-expiry policy: {other}")),
        }
    }
}

/// Reasons expiry information could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExpiryError {
    #[error("unparseable expiry timestamp: {0:?}")]
    Timestamp(String),

    #[error("token has {0} segments, expected 3")]
    Segments(usize),

    #[error("token payload is not valid base64url")]
    PayloadEncoding,

    #[error("token payload is not a JSON object")]
    PayloadJson,

    #[error("token exp claim is not a valid timestamp")]
    ExpClaim,
}

/// Token material for one identity.
#[derive(Debug, Clone, Copy)]
pub struct TokenMaterial<'a> {
    pub access_token: Option<&'a str>,
    pub expiry: Option<&'a str>,
}

/// Outcome of reading and comparing a token's expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpiryCheck {
    /// More than the threshold remains.
    Fresh { expires_at: DateTime<Utc> },
    /// Less than the threshold remains, or already expired.
    NearExpiry { expires_at: DateTime<Utc> },
    /// No expiry information at all.
    Unknown,
    /// Expiry information present but unreadable.
    Malformed(ExpiryError),
}

impl ExpiryCheck {
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Fresh { expires_at } | Self::NearExpiry { expires_at } => Some(*expires_at),
            Self::Unknown | Self::Malformed(_) => None,
        }
    }
}

/// Decides whether an access token should be refreshed.
#[derive(Debug, Clone, Copy)]
pub struct ExpiryEvaluator {
    threshold: TimeDelta,
    missing_policy: MissingExpiryPolicy,
}

impl Default for ExpiryEvaluator {
    fn default() -> Self {
        Self::new(
            TimeDelta::seconds(crate::config::DEFAULT_EXPIRY_THRESHOLD_SECS),
            MissingExpiryPolicy::default(),
        )
    }
}

impl ExpiryEvaluator {
    pub fn new(threshold: TimeDelta, missing_policy: MissingExpiryPolicy) -> Self {
        Self {
            threshold,
            missing_policy,
        }
    }

    /// Read the expiry from `material` and compare it against `now`.
    pub fn check(&self, material: TokenMaterial<'_>, now: DateTime<Utc>) -> ExpiryCheck {
        let expires_at = match resolve_expiry(material) {
            Ok(Some(expires_at)) => expires_at,
            Ok(None) => return ExpiryCheck::Unknown,
            Err(e) => return ExpiryCheck::Malformed(e),
        };

        // Millisecond resolution, matching the stored timestamps.
        let remaining_ms = expires_at.timestamp_millis() - now.timestamp_millis();
        if remaining_ms < self.threshold.num_milliseconds() {
            ExpiryCheck::NearExpiry { expires_at }
        } else {
            ExpiryCheck::Fresh { expires_at }
        }
    }

    /// Verdict for an already computed check.
    pub fn needs_refresh(&self, check: &ExpiryCheck) -> bool {
        match check {
            ExpiryCheck::Fresh { .. } => false,
            ExpiryCheck::NearExpiry { .. } | ExpiryCheck::Malformed(_) => true,
            ExpiryCheck::Unknown => self.missing_policy == MissingExpiryPolicy::Refresh,
        }
    }

    /// Check and decide in one step.
    pub fn evaluate(&self, material: TokenMaterial<'_>, now: DateTime<Utc>) -> bool {
        self.needs_refresh(&self.check(material, now))
    }
}

/// Find the expiry for `material`, preferring the stored timestamp.
pub fn resolve_expiry(material: TokenMaterial<'_>) -> Result<Option<DateTime<Utc>>, ExpiryError> {
    if let Some(raw) = material.expiry.map(str::trim).filter(|s| !s.is_empty()) {
        return parse_timestamp(raw)
            .map(Some)
            .ok_or_else(|| ExpiryError::Timestamp(raw.to_string()));
    }

    match material.access_token.map(str::trim).filter(|s| !s.is_empty()) {
        Some(token) => token_expiry(token),
        None => Ok(None),
    }
}

/// Read the `exp` claim (seconds since epoch) from a compact token.
///
/// The signature is not verified; we only need the provider's stated expiry.
/// Returns `Ok(None)` when the payload has no `exp` claim.
pub fn token_expiry(token: &str) -> Result<Option<DateTime<Utc>>, ExpiryError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(ExpiryError::Segments(segments.len()));
    }

    let payload = URL_SAFE_LENIENT
        .decode(segments[1])
        .map_err(|_| ExpiryError::PayloadEncoding)?;

    let claims: Value = serde_json::from_slice(&payload).map_err(|_| ExpiryError::PayloadJson)?;
    let claims = claims.as_object().ok_or(ExpiryError::PayloadJson)?;

    let exp = match claims.get("exp") {
        None | Some(Value::Null) => return Ok(None),
        Some(exp) => exp,
    };

    let secs = exp
        .as_i64()
        .or_else(|| exp.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
        .ok_or(ExpiryError::ExpClaim)?;

    DateTime::from_timestamp(secs, 0)
        .map(Some)
        .ok_or(ExpiryError::ExpClaim)
}
