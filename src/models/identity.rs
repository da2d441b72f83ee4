//! Linked OAuth identities as returned by the Appwrite Users API.

use serde::{Deserialize, Serialize};

/// A link between a directory user and an external OAuth provider.
///
/// Appwrite reports absent credentials as empty strings, so callers should
/// go through the accessors rather than the raw fields.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identity {
    /// Identity ID
    #[serde(rename = "$id")]
    pub id: String,
    /// Owning user ID
    pub user_id: String,
    /// Provider tag, e.g. `google`
    pub provider: String,
    /// User ID at the provider
    #[serde(default)]
    pub provider_uid: String,
    /// Provider access token (opaque or a compact signed token)
    #[serde(default)]
    pub provider_access_token: String,
    /// Access token expiry (ISO 8601)
    #[serde(default)]
    pub provider_access_token_expiry: String,
    /// Provider refresh token
    #[serde(default)]
    pub provider_refresh_token: String,
}

impl Identity {
    pub fn access_token(&self) -> Option<&str> {
        non_empty(&self.provider_access_token)
    }

    pub fn access_token_expiry(&self) -> Option<&str> {
        non_empty(&self.provider_access_token_expiry)
    }

    pub fn refresh_token(&self) -> Option<&str> {
        non_empty(&self.provider_refresh_token)
    }
}

fn non_empty(value: &str) -> Option<&str> {
    let value = value.trim();
    (!value.is_empty()).then_some(value)
}

/// One page of identities.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IdentityList {
    pub total: u64,
    pub identities: Vec<Identity>,
}
