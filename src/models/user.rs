//! User records as returned by the Appwrite Users API.

use serde::{Deserialize, Serialize};

/// A user in the identity directory. Read-only from our side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryUser {
    /// Appwrite user ID
    #[serde(rename = "$id")]
    pub id: String,
    /// Display name (may be empty)
    #[serde(default)]
    pub name: String,
    /// Email address (may be empty)
    #[serde(default)]
    pub email: String,
}

impl DirectoryUser {
    /// Name for log output.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            "Unknown name"
        } else {
            &self.name
        }
    }
}

/// One page of users.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserList {
    pub total: u64,
    pub users: Vec<DirectoryUser>,
}
