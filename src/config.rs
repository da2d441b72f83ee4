//! Application configuration loaded from environment variables.
//!
//! `Config` is read once at startup. Each invocation then resolves its own
//! `InvocationSettings` from the config plus the inbound request headers, so
//! nothing downstream reads the environment directly.

use crate::services::expiry::MissingExpiryPolicy;
use axum::http::HeaderMap;
use chrono::TimeDelta;
use std::env;
use std::time::Duration;

/// Default Appwrite endpoint when none is configured.
pub const DEFAULT_ENDPOINT: &str = "https://fra.cloud.appwrite.io/v1";
/// Default Appwrite project when none is configured.
pub const DEFAULT_PROJECT_ID: &str = "6552291c54fa3fe9cfb2";
/// Remaining lifetime under which a token is considered near expiry (one day).
pub const DEFAULT_EXPIRY_THRESHOLD_SECS: i64 = 24 * 60 * 60;

/// Header carrying the Appwrite API key for this execution.
pub const API_KEY_HEADER: &str = "x-appwrite-key";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,
    /// Appwrite API endpoint, including the `/v1` prefix
    pub appwrite_endpoint: String,
    /// Appwrite project ID
    pub appwrite_project_id: String,
    /// Appwrite API key; request headers take precedence
    pub appwrite_api_key: Option<String>,
    /// Provider tags whose identities are checked (exact match)
    pub refresh_providers: Vec<String>,
    /// Remaining lifetime under which a token needs refresh
    pub expiry_threshold: TimeDelta,
    /// Verdict for tokens that carry no expiry information at all
    pub missing_expiry_policy: MissingExpiryPolicy,
    /// Timeout applied to every Appwrite request
    pub http_timeout: Duration,
    /// Log level for this crate's targets
    pub log_level: String,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            port: 8080,
            appwrite_endpoint: "http://localhost/v1".to_string(),
            appwrite_project_id: "test-project".to_string(),
            appwrite_api_key: Some("test_api_key".to_string()),
            refresh_providers: vec!["google".to_string()],
            expiry_threshold: TimeDelta::seconds(DEFAULT_EXPIRY_THRESHOLD_SECS),
            missing_expiry_policy: MissingExpiryPolicy::Refresh,
            http_timeout: Duration::from_secs(5),
            log_level: "debug".to_string(),
        }
    }
}

impl Config {
    /// Config used by integration tests.
    pub fn test_default() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let refresh_providers = match non_empty("REFRESH_PROVIDERS") {
            Some(raw) => parse_providers(&raw)?,
            None => vec!["google".to_string()],
        };

        let expiry_threshold = match non_empty("EXPIRY_THRESHOLD_SECS") {
            Some(raw) => {
                let secs: i64 = raw
                    .parse()
                    .map_err(|_| ConfigError::Invalid("EXPIRY_THRESHOLD_SECS", raw.clone()))?;
                if secs <= 0 {
                    return Err(ConfigError::Invalid("EXPIRY_THRESHOLD_SECS", raw));
                }
                TimeDelta::try_seconds(secs)
                    .ok_or_else(|| ConfigError::Invalid("EXPIRY_THRESHOLD_SECS", raw.clone()))?
            }
            None => TimeDelta::seconds(DEFAULT_EXPIRY_THRESHOLD_SECS),
        };

        let missing_expiry_policy = match non_empty("MISSING_EXPIRY_POLICY") {
            Some(raw) => raw
                .parse::<MissingExpiryPolicy>()
                .map_err(|_| ConfigError::Invalid("MISSING_EXPIRY_POLICY", raw))?,
            None => MissingExpiryPolicy::default(),
        };

        let http_timeout = match non_empty("HTTP_TIMEOUT_SECS") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(secs) if secs > 0 => Duration::from_secs(secs),
                _ => return Err(ConfigError::Invalid("HTTP_TIMEOUT_SECS", raw)),
            },
            None => Duration::from_secs(30),
        };

        Ok(Self {
            port: non_empty("PORT")
                .and_then(|p| p.parse().ok())
                .unwrap_or(8080),
            appwrite_endpoint: non_empty("APPWRITE_FUNCTION_API_ENDPOINT")
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            appwrite_project_id: non_empty("APPWRITE_FUNCTION_PROJECT_ID")
                .unwrap_or_else(|| DEFAULT_PROJECT_ID.to_string()),
            appwrite_api_key: non_empty("APPWRITE_API_KEY"),
            refresh_providers,
            expiry_threshold,
            missing_expiry_policy,
            http_timeout,
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
        })
    }
}

/// Split a comma-separated provider list, dropping blanks.
fn parse_providers(raw: &str) -> Result<Vec<String>, ConfigError> {
    let providers: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect();

    if providers.is_empty() {
        return Err(ConfigError::Invalid("REFRESH_PROVIDERS", raw.to_string()));
    }
    Ok(providers)
}

/// Connection settings for a single invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationSettings {
    pub endpoint: String,
    pub project_id: String,
    /// Empty when neither the request nor the environment supplies a key.
    pub api_key: String,
}

impl InvocationSettings {
    /// Resolve settings from startup config and request headers.
    ///
    /// Endpoint and project always come from the environment. Only the key
    /// may come from the request: `x-appwrite-key` wins over
    /// `APPWRITE_API_KEY`, since the platform injects a per-execution key there.
    pub fn resolve(config: &Config, headers: &HeaderMap) -> Self {
        let header_key = headers
            .get(API_KEY_HEADER)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(str::to_string);

        Self {
            endpoint: config.appwrite_endpoint.clone(),
            project_id: config.appwrite_project_id.clone(),
            api_key: header_key
                .or_else(|| config.appwrite_api_key.clone())
                .unwrap_or_default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1:?}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::from_lookup(lookup(&[])).expect("Config should load");

        assert_eq!(config.port, 8080);
        assert_eq!(config.appwrite_endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.appwrite_project_id, DEFAULT_PROJECT_ID);
        assert_eq!(config.appwrite_api_key, None);
        assert_eq!(config.refresh_providers, vec!["google"]);
        assert_eq!(config.expiry_threshold, TimeDelta::days(1));
        assert_eq!(config.missing_expiry_policy, MissingExpiryPolicy::Refresh);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_config_overrides() {
        let config = Config::from_lookup(lookup(&[
            ("PORT", "9000"),
            ("APPWRITE_FUNCTION_API_ENDPOINT", "https://appwrite.example.com/v1"),
            ("APPWRITE_API_KEY", " secret "),
            ("REFRESH_PROVIDERS", "google, oauth2,,"),
            ("EXPIRY_THRESHOLD_SECS", "3600"),
            ("MISSING_EXPIRY_POLICY", "assume-valid"),
        ]))
        .expect("Config should load");

        assert_eq!(config.port, 9000);
        assert_eq!(config.appwrite_endpoint, "https://appwrite.example.com/v1");
        assert_eq!(config.appwrite_api_key.as_deref(), Some("secret"));
        assert_eq!(config.refresh_providers, vec!["google", "oauth2"]);
        assert_eq!(config.expiry_threshold, TimeDelta::hours(1));
        assert_eq!(
            config.missing_expiry_policy,
            MissingExpiryPolicy::AssumeValid
        );
    }

    #[test]
    fn test_config_rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("REFRESH_PROVIDERS", " , ,")])),
            Err(ConfigError::Invalid("REFRESH_PROVIDERS", _))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("EXPIRY_THRESHOLD_SECS", "-5")])),
            Err(ConfigError::Invalid("EXPIRY_THRESHOLD_SECS", _))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("EXPIRY_THRESHOLD_SECS", "9223372036854775807")])),
            Err(ConfigError::Invalid("EXPIRY_THRESHOLD_SECS", _))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("MISSING_EXPIRY_POLICY", "maybe")])),
            Err(ConfigError::Invalid("MISSING_EXPIRY_POLICY", _))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", "soon")])),
            Err(ConfigError::Invalid("HTTP_TIMEOUT_SECS", _))
        ));
        assert!(matches!(
            Config::from_lookup(lookup(&[("HTTP_TIMEOUT_SECS", "0")])),
            Err(ConfigError::Invalid("HTTP_TIMEOUT_SECS", _))
        ));
    }

    #[test]
    fn test_invocation_settings_header_key_wins() {
        let config = Config::default();
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, HeaderValue::from_static("header_key"));

        let settings = InvocationSettings::resolve(&config, &headers);
        assert_eq!(settings.api_key, "header_key");
        assert_eq!(settings.endpoint, config.appwrite_endpoint);
        assert_eq!(settings.project_id, config.appwrite_project_id);
    }

    #[test]
    fn test_invocation_settings_fallbacks() {
        let config = Config {
            appwrite_api_key: None,
            ..Config::default()
        };

        let settings = InvocationSettings::resolve(&config, &HeaderMap::new());
        assert_eq!(settings.api_key, "");
        assert_eq!(settings.project_id, config.appwrite_project_id);
    }

    #[test]
    fn test_invocation_settings_ignore_endpoint_and_project_headers() {
        let config = Config::default();
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-appwrite-endpoint",
            HeaderValue::from_static("http://attacker.example/v1"),
        );
        headers.insert("x-appwrite-project", HeaderValue::from_static("other-project"));

        let settings = InvocationSettings::resolve(&config, &headers);
        assert_eq!(settings.endpoint, config.appwrite_endpoint);
        assert_eq!(settings.project_id, config.appwrite_project_id);
        assert_eq!(settings.api_key, "test_api_key");
    }
}
