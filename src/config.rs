//! Process configuration loaded from the environment.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::conversation::ConversationConfig;
use crate::server::DEFAULT_PORT;

/// Admin token used when `ADMIN_TOKEN` is not set.
pub const DEFAULT_ADMIN_TOKEN: &str = "secret";
/// Base URL for minted upload locations.
pub const DEFAULT_UPLOAD_BASE_URL: &str = "https://example-bucket.s3.amazonaws.com/uploads";
/// Default timeout for database calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is not set.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    /// A variable is set but cannot be used.
    #[error("invalid value for {key}: {reason}")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Why the value was rejected.
        reason: String,
    },
    /// A URL failed to parse.
    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

/// Connection settings for the hosted database.
#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`.
    pub url: String,
    /// Service-role key sent as `apikey` and bearer token.
    pub api_key: String,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

/// Top-level application configuration.
#[derive(Clone, Debug)]
pub struct AppConfig {
    /// Database connection.
    pub database: DatabaseConfig,
    /// Token expected in `x-admin-token` for admin endpoints.
    pub admin_token: String,
    /// HTTP listen port.
    pub port: u16,
    /// Base URL prepended to uploaded file names.
    pub upload_base_url: String,
    /// Conversation storage, retention and history settings.
    pub conversation: ConversationConfig,
}

impl AppConfig {
    /// Load configuration from process environment variables.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value is invalid.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let url = get("SUPABASE_URL").ok_or(ConfigError::Missing("SUPABASE_URL"))?;
        let api_key = get("SUPABASE_SERVICE_ROLE_KEY")
            .ok_or(ConfigError::Missing("SUPABASE_SERVICE_ROLE_KEY"))?;

        let admin_token = get("ADMIN_TOKEN").unwrap_or_else(|| {
            warn!("ADMIN_TOKEN not set, falling back to the default admin token");
            DEFAULT_ADMIN_TOKEN.to_string()
        });

        let port = parse_or("SAKHI_PORT", get("SAKHI_PORT"), DEFAULT_PORT)?;
        let timeout_secs = parse_or(
            "SAKHI_REQUEST_TIMEOUT_SECS",
            get("SAKHI_REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT.as_secs(),
        )?;
        let upload_base_url = get("SAKHI_UPLOAD_BASE_URL")
            .unwrap_or_else(|| DEFAULT_UPLOAD_BASE_URL.to_string());

        let mut conversation = ConversationConfig::default();
        conversation.retention.max_rows_per_user = parse_or(
            "SAKHI_MAX_HISTORY_ROWS",
            get("SAKHI_MAX_HISTORY_ROWS"),
            conversation.retention.max_rows_per_user,
        )?;

        let config = Self {
            database: DatabaseConfig {
                url,
                api_key,
                request_timeout: Duration::from_secs(timeout_secs),
            },
            admin_token,
            port,
            upload_base_url: upload_base_url.trim_end_matches('/').to_string(),
            conversation,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration invariants.
    ///
    /// # Errors
    /// Returns an error if any values are out of range or invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        Url::parse(&self.database.url)?;
        Url::parse(&self.upload_base_url)?;

        if self.database.request_timeout.is_zero() {
            return Err(ConfigError::Invalid {
                key: "SAKHI_REQUEST_TIMEOUT_SECS",
                reason: "must be > 0".to_string(),
            });
        }

        self.conversation
            .validate()
            .map_err(|e| ConfigError::Invalid {
                key: "conversation",
                reason: e.to_string(),
            })
    }
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    raw.map_or(Ok(default), |value| {
        value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "dummy-key"),
        ]))
        .unwrap();

        assert_eq!(config.admin_token, DEFAULT_ADMIN_TOKEN);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.database.request_timeout, DEFAULT_REQUEST_TIMEOUT);
        assert_eq!(config.upload_base_url, DEFAULT_UPLOAD_BASE_URL);
        assert_eq!(config.conversation.retention.max_rows_per_user, 100);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "dummy-key"),
            ("ADMIN_TOKEN", "s3cret"),
            ("SAKHI_PORT", "9001"),
            ("SAKHI_UPLOAD_BASE_URL", "https://cdn.example.com/u/"),
            ("SAKHI_MAX_HISTORY_ROWS", "20"),
        ]))
        .unwrap();

        assert_eq!(config.admin_token, "s3cret");
        assert_eq!(config.port, 9001);
        assert_eq!(config.upload_base_url, "https://cdn.example.com/u");
        assert_eq!(config.conversation.retention.max_rows_per_user, 20);
    }

    #[test]
    fn test_missing_and_invalid_values() {
        let err = AppConfig::from_lookup(lookup(&[("SUPABASE_SERVICE_ROLE_KEY", "k")])).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("SUPABASE_URL")));

        let err = AppConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "k"),
            ("SAKHI_PORT", "not-a-port"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "SAKHI_PORT", .. }));

        let err = AppConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "not a url"),
            ("SUPABASE_SERVICE_ROLE_KEY", "k"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Url(_)));

        let err = AppConfig::from_lookup(lookup(&[
            ("SUPABASE_URL", "https://example.supabase.co"),
            ("SUPABASE_SERVICE_ROLE_KEY", "k"),
            ("SAKHI_MAX_HISTORY_ROWS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "conversation", .. }));
    }
}
