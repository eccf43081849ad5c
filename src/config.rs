//! Configuration and settings management
//!
//! Loads settings from config files and environment variables and defines
//! the limits used when talking to the cat API and to Telegram.

use crate::cataas::RetryPolicy;
use crate::paginate::PageLimits;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default location of the cached tag list
pub const DEFAULT_TAGS_FILE: &str = "data/tags.json";
/// Public Cat as a Service endpoint
pub const DEFAULT_CATAAS_BASE_URL: &str = "https://cataas.com";
/// Attempts per image fetch
pub const FETCH_MAX_RETRIES: u32 = 3;
/// Fixed pause between fetch attempts
pub const FETCH_BACKOFF_MS: u64 = 1000;
/// Absolute length bound of a single reply
pub const MESSAGE_HARD_LIMIT: usize = 2000;
/// Per-chunk threshold, leaves room for part headers
pub const MESSAGE_CHUNK_THRESHOLD: usize = 1800;
/// Maximum number of autocomplete suggestions
pub const MAX_SUGGESTIONS: usize = 25;
/// Maximum length of a suggestion label
pub const MAX_SUGGESTION_LEN: usize = 100;
/// Default timeout for a single HTTP request to the cat API
pub const CATAAS_HTTP_TIMEOUT_SECS: u64 = 30;

// Telegram API delivery
/// Attempts for a single Telegram send
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
/// First backoff between Telegram send attempts
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Backoff ceiling between Telegram send attempts
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Path of the JSON file with autocomplete tags
    #[serde(default = "default_tags_file")]
    pub tags_file: String,

    /// Base URL of the cat API
    #[serde(default = "default_cataas_base_url")]
    pub cataas_base_url: String,

    /// Attempts per fetch
    #[serde(default = "default_fetch_max_retries")]
    pub fetch_max_retries: u32,
    /// Pause between attempts, in milliseconds
    #[serde(default = "default_fetch_backoff_ms")]
    pub fetch_backoff_ms: u64,

    /// Absolute reply length bound
    #[serde(default = "default_message_hard_limit")]
    pub message_hard_limit: usize,
    /// Chunk threshold used by the tag listing
    #[serde(default = "default_message_chunk_threshold")]
    pub message_chunk_threshold: usize,
}

fn default_tags_file() -> String {
    DEFAULT_TAGS_FILE.to_string()
}

fn default_cataas_base_url() -> String {
    DEFAULT_CATAAS_BASE_URL.to_string()
}

const fn default_fetch_max_retries() -> u32 {
    FETCH_MAX_RETRIES
}

const fn default_fetch_backoff_ms() -> u64 {
    FETCH_BACKOFF_MS
}

const fn default_message_hard_limit() -> usize {
    MESSAGE_HARD_LIMIT
}

const fn default_message_chunk_threshold() -> usize {
    MESSAGE_CHUNK_THRESHOLD
}

/// Build the layered configuration source.
///
/// # Errors
///
/// Returns a `ConfigError` if one of the sources cannot be read.
pub fn build_config() -> Result<Config, ConfigError> {
    let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

    Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
        // Not checked into git
        .add_source(File::with_name("config/local").required(false))
        // Eg. `APP__TAGS_FILE=/srv/tags.json`
        .add_source(Environment::with_prefix("APP").separator("__"))
        // Plain UPPER_SNAKE_CASE variables, empty ones count as unset
        .add_source(Environment::default().ignore_empty(true))
        .build()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use cataas_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or the Telegram token is
    /// missing or blank.
    pub fn new() -> Result<Self, ConfigError> {
        let settings: Self = build_config()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_token.trim().is_empty() {
            return Err(ConfigError::Message(
                "TELEGRAM_TOKEN is empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Retry policy for image fetches
    #[must_use]
    pub const fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.fetch_max_retries,
            backoff: Duration::from_millis(self.fetch_backoff_ms),
        }
    }

    /// Pagination limits for multi-part replies
    #[must_use]
    pub const fn page_limits(&self) -> PageLimits {
        PageLimits {
            hard_limit: self.message_hard_limit,
            chunk_threshold: self.message_chunk_threshold,
        }
    }
}

/// Get the cat API HTTP timeout from env or default.
///
/// Environment variable: `CATAAS_HTTP_TIMEOUT_SECS`.
#[must_use]
pub fn get_cataas_http_timeout_secs() -> u64 {
    std::env::var("CATAAS_HTTP_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(CATAAS_HTTP_TIMEOUT_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    fn settings_with_token(token: &str) -> Settings {
        Settings {
            telegram_token: token.to_string(),
            tags_file: default_tags_file(),
            cataas_base_url: default_cataas_base_url(),
            fetch_max_retries: FETCH_MAX_RETRIES,
            fetch_backoff_ms: FETCH_BACKOFF_MS,
            message_hard_limit: MESSAGE_HARD_LIMIT,
            message_chunk_threshold: MESSAGE_CHUNK_THRESHOLD,
        }
    }

    // Single test so env mutations never race each other
    #[test]
    fn test_config_env_loading() -> Result<(), Box<dyn std::error::Error>> {
        // 1. Token present, everything else defaulted
        env::set_var("TELEGRAM_TOKEN", "dummy_token");
        let settings = Settings::new()?;
        assert_eq!(settings.telegram_token, "dummy_token");
        assert_eq!(settings.tags_file, DEFAULT_TAGS_FILE);
        assert_eq!(settings.cataas_base_url, DEFAULT_CATAAS_BASE_URL);
        assert_eq!(settings.fetch_max_retries, 3);

        // 2. Overrides are picked up from plain env vars
        env::set_var("FETCH_MAX_RETRIES", "5");
        env::set_var("TAGS_FILE", "/tmp/tags.json");
        let settings = Settings::new()?;
        assert_eq!(settings.fetch_max_retries, 5);
        assert_eq!(settings.tags_file, "/tmp/tags.json");
        env::remove_var("FETCH_MAX_RETRIES");
        env::remove_var("TAGS_FILE");

        // 3. Missing token is an error
        env::remove_var("TELEGRAM_TOKEN");
        assert!(Settings::new().is_err());

        // 4. Blank token is an error too
        env::set_var("TELEGRAM_TOKEN", "   ");
        assert!(Settings::new().is_err());
        env::remove_var("TELEGRAM_TOKEN");
        Ok(())
    }

    #[test]
    fn test_policy_and_limits() {
        let mut settings = settings_with_token("dummy");
        settings.fetch_backoff_ms = 250;
        settings.message_chunk_threshold = 900;

        let policy = settings.retry_policy();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.backoff, Duration::from_millis(250));

        let limits = settings.page_limits();
        assert_eq!(limits.hard_limit, 2000);
        assert_eq!(limits.chunk_threshold, 900);
    }
}
