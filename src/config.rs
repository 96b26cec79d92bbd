use crate::components::google_calendar::token::OAuthToken;
use crate::error::{config_error, DigestResult};
use chrono_tz::Tz;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Default configuration file path
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Default display and bucketing timezone
pub const DEFAULT_TIMEZONE: &str = "UTC";

/// Google OAuth token endpoint
pub const DEFAULT_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";

/// Google Calendar v3 API root
pub const DEFAULT_API_BASE_URL: &str = "https://www.googleapis.com/calendar/v3";

/// Default per-request deadline for HTTP calls
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Timezone used for the lookahead window, rendering and cache buckets
    #[serde(default = "default_timezone")]
    pub timezone: String,
    /// Directory holding the hourly digest files
    #[serde(default)]
    pub cache_dir: Option<PathBuf>,
    /// Per-request HTTP deadline in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Google Calendar API root, overridable for testing
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// OAuth client credentials
    #[serde(alias = "Client")]
    pub client: OAuthClientConfig,
    /// OAuth token material
    #[serde(alias = "Token")]
    pub token: OAuthToken,
    /// Calendars to query
    #[serde(alias = "Calendar")]
    pub calendar: CalendarConfig,
}

/// OAuth client credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OAuthClientConfig {
    #[serde(alias = "ClientID")]
    pub client_id: String,
    #[serde(alias = "ClientSecret")]
    pub client_secret: String,
    #[serde(default = "default_token_url", alias = "TokenURL")]
    pub token_url: String,
}

/// Calendar source identifiers, queried in order
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalendarConfig {
    #[serde(default, alias = "IDs")]
    pub ids: Vec<String>,
}

fn default_timezone() -> String {
    DEFAULT_TIMEZONE.to_string()
}

fn default_token_url() -> String {
    DEFAULT_TOKEN_URL.to_string()
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides
    pub fn load(path: &Path) -> DigestResult<Self> {
        // Load .env file if it exists
        dotenv().ok();

        let content = fs::read_to_string(path).map_err(|e| {
            config_error(&format!("Failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_toml_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;

        debug!(
            "Loaded configuration from {} with {} calendar(s)",
            path.display(),
            config.calendar.ids.len()
        );
        Ok(config)
    }

    /// Parse configuration from TOML text without touching the environment
    pub fn from_toml_str(content: &str) -> DigestResult<Self> {
        toml::from_str(content)
            .map_err(|e| config_error(&format!("Failed to parse configuration: {}", e)))
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(timezone) = env::var("TIMEZONE") {
            self.timezone = timezone;
        }
        if let Ok(cache_dir) = env::var("GCAL_DIGEST_CACHE_DIR") {
            self.cache_dir = Some(PathBuf::from(cache_dir));
        }
    }

    /// Reject configurations the pipeline cannot run with
    pub fn validate(&self) -> DigestResult<()> {
        self.tz()?;

        if self.calendar.ids.is_empty() {
            return Err(config_error("No calendar ids configured in [calendar] ids"));
        }
        if self.calendar.ids.iter().any(|id| id.trim().is_empty()) {
            return Err(config_error("Calendar ids must not be empty"));
        }
        if self.client.client_id.is_empty() || self.client.client_secret.is_empty() {
            return Err(config_error("OAuth client_id and client_secret are required"));
        }
        if self.request_timeout_secs == 0 {
            return Err(config_error("request_timeout_secs must be positive"));
        }

        Ok(())
    }

    /// Parsed display timezone
    pub fn tz(&self) -> DigestResult<Tz> {
        self.timezone
            .parse::<Tz>()
            .map_err(|e| config_error(&format!("Invalid timezone '{}': {}", self.timezone, e)))
    }

    /// Cache directory, defaulting to the system temp dir
    pub fn cache_dir(&self) -> PathBuf {
        self.cache_dir.clone().unwrap_or_else(env::temp_dir)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
