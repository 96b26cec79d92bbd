use crate::config::OAuthClientConfig;
use crate::error::{auth_error, DigestResult};
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info};

/// Tokens this close to expiry are refreshed before use
const EXPIRY_SKEW_SECS: i64 = 60;

/// Lifetime assumed when the token endpoint omits `expires_in`
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// OAuth token material as stored in the configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OAuthToken {
    #[serde(default, alias = "AccessToken")]
    pub access_token: String,
    #[serde(default = "default_token_type", alias = "TokenType")]
    pub token_type: String,
    #[serde(default, alias = "RefreshToken")]
    pub refresh_token: String,
    /// RFC3339 expiry; accepts both a TOML string and a TOML datetime
    #[serde(default, alias = "Expiry", deserialize_with = "deserialize_expiry")]
    pub expiry: Option<String>,
}

fn default_token_type() -> String {
    "Bearer".to_string()
}

fn deserialize_expiry<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<toml::Value>::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(toml::Value::String(s)) if s.is_empty() => Ok(None),
        Some(toml::Value::String(s)) => Ok(Some(s)),
        Some(toml::Value::Datetime(dt)) => Ok(Some(dt.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "expected an RFC3339 expiry, found {}",
            other.type_str()
        ))),
    }
}

impl OAuthToken {
    /// Parsed expiry, if present and well-formed
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expiry
            .as_deref()
            .and_then(|e| DateTime::parse_from_rfc3339(e).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Whether the access token must be refreshed before calling the API at `now`
    pub fn needs_refresh(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.is_empty() {
            return true;
        }
        match self.expires_at() {
            Some(expires_at) => expires_at - Duration::seconds(EXPIRY_SKEW_SECS) <= now,
            // Unknown expiry, treat the access token as stale
            None => true,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenRefreshResponse {
    access_token: String,
    expires_in: Option<i64>,
    token_type: Option<String>,
    refresh_token: Option<String>,
}

/// Exchanges refresh tokens for access tokens at the OAuth token endpoint
#[derive(Clone)]
pub struct TokenManager {
    client_config: OAuthClientConfig,
    client: Client,
}

impl TokenManager {
    pub fn new(client_config: OAuthClientConfig, timeout: std::time::Duration) -> DigestResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| auth_error(&format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client_config,
            client,
        })
    }

    /// Return a token valid at `now`, refreshing it first when needed
    ///
    /// The input is never mutated; an unchanged clone comes back when the
    /// current access token is still valid.
    pub async fn ensure_fresh(&self, token: &OAuthToken, now: DateTime<Utc>) -> DigestResult<OAuthToken> {
        if !token.needs_refresh(now) {
            debug!("Access token valid until {:?}", token.expiry);
            return Ok(token.clone());
        }
        self.refresh_token(token, now).await
    }

    /// Refresh an expired token
    async fn refresh_token(&self, token: &OAuthToken, now: DateTime<Utc>) -> DigestResult<OAuthToken> {
        if token.refresh_token.is_empty() {
            return Err(auth_error("Access token expired and no refresh token configured"));
        }

        info!("Refreshing OAuth access token");

        let params = [
            ("client_id", self.client_config.client_id.as_str()),
            ("client_secret", self.client_config.client_secret.as_str()),
            ("refresh_token", token.refresh_token.as_str()),
            ("grant_type", "refresh_token"),
        ];

        let response = self
            .client
            .post(&self.client_config.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to refresh token: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to refresh token: HTTP {} - {}",
                status, error_body
            )));
        }

        let refreshed: TokenRefreshResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;

        if refreshed.access_token.is_empty() {
            return Err(auth_error("Token response has an empty 'access_token' field"));
        }

        let expires_in = refreshed.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS);
        let expires_at = now + Duration::seconds(expires_in);

        Ok(OAuthToken {
            access_token: refreshed.access_token,
            token_type: refreshed
                .token_type
                .unwrap_or_else(|| token.token_type.clone()),
            // Google only rotates the refresh token occasionally
            refresh_token: refreshed
                .refresh_token
                .unwrap_or_else(|| token.refresh_token.clone()),
            expiry: Some(expires_at.to_rfc3339()),
        })
    }
}
