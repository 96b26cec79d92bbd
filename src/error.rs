use miette::Diagnostic;
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Configuration error: {0}")]
    #[diagnostic(
        code(gcal_digest::config),
        help("check the file passed with --config")
    )]
    Config(String),

    #[error("Authentication error: {0}")]
    #[diagnostic(code(gcal_digest::auth))]
    Auth(String),

    #[error("Google Calendar API error: {0}")]
    #[diagnostic(code(gcal_digest::google_calendar))]
    GoogleCalendar(String),

    #[error("Cache error: {0}")]
    #[diagnostic(code(gcal_digest::cache))]
    Cache(String),

    #[error("HTTP client error: {0}")]
    #[diagnostic(code(gcal_digest::http))]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    #[diagnostic(code(gcal_digest::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(gcal_digest::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(gcal_digest::other))]
    Other(String),
}

// Implement From for TOML deserialization errors
impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// Type alias for Result with our Error type
pub type DigestResult<T> = Result<T, Error>;

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Auth(message.to_string())
}

/// Helper to create Google Calendar errors
pub fn google_calendar_error(message: &str) -> Error {
    Error::GoogleCalendar(message.to_string())
}

/// Helper to create cache errors
pub fn cache_error(message: &str) -> Error {
    Error::Cache(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
