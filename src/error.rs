use miette::{Diagnostic, Result};
use thiserror::Error;

/// Main error type for the application
#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Authentication error: {0}")]
    #[diagnostic(
        code(jarvis::authentication),
        help("Run `get_calendar_token` to authorize calendar access again")
    )]
    Authentication(String),

    #[error("Calendar fetch error: {0}")]
    #[diagnostic(code(jarvis::fetch))]
    Fetch(String),

    #[error("Audio output not ready after {waited_ms} ms ({polls} checks)")]
    #[diagnostic(code(jarvis::audio_not_ready))]
    AudioNotReady { waited_ms: u64, polls: u32 },

    #[error("Speech error: {0}")]
    #[diagnostic(code(jarvis::speech))]
    Speech(String),

    #[error("Environment error: {0}")]
    #[diagnostic(code(jarvis::environment))]
    Environment(String),

    #[error("Configuration error: {0}")]
    #[diagnostic(code(jarvis::config))]
    Config(String),

    #[error(transparent)]
    #[diagnostic(code(jarvis::io))]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    #[diagnostic(code(jarvis::serialization))]
    Serialization(String),

    #[error("Other error: {0}")]
    #[diagnostic(code(jarvis::other))]
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
pub type AppResult<T> = Result<T, Error>;

/// Helper to create environment errors
pub fn env_error(message: &str) -> Error {
    Error::Environment(message.to_string())
}

/// Helper to create configuration errors
pub fn config_error(message: &str) -> Error {
    Error::Config(message.to_string())
}

/// Helper to create authentication errors
pub fn auth_error(message: &str) -> Error {
    Error::Authentication(message.to_string())
}

/// Helper to create calendar fetch errors
pub fn fetch_error(message: &str) -> Error {
    Error::Fetch(message.to_string())
}

/// Helper to create speech errors
pub fn speech_error(message: &str) -> Error {
    Error::Speech(message.to_string())
}

/// Helper to create other errors
pub fn other_error(message: &str) -> Error {
    Error::Other(message.to_string())
}
