use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    // Configuration errors
    #[error("Config file not found at {path}. A template has been created - edit the sources if needed and run again.")]
    ConfigNotFound { path: PathBuf },

    #[error("Invalid config: {message}")]
    ConfigInvalid { message: String },

    #[error("Failed to parse config file: {0}")]
    ConfigParseError(#[from] toml::de::Error),

    // Source errors
    #[error("Source '{name}' does not exist or is not configured correctly: {reason}")]
    UnknownSource { name: String, reason: String },

    // Runtime errors
    #[error("No tokio runtime available to run lyrics lookups")]
    NoRuntime,

    // Network errors
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    // IO errors
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl CoreError {
    pub(crate) fn unknown_source(name: &str, reason: impl Into<String>) -> Self {
        Self::UnknownSource {
            name: name.to_string(),
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
