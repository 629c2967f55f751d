use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoachError {
    #[error("Provider error: {0}")]
    Provider(String),

    #[error("Provider returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CoachError {
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider(message.into())
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedOutput(message.into())
    }

    /// Whether this error means the completion could not be obtained from the provider.
    /// Every such error is reported to the user as the same connectivity notice.
    pub fn is_provider_failure(&self) -> bool {
        matches!(
            self,
            Self::Provider(_)
                | Self::MalformedOutput(_)
                | Self::Timeout(_)
                | Self::Http(_)
                | Self::Json(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, CoachError>;
