//! Error types for Acima.

pub mod unified;

pub use unified::{ErrorCategory, RecoverySuggestion};

use thiserror::Error;

/// Primary error type for every backend operation.
///
/// [`status_code`](Self::status_code) separates failures that never got a
/// response (`None`) from rejections the server actually sent.
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Application { status: u16, message: String },

    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Unexpected response: {0}")]
    Decoding(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl From<serde_json::Error> for ApiError {
    fn from(error: serde_json::Error) -> Self {
        Self::Decoding(error.to_string())
    }
}

impl ApiError {
    /// Create an application-level error.
    pub fn application(status: u16, message: impl Into<String>) -> Self {
        Self::Application {
            status,
            message: message.into(),
        }
    }

    /// HTTP status of the rejection, if the server answered at all.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Application { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Human-readable message without the category prefix.
    pub fn message(&self) -> String {
        match self {
            Self::Application { message, .. } => message.clone(),
            Self::Transport(err) => err.to_string(),
            Self::Timeout(ms) => format!("request timed out after {ms}ms"),
            Self::Configuration(msg) | Self::Decoding(msg) | Self::InvalidArgument(msg) => {
                msg.clone()
            }
            Self::Io(err) => err.to_string(),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Transport(_) | Self::Timeout(_) => ErrorCategory::Transport,
            Self::Application { .. } => ErrorCategory::Application,
            Self::Decoding(_) => ErrorCategory::Decoding,
            Self::Configuration(_) | Self::InvalidArgument(_) => ErrorCategory::Configuration,
            Self::Io(_) => ErrorCategory::Unknown,
        }
    }

    /// Whether the caller may reissue the same request.
    ///
    /// The client itself never retries.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Application { status, .. } => matches!(status, 408 | 429 | 500..=599),
            _ => self.category() == ErrorCategory::Transport,
        }
    }

    /// Suggest recovery actions.
    pub fn recovery_suggestion(&self) -> RecoverySuggestion {
        match self.category() {
            ErrorCategory::Transport => RecoverySuggestion::RetryLater,
            ErrorCategory::Application if self.is_retryable() => RecoverySuggestion::RetryLater,
            ErrorCategory::Application => RecoverySuggestion::FixRequest,
            ErrorCategory::Decoding => RecoverySuggestion::CheckServerVersion,
            ErrorCategory::Configuration => RecoverySuggestion::CheckConfiguration,
            ErrorCategory::Unknown => RecoverySuggestion::ContactSupport,
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, ApiError>;
