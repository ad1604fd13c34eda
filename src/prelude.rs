//! Convenience re-exports for common use.

pub use crate::audio::{
    AudioDeliveryService, AudioPlayer, AudioReference, AudioSource, LoggingPlayer,
    PlaybackOutcome, PlayerState,
};
pub use crate::client::{ApiClient, ResponseBody};
pub use crate::config::{AcimaConfig, ApiConfig, AudioConfig};
pub use crate::error::{ApiError, Result};
pub use crate::flow::{register_and_welcome, Registration};
pub use crate::types::{
    AnswerResult, Child, HealthStatus, Question, RegisterResponse, Report, ResponsesPage,
};
