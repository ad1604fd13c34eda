use thiserror::Error;

use super::player::PlayerState;

/// Why one delivery step failed.
///
/// These never leave [`AudioDeliveryService`](super::AudioDeliveryService):
/// they advance the fallback chain and end up in logs and in
/// [`PlaybackOutcome::Failed`](super::PlaybackOutcome::Failed).
#[derive(Error, Debug)]
pub enum PlaybackError {
    #[error("Invalid audio reference: {0}")]
    InvalidReference(String),

    #[error("Probe failed for {url}: {reason}")]
    Probe { url: String, reason: String },

    #[error("Player did not reach playing within {0}ms")]
    Timeout(u64),

    #[error("Player failed to start: {0}")]
    StartFailed(String),

    #[error("Playback {0} before it started")]
    EndedBeforePlaying(PlayerState),

    #[error("Fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Cache write failed: {0}")]
    CacheWrite(#[source] std::io::Error),

    #[error("No candidate URLs")]
    NoCandidates,

    #[error("All {0} candidate URLs failed")]
    CandidatesExhausted(usize),
}
