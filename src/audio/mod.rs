//! Narration delivery: fetch a remote clip and get it playing, or give up quietly.
//!
//! The chain for one clip:
//!
//! 1. cached file on disk, if any (no network);
//! 2. each candidate URL, probed then streamed;
//! 3. the clip downloaded and played from memory;
//! 4. the download written to the cache directory and played from there.
//!
//! Every step is bounded by a timeout, so an invocation always ends.

pub mod cache;
pub mod error;
pub mod player;
pub mod probe;
pub mod reference;
pub mod service;
pub mod strategy;

use std::path::PathBuf;

use reqwest::Url;

pub use cache::AudioCache;
pub use error::PlaybackError;
pub use player::{
    play_until_started, AudioPlayer, AudioSource, LoggingPlayer, PlayerState, StateBus,
    StateSubscription,
};
pub use reference::{normalize_audio_path, AudioReference};
pub use service::AudioDeliveryService;
pub use strategy::{
    CachedPlayback, CandidateStreaming, DeliveryStrategy, MemoryPlayback,
};

/// How an invocation ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackOutcome {
    /// Streaming from a candidate URL.
    Streamed { url: Url },
    /// Playing a downloaded buffer; `url` is where it came from, if remote.
    PlayedFromMemory { url: Option<Url> },
    /// Playing a file this invocation wrote to the cache.
    PlayedFromCache { path: PathBuf },
    /// Playing a file that was already cached.
    CacheHit { path: PathBuf },
    /// Every strategy failed.
    Failed { failures: Vec<StrategyFailure> },
}

impl PlaybackOutcome {
    pub fn is_playing(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    fn invalid(reference: &str) -> Self {
        Self::Failed {
            failures: vec![StrategyFailure {
                strategy: "reference",
                reason: format!("invalid audio reference '{reference}'"),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    pub strategy: &'static str,
    pub reason: String,
}
