use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::cache::AudioCache;
use super::player::{AudioPlayer, AudioSource};
use super::reference::AudioReference;
use super::strategy::{default_chain, Attempt, DeliveryEnv, DeliveryStrategy};
use super::{PlaybackOutcome, StrategyFailure};
use crate::client::ApiClient;
use crate::config::AudioConfig;

/// Best-effort narration playback.
///
/// Nothing here returns an error: every failure is logged and folded into
/// the returned [`PlaybackOutcome`].
#[derive(Clone)]
pub struct AudioDeliveryService {
    env: Arc<DeliveryEnv>,
    strategies: Arc<Vec<Box<dyn DeliveryStrategy>>>,
    strip_prefix: Option<String>,
}

impl AudioDeliveryService {
    /// Service sharing `client`'s transport and base address.
    pub fn new(client: ApiClient, player: Arc<dyn AudioPlayer>, config: &AudioConfig) -> Self {
        Self::with_strategies(client, player, config, default_chain())
    }

    pub fn with_strategies(
        client: ApiClient,
        player: Arc<dyn AudioPlayer>,
        config: &AudioConfig,
        strategies: Vec<Box<dyn DeliveryStrategy>>,
    ) -> Self {
        let cache = Arc::new(AudioCache::new(config.cache_dir.clone()));
        let env = DeliveryEnv::new(client, player, cache, config);
        Self {
            env: Arc::new(env),
            strategies: Arc::new(strategies),
            strip_prefix: config.strip_prefix.clone(),
        }
    }

    pub fn cache(&self) -> &AudioCache {
        &self.env.cache
    }

    /// Reference for a clip named after a child.
    pub fn reference_for_name(&self, name: &str) -> Option<AudioReference> {
        let base = self.env.client.base_url();
        AudioReference::from_name(&base, name, self.strip_prefix.as_deref())
            .map_err(|err| warn!(clip = name, error = %err, "Cannot build audio reference"))
            .ok()
    }

    /// Reference for a clip stored by the backend at `path`.
    pub fn reference_for_path(&self, path: &str) -> Option<AudioReference> {
        let base = self.env.client.base_url();
        AudioReference::from_path(&base, path, self.strip_prefix.as_deref())
            .map_err(|err| warn!(clip = path, error = %err, "Cannot build audio reference"))
            .ok()
    }

    pub async fn play_name(&self, name: &str) -> PlaybackOutcome {
        match self.reference_for_name(name) {
            Some(reference) => self.play(reference).await,
            None => PlaybackOutcome::invalid(name),
        }
    }

    pub async fn play_path(&self, path: &str) -> PlaybackOutcome {
        match self.reference_for_path(path) {
            Some(reference) => self.play(reference).await,
            None => PlaybackOutcome::invalid(path),
        }
    }

    /// Launch [`play`](Self::play) without waiting for it.
    pub fn spawn_play(&self, reference: AudioReference) -> JoinHandle<PlaybackOutcome> {
        let service = self.clone();
        tokio::spawn(async move { service.play(reference).await })
    }

    /// Run the delivery chain for `reference`.
    ///
    /// A clip already in the cache is played from disk with no network I/O.
    pub async fn play(&self, reference: AudioReference) -> PlaybackOutcome {
        let file_name = reference.cache_file_name();
        if let Some(path) = self.env.cache.lookup(&file_name).await {
            match self.env.play(AudioSource::File(path.clone())).await {
                Ok(()) => {
                    info!(reference = reference.logical(), path = %path.display(), "Playing cached clip");
                    return PlaybackOutcome::CacheHit { path };
                }
                Err(err) => {
                    debug!(reference = reference.logical(), error = %err, "Cached clip did not play");
                }
            }
        }

        let logical = reference.logical().to_string();
        let mut attempt = Attempt::new(reference);
        let mut failures = Vec::with_capacity(self.strategies.len());

        for strategy in self.strategies.iter() {
            debug!(reference = %logical, strategy = strategy.name(), "Trying delivery strategy");
            match strategy.deliver(&self.env, &mut attempt).await {
                Ok(outcome) => {
                    info!(reference = %logical, strategy = strategy.name(), "Narration playing");
                    return outcome;
                }
                Err(err) => {
                    debug!(reference = %logical, strategy = strategy.name(), error = %err, "Delivery strategy failed");
                    failures.push(StrategyFailure {
                        strategy: strategy.name(),
                        reason: err.to_string(),
                    });
                }
            }
        }

        warn!(reference = %logical, attempts = failures.len(), "Narration unavailable, giving up");
        PlaybackOutcome::Failed { failures }
    }

    /// Play an already-downloaded clip, such as the feedback returned by `/responder`.
    pub async fn play_feedback(&self, bytes: Vec<u8>) -> PlaybackOutcome {
        if bytes.is_empty() {
            return PlaybackOutcome::Failed {
                failures: vec![StrategyFailure {
                    strategy: "feedback",
                    reason: "empty clip".to_string(),
                }],
            };
        }
        match self.env.play(AudioSource::Bytes(bytes.into())).await {
            Ok(()) => PlaybackOutcome::PlayedFromMemory { url: None },
            Err(err) => {
                warn!(error = %err, "Feedback clip did not play");
                PlaybackOutcome::Failed {
                    failures: vec![StrategyFailure {
                        strategy: "feedback",
                        reason: err.to_string(),
                    }],
                }
            }
        }
    }
}

impl std::fmt::Debug for AudioDeliveryService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AudioDeliveryService")
            .field("cache_dir", &self.env.cache.dir())
            .field(
                "strategies",
                &self.strategies.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .finish()
    }
}
