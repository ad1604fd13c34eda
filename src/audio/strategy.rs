//! Delivery strategies, tried in order until one gets the clip playing.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use super::cache::AudioCache;
use super::error::PlaybackError;
use super::player::{play_until_started, AudioPlayer, AudioSource};
use super::probe::{fetch_bytes, probe};
use super::reference::AudioReference;
use super::PlaybackOutcome;
use crate::client::ApiClient;
use crate::config::AudioConfig;

/// Resources shared by every invocation.
pub struct DeliveryEnv {
    pub client: ApiClient,
    pub player: Arc<dyn AudioPlayer>,
    pub cache: Arc<AudioCache>,
    pub probe_timeout: Duration,
    pub playback_start_timeout: Duration,
    pub fetch_timeout: Duration,
}

impl DeliveryEnv {
    pub fn new(
        client: ApiClient,
        player: Arc<dyn AudioPlayer>,
        cache: Arc<AudioCache>,
        config: &AudioConfig,
    ) -> Self {
        Self {
            client,
            player,
            cache,
            probe_timeout: config.probe_timeout,
            playback_start_timeout: config.playback_start_timeout,
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// The client's active transport.
    ///
    /// Read per use so a reconfigured client's previous pool is released
    /// once in-flight work ends.
    pub fn http(&self) -> reqwest::Client {
        self.client.http()
    }

    pub async fn play(&self, source: AudioSource) -> Result<(), PlaybackError> {
        play_until_started(self.player.as_ref(), source, self.playback_start_timeout).await
    }
}

/// State of one invocation, handed from strategy to strategy.
#[derive(Debug)]
pub struct Attempt {
    pub reference: AudioReference,
    reachable: Vec<Url>,
    downloaded: Option<(Url, Arc<[u8]>)>,
}

impl Attempt {
    pub fn new(reference: AudioReference) -> Self {
        Self {
            reference,
            reachable: Vec::new(),
            downloaded: None,
        }
    }

    /// Record a candidate that answered its reachability check.
    pub fn mark_reachable(&mut self, url: Url) {
        if !self.reachable.contains(&url) {
            self.reachable.push(url);
        }
    }

    pub fn reachable(&self) -> &[Url] {
        &self.reachable
    }

    /// URLs to download from: reachable candidates, then the reference's
    /// source, then the remaining candidates.
    pub fn download_order(&self) -> Vec<Url> {
        let mut order: Vec<Url> = Vec::new();
        let rest = self
            .reference
            .source_url()
            .into_iter()
            .chain(self.reference.candidates());
        for url in self.reachable.iter().chain(rest) {
            if !order.contains(url) {
                order.push(url.clone());
            }
        }
        order
    }

    /// Download the clip, at most once per invocation.
    pub async fn bytes(&mut self, env: &DeliveryEnv) -> Result<(Url, Arc<[u8]>), PlaybackError> {
        if let Some((url, bytes)) = &self.downloaded {
            return Ok((url.clone(), bytes.clone()));
        }
        let order = self.download_order();
        if order.is_empty() {
            return Err(PlaybackError::InvalidReference(format!(
                "'{}' has no URL to download from",
                self.reference.logical()
            )));
        }

        let http = env.http();
        let mut last_error = None;
        for url in order {
            match fetch_bytes(&http, &url, env.fetch_timeout).await {
                Ok(bytes) => {
                    let bytes: Arc<[u8]> = bytes.into();
                    self.downloaded = Some((url.clone(), bytes.clone()));
                    return Ok((url, bytes));
                }
                Err(err) => {
                    debug!(url = %url, error = %err, "Download failed");
                    last_error = Some(err);
                }
            }
        }
        Err(last_error.unwrap_or(PlaybackError::NoCandidates))
    }
}

#[async_trait]
pub trait DeliveryStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn deliver(
        &self,
        env: &DeliveryEnv,
        attempt: &mut Attempt,
    ) -> Result<PlaybackOutcome, PlaybackError>;
}

/// Probe each candidate URL and stream the first one that starts.
#[derive(Debug, Default)]
pub struct CandidateStreaming;

#[async_trait]
impl DeliveryStrategy for CandidateStreaming {
    fn name(&self) -> &'static str {
        "candidate_streaming"
    }

    async fn deliver(
        &self,
        env: &DeliveryEnv,
        attempt: &mut Attempt,
    ) -> Result<PlaybackOutcome, PlaybackError> {
        let candidates = attempt.reference.candidates().to_vec();
        if candidates.is_empty() {
            return Err(PlaybackError::NoCandidates);
        }

        let http = env.http();
        for (index, url) in candidates.iter().enumerate() {
            if let Err(err) = probe(&http, url, env.probe_timeout).await {
                debug!(candidate = index, url = %url, error = %err, "Candidate probe failed");
                continue;
            }
            attempt.mark_reachable(url.clone());
            match env.play(AudioSource::Url(url.clone())).await {
                Ok(()) => return Ok(PlaybackOutcome::Streamed { url: url.clone() }),
                Err(err) => {
                    debug!(candidate = index, url = %url, error = %err, "Candidate stream failed");
                }
            }
        }
        Err(PlaybackError::CandidatesExhausted(candidates.len()))
    }
}

/// Download the clip and play it from memory.
#[derive(Debug, Default)]
pub struct MemoryPlayback;

#[async_trait]
impl DeliveryStrategy for MemoryPlayback {
    fn name(&self) -> &'static str {
        "memory_playback"
    }

    async fn deliver(
        &self,
        env: &DeliveryEnv,
        attempt: &mut Attempt,
    ) -> Result<PlaybackOutcome, PlaybackError> {
        let (url, bytes) = attempt.bytes(env).await?;
        env.play(AudioSource::Bytes(bytes)).await?;
        Ok(PlaybackOutcome::PlayedFromMemory { url: Some(url) })
    }
}

/// Persist the clip into the cache directory and play the file.
#[derive(Debug, Default)]
pub struct CachedPlayback;

#[async_trait]
impl DeliveryStrategy for CachedPlayback {
    fn name(&self) -> &'static str {
        "cached_playback"
    }

    async fn deliver(
        &self,
        env: &DeliveryEnv,
        attempt: &mut Attempt,
    ) -> Result<PlaybackOutcome, PlaybackError> {
        let file_name = attempt.reference.cache_file_name();
        let _key = env.cache.lock(&file_name).await;

        // A concurrent invocation may have finished the download meanwhile.
        let path = match env.cache.lookup(&file_name).await {
            Some(path) => path,
            None => {
                let (_, bytes) = attempt.bytes(env).await?;
                env.cache.store(&file_name, &bytes).await?
            }
        };

        env.play(AudioSource::File(path.clone())).await?;
        Ok(PlaybackOutcome::PlayedFromCache { path })
    }
}

/// The standard chain: stream, then memory, then cache.
pub fn default_chain() -> Vec<Box<dyn DeliveryStrategy>> {
    vec![
        Box::new(CandidateStreaming),
        Box::new(MemoryPlayback),
        Box::new(CachedPlayback),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(path: &str) -> Url {
        Url::parse("http://localhost:5000/")
            .and_then(|base| base.join(path))
            .unwrap()
    }

    #[test]
    fn reachable_candidates_download_first() {
        let narrated = url("audio/questao_8.mp3");
        let fallback = url("audios/questao_8.mp3");
        let reference = AudioReference::new(
            "audios/questao_8.mp3",
            vec![narrated.clone(), fallback.clone()],
            Some(narrated.clone()),
        );
        let mut attempt = Attempt::new(reference);
        assert_eq!(attempt.download_order(), vec![narrated.clone(), fallback.clone()]);

        attempt.mark_reachable(fallback.clone());
        attempt.mark_reachable(fallback.clone());
        assert_eq!(attempt.reachable(), &[fallback.clone()]);
        assert_eq!(attempt.download_order(), vec![fallback, narrated]);
    }

    #[test]
    fn bare_reference_has_nothing_to_download() {
        let attempt = Attempt::new(AudioReference::new("vazio", Vec::new(), None));
        assert!(attempt.download_order().is_empty());
    }
}
