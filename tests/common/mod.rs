//! Shared test helpers and scripted player.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use acima::audio::{
    AudioDeliveryService, AudioPlayer, AudioSource, PlaybackError, PlayerState, StateBus,
    StateSubscription,
};
use acima::client::ApiClient;
use acima::config::{ApiConfig, AudioConfig};

/// How the scripted player reacts to one source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Behavior {
    /// Loading, then Playing.
    Play,
    /// Loading, then Completed without ever playing.
    EndBeforePlaying,
    /// Loading, then nothing.
    Hang,
    /// `play` itself returns an error.
    FailStart,
}

/// A player whose reaction is scripted per source kind or per URL.
pub struct MockPlayer {
    bus: StateBus,
    by_kind: Mutex<HashMap<&'static str, Behavior>>,
    by_url: Mutex<HashMap<String, Behavior>>,
    played: Mutex<Vec<AudioSource>>,
    stops: Mutex<usize>,
}

impl MockPlayer {
    /// Plays everything.
    pub fn new() -> Self {
        Self {
            bus: StateBus::new(),
            by_kind: Mutex::new(HashMap::new()),
            by_url: Mutex::new(HashMap::new()),
            played: Mutex::new(Vec::new()),
            stops: Mutex::new(0),
        }
    }

    /// Script every source of `kind` (`"url"`, `"bytes"`, `"file"`).
    pub fn on_kind(self, kind: &'static str, behavior: Behavior) -> Self {
        self.by_kind.lock().unwrap().insert(kind, behavior);
        self
    }

    /// Script one streamed URL; wins over the kind script.
    pub fn on_url(self, url: &str, behavior: Behavior) -> Self {
        self.by_url.lock().unwrap().insert(url.to_string(), behavior);
        self
    }

    /// Script every source.
    pub fn always(self, behavior: Behavior) -> Self {
        self.on_kind("url", behavior)
            .on_kind("bytes", behavior)
            .on_kind("file", behavior)
    }

    pub fn played(&self) -> Vec<AudioSource> {
        self.played.lock().unwrap().clone()
    }

    pub fn played_kinds(&self) -> Vec<&'static str> {
        self.played().iter().map(AudioSource::kind).collect()
    }

    pub fn stop_count(&self) -> usize {
        *self.stops.lock().unwrap()
    }

    pub fn listener_count(&self) -> usize {
        self.bus.listener_count()
    }

    fn behavior_for(&self, source: &AudioSource) -> Behavior {
        if let AudioSource::Url(url) = source {
            if let Some(behavior) = self.by_url.lock().unwrap().get(url.as_str()) {
                return *behavior;
            }
        }
        self.by_kind
            .lock()
            .unwrap()
            .get(source.kind())
            .copied()
            .unwrap_or(Behavior::Play)
    }
}

#[async_trait]
impl AudioPlayer for MockPlayer {
    fn subscribe(&self) -> StateSubscription {
        self.bus.subscribe()
    }

    async fn play(&self, source: AudioSource) -> Result<(), PlaybackError> {
        let behavior = self.behavior_for(&source);
        self.played.lock().unwrap().push(source);
        match behavior {
            Behavior::FailStart => {
                return Err(PlaybackError::StartFailed("scripted failure".to_string()))
            }
            Behavior::Play => {
                self.bus.emit(PlayerState::Loading);
                self.bus.emit(PlayerState::Playing);
            }
            Behavior::EndBeforePlaying => {
                self.bus.emit(PlayerState::Loading);
                self.bus.emit(PlayerState::Completed);
            }
            Behavior::Hang => self.bus.emit(PlayerState::Loading),
        }
        Ok(())
    }

    async fn stop(&self) {
        *self.stops.lock().unwrap() += 1;
        self.bus.emit(PlayerState::Stopped);
    }
}

/// Short timeouts so failure paths finish quickly.
pub fn fast_audio_config(cache_dir: &Path) -> AudioConfig {
    AudioConfig::default()
        .with_cache_dir(cache_dir)
        .with_timeouts(
            Duration::from_millis(500),
            Duration::from_millis(200),
            Duration::from_secs(2),
        )
}

pub fn client_for(base_url: &str) -> ApiClient {
    ApiClient::new(
        ApiConfig::builder()
            .base_url(base_url)
            .request_timeout(Duration::from_secs(2))
            .build(),
    )
    .unwrap()
}

pub fn service_for(
    base_url: &str,
    player: Arc<MockPlayer>,
    cache_dir: &Path,
) -> AudioDeliveryService {
    AudioDeliveryService::new(client_for(base_url), player, &fast_audio_config(cache_dir))
}
