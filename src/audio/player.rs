//! Player seam: the device-facing side of playback lives outside this crate.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use strum::Display;
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info};

use super::error::PlaybackError;
use crate::util::timeout::duration_ms;

/// Player lifecycle as reported through state notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "snake_case")]
pub enum PlayerState {
    Idle,
    Loading,
    Buffering,
    Playing,
    Paused,
    Stopped,
    Completed,
}

impl PlayerState {
    /// States after which the current source will never start playing.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Stopped | Self::Completed)
    }
}

/// What to hand to the player.
#[derive(Debug, Clone)]
pub enum AudioSource {
    Url(Url),
    Bytes(Arc<[u8]>),
    File(PathBuf),
}

impl AudioSource {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Url(_) => "url",
            Self::Bytes(_) => "bytes",
            Self::File(_) => "file",
        }
    }
}

/// An audio output the delivery service can drive.
///
/// `play` only has to *begin* loading the source; success is observed
/// through the states pushed to subscribers.
#[async_trait]
pub trait AudioPlayer: Send + Sync {
    fn subscribe(&self) -> StateSubscription;

    async fn play(&self, source: AudioSource) -> Result<(), PlaybackError>;

    async fn stop(&self);
}

/// Broadcast hub for player implementations.
#[derive(Debug, Clone)]
pub struct StateBus {
    sender: broadcast::Sender<PlayerState>,
}

impl Default for StateBus {
    fn default() -> Self {
        Self::new()
    }
}

impl StateBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(32);
        Self { sender }
    }

    /// Publish a state; having no listeners is fine.
    pub fn emit(&self, state: PlayerState) {
        let _ = self.sender.send(state);
    }

    pub fn subscribe(&self) -> StateSubscription {
        StateSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    /// Number of live subscriptions.
    pub fn listener_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// A live listener. Dropping it unsubscribes.
#[derive(Debug)]
pub struct StateSubscription {
    receiver: broadcast::Receiver<PlayerState>,
}

impl StateSubscription {
    /// Wait for the first `Playing`, failing on a terminal state.
    pub async fn wait_for_playing(&mut self) -> Result<(), PlaybackError> {
        loop {
            match self.receiver.recv().await {
                Ok(PlayerState::Playing) => return Ok(()),
                Ok(state) if state.is_terminal() => {
                    return Err(PlaybackError::EndedBeforePlaying(state))
                }
                Ok(_) | Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => {
                    return Err(PlaybackError::StartFailed(
                        "player state channel closed".to_string(),
                    ))
                }
            }
        }
    }
}

/// Start `source` and wait until the player reports `Playing`.
///
/// The whole attempt, including `play` itself, is bounded by `timeout`.
/// The state subscription is released on every exit path, and the player
/// is stopped when the attempt fails.
pub async fn play_until_started(
    player: &dyn AudioPlayer,
    source: AudioSource,
    timeout: Duration,
) -> Result<(), PlaybackError> {
    let kind = source.kind();
    // Subscribe first so a fast `Playing` cannot slip past.
    let mut subscription = player.subscribe();

    let attempt = async {
        player.play(source).await?;
        subscription.wait_for_playing().await
    };
    let result = match tokio::time::timeout(timeout, attempt).await {
        Ok(result) => result,
        Err(_) => Err(PlaybackError::Timeout(duration_ms(timeout))),
    };
    drop(subscription);

    if let Err(err) = &result {
        debug!(source = kind, error = %err, "Playback did not start");
        if tokio::time::timeout(timeout, player.stop()).await.is_err() {
            debug!(source = kind, "Player did not stop in time");
        }
    }
    result
}

/// Player that only logs what it would play and reports `Playing` at once.
///
/// Used by the CLI, where audio output is not in scope.
#[derive(Debug, Default)]
pub struct LoggingPlayer {
    bus: StateBus,
}

impl LoggingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn listener_count(&self) -> usize {
        self.bus.listener_count()
    }
}

#[async_trait]
impl AudioPlayer for LoggingPlayer {
    fn subscribe(&self) -> StateSubscription {
        self.bus.subscribe()
    }

    async fn play(&self, source: AudioSource) -> Result<(), PlaybackError> {
        match &source {
            AudioSource::Url(url) => info!(url = %url, "Playing stream"),
            AudioSource::Bytes(bytes) => info!(bytes = bytes.len(), "Playing buffer"),
            AudioSource::File(path) => info!(path = %path.display(), "Playing file"),
        }
        self.bus.emit(PlayerState::Loading);
        self.bus.emit(PlayerState::Playing);
        Ok(())
    }

    async fn stop(&self) {
        self.bus.emit(PlayerState::Stopped);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Emits a fixed script of states on `play`.
    struct ScriptedPlayer {
        bus: StateBus,
        script: Vec<PlayerState>,
        fail_start: bool,
        hang_stop: bool,
        stops: AtomicUsize,
    }

    impl ScriptedPlayer {
        fn new(script: Vec<PlayerState>) -> Self {
            Self {
                bus: StateBus::new(),
                script,
                fail_start: false,
                hang_stop: false,
                stops: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AudioPlayer for ScriptedPlayer {
        fn subscribe(&self) -> StateSubscription {
            self.bus.subscribe()
        }

        async fn play(&self, _source: AudioSource) -> Result<(), PlaybackError> {
            if self.fail_start {
                return Err(PlaybackError::StartFailed("decoder missing".to_string()));
            }
            for state in &self.script {
                self.bus.emit(*state);
            }
            Ok(())
        }

        async fn stop(&self) {
            self.stops.fetch_add(1, Ordering::SeqCst);
            if self.hang_stop {
                std::future::pending::<()>().await;
            }
        }
    }

    fn source() -> AudioSource {
        AudioSource::Bytes(Arc::from(vec![1u8, 2, 3]))
    }

    #[tokio::test]
    async fn playing_after_buffering_succeeds() {
        let player = ScriptedPlayer::new(vec![
            PlayerState::Loading,
            PlayerState::Buffering,
            PlayerState::Playing,
        ]);

        play_until_started(&player, source(), Duration::from_secs(1))
            .await
            .unwrap();

        assert_eq!(player.bus.listener_count(), 0);
        assert_eq!(player.stops.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn completed_before_playing_fails_and_stops() {
        let player = ScriptedPlayer::new(vec![PlayerState::Loading, PlayerState::Completed]);

        let err = play_until_started(&player, source(), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            PlaybackError::EndedBeforePlaying(PlayerState::Completed)
        ));
        assert_eq!(player.bus.listener_count(), 0);
        assert_eq!(player.stops.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn silent_player_times_out() {
        let player = ScriptedPlayer::new(vec![PlayerState::Loading]);

        let err = play_until_started(&player, source(), Duration::from_millis(300))
            .await
            .unwrap_err();

        assert!(matches!(err, PlaybackError::Timeout(300)));
        assert_eq!(player.bus.listener_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn stuck_stop_does_not_hold_the_caller() {
        let mut player = ScriptedPlayer::new(vec![PlayerState::Loading]);
        player.hang_stop = true;

        let err = play_until_started(&player, source(), Duration::from_millis(300))
            .await
            .unwrap_err();

        assert!(matches!(err, PlaybackError::Timeout(300)));
        assert_eq!(player.stops.load(Ordering::SeqCst), 1);
        assert_eq!(player.bus.listener_count(), 0);
    }

    #[tokio::test]
    async fn start_error_is_reported() {
        let mut player = ScriptedPlayer::new(vec![]);
        player.fail_start = true;

        let err = play_until_started(&player, source(), Duration::from_secs(1))
            .await
            .unwrap_err();

        assert!(matches!(err, PlaybackError::StartFailed(_)));
        assert_eq!(player.bus.listener_count(), 0);
    }

    #[tokio::test]
    async fn logging_player_reports_playing() {
        let player = LoggingPlayer::new();
        play_until_started(&player, source(), Duration::from_secs(1))
            .await
            .unwrap();
        assert_eq!(player.listener_count(), 0);
    }
}
