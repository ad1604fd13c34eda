//! Configuration system (layered: defaults > TOML file > env > code).

use std::path::{Path, PathBuf};
use std::time::Duration;

use bon::Builder;
use serde::Deserialize;

use crate::error::ApiError;

pub const DEFAULT_BASE_URL: &str = "http://localhost:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
/// Highest grade the deployment accepts. Some schools run the game up to 9.
pub const DEFAULT_GRADE_MAX: u8 = 5;

pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_PLAYBACK_START_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);
pub const DEFAULT_STRIP_PREFIX: &str = "audios/";

const CACHE_SUBDIR: &str = "audio_cache";

/// Backend connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct ApiConfig {
    #[builder(into, default = DEFAULT_BASE_URL.to_string())]
    pub base_url: String,
    #[builder(default = DEFAULT_REQUEST_TIMEOUT)]
    pub request_timeout: Duration,
    #[builder(default = DEFAULT_GRADE_MAX)]
    pub grade_max: u8,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Narration delivery settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioConfig {
    pub probe_timeout: Duration,
    pub playback_start_timeout: Duration,
    pub fetch_timeout: Duration,
    pub cache_dir: PathBuf,
    /// Prefix removed from backend audio paths before building candidate URLs.
    pub strip_prefix: Option<String>,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
            playback_start_timeout: DEFAULT_PLAYBACK_START_TIMEOUT,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            cache_dir: default_cache_dir(),
            strip_prefix: Some(DEFAULT_STRIP_PREFIX.to_string()),
        }
    }
}

impl AudioConfig {
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    pub fn with_timeouts(mut self, probe: Duration, playback_start: Duration, fetch: Duration) -> Self {
        self.probe_timeout = probe;
        self.playback_start_timeout = playback_start;
        self.fetch_timeout = fetch;
        self
    }

    pub fn with_strip_prefix(mut self, prefix: Option<String>) -> Self {
        self.strip_prefix = prefix;
        self
    }
}

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AcimaConfig {
    pub api: ApiConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    #[serde(default)]
    api: ApiSection,
    #[serde(default)]
    audio: AudioSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ApiSection {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    grade_max: Option<u8>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct AudioSection {
    probe_timeout_ms: Option<u64>,
    playback_start_timeout_ms: Option<u64>,
    fetch_timeout_ms: Option<u64>,
    cache_dir: Option<PathBuf>,
    strip_prefix: Option<String>,
}

impl AcimaConfig {
    /// Defaults, then the optional TOML file, then the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ApiError> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path)?;
                Self::from_toml_str(&raw)?
            }
            None => Self::default(),
        };
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        config.apply_env_from(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Defaults overridden by `ACIMA_*` environment variables.
    pub fn from_env() -> Result<Self, ApiError> {
        Self::load(None)
    }

    /// Parse a TOML document on top of the defaults.
    pub fn from_toml_str(raw: &str) -> Result<Self, ApiError> {
        let file: ConfigFile = toml::from_str(raw)
            .map_err(|e| ApiError::Configuration(format!("invalid config file: {e}")))?;

        let mut config = Self::default();
        let api = file.api;
        if let Some(base_url) = api.base_url {
            config.api.base_url = base_url;
        }
        if let Some(secs) = api.timeout_secs {
            config.api.request_timeout = Duration::from_secs(secs);
        }
        if let Some(max) = api.grade_max {
            config.api.grade_max = max;
        }

        let audio = file.audio;
        if let Some(ms) = audio.probe_timeout_ms {
            config.audio.probe_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = audio.playback_start_timeout_ms {
            config.audio.playback_start_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = audio.fetch_timeout_ms {
            config.audio.fetch_timeout = Duration::from_millis(ms);
        }
        if let Some(dir) = audio.cache_dir {
            config.audio.cache_dir = dir;
        }
        if let Some(prefix) = audio.strip_prefix {
            config.audio.strip_prefix = non_empty(prefix);
        }

        config.validate()?;
        Ok(config)
    }

    /// Apply `ACIMA_*` overrides read through `lookup`.
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<(), ApiError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("ACIMA_BASE_URL") {
            self.api.base_url = url;
        }
        if let Some(raw) = lookup("ACIMA_TIMEOUT_SECS") {
            let secs = parse_env_number::<u64>("ACIMA_TIMEOUT_SECS", &raw)?;
            self.api.request_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("ACIMA_GRADE_MAX") {
            self.api.grade_max = parse_env_number::<u8>("ACIMA_GRADE_MAX", &raw)?;
        }
        if let Some(dir) = lookup("ACIMA_AUDIO_CACHE_DIR") {
            self.audio.cache_dir = PathBuf::from(dir);
        }
        if let Some(prefix) = lookup("ACIMA_AUDIO_STRIP_PREFIX") {
            self.audio.strip_prefix = non_empty(prefix);
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        self.api.validate()?;
        if self.audio.playback_start_timeout.is_zero() || self.audio.fetch_timeout.is_zero() {
            return Err(ApiError::Configuration(
                "audio timeouts must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl ApiConfig {
    pub fn validate(&self) -> Result<(), ApiError> {
        if self.grade_max == 0 {
            return Err(ApiError::Configuration(
                "grade_max must be at least 1".to_string(),
            ));
        }
        if self.request_timeout.is_zero() {
            return Err(ApiError::Configuration(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        parse_base_url(&self.base_url)?;
        Ok(())
    }
}

/// Parse a base address, requiring an http(s) scheme and a host.
pub fn parse_base_url(raw: &str) -> Result<reqwest::Url, ApiError> {
    let url = reqwest::Url::parse(raw.trim())
        .map_err(|e| ApiError::Configuration(format!("invalid base URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
        return Err(ApiError::Configuration(format!(
            "base URL must be http(s) with a host: '{raw}'"
        )));
    }
    Ok(url)
}

fn parse_env_number<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, ApiError> {
    raw.trim()
        .parse()
        .map_err(|_| ApiError::Configuration(format!("{key} is not a valid number: '{raw}'")))
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Cache directory under the per-install cache location.
pub fn default_cache_dir() -> PathBuf {
    directories::ProjectDirs::from("br", "acima", "Acima")
        .map(|dirs| dirs.cache_dir().join(CACHE_SUBDIR))
        .unwrap_or_else(|| std::env::temp_dir().join("acima").join(CACHE_SUBDIR))
}
