//! Logical audio references and the URLs derived from them.

use reqwest::Url;
use sha2::{Digest, Sha256};

use super::error::PlaybackError;
use crate::util::url::join_segments;

/// Route serving narrated clips: `/audio/<stem>.mp3`.
const NARRATED_ROUTE: &str = "audio";
const EXTENSION: &str = ".mp3";
const MAX_STEM_CHARS: usize = 64;

/// Normalize a backend audio path to a relative path.
///
/// Trims whitespace and leading slashes, converts backslashes, and removes
/// `strip_prefix` when present. Already-relative paths pass through.
pub fn normalize_audio_path(raw: &str, strip_prefix: Option<&str>) -> String {
    let cleaned = raw.trim().replace('\\', "/");
    let relative = cleaned.trim_start_matches('/');
    let stripped = strip_prefix
        .map(|prefix| prefix.trim_start_matches('/'))
        .filter(|prefix| !prefix.is_empty())
        .and_then(|prefix| relative.strip_prefix(prefix))
        .unwrap_or(relative);
    stripped.trim_start_matches('/').to_string()
}

/// A clip to play plus the ordered places it may live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioReference {
    logical: String,
    candidates: Vec<Url>,
    source: Option<Url>,
}

impl AudioReference {
    /// Reference with explicit candidates and byte-fetch source.
    pub fn new(logical: impl Into<String>, candidates: Vec<Url>, source: Option<Url>) -> Self {
        Self {
            logical: logical.into(),
            candidates,
            source,
        }
    }

    /// Clip named after a child, e.g. the welcome narration.
    pub fn from_name(
        base: &Url,
        name: &str,
        strip_prefix: Option<&str>,
    ) -> Result<Self, PlaybackError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PlaybackError::InvalidReference(
                "audio name cannot be empty".to_string(),
            ));
        }
        let prefix = strip_prefix.unwrap_or_default();
        Self::from_path(base, &format!("{prefix}{name}{EXTENSION}"), strip_prefix)
    }

    /// Clip stored by the backend at `raw_path`, e.g. `audios/questao_7.mp3`.
    ///
    /// Candidates: the narrated route for the normalized stem, then the
    /// static file at the path as given.
    pub fn from_path(
        base: &Url,
        raw_path: &str,
        strip_prefix: Option<&str>,
    ) -> Result<Self, PlaybackError> {
        let original = raw_path.trim().replace('\\', "/");
        let original = original.trim_start_matches('/');
        let normalized = normalize_audio_path(raw_path, strip_prefix);
        let stem = normalized
            .strip_suffix(EXTENSION)
            .unwrap_or(&normalized)
            .to_string();
        if stem.is_empty() {
            return Err(PlaybackError::InvalidReference(format!(
                "audio path '{raw_path}' has no file name"
            )));
        }

        let narrated_path = format!("{NARRATED_ROUTE}/{stem}{EXTENSION}");
        let narrated = join_url(base, &narrated_path)?;
        let fallback = join_url(base, original)?;

        let mut candidates = vec![narrated.clone()];
        if fallback != narrated {
            candidates.push(fallback);
        }

        Ok(Self {
            logical: stem,
            candidates,
            source: Some(narrated),
        })
    }

    pub fn logical(&self) -> &str {
        &self.logical
    }

    pub fn candidates(&self) -> &[Url] {
        &self.candidates
    }

    /// URL used when the clip is downloaded instead of streamed.
    pub fn source_url(&self) -> Option<&Url> {
        self.source.as_ref().or_else(|| self.candidates.first())
    }

    /// Stable cache file name for this reference.
    ///
    /// Readable stem plus a hash of the logical name, so distinct
    /// references that sanitize alike never share a file.
    pub fn cache_file_name(&self) -> String {
        let readable: String = self
            .logical
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .take(MAX_STEM_CHARS)
            .collect();
        let digest = Sha256::digest(self.logical.as_bytes());
        let short: String = digest.iter().take(4).map(|b| format!("{b:02x}")).collect();
        format!("{readable}-{short}{EXTENSION}")
    }
}

/// Join a relative path onto `base`, one encoded segment per path component.
fn join_url(base: &Url, relative: &str) -> Result<Url, PlaybackError> {
    join_segments(base, relative.split('/'))
        .map_err(|e| PlaybackError::InvalidReference(format!("audio path '{relative}': {e}")))
}
