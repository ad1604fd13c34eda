//! On-disk cache of downloaded clips.
//!
//! Files are keyed by [`AudioReference::cache_file_name`](super::AudioReference::cache_file_name)
//! and never evicted here; the directory's owner decides their lifetime.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OwnedMutexGuard;
use tracing::debug;
use uuid::Uuid;

use super::error::PlaybackError;

type KeyLock = Arc<tokio::sync::Mutex<()>>;

#[derive(Debug)]
pub struct AudioCache {
    dir: PathBuf,
    in_flight: Mutex<HashMap<String, KeyLock>>,
}

impl AudioCache {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, file_name: &str) -> PathBuf {
        self.dir.join(file_name)
    }

    /// Path of a non-empty cached file, if present.
    pub async fn lookup(&self, file_name: &str) -> Option<PathBuf> {
        let path = self.path_for(file_name);
        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() && meta.len() > 0 => Some(path),
            _ => None,
        }
    }

    /// Serialize work on one key across concurrent invocations.
    pub async fn lock(&self, file_name: &str) -> KeyGuard<'_> {
        let lock = {
            let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
            in_flight
                .entry(file_name.to_string())
                .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
                .clone()
        };
        let guard = lock.lock_owned().await;
        KeyGuard {
            cache: self,
            key: file_name.to_string(),
            guard: Some(guard),
        }
    }

    /// Write `bytes` under `file_name` atomically and return the final path.
    pub async fn store(&self, file_name: &str, bytes: &[u8]) -> Result<PathBuf, PlaybackError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(PlaybackError::CacheWrite)?;

        let path = self.path_for(file_name);
        let staging = self
            .dir
            .join(format!(".{file_name}.{}.part", Uuid::new_v4().simple()));

        if let Err(err) = tokio::fs::write(&staging, bytes).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(PlaybackError::CacheWrite(err));
        }
        if let Err(err) = tokio::fs::rename(&staging, &path).await {
            let _ = tokio::fs::remove_file(&staging).await;
            return Err(PlaybackError::CacheWrite(err));
        }

        debug!(path = %path.display(), bytes = bytes.len(), "Cached clip");
        Ok(path)
    }

    /// Keys currently locked or awaited.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn release(&self, key: &str) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        let idle = in_flight
            .get(key)
            .is_some_and(|lock| Arc::strong_count(lock) == 1);
        if idle {
            in_flight.remove(key);
        }
    }
}

/// Exclusive hold on one cache key; released on drop.
pub struct KeyGuard<'a> {
    cache: &'a AudioCache,
    key: String,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.cache.release(&self.key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;

    #[tokio::test]
    async fn store_then_lookup() {
        let dir = TempDir::new().unwrap();
        let cache = AudioCache::new(dir.path().join("audio_cache"));

        assert!(cache.lookup("maria-0a1b2c3d.mp3").await.is_none());
        let path = cache.store("maria-0a1b2c3d.mp3", b"ID3data").await.unwrap();

        assert_eq!(cache.lookup("maria-0a1b2c3d.mp3").await, Some(path.clone()));
        assert_eq!(std::fs::read(path).unwrap(), b"ID3data");
    }

    #[tokio::test]
    async fn store_leaves_no_staging_files() {
        let dir = TempDir::new().unwrap();
        let cache = AudioCache::new(dir.path());
        cache.store("a.mp3", b"1").await.unwrap();
        cache.store("a.mp3", b"22").await.unwrap();

        let names: Vec<String> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.mp3".to_string()]);
        assert_eq!(std::fs::read(dir.path().join("a.mp3")).unwrap(), b"22");
    }

    #[tokio::test]
    async fn empty_files_are_not_hits() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("empty.mp3"), b"").unwrap();
        let cache = AudioCache::new(dir.path());
        assert!(cache.lookup("empty.mp3").await.is_none());
    }

    #[tokio::test]
    async fn store_into_unwritable_location_fails() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, b"file").unwrap();
        let cache = AudioCache::new(&blocker);

        let err = cache.store("x.mp3", b"1").await.unwrap_err();
        assert!(matches!(err, PlaybackError::CacheWrite(_)));
    }

    #[tokio::test]
    async fn key_lock_serializes_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let cache = Arc::new(AudioCache::new(dir.path()));

        let first = cache.lock("k.mp3").await;
        let waiter = {
            let cache = cache.clone();
            tokio::spawn(async move {
                let _guard = cache.lock("k.mp3").await;
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        waiter.await.unwrap();
        assert_eq!(cache.in_flight_count(), 0);
    }
}
