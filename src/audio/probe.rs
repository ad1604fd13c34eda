//! Existence probes and direct downloads for remote clips.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use tracing::debug;

use super::error::PlaybackError;

/// Check that `url` serves something, without downloading it.
///
/// Tries `HEAD` first. Servers that fail `HEAD` at the transport level or
/// reject the method get a `GET` instead; only its status is inspected.
pub async fn probe(http: &Client, url: &Url, timeout: Duration) -> Result<(), PlaybackError> {
    let head = tokio::time::timeout(timeout, http.head(url.clone()).send()).await;
    match head {
        Ok(Ok(response)) if response.status().is_success() => Ok(()),
        Ok(Ok(response)) if method_unsupported(response.status()) => {
            debug!(url = %url, status = response.status().as_u16(), "HEAD rejected, probing with GET");
            probe_with_get(http, url, timeout).await
        }
        Ok(Ok(response)) => Err(probe_error(url, format!("HEAD status {}", response.status()))),
        Ok(Err(err)) => {
            debug!(url = %url, error = %err, "HEAD failed, probing with GET");
            probe_with_get(http, url, timeout).await
        }
        Err(_) => {
            debug!(url = %url, "HEAD timed out, probing with GET");
            probe_with_get(http, url, timeout).await
        }
    }
}

async fn probe_with_get(http: &Client, url: &Url, timeout: Duration) -> Result<(), PlaybackError> {
    match tokio::time::timeout(timeout, http.get(url.clone()).send()).await {
        Ok(Ok(response)) if response.status().is_success() => Ok(()),
        Ok(Ok(response)) => Err(probe_error(url, format!("GET status {}", response.status()))),
        Ok(Err(err)) => Err(probe_error(url, err.to_string())),
        Err(_) => Err(probe_error(
            url,
            format!("GET timed out after {}ms", timeout.as_millis()),
        )),
    }
}

/// Download the whole clip into memory.
pub async fn fetch_bytes(
    http: &Client,
    url: &Url,
    timeout: Duration,
) -> Result<Vec<u8>, PlaybackError> {
    let download = async {
        let response = http.get(url.clone()).send().await.map_err(|e| fetch_error(url, e))?;
        let status = response.status();
        if !status.is_success() {
            return Err(PlaybackError::Fetch {
                url: url.to_string(),
                reason: format!("status {status}"),
            });
        }
        let bytes = response.bytes().await.map_err(|e| fetch_error(url, e))?;
        Ok(bytes.to_vec())
    };

    let bytes = match tokio::time::timeout(timeout, download).await {
        Ok(result) => result?,
        Err(_) => {
            return Err(PlaybackError::Fetch {
                url: url.to_string(),
                reason: format!("timed out after {}ms", timeout.as_millis()),
            })
        }
    };
    if bytes.is_empty() {
        return Err(PlaybackError::Fetch {
            url: url.to_string(),
            reason: "empty body".to_string(),
        });
    }
    debug!(url = %url, bytes = bytes.len(), "Fetched clip");
    Ok(bytes)
}

fn method_unsupported(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED
    )
}

fn probe_error(url: &Url, reason: String) -> PlaybackError {
    PlaybackError::Probe {
        url: url.to_string(),
        reason,
    }
}

fn fetch_error(url: &Url, err: reqwest::Error) -> PlaybackError {
    PlaybackError::Fetch {
        url: url.to_string(),
        reason: err.to_string(),
    }
}
