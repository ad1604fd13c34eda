//! Typed HTTP client for the Acima backend.
//!
//! Every call goes through [`ApiClient::get`] or [`ApiClient::post`], which
//! bound the request with the configured timeout and normalize the outcome:
//! 2xx bodies become a [`ResponseBody`], everything else an [`ApiError`].

pub mod endpoints;
pub mod http;

pub use http::{extract_error_message, normalize_response, ResponseBody};

use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use reqwest::{Method, Url};
use serde::Serialize;
use tracing::debug;

use crate::config::{parse_base_url, ApiConfig};
use crate::error::ApiError;
use crate::util::timeout::with_timeout;
use crate::util::url::join_segments;

/// Immutable view of the active configuration plus its transport.
#[derive(Debug)]
struct Connection {
    config: ApiConfig,
    base_url: Url,
    http: reqwest::Client,
}

impl Connection {
    fn open(config: ApiConfig) -> Result<Self, ApiError> {
        config.validate()?;
        let base_url = parse_base_url(&config.base_url)?;
        let http = reqwest::Client::builder()
            .connect_timeout(config.request_timeout)
            .pool_max_idle_per_host(10)
            .user_agent(concat!("acima/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            config,
            base_url,
            http,
        })
    }

    fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        let path = path.trim();
        if path.contains("://") {
            return Err(ApiError::InvalidArgument(format!(
                "expected a relative route, got '{path}'"
            )));
        }
        self.url_for_segments(path.split('/'))
    }

    fn url_for_segments<'a, I>(&self, segments: I) -> Result<Url, ApiError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        join_segments(&self.base_url, segments)
            .map_err(|e| ApiError::InvalidArgument(format!("invalid route: {e}")))
    }
}

/// Client for the game backend.
///
/// Cloning is cheap and clones share configuration: a
/// [`reconfigure`](Self::reconfigure) on one is seen by all. The pooled
/// transport is released when the last clone (and the last in-flight call
/// holding the previous configuration) is dropped.
#[derive(Debug, Clone)]
pub struct ApiClient {
    active: Arc<RwLock<Arc<Connection>>>,
}

impl ApiClient {
    pub fn new(config: ApiConfig) -> Result<Self, ApiError> {
        let connection = Connection::open(config)?;
        Ok(Self {
            active: Arc::new(RwLock::new(Arc::new(connection))),
        })
    }

    /// Client with default settings pointed at `base_url`.
    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self, ApiError> {
        Self::new(ApiConfig::builder().base_url(base_url).build())
    }

    /// Swap the base address for all future calls.
    ///
    /// Calls already in flight finish against the previous address.
    pub fn reconfigure(&self, base_url: impl Into<String>) -> Result<(), ApiError> {
        let mut config = self.config();
        config.base_url = base_url.into();
        self.reconfigure_with(config)
    }

    /// Replace the whole configuration atomically.
    pub fn reconfigure_with(&self, config: ApiConfig) -> Result<(), ApiError> {
        let connection = Arc::new(Connection::open(config)?);
        let mut active = self.active.write().unwrap_or_else(PoisonError::into_inner);
        debug!(
            from = %active.base_url,
            to = %connection.base_url,
            "Reconfiguring API client"
        );
        *active = connection;
        Ok(())
    }

    pub fn config(&self) -> ApiConfig {
        self.snapshot().config.clone()
    }

    pub fn base_url(&self) -> Url {
        self.snapshot().base_url.clone()
    }

    pub fn timeout(&self) -> Duration {
        self.snapshot().config.request_timeout
    }

    pub(crate) fn grade_max(&self) -> u8 {
        self.snapshot().config.grade_max
    }

    /// Resolve a relative route against the active base address.
    pub fn url_for(&self, path: &str) -> Result<Url, ApiError> {
        self.snapshot().url_for(path)
    }

    /// Shared transport, for callers that fetch non-JSON resources
    /// (audio files) from the same backend.
    pub fn http(&self) -> reqwest::Client {
        self.snapshot().http.clone()
    }

    pub async fn get(&self, path: &str) -> Result<ResponseBody, ApiError> {
        self.execute::<(), _>(Method::GET, |c| c.url_for(path), None)
            .await
    }

    /// `GET` a route built from raw segments, each percent-encoded on its own.
    pub async fn get_segments(&self, segments: &[&str]) -> Result<ResponseBody, ApiError> {
        self.execute::<(), _>(
            Method::GET,
            |c| c.url_for_segments(segments.iter().copied()),
            None,
        )
        .await
    }

    pub async fn post<B>(&self, path: &str, body: &B) -> Result<ResponseBody, ApiError>
    where
        B: Serialize + ?Sized,
    {
        self.execute(Method::POST, |c| c.url_for(path), Some(body))
            .await
    }

    fn snapshot(&self) -> Arc<Connection> {
        self.active
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    async fn execute<B, F>(
        &self,
        method: Method,
        resolve: F,
        body: Option<&B>,
    ) -> Result<ResponseBody, ApiError>
    where
        B: Serialize + ?Sized,
        F: FnOnce(&Connection) -> Result<Url, ApiError>,
    {
        let connection = self.snapshot();
        let url = resolve(&connection)?;
        let timeout = connection.config.request_timeout;

        debug!(method = %method, url = %url, "Sending request");

        let mut request = connection.http.request(method.clone(), url.clone());
        if let Some(body) = body {
            request = request.json(body);
        }

        let result = with_timeout(timeout, async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let text = response.text().await?;
            Ok((status, text))
        })
        .await;

        let (status, text) = match result {
            Ok(pair) => pair,
            Err(err) => {
                debug!(method = %method, url = %url, error = %err, "Request failed before a response");
                return Err(err);
            }
        };

        debug!(method = %method, url = %url, status, bytes = text.len(), "Received response");
        normalize_response(status, &text)
    }
}
