//! REST client for the loft management backend.
//!
//! Endpoints:
//! - `GET {base_url}/birds?identifier={query}` - JSON array of bird records
//! - `GET {base_url}/birds/{identifier}/competitions` - JSON array of results
//!
//! A `404` from either endpoint means "nothing there" and is returned as an empty
//! list. Transport failures, timeouts, `429` and `5xx` responses are retried with
//! exponential backoff; everything else fails immediately.

use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::debug;

use super::{BirdLookup, LookupError, LookupFuture};
use crate::config::LookupConfig;
use crate::constants::{
    DEFAULT_LOOKUP_RETRIES, DEFAULT_LOOKUP_TIMEOUT_SECS, MAX_RETRY_DELAY_MS, STARTING_RETRY_DELAY_MS,
};
use crate::core::PedigreeError;
use crate::models::{BirdRef, CompetitionResult};

/// Lookup service client for the REST backend.
#[derive(Debug, Clone)]
pub struct HttpBirdLookup {
    client: Client,
    base_url: Url,
    token: Option<String>,
    timeout: Duration,
    retries: usize,
}

impl HttpBirdLookup {
    /// Create a client for the service rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`PedigreeError::ConfigError`] if `base_url` is not an absolute
    /// `http`/`https` URL.
    pub fn new(base_url: &str) -> Result<Self, PedigreeError> {
        let base_url = Url::parse(base_url.trim()).map_err(|e| PedigreeError::ConfigError {
            message: format!("invalid lookup base_url '{base_url}': {e}"),
        })?;

        if base_url.cannot_be_a_base() || !matches!(base_url.scheme(), "http" | "https") {
            return Err(PedigreeError::ConfigError {
                message: format!("lookup base_url must be an http(s) URL, got '{base_url}'"),
            });
        }

        Ok(Self {
            client: Client::new(),
            base_url,
            token: None,
            timeout: Duration::from_secs(DEFAULT_LOOKUP_TIMEOUT_SECS),
            retries: DEFAULT_LOOKUP_RETRIES,
        })
    }

    /// Create a client from the `[lookup]` section of the configuration.
    pub fn from_config(config: &LookupConfig) -> Result<Self, PedigreeError> {
        let base_url = config.base_url.as_deref().ok_or_else(|| PedigreeError::ConfigError {
            message: "no lookup base_url configured".to_string(),
        })?;

        Ok(Self::new(base_url)?
            .with_token(config.token.clone())
            .with_timeout(Duration::from_secs(config.timeout_secs))
            .with_retries(config.retries))
    }

    /// Send `Authorization: Bearer <token>` with every request.
    #[must_use]
    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.trim().is_empty());
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Number of retries after the first attempt for transient failures.
    #[must_use]
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Base URLs are validated in `new`, so path segments are always available
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T>(&self, url: Url) -> Result<Option<T>, LookupError>
    where
        T: DeserializeOwned,
    {
        let strategy = ExponentialBackoff::from_millis(STARTING_RETRY_DELAY_MS)
            .max_delay(Duration::from_millis(MAX_RETRY_DELAY_MS))
            .factor(2)
            .take(self.retries);

        RetryIf::spawn(strategy, || self.get_once(url.clone()), LookupError::is_transient).await
    }

    async fn get_once<T>(&self, url: Url) -> Result<Option<T>, LookupError>
    where
        T: DeserializeOwned,
    {
        debug!("GET {}", url);

        let mut request = self.client.get(url.clone()).timeout(self.timeout);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| self.classify(&url, &e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(LookupError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        response.json::<T>().await.map(Some).map_err(|e| {
            if e.is_timeout() {
                self.classify(&url, &e)
            } else {
                LookupError::Decode {
                    url: url.to_string(),
                    reason: e.to_string(),
                }
            }
        })
    }

    fn classify(&self, url: &Url, error: &reqwest::Error) -> LookupError {
        if error.is_timeout() {
            LookupError::Timeout {
                url: url.to_string(),
                after_secs: self.timeout.as_secs(),
            }
        } else {
            LookupError::Transport {
                url: url.to_string(),
                reason: error.to_string(),
            }
        }
    }
}

impl BirdLookup for HttpBirdLookup {
    fn find_by_identifier<'a>(&'a self, query: &'a str) -> LookupFuture<'a, Vec<BirdRef>> {
        Box::pin(async move {
            let mut url = self.endpoint(&["birds"]);
            url.query_pairs_mut().append_pair("identifier", query.trim());
            Ok(self.get_json::<Vec<BirdRef>>(url).await?.unwrap_or_default())
        })
    }

    fn competition_history<'a>(
        &'a self,
        identifier: &'a str,
    ) -> LookupFuture<'a, Vec<CompetitionResult>> {
        Box::pin(async move {
            let url = self.endpoint(&["birds", identifier.trim(), "competitions"]);
            Ok(self.get_json::<Vec<CompetitionResult>>(url).await?.unwrap_or_default())
        })
    }
}
