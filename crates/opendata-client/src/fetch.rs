//! GET an open-data endpoint and return the raw body.
//!
//! The HTTP path does no parsing and no retries. Status handling:
//! - 403 becomes `AccessDenied`, so callers can say something actionable
//! - any other non-2xx becomes `UnexpectedStatus`
//! - a 2xx with an empty body becomes `NoData`
//! - connection, DNS, timeout and body-read failures become `Transport`

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, StatusCode, Url};
use tracing::{debug, instrument, warn};

use crate::config::OpenDataConfig;
use crate::error::FetchError;

/// Something that can GET a URL.
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError>;
}

/// Parse and percent-encode a URL.
///
/// Characters that are not allowed in a query (spaces, quotes, `<`, `>`,
/// `#`) are escaped rather than rejected. Only a structurally broken URL, or
/// one that is not http(s), is refused.
pub fn parse_url(raw: &str) -> Result<Url, FetchError> {
    let escaped = escape_query_hash(raw.trim());
    let url = Url::parse(&escaped).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::InvalidUrl {
            url: raw.to_string(),
            reason: format!("unsupported scheme '{}'", other),
        }),
    }
}

/// A `#` after the `?` is query text, not the start of a fragment.
fn escape_query_hash(raw: &str) -> Cow<'_, str> {
    match raw.split_once('?') {
        Some((base, query)) if !base.contains('#') && query.contains('#') => {
            Cow::Owned(format!("{}?{}", base, query.replace('#', "%23")))
        }
        _ => Cow::Borrowed(raw),
    }
}

/// reqwest-backed fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Build a fetcher using the timeouts and user agent from `config`.
    pub fn new(config: &OpenDataConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(config.user_agent.clone())
            .pool_max_idle_per_host(2)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Fetch for HttpFetcher {
    #[instrument(skip(self), fields(url = %url))]
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        let parsed = parse_url(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        if status == StatusCode::FORBIDDEN {
            warn!(status = status.as_u16(), "Endpoint refused access");
            return Err(FetchError::AccessDenied {
                url: url.to_string(),
            });
        }
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        if body.is_empty() {
            return Err(FetchError::NoData {
                url: url.to_string(),
            });
        }

        debug!(bytes = body.len(), status = status.as_u16(), "Fetched response body");
        Ok(body)
    }
}

/// Canned answer for [`StaticFetcher`].
#[derive(Debug, Clone)]
pub enum StaticResponse {
    /// 200 with this body (an empty body still maps to `NoData`).
    Body(Bytes),
    /// Bodyless answer with this status code.
    Status(u16),
}

/// In-memory fetcher that answers from a fixed table.
///
/// Unknown URLs answer 404. Every request is recorded, including ones that
/// fail, so callers can check which endpoints were hit and in what order.
#[derive(Debug, Default)]
pub struct StaticFetcher {
    responses: HashMap<String, StaticResponse>,
    delay: Option<Duration>,
    requests: Mutex<Vec<String>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `url` with a 200 and `body`.
    pub fn with_body(mut self, url: &str, body: impl Into<Bytes>) -> Self {
        self.responses
            .insert(url.to_string(), StaticResponse::Body(body.into()));
        self
    }

    /// Answer `url` with a bare status code.
    pub fn with_status(mut self, url: &str, status: u16) -> Self {
        self.responses
            .insert(url.to_string(), StaticResponse::Status(status));
        self
    }

    /// Sleep this long before answering each request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// URLs requested so far, in order.
    pub fn requests(&self) -> Vec<String> {
        match self.requests.lock() {
            Ok(requests) => requests.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn record(&self, url: &str) {
        match self.requests.lock() {
            Ok(mut requests) => requests.push(url.to_string()),
            Err(poisoned) => poisoned.into_inner().push(url.to_string()),
        }
    }
}

#[async_trait]
impl Fetch for StaticFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.record(url);
        parse_url(url)?;

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        match self.responses.get(url) {
            Some(StaticResponse::Body(body)) if body.is_empty() => Err(FetchError::NoData {
                url: url.to_string(),
            }),
            Some(StaticResponse::Body(body)) => Ok(body.clone()),
            Some(StaticResponse::Status(403)) => Err(FetchError::AccessDenied {
                url: url.to_string(),
            }),
            Some(StaticResponse::Status(status)) if (200..300).contains(status) => {
                Err(FetchError::NoData {
                    url: url.to_string(),
                })
            }
            Some(StaticResponse::Status(status)) => Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status: *status,
            }),
            None => Err(FetchError::UnexpectedStatus {
                url: url.to_string(),
                status: 404,
            }),
        }
    }
}
