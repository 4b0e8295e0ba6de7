//! Rate-limited GET executor. Failures are logged and collapse to an empty object.

use crate::http::rate_limit::RateLimiter;
use reqwest::header::HeaderMap;
use serde_json::{Map, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

pub const GECKO_TERMINAL_URL: &str = "https://api.geckoterminal.com/api/v2";
pub const YIELD_SAMURAI_URL: &str = "https://api.yieldsamurai.com/v1";
const GECKO_TERMINAL_CALLS_PER_MINUTE: usize = 30;
const YIELD_SAMURAI_CALLS_PER_MINUTE: usize = 10;
const TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct ClientConfig {
    pub base_url: String,
    pub calls_per_minute: usize,
    pub timeout_secs: u64,
}

impl ClientConfig {
    /// GeckoTerminal public API: 30 calls per minute.
    pub fn gecko_terminal() -> Self {
        Self {
            base_url: GECKO_TERMINAL_URL.to_string(),
            calls_per_minute: GECKO_TERMINAL_CALLS_PER_MINUTE,
            timeout_secs: TIMEOUT_SECS,
        }
    }

    /// YieldSamurai API at the demo tier limit of 10 calls per minute.
    pub fn yield_samurai() -> Self {
        Self {
            base_url: YIELD_SAMURAI_URL.to_string(),
            calls_per_minute: YIELD_SAMURAI_CALLS_PER_MINUTE,
            timeout_secs: TIMEOUT_SECS,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("api error: status {0} body {1}")]
    Api(u16, String),
    #[error("decode: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("invalid header: {0}")]
    Header(#[from] reqwest::header::InvalidHeaderValue),
}

/// One HTTP session plus its own call window.
pub struct Executor {
    base_url: String,
    client: reqwest::Client,
    limiter: RateLimiter,
    request_count: AtomicU64,
}

impl Executor {
    /// Build the session with `headers` attached to every request.
    pub fn new(config: &ClientConfig, headers: HeaderMap) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()?;
        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            limiter: RateLimiter::per_minute(config.calls_per_minute),
            request_count: AtomicU64::new(0),
        })
    }

    /// GET `endpoint` (relative to the base URL). Returns the decoded body, or
    /// an empty object when the request fails for any reason.
    pub async fn get(&self, endpoint: &str, params: &[(&str, String)]) -> Value {
        match self.try_get(endpoint, params).await {
            Ok(body) => body,
            Err(e) => {
                warn!(%endpoint, error = %e, "request failed");
                Value::Object(Map::new())
            }
        }
    }

    async fn try_get(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<Value, FetchError> {
        self.limiter.acquire().await;
        let url = format!("{}{}", self.base_url, endpoint);
        debug!(%url, ?params, "GET");
        self.request_count.fetch_add(1, Ordering::Relaxed);
        let res = self.client.get(&url).query(params).send().await?;
        let status = res.status();
        let body = res.text().await?;
        if !status.is_success() {
            return Err(FetchError::Api(status.as_u16(), body));
        }
        Ok(serde_json::from_str(&body)?)
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    /// Requests dispatched so far, successful or not.
    pub fn request_count(&self) -> u64 {
        self.request_count.load(Ordering::Relaxed)
    }
}
