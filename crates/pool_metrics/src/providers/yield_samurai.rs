//! YieldSamurai client: historical TVL for one pool on one chain.

use crate::http::{ClientConfig, Executor, FetchError};
use crate::normalize;
use crate::records::TvlPoint;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use tracing::{info, warn};
use urlencoding::encode;

/// Longest history the demo tier serves.
const MAX_HISTORY_DAYS: u32 = 7;
const DEMO_AUTHORIZATION: &str = "demo";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TvlQuery {
    /// Days of history; clamped to 7.
    pub days: u32,
    /// Sampling interval, e.g. "hourly" or "daily".
    pub interval: String,
}

impl Default for TvlQuery {
    fn default() -> Self {
        Self {
            days: MAX_HISTORY_DAYS,
            interval: "hourly".to_string(),
        }
    }
}

impl TvlQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        vec![
            ("days", self.days.min(MAX_HISTORY_DAYS).to_string()),
            ("interval", self.interval.clone()),
        ]
    }
}

pub struct YieldSamuraiClient {
    executor: Executor,
}

impl YieldSamuraiClient {
    /// Without an API key the client authenticates with the demo token.
    pub fn new(api_key: Option<&str>) -> Result<Self, FetchError> {
        Self::with_config(ClientConfig::yield_samurai(), api_key)
    }

    pub fn with_config(config: ClientConfig, api_key: Option<&str>) -> Result<Self, FetchError> {
        Ok(Self {
            executor: Executor::new(&config, auth_headers(api_key)?)?,
        })
    }

    /// Historical TVL points. `None` when the response has no `records` or a record
    /// could not be coerced; `Some(vec![])` when the provider sent none.
    pub async fn tvl_history(
        &self,
        chain: &str,
        pool_address: &str,
        query: &TvlQuery,
    ) -> Option<Vec<TvlPoint>> {
        let endpoint = format!("/pools/{}/{}/historical", encode(chain), encode(pool_address));
        let payload = self.executor.get(&endpoint, &query.params()).await;
        match normalize::tvl_points(&payload) {
            Ok(points) => {
                info!(%chain, %pool_address, points = points.len(), "tvl history");
                Some(points)
            }
            Err(e) if e.is_missing() => {
                warn!(%chain, %pool_address, error = %e, "no TVL data found");
                None
            }
            Err(e) => {
                warn!(%chain, %pool_address, error = %e, "error processing TVL data");
                None
            }
        }
    }

    pub fn request_count(&self) -> u64 {
        self.executor.request_count()
    }
}

fn auth_headers(api_key: Option<&str>) -> Result<HeaderMap, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    let mut auth = match api_key.filter(|k| !k.is_empty()) {
        Some(key) => HeaderValue::from_str(&format!("Bearer {key}"))?,
        None => HeaderValue::from_static(DEMO_AUTHORIZATION),
    };
    auth.set_sensitive(true);
    headers.insert(AUTHORIZATION, auth);
    Ok(headers)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn days_clamped_to_demo_limit() {
        let query = TvlQuery {
            days: 30,
            interval: "daily".to_string(),
        };
        assert_eq!(
            query.params(),
            [("days", "7".to_string()), ("interval", "daily".to_string())]
        );
        let short = TvlQuery {
            days: 3,
            ..Default::default()
        };
        assert_eq!(short.params()[0], ("days", "3".to_string()));
    }

    #[test]
    fn bearer_token_when_key_given() {
        let headers = auth_headers(Some("k123")).unwrap();
        assert_eq!(headers[AUTHORIZATION], "Bearer k123");
        assert_eq!(headers[ACCEPT], "application/json");
    }

    #[test]
    fn demo_token_without_key() {
        assert_eq!(auth_headers(None).unwrap()[AUTHORIZATION], "demo");
        assert_eq!(auth_headers(Some("")).unwrap()[AUTHORIZATION], "demo");
    }

    #[test]
    fn key_with_newline_is_rejected() {
        assert!(matches!(
            auth_headers(Some("bad\nkey")),
            Err(FetchError::Header(_))
        ));
    }
}
