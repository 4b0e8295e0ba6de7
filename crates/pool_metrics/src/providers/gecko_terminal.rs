//! GeckoTerminal client: pool TVL/volume (single and batched) and OHLCV candles.

use crate::http::{ClientConfig, Executor, FetchError};
use crate::normalize::{self, NormalizeError};
use crate::records::{OhlcvCandle, PoolMetrics};
use reqwest::header::HeaderMap;
use time::OffsetDateTime;
use tracing::{info, warn};
use urlencoding::encode;

/// Addresses per `/pools/multi` request. Longer lists are split into
/// consecutive requests so the URL stays within provider limits.
pub const MAX_MULTI_POOL_BATCH: usize = 30;
const MAX_OHLCV_LIMIT: u32 = 1000;

/// Map a caller-facing network id to GeckoTerminal's id for OHLCV paths.
pub fn provider_network(network: &str) -> &str {
    match network {
        "ethereum" => "eth",
        other => other,
    }
}

/// OHLCV request parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OhlcvQuery {
    /// Bucket size: "day", "hour" or "minute".
    pub timeframe: String,
    /// Buckets merged per candle.
    pub aggregate: u32,
    /// Only candles before this Unix time; `None` or 0 means latest.
    pub before_timestamp: Option<i64>,
    /// Rows requested; clamped to 1000.
    pub limit: u32,
    pub currency: String,
    /// "base" or "quote" token of the pool.
    pub token: String,
}

impl Default for OhlcvQuery {
    fn default() -> Self {
        Self {
            timeframe: "day".to_string(),
            aggregate: 1,
            before_timestamp: None,
            limit: 100,
            currency: "usd".to_string(),
            token: "base".to_string(),
        }
    }
}

impl OhlcvQuery {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("aggregate", self.aggregate.to_string()),
            ("limit", self.limit.min(MAX_OHLCV_LIMIT).to_string()),
            ("currency", self.currency.clone()),
            ("token", self.token.clone()),
        ];
        if let Some(before) = self.before_timestamp.filter(|&t| t != 0) {
            params.push(("before_timestamp", before.to_string()));
        }
        params
    }
}

pub struct GeckoTerminalClient {
    executor: Executor,
}

impl GeckoTerminalClient {
    pub fn new() -> Result<Self, FetchError> {
        Self::with_config(ClientConfig::gecko_terminal())
    }

    pub fn with_config(config: ClientConfig) -> Result<Self, FetchError> {
        Ok(Self {
            executor: Executor::new(&config, HeaderMap::new())?,
        })
    }

    /// TVL and 24h volume for one pool. `None` when the pool is not found,
    /// the request fails, or the payload cannot be coerced.
    pub async fn pool_metrics(&self, network: &str, pool_address: &str) -> Option<PoolMetrics> {
        let endpoint = format!("/networks/{}/pools/{}", encode(network), encode(pool_address));
        let payload = self.executor.get(&endpoint, &[]).await;
        let now = OffsetDateTime::now_utc().unix_timestamp();
        normalize::pool_metrics(&payload, network, pool_address, now)
            .inspect_err(|e| report(e, network, pool_address, "pool metrics"))
            .ok()
    }

    /// TVL and 24h volume for many pools on one network. Malformed entries
    /// are skipped; a failed batch contributes nothing.
    pub async fn multi_pool_metrics<S: AsRef<str>>(
        &self,
        network: &str,
        pool_addresses: &[S],
    ) -> Vec<PoolMetrics> {
        let mut results = Vec::with_capacity(pool_addresses.len());
        for batch in pool_addresses.chunks(MAX_MULTI_POOL_BATCH) {
            let joined = batch
                .iter()
                .map(|a| encode(a.as_ref()).into_owned())
                .collect::<Vec<_>>()
                .join(",");
            let endpoint = format!("/networks/{}/pools/multi/{}", encode(network), joined);
            let payload = self.executor.get(&endpoint, &[]).await;
            let now = OffsetDateTime::now_utc().unix_timestamp();
            match normalize::multi_pool_metrics(&payload, network, now) {
                Ok(metrics) => results.extend(metrics),
                Err(e) => {
                    warn!(%network, batch = batch.len(), error = %e, "no data found for pools")
                }
            }
        }
        info!(
            %network,
            requested = pool_addresses.len(),
            returned = results.len(),
            "multi pool metrics"
        );
        results
    }

    /// OHLCV candles for one pool, in upstream order. `None` distinguishes
    /// "not found" from an empty series.
    pub async fn pool_ohlcv(
        &self,
        network: &str,
        pool_address: &str,
        query: &OhlcvQuery,
    ) -> Option<Vec<OhlcvCandle>> {
        let network = provider_network(network);
        let endpoint = format!(
            "/networks/{}/pools/{}/ohlcv/{}",
            encode(network),
            encode(pool_address),
            encode(&query.timeframe)
        );
        let payload = self.executor.get(&endpoint, &query.params()).await;
        normalize::ohlcv_candles(&payload)
            .inspect_err(|e| report(e, network, pool_address, "OHLCV"))
            .ok()
    }

    pub fn request_count(&self) -> u64 {
        self.executor.request_count()
    }
}

fn report(err: &NormalizeError, network: &str, pool_address: &str, what: &str) {
    if err.is_missing() {
        warn!(%network, %pool_address, error = %err, "no {what} data found");
    } else {
        warn!(%network, %pool_address, error = %err, "error processing {what}");
    }
}
