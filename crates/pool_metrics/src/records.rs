//! Flat records produced by the normalizers. Owned by the caller.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// TVL and 24h volume for one pool at fetch time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PoolMetrics {
    pub network: String,
    pub pool_address: String,
    pub tvl_usd: f64,
    pub volume_24h_usd: f64,
    /// Unix seconds when the record was built.
    pub fetch_timestamp: i64,
}

/// One OHLCV bucket, in upstream order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OhlcvCandle {
    pub timestamp: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TvlPoint {
    pub timestamp: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub datetime: OffsetDateTime,
    pub tvl_usd: f64,
}
