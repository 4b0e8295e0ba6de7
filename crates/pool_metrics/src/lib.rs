//! pool_metrics — DEX liquidity-pool metrics from GeckoTerminal and YieldSamurai.
//!
//! Rate-limited HTTP clients that reshape provider payloads into flat records
//! (TVL, 24h volume, OHLCV candles, TVL history). Fetch failures degrade to
//! "no data" instead of errors.

pub mod http;
pub mod normalize;
pub mod providers;
pub mod records;

pub use http::{ClientConfig, Executor, FetchError, RateLimiter};
pub use normalize::NormalizeError;
pub use providers::{
    provider_network, GeckoTerminalClient, OhlcvQuery, TvlQuery, YieldSamuraiClient,
};
pub use records::{OhlcvCandle, PoolMetrics, TvlPoint};
