//! Provider clients: GeckoTerminal (pool/market data) and YieldSamurai (TVL history).

mod gecko_terminal;
mod yield_samurai;

pub use gecko_terminal::{provider_network, GeckoTerminalClient, OhlcvQuery, MAX_MULTI_POOL_BATCH};
pub use yield_samurai::{TvlQuery, YieldSamuraiClient};
