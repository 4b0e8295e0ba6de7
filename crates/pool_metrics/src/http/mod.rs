//! Request execution and rate limiting shared by the provider clients.

mod fetch;
mod rate_limit;

pub use fetch::{ClientConfig, Executor, FetchError, GECKO_TERMINAL_URL, YIELD_SAMURAI_URL};
pub use rate_limit::RateLimiter;
