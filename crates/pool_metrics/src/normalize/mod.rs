//! Field extraction and numeric coercion for provider payloads.

mod pool;
mod series;

pub use pool::{multi_pool_metrics, pool_metrics};
pub use series::{ohlcv_candles, tvl_points};

use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

#[derive(Error, Debug, PartialEq)]
pub enum NormalizeError {
    #[error("missing key: {0}")]
    MissingKey(&'static str),
    #[error("invalid number in {field}: {value}")]
    InvalidNumber { field: &'static str, value: String },
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
    #[error("invalid row: {0}")]
    InvalidRow(String),
}

impl NormalizeError {
    /// True when the payload lacks the expected structure, as opposed to
    /// carrying a value that failed coercion.
    pub fn is_missing(&self) -> bool {
        matches!(self, NormalizeError::MissingKey(_))
    }
}

/// JSON number or numeric string to f64.
pub fn coerce_f64(field: &'static str, value: &Value) -> Result<f64, NormalizeError> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| NormalizeError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}

/// Coerce `obj[key]`; an absent key counts as zero.
pub(crate) fn number_or_zero(obj: &Value, key: &'static str) -> Result<f64, NormalizeError> {
    obj.get(key).map_or(Ok(0.0), |v| coerce_f64(key, v))
}

/// Unix seconds (integer, float, or integer string) plus the UTC datetime.
pub fn coerce_timestamp(value: &Value) -> Result<(i64, OffsetDateTime), NormalizeError> {
    let secs = match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.abs() < i64::MAX as f64)
                .map(|f| f.trunc() as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
    .ok_or_else(|| NormalizeError::InvalidTimestamp(value.to_string()))?;
    let datetime = OffsetDateTime::from_unix_timestamp(secs)
        .map_err(|e| NormalizeError::InvalidTimestamp(e.to_string()))?;
    Ok((secs, datetime))
}
