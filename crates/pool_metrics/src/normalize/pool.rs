//! GeckoTerminal pool attributes → `PoolMetrics`.

use super::{number_or_zero, NormalizeError};
use crate::records::PoolMetrics;
use serde_json::Value;
use tracing::warn;

/// Single-pool response: `data.attributes.{reserve_in_usd, volume_usd.h24}`.
/// Network and pool address are echoed from the request.
pub fn pool_metrics(
    payload: &Value,
    network: &str,
    pool_address: &str,
    fetch_timestamp: i64,
) -> Result<PoolMetrics, NormalizeError> {
    let attributes = payload
        .get("data")
        .and_then(|d| d.get("attributes"))
        .filter(|a| a.is_object())
        .ok_or(NormalizeError::MissingKey("data.attributes"))?;
    from_attributes(attributes, network, pool_address, fetch_timestamp)
}

/// Batch response: `data` is a list of pool objects. Entries that fail
/// coercion are logged and skipped.
pub fn multi_pool_metrics(
    payload: &Value,
    network: &str,
    fetch_timestamp: i64,
) -> Result<Vec<PoolMetrics>, NormalizeError> {
    let entries = payload
        .get("data")
        .and_then(Value::as_array)
        .ok_or(NormalizeError::MissingKey("data"))?;
    let mut out = Vec::with_capacity(entries.len());
    for entry in entries {
        match batch_entry(entry, network, fetch_timestamp) {
            Ok(metrics) => out.push(metrics),
            Err(e) => warn!(%network, error = %e, "skipping malformed pool entry"),
        }
    }
    Ok(out)
}

/// An entry without `attributes` counts as an empty attribute set; anything
/// else that is not an object is a malformed row.
fn batch_entry(
    entry: &Value,
    network: &str,
    fetch_timestamp: i64,
) -> Result<PoolMetrics, NormalizeError> {
    if !entry.is_object() {
        return Err(NormalizeError::InvalidRow(entry.to_string()));
    }
    let empty = Value::Object(Default::default());
    let attributes = match entry.get("attributes") {
        None => &empty,
        Some(a @ Value::Object(_)) => a,
        Some(_) => return Err(NormalizeError::InvalidRow(entry.to_string())),
    };
    let pool_address = match attributes.get("address") {
        None => "",
        Some(Value::String(s)) => s.as_str(),
        Some(_) => return Err(NormalizeError::InvalidRow(entry.to_string())),
    };
    from_attributes(attributes, network, pool_address, fetch_timestamp)
}

fn from_attributes(
    attributes: &Value,
    network: &str,
    pool_address: &str,
    fetch_timestamp: i64,
) -> Result<PoolMetrics, NormalizeError> {
    let tvl_usd = number_or_zero(attributes, "reserve_in_usd")?;
    let volume_24h_usd = match attributes.get("volume_usd") {
        None => 0.0,
        Some(v @ Value::Object(_)) => number_or_zero(v, "h24")?,
        Some(other) => {
            return Err(NormalizeError::InvalidNumber {
                field: "volume_usd",
                value: other.to_string(),
            })
        }
    };
    Ok(PoolMetrics {
        network: network.to_string(),
        pool_address: pool_address.to_string(),
        tvl_usd,
        volume_24h_usd,
        fetch_timestamp,
    })
}
