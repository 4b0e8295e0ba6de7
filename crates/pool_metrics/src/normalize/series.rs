//! Time series payloads: GeckoTerminal OHLCV and YieldSamurai TVL history.
//!
//! A single bad row invalidates the whole series.

use super::{coerce_f64, coerce_timestamp, NormalizeError};
use crate::records::{OhlcvCandle, TvlPoint};
use serde_json::Value;

/// `data.attributes.ohlcv_list`: rows of `[timestamp, open, high, low, close, volume]`.
pub fn ohlcv_candles(payload: &Value) -> Result<Vec<OhlcvCandle>, NormalizeError> {
    let attributes = payload
        .get("data")
        .and_then(|d| d.get("attributes"))
        .ok_or(NormalizeError::MissingKey("data.attributes"))?;
    let list = attributes
        .get("ohlcv_list")
        .ok_or(NormalizeError::MissingKey("ohlcv_list"))?;
    let rows = list
        .as_array()
        .ok_or_else(|| NormalizeError::InvalidRow(list.to_string()))?;
    rows.iter().map(candle_from_row).collect()
}

fn candle_from_row(row: &Value) -> Result<OhlcvCandle, NormalizeError> {
    let cells = row
        .as_array()
        .filter(|cells| cells.len() >= 6)
        .ok_or_else(|| NormalizeError::InvalidRow(row.to_string()))?;
    let (timestamp, datetime) = coerce_timestamp(&cells[0])?;
    Ok(OhlcvCandle {
        timestamp,
        datetime,
        open: coerce_f64("open", &cells[1])?,
        high: coerce_f64("high", &cells[2])?,
        low: coerce_f64("low", &cells[3])?,
        close: coerce_f64("close", &cells[4])?,
        volume: coerce_f64("volume", &cells[5])?,
    })
}

/// `records`: objects with `timestamp` and `tvl.totalUsd`.
pub fn tvl_points(payload: &Value) -> Result<Vec<TvlPoint>, NormalizeError> {
    let records = payload
        .get("records")
        .ok_or(NormalizeError::MissingKey("records"))?;
    let records = records
        .as_array()
        .ok_or_else(|| NormalizeError::InvalidRow(records.to_string()))?;
    records
        .iter()
        .map(|record| {
            let ts = record
                .get("timestamp")
                .ok_or_else(|| NormalizeError::InvalidRow(record.to_string()))?;
            let total = record
                .get("tvl")
                .and_then(|t| t.get("totalUsd"))
                .ok_or_else(|| NormalizeError::InvalidRow(record.to_string()))?;
            let (timestamp, datetime) = coerce_timestamp(ts)?;
            Ok(TvlPoint {
                timestamp,
                datetime,
                tvl_usd: coerce_f64("tvl.totalUsd", total)?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn ohlcv_rows_keep_upstream_order() {
        let payload = json!({
            "data": {"attributes": {"ohlcv_list": [
                [1700086400, "1.1", 1.3, 1.0, 1.2, 5000],
                [1700000000, 1.0, 1.2, 0.9, 1.1, 4200.5]
            ]}}
        });
        let candles = ohlcv_candles(&payload).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].timestamp, 1_700_086_400);
        assert_eq!(candles[0].open, 1.1);
        assert_eq!(candles[1].volume, 4200.5);
        assert_eq!(candles[1].datetime.unix_timestamp(), 1_700_000_000);
    }

    #[test]
    fn ohlcv_missing_list_is_missing() {
        let err = ohlcv_candles(&json!({"data": {"attributes": {}}})).unwrap_err();
        assert_eq!(err, NormalizeError::MissingKey("ohlcv_list"));
        assert!(ohlcv_candles(&json!({})).unwrap_err().is_missing());
    }

    #[test]
    fn ohlcv_short_or_bad_row_fails_series() {
        let short = json!({"data": {"attributes": {"ohlcv_list": [[1700000000, 1, 2, 3]]}}});
        assert!(matches!(
            ohlcv_candles(&short),
            Err(NormalizeError::InvalidRow(_))
        ));
        let bad = json!({"data": {"attributes": {"ohlcv_list": [
            [1700000000, 1, 2, 3, 4, 5],
            [1700000060, "x", 2, 3, 4, 5]
        ]}}});
        assert!(ohlcv_candles(&bad).is_err());
    }

    #[test]
    fn tvl_records() {
        let payload = json!({
            "records": [
                {"timestamp": 1700000000, "tvl": {"totalUsd": "1500000.25"}},
                {"timestamp": "1700003600", "tvl": {"totalUsd": 1499000}}
            ]
        });
        let points = tvl_points(&payload).unwrap();
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].tvl_usd, 1_500_000.25);
        assert_eq!(points[1].timestamp, 1_700_003_600);
    }

    #[test]
    fn tvl_missing_records_vs_empty() {
        assert!(tvl_points(&json!({"error": "x"})).unwrap_err().is_missing());
        assert!(tvl_points(&json!({"records": []})).unwrap().is_empty());
    }

    #[test]
    fn tvl_record_without_total_fails_series() {
        let payload = json!({"records": [{"timestamp": 1700000000, "tvl": {}}]});
        assert!(tvl_points(&payload).is_err());
    }
}
