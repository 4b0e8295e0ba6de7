//! CSV export of fetched pool records. Fetching never writes files; callers
//! opt into export with the functions here.

use pool_metrics::{OhlcvCandle, PoolMetrics, TvlPoint};
use std::path::{Path, PathBuf};
use time::macros::format_description;
use time::OffsetDateTime;
use tracing::info;

const TVL_FILE_PREFIX: &str = "yieldsamurai_tvl";
const POOL_PREFIX_CHARS: usize = 6;

/// `yieldsamurai_tvl_{chain}_{first 6 chars of pool}.csv`. Characters other
/// than ASCII alphanumerics, `-` and `_` become `_`, so the name never
/// leaves the export directory.
pub fn tvl_csv_file_name(chain: &str, pool_address: &str) -> String {
    let chain = file_component(chain.chars());
    let prefix = file_component(pool_address.chars().take(POOL_PREFIX_CHARS));
    format!("{TVL_FILE_PREFIX}_{chain}_{prefix}.csv")
}

fn file_component(chars: impl Iterator<Item = char>) -> String {
    chars
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Write TVL history into `dir` under [`tvl_csv_file_name`]. Nothing is
/// written for an empty history; returns the path when a file was written.
pub fn export_tvl_history(
    dir: impl AsRef<Path>,
    chain: &str,
    pool_address: &str,
    points: &[TvlPoint],
) -> Result<Option<PathBuf>, ExportError> {
    if points.is_empty() {
        return Ok(None);
    }
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir).map_err(ExportError::Io)?;
    let path = dir.join(tvl_csv_file_name(chain, pool_address));
    write_tvl_csv(points, &path)?;
    info!(path = %path.display(), rows = points.len(), "TVL history saved");
    Ok(Some(path))
}

pub fn write_tvl_csv(points: &[TvlPoint], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path).map_err(ExportError::Csv)?;
    writer
        .write_record(["timestamp", "datetime", "tvl_usd"])
        .map_err(ExportError::Csv)?;
    for p in points {
        writer
            .write_record([
                p.timestamp.to_string(),
                format_datetime(p.datetime)?,
                p.tvl_usd.to_string(),
            ])
            .map_err(ExportError::Csv)?;
    }
    writer.flush().map_err(ExportError::Io)?;
    Ok(())
}

pub fn write_ohlcv_csv(candles: &[OhlcvCandle], path: impl AsRef<Path>) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path).map_err(ExportError::Csv)?;
    writer
        .write_record([
            "timestamp",
            "datetime",
            "open",
            "high",
            "low",
            "close",
            "volume",
        ])
        .map_err(ExportError::Csv)?;
    for c in candles {
        writer
            .write_record([
                c.timestamp.to_string(),
                format_datetime(c.datetime)?,
                c.open.to_string(),
                c.high.to_string(),
                c.low.to_string(),
                c.close.to_string(),
                c.volume.to_string(),
            ])
            .map_err(ExportError::Csv)?;
    }
    writer.flush().map_err(ExportError::Io)?;
    Ok(())
}

pub fn write_pool_metrics_csv(
    metrics: &[PoolMetrics],
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_path(path).map_err(ExportError::Csv)?;
    writer
        .write_record([
            "network",
            "pool_address",
            "tvl_usd",
            "volume_24h_usd",
            "fetch_timestamp",
        ])
        .map_err(ExportError::Csv)?;
    for m in metrics {
        writer
            .write_record([
                m.network.clone(),
                m.pool_address.clone(),
                m.tvl_usd.to_string(),
                m.volume_24h_usd.to_string(),
                m.fetch_timestamp.to_string(),
            ])
            .map_err(ExportError::Csv)?;
    }
    writer.flush().map_err(ExportError::Io)?;
    Ok(())
}

fn format_datetime(dt: OffsetDateTime) -> Result<String, ExportError> {
    dt.format(format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"))
        .map_err(ExportError::Format)
}

#[derive(Debug)]
pub enum ExportError {
    Io(std::io::Error),
    Csv(csv::Error),
    Format(time::error::Format),
}

impl std::fmt::Display for ExportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExportError::Io(e) => write!(f, "io: {e}"),
            ExportError::Csv(e) => write!(f, "csv: {e}"),
            ExportError::Format(e) => write!(f, "datetime format: {e}"),
        }
    }
}

impl std::error::Error for ExportError {}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn point(ts: i64, tvl: f64) -> TvlPoint {
        TvlPoint {
            timestamp: ts,
            datetime: OffsetDateTime::from_unix_timestamp(ts).unwrap(),
            tvl_usd: tvl,
        }
    }

    #[test]
    fn file_name_uses_six_char_prefix() {
        assert_eq!(
            tvl_csv_file_name("ethereum", "0x88e6a0c2ddd26feeb64f"),
            "yieldsamurai_tvl_ethereum_0x88e6.csv"
        );
        assert_eq!(tvl_csv_file_name("base", "0xab"), "yieldsamurai_tvl_base_0xab.csv");
    }

    #[test]
    fn file_name_strips_path_separators() {
        assert_eq!(
            tvl_csv_file_name("../../etc", "0x88e6a0"),
            "yieldsamurai_tvl_______etc_0x88e6.csv"
        );
        assert_eq!(tvl_csv_file_name("eth", "a/b\\cd"), "yieldsamurai_tvl_eth_a_b_cd.csv");

        let dir = TempDir::new().unwrap();
        let inner = dir.path().join("out");
        let path = export_tvl_history(&inner, "../x", "0x88e6a0", &[point(1_700_000_000, 1.0)])
            .unwrap()
            .unwrap();
        assert_eq!(path.parent().unwrap(), inner);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn empty_history_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let out = export_tvl_history(dir.path(), "ethereum", "0x88e6a0", &[]).unwrap();
        assert!(out.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn tvl_csv_contents() {
        let dir = TempDir::new().unwrap();
        let points = [point(1_700_000_000, 1500.5), point(1_700_003_600, 1499.0)];
        let path = export_tvl_history(dir.path().join("out"), "ethereum", "0x88e6a0c2", &points)
            .unwrap()
            .unwrap();
        assert!(path.ends_with("yieldsamurai_tvl_ethereum_0x88e6.csv"));
        let text = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "timestamp,datetime,tvl_usd");
        assert_eq!(lines[1], "1700000000,2023-11-14 22:13:20,1500.5");
        assert_eq!(lines[2], "1700003600,2023-11-14 23:13:20,1499");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn ohlcv_and_pool_csv_headers() {
        let dir = TempDir::new().unwrap();
        let candle = OhlcvCandle {
            timestamp: 1_700_000_000,
            datetime: OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap(),
            open: 1.0,
            high: 2.0,
            low: 0.5,
            close: 1.5,
            volume: 100.0,
        };
        let ohlcv_path = dir.path().join("ohlcv.csv");
        write_ohlcv_csv(&[candle], &ohlcv_path).unwrap();
        let text = std::fs::read_to_string(&ohlcv_path).unwrap();
        assert!(text.starts_with("timestamp,datetime,open,high,low,close,volume\n"));
        assert!(text.contains("1700000000,2023-11-14 22:13:20,1,2,0.5,1.5,100"));

        let metrics = PoolMetrics {
            network: "eth".into(),
            pool_address: "0xabc".into(),
            tvl_usd: 1234.5,
            volume_24h_usd: 67.8,
            fetch_timestamp: 1_700_000_000,
        };
        let pools_path = dir.path().join("pools.csv");
        write_pool_metrics_csv(&[metrics], &pools_path).unwrap();
        let text = std::fs::read_to_string(&pools_path).unwrap();
        assert_eq!(
            text,
            "network,pool_address,tvl_usd,volume_24h_usd,fetch_timestamp\neth,0xabc,1234.5,67.8,1700000000\n"
        );
    }
}
