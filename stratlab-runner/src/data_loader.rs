//! Candle loading for the runner.
//!
//! Two on-disk formats:
//! 1. CSV with columns `symbol,timeframe,time,open,high,low,close,volume`,
//!    one row per candle, series interleaved in any order
//! 2. JSON shaped like a `CandleSet`: `{symbol: {timeframe: [candle, ...]}}`
//!
//! Rows keep their file order within a series. Ordering and sanity are
//! checked later by the runner, which rejects malformed series as a whole.

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use stratlab_core::domain::Candle;

use crate::config::parse_time;
use crate::runner::CandleSet;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("row {row}: invalid time '{value}' (expected ms epoch or RFC 3339)")]
    InvalidTime { row: usize, value: String },
}

#[derive(Debug, Deserialize)]
struct CandleRow {
    symbol: String,
    timeframe: String,
    time: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

/// Load a candle set from a CSV file.
pub fn load_candles_csv(path: &Path) -> Result<CandleSet, LoadError> {
    let content = read_file(path)?;
    parse_candles_csv(&content)
}

/// Parse a candle set from CSV text with a header row.
pub fn parse_candles_csv(content: &str) -> Result<CandleSet, LoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut set = CandleSet::new();
    for (i, record) in reader.deserialize::<CandleRow>().enumerate() {
        let row = record?;
        // header is line 1
        let time = parse_time(&row.time).ok_or_else(|| LoadError::InvalidTime {
            row: i + 2,
            value: row.time.clone(),
        })?;
        set.entry(row.symbol)
            .or_default()
            .entry(row.timeframe)
            .or_default()
            .push(Candle {
                time,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
    }
    Ok(set)
}

/// Load a candle set from a JSON file.
pub fn load_candles_json(path: &Path) -> Result<CandleSet, LoadError> {
    let content = read_file(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Load by extension: `.json` is JSON, anything else is CSV.
pub fn load_candles(path: &Path) -> Result<CandleSet, LoadError> {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => load_candles_json(path),
        _ => load_candles_csv(path),
    }
}

/// BLAKE3 hash over every candle in the set, in map order.
///
/// Two runs over identical data share a hash regardless of the file format
/// the data came from.
pub fn dataset_hash(set: &CandleSet) -> String {
    let mut hasher = blake3::Hasher::new();
    for (symbol, series) in set {
        for (timeframe, candles) in series {
            hasher.update(symbol.as_bytes());
            hasher.update(&[0]);
            hasher.update(timeframe.as_bytes());
            hasher.update(&[0]);
            for c in candles {
                hasher.update(&c.time.to_le_bytes());
                for v in [c.open, c.high, c.low, c.close, c.volume] {
                    hasher.update(&v.to_le_bytes());
                }
            }
        }
    }
    hasher.finalize().to_hex().to_string()
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
symbol,timeframe,time,open,high,low,close,volume
BTCUSDT,1h,0,100,102,99,101,10
ETHUSDT,1h,0,10,11,9,10.5,20
BTCUSDT,1h,3600000,101,103,100,102,11
BTCUSDT,4h,1970-01-01T00:00:00Z,100,104,98,103,40
";

    #[test]
    fn csv_groups_rows_by_series() {
        let set = parse_candles_csv(SAMPLE_CSV).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set["BTCUSDT"]["1h"].len(), 2);
        assert_eq!(set["BTCUSDT"]["4h"].len(), 1);
        assert_eq!(set["ETHUSDT"]["1h"][0].close, 10.5);
        assert_eq!(set["BTCUSDT"]["1h"][1].time, 3_600_000);
        assert_eq!(set["BTCUSDT"]["4h"][0].time, 0);
    }

    #[test]
    fn csv_rejects_bad_time() {
        let csv = "symbol,timeframe,time,open,high,low,close,volume\nBTC,1h,noon,1,1,1,1,1\n";
        let err = parse_candles_csv(csv).unwrap_err();
        assert!(matches!(err, LoadError::InvalidTime { row: 2, .. }));
    }

    #[test]
    fn csv_rejects_bad_number() {
        let csv = "symbol,timeframe,time,open,high,low,close,volume\nBTC,1h,0,abc,1,1,1,1\n";
        assert!(matches!(parse_candles_csv(csv), Err(LoadError::Csv(_))));
    }

    #[test]
    fn json_matches_csv() {
        let dir = tempfile::tempdir().unwrap();
        let from_csv = parse_candles_csv(SAMPLE_CSV).unwrap();

        let json_path = dir.path().join("candles.json");
        std::fs::write(&json_path, serde_json::to_string(&from_csv).unwrap()).unwrap();
        let from_json = load_candles(&json_path).unwrap();

        assert_eq!(from_json, from_csv);
        assert_eq!(dataset_hash(&from_json), dataset_hash(&from_csv));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_candles_csv(&dir.path().join("nope.csv")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("nope.csv"));
    }

    #[test]
    fn dataset_hash_changes_with_data() {
        let a = parse_candles_csv(SAMPLE_CSV).unwrap();
        let mut b = a.clone();
        if let Some(series) = b.get_mut("BTCUSDT").and_then(|s| s.get_mut("1h")) {
            series[0].close = 101.5;
        }
        assert_ne!(dataset_hash(&a), dataset_hash(&b));
    }
}
