//! Candle — the fundamental market data unit.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// OHLCV candle for one (symbol, timeframe) series.
///
/// `time` is the candle open time in milliseconds since the Unix epoch.
/// The core never interprets exchange-specific field names or units; any
/// source that can fill these six fields is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

impl Candle {
    /// Returns true if any OHLCV field is NaN.
    pub fn is_void(&self) -> bool {
        self.open.is_nan()
            || self.high.is_nan()
            || self.low.is_nan()
            || self.close.is_nan()
            || self.volume.is_nan()
    }

    /// Basic OHLCV sanity check: finite values, high >= low, the body inside
    /// the range, strictly positive close and non-negative volume.
    pub fn is_sane(&self) -> bool {
        if self.is_void() {
            return false;
        }
        let finite = self.open.is_finite()
            && self.high.is_finite()
            && self.low.is_finite()
            && self.close.is_finite()
            && self.volume.is_finite();
        finite
            && self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.close > 0.0
            && self.volume >= 0.0
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// Midpoint of the candle range.
    pub fn hl2(&self) -> f64 {
        (self.high + self.low) / 2.0
    }
}

/// Structural problems in a candle series.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SeriesError {
    #[error("candle {index} goes back in time ({current} < {previous})")]
    NonMonotonic {
        index: usize,
        previous: i64,
        current: i64,
    },
    #[error("candle {index} repeats timestamp {time}")]
    DuplicateTimestamp { index: usize, time: i64 },
    #[error("candle {index} at {time} has invalid OHLCV values")]
    InsaneCandle { index: usize, time: i64 },
}

/// Check that a series is strictly ascending in time and every candle is sane.
///
/// Simulating a malformed series would silently produce wrong trades, so the
/// runner rejects it before any simulation starts.
pub fn validate_series(candles: &[Candle]) -> Result<(), SeriesError> {
    for (index, candle) in candles.iter().enumerate() {
        if !candle.is_sane() {
            return Err(SeriesError::InsaneCandle {
                index,
                time: candle.time,
            });
        }
        if index == 0 {
            continue;
        }
        let previous = candles[index - 1].time;
        if candle.time == previous {
            return Err(SeriesError::DuplicateTimestamp {
                index,
                time: candle.time,
            });
        }
        if candle.time < previous {
            return Err(SeriesError::NonMonotonic {
                index,
                previous,
                current: candle.time,
            });
        }
    }
    Ok(())
}

/// Restrict a series to the inclusive `[start, end]` window.
///
/// Assumes the series is already ordered; the window bounds are optional.
pub fn filter_window(candles: &[Candle], start: Option<i64>, end: Option<i64>) -> &[Candle] {
    let lo = match start {
        Some(s) => candles.partition_point(|c| c.time < s),
        None => 0,
    };
    let hi = match end {
        Some(e) => candles.partition_point(|c| c.time <= e),
        None => candles.len(),
    };
    if lo >= hi {
        return &candles[0..0];
    }
    &candles[lo..hi]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_candle(time: i64) -> Candle {
        Candle {
            time,
            open: 100.0,
            high: 105.0,
            low: 98.0,
            close: 103.0,
            volume: 50_000.0,
        }
    }

    #[test]
    fn candle_is_sane() {
        assert!(sample_candle(0).is_sane());
    }

    #[test]
    fn candle_detects_void() {
        let mut candle = sample_candle(0);
        candle.open = f64::NAN;
        assert!(candle.is_void());
        assert!(!candle.is_sane());
    }

    #[test]
    fn candle_detects_insane_high_low() {
        let mut candle = sample_candle(0);
        candle.high = 97.0;
        assert!(!candle.is_sane());
    }

    #[test]
    fn candle_rejects_zero_close() {
        let mut candle = sample_candle(0);
        candle.close = 0.0;
        candle.low = 0.0;
        assert!(!candle.is_sane());
    }

    #[test]
    fn typical_price() {
        let c = sample_candle(0);
        assert!((c.typical_price() - (105.0 + 98.0 + 103.0) / 3.0).abs() < 1e-12);
    }

    #[test]
    fn validate_accepts_ascending_series() {
        let series: Vec<Candle> = (0..5).map(|i| sample_candle(i * 60_000)).collect();
        assert_eq!(validate_series(&series), Ok(()));
        assert_eq!(validate_series(&[]), Ok(()));
    }

    #[test]
    fn validate_rejects_duplicate_timestamp() {
        let series = vec![sample_candle(0), sample_candle(60_000), sample_candle(60_000)];
        assert_eq!(
            validate_series(&series),
            Err(SeriesError::DuplicateTimestamp {
                index: 2,
                time: 60_000
            })
        );
    }

    #[test]
    fn validate_rejects_time_going_backwards() {
        let series = vec![sample_candle(120_000), sample_candle(60_000)];
        assert!(matches!(
            validate_series(&series),
            Err(SeriesError::NonMonotonic { index: 1, .. })
        ));
    }

    #[test]
    fn validate_rejects_insane_candle() {
        let mut bad = sample_candle(60_000);
        bad.low = 110.0;
        let series = vec![sample_candle(0), bad];
        assert_eq!(
            validate_series(&series),
            Err(SeriesError::InsaneCandle {
                index: 1,
                time: 60_000
            })
        );
    }

    #[test]
    fn filter_window_is_inclusive() {
        let series: Vec<Candle> = (0..10).map(|i| sample_candle(i * 10)).collect();
        let window = filter_window(&series, Some(20), Some(50));
        assert_eq!(window.len(), 4);
        assert_eq!(window[0].time, 20);
        assert_eq!(window[3].time, 50);

        assert_eq!(filter_window(&series, None, None).len(), 10);
        assert!(filter_window(&series, Some(500), None).is_empty());
        assert!(filter_window(&series, Some(50), Some(20)).is_empty());
    }
}
