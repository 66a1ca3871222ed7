//! Indicator math over candle series.
//!
//! Every function takes a whole series and returns vectors of the same length,
//! with `f64::NAN` during warm-up. Each value at index t is computed from
//! inputs at indices `0..=t` only; the signal library relies on this to stay
//! free of look-ahead.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod momentum;
pub mod oscillators;
pub mod parabolic_sar;
pub mod rsi;
pub mod sma;
pub mod supertrend;
pub mod vwap;

pub use adx::{directional_index, DirectionalIndex};
pub use atr::{atr, true_range, wilder_smooth};
pub use bollinger::{bollinger, BollingerBands};
pub use ema::ema_of_series;
pub use momentum::{macd, roc, MacdSeries};
pub use oscillators::{cci, stochastic, williams_r, StochasticSeries};
pub use parabolic_sar::{parabolic_sar, SarParams, SarSeries};
pub use rsi::rsi_of_series;
pub use sma::{rolling_max, rolling_min, rolling_stddev, sma_of_series};
pub use supertrend::{supertrend, SupertrendSeries};
pub use vwap::rolling_vwap;

use crate::domain::Candle;

/// Close prices of a series.
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Create synthetic candles from close prices for testing.
///
/// Generates plausible OHLV: open = prev_close (or close for first candle),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000,
/// one candle per minute.
#[cfg(test)]
pub fn make_candles(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                time: i as i64 * 60_000,
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
