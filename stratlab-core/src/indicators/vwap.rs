//! Rolling volume-weighted average price over typical price.
//!
//! VWAP[t] = sum(tp * volume) / sum(volume) over the last `period` candles.
//! A window with zero total volume yields NaN. Lookback: period - 1.

use crate::domain::Candle;

pub fn rolling_vwap(candles: &[Candle], period: usize) -> Vec<f64> {
    let n = candles.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    for i in (period - 1)..n {
        let window = &candles[i + 1 - period..=i];
        let volume: f64 = window.iter().map(|c| c.volume).sum();
        if volume <= 0.0 {
            continue;
        }
        let notional: f64 = window.iter().map(|c| c.typical_price() * c.volume).sum();
        result[i] = notional / volume;
    }

    result
}
