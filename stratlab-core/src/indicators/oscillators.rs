//! Range oscillators: CCI, stochastic %K/%D, Williams %R.

use super::sma::{rolling_max, rolling_min, sma_of_series};
use crate::domain::Candle;

/// Commodity Channel Index.
///
/// CCI = (TP - SMA(TP)) / (0.015 * mean deviation), TP = (high + low + close) / 3.
/// Zero mean deviation yields 0. Lookback: period - 1.
pub fn cci(candles: &[Candle], period: usize) -> Vec<f64> {
    let n = candles.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 || n < period {
        return result;
    }

    let tp: Vec<f64> = candles.iter().map(Candle::typical_price).collect();
    let mean = sma_of_series(&tp, period);

    for i in (period - 1)..n {
        let window = &tp[i + 1 - period..=i];
        let mean_dev = window.iter().map(|v| (v - mean[i]).abs()).sum::<f64>() / period as f64;
        result[i] = if mean_dev == 0.0 {
            0.0
        } else {
            (tp[i] - mean[i]) / (0.015 * mean_dev)
        };
    }

    result
}

#[derive(Debug, Clone, Default)]
pub struct StochasticSeries {
    pub k: Vec<f64>,
    pub d: Vec<f64>,
}

/// Stochastic oscillator.
///
/// %K = (close - lowest low) / (highest high - lowest low) * 100 over `k_period`;
/// a flat range yields 50. %D = SMA(%K, d_period).
pub fn stochastic(candles: &[Candle], k_period: usize, d_period: usize) -> StochasticSeries {
    let n = candles.len();
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let hh = rolling_max(&highs, k_period);
    let ll = rolling_min(&lows, k_period);

    let mut k = vec![f64::NAN; n];
    for i in 0..n {
        if hh[i].is_nan() || ll[i].is_nan() {
            continue;
        }
        let range = hh[i] - ll[i];
        k[i] = if range == 0.0 {
            50.0
        } else {
            (candles[i].close - ll[i]) / range * 100.0
        };
    }

    let d = sma_of_series(&k, d_period);
    StochasticSeries { k, d }
}

/// Williams %R = (highest high - close) / (highest high - lowest low) * -100.
/// Range [-100, 0]; a flat range yields -50.
pub fn williams_r(candles: &[Candle], period: usize) -> Vec<f64> {
    let n = candles.len();
    let highs: Vec<f64> = candles.iter().map(|c| c.high).collect();
    let lows: Vec<f64> = candles.iter().map(|c| c.low).collect();
    let hh = rolling_max(&highs, period);
    let ll = rolling_min(&lows, period);

    let mut result = vec![f64::NAN; n];
    for i in 0..n {
        if hh[i].is_nan() || ll[i].is_nan() {
            continue;
        }
        let range = hh[i] - ll[i];
        result[i] = if range == 0.0 {
            -50.0
        } else {
            (hh[i] - candles[i].close) / range * -100.0
        };
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_candles, DEFAULT_EPSILON};

    #[test]
    fn cci_flat_is_zero() {
        let result = cci(&make_candles(&[100.0; 6]), 4);
        assert!(result[2].is_nan());
        assert_approx(result[5], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn cci_positive_after_jump() {
        let result = cci(&make_candles(&[100.0, 100.0, 100.0, 100.0, 110.0]), 5);
        assert!(result[4] > 100.0, "cci {}", result[4]);
    }

    #[test]
    fn stochastic_close_at_high_is_near_top() {
        let closes: Vec<f64> = (0..10).map(|i| 100.0 + i as f64).collect();
        let stoch = stochastic(&make_candles(&closes), 5, 3);
        // make_candles: high = close + 1, low = prev close - 1 on a rising series
        // window 5..=9: highest high 110, lowest low 103, close 109
        assert_approx(stoch.k[9], 6.0 / 7.0 * 100.0, DEFAULT_EPSILON);
        assert!(stoch.d[5].is_nan());
        assert!(!stoch.d[6].is_nan());
    }

    #[test]
    fn williams_r_bounds() {
        let closes = [100.0, 104.0, 98.0, 107.0, 101.0, 95.0, 110.0];
        for &v in williams_r(&make_candles(&closes), 3)
            .iter()
            .filter(|v| !v.is_nan())
        {
            assert!((-100.0..=0.0).contains(&v));
        }
    }
}
