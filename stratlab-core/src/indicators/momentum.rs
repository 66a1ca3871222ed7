//! Momentum family: rate of change and MACD.

use super::ema::ema_of_series;

/// Rate of change in percent: (x[t] - x[t-period]) / x[t-period] * 100.
/// Lookback: period.
pub fn roc(values: &[f64], period: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if period == 0 {
        return result;
    }

    for i in period..n {
        let base = values[i - period];
        if base.is_nan() || values[i].is_nan() || base == 0.0 {
            continue;
        }
        result[i] = (values[i] - base) / base * 100.0;
    }

    result
}

#[derive(Debug, Clone, Default)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

/// MACD line = EMA(fast) - EMA(slow); signal = EMA(signal_period) of the MACD line;
/// histogram = MACD - signal.
/// Lookback: slow + signal_period - 2.
pub fn macd(values: &[f64], fast: usize, slow: usize, signal_period: usize) -> MacdSeries {
    let fast_ema = ema_of_series(values, fast);
    let slow_ema = ema_of_series(values, slow);

    let macd_line: Vec<f64> = fast_ema
        .iter()
        .zip(&slow_ema)
        .map(|(f, s)| f - s)
        .collect();
    let signal = ema_of_series(&macd_line, signal_period);
    let histogram = macd_line.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdSeries {
        macd: macd_line,
        signal,
        histogram,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn roc_known_values() {
        let result = roc(&[100.0, 105.0, 110.0, 99.0], 2);
        assert!(result[1].is_nan());
        assert_approx(result[2], 10.0, DEFAULT_EPSILON);
        assert_approx(result[3], (99.0 - 105.0) / 105.0 * 100.0, DEFAULT_EPSILON);
    }

    #[test]
    fn macd_warmup_and_sign() {
        let values: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
        let m = macd(&values, 12, 26, 9);
        assert!(m.macd[24].is_nan());
        assert!(!m.macd[25].is_nan());
        assert!(m.signal[32].is_nan());
        assert!(!m.signal[33].is_nan());
        // fast EMA leads slow EMA in a rising market
        assert!(m.macd[59] > 0.0);
        assert!(m.histogram[33].is_finite());
    }
}
