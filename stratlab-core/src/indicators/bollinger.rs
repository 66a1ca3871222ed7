//! Bollinger Bands — moving average +/- standard deviation multiplier.
//!
//! - Middle: SMA(close, period)
//! - Upper: middle + mult * stddev(close, period)
//! - Lower: middle - mult * stddev(close, period)
//! - Bandwidth: (upper - lower) / middle
//!
//! Uses population stddev (divide by N).
//! Lookback: period - 1.

use super::sma::{rolling_stddev, sma_of_series};

#[derive(Debug, Clone, Default)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
    pub bandwidth: Vec<f64>,
}

pub fn bollinger(values: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    let middle = sma_of_series(values, period);
    let stddev = rolling_stddev(values, period);

    let n = values.len();
    let mut upper = vec![f64::NAN; n];
    let mut lower = vec![f64::NAN; n];
    let mut bandwidth = vec![f64::NAN; n];

    for i in 0..n {
        if middle[i].is_nan() || stddev[i].is_nan() {
            continue;
        }
        upper[i] = middle[i] + multiplier * stddev[i];
        lower[i] = middle[i] - multiplier * stddev[i];
        if middle[i] != 0.0 {
            bandwidth[i] = (upper[i] - lower[i]) / middle[i];
        }
    }

    BollingerBands {
        upper,
        middle,
        lower,
        bandwidth,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn constant_series_collapses_bands() {
        let bands = bollinger(&[50.0; 5], 3, 2.0);
        assert!(bands.upper[1].is_nan());
        assert_approx(bands.upper[4], 50.0, DEFAULT_EPSILON);
        assert_approx(bands.lower[4], 50.0, DEFAULT_EPSILON);
        assert_approx(bands.bandwidth[4], 0.0, DEFAULT_EPSILON);
    }

    #[test]
    fn bands_are_symmetric_around_middle() {
        let values = [10.0, 12.0, 11.0, 14.0, 13.0, 15.0];
        let bands = bollinger(&values, 4, 2.0);
        for i in 3..values.len() {
            let up = bands.upper[i] - bands.middle[i];
            let down = bands.middle[i] - bands.lower[i];
            assert_approx(up, down, DEFAULT_EPSILON);
            assert!(bands.upper[i] > bands.lower[i]);
        }
    }
}
