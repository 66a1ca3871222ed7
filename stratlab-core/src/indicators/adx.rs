//! ADX — Average Directional Index (Wilder), with its +DI / -DI components.
//!
//! Steps:
//! 1. Compute +DM and -DM from consecutive candles
//! 2. Smooth +DM, -DM, and TR using Wilder smoothing (alpha = 1/period)
//! 3. +DI = 100 * smoothed(+DM) / smoothed(TR)
//! 4. -DI = 100 * smoothed(-DM) / smoothed(TR)
//! 5. DX = 100 * |+DI - -DI| / (+DI + -DI)
//! 6. ADX = Wilder-smoothed DX
//!
//! Lookback: 2 * period - 1 (period for DI smoothing, then period for ADX smoothing).

use super::atr::{true_range, wilder_smooth};
use crate::domain::Candle;

#[derive(Debug, Clone, Default)]
pub struct DirectionalIndex {
    pub plus_di: Vec<f64>,
    pub minus_di: Vec<f64>,
    pub adx: Vec<f64>,
}

pub fn directional_index(candles: &[Candle], period: usize) -> DirectionalIndex {
    let n = candles.len();
    let empty = DirectionalIndex {
        plus_di: vec![f64::NAN; n],
        minus_di: vec![f64::NAN; n],
        adx: vec![f64::NAN; n],
    };

    if n < 2 || period == 0 {
        return empty;
    }

    let mut plus_dm = vec![f64::NAN; n];
    let mut minus_dm = vec![f64::NAN; n];

    for i in 1..n {
        let high_diff = candles[i].high - candles[i - 1].high;
        let low_diff = candles[i - 1].low - candles[i].low;

        plus_dm[i] = if high_diff > low_diff && high_diff > 0.0 {
            high_diff
        } else {
            0.0
        };
        minus_dm[i] = if low_diff > high_diff && low_diff > 0.0 {
            low_diff
        } else {
            0.0
        };
    }

    // TR[0] lacks a previous close; align it with the DM series.
    let mut tr = true_range(candles);
    tr[0] = f64::NAN;

    let smooth_tr = wilder_smooth(&tr, period);
    let smooth_plus_dm = wilder_smooth(&plus_dm, period);
    let smooth_minus_dm = wilder_smooth(&minus_dm, period);

    let mut plus_di = vec![f64::NAN; n];
    let mut minus_di = vec![f64::NAN; n];
    let mut dx = vec![f64::NAN; n];
    for i in 0..n {
        if smooth_tr[i].is_nan()
            || smooth_plus_dm[i].is_nan()
            || smooth_minus_dm[i].is_nan()
            || smooth_tr[i] == 0.0
        {
            continue;
        }

        plus_di[i] = 100.0 * smooth_plus_dm[i] / smooth_tr[i];
        minus_di[i] = 100.0 * smooth_minus_dm[i] / smooth_tr[i];
        let di_sum = plus_di[i] + minus_di[i];

        dx[i] = if di_sum == 0.0 {
            0.0
        } else {
            100.0 * (plus_di[i] - minus_di[i]).abs() / di_sum
        };
    }

    DirectionalIndex {
        plus_di,
        minus_di,
        adx: wilder_smooth(&dx, period),
    }
}
