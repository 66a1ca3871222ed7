//! Supertrend — ATR-based trailing stop with a direction state.
//!
//! Inherently sequential/stateful: direction flips between support and resistance
//! based on close vs band comparisons.
//!
//! Output per candle: the active band (lower band while trending up, upper band
//! while trending down) and the direction. Both are undefined until ATR is.

use super::atr::{true_range, wilder_smooth};
use crate::domain::Candle;

#[derive(Debug, Clone, Default)]
pub struct SupertrendSeries {
    pub band: Vec<f64>,
    /// `Some(true)` while trending up, `Some(false)` while trending down.
    pub trending_up: Vec<Option<bool>>,
}

pub fn supertrend(candles: &[Candle], period: usize, multiplier: f64) -> SupertrendSeries {
    let n = candles.len();
    let mut band = vec![f64::NAN; n];
    let mut direction = vec![None; n];

    let tr = true_range(candles);
    let atr = wilder_smooth(&tr, period);

    let start = match atr.iter().position(|v| !v.is_nan()) {
        Some(idx) => idx,
        None => {
            return SupertrendSeries {
                band,
                trending_up: direction,
            }
        }
    };

    let hl2 = candles[start].hl2();
    let mut upper_band = hl2 + multiplier * atr[start];
    let mut lower_band = hl2 - multiplier * atr[start];
    // Start trending up (support)
    let mut trending_up = true;
    band[start] = lower_band;
    direction[start] = Some(trending_up);

    for i in (start + 1)..n {
        if atr[i].is_nan() {
            continue;
        }

        let hl2 = candles[i].hl2();
        let basic_upper = hl2 + multiplier * atr[i];
        let basic_lower = hl2 - multiplier * atr[i];

        // Upper band can only decrease while price stays below it
        let prev_close = candles[i - 1].close;
        let new_upper = if prev_close <= upper_band {
            basic_upper.min(upper_band)
        } else {
            basic_upper
        };

        // Lower band can only increase while price stays above it
        let new_lower = if prev_close >= lower_band {
            basic_lower.max(lower_band)
        } else {
            basic_lower
        };

        upper_band = new_upper;
        lower_band = new_lower;

        if trending_up && candles[i].close < lower_band {
            trending_up = false;
        } else if !trending_up && candles[i].close > upper_band {
            trending_up = true;
        }

        band[i] = if trending_up { lower_band } else { upper_band };
        direction[i] = Some(trending_up);
    }

    SupertrendSeries {
        band,
        trending_up: direction,
    }
}
