//! Parabolic SAR — Wilder's acceleration factor system.
//!
//! Inherently sequential/stateful: maintains direction, extreme point (EP),
//! and acceleration factor (AF).
//!
//! Parameters: af_start (default 0.02), af_step (default 0.02), af_max (default 0.20).
//! Lookback: 1 (needs at least 2 candles to start).

use crate::domain::Candle;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SarParams {
    pub af_start: f64,
    pub af_step: f64,
    pub af_max: f64,
}

impl Default for SarParams {
    fn default() -> Self {
        Self {
            af_start: 0.02,
            af_step: 0.02,
            af_max: 0.20,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SarSeries {
    pub sar: Vec<f64>,
    /// `Some(true)` while the SAR trails below price (long regime).
    pub is_long: Vec<Option<bool>>,
}

pub fn parabolic_sar(candles: &[Candle], params: SarParams) -> SarSeries {
    let n = candles.len();
    let mut result = vec![f64::NAN; n];
    let mut regime = vec![None; n];

    if n < 2 {
        return SarSeries {
            sar: result,
            is_long: regime,
        };
    }

    // Initial direction from the first two candles
    let mut is_long = candles[1].close >= candles[0].close;
    let mut af = params.af_start;
    let (mut sar, mut ep) = if is_long {
        (candles[0].low, candles[1].high)
    } else {
        (candles[0].high, candles[1].low)
    };

    result[1] = sar;
    regime[1] = Some(is_long);

    for i in 2..n {
        let mut new_sar = sar + af * (ep - sar);

        if is_long {
            // SAR may not sit above the two previous lows
            new_sar = new_sar.min(candles[i - 1].low).min(candles[i - 2].low);

            if candles[i].low < new_sar {
                is_long = false;
                new_sar = ep;
                ep = candles[i].low;
                af = params.af_start;
            } else if candles[i].high > ep {
                ep = candles[i].high;
                af = (af + params.af_step).min(params.af_max);
            }
        } else {
            // SAR may not sit below the two previous highs
            new_sar = new_sar.max(candles[i - 1].high).max(candles[i - 2].high);

            if candles[i].high > new_sar {
                is_long = true;
                new_sar = ep;
                ep = candles[i].high;
                af = params.af_start;
            } else if candles[i].low < ep {
                ep = candles[i].low;
                af = (af + params.af_step).min(params.af_max);
            }
        }

        sar = new_sar;
        result[i] = sar;
        regime[i] = Some(is_long);
    }

    SarSeries {
        sar: result,
        is_long: regime,
    }
}
