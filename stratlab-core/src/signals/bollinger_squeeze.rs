//! Bollinger squeeze breakout.
//!
//! A close above the upper band is a buy, below the lower band a sell.
//! Base strength 40; +40 when the previous candle's bandwidth sat within 10%
//! of its `squeeze_window` minimum (a squeeze just released); +10 per percent
//! the close is beyond the band.

use crate::domain::{Candle, IndicatorSignal};
use crate::indicators::{bollinger, closes};

use super::{all_finite, neutral_series, percent_from, SignalStrategy, StrategyKind};

const SQUEEZE_TOLERANCE: f64 = 1.10;

#[derive(Debug, Clone)]
pub struct BollingerSqueeze {
    pub period: usize,
    pub multiplier: f64,
    pub squeeze_window: usize,
}

impl Default for BollingerSqueeze {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
            squeeze_window: 20,
        }
    }
}

impl BollingerSqueeze {
    /// Whether bandwidth at `i - 1` is within tolerance of the window minimum ending there.
    fn squeezed_before(&self, bandwidth: &[f64], i: usize) -> bool {
        if i < self.squeeze_window || self.squeeze_window == 0 {
            return false;
        }
        let window = &bandwidth[i - self.squeeze_window..i];
        if !all_finite(window) {
            return false;
        }
        let min = window.iter().copied().fold(f64::INFINITY, f64::min);
        bandwidth[i - 1] <= min * SQUEEZE_TOLERANCE
    }
}

impl SignalStrategy for BollingerSqueeze {
    fn kind(&self) -> StrategyKind {
        StrategyKind::BollingerSqueeze
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        let mut signals = neutral_series(candles.len());
        if self.period == 0 || candles.len() < self.period {
            return signals;
        }

        let closes = closes(candles);
        let bands = bollinger(&closes, self.period, self.multiplier);

        for i in self.lookback()..candles.len() {
            let (upper, lower, close) = (bands.upper[i], bands.lower[i], closes[i]);
            if !all_finite(&[upper, lower, close]) {
                continue;
            }

            let squeeze_bonus = if self.squeezed_before(&bands.bandwidth, i) {
                40.0
            } else {
                0.0
            };

            if close > upper {
                signals[i] = IndicatorSignal::buy(40.0 + squeeze_bonus + 10.0 * percent_from(close, upper));
            } else if close < lower {
                signals[i] = IndicatorSignal::sell(40.0 + squeeze_bonus + 10.0 * percent_from(close, lower));
            }
        }

        signals
    }
}
