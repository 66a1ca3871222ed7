//! Channel breakout against the prior `period` candles (current candle excluded).
//!
//! Close above the prior highest high → buy; below the prior lowest low → sell.
//! Strength: 50 + 10 * excess%, where excess% is the distance past the level.

use crate::domain::{Candle, IndicatorSignal};

use super::{neutral_series, percent_from, SignalStrategy, StrategyKind};

#[derive(Debug, Clone)]
pub struct Breakout {
    pub period: usize,
}

impl Default for Breakout {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl SignalStrategy for Breakout {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Breakout
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        let mut signals = neutral_series(candles.len());
        if self.period == 0 || candles.len() <= self.period {
            return signals;
        }

        for i in self.period..candles.len() {
            let prior = &candles[i - self.period..i];
            let high = prior.iter().map(|c| c.high).fold(f64::NEG_INFINITY, f64::max);
            let low = prior.iter().map(|c| c.low).fold(f64::INFINITY, f64::min);
            let close = candles[i].close;

            if close > high {
                signals[i] = IndicatorSignal::buy(50.0 + 10.0 * percent_from(close, high));
            } else if close < low {
                signals[i] = IndicatorSignal::sell(50.0 + 10.0 * percent_from(close, low));
            }
        }

        signals
    }
}
