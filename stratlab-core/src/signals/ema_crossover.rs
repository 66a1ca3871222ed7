//! EMA crossover — fires on the candle where the fast EMA crosses the slow EMA.
//!
//! Buy when fast crosses above slow (current fast > slow, previous fast <= slow).
//! Sell when fast crosses below slow (current fast < slow, previous fast >= slow).
//! Strength: 50 + 10 * gap%, where gap% is |fast - slow| / slow * 100.

use crate::domain::{Candle, IndicatorSignal};
use crate::indicators::{closes, ema_of_series};

use super::{all_finite, neutral_series, percent_from, SignalStrategy, StrategyKind};

#[derive(Debug, Clone)]
pub struct EmaCrossover {
    pub fast_period: usize,
    pub slow_period: usize,
}

impl Default for EmaCrossover {
    fn default() -> Self {
        Self {
            fast_period: 9,
            slow_period: 21,
        }
    }
}

impl SignalStrategy for EmaCrossover {
    fn kind(&self) -> StrategyKind {
        StrategyKind::EmaCrossover
    }

    fn lookback(&self) -> usize {
        self.slow_period.max(self.fast_period)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        let mut signals = neutral_series(candles.len());
        if candles.len() <= self.lookback() {
            return signals;
        }

        let closes = closes(candles);
        let fast = ema_of_series(&closes, self.fast_period);
        let slow = ema_of_series(&closes, self.slow_period);

        for i in 1..candles.len() {
            let (fast_cur, slow_cur) = (fast[i], slow[i]);
            let (fast_prev, slow_prev) = (fast[i - 1], slow[i - 1]);
            if !all_finite(&[fast_cur, slow_cur, fast_prev, slow_prev]) {
                continue;
            }

            let strength = 50.0 + 10.0 * percent_from(fast_cur, slow_cur);
            if fast_cur > slow_cur && fast_prev <= slow_prev {
                signals[i] = IndicatorSignal::buy(strength);
            } else if fast_cur < slow_cur && fast_prev >= slow_prev {
                signals[i] = IndicatorSignal::sell(strength);
            }
        }

        signals
    }
}
