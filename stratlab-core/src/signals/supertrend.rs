//! Supertrend flip — fires on the candle where the Supertrend direction changes.
//!
//! Flip to up → buy, flip to down → sell.
//! Strength: 60 + 10 * distance%, where distance% is |close - band| / close * 100.

use crate::domain::{Candle, IndicatorSignal};
use crate::indicators::supertrend;

use super::{neutral_series, percent_from, SignalStrategy, StrategyKind};

#[derive(Debug, Clone)]
pub struct SupertrendFlip {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for SupertrendFlip {
    fn default() -> Self {
        Self {
            period: 10,
            multiplier: 3.0,
        }
    }
}

impl SignalStrategy for SupertrendFlip {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Supertrend
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        let mut signals = neutral_series(candles.len());
        if self.period == 0 || candles.len() <= self.period {
            return signals;
        }

        let st = supertrend(candles, self.period, self.multiplier);
        for i in 1..candles.len() {
            let (Some(prev), Some(cur)) = (st.trending_up[i - 1], st.trending_up[i]) else {
                continue;
            };
            if prev == cur || !st.band[i].is_finite() {
                continue;
            }

            let close = candles[i].close;
            let strength = 60.0 + 10.0 * percent_from(st.band[i], close);
            signals[i] = if cur {
                IndicatorSignal::buy(strength)
            } else {
                IndicatorSignal::sell(strength)
            };
        }

        signals
    }
}
