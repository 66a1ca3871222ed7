//! RSI midline cross confirmed by rate of change.
//!
//! RSI crosses above 50 with ROC > 0 → buy; crosses below 50 with ROC < 0 → sell.
//! Strength: 50 + 5 * |roc|.

use crate::domain::{Candle, IndicatorSignal};
use crate::indicators::{closes, roc, rsi_of_series};

use super::{all_finite, neutral_series, SignalStrategy, StrategyKind};

const MIDLINE: f64 = 50.0;

#[derive(Debug, Clone)]
pub struct MomentumRsi {
    pub rsi_period: usize,
    pub roc_period: usize,
}

impl Default for MomentumRsi {
    fn default() -> Self {
        Self {
            rsi_period: 14,
            roc_period: 10,
        }
    }
}

impl SignalStrategy for MomentumRsi {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MomentumRsi
    }

    fn lookback(&self) -> usize {
        (self.rsi_period + 1).max(self.roc_period)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        let mut signals = neutral_series(candles.len());
        if self.rsi_period == 0 || candles.len() <= self.lookback() {
            return signals;
        }

        let closes = closes(candles);
        let rsi = rsi_of_series(&closes, self.rsi_period);
        let momentum = roc(&closes, self.roc_period);

        for i in 1..candles.len() {
            let (prev, cur, change) = (rsi[i - 1], rsi[i], momentum[i]);
            if !all_finite(&[prev, cur, change]) {
                continue;
            }
            let strength = 50.0 + 5.0 * change.abs();
            if prev <= MIDLINE && cur > MIDLINE && change > 0.0 {
                signals[i] = IndicatorSignal::buy(strength);
            } else if prev >= MIDLINE && cur < MIDLINE && change < 0.0 {
                signals[i] = IndicatorSignal::sell(strength);
            }
        }

        signals
    }
}
