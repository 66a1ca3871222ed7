//! Volume spike — unusually heavy volume in the direction of the candle body.

use crate::domain::{Candle, IndicatorSignal};

use super::{neutral_series, SignalStrategy, StrategyKind};

/// Fires when volume reaches `multiplier` times the mean of the previous
/// `period` candles (the current candle excluded). Green body → buy,
/// red body → sell, doji → neutral. Strength: `50 * ratio / 2`, capped at 100.
#[derive(Debug, Clone)]
pub struct VolumeSpike {
    pub period: usize,
    pub multiplier: f64,
}

impl Default for VolumeSpike {
    fn default() -> Self {
        Self {
            period: 20,
            multiplier: 2.0,
        }
    }
}

impl SignalStrategy for VolumeSpike {
    fn kind(&self) -> StrategyKind {
        StrategyKind::VolumeSpike
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
            let mean = prior.iter().map(|c| c.volume).sum::<f64>() / self.period as f64;
            if !mean.is_finite() || mean <= 0.0 {
                continue;
            }

            let candle = &candles[i];
            let ratio = candle.volume / mean;
            if ratio < self.multiplier {
                continue;
            }

            let strength = 50.0 * ratio / 2.0;
            if candle.close > candle.open {
                signals[i] = IndicatorSignal::buy(strength);
            } else if candle.close < candle.open {
                signals[i] = IndicatorSignal::sell(strength);
            }
        }

        signals
    }
}
