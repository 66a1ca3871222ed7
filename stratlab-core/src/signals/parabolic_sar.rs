//! Parabolic SAR flip — buy when the SAR flips below price, sell when it flips above.

use crate::domain::{Candle, IndicatorSignal};
use crate::indicators::{parabolic_sar, SarParams};

use super::{neutral_series, SignalStrategy, StrategyKind};

const FLIP_STRENGTH: f64 = 70.0;

#[derive(Debug, Clone, Default)]
pub struct ParabolicSarFlip {
    pub params: SarParams,
}

impl SignalStrategy for ParabolicSarFlip {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ParabolicSar
    }

    fn lookback(&self) -> usize {
        2
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        let mut signals = neutral_series(candles.len());
        if candles.len() <= self.lookback() {
            return signals;
        }

        let sar = parabolic_sar(candles, self.params);
        for i in 1..candles.len() {
            match (sar.is_long[i - 1], sar.is_long[i]) {
                (Some(false), Some(true)) => signals[i] = IndicatorSignal::buy(FLIP_STRENGTH),
                (Some(true), Some(false)) => signals[i] = IndicatorSignal::sell(FLIP_STRENGTH),
                _ => {}
            }
        }

        signals
    }
}
