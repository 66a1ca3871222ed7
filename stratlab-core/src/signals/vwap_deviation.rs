//! VWAP deviation — fade closes stretched away from the rolling VWAP.
//!
//! deviation% = (close - vwap) / vwap * 100.
//! deviation <= -threshold → buy; >= threshold → sell; strength 25 * |deviation|.

use crate::domain::{Candle, IndicatorSignal};
use crate::indicators::rolling_vwap;

use super::{neutral_series, SignalStrategy, StrategyKind};

#[derive(Debug, Clone)]
pub struct VwapDeviation {
    pub period: usize,
    pub threshold_pct: f64,
}

impl Default for VwapDeviation {
    fn default() -> Self {
        Self {
            period: 20,
            threshold_pct: 2.0,
        }
    }
}

impl SignalStrategy for VwapDeviation {
    fn kind(&self) -> StrategyKind {
        StrategyKind::VwapDeviation
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        if self.period == 0 || candles.len() < self.period {
            return neutral_series(candles.len());
        }

        rolling_vwap(candles, self.period)
            .into_iter()
            .zip(candles)
            .map(|(vwap, candle)| {
                if !vwap.is_finite() || vwap == 0.0 {
                    return IndicatorSignal::neutral();
                }
                let deviation = (candle.close - vwap) / vwap * 100.0;
                if deviation <= -self.threshold_pct {
                    IndicatorSignal::buy(25.0 * deviation.abs())
                } else if deviation >= self.threshold_pct {
                    IndicatorSignal::sell(25.0 * deviation)
                } else {
                    IndicatorSignal::neutral()
                }
            })
            .collect()
    }
}
