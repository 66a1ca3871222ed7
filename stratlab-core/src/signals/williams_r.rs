//! Williams %R extremes.
//!
//! %R below `oversold` (-80) → buy, strength (oversold - r) * 5.
//! %R above `overbought` (-20) → sell, strength (r - overbought) * 5.

use crate::domain::{Candle, IndicatorSignal};
use crate::indicators::williams_r;

use super::{neutral_series, SignalStrategy, StrategyKind};

#[derive(Debug, Clone)]
pub struct WilliamsR {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for WilliamsR {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: -80.0,
            overbought: -20.0,
        }
    }
}

impl WilliamsR {
    fn signal_at(&self, r: f64) -> IndicatorSignal {
        if !r.is_finite() {
            IndicatorSignal::neutral()
        } else if r < self.oversold {
            IndicatorSignal::buy((self.oversold - r) * 5.0)
        } else if r > self.overbought {
            IndicatorSignal::sell((r - self.overbought) * 5.0)
        } else {
            IndicatorSignal::neutral()
        }
    }
}

impl SignalStrategy for WilliamsR {
    fn kind(&self) -> StrategyKind {
        StrategyKind::WilliamsR
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        if self.period == 0 || candles.len() < self.period {
            return neutral_series(candles.len());
        }
        williams_r(candles, self.period)
            .into_iter()
            .map(|r| self.signal_at(r))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignalKind;
    use crate::indicators::{assert_approx, make_candles};

    #[test]
    fn strength_scales_past_thresholds() {
        let strategy = WilliamsR::default();
        let buy = strategy.signal_at(-90.0);
        assert_eq!(buy.signal, SignalKind::Buy);
        assert_approx(buy.strength, 50.0, 1e-9);
        let sell = strategy.signal_at(-5.0);
        assert_eq!(sell.signal, SignalKind::Sell);
        assert_approx(sell.strength, 75.0, 1e-9);
        assert!(strategy.signal_at(-50.0).is_neutral());
    }

    #[test]
    fn close_near_low_of_range_is_buy() {
        let closes: Vec<f64> = (0..20).map(|i| 200.0 - i as f64 * 3.0).collect();
        let signal = WilliamsR::default().evaluate(&make_candles(&closes));
        assert_eq!(signal.signal, SignalKind::Buy);
    }
}
