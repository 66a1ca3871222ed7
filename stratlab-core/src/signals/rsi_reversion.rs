//! RSI mean reversion — buy oversold, sell overbought.

use crate::domain::{Candle, IndicatorSignal};
use crate::indicators::{closes, rsi_of_series};

use super::{neutral_series, SignalStrategy, StrategyKind};

/// Buys when RSI drops below `oversold`, sells when it rises above `overbought`.
///
/// Strength scales with how far RSI has travelled into the extreme zone:
/// `(oversold - rsi) / oversold * 100` on the buy side and
/// `(rsi - overbought) / (100 - overbought) * 100` on the sell side.
#[derive(Debug, Clone)]
pub struct RsiReversion {
    pub period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for RsiReversion {
    fn default() -> Self {
        Self {
            period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl RsiReversion {
    fn signal_at(&self, rsi: f64) -> IndicatorSignal {
        if rsi.is_nan() {
            return IndicatorSignal::neutral();
        }
        if rsi < self.oversold {
            IndicatorSignal::buy((self.oversold - rsi) / self.oversold * 100.0)
        } else if rsi > self.overbought {
            IndicatorSignal::sell((rsi - self.overbought) / (100.0 - self.overbought) * 100.0)
        } else {
            IndicatorSignal::neutral()
        }
    }
}

impl SignalStrategy for RsiReversion {
    fn kind(&self) -> StrategyKind {
        StrategyKind::RsiReversion
    }

    fn lookback(&self) -> usize {
        self.period
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        if candles.len() <= self.period {
            return neutral_series(candles.len());
        }
        rsi_of_series(&closes(candles), self.period)
            .into_iter()
            .map(|rsi| self.signal_at(rsi))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignalKind;
    use crate::indicators::{assert_approx, make_candles};

    #[test]
    fn falling_market_is_oversold() {
        let closes: Vec<f64> = (0..20).map(|i| 200.0 - i as f64 * 2.0).collect();
        let signal = RsiReversion::default().evaluate(&make_candles(&closes));
        // no gains at all: RSI = 0, maximum strength
        assert_eq!(signal.signal, SignalKind::Buy);
        assert_approx(signal.strength, 100.0, 1e-9);
    }

    #[test]
    fn rising_market_is_overbought() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64 * 2.0).collect();
        let signal = RsiReversion::default().evaluate(&make_candles(&closes));
        assert_eq!(signal.signal, SignalKind::Sell);
        assert_approx(signal.strength, 100.0, 1e-9);
    }

    #[test]
    fn strength_is_proportional_to_zone_depth() {
        let strategy = RsiReversion::default();
        assert_approx(strategy.signal_at(15.0).strength, 50.0, 1e-9);
        assert_approx(strategy.signal_at(85.0).strength, 50.0, 1e-9);
        assert!(strategy.signal_at(50.0).is_neutral());
        assert!(strategy.signal_at(f64::NAN).is_neutral());
    }

    #[test]
    fn warmup_is_neutral() {
        let closes: Vec<f64> = (0..20).map(|i| 200.0 - i as f64).collect();
        let signals = RsiReversion::default().compute(&make_candles(&closes));
        assert!(signals[..14].iter().all(IndicatorSignal::is_neutral));
        assert!(!signals[14].is_neutral());
    }
}
