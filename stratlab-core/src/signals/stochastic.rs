//! Stochastic %K/%D cross inside the extreme zones.
//!
//! %K crosses above %D with both below `oversold` → buy.
//! %K crosses below %D with both above `overbought` → sell.
//! Strength: 60 + 2 * how far %K sits past the band.

use crate::domain::{Candle, IndicatorSignal};
use crate::indicators::stochastic;

use super::{all_finite, neutral_series, SignalStrategy, StrategyKind};

#[derive(Debug, Clone)]
pub struct StochasticCross {
    pub k_period: usize,
    pub d_period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for StochasticCross {
    fn default() -> Self {
        Self {
            k_period: 14,
            d_period: 3,
            oversold: 20.0,
            overbought: 80.0,
        }
    }
}

impl StochasticCross {
    fn signal_at(&self, k_prev: f64, d_prev: f64, k: f64, d: f64) -> IndicatorSignal {
        if !all_finite(&[k_prev, d_prev, k, d]) {
            return IndicatorSignal::neutral();
        }
        if k > d && k_prev <= d_prev && k < self.oversold && d < self.oversold {
            IndicatorSignal::buy(60.0 + 2.0 * (self.oversold - k))
        } else if k < d && k_prev >= d_prev && k > self.overbought && d > self.overbought {
            IndicatorSignal::sell(60.0 + 2.0 * (k - self.overbought))
        } else {
            IndicatorSignal::neutral()
        }
    }
}

impl SignalStrategy for StochasticCross {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Stochastic
    }

    fn lookback(&self) -> usize {
        self.k_period + self.d_period - 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        let mut signals = neutral_series(candles.len());
        if self.k_period == 0 || self.d_period == 0 || candles.len() <= self.lookback() {
            return signals;
        }

        let stoch = stochastic(candles, self.k_period, self.d_period);
        for i in 1..candles.len() {
            signals[i] = self.signal_at(stoch.k[i - 1], stoch.d[i - 1], stoch.k[i], stoch.d[i]);
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignalKind;
    use crate::indicators::assert_approx;

    #[test]
    fn cross_up_in_oversold_zone_is_buy() {
        let signal = StochasticCross::default().signal_at(8.0, 10.0, 12.0, 11.0);
        assert_eq!(signal.signal, SignalKind::Buy);
        assert_approx(signal.strength, 76.0, 1e-9);
    }

    #[test]
    fn cross_down_in_overbought_zone_is_sell() {
        let signal = StochasticCross::default().signal_at(92.0, 90.0, 88.0, 89.0);
        assert_eq!(signal.signal, SignalKind::Sell);
        assert_approx(signal.strength, 76.0, 1e-9);
    }

    #[test]
    fn cross_outside_zone_is_neutral() {
        let strategy = StochasticCross::default();
        assert!(strategy.signal_at(40.0, 45.0, 50.0, 46.0).is_neutral());
        assert!(strategy.signal_at(f64::NAN, 10.0, 12.0, 11.0).is_neutral());
    }

    #[test]
    fn lookback_covers_percent_d_warmup() {
        assert_eq!(StochasticCross::default().lookback(), 16);
    }
}
