//! CCI reversion — CCI below -threshold is a buy, above +threshold a sell.
//! Strength: 40 + (|cci| - threshold) / 2, capped at 100.

use crate::domain::{Candle, IndicatorSignal};
use crate::indicators::cci;

use super::{neutral_series, SignalStrategy, StrategyKind};

#[derive(Debug, Clone)]
pub struct CciReversion {
    pub period: usize,
    pub threshold: f64,
}

impl Default for CciReversion {
    fn default() -> Self {
        Self {
            period: 20,
            threshold: 100.0,
        }
    }
}

impl SignalStrategy for CciReversion {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Cci
    }

    fn lookback(&self) -> usize {
        self.period.saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        if self.period == 0 || candles.len() < self.period {
            return neutral_series(candles.len());
        }

        cci(candles, self.period)
            .into_iter()
            .map(|value| {
                if !value.is_finite() {
                    return IndicatorSignal::neutral();
                }
                let strength = 40.0 + (value.abs() - self.threshold) / 2.0;
                if value < -self.threshold {
                    IndicatorSignal::buy(strength)
                } else if value > self.threshold {
                    IndicatorSignal::sell(strength)
                } else {
                    IndicatorSignal::neutral()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignalKind;
    use crate::indicators::make_candles;

    #[test]
    fn sharp_drop_is_buy() {
        let mut closes = vec![100.0; 25];
        closes.push(90.0);
        let signals = CciReversion::default().compute(&make_candles(&closes));
        assert_eq!(signals[25].signal, SignalKind::Buy);
        assert!(signals[25].strength > 40.0);
    }

    #[test]
    fn sharp_rise_is_sell() {
        let mut closes = vec![100.0; 25];
        closes.push(110.0);
        let signals = CciReversion::default().compute(&make_candles(&closes));
        assert_eq!(signals[25].signal, SignalKind::Sell);
    }

    #[test]
    fn flat_market_is_neutral() {
        let signals = CciReversion::default().compute(&make_candles(&[100.0; 30]));
        assert!(signals.iter().all(IndicatorSignal::is_neutral));
    }
}
