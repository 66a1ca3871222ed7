//! ADX trend — follow the dominant directional index while the trend is strong.
//!
//! ADX >= threshold: +DI above -DI → buy, -DI above +DI → sell.
//! Strength is the ADX value itself.

use crate::domain::{Candle, IndicatorSignal};
use crate::indicators::directional_index;

use super::{all_finite, neutral_series, SignalStrategy, StrategyKind};

#[derive(Debug, Clone)]
pub struct AdxTrend {
    pub period: usize,
    pub threshold: f64,
}

impl Default for AdxTrend {
    fn default() -> Self {
        Self {
            period: 14,
            threshold: 25.0,
        }
    }
}

impl SignalStrategy for AdxTrend {
    fn kind(&self) -> StrategyKind {
        StrategyKind::AdxTrend
    }

    fn lookback(&self) -> usize {
        (2 * self.period).saturating_sub(1)
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        let mut signals = neutral_series(candles.len());
        if self.period == 0 || candles.len() <= self.lookback() {
            return signals;
        }

        let di = directional_index(candles, self.period);
        for i in self.lookback()..candles.len() {
            let (adx, plus, minus) = (di.adx[i], di.plus_di[i], di.minus_di[i]);
            if !all_finite(&[adx, plus, minus]) || adx < self.threshold {
                continue;
            }
            if plus > minus {
                signals[i] = IndicatorSignal::buy(adx);
            } else if minus > plus {
                signals[i] = IndicatorSignal::sell(adx);
            }
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignalKind;
    use crate::indicators::make_candles;

    #[test]
    fn strong_uptrend_is_buy() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        let signal = AdxTrend::default().evaluate(&make_candles(&closes));
        assert_eq!(signal.signal, SignalKind::Buy);
        assert!(signal.strength >= 25.0);
    }

    #[test]
    fn strong_downtrend_is_sell() {
        let closes: Vec<f64> = (0..60).map(|i| 300.0 - i as f64 * 2.0).collect();
        let signal = AdxTrend::default().evaluate(&make_candles(&closes));
        assert_eq!(signal.signal, SignalKind::Sell);
    }

    #[test]
    fn choppy_market_is_neutral() {
        // ranges alternate up and down by one point, so +DM and -DM balance out
        let candles: Vec<Candle> = (0..60)
            .map(|i| {
                let (open, high, low, close) = if i % 2 == 0 {
                    (101.0, 102.0, 99.0, 100.0)
                } else {
                    (100.0, 103.0, 100.0, 101.0)
                };
                Candle {
                    time: i * 60_000,
                    open,
                    high,
                    low,
                    close,
                    volume: 1000.0,
                }
            })
            .collect();
        let signal = AdxTrend::default().evaluate(&candles);
        assert!(signal.is_neutral());
    }
}
