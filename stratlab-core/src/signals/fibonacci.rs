//! Fibonacci retracement bounce.
//!
//! The swing is the highest high and lowest low of the `swing` candles before
//! the current one. If the high came after the low the swing is an uptrend and
//! retracement levels hang below the high; otherwise they sit above the low.
//! A close within `tolerance_pct` of a level, with a candle body pointing back
//! in the trend direction, fires: 38.2% → 50, 50% → 60, 61.8% → 70.

use crate::domain::{Candle, IndicatorSignal};

use super::{neutral_series, percent_from, SignalStrategy, StrategyKind};

const LEVELS: [(f64, f64); 3] = [(0.382, 50.0), (0.5, 60.0), (0.618, 70.0)];

#[derive(Debug, Clone)]
pub struct FibonacciRetracement {
    pub swing: usize,
    pub tolerance_pct: f64,
}

impl Default for FibonacciRetracement {
    fn default() -> Self {
        Self {
            swing: 50,
            tolerance_pct: 0.5,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Swing {
    high: f64,
    low: f64,
    uptrend: bool,
}

impl Swing {
    fn of(window: &[Candle]) -> Option<Self> {
        let (mut high, mut high_idx) = (f64::NEG_INFINITY, 0);
        let (mut low, mut low_idx) = (f64::INFINITY, 0);
        for (idx, c) in window.iter().enumerate() {
            if c.high > high {
                high = c.high;
                high_idx = idx;
            }
            if c.low < low {
                low = c.low;
                low_idx = idx;
            }
        }
        if !(high.is_finite() && low.is_finite()) || high <= low {
            return None;
        }
        Some(Self {
            high,
            low,
            uptrend: high_idx > low_idx,
        })
    }

    fn level(&self, ratio: f64) -> f64 {
        let range = self.high - self.low;
        if self.uptrend {
            self.high - range * ratio
        } else {
            self.low + range * ratio
        }
    }
}

impl FibonacciRetracement {
    /// Strength of the level closest to `close`, if one is within tolerance.
    fn nearest_level(&self, swing: &Swing, close: f64) -> Option<f64> {
        LEVELS
            .iter()
            .map(|&(ratio, strength)| (percent_from(close, swing.level(ratio)), strength))
            .filter(|&(distance, _)| distance <= self.tolerance_pct)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, strength)| strength)
    }
}

impl SignalStrategy for FibonacciRetracement {
    fn kind(&self) -> StrategyKind {
        StrategyKind::FibonacciRetracement
    }

    fn lookback(&self) -> usize {
        self.swing
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        let mut signals = neutral_series(candles.len());
        if self.swing < 2 || candles.len() <= self.swing {
            return signals;
        }

        for i in self.swing..candles.len() {
            let Some(swing) = Swing::of(&candles[i - self.swing..i]) else {
                continue;
            };
            let candle = &candles[i];
            let Some(strength) = self.nearest_level(&swing, candle.close) else {
                continue;
            };

            if swing.uptrend && candle.close > candle.open {
                signals[i] = IndicatorSignal::buy(strength);
            } else if !swing.uptrend && candle.close < candle.open {
                signals[i] = IndicatorSignal::sell(strength);
            }
        }

        signals
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::SignalKind;

    fn candle(i: i64, open: f64, high: f64, low: f64, close: f64) -> Candle {
        Candle {
            time: i * 60_000,
            open,
            high,
            low,
            close,
            volume: 1000.0,
        }
    }

    /// Rally from 100 to 200 over the swing window, then a bounce candle closing at `close`.
    fn rally_then(open: f64, close: f64) -> Vec<Candle> {
        let mut candles: Vec<Candle> = (0..10)
            .map(|i| {
                let base = 100.0 + i as f64 * 10.0;
                candle(i, base, base + 10.0, base, base + 10.0)
            })
            .collect();
        candles.push(candle(10, open, open.max(close), open.min(close), close));
        candles
    }

    fn strategy() -> FibonacciRetracement {
        FibonacciRetracement {
            swing: 10,
            tolerance_pct: 0.5,
        }
    }

    #[test]
    fn bounce_at_half_retracement_is_buy() {
        // swing 100..200, 50% level = 150
        let signals = strategy().compute(&rally_then(149.0, 150.2));
        assert_eq!(signals[10].signal, SignalKind::Buy);
        assert_eq!(signals[10].strength, 60.0);
    }

    #[test]
    fn deep_retracement_scores_higher() {
        // 61.8% level = 138.2
        let signals = strategy().compute(&rally_then(137.0, 138.3));
        assert_eq!(signals[10].signal, SignalKind::Buy);
        assert_eq!(signals[10].strength, 70.0);
    }

    #[test]
    fn bearish_body_at_level_in_uptrend_is_neutral() {
        let signals = strategy().compute(&rally_then(152.0, 150.1));
        assert!(signals[10].is_neutral());
    }

    #[test]
    fn far_from_levels_is_neutral() {
        let signals = strategy().compute(&rally_then(170.0, 175.0));
        assert!(signals[10].is_neutral());
    }

    #[test]
    fn downtrend_rally_to_level_is_sell() {
        let mut candles: Vec<Candle> = (0..10)
            .map(|i| {
                let base = 200.0 - i as f64 * 10.0;
                candle(i, base, base, base - 10.0, base - 10.0)
            })
            .collect();
        // swing 100..200 falling, 38.2% level = 138.2
        candles.push(candle(10, 139.5, 139.5, 138.0, 138.4));
        let signals = strategy().compute(&candles);
        assert_eq!(signals[10].signal, SignalKind::Sell);
        assert_eq!(signals[10].strength, 50.0);
    }
}
