//! MACD histogram zero-cross and price/momentum divergence.
//!
//! Two independent readings per candle:
//! - zero-cross: histogram moves from <= 0 to > 0 (bullish) or >= 0 to < 0 (bearish), strength 50
//! - divergence over the trailing `window` candles: close makes a new low while the
//!   histogram holds above its window low (bullish), or close makes a new high while
//!   the histogram stays below its window high (bearish), strength 60
//!
//! Both agreeing → 90. Disagreeing readings cancel out to neutral.

use crate::domain::{Candle, IndicatorSignal, SignalKind};
use crate::indicators::{closes, macd};

use super::{all_finite, neutral_series, SignalStrategy, StrategyKind};

#[derive(Debug, Clone)]
pub struct MacdDivergence {
    pub fast: usize,
    pub slow: usize,
    pub signal_period: usize,
    pub window: usize,
}

impl Default for MacdDivergence {
    fn default() -> Self {
        Self {
            fast: 12,
            slow: 26,
            signal_period: 9,
            window: 10,
        }
    }
}

impl MacdDivergence {
    /// First index with a defined histogram value.
    fn histogram_start(&self) -> usize {
        self.slow.max(self.fast) + self.signal_period - 2
    }

    fn zero_cross(histogram: &[f64], i: usize) -> SignalKind {
        let (prev, cur) = (histogram[i - 1], histogram[i]);
        if !all_finite(&[prev, cur]) {
            return SignalKind::Neutral;
        }
        if prev <= 0.0 && cur > 0.0 {
            SignalKind::Buy
        } else if prev >= 0.0 && cur < 0.0 {
            SignalKind::Sell
        } else {
            SignalKind::Neutral
        }
    }

    fn divergence(&self, closes: &[f64], histogram: &[f64], i: usize) -> SignalKind {
        if i < self.window {
            return SignalKind::Neutral;
        }
        let prior = i - self.window..i;
        if !all_finite(&histogram[prior.clone()]) || !histogram[i].is_finite() {
            return SignalKind::Neutral;
        }

        let prior_low = closes[prior.clone()].iter().copied().fold(f64::INFINITY, f64::min);
        let prior_high = closes[prior.clone()]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);
        let hist_low = histogram[prior.clone()]
            .iter()
            .copied()
            .fold(f64::INFINITY, f64::min);
        let hist_high = histogram[prior]
            .iter()
            .copied()
            .fold(f64::NEG_INFINITY, f64::max);

        if closes[i] < prior_low && histogram[i] > hist_low {
            SignalKind::Buy
        } else if closes[i] > prior_high && histogram[i] < hist_high {
            SignalKind::Sell
        } else {
            SignalKind::Neutral
        }
    }
}

impl SignalStrategy for MacdDivergence {
    fn kind(&self) -> StrategyKind {
        StrategyKind::MacdDivergence
    }

    fn lookback(&self) -> usize {
        self.histogram_start() + 1
    }

    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal> {
        let mut signals = neutral_series(candles.len());
        if candles.len() <= self.lookback() {
            return signals;
        }

        let closes = closes(candles);
        let histogram = macd(&closes, self.fast, self.slow, self.signal_period).histogram;

        for i in self.lookback()..candles.len() {
            let cross = Self::zero_cross(&histogram, i);
            let divergence = self.divergence(&closes, &histogram, i);

            signals[i] = match (cross, divergence) {
                (SignalKind::Neutral, SignalKind::Neutral) => IndicatorSignal::neutral(),
                (side, SignalKind::Neutral) => IndicatorSignal::new(side, 50.0),
                (SignalKind::Neutral, side) => IndicatorSignal::new(side, 60.0),
                (a, b) if a == b => IndicatorSignal::new(a, 90.0),
                _ => IndicatorSignal::neutral(),
            };
        }

        signals
    }
}
