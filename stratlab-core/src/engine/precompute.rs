//! Signal precomputation.
//!
//! Every strategy computes its full signal vector once before the candle loop;
//! the loop then reads column `i` of the matrix. Because strategies are
//! prefix-only, this equals evaluating each strategy on `candles[..=i]`.

use std::collections::BTreeMap;

use crate::domain::{Candle, IndicatorSignal};
use crate::signals::SignalStrategy;

/// Per-strategy signal vectors for one series.
#[derive(Debug, Clone, Default)]
pub struct SignalMatrix {
    names: Vec<String>,
    series: Vec<Vec<IndicatorSignal>>,
}

impl SignalMatrix {
    pub fn strategy_names(&self) -> &[String] {
        &self.names
    }

    /// Named signals at candle `index`. Out-of-range indices read as neutral.
    pub fn at(&self, index: usize) -> BTreeMap<String, IndicatorSignal> {
        self.names
            .iter()
            .zip(&self.series)
            .map(|(name, signals)| (name.clone(), signals.get(index).copied().unwrap_or_default()))
            .collect()
    }
}

pub fn precompute_signals(candles: &[Candle], strategies: &[Box<dyn SignalStrategy>]) -> SignalMatrix {
    let mut matrix = SignalMatrix::default();
    for strategy in strategies {
        let signals = strategy.compute(candles);
        debug_assert_eq!(
            signals.len(),
            candles.len(),
            "strategy '{}' produced {} signals for {} candles",
            strategy.name(),
            signals.len(),
            candles.len()
        );
        matrix.names.push(strategy.name().to_string());
        matrix.series.push(signals);
    }
    matrix
}

/// Longest lookback across a set of strategies.
pub fn compute_lookback(strategies: &[Box<dyn SignalStrategy>]) -> usize {
    strategies.iter().map(|s| s.lookback()).max().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::make_candles;
    use crate::signals::{build_strategies, StrategyKind};

    #[test]
    fn matrix_has_one_column_per_strategy() {
        let candles = make_candles(&(0..30).map(|i| 100.0 + i as f64).collect::<Vec<_>>());
        let strategies = build_strategies(&[StrategyKind::RsiReversion, StrategyKind::Breakout]);
        let matrix = precompute_signals(&candles, &strategies);
        assert_eq!(matrix.strategy_names(), &["rsi_reversion", "breakout"]);
        let row = matrix.at(29);
        assert_eq!(row.len(), 2);
        assert_eq!(row["rsi_reversion"], strategies[0].evaluate(&candles));
        assert!(matrix.at(1000).values().all(IndicatorSignal::is_neutral));
    }

    #[test]
    fn lookback_is_the_maximum() {
        let strategies = build_strategies(&[StrategyKind::ParabolicSar, StrategyKind::MacdDivergence]);
        assert_eq!(compute_lookback(&strategies), 34);
        assert_eq!(compute_lookback(&[]), 0);
    }
}
