//! Signal library — independent strategies mapping candle history to a
//! directional signal with a strength in `[0, 100]`.
//!
//! Strategies are pure: `compute` returns one signal per candle, and the entry
//! at index `i` depends only on `candles[..=i]`. Short histories yield neutral
//! signals, never errors.

pub mod adx_trend;
pub mod bollinger_squeeze;
pub mod breakout;
pub mod cci;
pub mod ema_crossover;
pub mod fibonacci;
pub mod macd_divergence;
pub mod momentum_rsi;
pub mod parabolic_sar;
pub mod rsi_reversion;
pub mod stochastic;
pub mod supertrend;
pub mod volume_spike;
pub mod vwap_deviation;
pub mod williams_r;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::{Candle, IndicatorSignal};

pub use adx_trend::AdxTrend;
pub use bollinger_squeeze::BollingerSqueeze;
pub use breakout::Breakout;
pub use cci::CciReversion;
pub use ema_crossover::EmaCrossover;
pub use fibonacci::FibonacciRetracement;
pub use macd_divergence::MacdDivergence;
pub use momentum_rsi::MomentumRsi;
pub use parabolic_sar::ParabolicSarFlip;
pub use rsi_reversion::RsiReversion;
pub use stochastic::StochasticCross;
pub use supertrend::SupertrendFlip;
pub use volume_spike::VolumeSpike;
pub use vwap_deviation::VwapDeviation;
pub use williams_r::WilliamsR;

/// A named signal generator.
///
/// # Look-ahead invariant
/// `compute(candles)[i]` must equal `compute(&candles[..=i])[i]`. Implementations
/// only read indicator values at or before the index they emit for.
pub trait SignalStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// Strategy name as used in configuration and trade records.
    fn name(&self) -> &str {
        self.kind().name()
    }

    /// Number of leading candles that always produce a neutral signal.
    fn lookback(&self) -> usize;

    /// One signal per candle.
    fn compute(&self, candles: &[Candle]) -> Vec<IndicatorSignal>;

    /// Signal for the last candle; neutral for an empty slice.
    fn evaluate(&self, candles: &[Candle]) -> IndicatorSignal {
        self.compute(candles).last().copied().unwrap_or_default()
    }
}

// ─── Strategy kinds ──────────────────────────────────────────────────

/// Every strategy the library knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    RsiReversion,
    EmaCrossover,
    MacdDivergence,
    BollingerSqueeze,
    VolumeSpike,
    AdxTrend,
    Supertrend,
    FibonacciRetracement,
    Cci,
    Stochastic,
    WilliamsR,
    ParabolicSar,
    VwapDeviation,
    Breakout,
    MomentumRsi,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 15] = [
        StrategyKind::RsiReversion,
        StrategyKind::EmaCrossover,
        StrategyKind::MacdDivergence,
        StrategyKind::BollingerSqueeze,
        StrategyKind::VolumeSpike,
        StrategyKind::AdxTrend,
        StrategyKind::Supertrend,
        StrategyKind::FibonacciRetracement,
        StrategyKind::Cci,
        StrategyKind::Stochastic,
        StrategyKind::WilliamsR,
        StrategyKind::ParabolicSar,
        StrategyKind::VwapDeviation,
        StrategyKind::Breakout,
        StrategyKind::MomentumRsi,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StrategyKind::RsiReversion => "rsi_reversion",
            StrategyKind::EmaCrossover => "ema_crossover",
            StrategyKind::MacdDivergence => "macd_divergence",
            StrategyKind::BollingerSqueeze => "bollinger_squeeze",
            StrategyKind::VolumeSpike => "volume_spike",
            StrategyKind::AdxTrend => "adx_trend",
            StrategyKind::Supertrend => "supertrend",
            StrategyKind::FibonacciRetracement => "fibonacci_retracement",
            StrategyKind::Cci => "cci",
            StrategyKind::Stochastic => "stochastic",
            StrategyKind::WilliamsR => "williams_r",
            StrategyKind::ParabolicSar => "parabolic_sar",
            StrategyKind::VwapDeviation => "vwap_deviation",
            StrategyKind::Breakout => "breakout",
            StrategyKind::MomentumRsi => "momentum_rsi",
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when parsing a strategy name that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown strategy '{name}', expected one of: {valid}")]
pub struct UnknownStrategy {
    pub name: String,
    pub valid: String,
}

impl FromStr for StrategyKind {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        StrategyKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name() == wanted)
            .ok_or_else(|| UnknownStrategy {
                name: wanted.to_string(),
                valid: StrategyKind::ALL
                    .iter()
                    .map(StrategyKind::name)
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}

// ─── Factory ─────────────────────────────────────────────────────────

/// Build a strategy with its default parameters.
pub fn build_strategy(kind: StrategyKind) -> Box<dyn SignalStrategy> {
    match kind {
        StrategyKind::RsiReversion => Box::new(RsiReversion::default()),
        StrategyKind::EmaCrossover => Box::new(EmaCrossover::default()),
        StrategyKind::MacdDivergence => Box::new(MacdDivergence::default()),
        StrategyKind::BollingerSqueeze => Box::new(BollingerSqueeze::default()),
        StrategyKind::VolumeSpike => Box::new(VolumeSpike::default()),
        StrategyKind::AdxTrend => Box::new(AdxTrend::default()),
        StrategyKind::Supertrend => Box::new(SupertrendFlip::default()),
        StrategyKind::FibonacciRetracement => Box::new(FibonacciRetracement::default()),
        StrategyKind::Cci => Box::new(CciReversion::default()),
        StrategyKind::Stochastic => Box::new(StochasticCross::default()),
        StrategyKind::WilliamsR => Box::new(WilliamsR::default()),
        StrategyKind::ParabolicSar => Box::new(ParabolicSarFlip::default()),
        StrategyKind::VwapDeviation => Box::new(VwapDeviation::default()),
        StrategyKind::Breakout => Box::new(Breakout::default()),
        StrategyKind::MomentumRsi => Box::new(MomentumRsi::default()),
    }
}

/// Build default-parameter instances for each kind, in the given order.
pub fn build_strategies(kinds: &[StrategyKind]) -> Vec<Box<dyn SignalStrategy>> {
    kinds.iter().copied().map(build_strategy).collect()
}

// ─── Helpers ─────────────────────────────────────────────────────────

pub(crate) fn neutral_series(n: usize) -> Vec<IndicatorSignal> {
    vec![IndicatorSignal::neutral(); n]
}

/// True when every value is a usable number.
pub(crate) fn all_finite(values: &[f64]) -> bool {
    values.iter().all(|v| v.is_finite())
}

/// Percent distance of `value` from `reference`.
pub(crate) fn percent_from(value: f64, reference: f64) -> f64 {
    if reference == 0.0 {
        return 0.0;
    }
    (value - reference).abs() / reference.abs() * 100.0
}
