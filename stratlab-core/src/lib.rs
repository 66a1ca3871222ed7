//! StratLab Core — candles, indicator math, signal library, combiner, and the
//! single-series backtest simulator.
//!
//! Data flows one way:
//! candle history → indicators → strategy signals → combiner → position
//! state machine → trade records.
//!
//! Also home to the bot-side pieces that share the same domain types: grid
//! engine, price alerts, trade journal, and the key-value store they persist
//! through.

pub mod bot;
pub mod combiner;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signals;
pub mod store;

pub use combiner::{combine_signals, strongest_voter};
pub use domain::{Candle, CombinedSignal, ExitReason, IndicatorSignal, Side, SignalKind, Trade};
pub use engine::{simulate_series, RunControl, SeriesOutcome, SimulationParams};
pub use signals::{build_strategies, build_strategy, SignalStrategy, StrategyKind};
