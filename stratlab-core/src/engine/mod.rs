//! Backtest engine — replays one candle series through the signal library,
//! the combiner, and a single-slot position state machine.
//!
//! Series are independent: callers run as many as they like, in parallel if
//! they wish, and merge the outcomes.

pub mod accounting;
pub mod precompute;
pub mod simulator;
pub mod state;

pub use accounting::{drawdown_series, equity_curve, max_drawdown, EquityTracker};
pub use precompute::{compute_lookback, precompute_signals, SignalMatrix};
pub use simulator::{simulate_series, SeriesSimulator};
pub use state::{
    EngineError, OpenPosition, RunControl, RunProgress, SeriesOutcome, SimulationParams,
    DEFAULT_WARMUP,
};
