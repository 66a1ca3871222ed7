//! StratLab Runner — backtest orchestration, statistics, options, and I/O.
//!
//! This crate builds on `stratlab-core` to provide:
//! - `run_backtest` across many (symbol, timeframe) series, in parallel
//! - Backtest statistics (win rate, Sharpe, profit factor, streaks)
//! - TOML options with validation and run fingerprints
//! - Candle loading from CSV/JSON and deterministic synthetic candles
//! - JSON/CSV export and text summaries

pub mod config;
pub mod data_loader;
pub mod export;
pub mod runner;
pub mod stats;
pub mod synthetic;

pub use config::{load_options, BacktestOptions, OptionsError};
pub use data_loader::{load_candles, load_candles_csv, load_candles_json, LoadError};
pub use export::{export_equity_csv, export_json, export_trades_csv, save_artifacts};
pub use runner::{
    latest_signals, run_backtest, run_backtest_with_control, BacktestResult, CandleSet, RunError,
    SeriesSignals, SeriesSummary, SkipReason, SkippedSeries,
};
pub use stats::{calculate_backtest_stats, BacktestStats, ProfitFactor};
pub use synthetic::{synthetic_candle_set, synthetic_candles};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn options_are_send_sync() {
        assert_send::<BacktestOptions>();
        assert_sync::<BacktestOptions>();
    }

    #[test]
    fn stats_are_send_sync() {
        assert_send::<BacktestStats>();
        assert_sync::<BacktestStats>();
    }

    #[test]
    fn errors_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<LoadError>();
        assert_sync::<LoadError>();
    }
}
