//! Backtest runner — validates options and data, simulates every requested
//! (symbol, timeframe) series, and merges the outcomes.
//!
//! Two entry points:
//! - `run_backtest()`: plain run, no hooks. Used by tests and library callers.
//! - `run_backtest_with_control()`: same run with cancellation and progress.
//!   Used by the CLI.
//!
//! Series are independent and simulated in parallel with rayon; each one
//! starts from the full initial balance. The merge is deterministic
//! regardless of thread scheduling.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use stratlab_core::combiner::combine_signals;
use stratlab_core::domain::{
    filter_window, validate_series, Candle, CombinedSignal, IndicatorSignal, SeriesError, Trade,
};
use stratlab_core::engine::{
    drawdown_series, equity_curve, max_drawdown, simulate_series, EngineError, OpenPosition,
    RunControl, SeriesOutcome,
};
use stratlab_core::signals::{build_strategies, StrategyKind};

use crate::config::{BacktestOptions, OptionsError};
use crate::stats::{best_trade, calculate_backtest_stats, worst_trade, BacktestStats};

/// Candle history keyed by symbol, then timeframe.
pub type CandleSet = BTreeMap<String, BTreeMap<String, Vec<Candle>>>;

/// Current schema version for persisted results.
pub const SCHEMA_VERSION: u32 = 1;

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(#[from] OptionsError),

    #[error("malformed candles for {symbol}/{timeframe}: {source}")]
    MalformedInput {
        symbol: String,
        timeframe: String,
        source: SeriesError,
    },

    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
}

/// Why a requested series did not take part in the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// No candles for this (symbol, timeframe) in the input.
    Missing,
    /// Fewer candles inside the time window than the warm-up needs.
    InsufficientData { available: usize, required: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSeries {
    pub symbol: String,
    pub timeframe: String,
    pub reason: SkipReason,
}

/// Per-series view of a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSummary {
    pub symbol: String,
    pub timeframe: String,
    pub candles: usize,
    pub trades: usize,
    pub profit_loss: f64,
    pub final_balance: f64,
    pub max_drawdown: f64,
    /// Position left open after the last candle; not counted in the stats.
    pub open_position: Option<OpenPosition>,
}

impl SeriesSummary {
    fn from_outcome(outcome: &SeriesOutcome, candles: usize, initial_balance: f64) -> Self {
        Self {
            symbol: outcome.symbol.clone(),
            timeframe: outcome.timeframe.clone(),
            candles,
            trades: outcome.trades.len(),
            profit_loss: outcome.final_balance - initial_balance,
            final_balance: outcome.final_balance,
            max_drawdown: max_drawdown(&outcome.drawdowns),
            open_position: outcome.open_position.clone(),
        }
    }
}

/// Complete result of one backtest run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BacktestResult {
    /// Schema version for forward-compatible deserialization.
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    /// BLAKE3 fingerprint of the options that produced this result.
    pub options_fingerprint: String,
    /// Closed trades across every series, ordered by exit time.
    pub trades: Vec<Trade>,
    pub stats: BacktestStats,
    /// Starts at the initial balance; one point per merged trade.
    pub equity_curve: Vec<f64>,
    /// Drawdown percent from the running peak, parallel to `equity_curve`.
    pub drawdowns: Vec<f64>,
    pub best_trade: Option<Trade>,
    pub worst_trade: Option<Trade>,
    pub series: Vec<SeriesSummary>,
    pub skipped: Vec<SkippedSeries>,
}

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Run a backtest with no cancellation or progress hooks.
pub fn run_backtest(
    candles: &CandleSet,
    options: &BacktestOptions,
) -> Result<BacktestResult, RunError> {
    run_backtest_with_control(candles, options, &RunControl::default())
}

/// Run a backtest, checking `control` for cancellation on every candle.
pub fn run_backtest_with_control(
    candles: &CandleSet,
    options: &BacktestOptions,
    control: &RunControl<'_>,
) -> Result<BacktestResult, RunError> {
    options.validate()?;

    let requested = requested_series(candles, options);

    // Reject malformed input before any simulation starts.
    for (symbol, timeframe, series) in &requested {
        if let Some(series) = series {
            validate_series(series).map_err(|source| RunError::MalformedInput {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
                source,
            })?;
        }
    }

    let mut jobs: Vec<(&str, &str, &[Candle])> = Vec::new();
    let mut skipped = Vec::new();
    for (symbol, timeframe, series) in requested {
        let reason = match series {
            None => Some(SkipReason::Missing),
            Some(series) => {
                let window = filter_window(series, options.start_time, options.end_time);
                if window.len() < options.warmup {
                    Some(SkipReason::InsufficientData {
                        available: window.len(),
                        required: options.warmup,
                    })
                } else {
                    jobs.push((symbol, timeframe, window));
                    None
                }
            }
        };
        if let Some(reason) = reason {
            warn!(symbol, timeframe, ?reason, "Skipping series");
            skipped.push(SkippedSeries {
                symbol: symbol.to_string(),
                timeframe: timeframe.to_string(),
                reason,
            });
        }
    }

    let kinds = options.strategy_kinds();
    let strategies = build_strategies(&kinds);
    let params = options.to_simulation_params();

    info!(
        series = jobs.len(),
        skipped = skipped.len(),
        strategies = strategies.len(),
        "Backtest started"
    );

    let outcomes: Vec<(SeriesOutcome, usize)> = jobs
        .par_iter()
        .map(|&(symbol, timeframe, window)| {
            simulate_series(symbol, timeframe, window, &strategies, &params, control)
                .map(|outcome| (outcome, window.len()))
        })
        .collect::<Result<_, EngineError>>()?;

    let series: Vec<SeriesSummary> = outcomes
        .iter()
        .map(|(outcome, len)| SeriesSummary::from_outcome(outcome, *len, options.initial_balance))
        .collect();

    let mut trades: Vec<Trade> = outcomes
        .into_iter()
        .flat_map(|(outcome, _)| outcome.trades)
        .collect();
    trades.sort_by(merge_order);

    let curve = equity_curve(options.initial_balance, &trades);
    let drawdowns = drawdown_series(&curve);
    let stats = calculate_backtest_stats(&trades, options.initial_balance, max_drawdown(&drawdowns));

    info!(
        trades = stats.num_trades,
        win_rate = stats.win_rate,
        ending_balance = stats.ending_balance,
        max_drawdown = stats.max_drawdown,
        "Backtest finished"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        options_fingerprint: options.fingerprint(),
        best_trade: best_trade(&trades).cloned(),
        worst_trade: worst_trade(&trades).cloned(),
        trades,
        stats,
        equity_curve: curve,
        drawdowns,
        series,
        skipped,
    })
}

/// Every requested (symbol, timeframe) pair, with its candles if present.
fn requested_series<'a>(
    candles: &'a CandleSet,
    options: &'a BacktestOptions,
) -> Vec<(&'a str, &'a str, Option<&'a [Candle]>)> {
    let mut out = Vec::with_capacity(options.symbols.len() * options.timeframes.len());
    for symbol in &options.symbols {
        for timeframe in &options.timeframes {
            let series = candles
                .get(symbol)
                .and_then(|by_tf| by_tf.get(timeframe))
                .filter(|c| !c.is_empty())
                .map(Vec::as_slice);
            out.push((symbol.as_str(), timeframe.as_str(), series));
        }
    }
    out
}

/// Chronological by exit, then entry, then series identity.
fn merge_order(a: &Trade, b: &Trade) -> Ordering {
    a.exit_time
        .cmp(&b.exit_time)
        .then(a.entry_time.cmp(&b.entry_time))
        .then_with(|| a.symbol.cmp(&b.symbol))
        .then_with(|| a.timeframe.cmp(&b.timeframe))
}

// ─── Live signals ───────────────────────────────────────────────────

/// Latest signal of every strategy on one series, plus the combined vote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSignals {
    pub symbol: String,
    pub timeframe: String,
    /// Time of the last candle, `None` for an empty series.
    pub time: Option<i64>,
    pub votes: BTreeMap<String, IndicatorSignal>,
    pub combined: CombinedSignal,
}

/// Evaluate `kinds` on the last candle of every series in the set.
///
/// Every series is validated first; a malformed one fails the whole call.
pub fn latest_signals(
    candles: &CandleSet,
    kinds: &[StrategyKind],
) -> Result<Vec<SeriesSignals>, RunError> {
    for (symbol, by_tf) in candles {
        for (timeframe, series) in by_tf {
            validate_series(series).map_err(|source| RunError::MalformedInput {
                symbol: symbol.clone(),
                timeframe: timeframe.clone(),
                source,
            })?;
        }
    }

    let strategies = build_strategies(kinds);
    let mut out = Vec::new();
    for (symbol, by_tf) in candles {
        for (timeframe, series) in by_tf {
            let votes: BTreeMap<String, IndicatorSignal> = strategies
                .iter()
                .map(|s| (s.name().to_string(), s.evaluate(series)))
                .collect();
            let combined = combine_signals(&votes);
            out.push(SeriesSignals {
                symbol: symbol.clone(),
                timeframe: timeframe.clone(),
                time: series.last().map(|c| c.time),
                votes,
                combined,
            });
        }
    }
    Ok(out)
}
