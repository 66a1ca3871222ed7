//! Simulation parameters, run control, open-position state, and outcomes.

use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};

use crate::domain::{Side, Trade};

/// Candles skipped at the start of every series before trading begins.
pub const DEFAULT_WARMUP: usize = 50;

/// Parameters for simulating one (symbol, timeframe) series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationParams {
    pub initial_balance: f64,
    /// Percent of the current balance committed per entry.
    pub risk_per_trade: f64,
    /// Stop-loss threshold in percent of entry price.
    pub stop_loss: Option<f64>,
    /// Take-profit threshold in percent of entry price.
    pub take_profit: Option<f64>,
    pub warmup: usize,
    /// Force-close an open position on the final candle.
    pub close_at_end: bool,
}

impl SimulationParams {
    pub fn new(initial_balance: f64, risk_per_trade: f64) -> Self {
        Self {
            initial_balance,
            risk_per_trade,
            stop_loss: None,
            take_profit: None,
            warmup: DEFAULT_WARMUP,
            close_at_end: false,
        }
    }
}

/// Progress of one series, reported through [`RunControl`].
#[derive(Debug, Clone, PartialEq)]
pub struct RunProgress {
    /// `symbol/timeframe`
    pub series: String,
    pub processed: usize,
    pub total: usize,
}

/// Cooperative cancellation and progress reporting for a run.
///
/// Both hooks are optional; `RunControl::default()` disables them. The
/// progress callback may be invoked from several worker threads at once.
#[derive(Clone, Copy, Default)]
pub struct RunControl<'a> {
    pub cancel: Option<&'a AtomicBool>,
    pub progress: Option<&'a (dyn Fn(&RunProgress) + Sync)>,
}

impl<'a> RunControl<'a> {
    pub fn with_cancel(mut self, flag: &'a AtomicBool) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn with_progress(mut self, callback: &'a (dyn Fn(&RunProgress) + Sync)) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn report(&self, progress: &RunProgress) {
        if let Some(callback) = self.progress {
            callback(progress);
        }
    }
}

/// The single open position of a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenPosition {
    pub side: Side,
    pub entry_time: i64,
    pub entry_price: f64,
    pub size: f64,
    pub strategy: String,
    pub signal_strength: f64,
}

/// Everything one series simulation produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesOutcome {
    pub symbol: String,
    pub timeframe: String,
    /// Closed trades, in exit order.
    pub trades: Vec<Trade>,
    /// Starts at the initial balance; one point per closed trade.
    pub equity_curve: Vec<f64>,
    /// Drawdown percent, parallel to `equity_curve`.
    pub drawdowns: Vec<f64>,
    pub final_balance: f64,
    pub candles_processed: usize,
    /// Position still open after the last candle (not counted as a trade).
    pub open_position: Option<OpenPosition>,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("run cancelled")]
    Cancelled,

    #[error("invalid candle at index {index} (time {time})")]
    InvalidCandle { index: usize, time: i64 },
}
