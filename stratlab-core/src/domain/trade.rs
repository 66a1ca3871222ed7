//! Trade — a completed round-trip position.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Side of a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Long,
    Short,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => f.write_str("long"),
            Side::Short => f.write_str("short"),
        }
    }
}

/// What closed a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExitReason {
    /// The combiner voted for the opposite side.
    Signal,
    StopLoss,
    TakeProfit,
    /// Forced close on the last candle of the series.
    EndOfData,
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExitReason::Signal => "signal",
            ExitReason::StopLoss => "stop_loss",
            ExitReason::TakeProfit => "take_profit",
            ExitReason::EndOfData => "end_of_data",
        };
        f.write_str(s)
    }
}

/// A completed round-trip trade.
///
/// Only created when a position exits; an open position is simulator state,
/// not a `Trade`. Never mutated after creation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub symbol: String,
    pub timeframe: String,
    pub side: Side,

    pub entry_time: i64,
    pub entry_price: f64,
    pub exit_time: i64,
    pub exit_price: f64,

    /// Units of the base asset.
    pub size: f64,

    pub profit_loss: f64,
    /// Return on the entry notional, in percent.
    pub profit_loss_percent: f64,

    /// Strategy with the strongest vote on the entry side.
    pub strategy: String,
    /// Combined signal strength at entry.
    pub signal_strength: f64,
    pub exit_reason: ExitReason,
}

impl Trade {
    pub fn is_winner(&self) -> bool {
        self.profit_loss > 0.0
    }

    pub fn is_loser(&self) -> bool {
        self.profit_loss < 0.0
    }

    pub fn duration_ms(&self) -> i64 {
        self.exit_time - self.entry_time
    }
}

/// Signed P&L of closing `size` units at `exit_price`.
pub fn profit_loss(side: Side, entry_price: f64, exit_price: f64, size: f64) -> f64 {
    match side {
        Side::Long => (exit_price - entry_price) * size,
        Side::Short => (entry_price - exit_price) * size,
    }
}
