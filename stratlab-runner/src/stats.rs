//! Backtest statistics — pure functions over a closed-trade list.
//!
//! No dependencies on the runner or the engine beyond the `Trade` record.
//! Every field is always populated; an empty trade list yields zeros and an
//! ending balance equal to the initial balance.

use std::fmt;

use serde::{Deserialize, Serialize};
use stratlab_core::domain::Trade;

/// Gross profit over gross loss.
///
/// A run with winners and no losers has no finite profit factor; it is
/// represented explicitly rather than as `f64::INFINITY` so it survives JSON.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfitFactor {
    Finite(f64),
    Unbounded,
}

impl ProfitFactor {
    /// Numeric value; `Unbounded` maps to `f64::INFINITY`.
    pub fn value(&self) -> f64 {
        match self {
            ProfitFactor::Finite(v) => *v,
            ProfitFactor::Unbounded => f64::INFINITY,
        }
    }

    pub fn is_unbounded(&self) -> bool {
        matches!(self, ProfitFactor::Unbounded)
    }
}

impl Default for ProfitFactor {
    fn default() -> Self {
        ProfitFactor::Finite(0.0)
    }
}

impl fmt::Display for ProfitFactor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProfitFactor::Finite(v) => write!(f, "{v:.2}"),
            ProfitFactor::Unbounded => f.write_str("∞"),
        }
    }
}

/// Aggregate statistics for one backtest.
///
/// Money fields are in quote currency. `average_loss` and `largest_loss` are
/// magnitudes (non-negative); percentages are in percent, not fractions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestStats {
    pub num_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub total_profit_loss: f64,
    pub total_return_percent: f64,
    pub average_win: f64,
    pub average_loss: f64,
    pub largest_win: f64,
    pub largest_loss: f64,
    pub profit_factor: ProfitFactor,
    pub sharpe_ratio: f64,
    pub risk_reward_ratio: f64,
    /// Largest drawdown of the merged equity curve, in percent.
    pub max_drawdown: f64,
    pub ending_balance: f64,
    pub average_trade_duration_ms: f64,
    pub max_consecutive_wins: usize,
    pub max_consecutive_losses: usize,
}

/// Compute every statistic from a chronological trade list.
pub fn calculate_backtest_stats(
    trades: &[Trade],
    initial_balance: f64,
    max_drawdown: f64,
) -> BacktestStats {
    let total_profit_loss: f64 = trades.iter().map(|t| t.profit_loss).sum();
    let total_return_percent = if initial_balance > 0.0 {
        total_profit_loss / initial_balance * 100.0
    } else {
        0.0
    };
    let average_win = average_win(trades);
    let average_loss = average_loss(trades);

    BacktestStats {
        num_trades: trades.len(),
        winning_trades: trades.iter().filter(|t| t.is_winner()).count(),
        losing_trades: trades.iter().filter(|t| t.is_loser()).count(),
        win_rate: win_rate(trades),
        total_profit_loss,
        total_return_percent,
        average_win,
        average_loss,
        largest_win: largest_win(trades),
        largest_loss: largest_loss(trades),
        profit_factor: profit_factor(trades),
        sharpe_ratio: sharpe_ratio(trades),
        risk_reward_ratio: if average_loss > 0.0 {
            average_win / average_loss
        } else {
            0.0
        },
        max_drawdown,
        ending_balance: initial_balance + total_profit_loss,
        average_trade_duration_ms: mean_f64(
            &trades.iter().map(|t| t.duration_ms() as f64).collect::<Vec<_>>(),
        ),
        max_consecutive_wins: max_consecutive(trades, Trade::is_winner),
        max_consecutive_losses: max_consecutive(trades, Trade::is_loser),
    }
}

// ─── Individual metric functions ────────────────────────────────────

/// Winning trades as a percentage of all trades.
pub fn win_rate(trades: &[Trade]) -> f64 {
    if trades.is_empty() {
        return 0.0;
    }
    let winners = trades.iter().filter(|t| t.is_winner()).count();
    winners as f64 / trades.len() as f64 * 100.0
}

pub fn profit_factor(trades: &[Trade]) -> ProfitFactor {
    let gross_profit: f64 = trades
        .iter()
        .filter(|t| t.is_winner())
        .map(|t| t.profit_loss)
        .sum();
    let gross_loss: f64 = trades
        .iter()
        .filter(|t| t.is_loser())
        .map(|t| t.profit_loss.abs())
        .sum();

    if gross_loss == 0.0 {
        return if gross_profit > 0.0 {
            ProfitFactor::Unbounded
        } else {
            ProfitFactor::Finite(0.0)
        };
    }
    ProfitFactor::Finite(gross_profit / gross_loss)
}

/// Annualized Sharpe ratio over per-trade percent returns.
///
/// Sharpe = mean(returns) / sample_std(returns) * sqrt(252).
/// Returns 0.0 with fewer than 2 trades or zero variance.
pub fn sharpe_ratio(trades: &[Trade]) -> f64 {
    if trades.len() < 2 {
        return 0.0;
    }
    let returns: Vec<f64> = trades.iter().map(|t| t.profit_loss_percent).collect();
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    mean_f64(&returns) / std * (252.0_f64).sqrt()
}

pub fn average_win(trades: &[Trade]) -> f64 {
    let wins: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_winner())
        .map(|t| t.profit_loss)
        .collect();
    mean_f64(&wins)
}

/// Mean losing P&L as a magnitude.
pub fn average_loss(trades: &[Trade]) -> f64 {
    let losses: Vec<f64> = trades
        .iter()
        .filter(|t| t.is_loser())
        .map(|t| t.profit_loss.abs())
        .collect();
    mean_f64(&losses)
}

pub fn largest_win(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .map(|t| t.profit_loss)
        .fold(0.0, f64::max)
}

/// Worst losing P&L as a magnitude.
pub fn largest_loss(trades: &[Trade]) -> f64 {
    trades
        .iter()
        .map(|t| -t.profit_loss)
        .fold(0.0, f64::max)
}

/// First trade with the highest P&L.
pub fn best_trade(trades: &[Trade]) -> Option<&Trade> {
    trades.iter().fold(None, |best, t| match best {
        Some(b) if b.profit_loss >= t.profit_loss => Some(b),
        _ => Some(t),
    })
}

/// First trade with the lowest P&L.
pub fn worst_trade(trades: &[Trade]) -> Option<&Trade> {
    trades.iter().fold(None, |worst, t| match worst {
        Some(w) if w.profit_loss <= t.profit_loss => Some(w),
        _ => Some(t),
    })
}

// ─── Helpers ────────────────────────────────────────────────────────

pub(crate) fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

pub(crate) fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

fn max_consecutive(trades: &[Trade], counts: fn(&Trade) -> bool) -> usize {
    let mut max_streak = 0;
    let mut current = 0;

    for trade in trades {
        if counts(trade) {
            current += 1;
            max_streak = max_streak.max(current);
        } else {
            current = 0;
        }
    }
    max_streak
}
