//! Equity curve and drawdown bookkeeping.
//!
//! The curve starts at the initial balance and gains one point per closed
//! trade. Drawdown at each point is the percent drop from the running peak,
//! never negative, and zero at every new peak.

use crate::domain::Trade;

/// Running equity and drawdown tracker.
#[derive(Debug, Clone)]
pub struct EquityTracker {
    peak: f64,
    equity_curve: Vec<f64>,
    drawdowns: Vec<f64>,
}

impl EquityTracker {
    pub fn new(initial_balance: f64) -> Self {
        Self {
            peak: initial_balance,
            equity_curve: vec![initial_balance],
            drawdowns: vec![0.0],
        }
    }

    pub fn balance(&self) -> f64 {
        self.equity_curve.last().copied().unwrap_or(self.peak)
    }

    /// Apply a realized P&L and append the new balance.
    pub fn record(&mut self, profit_loss: f64) -> f64 {
        let balance = self.balance() + profit_loss;
        self.peak = self.peak.max(balance);
        self.equity_curve.push(balance);
        self.drawdowns.push(drawdown_pct(self.peak, balance));
        balance
    }

    pub fn equity_curve(&self) -> &[f64] {
        &self.equity_curve
    }

    pub fn drawdowns(&self) -> &[f64] {
        &self.drawdowns
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<f64>) {
        (self.equity_curve, self.drawdowns)
    }
}

fn drawdown_pct(peak: f64, equity: f64) -> f64 {
    if peak <= 0.0 {
        return 0.0;
    }
    ((peak - equity) / peak * 100.0).max(0.0)
}

/// Equity curve from an initial balance and trades in chronological order.
pub fn equity_curve(initial_balance: f64, trades: &[Trade]) -> Vec<f64> {
    let mut tracker = EquityTracker::new(initial_balance);
    for trade in trades {
        tracker.record(trade.profit_loss);
    }
    tracker.into_parts().0
}

/// Drawdown percent for every point of an equity curve.
pub fn drawdown_series(equity: &[f64]) -> Vec<f64> {
    let mut peak = f64::NEG_INFINITY;
    equity
        .iter()
        .map(|&value| {
            peak = peak.max(value);
            drawdown_pct(peak, value)
        })
        .collect()
}

/// Largest value of a drawdown series, 0 when empty.
pub fn max_drawdown(drawdowns: &[f64]) -> f64 {
    drawdowns.iter().copied().fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::assert_approx;

    #[test]
    fn tracker_follows_balance_and_peak() {
        let mut tracker = EquityTracker::new(1000.0);
        tracker.record(100.0);
        tracker.record(-220.0);
        tracker.record(300.0);
        assert_eq!(tracker.equity_curve(), &[1000.0, 1100.0, 880.0, 1180.0]);
        assert_eq!(tracker.drawdowns()[0], 0.0);
        assert_eq!(tracker.drawdowns()[1], 0.0);
        assert_approx(tracker.drawdowns()[2], 20.0, 1e-9);
        assert_eq!(tracker.drawdowns()[3], 0.0);
        assert_eq!(tracker.balance(), 1180.0);
    }

    #[test]
    fn drawdown_series_matches_tracker() {
        let mut tracker = EquityTracker::new(500.0);
        for pnl in [-50.0, 25.0, 100.0, -200.0] {
            tracker.record(pnl);
        }
        let recomputed = drawdown_series(tracker.equity_curve());
        for (a, b) in recomputed.iter().zip(tracker.drawdowns()) {
            assert_approx(*a, *b, 1e-12);
        }
        assert_approx(max_drawdown(&recomputed), 200.0 / 575.0 * 100.0, 1e-9);
    }

    #[test]
    fn empty_series_has_zero_max_drawdown() {
        assert_eq!(max_drawdown(&[]), 0.0);
        assert!(drawdown_series(&[]).is_empty());
    }
}
