//! Single-series simulator — replays candles through the combiner and a
//! one-slot position state machine.
//!
//! Per candle after warm-up:
//! 1. Combine the strategies' signals at this candle
//! 2. In a position: exit on an opposite signal, else stop-loss, else take-profit
//! 3. Flat (and not just exited): open on a buy or sell consensus
//!
//! Fills happen at the candle close. A candle that closes a position never
//! opens a new one.

use tracing::debug;

use crate::combiner::{combine_signals, strongest_voter};
use crate::domain::{profit_loss, Candle, CombinedSignal, ExitReason, IndicatorSignal, Side, SignalKind, Trade};
use crate::signals::SignalStrategy;

use super::accounting::EquityTracker;
use super::precompute::precompute_signals;
use super::state::{EngineError, OpenPosition, RunControl, RunProgress, SeriesOutcome, SimulationParams};

use std::collections::BTreeMap;

/// Candles between progress reports.
const PROGRESS_STRIDE: usize = 256;

/// Simulate one (symbol, timeframe) series.
pub fn simulate_series(
    symbol: &str,
    timeframe: &str,
    candles: &[Candle],
    strategies: &[Box<dyn SignalStrategy>],
    params: &SimulationParams,
    control: &RunControl<'_>,
) -> Result<SeriesOutcome, EngineError> {
    SeriesSimulator::new(symbol, timeframe, params).run(candles, strategies, control)
}

/// Mutable state of one series simulation.
pub struct SeriesSimulator<'a> {
    symbol: &'a str,
    timeframe: &'a str,
    params: &'a SimulationParams,
    equity: EquityTracker,
    position: Option<OpenPosition>,
    trades: Vec<Trade>,
}

impl<'a> SeriesSimulator<'a> {
    pub fn new(symbol: &'a str, timeframe: &'a str, params: &'a SimulationParams) -> Self {
        Self {
            symbol,
            timeframe,
            params,
            equity: EquityTracker::new(params.initial_balance),
            position: None,
            trades: Vec::new(),
        }
    }

    pub fn run(
        mut self,
        candles: &[Candle],
        strategies: &[Box<dyn SignalStrategy>],
        control: &RunControl<'_>,
    ) -> Result<SeriesOutcome, EngineError> {
        if let Some(index) = candles.iter().position(|c| !c.is_sane()) {
            return Err(EngineError::InvalidCandle {
                index,
                time: candles[index].time,
            });
        }

        let label = format!("{}/{}", self.symbol, self.timeframe);
        debug!(
            series = %label,
            candles = candles.len(),
            strategies = strategies.len(),
            warmup = self.params.warmup,
            "Simulating series"
        );

        let matrix = precompute_signals(candles, strategies);
        let total = candles.len();
        let last = total.saturating_sub(1);

        for (i, candle) in candles.iter().enumerate().skip(self.params.warmup) {
            if control.is_cancelled() {
                return Err(EngineError::Cancelled);
            }

            let votes = matrix.at(i);
            let combined = combine_signals(&votes);
            self.step(candle, combined, &votes, i == last);

            if (i + 1) % PROGRESS_STRIDE == 0 {
                control.report(&RunProgress {
                    series: label.clone(),
                    processed: i + 1,
                    total,
                });
            }
        }

        control.report(&RunProgress {
            series: label,
            processed: total,
            total,
        });

        Ok(self.finish(total))
    }

    /// Advance the state machine by one candle.
    pub fn step(
        &mut self,
        candle: &Candle,
        combined: CombinedSignal,
        votes: &BTreeMap<String, IndicatorSignal>,
        is_last: bool,
    ) {
        if self.position.is_some() {
            let reason = self
                .position
                .as_ref()
                .and_then(|position| self.exit_reason(position, candle, combined));
            if let Some(reason) = reason {
                self.close(candle, reason);
            } else if is_last && self.params.close_at_end {
                self.close(candle, ExitReason::EndOfData);
            }
            return;
        }

        // an entry on the final candle could never be force-closed
        if is_last && self.params.close_at_end {
            return;
        }
        self.open(candle, combined, votes);
    }

    fn exit_reason(
        &self,
        position: &OpenPosition,
        candle: &Candle,
        combined: CombinedSignal,
    ) -> Option<ExitReason> {
        let entry = position.entry_price;
        match position.side {
            Side::Long => {
                if combined.signal == SignalKind::Sell {
                    Some(ExitReason::Signal)
                } else if self
                    .params
                    .stop_loss
                    .is_some_and(|sl| candle.low < entry * (1.0 - sl / 100.0))
                {
                    Some(ExitReason::StopLoss)
                } else if self
                    .params
                    .take_profit
                    .is_some_and(|tp| candle.high > entry * (1.0 + tp / 100.0))
                {
                    Some(ExitReason::TakeProfit)
                } else {
                    None
                }
            }
            Side::Short => {
                if combined.signal == SignalKind::Buy {
                    Some(ExitReason::Signal)
                } else if self
                    .params
                    .stop_loss
                    .is_some_and(|sl| candle.high > entry * (1.0 + sl / 100.0))
                {
                    Some(ExitReason::StopLoss)
                } else if self
                    .params
                    .take_profit
                    .is_some_and(|tp| candle.low < entry * (1.0 - tp / 100.0))
                {
                    Some(ExitReason::TakeProfit)
                } else {
                    None
                }
            }
        }
    }

    fn open(
        &mut self,
        candle: &Candle,
        combined: CombinedSignal,
        votes: &BTreeMap<String, IndicatorSignal>,
    ) {
        let side = match combined.signal {
            SignalKind::Buy => Side::Long,
            SignalKind::Sell => Side::Short,
            SignalKind::Neutral => return,
        };

        let size = (self.equity.balance() * self.params.risk_per_trade / 100.0) / candle.close;
        if !size.is_finite() || size <= 0.0 {
            return;
        }

        let strategy = strongest_voter(votes, combined.signal)
            .map(|(name, _)| name.to_string())
            .unwrap_or_default();

        debug!(
            symbol = self.symbol,
            timeframe = self.timeframe,
            side = %side,
            time = candle.time,
            price = candle.close,
            size,
            strategy = %strategy,
            strength = combined.strength,
            "Opened position"
        );

        self.position = Some(OpenPosition {
            side,
            entry_time: candle.time,
            entry_price: candle.close,
            size,
            strategy,
            signal_strength: combined.strength,
        });
    }

    fn close(&mut self, candle: &Candle, reason: ExitReason) {
        let Some(position) = self.position.take() else {
            return;
        };

        let exit_price = candle.close;
        let pnl = profit_loss(position.side, position.entry_price, exit_price, position.size);
        let notional = position.entry_price * position.size;
        let pnl_percent = if notional > 0.0 {
            pnl / notional * 100.0
        } else {
            0.0
        };
        let balance = self.equity.record(pnl);

        debug!(
            symbol = self.symbol,
            timeframe = self.timeframe,
            side = %position.side,
            time = candle.time,
            price = exit_price,
            pnl,
            reason = %reason,
            balance,
            "Closed position"
        );

        self.trades.push(Trade {
            symbol: self.symbol.to_string(),
            timeframe: self.timeframe.to_string(),
            side: position.side,
            entry_time: position.entry_time,
            entry_price: position.entry_price,
            exit_time: candle.time,
            exit_price,
            size: position.size,
            profit_loss: pnl,
            profit_loss_percent: pnl_percent,
            strategy: position.strategy,
            signal_strength: position.signal_strength,
            exit_reason: reason,
        });
    }

    pub fn position(&self) -> Option<&OpenPosition> {
        self.position.as_ref()
    }

    pub fn trades(&self) -> &[Trade] {
        &self.trades
    }

    fn finish(self, candles_processed: usize) -> SeriesOutcome {
        let final_balance = self.equity.balance();
        let (equity_curve, drawdowns) = self.equity.into_parts();
        SeriesOutcome {
            symbol: self.symbol.to_string(),
            timeframe: self.timeframe.to_string(),
            trades: self.trades,
            equity_curve,
            drawdowns,
            final_balance,
            candles_processed,
            open_position: self.position,
        }
    }
}
