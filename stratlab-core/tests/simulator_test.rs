//! Scenario tests for the single-series simulator.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use stratlab_core::domain::{Candle, ExitReason, Side};
use stratlab_core::engine::{simulate_series, EngineError, RunControl, RunProgress, SimulationParams};
use stratlab_core::signals::{build_strategies, StrategyKind};

fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Candle {
                time: i as i64 * 3_600_000,
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Gentle decline through the warm-up, a sharp rally, then a sharp sell-off.
/// EMA(9) crosses above EMA(21) at candle 52 and back below at candle 59.
fn crossover_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..=50).map(|i| 150.0 - 0.5 * i as f64).collect();
    closes.extend([135.0, 145.0, 155.0, 165.0, 175.0]);
    closes.extend([155.0, 135.0, 115.0, 95.0]);
    closes
}

#[test]
fn ema_crossover_produces_one_long_round_trip() {
    let candles = candles_from_closes(&crossover_closes());
    assert_eq!(candles.len(), 60);
    let strategies = build_strategies(&[StrategyKind::EmaCrossover]);
    let params = SimulationParams::new(10_000.0, 1.0);

    let outcome = simulate_series("BTCUSDT", "1h", &candles, &strategies, &params, &RunControl::default())
        .unwrap();

    assert_eq!(outcome.trades.len(), 1, "trades: {:?}", outcome.trades);
    let trade = &outcome.trades[0];
    assert_eq!(trade.side, Side::Long);
    assert_eq!(trade.entry_time, candles[52].time);
    assert_eq!(trade.exit_time, candles[59].time);
    assert_eq!(trade.entry_price, 145.0);
    assert_eq!(trade.exit_price, 95.0);
    assert_eq!(trade.exit_reason, ExitReason::Signal);
    assert_eq!(trade.strategy, "ema_crossover");

    let expected = (trade.exit_price - trade.entry_price) * (100.0 / trade.entry_price);
    assert!((trade.profit_loss - expected).abs() < 1e-9);
    assert!((trade.size - 100.0 / 145.0).abs() < 1e-12);
    assert!(outcome.open_position.is_none());
    assert_eq!(outcome.equity_curve, vec![10_000.0, 10_000.0 + trade.profit_loss]);
}

#[test]
fn stop_loss_exits_before_the_signal_would() {
    let candles = candles_from_closes(&crossover_closes());
    let strategies = build_strategies(&[StrategyKind::EmaCrossover]);
    let mut params = SimulationParams::new(10_000.0, 1.0);
    params.stop_loss = Some(5.0);

    let outcome = simulate_series("BTCUSDT", "1h", &candles, &strategies, &params, &RunControl::default())
        .unwrap();

    // entry 145; candle 57 (155 -> 135) trades below 137.75 first
    assert_eq!(outcome.trades.len(), 1);
    assert_eq!(outcome.trades[0].exit_reason, ExitReason::StopLoss);
    assert_eq!(outcome.trades[0].exit_time, candles[57].time);
    assert_eq!(outcome.trades[0].exit_price, 135.0);
}

#[test]
fn take_profit_exits_on_the_rally() {
    let candles = candles_from_closes(&crossover_closes());
    let strategies = build_strategies(&[StrategyKind::EmaCrossover]);
    let mut params = SimulationParams::new(10_000.0, 1.0);
    params.take_profit = Some(10.0);

    let outcome = simulate_series("BTCUSDT", "1h", &candles, &strategies, &params, &RunControl::default())
        .unwrap();

    // entry 145; candle 54 (155 -> 165) reaches above 159.5
    let trade = &outcome.trades[0];
    assert_eq!(trade.exit_reason, ExitReason::TakeProfit);
    assert_eq!(trade.exit_time, candles[54].time);
    assert!(trade.is_winner());
}

#[test]
fn short_history_produces_no_trades() {
    let candles = candles_from_closes(&crossover_closes()[..40]);
    let strategies = build_strategies(&StrategyKind::ALL);
    let params = SimulationParams::new(10_000.0, 1.0);
    let outcome = simulate_series("BTCUSDT", "1h", &candles, &strategies, &params, &RunControl::default())
        .unwrap();
    assert!(outcome.trades.is_empty());
    assert_eq!(outcome.equity_curve, vec![10_000.0]);
    assert_eq!(outcome.drawdowns, vec![0.0]);
    assert_eq!(outcome.final_balance, 10_000.0);
}

#[test]
fn cancellation_stops_the_run() {
    let candles = candles_from_closes(&crossover_closes());
    let strategies = build_strategies(&[StrategyKind::EmaCrossover]);
    let params = SimulationParams::new(10_000.0, 1.0);
    let cancel = AtomicBool::new(true);
    let control = RunControl::default().with_cancel(&cancel);

    let err = simulate_series("BTCUSDT", "1h", &candles, &strategies, &params, &control).unwrap_err();
    assert_eq!(err, EngineError::Cancelled);

    cancel.store(false, Ordering::Relaxed);
    assert!(simulate_series("BTCUSDT", "1h", &candles, &strategies, &params, &control).is_ok());
}

#[test]
fn progress_reports_completion() {
    let candles = candles_from_closes(&crossover_closes());
    let strategies = build_strategies(&[StrategyKind::EmaCrossover]);
    let params = SimulationParams::new(10_000.0, 1.0);
    let reports = Mutex::new(Vec::new());
    let callback = |p: &RunProgress| reports.lock().unwrap().push(p.clone());
    let control = RunControl::default().with_progress(&callback);

    simulate_series("ETHUSDT", "4h", &candles, &strategies, &params, &control).unwrap();

    let reports = reports.into_inner().unwrap();
    let last = reports.last().unwrap();
    assert_eq!(last.series, "ETHUSDT/4h");
    assert_eq!(last.processed, 60);
    assert_eq!(last.total, 60);
}
