//! End-to-end data pipeline: options file + candle file on disk → run →
//! artifacts on disk → reload.

use std::fmt::Write as _;
use std::path::Path;

use stratlab_runner::config::load_options;
use stratlab_runner::data_loader::{dataset_hash, load_candles};
use stratlab_runner::export::{load_artifacts, save_artifacts, EQUITY_FILE, TRADES_FILE};
use stratlab_runner::runner::{run_backtest, CandleSet};
use stratlab_runner::synthetic::synthetic_candle_set;

fn write_csv(set: &CandleSet, path: &Path) {
    let mut out = String::from("symbol,timeframe,time,open,high,low,close,volume\n");
    for (symbol, by_tf) in set {
        for (timeframe, candles) in by_tf {
            for c in candles {
                writeln!(
                    out,
                    "{symbol},{timeframe},{},{},{},{},{},{}",
                    c.time, c.open, c.high, c.low, c.close, c.volume
                )
                .unwrap();
            }
        }
    }
    std::fs::write(path, out).unwrap();
}

fn sample_set() -> CandleSet {
    synthetic_candle_set(
        2024,
        &["BTCUSDT".to_string(), "ETHUSDT".to_string()],
        &["1h".to_string()],
        300,
    )
}

const OPTIONS_TOML: &str = r#"
initial_balance = 10000.0
risk_per_trade = 5.0
symbols = ["BTCUSDT", "ETHUSDT"]
timeframes = ["1h"]
strategies = ["ema_crossover", "rsi_reversion", "breakout", "supertrend"]
stop_loss = 2.5
take_profit = 5.0
"#;

#[test]
fn csv_and_json_inputs_give_identical_runs() {
    let dir = tempfile::tempdir().unwrap();
    let set = sample_set();

    let csv_path = dir.path().join("candles.csv");
    write_csv(&set, &csv_path);
    let json_path = dir.path().join("candles.json");
    std::fs::write(&json_path, serde_json::to_string(&set).unwrap()).unwrap();

    let from_csv = load_candles(&csv_path).unwrap();
    let from_json = load_candles(&json_path).unwrap();
    assert_eq!(from_csv, set);
    assert_eq!(from_json, set);
    assert_eq!(dataset_hash(&from_csv), dataset_hash(&set));

    let options_path = dir.path().join("options.toml");
    std::fs::write(&options_path, OPTIONS_TOML).unwrap();
    let options = load_options(&options_path).unwrap();

    let a = run_backtest(&from_csv, &options).unwrap();
    let b = run_backtest(&from_json, &options).unwrap();
    assert_eq!(a.trades, b.trades);
    assert_eq!(a.stats, b.stats);
}

#[test]
fn artifacts_round_trip_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let options_path = dir.path().join("options.toml");
    std::fs::write(&options_path, OPTIONS_TOML).unwrap();
    let options = load_options(&options_path).unwrap();

    let result = run_backtest(&sample_set(), &options).unwrap();
    let out = dir.path().join("out");
    save_artifacts(&result, &out).unwrap();

    let loaded = load_artifacts(&out).unwrap();
    assert_eq!(loaded.trades, result.trades);
    assert_eq!(loaded.equity_curve, result.equity_curve);
    assert_eq!(loaded.options_fingerprint, options.fingerprint());

    let trades_csv = std::fs::read_to_string(out.join(TRADES_FILE)).unwrap();
    assert_eq!(trades_csv.lines().count(), result.trades.len() + 1);
    let equity_csv = std::fs::read_to_string(out.join(EQUITY_FILE)).unwrap();
    assert_eq!(equity_csv.lines().count(), result.equity_curve.len() + 1);
}
