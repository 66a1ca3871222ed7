//! Reporting and export — JSON, CSV, and text summaries of a backtest.
//!
//! - **JSON**: full round-trip serialization with schema versioning
//! - **CSV**: trade tape and equity curve for spreadsheets and notebooks
//! - **Text**: the summary the CLI prints after a run
//!
//! Unknown schema versions are rejected on load.

use std::fmt::Write as _;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, SecondsFormat};
use stratlab_core::domain::Trade;

use crate::runner::{BacktestResult, SkipReason, SCHEMA_VERSION};

/// File names written by [`save_artifacts`].
pub const RESULT_FILE: &str = "result.json";
pub const TRADES_FILE: &str = "trades.csv";
pub const EQUITY_FILE: &str = "equity.csv";

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `BacktestResult` to pretty JSON.
pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult` from JSON, rejecting unknown schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV export ─────────────────────────────────────────────────────

/// Export a trade list as CSV, one row per trade.
///
/// Times appear twice: raw ms epoch and RFC 3339 UTC.
pub fn export_trades_csv(trades: &[Trade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record([
        "symbol",
        "timeframe",
        "side",
        "entry_time",
        "entry_at",
        "entry_price",
        "exit_time",
        "exit_at",
        "exit_price",
        "size",
        "profit_loss",
        "profit_loss_percent",
        "strategy",
        "signal_strength",
        "exit_reason",
    ])?;

    for t in trades {
        wtr.write_record([
            &t.symbol,
            &t.timeframe,
            &t.side.to_string(),
            &t.entry_time.to_string(),
            &format_time(t.entry_time),
            &format!("{:.6}", t.entry_price),
            &t.exit_time.to_string(),
            &format_time(t.exit_time),
            &format!("{:.6}", t.exit_price),
            &format!("{:.8}", t.size),
            &format!("{:.2}", t.profit_loss),
            &format!("{:.4}", t.profit_loss_percent),
            &t.strategy,
            &format!("{:.2}", t.signal_strength),
            &t.exit_reason.to_string(),
        ])?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Export the merged equity curve with its drawdown column.
pub fn export_equity_csv(equity_curve: &[f64], drawdowns: &[f64]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["trade_index", "equity", "drawdown_percent"])?;
    for (i, eq) in equity_curve.iter().enumerate() {
        let dd = drawdowns.get(i).copied().unwrap_or(0.0);
        wtr.write_record([&i.to_string(), &format!("{:.2}", eq), &format!("{:.4}", dd)])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write `result.json`, `trades.csv` and `equity.csv` into `output_dir`,
/// creating it if needed.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output dir: {}", output_dir.display()))?;

    std::fs::write(output_dir.join(RESULT_FILE), export_json(result)?)?;
    std::fs::write(output_dir.join(TRADES_FILE), export_trades_csv(&result.trades)?)?;
    std::fs::write(
        output_dir.join(EQUITY_FILE),
        export_equity_csv(&result.equity_curve, &result.drawdowns)?,
    )?;
    Ok(())
}

/// Load a `BacktestResult` from an artifact directory.
pub fn load_artifacts(dir: &Path) -> Result<BacktestResult> {
    let path = dir.join(RESULT_FILE);
    let json = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    import_json(&json)
}

// ─── Text summary ───────────────────────────────────────────────────

/// RFC 3339 UTC rendering of a ms epoch; the raw number if out of range.
pub fn format_time(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|dt| dt.to_rfc3339_opts(SecondsFormat::Secs, true))
        .unwrap_or_else(|| ms.to_string())
}

/// Human-readable run summary.
pub fn format_summary(result: &BacktestResult) -> String {
    let s = &result.stats;
    let mut out = String::new();

    let short_id = result
        .options_fingerprint
        .get(..12)
        .unwrap_or(&result.options_fingerprint);
    let _ = writeln!(out, "Backtest {short_id}");
    let _ = writeln!(out, "  trades          {}", s.num_trades);
    let _ = writeln!(
        out,
        "  win rate        {:.2}% ({} won / {} lost)",
        s.win_rate, s.winning_trades, s.losing_trades
    );
    let _ = writeln!(
        out,
        "  total P&L       {:.2} ({:+.2}%)",
        s.total_profit_loss, s.total_return_percent
    );
    let _ = writeln!(out, "  ending balance  {:.2}", s.ending_balance);
    let _ = writeln!(out, "  profit factor   {}", s.profit_factor);
    let _ = writeln!(out, "  sharpe          {:.3}", s.sharpe_ratio);
    let _ = writeln!(out, "  risk/reward     {:.3}", s.risk_reward_ratio);
    let _ = writeln!(out, "  max drawdown    {:.2}%", s.max_drawdown);

    if let Some(best) = &result.best_trade {
        let _ = writeln!(out, "  best trade      {}", describe_trade(best));
    }
    if let Some(worst) = &result.worst_trade {
        let _ = writeln!(out, "  worst trade     {}", describe_trade(worst));
    }

    if !result.series.is_empty() {
        let _ = writeln!(out, "Series");
        for series in &result.series {
            let _ = writeln!(
                out,
                "  {}/{}: {} candles, {} trades, P&L {:.2}, max drawdown {:.2}%{}",
                series.symbol,
                series.timeframe,
                series.candles,
                series.trades,
                series.profit_loss,
                series.max_drawdown,
                if series.open_position.is_some() {
                    ", position open"
                } else {
                    ""
                }
            );
        }
    }

    if !result.skipped.is_empty() {
        let _ = writeln!(out, "Skipped");
        for skip in &result.skipped {
            let reason = match &skip.reason {
                SkipReason::Missing => "no candles".to_string(),
                SkipReason::InsufficientData {
                    available,
                    required,
                } => format!("{available} candles, {required} needed"),
            };
            let _ = writeln!(out, "  {}/{}: {reason}", skip.symbol, skip.timeframe);
        }
    }

    out
}

fn describe_trade(t: &Trade) -> String {
    format!(
        "{} {}/{} {:.2} ({}, {} -> {})",
        t.side,
        t.symbol,
        t.timeframe,
        t.profit_loss,
        t.strategy,
        format_time(t.entry_time),
        format_time(t.exit_time)
    )
}
