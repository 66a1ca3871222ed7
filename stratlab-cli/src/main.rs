//! StratLab CLI — run backtests and inspect live signals.
//!
//! Commands:
//! - `run` — backtest the signal library over candle data (file or synthetic)
//! - `signals` — latest per-strategy and combined signal for every series
//! - `strategies` — list the signal library with lookbacks

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use stratlab_core::domain::SignalKind;
use stratlab_core::engine::{RunControl, RunProgress};
use stratlab_core::signals::{build_strategy, StrategyKind};
use stratlab_runner::config::{load_options, parse_time, BacktestOptions};
use stratlab_runner::data_loader::{dataset_hash, load_candles};
use stratlab_runner::export::{format_summary, format_time, save_artifacts};
use stratlab_runner::runner::{latest_signals, run_backtest_with_control, CandleSet};
use stratlab_runner::synthetic::synthetic_candle_set;

#[derive(Parser)]
#[command(
    name = "stratlab",
    about = "StratLab CLI — strategy signal fusion and backtesting"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backtest the signal library and write result.json, trades.csv, equity.csv.
    Run {
        #[command(flatten)]
        source: DataSource,

        /// Path to a TOML options file. Flags below override its values.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols to trade. Defaults to every symbol in the data.
        #[arg(long = "symbol")]
        symbols: Vec<String>,

        /// Timeframes to trade. Defaults to every timeframe in the data.
        #[arg(long = "timeframe")]
        timeframes: Vec<String>,

        /// Comma-separated strategy subset (see `stratlab strategies`).
        #[arg(long, value_delimiter = ',')]
        strategies: Option<Vec<String>>,

        /// Initial balance per series.
        #[arg(long)]
        balance: Option<f64>,

        /// Percent of the balance committed per entry.
        #[arg(long)]
        risk: Option<f64>,

        /// Stop-loss percent.
        #[arg(long)]
        stop_loss: Option<f64>,

        /// Take-profit percent.
        #[arg(long)]
        take_profit: Option<f64>,

        /// Window start (ms epoch or RFC 3339).
        #[arg(long)]
        start: Option<String>,

        /// Window end (ms epoch or RFC 3339).
        #[arg(long)]
        end: Option<String>,

        /// Close any open position on the final candle.
        #[arg(long, default_value_t = false)]
        close_at_end: bool,

        /// Candles skipped before trading starts.
        #[arg(long)]
        warmup: Option<usize>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,
    },
    /// Print the latest signal of every strategy on every series.
    Signals {
        #[command(flatten)]
        source: DataSource,

        /// Comma-separated strategy subset. Defaults to all.
        #[arg(long, value_delimiter = ',')]
        strategies: Option<Vec<String>>,
    },
    /// List strategy names and the candles each needs before it can signal.
    Strategies,
}

/// Where candles come from: a file, or a seeded synthetic walk.
#[derive(Args)]
struct DataSource {
    /// Candle file: CSV (symbol,timeframe,time,open,high,low,close,volume) or JSON.
    #[arg(long, conflicts_with = "synthetic")]
    data: Option<PathBuf>,

    /// Generate N synthetic candles per series instead of reading a file.
    #[arg(long, value_name = "N")]
    synthetic: Option<usize>,

    /// Seed for synthetic candles.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Symbols for synthetic candles.
    #[arg(long = "synthetic-symbol", default_values_t = vec!["BTCUSDT".to_string()])]
    synthetic_symbols: Vec<String>,

    /// Timeframes for synthetic candles.
    #[arg(long = "synthetic-timeframe", default_values_t = vec!["1h".to_string()])]
    synthetic_timeframes: Vec<String>,
}

impl DataSource {
    fn load(&self) -> Result<CandleSet> {
        match (&self.data, self.synthetic) {
            (Some(path), _) => load_candles(path)
                .with_context(|| format!("failed to load candles from {}", path.display())),
            (None, Some(n)) => Ok(synthetic_candle_set(
                self.seed,
                &self.synthetic_symbols,
                &self.synthetic_timeframes,
                n,
            )),
            (None, None) => bail!("one of --data or --synthetic is required"),
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            source,
            config,
            symbols,
            timeframes,
            strategies,
            balance,
            risk,
            stop_loss,
            take_profit,
            start,
            end,
            close_at_end,
            warmup,
            output_dir,
        } => {
            let candles = source.load()?;
            let overrides = RunOverrides {
                symbols,
                timeframes,
                strategies,
                balance,
                risk,
                stop_loss,
                take_profit,
                start,
                end,
                close_at_end,
                warmup,
            };
            let options = build_options(config, overrides, &candles)?;
            run_cmd(&candles, &options, output_dir)
        }
        Commands::Signals { source, strategies } => {
            let candles = source.load()?;
            let kinds = match strategies {
                Some(names) => parse_strategies(&names)?,
                None => StrategyKind::ALL.to_vec(),
            };
            signals_cmd(&candles, &kinds)
        }
        Commands::Strategies => {
            strategies_cmd();
            Ok(())
        }
    }
}

/// `run` flags that override (or, without `--config`, define) the options.
struct RunOverrides {
    symbols: Vec<String>,
    timeframes: Vec<String>,
    strategies: Option<Vec<String>>,
    balance: Option<f64>,
    risk: Option<f64>,
    stop_loss: Option<f64>,
    take_profit: Option<f64>,
    start: Option<String>,
    end: Option<String>,
    close_at_end: bool,
    warmup: Option<usize>,
}

fn build_options(
    config: Option<PathBuf>,
    overrides: RunOverrides,
    candles: &CandleSet,
) -> Result<BacktestOptions> {
    let mut options = match config {
        Some(path) => load_options(&path)
            .with_context(|| format!("failed to load options from {}", path.display()))?,
        None => {
            let mut timeframes: Vec<String> = candles
                .values()
                .flat_map(|by_tf| by_tf.keys().cloned())
                .collect();
            timeframes.sort();
            timeframes.dedup();
            BacktestOptions::new(
                10_000.0,
                1.0,
                candles.keys().cloned().collect(),
                timeframes,
            )
        }
    };

    if !overrides.symbols.is_empty() {
        options.symbols = overrides.symbols;
    }
    if !overrides.timeframes.is_empty() {
        options.timeframes = overrides.timeframes;
    }
    if let Some(names) = overrides.strategies {
        options.strategies = Some(parse_strategies(&names)?);
    }
    if let Some(balance) = overrides.balance {
        options.initial_balance = balance;
    }
    if let Some(risk) = overrides.risk {
        options.risk_per_trade = risk;
    }
    if overrides.stop_loss.is_some() {
        options.stop_loss = overrides.stop_loss;
    }
    if overrides.take_profit.is_some() {
        options.take_profit = overrides.take_profit;
    }
    if let Some(start) = overrides.start {
        options.start_time = Some(parse_cli_time(&start)?);
    }
    if let Some(end) = overrides.end {
        options.end_time = Some(parse_cli_time(&end)?);
    }
    if overrides.close_at_end {
        options.close_at_end = true;
    }
    if let Some(warmup) = overrides.warmup {
        options.warmup = warmup;
    }
    Ok(options)
}

fn run_cmd(candles: &CandleSet, options: &BacktestOptions, output_dir: PathBuf) -> Result<()> {
    info!(
        dataset = %dataset_hash(candles),
        options = %options.fingerprint(),
        "Loaded candles"
    );

    let progress = |p: &RunProgress| {
        if p.processed == p.total {
            debug!(series = %p.series, candles = p.total, "Series complete");
        }
    };
    let control = RunControl::default().with_progress(&progress);
    let result = run_backtest_with_control(candles, options, &control)?;

    print!("{}", format_summary(&result));

    save_artifacts(&result, &output_dir)?;
    println!("Artifacts saved to: {}", output_dir.display());
    Ok(())
}

fn signals_cmd(candles: &CandleSet, kinds: &[StrategyKind]) -> Result<()> {
    for snapshot in latest_signals(candles, kinds)? {
        let at = snapshot
            .time
            .map(format_time)
            .unwrap_or_else(|| "no candles".to_string());
        println!(
            "{}/{} @ {}: {} {:.1}",
            snapshot.symbol,
            snapshot.timeframe,
            at,
            snapshot.combined.signal,
            snapshot.combined.strength
        );
        for (name, vote) in &snapshot.votes {
            if vote.signal != SignalKind::Neutral {
                println!("  {name:<22} {} {:.1}", vote.signal, vote.strength);
            }
        }
    }
    Ok(())
}

fn strategies_cmd() {
    for kind in StrategyKind::ALL {
        let strategy = build_strategy(kind);
        println!("{:<22} lookback {}", kind.name(), strategy.lookback());
    }
}

fn parse_strategies(names: &[String]) -> Result<Vec<StrategyKind>> {
    names
        .iter()
        .map(|name| name.trim().parse::<StrategyKind>().map_err(anyhow::Error::from))
        .collect()
}

fn parse_cli_time(value: &str) -> Result<i64> {
    match parse_time(value) {
        Some(ms) => Ok(ms),
        None => bail!("invalid time '{value}': expected ms epoch or RFC 3339"),
    }
}
