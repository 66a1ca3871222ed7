//! Serializable backtest options.
//!
//! Options arrive from a TOML file, from CLI flags, or straight from code.
//! Whatever the source, `validate()` runs before any simulation and
//! `fingerprint()` identifies the run in exported artifacts.

use std::path::Path;

use chrono::DateTime;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

use stratlab_core::engine::{SimulationParams, DEFAULT_WARMUP};
use stratlab_core::signals::StrategyKind;

/// Invalid option values, plus failures to read an options file.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error("initial_balance must be positive, got {0}")]
    NonPositiveBalance(f64),

    #[error("risk_per_trade must be positive, got {0}")]
    NonPositiveRisk(f64),

    #[error("risk_per_trade is a percentage and cannot exceed 100, got {0}")]
    RiskAbove100(f64),

    #[error("at least one symbol is required")]
    NoSymbols,

    #[error("at least one timeframe is required")]
    NoTimeframes,

    #[error("strategies subset is empty; omit it to run every strategy")]
    EmptyStrategySubset,

    #[error("start_time {start} is after end_time {end}")]
    InvalidTimeWindow { start: i64, end: i64 },

    #[error("stop_loss must be positive, got {0}")]
    NonPositiveStopLoss(f64),

    #[error("take_profit must be positive, got {0}")]
    NonPositiveTakeProfit(f64),

    #[error("warmup must be at least one candle")]
    ZeroWarmup,

    #[error("failed to read options file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse options TOML: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Parameters of one `run_backtest` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestOptions {
    pub initial_balance: f64,
    /// Percent of the balance committed per entry.
    pub risk_per_trade: f64,
    pub symbols: Vec<String>,
    pub timeframes: Vec<String>,

    /// Inclusive window start, ms epoch. TOML also accepts RFC 3339 strings.
    #[serde(default, deserialize_with = "deserialize_time")]
    pub start_time: Option<i64>,
    /// Inclusive window end, ms epoch. TOML also accepts RFC 3339 strings.
    #[serde(default, deserialize_with = "deserialize_time")]
    pub end_time: Option<i64>,

    /// Strategy subset; `None` runs the whole library.
    #[serde(default)]
    pub strategies: Option<Vec<StrategyKind>>,

    /// Stop-loss percent; `None` disables it.
    #[serde(default)]
    pub stop_loss: Option<f64>,
    /// Take-profit percent; `None` disables it.
    #[serde(default)]
    pub take_profit: Option<f64>,

    #[serde(default)]
    pub close_at_end: bool,
    #[serde(default = "default_warmup")]
    pub warmup: usize,
}

fn default_warmup() -> usize {
    DEFAULT_WARMUP
}

impl BacktestOptions {
    /// Options with every optional field at its default.
    pub fn new(
        initial_balance: f64,
        risk_per_trade: f64,
        symbols: Vec<String>,
        timeframes: Vec<String>,
    ) -> Self {
        Self {
            initial_balance,
            risk_per_trade,
            symbols,
            timeframes,
            start_time: None,
            end_time: None,
            strategies: None,
            stop_loss: None,
            take_profit: None,
            close_at_end: false,
            warmup: DEFAULT_WARMUP,
        }
    }

    /// Parse options from a TOML string and validate them.
    pub fn from_toml(content: &str) -> Result<Self, OptionsError> {
        let options: Self = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Reject option values that cannot describe a meaningful run. NaN counts
    /// as non-positive.
    pub fn validate(&self) -> Result<(), OptionsError> {
        if !(self.initial_balance > 0.0 && self.initial_balance.is_finite()) {
            return Err(OptionsError::NonPositiveBalance(self.initial_balance));
        }
        if self.risk_per_trade.is_nan() || self.risk_per_trade <= 0.0 {
            return Err(OptionsError::NonPositiveRisk(self.risk_per_trade));
        }
        if self.risk_per_trade > 100.0 {
            return Err(OptionsError::RiskAbove100(self.risk_per_trade));
        }
        if self.symbols.is_empty() {
            return Err(OptionsError::NoSymbols);
        }
        if self.timeframes.is_empty() {
            return Err(OptionsError::NoTimeframes);
        }
        if self.strategies.as_ref().is_some_and(|s| s.is_empty()) {
            return Err(OptionsError::EmptyStrategySubset);
        }
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if start > end {
                return Err(OptionsError::InvalidTimeWindow { start, end });
            }
        }
        if let Some(sl) = self.stop_loss {
            if sl.is_nan() || sl <= 0.0 {
                return Err(OptionsError::NonPositiveStopLoss(sl));
            }
        }
        if let Some(tp) = self.take_profit {
            if tp.is_nan() || tp <= 0.0 {
                return Err(OptionsError::NonPositiveTakeProfit(tp));
            }
        }
        if self.warmup == 0 {
            return Err(OptionsError::ZeroWarmup);
        }
        Ok(())
    }

    /// Strategies to run, in library order, without duplicates.
    pub fn strategy_kinds(&self) -> Vec<StrategyKind> {
        match &self.strategies {
            Some(subset) => {
                let mut kinds = subset.clone();
                kinds.sort();
                kinds.dedup();
                kinds
            }
            None => StrategyKind::ALL.to_vec(),
        }
    }

    /// Per-series simulator parameters.
    pub fn to_simulation_params(&self) -> SimulationParams {
        SimulationParams {
            initial_balance: self.initial_balance,
            risk_per_trade: self.risk_per_trade,
            stop_loss: self.stop_loss,
            take_profit: self.take_profit,
            warmup: self.warmup,
            close_at_end: self.close_at_end,
        }
    }

    /// BLAKE3 hash of the canonical JSON form of these options.
    ///
    /// Identical options always produce the same fingerprint, so two
    /// artifacts can be matched to the run that produced them.
    pub fn fingerprint(&self) -> String {
        // Serializing plain data to a Value cannot fail; fall back to Debug if it ever does.
        let canonical = match serde_json::to_value(self) {
            Ok(value) => value.to_string(),
            Err(_) => format!("{self:?}"),
        };
        blake3::hash(canonical.as_bytes()).to_hex().to_string()
    }
}

/// Load and validate options from a TOML file.
pub fn load_options(path: &Path) -> Result<BacktestOptions, OptionsError> {
    let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    BacktestOptions::from_toml(&content)
}

/// Parse a timestamp given as ms epoch or as an RFC 3339 string.
pub fn parse_time(value: &str) -> Option<i64> {
    let trimmed = value.trim();
    if let Ok(ms) = trimmed.parse::<i64>() {
        return Some(ms);
    }
    DateTime::parse_from_rfc3339(trimmed)
        .ok()
        .map(|dt| dt.timestamp_millis())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TimeValue {
    Millis(i64),
    Text(String),
}

fn deserialize_time<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<TimeValue>::deserialize(deserializer)? {
        None => Ok(None),
        Some(TimeValue::Millis(ms)) => Ok(Some(ms)),
        Some(TimeValue::Text(text)) => parse_time(&text).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid time '{text}': expected ms epoch or RFC 3339"
            ))
        }),
    }
}
