//! Domain types for StratLab

pub mod candle;
pub mod signal;
pub mod trade;

pub use candle::{filter_window, validate_series, Candle, SeriesError};
pub use signal::{CombinedSignal, IndicatorSignal, SignalKind};
pub use trade::{profit_loss, ExitReason, Side, Trade};

/// Symbol type alias
pub type Symbol = String;

/// Timeframe label ("1m", "1h", "1d", ...). Opaque to the engine.
pub type Timeframe = String;
