//! Directional signals emitted by strategies and by the combiner.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignalKind {
    Buy,
    Sell,
    Neutral,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SignalKind::Buy => "buy",
            SignalKind::Sell => "sell",
            SignalKind::Neutral => "neutral",
        };
        f.write_str(s)
    }
}

/// Output of one strategy at one candle.
///
/// Strength is always in `[0, 100]`: the constructors clamp, and a
/// non-finite strength collapses to 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSignal {
    pub signal: SignalKind,
    pub strength: f64,
}

impl IndicatorSignal {
    pub fn new(signal: SignalKind, strength: f64) -> Self {
        if signal == SignalKind::Neutral {
            return Self::neutral();
        }
        Self {
            signal,
            strength: clamp_strength(strength),
        }
    }

    pub fn buy(strength: f64) -> Self {
        Self::new(SignalKind::Buy, strength)
    }

    pub fn sell(strength: f64) -> Self {
        Self::new(SignalKind::Sell, strength)
    }

    pub fn neutral() -> Self {
        Self {
            signal: SignalKind::Neutral,
            strength: 0.0,
        }
    }

    pub fn is_neutral(&self) -> bool {
        self.signal == SignalKind::Neutral
    }
}

impl Default for IndicatorSignal {
    fn default() -> Self {
        Self::neutral()
    }
}

/// Consensus decision produced by the combiner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedSignal {
    pub signal: SignalKind,
    pub strength: f64,
}

impl CombinedSignal {
    pub fn new(signal: SignalKind, strength: f64) -> Self {
        if signal == SignalKind::Neutral {
            return Self::neutral();
        }
        Self {
            signal,
            strength: clamp_strength(strength),
        }
    }

    pub fn neutral() -> Self {
        Self {
            signal: SignalKind::Neutral,
            strength: 0.0,
        }
    }
}

impl Default for CombinedSignal {
    fn default() -> Self {
        Self::neutral()
    }
}

fn clamp_strength(strength: f64) -> f64 {
    if strength.is_finite() {
        strength.clamp(0.0, 100.0)
    } else {
        0.0
    }
}
