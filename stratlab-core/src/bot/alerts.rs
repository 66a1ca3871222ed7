//! Price alerts over candle history, persisted through a `KeyValueStore`.
//!
//! Alerts are one-shot: once an alert fires it records `triggered_at` and is
//! skipped by later evaluations.

use serde::{Deserialize, Serialize};

use crate::domain::Candle;
use crate::store::{load_json, save_json, KeyValueStore, StoreError};

/// Key the alert list is stored under.
pub const ALERTS_KEY: &str = "alerts";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AlertCondition {
    PriceAbove { price: f64 },
    PriceBelow { price: f64 },
    /// Previous close at or below `price`, latest close above it.
    CrossesAbove { price: f64 },
    /// Previous close at or above `price`, latest close below it.
    CrossesBelow { price: f64 },
    /// Absolute percent move of the latest close versus the close `lookback` candles earlier.
    PercentChange { percent: f64, lookback: usize },
}

impl AlertCondition {
    /// Whether the condition holds at the last candle.
    pub fn is_met(&self, candles: &[Candle]) -> bool {
        let Some(last) = candles.last() else {
            return false;
        };
        let previous = candles.len().checked_sub(2).map(|i| candles[i].close);

        match *self {
            AlertCondition::PriceAbove { price } => last.close > price,
            AlertCondition::PriceBelow { price } => last.close < price,
            AlertCondition::CrossesAbove { price } => {
                previous.is_some_and(|prev| prev <= price && last.close > price)
            }
            AlertCondition::CrossesBelow { price } => {
                previous.is_some_and(|prev| prev >= price && last.close < price)
            }
            AlertCondition::PercentChange { percent, lookback } => {
                if lookback == 0 || candles.len() <= lookback {
                    return false;
                }
                let base = candles[candles.len() - 1 - lookback].close;
                base > 0.0 && ((last.close - base) / base * 100.0).abs() >= percent
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: u64,
    pub symbol: String,
    pub condition: AlertCondition,
    /// Candle time of the firing, once fired.
    pub triggered_at: Option<i64>,
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertTrigger {
    pub alert_id: u64,
    pub symbol: String,
    pub condition: AlertCondition,
    pub time: i64,
    pub price: f64,
}

/// Caller-owned set of alerts backed by a store.
pub struct AlertBook<S: KeyValueStore> {
    store: S,
    alerts: Vec<Alert>,
    next_id: u64,
}

impl<S: KeyValueStore> AlertBook<S> {
    /// Load any alerts already saved in `store`.
    pub fn open(store: S) -> Result<Self, StoreError> {
        let alerts: Vec<Alert> = load_json(&store, ALERTS_KEY)?.unwrap_or_default();
        let next_id = alerts.iter().map(|a| a.id).max().map_or(1, |id| id + 1);
        Ok(Self {
            store,
            alerts,
            next_id,
        })
    }

    pub fn add(
        &mut self,
        symbol: &str,
        condition: AlertCondition,
        note: Option<String>,
    ) -> Result<u64, StoreError> {
        let id = self.next_id;
        let mut alerts = self.alerts.clone();
        alerts.push(Alert {
            id,
            symbol: symbol.to_string(),
            condition,
            triggered_at: None,
            note,
        });
        self.commit(alerts)?;
        self.next_id += 1;
        Ok(id)
    }

    /// Returns whether an alert with `id` existed.
    pub fn remove(&mut self, id: u64) -> Result<bool, StoreError> {
        if !self.alerts.iter().any(|a| a.id == id) {
            return Ok(false);
        }
        let alerts = self.alerts.iter().filter(|a| a.id != id).cloned().collect();
        self.commit(alerts)?;
        Ok(true)
    }

    pub fn list(&self) -> &[Alert] {
        &self.alerts
    }

    pub fn pending(&self) -> impl Iterator<Item = &Alert> {
        self.alerts.iter().filter(|a| a.triggered_at.is_none())
    }

    /// Fire every pending alert for `symbol` whose condition holds at the last candle.
    ///
    /// Nothing is marked as fired unless the updated list is saved.
    pub fn evaluate(&mut self, symbol: &str, candles: &[Candle]) -> Result<Vec<AlertTrigger>, StoreError> {
        let Some(last) = candles.last() else {
            return Ok(Vec::new());
        };

        let mut alerts = self.alerts.clone();
        let mut triggers = Vec::new();
        for alert in alerts
            .iter_mut()
            .filter(|a| a.symbol == symbol && a.triggered_at.is_none())
        {
            if alert.condition.is_met(candles) {
                alert.triggered_at = Some(last.time);
                triggers.push(AlertTrigger {
                    alert_id: alert.id,
                    symbol: alert.symbol.clone(),
                    condition: alert.condition.clone(),
                    time: last.time,
                    price: last.close,
                });
            }
        }

        if !triggers.is_empty() {
            self.commit(alerts)?;
            tracing::info!(symbol, fired = triggers.len(), "Alerts triggered");
        }
        Ok(triggers)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Save `alerts` and adopt them; on failure the book is unchanged.
    fn commit(&mut self, alerts: Vec<Alert>) -> Result<(), StoreError> {
        save_json(&mut self.store, ALERTS_KEY, &alerts)?;
        self.alerts = alerts;
        Ok(())
    }
}
