//! Grid trading engine.
//!
//! Price levels are spread between `lower` and `upper`. On the first price
//! every level below it is armed as a buy, except the top level, which has
//! no level above it to sell at. A downward cross through an armed
//! buy fills it and arms the level above as a sell; an upward cross through an
//! armed sell fills it, books the spread as realized profit, and re-arms the
//! level below as a buy. Each `GridEngine` is owned by its caller; there is
//! no shared grid state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("invalid grid configuration: {0}")]
    InvalidConfiguration(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GridSpacing {
    /// Equal price distance between levels.
    Arithmetic,
    /// Equal percentage distance between levels.
    Geometric,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub symbol: String,
    pub lower: f64,
    pub upper: f64,
    pub levels: usize,
    pub quantity_per_level: f64,
    pub spacing: GridSpacing,
}

impl GridConfig {
    pub fn validate(&self) -> Result<(), GridError> {
        let invalid = |msg: String| Err(GridError::InvalidConfiguration(msg));
        if !self.lower.is_finite() || self.lower <= 0.0 {
            return invalid(format!("lower bound must be positive, got {}", self.lower));
        }
        if !self.upper.is_finite() || self.upper <= self.lower {
            return invalid(format!(
                "upper bound {} must exceed lower bound {}",
                self.upper, self.lower
            ));
        }
        if self.levels < 2 {
            return invalid(format!("need at least 2 levels, got {}", self.levels));
        }
        if !self.quantity_per_level.is_finite() || self.quantity_per_level <= 0.0 {
            return invalid(format!(
                "quantity per level must be positive, got {}",
                self.quantity_per_level
            ));
        }
        Ok(())
    }

    /// Level prices, ascending.
    pub fn level_prices(&self) -> Vec<f64> {
        let steps = (self.levels - 1) as f64;
        (0..self.levels)
            .map(|k| match self.spacing {
                GridSpacing::Arithmetic => self.lower + (self.upper - self.lower) * k as f64 / steps,
                GridSpacing::Geometric => {
                    self.lower * (self.upper / self.lower).powf(k as f64 / steps)
                }
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GridOrderSide {
    Buy,
    Sell,
}

/// Resting order on one level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "order", rename_all = "snake_case")]
enum LevelOrder {
    Empty,
    Buy,
    Sell { bought_at: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridFill {
    pub level: usize,
    pub side: GridOrderSide,
    pub price: f64,
    pub quantity: f64,
    /// Realized profit, set on sell fills.
    pub profit: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridEngine {
    config: GridConfig,
    prices: Vec<f64>,
    orders: Vec<LevelOrder>,
    last_price: Option<f64>,
    realized_profit: f64,
    round_trips: usize,
}

impl GridEngine {
    pub fn new(config: GridConfig) -> Result<Self, GridError> {
        config.validate()?;
        let prices = config.level_prices();
        let orders = vec![LevelOrder::Empty; prices.len()];
        Ok(Self {
            config,
            prices,
            orders,
            last_price: None,
            realized_profit: 0.0,
            round_trips: 0,
        })
    }

    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    pub fn level_prices(&self) -> &[f64] {
        &self.prices
    }

    pub fn realized_profit(&self) -> f64 {
        self.realized_profit
    }

    pub fn round_trips(&self) -> usize {
        self.round_trips
    }

    /// Quantity bought and not yet sold.
    pub fn inventory(&self) -> f64 {
        let held = self
            .orders
            .iter()
            .filter(|o| matches!(o, LevelOrder::Sell { .. }))
            .count();
        held as f64 * self.config.quantity_per_level
    }

    /// Feed a new price; returns the fills it triggered in execution order.
    pub fn on_price(&mut self, price: f64) -> Vec<GridFill> {
        if !price.is_finite() || price <= 0.0 {
            return Vec::new();
        }

        let Some(previous) = self.last_price.replace(price) else {
            let top = self.prices.len() - 1;
            for (order, &level) in self.orders.iter_mut().zip(&self.prices).take(top) {
                if level < price {
                    *order = LevelOrder::Buy;
                }
            }
            return Vec::new();
        };

        let mut fills = Vec::new();
        if price < previous {
            for k in (0..self.prices.len()).rev() {
                let level = self.prices[k];
                if level < previous && level >= price && self.orders[k] == LevelOrder::Buy {
                    fills.push(self.fill_buy(k));
                }
            }
        } else if price > previous {
            for k in 0..self.prices.len() {
                let level = self.prices[k];
                if level > previous && level <= price {
                    if let LevelOrder::Sell { bought_at } = self.orders[k] {
                        fills.push(self.fill_sell(k, bought_at));
                    }
                }
            }
        }
        fills
    }

    fn fill_buy(&mut self, k: usize) -> GridFill {
        self.orders[k] = LevelOrder::Empty;
        if k + 1 < self.orders.len() {
            self.orders[k + 1] = LevelOrder::Sell {
                bought_at: self.prices[k],
            };
        }
        GridFill {
            level: k,
            side: GridOrderSide::Buy,
            price: self.prices[k],
            quantity: self.config.quantity_per_level,
            profit: None,
        }
    }

    fn fill_sell(&mut self, k: usize, bought_at: f64) -> GridFill {
        let quantity = self.config.quantity_per_level;
        let profit = (self.prices[k] - bought_at) * quantity;
        self.realized_profit += profit;
        self.round_trips += 1;
        self.orders[k] = LevelOrder::Empty;
        if k > 0 {
            self.orders[k - 1] = LevelOrder::Buy;
        }
        GridFill {
            level: k,
            side: GridOrderSide::Sell,
            price: self.prices[k],
            quantity,
            profit: Some(profit),
        }
    }
}
