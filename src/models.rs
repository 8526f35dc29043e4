// src/models.rs
use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertCondition {
    Above,
    Below,
}

impl AlertCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertCondition::Above => "above",
            AlertCondition::Below => "below",
        }
    }
}

impl FromStr for AlertCondition {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "above" => Ok(AlertCondition::Above),
            "below" => Ok(AlertCondition::Below),
            other => Err(ValidationError::InvalidCondition(other.to_string())),
        }
    }
}

/// Price alert as persisted under the `alerts` key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alert {
    /// Creation timestamp in milliseconds, bumped when two alerts share one.
    pub id: u64,
    pub symbol: String,
    #[serde(alias = "price")]
    pub target_price: f64,
    pub condition: AlertCondition,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioHolding {
    pub symbol: String,
    pub name: String,
    pub shares: u32,
    pub avg_price: f64,
    pub current_price: f64,
}

impl PortfolioHolding {
    pub fn new(symbol: &str, name: &str, shares: u32, avg_price: f64, current_price: f64) -> Self {
        Self {
            symbol: symbol.to_string(),
            name: name.to_string(),
            shares,
            avg_price,
            current_price,
        }
    }

    pub fn market_value(&self) -> f64 {
        self.shares as f64 * self.current_price
    }

    pub fn cost_basis(&self) -> f64 {
        self.shares as f64 * self.avg_price
    }

    pub fn gain_loss(&self) -> f64 {
        self.market_value() - self.cost_basis()
    }

    pub fn gain_loss_percent(&self) -> f64 {
        percent_of(self.gain_loss(), self.cost_basis())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct PortfolioSummary {
    pub total_value: f64,
    pub total_cost: f64,
    pub total_gain: f64,
    pub gain_percent: f64,
    pub positions: usize,
}

impl PortfolioSummary {
    pub fn from_holdings(holdings: &[PortfolioHolding]) -> Self {
        let total_value: f64 = holdings.iter().map(PortfolioHolding::market_value).sum();
        let total_cost: f64 = holdings.iter().map(PortfolioHolding::cost_basis).sum();
        let total_gain = total_value - total_cost;
        Self {
            total_value,
            total_cost,
            total_gain,
            gain_percent: percent_of(total_gain, total_cost),
            positions: holdings.len(),
        }
    }
}

fn percent_of(part: f64, whole: f64) -> f64 {
    if whole == 0.0 {
        0.0
    } else {
        part / whole * 100.0
    }
}

/// Last price with its move against the previous observation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteView {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub volume: Option<u64>,
}

impl QuoteView {
    pub fn is_up(&self) -> bool {
        self.change >= 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoinQuote {
    pub id: String,
    pub name: String,
    pub symbol: String,
    pub image: Option<String>,
    pub price: f64,
    pub change_24h: f64,
    pub change_percent_24h: f64,
    pub market_cap: f64,
    pub volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoinMarket {
    pub id: String,
    pub name: String,
    pub image: Option<String>,
    pub current_price: f64,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsArticle {
    pub title: String,
    pub summary: String,
    pub source: String,
    pub published: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForexPair {
    pub symbol: &'static str,
    pub name: &'static str,
    pub rate: f64,
    pub change: f64,
    pub change_percent: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }
}

/// Profile captured at signup, stored under `userData`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserData {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

/// Intraday bar width accepted by the equities provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Interval {
    OneMin,
    #[default]
    FiveMin,
    FifteenMin,
    ThirtyMin,
    SixtyMin,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::OneMin => "1min",
            Interval::FiveMin => "5min",
            Interval::FifteenMin => "15min",
            Interval::ThirtyMin => "30min",
            Interval::SixtyMin => "60min",
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Interval {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1min" => Ok(Interval::OneMin),
            "5min" => Ok(Interval::FiveMin),
            "15min" => Ok(Interval::FifteenMin),
            "30min" => Ok(Interval::ThirtyMin),
            "60min" => Ok(Interval::SixtyMin),
            other => Err(ValidationError::UnknownInterval(other.to_string())),
        }
    }
}
