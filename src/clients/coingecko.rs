// src/clients/coingecko.rs
use super::{check_status, CryptoFeed};
use crate::chart::ChartSeries;
use crate::error::FetchError;
use crate::models::{CoinMarket, CoinQuote};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    base_url: String,
}

#[derive(Deserialize)]
struct CoinResponse {
    id: String,
    name: String,
    symbol: String,
    image: Option<CoinImage>,
    market_data: MarketData,
}

#[derive(Deserialize)]
struct CoinImage {
    small: Option<String>,
}

#[derive(Deserialize)]
struct MarketData {
    current_price: UsdValue,
    #[serde(default)]
    price_change_24h: Option<f64>,
    #[serde(default)]
    price_change_percentage_24h: Option<f64>,
    market_cap: UsdValue,
    total_volume: UsdValue,
}

#[derive(Deserialize)]
struct UsdValue {
    usd: Option<f64>,
}

#[derive(Deserialize)]
struct MarketChart {
    #[serde(default)]
    prices: Vec<(f64, f64)>,
}

impl CoinGeckoClient {
    pub fn new(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Value, FetchError> {
        let url = format!("{}/{}", self.base_url.trim_end_matches('/'), path);
        debug!("Requesting {}", url);
        let response = self.http.get(&url).query(query).send().await?;
        check_status(&response)?;
        let json: Value = response.json().await?;
        classify(&json)?;
        Ok(json)
    }
}

#[async_trait]
impl CryptoFeed for CoinGeckoClient {
    async fn fetch_quote(&self, coin: &str) -> Result<CoinQuote, FetchError> {
        let json = self.get(&format!("coins/{coin}"), &[]).await?;
        parse_coin(json)
    }

    async fn fetch_history(&self, coin: &str, days: u32) -> Result<ChartSeries, FetchError> {
        let days = days.to_string();
        let json = self
            .get(
                &format!("coins/{coin}/market_chart"),
                &[("vs_currency", "usd"), ("days", days.as_str()), ("interval", "daily")],
            )
            .await?;
        parse_market_chart(json)
    }

    async fn fetch_top(&self, limit: usize) -> Result<Vec<CoinMarket>, FetchError> {
        let per_page = limit.to_string();
        let json = self
            .get(
                "coins/markets",
                &[
                    ("vs_currency", "usd"),
                    ("order", "market_cap_desc"),
                    ("per_page", per_page.as_str()),
                    ("page", "1"),
                    ("sparkline", "false"),
                ],
            )
            .await?;
        Ok(serde_json::from_value(json)?)
    }
}

/// CoinGecko reports unknown ids as `{"error": ...}` and throttling as
/// `{"status": {"error_code": 429, ...}}`.
fn classify(json: &Value) -> Result<(), FetchError> {
    if let Some(msg) = json.get("error").and_then(Value::as_str) {
        return Err(FetchError::NotFound(msg.to_string()));
    }
    if let Some(status) = json.get("status") {
        if status.get("error_code").and_then(Value::as_u64) == Some(429) {
            let msg = status
                .get("error_message")
                .and_then(Value::as_str)
                .unwrap_or("rate limit exceeded");
            return Err(FetchError::RateLimited(msg.to_string()));
        }
    }
    Ok(())
}

fn parse_coin(json: Value) -> Result<CoinQuote, FetchError> {
    let coin: CoinResponse = serde_json::from_value(json)?;
    let md = coin.market_data;
    let price = md
        .current_price
        .usd
        .ok_or_else(|| FetchError::Transport(format!("no usd price for {}", coin.id)))?;
    Ok(CoinQuote {
        id: coin.id,
        name: coin.name,
        symbol: coin.symbol.to_uppercase(),
        image: coin.image.and_then(|i| i.small),
        price,
        change_24h: md.price_change_24h.unwrap_or_default(),
        change_percent_24h: md.price_change_percentage_24h.unwrap_or_default(),
        market_cap: md.market_cap.usd.unwrap_or_default(),
        volume: md.total_volume.usd.unwrap_or_default(),
    })
}

fn parse_market_chart(json: Value) -> Result<ChartSeries, FetchError> {
    let chart: MarketChart = serde_json::from_value(json)?;
    if chart.prices.is_empty() {
        return Err(FetchError::Transport("no data received from API".to_string()));
    }
    let (labels, values) = chart
        .prices
        .into_iter()
        .map(|(ts, price)| (date_label(ts), price))
        .unzip();
    ChartSeries::new(labels, values).map_err(|e| FetchError::Transport(e.to_string()))
}

fn date_label(ts_millis: f64) -> String {
    DateTime::<Utc>::from_timestamp_millis(ts_millis as i64)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| ts_millis.to_string())
}
