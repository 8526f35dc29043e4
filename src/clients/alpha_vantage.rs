// src/clients/alpha_vantage.rs
use super::{check_status, EquityFeed, ForexFeed};
use crate::chart::ChartSeries;
use crate::error::FetchError;
use crate::models::{Interval, QuoteView};
use async_trait::async_trait;
use log::{debug, info};
use reqwest::Client;
use serde_json::{Map, Value};

/// Intraday points kept for the stock chart.
pub const STOCK_POINTS: usize = 20;
/// Intraday points kept for the forex chart.
pub const FOREX_POINTS: usize = 50;

#[derive(Clone)]
pub struct AlphaVantageClient {
    http: Client,
    base_url: String,
    api_key: String,
}

impl AlphaVantageClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    async fn query(&self, params: &[(&str, &str)]) -> Result<Value, FetchError> {
        let url = format!("{}/query", self.base_url.trim_end_matches('/'));
        debug!("Querying {} with {:?}", url, params);
        let response = self
            .http
            .get(&url)
            .query(params)
            .query(&[("apikey", self.api_key.as_str())])
            .send()
            .await?;
        check_status(&response)?;
        let json: Value = response.json().await?;
        classify(&json)?;
        Ok(json)
    }
}

#[async_trait]
impl EquityFeed for AlphaVantageClient {
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteView, FetchError> {
        let json = self
            .query(&[("function", "GLOBAL_QUOTE"), ("symbol", symbol)])
            .await?;
        let quote = parse_global_quote(&json, symbol)?;
        info!("Quote for {}: {}", quote.symbol, quote.price);
        Ok(quote)
    }

    async fn fetch_history(&self, symbol: &str, interval: Interval) -> Result<ChartSeries, FetchError> {
        let json = self
            .query(&[
                ("function", "TIME_SERIES_INTRADAY"),
                ("symbol", symbol),
                ("interval", interval.as_str()),
            ])
            .await?;
        parse_time_series(&json, "1. open", STOCK_POINTS)
    }
}

#[async_trait]
impl ForexFeed for AlphaVantageClient {
    async fn fetch_pair_history(&self, from: &str, to: &str) -> Result<ChartSeries, FetchError> {
        let json = self
            .query(&[
                ("function", "FX_INTRADAY"),
                ("from_symbol", from),
                ("to_symbol", to),
                ("interval", Interval::FiveMin.as_str()),
            ])
            .await?;
        parse_time_series(&json, "4. close", FOREX_POINTS)
    }
}

/// Alpha Vantage answers 200 for everything; errors travel in the body.
fn classify(json: &Value) -> Result<(), FetchError> {
    if let Some(msg) = json.get("Error Message").and_then(Value::as_str) {
        return Err(FetchError::NotFound(msg.to_string()));
    }
    if let Some(msg) = json
        .get("Note")
        .or_else(|| json.get("Information"))
        .and_then(Value::as_str)
    {
        return Err(FetchError::RateLimited(msg.to_string()));
    }
    Ok(())
}

/// Most recent `limit` entries of the first `Time Series*` object, oldest first.
pub(crate) fn parse_time_series(
    json: &Value,
    field: &str,
    limit: usize,
) -> Result<ChartSeries, FetchError> {
    let series = json
        .as_object()
        .and_then(|obj| {
            obj.iter()
                .find(|(k, _)| k.starts_with("Time Series"))
                .map(|(_, v)| v)
        })
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::Transport("no time series in response".to_string()))?;

    let mut stamps: Vec<&String> = series.keys().collect();
    // Timestamps are ISO-like, so lexical order is chronological.
    stamps.sort_unstable_by(|a, b| b.cmp(a));
    stamps.truncate(limit);
    stamps.reverse();

    let mut points = Vec::with_capacity(stamps.len());
    for stamp in stamps {
        let bar = series[stamp.as_str()]
            .as_object()
            .ok_or_else(|| FetchError::Transport(format!("bar at {stamp} is not an object")))?;
        points.push((stamp.clone(), number(bar, field)?));
    }
    Ok(ChartSeries::from_points(points))
}

pub(crate) fn parse_global_quote(json: &Value, symbol: &str) -> Result<QuoteView, FetchError> {
    let quote = json
        .get("Global Quote")
        .and_then(Value::as_object)
        .ok_or_else(|| FetchError::Transport("no Global Quote in response".to_string()))?;
    if quote.is_empty() {
        return Err(FetchError::NotFound(format!("no quote for {symbol}")));
    }
    Ok(QuoteView {
        symbol: quote
            .get("01. symbol")
            .and_then(Value::as_str)
            .unwrap_or(symbol)
            .to_string(),
        price: number(quote, "05. price")?,
        change: number(quote, "09. change")?,
        change_percent: number(quote, "10. change percent")?,
        volume: number(quote, "06. volume").ok().map(|v| v as u64),
    })
}

fn number(obj: &Map<String, Value>, key: &str) -> Result<f64, FetchError> {
    let value = obj
        .get(key)
        .ok_or_else(|| FetchError::Transport(format!("missing field {key:?}")))?;
    value
        .as_f64()
        .or_else(|| {
            value
                .as_str()
                .and_then(|s| s.trim().trim_end_matches('%').parse::<f64>().ok())
        })
        .filter(|n| n.is_finite())
        .ok_or_else(|| FetchError::Transport(format!("field {key:?} is not numeric")))
}
