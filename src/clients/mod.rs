// src/clients/mod.rs
//! One client per upstream provider. Clients only fetch and parse; they never
//! touch the screen or storage.

pub mod alpha_vantage;
pub mod coingecko;
pub mod news;

use crate::chart::ChartSeries;
use crate::error::FetchError;
use crate::models::{CoinMarket, CoinQuote, Interval, NewsArticle, QuoteView};
use async_trait::async_trait;
use reqwest::{Response, StatusCode};

pub use alpha_vantage::AlphaVantageClient;
pub use coingecko::CoinGeckoClient;
pub use news::NewsClient;

#[async_trait]
pub trait EquityFeed: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteView, FetchError>;
    async fn fetch_history(&self, symbol: &str, interval: Interval) -> Result<ChartSeries, FetchError>;
}

#[async_trait]
pub trait ForexFeed: Send + Sync {
    async fn fetch_pair_history(&self, from: &str, to: &str) -> Result<ChartSeries, FetchError>;
}

#[async_trait]
pub trait CryptoFeed: Send + Sync {
    async fn fetch_quote(&self, coin: &str) -> Result<CoinQuote, FetchError>;
    async fn fetch_history(&self, coin: &str, days: u32) -> Result<ChartSeries, FetchError>;
    async fn fetch_top(&self, limit: usize) -> Result<Vec<CoinMarket>, FetchError>;
}

#[async_trait]
pub trait NewsFeed: Send + Sync {
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<NewsArticle>, FetchError>;
}

/// Maps HTTP-level failures before the body is looked at.
pub(crate) fn check_status(response: &Response) -> Result<(), FetchError> {
    match response.status() {
        StatusCode::TOO_MANY_REQUESTS => Err(FetchError::RateLimited(
            "provider returned HTTP 429".to_string(),
        )),
        StatusCode::NOT_FOUND => Err(FetchError::NotFound("provider returned HTTP 404".to_string())),
        s if !s.is_success() => Err(FetchError::Transport(format!("HTTP {s}"))),
        _ => Ok(()),
    }
}
