// src/testing.rs
//! Scripted feeds for controller tests.

use crate::chart::ChartSeries;
use crate::clients::{CryptoFeed, EquityFeed, ForexFeed, NewsFeed};
use crate::controllers::Shared;
use crate::error::FetchError;
use crate::lock;
use crate::models::{CoinMarket, CoinQuote, Interval, NewsArticle, QuoteView};
use crate::store::Persistence;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::{sleep, Instant};

type Reply<T> = (Duration, Result<T, FetchError>);

/// Canned replies keyed by request argument, with a call log.
pub struct Script<T> {
    replies: Mutex<HashMap<String, Reply<T>>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl<T: Clone> Default for Script<T> {
    fn default() -> Self {
        Self {
            replies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        }
    }
}

impl<T: Clone> Script<T> {
    pub fn reply(&self, key: &str, result: Result<T, FetchError>) -> &Self {
        self.reply_after(key, Duration::ZERO, result)
    }

    pub fn reply_after(&self, key: &str, delay: Duration, result: Result<T, FetchError>) -> &Self {
        lock(&self.replies).insert(key.to_string(), (delay, result));
        self
    }

    pub async fn call(&self, key: &str) -> Result<T, FetchError> {
        lock(&self.calls).push((key.to_string(), Instant::now()));
        let reply = lock(&self.replies).get(key).cloned();
        let (delay, result) = reply.unwrap_or_else(|| {
            (
                Duration::ZERO,
                Err(FetchError::Transport(format!("unscripted request {key}"))),
            )
        });
        if !delay.is_zero() {
            sleep(delay).await;
        }
        result
    }

    pub fn calls(&self, key: &str) -> usize {
        lock(&self.calls).iter().filter(|(k, _)| k == key).count()
    }

    pub fn call_times(&self, key: &str) -> Vec<Instant> {
        lock(&self.calls)
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn total_calls(&self) -> usize {
        lock(&self.calls).len()
    }
}

#[derive(Default)]
pub struct FakeEquity {
    pub quotes: Script<QuoteView>,
    pub history: Script<ChartSeries>,
}

#[async_trait]
impl EquityFeed for FakeEquity {
    async fn fetch_quote(&self, symbol: &str) -> Result<QuoteView, FetchError> {
        self.quotes.call(symbol).await
    }

    async fn fetch_history(&self, symbol: &str, _interval: Interval) -> Result<ChartSeries, FetchError> {
        self.history.call(symbol).await
    }
}

#[derive(Default)]
pub struct FakeCrypto {
    pub quotes: Script<CoinQuote>,
    pub history: Script<ChartSeries>,
    pub top: Script<Vec<CoinMarket>>,
}

#[async_trait]
impl CryptoFeed for FakeCrypto {
    async fn fetch_quote(&self, coin: &str) -> Result<CoinQuote, FetchError> {
        self.quotes.call(coin).await
    }

    async fn fetch_history(&self, coin: &str, _days: u32) -> Result<ChartSeries, FetchError> {
        self.history.call(coin).await
    }

    async fn fetch_top(&self, _limit: usize) -> Result<Vec<CoinMarket>, FetchError> {
        self.top.call("top").await
    }
}

#[derive(Default)]
pub struct FakeForex {
    pub history: Script<ChartSeries>,
}

#[async_trait]
impl ForexFeed for FakeForex {
    async fn fetch_pair_history(&self, from: &str, to: &str) -> Result<ChartSeries, FetchError> {
        self.history.call(&format!("{from}/{to}")).await
    }
}

#[derive(Default)]
pub struct FakeNews {
    pub latest: Script<Vec<NewsArticle>>,
}

#[async_trait]
impl NewsFeed for FakeNews {
    async fn fetch_latest(&self, _limit: usize) -> Result<Vec<NewsArticle>, FetchError> {
        self.latest.call("latest").await
    }
}

pub fn shared() -> Shared {
    Shared::new(Persistence::in_memory())
}

pub fn series(values: &[f64]) -> ChartSeries {
    ChartSeries::from_points(
        values
            .iter()
            .enumerate()
            .map(|(i, v)| (format!("2024-03-01 10:{:02}:00", i * 5), *v)),
    )
}

pub fn quote(symbol: &str, price: f64) -> QuoteView {
    QuoteView {
        symbol: symbol.to_string(),
        price,
        change: 1.0,
        change_percent: 0.5,
        volume: Some(1_000),
    }
}

pub fn coin(id: &str, price: f64) -> CoinQuote {
    CoinQuote {
        id: id.to_string(),
        name: id.to_string(),
        symbol: id[..3].to_uppercase(),
        image: None,
        price,
        change_24h: 10.0,
        change_percent_24h: 1.2,
        market_cap: 1.0e9,
        volume: 2.0e8,
    }
}
