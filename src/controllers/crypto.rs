// src/controllers/crypto.rs
use super::Shared;
use crate::chart::{ChartSeries, ChartSlot, SeqToken, StyleHints};
use crate::clients::CryptoFeed;
use crate::config::CRYPTO_FALLBACK_DELAY;
use crate::error::{FetchError, ValidationError};
use crate::lock;
use crate::models::CoinQuote;
use crate::screen::{Notice, Panel, Tone};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::time::sleep;

pub const DEFAULT_COIN: &str = "bitcoin";
pub const CHART_DAYS: u32 = 7;
pub const TOP_COINS: usize = 8;

pub struct CryptoController {
    feed: Arc<dyn CryptoFeed>,
    shared: Shared,
    last_good: Mutex<HashMap<String, ChartSeries>>,
    last_quotes: Mutex<HashMap<String, CoinQuote>>,
}

impl CryptoController {
    pub fn new(feed: Arc<dyn CryptoFeed>, shared: Shared) -> Self {
        Self {
            feed,
            shared,
            last_good: Mutex::new(HashMap::new()),
            last_quotes: Mutex::new(HashMap::new()),
        }
    }

    pub async fn load_default(&self) {
        self.load_chart(DEFAULT_COIN).await;
    }

    /// Looks up `query` and, when found, loads its chart. The whole lookup
    /// holds one crypto slot token, so a later search owns both the panel
    /// and the chart.
    pub async fn search(&self, query: &str) -> Result<(), ValidationError> {
        let coin = query.trim().to_lowercase();
        if coin.is_empty() {
            self.shared
                .screen()
                .notify(Tone::Warning, "Please enter a cryptocurrency symbol");
            return Err(ValidationError::EmptySymbol);
        }
        let token = self.shared.charts().issue(ChartSlot::Crypto);
        self.shared.screen().crypto_info = Panel::Loading("Loading crypto data...".to_string());

        let result = self.feed.fetch_quote(&coin).await;
        let found = {
            let charts = self.shared.charts();
            if !charts.is_current(ChartSlot::Crypto, token) {
                debug!("Lookup for {} superseded", coin);
                return Ok(());
            }
            let mut screen = self.shared.screen();
            let cached = || lock(&self.last_quotes).get(&coin).cloned();
            match result {
                Ok(quote) => {
                    info!("{} ({}) at {}", quote.name, quote.symbol, quote.price);
                    lock(&self.last_quotes).insert(coin.clone(), quote.clone());
                    screen.crypto_info = Panel::Coin(quote);
                    true
                }
                Err(FetchError::NotFound(msg)) => {
                    warn!("Coin {} not found: {}", coin, msg);
                    screen.crypto_info = Panel::Notice(Notice::new(
                        Tone::Danger,
                        "Cryptocurrency not found. Please try again.",
                    ));
                    false
                }
                Err(FetchError::RateLimited(msg)) => {
                    warn!("Rate limited looking up {}: {}", coin, msg);
                    screen.crypto_info = Panel::CoinFallback {
                        notice: Notice::new(
                            Tone::Warning,
                            "API limit exceeded. Please wait a moment and try again.",
                        ),
                        cached: cached(),
                    };
                    false
                }
                Err(FetchError::Transport(msg)) => {
                    error!("Error fetching crypto data for {}: {}", coin, msg);
                    screen.crypto_info = Panel::CoinFallback {
                        notice: Notice::new(
                            Tone::Danger,
                            "Error fetching crypto data. Please try again.",
                        ),
                        cached: cached(),
                    };
                    false
                }
            }
        };
        if found {
            self.chart_for(&coin, token).await;
        }
        Ok(())
    }

    /// Loads the 7-day chart for `coin`. If nothing could be drawn for a coin
    /// other than the default, the default coin is tried once after
    /// [`CRYPTO_FALLBACK_DELAY`]; that retry never falls back again.
    pub async fn load_chart(&self, coin: &str) {
        let token = self.shared.charts().issue(ChartSlot::Crypto);
        self.chart_for(coin, token).await;
    }

    async fn chart_for(&self, coin: &str, token: SeqToken) {
        if self.try_chart(coin, token).await.is_ok() || coin.eq_ignore_ascii_case(DEFAULT_COIN) {
            return;
        }
        info!("Trying {} as fallback...", DEFAULT_COIN);
        sleep(CRYPTO_FALLBACK_DELAY).await;
        if !self.shared.charts().is_current(ChartSlot::Crypto, token) {
            debug!("Fallback for {} dropped, a newer request owns the chart", coin);
            return;
        }
        if let Err(e) = self.try_chart(DEFAULT_COIN, token).await {
            warn!("Fallback chart failed too: {}", e);
        }
    }

    /// `Ok` when the slot now shows data for `coin` (fresh or cached) or
    /// `token` was superseded.
    async fn try_chart(&self, coin: &str, token: SeqToken) -> Result<(), FetchError> {
        let result = self.feed.fetch_history(coin, CHART_DAYS).await;

        let mut charts = self.shared.charts();
        if !charts.is_current(ChartSlot::Crypto, token) {
            debug!("Crypto chart for {} superseded", coin);
            return Ok(());
        }
        let mut screen = self.shared.screen();
        let label = coin.to_uppercase();
        let err = match result {
            Ok(series) => {
                charts.render(ChartSlot::Crypto, &series, StyleHints::crypto(coin));
                lock(&self.last_good).insert(coin.to_string(), series);
                let showing_coin = matches!(&screen.crypto_info, Panel::Coin(q) if q.id == coin);
                if !showing_coin {
                    screen.crypto_info = Panel::Notice(Notice::titled(
                        Tone::Success,
                        format!("{label} Chart Loaded Successfully"),
                        "Showing 7-day price history",
                    ));
                }
                return Ok(());
            }
            Err(e) => e,
        };

        match &err {
            FetchError::NotFound(msg) => warn!("No chart for {}: {}", coin, msg),
            FetchError::RateLimited(msg) => warn!("Rate limited loading {} chart: {}", coin, msg),
            FetchError::Transport(msg) => error!("Error loading crypto chart {}: {}", coin, msg),
        }
        let cached = match err {
            FetchError::NotFound(_) => None,
            _ => lock(&self.last_good).get(coin).cloned(),
        };
        if let Some(series) = cached {
            charts.render(ChartSlot::Crypto, &series, StyleHints::crypto(coin));
            screen.crypto_info = Panel::Notice(Notice::titled(
                Tone::Warning,
                "Showing Cached Data",
                format!("Live {label} prices are unavailable; the chart shows the last loaded history."),
            ));
            return Ok(());
        }
        screen.crypto_info = Panel::Notice(Notice::titled(
            Tone::Warning,
            "Chart Loading Issue",
            format!(
                "Unable to load {label} chart. Please try searching for a different cryptocurrency or check your internet connection."
            ),
        ));
        Err(err)
    }

    pub async fn load_top(&self) {
        let result = self.feed.fetch_top(TOP_COINS).await;
        let mut screen = self.shared.screen();
        match result {
            Ok(coins) => {
                screen.top_cryptos.items = coins;
                screen.top_cryptos.notice = None;
            }
            Err(e) => {
                error!("Error loading top cryptos: {}", e);
                screen.top_cryptos.notice = Some(Notice::new(
                    Tone::Warning,
                    "Live market data is unavailable right now.",
                ));
            }
        }
    }
}
