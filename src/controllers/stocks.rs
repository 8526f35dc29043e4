// src/controllers/stocks.rs
use super::{synthetic_series, Shared};
use crate::chart::{ChartSeries, ChartSlot, StyleHints};
use crate::clients::EquityFeed;
use crate::error::{FetchError, ValidationError};
use crate::lock;
use crate::models::{Interval, QuoteView};
use crate::screen::{Notice, Panel, Tone};
use log::{debug, error, info, warn};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub const DEFAULT_SYMBOL: &str = "AAPL";
pub const POPULAR_SYMBOLS: [&str; 8] = ["AAPL", "GOOGL", "MSFT", "TSLA", "AMZN", "META", "NVDA", "NFLX"];
const DEMO_POINTS: usize = 20;

pub struct StocksController {
    feed: Arc<dyn EquityFeed>,
    shared: Shared,
    last_good: Mutex<HashMap<String, QuoteView>>,
}

impl StocksController {
    pub fn new(feed: Arc<dyn EquityFeed>, shared: Shared) -> Self {
        Self {
            feed,
            shared,
            last_good: Mutex::new(HashMap::new()),
        }
    }

    /// AAPL at 5 minutes; any failure except an unknown symbol draws a
    /// labelled demo chart.
    pub async fn load_default(&self) {
        let symbol = DEFAULT_SYMBOL;
        let token = self.shared.charts().issue(ChartSlot::Stock);
        let result = self
            .feed
            .fetch_history(symbol, Interval::default())
            .await
            .and_then(non_empty);

        let mut charts = self.shared.charts();
        if !charts.is_current(ChartSlot::Stock, token) {
            debug!("Default stock chart superseded");
            return;
        }
        let mut screen = self.shared.screen();
        match result {
            Ok(series) => {
                let quote = quote_from_series(symbol, &series);
                lock(&self.last_good).insert(symbol.to_string(), quote.clone());
                screen.stock_info = Panel::Quote {
                    quote,
                    note: Some("Default stock chart loaded".to_string()),
                };
                charts.render(ChartSlot::Stock, &series, StyleHints::stock(symbol));
            }
            Err(FetchError::NotFound(msg)) => {
                warn!("Default symbol {} unknown: {}", symbol, msg);
                screen.stock_info = Panel::Notice(Notice::new(
                    Tone::Danger,
                    "Invalid stock symbol. Please try again.",
                ));
            }
            Err(FetchError::RateLimited(msg)) => {
                warn!("Rate limited loading default chart: {}", msg);
                screen.stock_info = Panel::Notice(Notice::titled(
                    Tone::Info,
                    "Demo Stock Chart",
                    format!(
                        "Showing sample data for {symbol}. Search for a specific stock to see real-time data."
                    ),
                ));
                charts.render(ChartSlot::Stock, &demo_series(), StyleHints::stock(symbol));
            }
            Err(FetchError::Transport(msg)) => {
                error!("Error loading default stock chart: {}", msg);
                screen.stock_info = Panel::Notice(Notice::titled(
                    Tone::Warning,
                    "Chart Loading Issue",
                    "Unable to load stock chart. Please try searching for a specific stock or check your internet connection.",
                ));
                charts.render(ChartSlot::Stock, &demo_series(), StyleHints::stock(symbol));
            }
        }
    }

    /// Looks up `symbol` at `interval`. Failed lookups never touch the chart.
    pub async fn search(&self, symbol: &str, interval: &str) -> Result<(), ValidationError> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            self.shared
                .screen()
                .notify(Tone::Warning, "Please enter a stock symbol");
            return Err(ValidationError::EmptySymbol);
        }
        let interval: Interval = match interval.parse() {
            Ok(i) => i,
            Err(e) => {
                self.shared.screen().notify(Tone::Warning, e.to_string());
                return Err(e);
            }
        };

        let token = self.shared.charts().issue(ChartSlot::Stock);
        self.shared.screen().stock_info = Panel::Loading("Loading stock data...".to_string());
        info!("Searching {} at {}", symbol, interval);
        let result = self
            .feed
            .fetch_history(&symbol, interval)
            .await
            .and_then(non_empty);

        let mut charts = self.shared.charts();
        if !charts.is_current(ChartSlot::Stock, token) {
            debug!("Result for {} superseded", symbol);
            return Ok(());
        }
        let mut screen = self.shared.screen();
        let cached = || lock(&self.last_good).get(&symbol).cloned();
        match result {
            Ok(series) => {
                let quote = quote_from_series(&symbol, &series);
                lock(&self.last_good).insert(symbol.clone(), quote.clone());
                screen.stock_info = Panel::Quote { quote, note: None };
                charts.render(ChartSlot::Stock, &series, StyleHints::stock(&symbol));
            }
            Err(FetchError::NotFound(msg)) => {
                warn!("{} not found: {}", symbol, msg);
                screen.stock_info = Panel::Notice(Notice::new(
                    Tone::Danger,
                    "Invalid stock symbol. Please try again.",
                ));
            }
            Err(FetchError::RateLimited(msg)) => {
                warn!("Rate limited searching {}: {}", symbol, msg);
                screen.stock_info = Panel::Fallback {
                    notice: Notice::new(
                        Tone::Warning,
                        "API limit exceeded. Please wait a moment and try again.",
                    ),
                    cached: cached(),
                };
            }
            Err(FetchError::Transport(msg)) => {
                error!("Error fetching stock data for {}: {}", symbol, msg);
                screen.stock_info = Panel::Fallback {
                    notice: Notice::new(
                        Tone::Danger,
                        "Error fetching stock data. Please try again.",
                    ),
                    cached: cached(),
                };
            }
        }
        Ok(())
    }

    /// One quote request per popular symbol, in order, so the provider's
    /// per-minute budget is not burst.
    pub async fn load_popular(&self) {
        {
            let mut screen = self.shared.screen();
            screen.popular_stocks.items.clear();
            screen.popular_stocks.notice = None;
        }
        for symbol in POPULAR_SYMBOLS {
            match self.feed.fetch_quote(symbol).await {
                Ok(quote) => {
                    lock(&self.last_good).insert(symbol.to_string(), quote.clone());
                    self.shared.screen().popular_stocks.items.push(quote);
                }
                Err(FetchError::RateLimited(msg)) => {
                    warn!("Rate limited loading popular stocks at {}: {}", symbol, msg);
                    self.shared.screen().popular_stocks.notice = Some(Notice::new(
                        Tone::Warning,
                        "API limit reached. Some quotes could not be loaded.",
                    ));
                    break;
                }
                Err(e) => error!("Skipping popular stock {}: {}", symbol, e),
            }
        }
        let mut screen = self.shared.screen();
        if screen.popular_stocks.items.is_empty() && screen.popular_stocks.notice.is_none() {
            screen.popular_stocks.notice = Some(Notice::new(
                Tone::Info,
                "Quotes are unavailable right now.",
            ));
        }
    }
}

fn non_empty(series: ChartSeries) -> Result<ChartSeries, FetchError> {
    if series.is_empty() {
        Err(FetchError::Transport("no data available for this symbol".to_string()))
    } else {
        Ok(series)
    }
}

pub(crate) fn quote_from_series(symbol: &str, series: &ChartSeries) -> QuoteView {
    let price = series.last().unwrap_or_default();
    let previous = series.previous().unwrap_or(price);
    let change = price - previous;
    let change_percent = if previous == 0.0 {
        0.0
    } else {
        change / previous * 100.0
    };
    QuoteView {
        symbol: symbol.to_string(),
        price,
        change,
        change_percent,
        volume: None,
    }
}

fn demo_series() -> ChartSeries {
    synthetic_series(DEMO_POINTS, 150.0, 10.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{quote, series, shared, FakeEquity};
    use std::time::Duration;

    fn controller(feed: Arc<FakeEquity>) -> (StocksController, Shared) {
        let shared = shared();
        (StocksController::new(feed, shared.clone()), shared)
    }

    #[tokio::test]
    async fn search_renders_quote_and_chart() {
        let feed = Arc::new(FakeEquity::default());
        feed.history.reply("MSFT", Ok(series(&[400.0, 410.0])));
        let (stocks, shared) = controller(feed);

        stocks.search(" msft ", "5min").await.unwrap();

        match &shared.screen().stock_info {
            Panel::Quote { quote, .. } => {
                assert_eq!(quote.symbol, "MSFT");
                assert_eq!(quote.price, 410.0);
                assert!((quote.change_percent - 2.5).abs() < 1e-9);
            }
            other => panic!("unexpected panel {other:?}"),
        }
        let charts = shared.charts();
        assert_eq!(charts.handle(ChartSlot::Stock).unwrap().series.values(), [400.0, 410.0]);
    }

    #[tokio::test]
    async fn rate_limited_search_shows_warning_without_chart_update() {
        let feed = Arc::new(FakeEquity::default());
        feed.history.reply("MSFT", Ok(series(&[400.0, 410.0])));
        feed.history
            .reply("TSLA", Err(FetchError::RateLimited("Note".to_string())));
        let (stocks, shared) = controller(feed);
        stocks.search("MSFT", "5min").await.unwrap();

        stocks.search("TSLA", "5min").await.unwrap();

        let screen = shared.screen();
        let notice = screen.stock_info.notice().unwrap();
        assert_eq!(notice.tone, Tone::Warning);
        assert!(notice.message.contains("API limit"));
        let charts = shared.charts();
        assert_eq!(charts.handle(ChartSlot::Stock).unwrap().style.label, "MSFT Price");
    }

    #[tokio::test]
    async fn fallback_carries_last_good_quote() {
        let feed = Arc::new(FakeEquity::default());
        feed.history.reply("NVDA", Ok(series(&[880.0, 900.0])));
        let (stocks, shared) = controller(feed.clone());
        stocks.search("NVDA", "5min").await.unwrap();

        feed.history
            .reply("NVDA", Err(FetchError::Transport("connection reset".to_string())));
        stocks.search("NVDA", "5min").await.unwrap();

        match &shared.screen().stock_info {
            Panel::Fallback { notice, cached } => {
                assert_eq!(notice.tone, Tone::Danger);
                assert_eq!(cached.as_ref().unwrap().price, 900.0);
            }
            other => panic!("unexpected panel {other:?}"),
        };
    }

    #[tokio::test]
    async fn unknown_symbol_has_distinct_message_and_no_chart() {
        let feed = Arc::new(FakeEquity::default());
        feed.history
            .reply("QQQQQ", Err(FetchError::NotFound("Invalid API call".to_string())));
        let (stocks, shared) = controller(feed);

        stocks.search("qqqqq", "1min").await.unwrap();

        assert_eq!(
            shared.screen().stock_info.notice().unwrap().message,
            "Invalid stock symbol. Please try again."
        );
        assert!(!shared.charts().has_chart(ChartSlot::Stock));
    }

    #[tokio::test]
    async fn empty_symbol_is_rejected_before_fetch() {
        let feed = Arc::new(FakeEquity::default());
        let (stocks, shared) = controller(feed.clone());

        assert_eq!(stocks.search("   ", "5min").await, Err(ValidationError::EmptySymbol));
        assert!(stocks.search("AAPL", "2min").await.is_err());

        assert_eq!(feed.history.total_calls(), 0);
        assert_eq!(shared.screen().last_toast().unwrap().tone, Tone::Warning);
    }

    #[tokio::test(start_paused = true)]
    async fn later_request_wins_when_earlier_resolves_last() {
        let feed = Arc::new(FakeEquity::default());
        feed.history
            .reply_after("AAPL", Duration::from_millis(300), Ok(series(&[170.0, 171.0])));
        feed.history
            .reply_after("MSFT", Duration::from_millis(50), Ok(series(&[400.0, 401.0])));
        let (stocks, shared) = controller(feed);

        let (first, second) = tokio::join!(stocks.search("AAPL", "5min"), stocks.search("MSFT", "5min"));
        first.unwrap();
        second.unwrap();

        let charts = shared.charts();
        let handle = charts.handle(ChartSlot::Stock).unwrap();
        assert_eq!(handle.style.label, "MSFT Price");
        assert_eq!(handle.series.values(), [400.0, 401.0]);
        assert_eq!(charts.live_charts(), 1);
        match &shared.screen().stock_info {
            Panel::Quote { quote, .. } => assert_eq!(quote.symbol, "MSFT"),
            other => panic!("unexpected panel {other:?}"),
        };
    }

    #[tokio::test]
    async fn default_chart_falls_back_to_demo_data() {
        let feed = Arc::new(FakeEquity::default());
        feed.history
            .reply(DEFAULT_SYMBOL, Err(FetchError::RateLimited("Note".to_string())));
        let (stocks, shared) = controller(feed);

        stocks.load_default().await;

        let notice = shared.screen().stock_info.notice().cloned().unwrap();
        assert_eq!(notice.title.as_deref(), Some("Demo Stock Chart"));
        let charts = shared.charts();
        let handle = charts.handle(ChartSlot::Stock).unwrap();
        assert_eq!(handle.series.len(), 20);
        assert_eq!(handle.series.labels()[0], "T-20");
    }

    #[tokio::test]
    async fn popular_stocks_skip_failures_and_stop_on_rate_limit() {
        let feed = Arc::new(FakeEquity::default());
        feed.quotes.reply("AAPL", Ok(quote("AAPL", 175.0)));
        feed.quotes
            .reply("GOOGL", Err(FetchError::Transport("timeout".to_string())));
        feed.quotes.reply("MSFT", Ok(quote("MSFT", 410.0)));
        feed.quotes
            .reply("TSLA", Err(FetchError::RateLimited("Note".to_string())));
        let (stocks, shared) = controller(feed.clone());

        stocks.load_popular().await;

        let screen = shared.screen();
        let symbols: Vec<_> = screen.popular_stocks.items.iter().map(|q| q.symbol.as_str()).collect();
        assert_eq!(symbols, ["AAPL", "MSFT"]);
        assert_eq!(screen.popular_stocks.notice.as_ref().unwrap().tone, Tone::Warning);
        assert_eq!(feed.quotes.calls("AMZN"), 0);
    }
}
