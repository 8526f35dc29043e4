// src/screen.rs
//! In-memory stand-in for the page. Controllers render into it, the host
//! (or a test) reads it back.

use crate::config::TOAST_LIFETIME;
use crate::models::{
    Alert, CoinMarket, CoinQuote, ForexPair, NewsArticle, PortfolioHolding, PortfolioSummary,
    QuoteView, Theme,
};
use crate::view::Section;
use log::{info, log, Level};
use serde::Serialize;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Tone {
    Info,
    Success,
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub tone: Tone,
    pub title: Option<String>,
    pub message: String,
}

impl Notice {
    pub fn new(tone: Tone, message: impl Into<String>) -> Self {
        Self {
            tone,
            title: None,
            message: message.into(),
        }
    }

    pub fn titled(tone: Tone, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            tone,
            title: Some(title.into()),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub enum Panel {
    #[default]
    Empty,
    Loading(String),
    Notice(Notice),
    Quote {
        quote: QuoteView,
        note: Option<String>,
    },
    Coin(CoinQuote),
    /// Request failed; shows what we still have.
    Fallback {
        notice: Notice,
        cached: Option<QuoteView>,
    },
    /// Coin lookup failed; last good coin data if there is one.
    CoinFallback {
        notice: Notice,
        cached: Option<CoinQuote>,
    },
}

impl Panel {
    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Panel::Notice(n)
            | Panel::Fallback { notice: n, .. }
            | Panel::CoinFallback { notice: n, .. } => Some(n),
            _ => None,
        }
    }
}

/// A list section plus an optional message shown above or instead of it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Listing<T> {
    pub items: Vec<T>,
    pub notice: Option<Notice>,
}

impl<T> Default for Listing<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            notice: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioRow {
    pub symbol: String,
    pub name: String,
    pub shares: u32,
    pub avg_price: f64,
    pub current_price: f64,
    pub market_value: f64,
    pub gain_loss: f64,
    pub gain_loss_percent: f64,
}

impl From<&PortfolioHolding> for PortfolioRow {
    fn from(h: &PortfolioHolding) -> Self {
        Self {
            symbol: h.symbol.clone(),
            name: h.name.clone(),
            shares: h.shares,
            avg_price: h.avg_price,
            current_price: h.current_price,
            market_value: h.market_value(),
            gain_loss: h.gain_loss(),
            gain_loss_percent: h.gain_loss_percent(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WatchlistRow {
    pub symbol: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Toast {
    pub notice: Notice,
    pub expires_at: Instant,
}

/// Current values of the page's form fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Inputs {
    pub stock_symbol: String,
    pub stock_interval: String,
    pub crypto_symbol: String,
    pub alert_symbol: String,
    pub alert_price: String,
    pub alert_condition: String,
    pub forex_from: String,
    pub forex_to: String,
    pub forex_amount: String,
    pub login_email: String,
    pub signup_name: String,
    pub signup_email: String,
}

impl Default for Inputs {
    fn default() -> Self {
        Self {
            stock_symbol: String::new(),
            stock_interval: "5min".to_string(),
            crypto_symbol: String::new(),
            alert_symbol: String::new(),
            alert_price: String::new(),
            alert_condition: "above".to_string(),
            forex_from: "USD".to_string(),
            forex_to: "EUR".to_string(),
            forex_amount: "1".to_string(),
            login_email: String::new(),
            signup_name: String::new(),
            signup_email: String::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct Screen {
    pub visible: Section,
    pub active_nav: Section,
    pub clock: String,
    pub theme: Theme,
    pub inputs: Inputs,

    pub stock_info: Panel,
    pub crypto_info: Panel,
    pub forex_info: Panel,
    pub forex_result: Option<Notice>,

    pub popular_stocks: Listing<QuoteView>,
    pub top_cryptos: Listing<CoinMarket>,
    pub forex_pairs: Vec<ForexPair>,
    pub news: Listing<NewsArticle>,
    pub portfolio_rows: Vec<PortfolioRow>,
    pub portfolio_summary: PortfolioSummary,
    pub watchlist_rows: Vec<WatchlistRow>,
    pub alerts: Listing<Alert>,

    pub toasts: Vec<Toast>,
    pub opened_links: Vec<String>,
}

impl Screen {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exactly one section is visible; its nav link is the active one.
    pub fn show(&mut self, section: Section) {
        self.visible = section;
        self.active_nav = section;
    }

    pub fn notify(&mut self, tone: Tone, message: impl Into<String>) {
        let notice = Notice::new(tone, message);
        let level = match tone {
            Tone::Danger => Level::Error,
            Tone::Warning => Level::Warn,
            Tone::Info | Tone::Success => Level::Info,
        };
        log!(level, "Toast: {}", notice.message);
        self.toasts.push(Toast {
            notice,
            expires_at: Instant::now() + TOAST_LIFETIME,
        });
    }

    pub fn expire_toasts(&mut self, now: Instant) {
        self.toasts.retain(|t| t.expires_at > now);
    }

    pub fn last_toast(&self) -> Option<&Notice> {
        self.toasts.last().map(|t| &t.notice)
    }

    pub fn open_link(&mut self, url: String) {
        info!("Opening {}", url);
        self.opened_links.push(url);
    }
}
