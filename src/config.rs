// src/config.rs
use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_ALPHA_VANTAGE_URL: &str = "https://www.alphavantage.co";
pub const DEFAULT_COINGECKO_URL: &str = "https://api.coingecko.com/api/v3";
pub const DEFAULT_NEWS_URL: &str = "https://financialmodelingprep.com";
pub const DEFAULT_TRADER_CONTACT_URL: &str = "https://wa.me/9256495803";

pub const CRYPTO_DEFAULT_DELAY: Duration = Duration::from_millis(1000);
pub const STOCK_DEFAULT_DELAY: Duration = Duration::from_millis(1500);
pub const CRYPTO_FALLBACK_DELAY: Duration = Duration::from_millis(2000);
pub const CLOCK_TICK: Duration = Duration::from_secs(1);
pub const TOAST_LIFETIME: Duration = Duration::from_secs(5);

#[derive(Debug, Clone)]
pub struct Config {
    pub alpha_vantage_key: String,
    pub alpha_vantage_url: String,
    pub coingecko_url: String,
    pub news_url: String,
    pub news_key: String,
    pub store_path: PathBuf,
    pub proxy_addr: SocketAddr,
    pub trader_contact_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            alpha_vantage_key: "demo".to_string(),
            alpha_vantage_url: DEFAULT_ALPHA_VANTAGE_URL.to_string(),
            coingecko_url: DEFAULT_COINGECKO_URL.to_string(),
            news_url: DEFAULT_NEWS_URL.to_string(),
            news_key: "demo".to_string(),
            store_path: PathBuf::from("dashboard-store.json"),
            proxy_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            trader_contact_url: DEFAULT_TRADER_CONTACT_URL.to_string(),
        }
    }
}

impl Config {
    /// Reads `.env` (if any) and the process environment over the defaults.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        let defaults = Self::default();
        let proxy_addr = match env::var("PROXY_ADDR") {
            Ok(raw) => raw.parse().unwrap_or_else(|e| {
                log::warn!("Ignoring PROXY_ADDR {raw:?}: {e}");
                defaults.proxy_addr
            }),
            Err(_) => defaults.proxy_addr,
        };
        Self {
            alpha_vantage_key: var_or("ALPHA_VANTAGE_API_KEY", defaults.alpha_vantage_key),
            alpha_vantage_url: var_or("ALPHA_VANTAGE_URL", defaults.alpha_vantage_url),
            coingecko_url: var_or("COINGECKO_API_URL", defaults.coingecko_url),
            news_url: var_or("NEWS_API_URL", defaults.news_url),
            news_key: var_or("NEWS_API_KEY", defaults.news_key),
            store_path: env::var("DASHBOARD_STORE")
                .map(PathBuf::from)
                .unwrap_or(defaults.store_path),
            proxy_addr,
            trader_contact_url: var_or("TRADER_CONTACT_URL", defaults.trader_contact_url),
        }
    }
}

fn var_or(name: &str, default: String) -> String {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or(default)
}
