// src/main.rs
use env_logger::Builder;
use log::{error, info, LevelFilter};
use market_dashboard::bootstrap::{run_clock, StartupPlan};
use market_dashboard::clients::{AlphaVantageClient, CoinGeckoClient, NewsClient};
use market_dashboard::config::Config;
use market_dashboard::controllers::Shared;
use market_dashboard::dashboard::Feeds;
use market_dashboard::proxy;
use market_dashboard::store::{JsonFileStore, Persistence};
use market_dashboard::Dashboard;
use reqwest::Client;
use std::sync::Arc;
use tokio::task;

#[tokio::main]
async fn main() {
    Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .format_timestamp_secs()
        .init();

    let config = Config::from_env();
    info!("Starting the market dashboard...");

    let store = match JsonFileStore::open(&config.store_path) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to open store {}: {}", config.store_path.display(), e);
            return;
        }
    };
    info!("Using store at {}", config.store_path.display());

    let client = Client::new();
    let alpha_vantage = Arc::new(AlphaVantageClient::new(
        client.clone(),
        config.alpha_vantage_url.clone(),
        config.alpha_vantage_key.clone(),
    ));
    let feeds = Feeds {
        equity: alpha_vantage.clone(),
        forex: alpha_vantage.clone(),
        crypto: Arc::new(CoinGeckoClient::new(client.clone(), config.coingecko_url.clone())),
        news: Arc::new(NewsClient::new(
            client.clone(),
            config.news_url.clone(),
            config.news_key.clone(),
        )),
    };

    let shared = Shared::new(Persistence::new(store));
    let dashboard = Arc::new(Dashboard::new(feeds, shared, &config.trader_contact_url));

    let startup = dashboard.clone();
    task::spawn(async move {
        StartupPlan::default().run(&startup).await;
    });
    let clock = dashboard.clone();
    task::spawn(async move {
        run_clock(&clock).await;
    });

    let api = proxy::routes(alpha_vantage);

    info!("Server running on http://{}", config.proxy_addr);
    warp::serve(api).run(config.proxy_addr).await;
}
