// src/controllers/news.rs
use super::Shared;
use crate::clients::NewsFeed;
use crate::models::NewsArticle;
use crate::screen::{Notice, Tone};
use log::{error, info, warn};
use std::sync::Arc;

pub const NEWS_LIMIT: usize = 8;

const FALLBACK_ARTICLES: [(&str, &str, &str, &str); 4] = [
    (
        "Federal Reserve Announces Interest Rate Decision",
        "The Federal Reserve maintained interest rates at current levels, signaling a cautious approach to monetary policy.",
        "Financial Times",
        "2 hours ago",
    ),
    (
        "Tech Stocks Rally on Strong Earnings Reports",
        "Major technology companies reported better-than-expected earnings, driving market gains.",
        "Bloomberg",
        "4 hours ago",
    ),
    (
        "Bitcoin Surges Past $45,000 as Institutional Adoption Grows",
        "Cryptocurrency markets show strong momentum with increasing institutional investment.",
        "Reuters",
        "6 hours ago",
    ),
    (
        "Oil Prices Stabilize Amid Supply Concerns",
        "Crude oil prices show mixed signals as supply and demand factors balance out.",
        "MarketWatch",
        "8 hours ago",
    ),
];

pub fn fallback_articles() -> Vec<NewsArticle> {
    FALLBACK_ARTICLES
        .iter()
        .map(|&(title, summary, source, published)| NewsArticle {
            title: title.to_string(),
            summary: summary.to_string(),
            source: source.to_string(),
            published: published.to_string(),
        })
        .collect()
}

pub struct NewsController {
    feed: Arc<dyn NewsFeed>,
    shared: Shared,
}

impl NewsController {
    pub fn new(feed: Arc<dyn NewsFeed>, shared: Shared) -> Self {
        Self { feed, shared }
    }

    pub async fn load(&self) {
        let result = self.feed.fetch_latest(NEWS_LIMIT).await;
        let mut screen = self.shared.screen();
        match result {
            Ok(articles) if !articles.is_empty() => {
                info!("Loaded {} news articles", articles.len());
                screen.news.items = articles;
                screen.news.notice = None;
            }
            other => {
                match other {
                    Err(e) => error!("Error loading news: {}", e),
                    Ok(_) => warn!("News feed returned no articles"),
                }
                screen.news.items = fallback_articles();
                screen.news.notice = Some(Notice::new(
                    Tone::Info,
                    "Live news is unavailable; showing recent headlines.",
                ));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::testing::{shared, FakeNews};

    fn article(title: &str) -> NewsArticle {
        NewsArticle {
            title: title.to_string(),
            summary: "summary".to_string(),
            source: "Wire".to_string(),
            published: "2024-03-01 09:00:00".to_string(),
        }
    }

    #[tokio::test]
    async fn live_articles_replace_fallback() {
        let feed = Arc::new(FakeNews::default());
        feed.latest.reply("latest", Ok(vec![article("Markets open higher")]));
        let shared = shared();
        NewsController::new(feed, shared.clone()).load().await;

        let screen = shared.screen();
        assert_eq!(screen.news.items.len(), 1);
        assert!(screen.news.notice.is_none());
    }

    #[tokio::test]
    async fn failure_and_empty_feed_use_fixed_articles() {
        let feed = Arc::new(FakeNews::default());
        feed.latest
            .reply("latest", Err(FetchError::Transport("dns".to_string())));
        let shared = shared();
        let news = NewsController::new(feed.clone(), shared.clone());

        news.load().await;
        assert_eq!(shared.screen().news.items, fallback_articles());

        feed.latest.reply("latest", Ok(Vec::new()));
        news.load().await;
        let screen = shared.screen();
        assert_eq!(screen.news.items.len(), 4);
        assert_eq!(screen.news.items[2].source, "Reuters");
        assert_eq!(screen.news.notice.as_ref().unwrap().tone, Tone::Info);
    }
}
