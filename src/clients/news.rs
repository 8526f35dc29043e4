// src/clients/news.rs
use super::{check_status, NewsFeed};
use crate::error::FetchError;
use crate::models::NewsArticle;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;

#[derive(Clone)]
pub struct NewsClient {
    http: Client,
    base_url: String,
    api_key: String,
}

/// Article as providers send it; field names differ between feeds.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawArticle {
    title: Option<String>,
    summary: Option<String>,
    text: Option<String>,
    source: Option<String>,
    site: Option<String>,
    time: Option<String>,
    published_date: Option<String>,
}

impl NewsClient {
    pub fn new(http: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }
}

#[async_trait]
impl NewsFeed for NewsClient {
    async fn fetch_latest(&self, limit: usize) -> Result<Vec<NewsArticle>, FetchError> {
        let url = format!("{}/api/v3/stock_news", self.base_url.trim_end_matches('/'));
        debug!("Requesting {}", url);
        let response = self
            .http
            .get(&url)
            .query(&[("limit", limit.to_string()), ("apikey", self.api_key.clone())])
            .send()
            .await?;
        check_status(&response)?;
        let raw: Vec<RawArticle> = response.json().await?;
        Ok(normalize(raw, limit))
    }
}

fn normalize(raw: Vec<RawArticle>, limit: usize) -> Vec<NewsArticle> {
    raw.into_iter()
        .filter_map(|a| {
            let title = a.title.filter(|t| !t.trim().is_empty())?;
            Some(NewsArticle {
                title,
                summary: a.summary.or(a.text).unwrap_or_default(),
                source: a.source.or(a.site).unwrap_or_default(),
                published: a.time.or(a.published_date).unwrap_or_default(),
            })
        })
        .take(limit)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_alternate_field_names() {
        let raw: Vec<RawArticle> = serde_json::from_str(
            r#"[
                {"title": "Fed holds", "text": "Rates unchanged.", "site": "Reuters", "publishedDate": "2024-03-01 10:00:00"},
                {"title": "Chips rally", "summary": "Semis up.", "source": "Bloomberg", "time": "1h ago"},
                {"title": "", "text": "untitled"},
                {"text": "also untitled"}
            ]"#,
        )
        .unwrap();
        let articles = normalize(raw, 8);
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[0].summary, "Rates unchanged.");
        assert_eq!(articles[0].source, "Reuters");
        assert_eq!(articles[0].published, "2024-03-01 10:00:00");
        assert_eq!(articles[1].source, "Bloomberg");
        assert_eq!(articles[1].published, "1h ago");
    }

    #[test]
    fn respects_limit() {
        let raw = (0..5)
            .map(|i| RawArticle {
                title: Some(format!("story {i}")),
                ..Default::default()
            })
            .collect();
        assert_eq!(normalize(raw, 3).len(), 3);
    }
}
