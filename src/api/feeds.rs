use crate::api::HttpFetcher;
use crate::error::Result;
use chrono::{DateTime, Utc};
use log::warn;
use rss::Channel;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq)]
pub struct FeedItem {
    pub title: String,
    pub link: String,
    pub published: Option<DateTime<Utc>>,
}

/// Parses an RSS document into feed items, dropping items without a title or link.
pub fn parse_feed(body: &str) -> Result<Vec<FeedItem>> {
    let channel = Channel::read_from(body.as_bytes())?;
    let items = channel
        .items()
        .iter()
        .filter_map(|item| {
            let title = item.title()?.trim();
            let link = item.link()?.trim();
            if title.is_empty() || link.is_empty() {
                return None;
            }
            let published = item
                .pub_date()
                .and_then(|d| DateTime::parse_from_rfc2822(d.trim()).ok())
                .map(|d| d.with_timezone(&Utc));
            Some(FeedItem {
                title: title.to_string(),
                link: link.to_string(),
                published,
            })
        })
        .collect();
    Ok(items)
}

/// Concatenates feeds in order, keeping the first occurrence of each link.
pub fn merge_unique(feeds: Vec<Vec<FeedItem>>) -> Vec<FeedItem> {
    let mut seen = HashSet::new();
    feeds
        .into_iter()
        .flatten()
        .filter(|item| seen.insert(item.link.clone()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct FeedClient {
    http: HttpFetcher,
    urls: Vec<String>,
}

impl FeedClient {
    pub fn new(http: HttpFetcher, urls: Vec<String>) -> Self {
        Self { http, urls }
    }

    /// Fetches and parses every feed. A feed that fails either step is `None`.
    pub async fn fetch_all(&self) -> Vec<Option<Vec<FeedItem>>> {
        let mut results = Vec::with_capacity(self.urls.len());
        for url in &self.urls {
            let parsed = match self.http.get_text(url, &[]).await {
                Some(body) => match parse_feed(&body) {
                    Ok(items) => Some(items),
                    Err(e) => {
                        warn!("Feed {} could not be parsed: {}", url, e);
                        None
                    }
                },
                None => None,
            };
            results.push(parsed);
        }
        results
    }
}
