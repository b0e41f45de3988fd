use crate::api::coingecko::{CoinGeckoClient, MOVERS_PAGE, TOP_PAIRS_PAGE};
use crate::api::fear_greed::FearGreedClient;
use crate::api::feeds::FeedClient;
use crate::api::newsapi::NewsApiClient;
use crate::api::HttpFetcher;
use crate::config::{ChannelSettings, Settings};
use crate::telegram::channels::{ChannelPost, ChannelReader};
use log::{debug, error};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use teloxide::utils::html;

pub mod channel;
pub mod listing;
pub mod market;
pub mod news;
pub mod sentiment;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    TopPairs,
    FearGreed,
    GainersLosers,
    GlobalStats,
    WhaleAlerts,
    Listings,
    News,
}

impl ReportKind {
    /// Publication order used by `/start` and `--once`.
    pub const ALL: [ReportKind; 7] = [
        ReportKind::TopPairs,
        ReportKind::FearGreed,
        ReportKind::GainersLosers,
        ReportKind::GlobalStats,
        ReportKind::WhaleAlerts,
        ReportKind::Listings,
        ReportKind::News,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::TopPairs => "top_pairs",
            ReportKind::FearGreed => "fear_greed",
            ReportKind::GainersLosers => "gainers_losers",
            ReportKind::GlobalStats => "global_stats",
            ReportKind::WhaleAlerts => "whale_alerts",
            ReportKind::Listings => "listings",
            ReportKind::News => "news",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::TopPairs => "Top 20 Pairs",
            ReportKind::FearGreed => "Fear & Greed Index",
            ReportKind::GainersLosers => "Top Gainers & Losers",
            ReportKind::GlobalStats => "Global Market Stats",
            ReportKind::WhaleAlerts => "Whale Alerts",
            ReportKind::Listings => "Exchange Listings",
            ReportKind::News => "Crypto News",
        }
    }

    fn emoji(&self) -> &'static str {
        match self {
            ReportKind::TopPairs => "📊",
            ReportKind::FearGreed => "😨",
            ReportKind::GainersLosers => "🚀",
            ReportKind::GlobalStats => "🌍",
            ReportKind::WhaleAlerts => "🐋",
            ReportKind::Listings => "🆕",
            ReportKind::News => "📰",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == s.trim())
            .ok_or_else(|| {
                let known: Vec<_> = ReportKind::ALL.iter().map(|k| k.as_str()).collect();
                format!("unknown report '{}', expected one of: {}", s, known.join(", "))
            })
    }
}

/// Title line every report starts with.
pub fn banner(kind: ReportKind) -> String {
    format!("{} <b>{}</b>\n\n", kind.emoji(), html::escape(kind.title()))
}

pub fn unavailable(kind: ReportKind) -> String {
    format!(
        "⚠️ Could not fetch {} right now. Please try again later.",
        html::escape(kind.title())
    )
}

pub fn bad_format(kind: ReportKind) -> String {
    format!(
        "⚠️ {}: the data source returned an unexpected format.",
        html::escape(kind.title())
    )
}

pub fn no_data(kind: ReportKind) -> String {
    format!("ℹ️ {}: no data available.", html::escape(kind.title()))
}

/// Result of validating an upstream payload against the shape a report expects.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape<T> {
    Valid(T),
    Empty,
    Malformed,
}

/// Applies the shared edge-case policy, then hands valid data to `format`.
pub fn render_with<T, P, F>(kind: ReportKind, body: Option<&Value>, parse: P, format: F) -> String
where
    P: FnOnce(&Value) -> Shape<T>,
    F: FnOnce(T) -> String,
{
    let body = match body {
        Some(body) => body,
        None => return unavailable(kind),
    };
    match parse(body) {
        Shape::Valid(data) => format(data),
        Shape::Empty => no_data(kind),
        Shape::Malformed => {
            debug!("Unexpected {} payload: {}", kind, body);
            bad_format(kind)
        }
    }
}

pub fn format_price(price: f64) -> String {
    if price >= 1.0 {
        format!("${}", group_thousands(price, 2))
    } else if price >= 0.01 {
        format!("${:.4}", price)
    } else {
        format!("${:.8}", price)
    }
}

pub fn format_change(change: f64) -> String {
    let emoji = if change >= 0.0 { "🟢" } else { "🔴" };
    format!("{} {:+.2}%", emoji, change)
}

/// Renders large USD amounts as `$1.23T`, `$4.56B`, `$7.89M`.
pub fn format_large(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1e12 {
        format!("${:.2}T", value / 1e12)
    } else if abs >= 1e9 {
        format!("${:.2}B", value / 1e9)
    } else if abs >= 1e6 {
        format!("${:.2}M", value / 1e6)
    } else {
        format!("${}", group_thousands(value, 0))
    }
}

fn group_thousands(value: f64, decimals: usize) -> String {
    let formatted = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match formatted.split_once('.') {
        Some((i, f)) => (i.to_string(), Some(f.to_string())),
        None => (formatted.clone(), None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 { "-" } else { "" };
    match frac_part {
        Some(f) => format!("{}{}.{}", sign, grouped, f),
        None => format!("{}{}", sign, grouped),
    }
}

/// Knows where each report's data comes from and how it is formatted.
pub struct Reporter {
    coingecko: CoinGeckoClient,
    fear_greed: FearGreedClient,
    feeds: FeedClient,
    newsapi: NewsApiClient,
    channels: Arc<dyn ChannelReader>,
    channel_settings: ChannelSettings,
}

impl Reporter {
    pub fn new(
        http: HttpFetcher,
        settings: &Settings,
        newsapi_key: &str,
        channels: Arc<dyn ChannelReader>,
    ) -> Self {
        let endpoints = &settings.endpoints;
        Self {
            coingecko: CoinGeckoClient::new(http.clone(), endpoints.coingecko_base.clone()),
            fear_greed: FearGreedClient::new(http.clone(), endpoints.fear_greed_url.clone()),
            feeds: FeedClient::new(http.clone(), endpoints.news_feeds.clone()),
            newsapi: NewsApiClient::new(http, endpoints.newsapi_base.clone(), newsapi_key),
            channels,
            channel_settings: settings.channels.clone(),
        }
    }

    pub async fn render(&self, kind: ReportKind) -> String {
        match kind {
            ReportKind::TopPairs => {
                market::top_pairs(self.coingecko.get_markets(TOP_PAIRS_PAGE).await.as_ref())
            }
            ReportKind::GainersLosers => {
                market::gainers_losers(self.coingecko.get_markets(MOVERS_PAGE).await.as_ref())
            }
            ReportKind::GlobalStats => {
                market::global_stats(self.coingecko.get_global().await.as_ref())
            }
            ReportKind::FearGreed => {
                sentiment::fear_greed(self.fear_greed.get_latest().await.as_ref())
            }
            ReportKind::News => news::news(&self.feeds.fetch_all().await),
            ReportKind::WhaleAlerts => {
                let limit = self.channel_settings.whale_limit;
                // Media-only posts have no text, so read past them.
                let posts = self
                    .read_channel(
                        &self.channel_settings.whale_alerts,
                        limit.saturating_mul(channel::WHALE_OVERFETCH),
                    )
                    .await;
                channel::whale_alerts(posts.as_deref(), limit)
            }
            ReportKind::Listings => {
                let posts = self
                    .read_channel(&self.channel_settings.listings, self.channel_settings.listings_limit)
                    .await;
                channel::listings(posts.as_deref())
            }
        }
    }

    /// Headline digest behind `/latest`.
    pub async fn latest_headlines(&self) -> String {
        news::headlines(self.newsapi.top_headlines().await.as_ref())
    }

    async fn read_channel(&self, channel: &str, limit: usize) -> Option<Vec<ChannelPost>> {
        match self.channels.recent_posts(channel, limit).await {
            Ok(posts) => Some(posts),
            Err(e) => {
                error!("Failed to read @{}: {}", channel, e);
                None
            }
        }
    }
}
