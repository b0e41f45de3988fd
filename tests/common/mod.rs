#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use crypto_digest_bot::api::HttpFetcher;
use crypto_digest_bot::config::{DeliverySettings, HttpSettings, Settings};
use crypto_digest_bot::context::BotContext;
use crypto_digest_bot::error::{Error, Result};
use crypto_digest_bot::reports::Reporter;
use crypto_digest_bot::telegram::{ChannelPost, ChannelReader, Messenger};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use teloxide::types::{ChatId, UserId};

pub const CHANNEL: ChatId = ChatId(-1001234567890);
pub const OWNER: UserId = UserId(42);
pub const STRANGER: UserId = UserId(777);

/// Messenger that records every send instead of talking to Telegram.
#[derive(Default)]
pub struct RecordingMessenger {
    sent: Mutex<Vec<(ChatId, String)>>,
    fail: bool,
}

impl RecordingMessenger {
    pub fn failing() -> Self {
        Self { sent: Mutex::new(Vec::new()), fail: true }
    }

    pub fn sent(&self) -> Vec<(ChatId, String)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn sent_to(&self, chat: ChatId) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(c, _)| *c == chat)
            .map(|(_, text)| text)
            .collect()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn send_html(&self, chat: ChatId, text: &str) -> Result<()> {
        self.sent.lock().unwrap().push((chat, text.to_string()));
        if self.fail {
            return Err(Error::TelegramError("chat not found".to_string()));
        }
        Ok(())
    }
}

/// Channel reader serving canned posts; unknown channels fail.
#[derive(Default)]
pub struct FakeChannels {
    posts: HashMap<String, Vec<ChannelPost>>,
}

impl FakeChannels {
    pub fn with(mut self, channel: &str, posts: Vec<ChannelPost>) -> Self {
        self.posts.insert(channel.to_string(), posts);
        self
    }
}

#[async_trait]
impl ChannelReader for FakeChannels {
    async fn recent_posts(&self, channel: &str, limit: usize) -> Result<Vec<ChannelPost>> {
        self.posts
            .get(channel)
            .map(|posts| posts.iter().take(limit).cloned().collect())
            .ok_or_else(|| Error::ChannelError(format!("@{} is private", channel)))
    }
}

pub fn post(text: &str, hour: u32) -> ChannelPost {
    ChannelPost {
        text: text.to_string(),
        date: Utc.with_ymd_and_hms(2025, 10, 16, hour, 0, 0).unwrap(),
    }
}

/// Settings with every endpoint on `base` and no retry delays.
pub fn test_settings(base: &str) -> Settings {
    let mut settings = Settings::default();
    settings.http = HttpSettings { attempts: 2, delay_secs: 0, timeout_secs: 5 };
    settings.delivery = DeliverySettings { attempts: 1, delay_secs: 0 };
    settings.endpoints.coingecko_base = base.to_string();
    settings.endpoints.fear_greed_url = format!("{}/fng/", base);
    settings.endpoints.news_feeds = vec![format!("{}/feed/a", base), format!("{}/feed/b", base)];
    settings.endpoints.newsapi_base = base.to_string();
    settings
}

pub fn build_context(
    settings: &Settings,
    channels: FakeChannels,
    messenger: Arc<RecordingMessenger>,
) -> BotContext {
    let http = HttpFetcher::from_settings(&settings.http).unwrap();
    let reporter = Reporter::new(http, settings, "test-key", Arc::new(channels));
    BotContext::new(reporter, messenger, &settings.delivery, CHANNEL, OWNER)
}

pub fn rss(items: &[(&str, &str)]) -> String {
    let body: String = items
        .iter()
        .map(|(title, link)| format!("<item><title>{}</title><link>{}</link></item>", title, link))
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>t</title><link>https://x</link><description>d</description>{}</channel></rss>"#,
        body
    )
}
