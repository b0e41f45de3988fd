use crate::config::DeliverySettings;
use crate::error::Result;
use crate::metrics;
use async_trait::async_trait;
use lazy_static::lazy_static;
use log::{error, warn};
use regex::Regex;
use std::sync::Arc;
use std::time::Duration;
use teloxide::prelude::*;
use teloxide::types::ParseMode;

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

lazy_static! {
    static ref HTML_TAG: Regex = Regex::new(r"<[^>]*>").expect("valid regex");
}

/// The "send text to a chat" primitive.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Messenger: Send + Sync {
    async fn send_html(&self, chat: ChatId, text: &str) -> Result<()>;
}

pub struct TelegramMessenger {
    bot: Bot,
}

impl TelegramMessenger {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Messenger for TelegramMessenger {
    async fn send_html(&self, chat: ChatId, text: &str) -> Result<()> {
        self.bot
            .send_message(chat, text)
            .parse_mode(ParseMode::Html)
            .disable_web_page_preview(true)
            .await?;
        Ok(())
    }
}

/// Splits on line boundaries so HTML tags, which never span lines here, stay balanced.
pub fn split_message(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for line in text.split('\n') {
        let line_len = line.chars().count();
        let needed = if current.is_empty() { line_len } else { line_len + 1 };
        if current_len + needed > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if line_len > max_chars {
            chunks.extend(cut_oversized_line(line, max_chars));
            continue;
        }
        if !current.is_empty() {
            current.push('\n');
            current_len += 1;
        }
        current.push_str(line);
        current_len += line_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Drops markup from a line too long for one message, then cuts it without
/// splitting an `&...;` entity.
fn cut_oversized_line(line: &str, max_chars: usize) -> Vec<String> {
    let plain = HTML_TAG.replace_all(line, "");
    let chars: Vec<char> = plain.chars().collect();
    let mut pieces = Vec::new();
    let mut start = 0;

    while chars.len() - start > max_chars {
        let window = &chars[start..start + max_chars];
        let end = match window.iter().rposition(|&c| c == '&') {
            Some(amp) if amp > 0 && !window[amp..].contains(&';') => start + amp,
            _ => start + max_chars,
        };
        pieces.push(chars[start..end].iter().collect());
        start = end;
    }
    if start < chars.len() {
        pieces.push(chars[start..].iter().collect());
    }
    pieces
}

/// Delivers text with a fixed number of attempts. Callers never see the outcome;
/// a message that still fails is logged and dropped.
#[derive(Clone)]
pub struct Courier {
    messenger: Arc<dyn Messenger>,
    attempts: u32,
    delay: Duration,
}

impl Courier {
    pub fn new(messenger: Arc<dyn Messenger>, attempts: u32, delay: Duration) -> Self {
        Self {
            messenger,
            attempts: attempts.max(1),
            delay,
        }
    }

    pub fn from_settings(messenger: Arc<dyn Messenger>, settings: &DeliverySettings) -> Self {
        Self::new(messenger, settings.attempts, settings.delay())
    }

    pub fn messenger(&self) -> Arc<dyn Messenger> {
        self.messenger.clone()
    }

    pub async fn deliver(&self, chat: ChatId, text: &str) {
        for chunk in split_message(text, MAX_MESSAGE_CHARS) {
            self.deliver_chunk(chat, &chunk).await;
        }
    }

    async fn deliver_chunk(&self, chat: ChatId, text: &str) {
        for attempt in 1..=self.attempts {
            match self.messenger.send_html(chat, text).await {
                Ok(()) => {
                    metrics::MESSAGES_SENT.inc();
                    return;
                }
                Err(e) => {
                    warn!(
                        "Send to {} failed (attempt {}/{}): {}",
                        chat, attempt, self.attempts, e
                    );
                    if attempt < self.attempts {
                        tokio::time::sleep(self.delay).await;
                    }
                }
            }
        }
        metrics::MESSAGES_DROPPED.inc();
        error!("Dropping message to {} after {} attempts", chat, self.attempts);
    }
}
