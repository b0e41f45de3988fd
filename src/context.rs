use crate::config::DeliverySettings;
use crate::metrics;
use crate::reports::{ReportKind, Reporter};
use crate::telegram::delivery::{Courier, Messenger};
use chrono::{DateTime, Utc};
use log::info;
use std::sync::Arc;
use teloxide::types::{ChatId, UserId};

pub const HEARTBEAT_TEXT: &str = "⏰ Still alive!";
pub const ONLINE_TEXT: &str = "🤖 Bot is now online!";

/// Everything a scheduled job or command handler needs, built once at startup.
pub struct BotContext {
    pub reporter: Reporter,
    pub courier: Courier,
    channel: ChatId,
    owner: UserId,
    started_at: DateTime<Utc>,
}

impl BotContext {
    pub fn new(
        reporter: Reporter,
        messenger: Arc<dyn Messenger>,
        delivery: &DeliverySettings,
        channel: ChatId,
        owner: UserId,
    ) -> Self {
        Self {
            reporter,
            courier: Courier::from_settings(messenger, delivery),
            channel,
            owner,
            started_at: Utc::now(),
        }
    }

    pub fn channel(&self) -> ChatId {
        self.channel
    }

    pub fn owner_chat(&self) -> ChatId {
        ChatId(self.owner.0 as i64)
    }

    pub fn is_owner(&self, user: Option<UserId>) -> bool {
        user == Some(self.owner)
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Fetch, format and send one report to `chat`.
    pub async fn publish(&self, kind: ReportKind, chat: ChatId) {
        let text = self.reporter.render(kind).await;
        metrics::REPORTS_PUBLISHED.with_label_values(&[kind.as_str()]).inc();
        self.courier.deliver(chat, &text).await;
        info!("Published {} to {}", kind, chat);
    }

    pub async fn publish_all(&self, chat: ChatId) {
        for kind in ReportKind::ALL {
            self.publish(kind, chat).await;
        }
    }

    pub async fn heartbeat(&self) {
        self.courier.deliver(self.channel, HEARTBEAT_TEXT).await;
    }

    pub async fn announce_online(&self) {
        self.courier.deliver(self.owner_chat(), ONLINE_TEXT).await;
    }
}
