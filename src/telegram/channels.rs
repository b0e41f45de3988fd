use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use grammers_client::types::Chat;
use grammers_client::{Client, Config as ClientConfig, InitParams};
use grammers_session::Session;
use log::{info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ChannelPost {
    pub text: String,
    pub date: DateTime<Utc>,
}

/// Read access to public channels the bot follows.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChannelReader: Send + Sync {
    /// Up to `limit` most recent posts, newest first.
    async fn recent_posts(&self, channel: &str, limit: usize) -> Result<Vec<ChannelPost>>;
}

pub fn decode_session(encoded: &str) -> Result<Session> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|e| Error::ConfigError(format!("session is not valid base64: {}", e)))?;
    Session::load(&bytes).map_err(|e| Error::ConfigError(format!("session could not be loaded: {:?}", e)))
}

pub fn encode_session(session: &Session) -> String {
    STANDARD.encode(session.save())
}

/// Reads channels through a user account, since bots cannot read channel history.
pub struct MtprotoChannelReader {
    client: Client,
}

impl MtprotoChannelReader {
    pub async fn connect(api_id: i32, api_hash: &str, session: &str) -> Result<Self> {
        let session = decode_session(session)?;
        let client = Client::connect(ClientConfig {
            session,
            api_id,
            api_hash: api_hash.to_string(),
            params: InitParams::default(),
        })
        .await
        .map_err(|e| Error::ChannelError(format!("failed to connect: {}", e)))?;

        let authorized = client
            .is_authorized()
            .await
            .map_err(|e| Error::ChannelError(e.to_string()))?;
        if !authorized {
            return Err(Error::ConfigError(
                "session is not signed in, run create_session to produce a new one".to_string(),
            ));
        }
        info!("User session connected for channel reading");
        Ok(Self { client })
    }

    async fn resolve(&self, channel: &str) -> Result<Chat> {
        let username = channel.trim().trim_start_matches('@');
        self.client
            .resolve_username(username)
            .await
            .map_err(|e| Error::ChannelError(format!("failed to resolve @{}: {}", username, e)))?
            .ok_or_else(|| Error::ChannelError(format!("channel @{} not found", username)))
    }

    /// Joins `channel`; joining a channel the account is already in is a no-op upstream.
    pub async fn ensure_joined(&self, channel: &str) -> Result<()> {
        let chat = self.resolve(channel).await?;
        self.client
            .join_chat(chat.pack())
            .await
            .map_err(|e| Error::ChannelError(format!("failed to join @{}: {}", channel, e)))?;
        info!("Following @{}", channel.trim_start_matches('@'));
        Ok(())
    }

    /// Best-effort join of every followed channel; failures are only logged.
    pub async fn join_all(&self, channels: &[&str]) {
        for channel in channels {
            if let Err(e) = self.ensure_joined(channel).await {
                warn!("{}", e);
            }
        }
    }
}

#[async_trait]
impl ChannelReader for MtprotoChannelReader {
    async fn recent_posts(&self, channel: &str, limit: usize) -> Result<Vec<ChannelPost>> {
        let chat = self.resolve(channel).await?;
        let mut messages = self.client.iter_messages(chat.pack()).limit(limit);
        let mut posts = Vec::with_capacity(limit);
        while let Some(message) = messages
            .next()
            .await
            .map_err(|e| Error::ChannelError(format!("failed to read @{}: {}", channel, e)))?
        {
            posts.push(ChannelPost {
                text: message.text().to_string(),
                date: message.date(),
            });
        }
        Ok(posts)
    }
}
