use serde::{Deserialize, Serialize};
use std::path::Path;
use std::fs;
use std::time::Duration;
use log::{info, warn};
use crate::error::{Error, Result};
use crate::reports::ReportKind;

pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
pub const ENV_API_ID: &str = "TELEGRAM_API_ID";
pub const ENV_API_HASH: &str = "TELEGRAM_API_HASH";
pub const ENV_SESSION: &str = "TELEGRAM_SESSION";
pub const ENV_CHANNEL_ID: &str = "CHANNEL_ID";
pub const ENV_OWNER_ID: &str = "OWNER_ID";
pub const ENV_NEWSAPI_KEY: &str = "NEWSAPI_KEY";

/// One week.
pub const MAX_HEARTBEAT_MINUTES: u64 = 7 * 24 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub secrets: Secrets,
    pub settings: Settings,
}

/// Values read from the environment. Every field is required.
#[derive(Clone)]
pub struct Secrets {
    pub bot_token: String,
    pub api_id: i32,
    pub api_hash: String,
    pub session: String,
    pub channel_id: i64,
    pub owner_id: u64,
    pub newsapi_key: String,
}

// Keep tokens out of logs.
impl std::fmt::Debug for Secrets {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Secrets")
            .field("bot_token", &"<redacted>")
            .field("api_id", &self.api_id)
            .field("api_hash", &"<redacted>")
            .field("session", &"<redacted>")
            .field("channel_id", &self.channel_id)
            .field("owner_id", &self.owner_id)
            .field("newsapi_key", &"<redacted>")
            .finish()
    }
}

impl Secrets {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |key: &str| -> Result<String> {
            match lookup(key) {
                Some(value) if !value.trim().is_empty() => Ok(value.trim().to_string()),
                _ => Err(Error::ConfigError(format!("{} must be set", key))),
            }
        };

        let api_id = require(ENV_API_ID)?
            .parse::<i32>()
            .map_err(|e| Error::ConfigError(format!("{} is not an integer: {}", ENV_API_ID, e)))?;
        let channel_id = require(ENV_CHANNEL_ID)?
            .parse::<i64>()
            .map_err(|e| Error::ConfigError(format!("{} is not an integer: {}", ENV_CHANNEL_ID, e)))?;
        let owner_id = require(ENV_OWNER_ID)?
            .parse::<u64>()
            .map_err(|e| Error::ConfigError(format!("{} is not a user id: {}", ENV_OWNER_ID, e)))?;

        Ok(Self {
            bot_token: require(ENV_BOT_TOKEN)?,
            api_id,
            api_hash: require(ENV_API_HASH)?,
            session: require(ENV_SESSION)?,
            channel_id,
            owner_id,
            newsapi_key: require(ENV_NEWSAPI_KEY)?,
        })
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    pub heartbeat_minutes: u64,
    pub http: HttpSettings,
    pub delivery: DeliverySettings,
    pub endpoints: EndpointSettings,
    pub channels: ChannelSettings,
    pub schedule: Vec<ScheduleEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HttpSettings {
    pub attempts: u32,
    pub delay_secs: u64,
    pub timeout_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct DeliverySettings {
    pub attempts: u32,
    pub delay_secs: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct EndpointSettings {
    pub coingecko_base: String,
    pub fear_greed_url: String,
    pub news_feeds: Vec<String>,
    pub newsapi_base: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ChannelSettings {
    pub whale_alerts: String,
    pub listings: String,
    pub whale_limit: usize,
    pub listings_limit: usize,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ScheduleEntry {
    pub report: ReportKind,
    pub hour: u32,
    pub minute: u32,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_secs: 2,
            timeout_secs: 15,
        }
    }
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            attempts: 3,
            delay_secs: 1,
        }
    }
}

impl Default for EndpointSettings {
    fn default() -> Self {
        Self {
            coingecko_base: "https://api.coingecko.com/api/v3".to_string(),
            fear_greed_url: "https://api.alternative.me/fng/".to_string(),
            news_feeds: vec![
                "https://cointelegraph.com/rss".to_string(),
                "https://www.coindesk.com/arc/outboundfeeds/rss/".to_string(),
            ],
            newsapi_base: "https://newsapi.org/v2".to_string(),
        }
    }
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            whale_alerts: "whale_alert_io".to_string(),
            listings: "binance_announcements".to_string(),
            whale_limit: 5,
            listings_limit: 10,
        }
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            heartbeat_minutes: 60,
            http: HttpSettings::default(),
            delivery: DeliverySettings::default(),
            endpoints: EndpointSettings::default(),
            channels: ChannelSettings::default(),
            schedule: default_schedule(),
        }
    }
}

pub fn default_schedule() -> Vec<ScheduleEntry> {
    vec![
        ScheduleEntry { report: ReportKind::TopPairs, hour: 6, minute: 0 },
        ScheduleEntry { report: ReportKind::FearGreed, hour: 7, minute: 0 },
        ScheduleEntry { report: ReportKind::GlobalStats, hour: 8, minute: 0 },
        ScheduleEntry { report: ReportKind::GainersLosers, hour: 12, minute: 0 },
        ScheduleEntry { report: ReportKind::News, hour: 14, minute: 0 },
        ScheduleEntry { report: ReportKind::WhaleAlerts, hour: 16, minute: 0 },
        ScheduleEntry { report: ReportKind::Listings, hour: 18, minute: 0 },
    ]
}

impl HttpSettings {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl DeliverySettings {
    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}

impl Settings {
    /// Heartbeat period; `None` when `heartbeat_minutes` is 0.
    pub fn heartbeat(&self) -> Option<Duration> {
        match self.heartbeat_minutes {
            0 => None,
            minutes => Some(Duration::from_secs(minutes.saturating_mul(60))),
        }
    }

    /// Reads the settings file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Settings file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }
        let settings_str = fs::read_to_string(path)?;
        let settings = Self::from_toml(&settings_str)?;
        info!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    pub fn from_toml(source: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(source)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let settings_str = toml::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        fs::write(path, settings_str)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.http.attempts == 0 {
            return Err(Error::ConfigError("http.attempts must be at least 1".to_string()));
        }
        if self.heartbeat_minutes > MAX_HEARTBEAT_MINUTES {
            return Err(Error::ConfigError(format!(
                "heartbeat_minutes must be at most {}",
                MAX_HEARTBEAT_MINUTES
            )));
        }
        if self.http.timeout_secs == 0 {
            return Err(Error::ConfigError("http.timeout_secs must be at least 1".to_string()));
        }
        if self.delivery.attempts == 0 {
            return Err(Error::ConfigError("delivery.attempts must be at least 1".to_string()));
        }
        if self.endpoints.news_feeds.is_empty() {
            return Err(Error::ConfigError("endpoints.news_feeds must not be empty".to_string()));
        }
        for entry in &self.schedule {
            if entry.hour > 23 || entry.minute > 59 {
                return Err(Error::ConfigError(format!(
                    "invalid schedule time {:02}:{:02} for {}",
                    entry.hour, entry.minute, entry.report
                )));
            }
        }
        Ok(())
    }
}

impl Config {
    /// Loads `.env` (if any), the environment, and the settings file.
    pub fn load(settings_path: &Path, env_file: Option<&Path>) -> Result<Self> {
        match env_file {
            Some(path) => {
                dotenv::from_path(path)
                    .map_err(|e| Error::ConfigError(format!("failed to read {:?}: {}", path, e)))?;
            }
            None => {
                dotenv::dotenv().ok();
            }
        }
        let secrets = Secrets::from_env()?;
        let settings = Settings::load(settings_path)?;
        Ok(Self { secrets, settings })
    }
}
