use crate::config::HttpSettings;
use crate::error::{Error, Result};
use crate::metrics;
use log::{debug, error, warn};
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;

pub mod coingecko;
pub mod fear_greed;
pub mod feeds;
pub mod newsapi;

const USER_AGENT: &str = concat!("crypto-digest-bot/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(attempts: u32, delay: Duration) -> Self {
        Self {
            attempts: attempts.max(1),
            delay,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(2))
    }
}

/// GET with a fixed number of attempts and a fixed pause between them.
///
/// Failures never escape: after the last attempt the caller gets `None`,
/// which reports render as "could not fetch".
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    policy: RetryPolicy,
}

impl HttpFetcher {
    pub fn new(policy: RetryPolicy, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { client, policy })
    }

    pub fn from_settings(settings: &HttpSettings) -> Result<Self> {
        Self::new(
            RetryPolicy::new(settings.attempts, settings.delay()),
            settings.timeout(),
        )
    }

    pub async fn get_json(&self, url: &str, params: &[(&str, String)]) -> Option<Value> {
        self.get_with_retry(url, params, |body| Ok(serde_json::from_slice(body)?))
            .await
    }

    pub async fn get_text(&self, url: &str, params: &[(&str, String)]) -> Option<String> {
        self.get_with_retry(url, params, |body| {
            String::from_utf8(body.to_vec())
                .map_err(|e| Error::ApiInvalidFormat(format!("body is not UTF-8: {}", e)))
        })
        .await
    }

    async fn get_with_retry<T, F>(&self, url: &str, params: &[(&str, String)], decode: F) -> Option<T>
    where
        F: Fn(&[u8]) -> Result<T>,
    {
        for attempt in 1..=self.policy.attempts {
            metrics::FETCH_ATTEMPTS.inc();
            match self.attempt(url, params).await.and_then(|body| decode(&body)) {
                Ok(value) => {
                    debug!("GET {} succeeded on attempt {}", url, attempt);
                    return Some(value);
                }
                Err(e) => {
                    metrics::FETCH_FAILURES.inc();
                    warn!(
                        "GET {} failed (attempt {}/{}): {}",
                        url, attempt, self.policy.attempts, e
                    );
                    if attempt < self.policy.attempts {
                        tokio::time::sleep(self.policy.delay).await;
                    }
                }
            }
        }
        metrics::FETCH_EXHAUSTED.inc();
        error!("GET {} gave up after {} attempts", url, self.policy.attempts);
        None
    }

    async fn attempt(&self, url: &str, params: &[(&str, String)]) -> Result<Vec<u8>> {
        let response = self.client.get(url).query(params).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::ApiError(format!("unexpected status {}", status)));
        }
        Ok(response.bytes().await?.to_vec())
    }
}
