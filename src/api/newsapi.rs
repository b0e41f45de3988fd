use crate::api::HttpFetcher;
use serde::Deserialize;
use serde_json::Value;

pub const HEADLINES_PAGE: u32 = 5;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct Article {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewsApiClient {
    http: HttpFetcher,
    base_url: String,
    api_key: String,
}

impl NewsApiClient {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub async fn top_headlines(&self) -> Option<Value> {
        let params = [
            ("apiKey", self.api_key.clone()),
            ("language", "en".to_string()),
            ("pageSize", HEADLINES_PAGE.to_string()),
        ];
        self.http
            .get_json(&format!("{}/top-headlines", self.base_url), &params)
            .await
    }
}
