use crate::api::HttpFetcher;
use serde::Deserialize;
use serde_json::Value;

/// One entry of the alternative.me index. The API sends numbers as strings.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FearGreedEntry {
    pub value: String,
    pub value_classification: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

impl FearGreedEntry {
    pub fn score(&self) -> Option<u8> {
        self.value.trim().parse::<u8>().ok().filter(|v| *v <= 100)
    }
}

#[derive(Debug, Clone)]
pub struct FearGreedClient {
    http: HttpFetcher,
    url: String,
}

impl FearGreedClient {
    pub fn new(http: HttpFetcher, url: impl Into<String>) -> Self {
        Self { http, url: url.into() }
    }

    pub async fn get_latest(&self) -> Option<Value> {
        self.http.get_json(&self.url, &[("limit", "1".to_string())]).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_score_parsing() {
        let entry = FearGreedEntry {
            value: " 73 ".into(),
            value_classification: "Greed".into(),
            timestamp: None,
        };
        assert_eq!(entry.score(), Some(73));

        let out_of_range = FearGreedEntry { value: "140".into(), ..entry.clone() };
        assert_eq!(out_of_range.score(), None);

        let garbage = FearGreedEntry { value: "n/a".into(), ..entry };
        assert_eq!(garbage.score(), None);
    }
}
