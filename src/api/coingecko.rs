use crate::api::HttpFetcher;
use serde::Deserialize;
use serde_json::Value;

pub const TOP_PAIRS_PAGE: u32 = 20;
pub const MOVERS_PAGE: u32 = 100;

/// One element of `/coins/markets`.
///
/// Every numeric field is optional upstream; records are validated by the
/// report that consumes them.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MarketCoin {
    pub symbol: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub current_price: Option<f64>,
    #[serde(default)]
    pub price_change_percentage_24h: Option<f64>,
    #[serde(default)]
    pub market_cap_rank: Option<u32>,
}

impl MarketCoin {
    pub fn ticker(&self) -> String {
        self.symbol.trim().to_uppercase()
    }

    pub fn is_valid(&self) -> bool {
        !self.symbol.trim().is_empty()
            && self.current_price.map_or(false, |p| p.is_finite() && p >= 0.0)
    }
}

/// The `data` object of `/global`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct GlobalData {
    pub active_cryptocurrencies: Option<u64>,
    pub total_market_cap: std::collections::HashMap<String, f64>,
    pub total_volume: std::collections::HashMap<String, f64>,
    pub market_cap_percentage: std::collections::HashMap<String, f64>,
    pub market_cap_change_percentage_24h_usd: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: HttpFetcher,
    base_url: String,
}

impl CoinGeckoClient {
    pub fn new(http: HttpFetcher, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// `/coins/markets` ordered by market cap, vs USD, with the 24h change window.
    pub async fn get_markets(&self, per_page: u32) -> Option<Value> {
        let params = [
            ("vs_currency", "usd".to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", per_page.to_string()),
            ("page", "1".to_string()),
            ("price_change_percentage", "24h".to_string()),
        ];
        self.http
            .get_json(&format!("{}/coins/markets", self.base_url), &params)
            .await
    }

    pub async fn get_global(&self) -> Option<Value> {
        self.http
            .get_json(&format!("{}/global", self.base_url), &[])
            .await
    }
}
