use super::{banner, format_change, format_large, format_price, render_with, ReportKind, Shape};
use crate::api::coingecko::{GlobalData, MarketCoin, TOP_PAIRS_PAGE};
use serde_json::Value;
use teloxide::utils::html;

pub const MOVERS_PER_SIDE: usize = 10;

/// A coin with a usable 24h change, as ranked by the movers report.
#[derive(Debug, Clone, PartialEq)]
pub struct Mover {
    pub symbol: String,
    pub price: f64,
    pub change_24h: f64,
}

fn parse_coins(body: &Value) -> Shape<Vec<MarketCoin>> {
    let records = match body.as_array() {
        Some(records) => records,
        None => return Shape::Malformed,
    };
    if records.is_empty() {
        return Shape::Empty;
    }
    let coins: Vec<MarketCoin> = records
        .iter()
        .filter_map(|record| serde_json::from_value::<MarketCoin>(record.clone()).ok())
        .filter(MarketCoin::is_valid)
        .collect();
    if coins.is_empty() {
        Shape::Malformed
    } else {
        Shape::Valid(coins)
    }
}

pub fn top_pairs(body: Option<&Value>) -> String {
    render_with(ReportKind::TopPairs, body, parse_coins, |coins| {
        let mut text = banner(ReportKind::TopPairs);
        for (i, coin) in coins.iter().take(TOP_PAIRS_PAGE as usize).enumerate() {
            let change = coin
                .price_change_percentage_24h
                .filter(|c| c.is_finite())
                .map(format_change)
                .unwrap_or_else(|| "n/a".to_string());
            text.push_str(&format!(
                "{}. <b>{}</b>/USD {} ({})\n",
                i + 1,
                html::escape(&coin.ticker()),
                format_price(coin.current_price.unwrap_or_default()),
                change
            ));
        }
        text.trim_end().to_string()
    })
}

/// Splits movers into (gainers descending, losers ascending).
///
/// Sorted ascending by change, gainers take `min(10, ceil(n/2))` from the top and
/// losers `min(10, n - gainers)` from the bottom, so the two lists never share a coin.
pub fn split_movers(mut movers: Vec<Mover>) -> (Vec<Mover>, Vec<Mover>) {
    movers.sort_by(|a, b| a.change_24h.total_cmp(&b.change_24h));
    let n = movers.len();
    let gainer_count = MOVERS_PER_SIDE.min((n + 1) / 2);
    let loser_count = MOVERS_PER_SIDE.min(n - gainer_count);

    let losers = movers[..loser_count].to_vec();
    let gainers = movers[n - gainer_count..].iter().rev().cloned().collect();
    (gainers, losers)
}

fn parse_movers(body: &Value) -> Shape<Vec<Mover>> {
    match parse_coins(body) {
        Shape::Valid(coins) => {
            let movers: Vec<Mover> = coins
                .into_iter()
                .filter_map(|coin| {
                    let change = coin.price_change_percentage_24h.filter(|c| c.is_finite())?;
                    Some(Mover {
                        symbol: coin.ticker(),
                        price: coin.current_price.unwrap_or_default(),
                        change_24h: change,
                    })
                })
                .collect();
            if movers.is_empty() {
                Shape::Empty
            } else {
                Shape::Valid(movers)
            }
        }
        Shape::Empty => Shape::Empty,
        Shape::Malformed => Shape::Malformed,
    }
}

fn mover_lines(movers: &[Mover]) -> String {
    movers
        .iter()
        .enumerate()
        .map(|(i, m)| {
            format!(
                "{}. <b>{}</b> {} ({})",
                i + 1,
                html::escape(&m.symbol),
                format_change(m.change_24h),
                format_price(m.price)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn gainers_losers(body: Option<&Value>) -> String {
    render_with(ReportKind::GainersLosers, body, parse_movers, |movers| {
        let (gainers, losers) = split_movers(movers);
        let mut text = banner(ReportKind::GainersLosers);
        text.push_str("<b>Top Gainers</b>\n");
        text.push_str(&mover_lines(&gainers));
        if !losers.is_empty() {
            text.push_str("\n\n<b>Top Losers</b>\n");
            text.push_str(&mover_lines(&losers));
        }
        text
    })
}

fn parse_global(body: &Value) -> Shape<GlobalData> {
    let data = match body.get("data") {
        Some(data) if data.is_object() => data,
        _ => return Shape::Malformed,
    };
    match serde_json::from_value::<GlobalData>(data.clone()) {
        Ok(global) if global.total_market_cap.contains_key("usd") => Shape::Valid(global),
        Ok(global) if global.total_market_cap.is_empty() => Shape::Empty,
        _ => Shape::Malformed,
    }
}

pub fn global_stats(body: Option<&Value>) -> String {
    render_with(ReportKind::GlobalStats, body, parse_global, |global| {
        let mut text = banner(ReportKind::GlobalStats);
        let market_cap = global.total_market_cap.get("usd").copied().unwrap_or_default();
        text.push_str(&format!("💰 Market cap: {}", format_large(market_cap)));
        if let Some(change) = global.market_cap_change_percentage_24h_usd.filter(|c| c.is_finite()) {
            text.push_str(&format!(" ({} 24h)", format_change(change)));
        }
        text.push('\n');
        if let Some(volume) = global.total_volume.get("usd") {
            text.push_str(&format!("📈 24h volume: {}\n", format_large(*volume)));
        }
        if let Some(btc) = global.market_cap_percentage.get("btc") {
            text.push_str(&format!("₿ BTC dominance: {:.1}%\n", btc));
        }
        if let Some(eth) = global.market_cap_percentage.get("eth") {
            text.push_str(&format!("Ξ ETH dominance: {:.1}%\n", eth));
        }
        if let Some(active) = global.active_cryptocurrencies {
            text.push_str(&format!("🪙 Active coins: {}\n", active));
        }
        text.trim_end().to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reports::{bad_format, no_data, unavailable};
    use serde_json::json;

    fn coin(symbol: &str, price: f64, change: f64) -> Value {
        json!({
            "id": symbol.to_lowercase(),
            "symbol": symbol.to_lowercase(),
            "current_price": price,
            "price_change_percentage_24h": change
        })
    }

    #[test]
    fn test_top_pairs_with_fewer_than_twenty() {
        let body = json!([coin("BTC", 64000.0, 1.5), coin("ETH", 3100.0, -0.4)]);
        let text = top_pairs(Some(&body));
        assert!(text.starts_with(&banner(ReportKind::TopPairs)));
        assert!(text.contains("1. <b>BTC</b>/USD $64,000.00 (🟢 +1.50%)"));
        assert!(text.contains("2. <b>ETH</b>/USD $3,100.00 (🔴 -0.40%)"));
        assert!(!text.contains("3."));
    }

    #[test]
    fn test_top_pairs_caps_at_twenty() {
        let body = Value::Array((0..30).map(|i| coin(&format!("C{}", i), 1.0 + i as f64, 0.0)).collect());
        let text = top_pairs(Some(&body));
        assert!(text.contains("20. <b>C19</b>"));
        assert!(!text.contains("21."));
    }

    #[test]
    fn test_top_pairs_edge_cases() {
        assert_eq!(top_pairs(None), unavailable(ReportKind::TopPairs));
        assert_eq!(top_pairs(Some(&json!({"error": "rate limited"}))), bad_format(ReportKind::TopPairs));
        assert_eq!(top_pairs(Some(&json!([]))), no_data(ReportKind::TopPairs));
        assert_eq!(top_pairs(Some(&json!([{"foo": 1}]))), bad_format(ReportKind::TopPairs));
    }

    #[test]
    fn test_top_pairs_skips_invalid_records() {
        let body = json!([{"symbol": "bad"}, coin("SOL", 150.0, 3.0)]);
        let text = top_pairs(Some(&body));
        assert!(text.contains("1. <b>SOL</b>"));
        assert!(!text.contains("BAD"));
    }

    #[test]
    fn test_small_movers_split_without_overlap() {
        let body = json!([coin("AAA", 1.0, 5.0), coin("BBB", 1.0, -3.0), coin("CCC", 1.0, 12.0)]);
        let text = gainers_losers(Some(&body));
        let gainers_at = text.find("<b>Top Gainers</b>").unwrap();
        let losers_at = text.find("<b>Top Losers</b>").unwrap();
        let (gainers, losers) = text[gainers_at..].split_at(losers_at - gainers_at);

        assert!(gainers.find("CCC").unwrap() < gainers.find("AAA").unwrap());
        assert!(!gainers.contains("BBB"));
        assert!(losers.contains("BBB"));
        assert!(!losers.contains("AAA") && !losers.contains("CCC"));
    }

    #[test]
    fn test_large_movers_take_ten_each_side() {
        let movers: Vec<Mover> = (0..50)
            .map(|i| Mover {
                symbol: format!("T{}", i),
                price: 1.0,
                change_24h: (i as f64) - 25.0,
            })
            .collect();
        let (gainers, losers) = split_movers(movers);
        assert_eq!(gainers.len(), 10);
        assert_eq!(losers.len(), 10);
        assert!(gainers.windows(2).all(|w| w[0].change_24h > w[1].change_24h));
        assert!(losers.windows(2).all(|w| w[0].change_24h < w[1].change_24h));
        assert_eq!(gainers[0].symbol, "T49");
        assert_eq!(losers[0].symbol, "T0");
        assert!(gainers.iter().all(|g| !losers.contains(g)));
    }

    #[test]
    fn test_movers_without_change_are_skipped() {
        let body = json!([{"symbol": "xyz", "current_price": 1.0, "price_change_percentage_24h": null}]);
        assert_eq!(gainers_losers(Some(&body)), no_data(ReportKind::GainersLosers));
    }

    #[test]
    fn test_single_mover_is_a_gainer_only() {
        let (gainers, losers) = split_movers(vec![Mover {
            symbol: "ONE".into(),
            price: 1.0,
            change_24h: -1.0,
        }]);
        assert_eq!(gainers.len(), 1);
        assert!(losers.is_empty());
    }

    #[test]
    fn test_global_stats_renders_usd_fields() {
        let body = json!({
            "data": {
                "active_cryptocurrencies": 12345,
                "total_market_cap": {"usd": 2.45e12, "eur": 2.2e12},
                "total_volume": {"usd": 9.81e10},
                "market_cap_percentage": {"btc": 54.21, "eth": 17.08},
                "market_cap_change_percentage_24h_usd": 1.234
            }
        });
        let text = global_stats(Some(&body));
        assert!(text.contains("Market cap: $2.45T (🟢 +1.23% 24h)"));
        assert!(text.contains("24h volume: $98.10B"));
        assert!(text.contains("BTC dominance: 54.2%"));
        assert!(text.contains("ETH dominance: 17.1%"));
        assert!(text.contains("Active coins: 12345"));
    }

    #[test]
    fn test_global_stats_bad_shape() {
        assert_eq!(global_stats(Some(&json!([1, 2]))), bad_format(ReportKind::GlobalStats));
        assert_eq!(
            global_stats(Some(&json!({"data": {"total_market_cap": "lots"}}))),
            bad_format(ReportKind::GlobalStats)
        );
        assert_eq!(global_stats(None), unavailable(ReportKind::GlobalStats));
    }
}
