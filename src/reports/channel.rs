use super::listing::{classify_listing, ListingAlert};
use super::{banner, no_data, unavailable, ReportKind};
use crate::telegram::channels::ChannelPost;
use std::collections::HashSet;
use teloxide::utils::html;

pub const MAX_POST_CHARS: usize = 300;
/// Whale-alert reads ask for this many times the posts they show.
pub const WHALE_OVERFETCH: usize = 3;

fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => format!("{}…", text[..cut].trim_end()),
        None => text.to_string(),
    }
}

/// The `limit` most recent non-empty whale-alert posts, newest first.
pub fn whale_alerts(posts: Option<&[ChannelPost]>, limit: usize) -> String {
    let posts = match posts {
        Some(posts) => posts,
        None => return unavailable(ReportKind::WhaleAlerts),
    };
    let mut posts: Vec<&ChannelPost> = posts.iter().filter(|p| !p.text.trim().is_empty()).collect();
    if posts.is_empty() {
        return no_data(ReportKind::WhaleAlerts);
    }
    posts.sort_by(|a, b| b.date.cmp(&a.date));

    let mut text = banner(ReportKind::WhaleAlerts);
    let entries: Vec<String> = posts
        .iter()
        .take(limit)
        .map(|p| {
            format!(
                "🕒 {} UTC\n{}",
                p.date.format("%H:%M"),
                html::escape(&truncate_chars(p.text.trim(), MAX_POST_CHARS))
            )
        })
        .collect();
    text.push_str(&entries.join("\n\n"));
    text
}

/// Distinct listing alerts mined from the posts, in post order.
pub fn mine_listings(posts: &[ChannelPost]) -> Vec<ListingAlert> {
    let mut seen = HashSet::new();
    posts
        .iter()
        .filter_map(|p| classify_listing(&p.text))
        .filter(|alert| seen.insert(alert.symbol.clone()))
        .collect()
}

pub fn listings(posts: Option<&[ChannelPost]>) -> String {
    let posts = match posts {
        Some(posts) => posts,
        None => return unavailable(ReportKind::Listings),
    };
    let alerts = mine_listings(posts);
    if alerts.is_empty() {
        return no_data(ReportKind::Listings);
    }

    let mut text = banner(ReportKind::Listings);
    let lines: Vec<String> = alerts
        .iter()
        .map(|a| format!("• {}: <code>{}</code>", a.kind.label(), html::escape(&a.symbol)))
        .collect();
    text.push_str(&lines.join("\n"));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn post(text: &str, hour: u32) -> ChannelPost {
        ChannelPost {
            text: text.to_string(),
            date: Utc.with_ymd_and_hms(2025, 10, 16, hour, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_whale_alerts_newest_first_and_escaped() {
        let posts = vec![
            post("1,000 BTC moved <unknown> -> Coinbase", 9),
            post("", 10),
            post("50,000,000 USDT minted", 11),
        ];
        let text = whale_alerts(Some(&posts), 5);
        let minted = text.find("USDT minted").unwrap();
        let moved = text.find("BTC moved").unwrap();
        assert!(minted < moved);
        assert!(text.contains("&lt;unknown&gt;"));
        assert!(text.contains("🕒 11:00 UTC"));
    }

    #[test]
    fn test_whale_alerts_skip_empty_posts_before_limiting() {
        let posts = vec![
            post("", 12),
            post("a", 11),
            post("  ", 10),
            post("b", 9),
            post("c", 8),
            post("d", 7),
        ];
        let text = whale_alerts(Some(&posts), 3);
        assert_eq!(text.matches("🕒").count(), 3);
        assert!(text.contains("🕒 09:00 UTC\nb"));
        assert!(!text.contains("07:00"));
    }

    #[test]
    fn test_whale_alerts_truncates_long_posts() {
        let long = "🐋".repeat(MAX_POST_CHARS + 50);
        let text = whale_alerts(Some(&[post(&long, 8)]), 5);
        assert!(text.ends_with('…'));
        assert_eq!(text.matches('🐋').count(), MAX_POST_CHARS + 1);
    }

    #[test]
    fn test_whale_alerts_edge_cases() {
        assert_eq!(whale_alerts(None, 5), unavailable(ReportKind::WhaleAlerts));
        assert_eq!(whale_alerts(Some(&[post("   ", 1)]), 5), no_data(ReportKind::WhaleAlerts));
    }

    #[test]
    fn test_listings_deduplicate_symbols() {
        let posts = vec![
            post("Binance will list PEPEUSDT (spot)", 9),
            post("Reminder: PEPEUSDT spot trading opens soon", 10),
            post("New perpetual contract: WIFUSDT", 11),
            post("System upgrade notice", 12),
        ];
        let text = listings(Some(&posts));
        assert_eq!(text.matches("PEPEUSDT").count(), 1);
        assert!(text.contains("• New spot pair: <code>PEPEUSDT</code>"));
        assert!(text.contains("• New futures pair: <code>WIFUSDT</code>"));
    }

    #[test]
    fn test_listings_edge_cases() {
        assert_eq!(listings(None), unavailable(ReportKind::Listings));
        assert_eq!(listings(Some(&[post("nothing to see", 1)])), no_data(ReportKind::Listings));
    }
}
