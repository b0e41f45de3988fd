use lazy_static::lazy_static;
use regex::Regex;
use std::fmt;

// Russian stems match inflected forms; English keywords match whole words.
const FUTURES_STEMS: [&str; 1] = ["фьючерс"];
const SPOT_STEMS: [&str; 1] = ["спот"];

lazy_static! {
    static ref SLASH_PAIR: Regex =
        Regex::new(r"\b([A-Z0-9]{2,10})\s*/\s*([A-Z]{2,6})\b").expect("valid regex");
    static ref QUOTED_PAIR: Regex =
        Regex::new(r"\b[A-Z0-9]{2,10}(?:USDT|USDC|FDUSD|BUSD|BTC|ETH|BNB|TRY|EUR)\b").expect("valid regex");
    static ref TOKEN: Regex = Regex::new(r"\b[A-Z0-9]{6,12}\b").expect("valid regex");
    static ref FUTURES_WORD: Regex = Regex::new(r"(?i)\b(?:futures|perpetuals?)\b").expect("valid regex");
    static ref SPOT_WORD: Regex = Regex::new(r"(?i)\bspot\b").expect("valid regex");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListingKind {
    Spot,
    Futures,
    Unspecified,
}

impl ListingKind {
    pub fn label(&self) -> &'static str {
        match self {
            ListingKind::Spot => "New spot pair",
            ListingKind::Futures => "New futures pair",
            ListingKind::Unspecified => "New pair",
        }
    }
}

impl fmt::Display for ListingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingAlert {
    pub symbol: String,
    pub kind: ListingKind,
}

fn is_pair_length(token: &str) -> bool {
    (6..=12).contains(&token.len())
}

/// Finds the traded pair. `BASE/QUOTE` wins, then a token ending in a known quote
/// asset, then any 6-12 character uppercase token that has a letter in it.
pub fn extract_pair(text: &str) -> Option<String> {
    if let Some(caps) = SLASH_PAIR.captures(text) {
        let symbol = format!("{}{}", &caps[1], &caps[2]);
        if is_pair_length(&symbol) {
            return Some(symbol);
        }
    }
    if let Some(m) = QUOTED_PAIR.find_iter(text).find(|m| is_pair_length(m.as_str())) {
        return Some(m.as_str().to_string());
    }
    TOKEN
        .find_iter(text)
        .map(|m| m.as_str())
        .find(|token| token.chars().any(|c| c.is_ascii_alphabetic()))
        .map(str::to_string)
}

pub fn classify_kind(text: &str) -> ListingKind {
    let lowered = text.to_lowercase();
    if FUTURES_WORD.is_match(text) || FUTURES_STEMS.iter().any(|k| lowered.contains(k)) {
        ListingKind::Futures
    } else if SPOT_WORD.is_match(text) || SPOT_STEMS.iter().any(|k| lowered.contains(k)) {
        ListingKind::Spot
    } else {
        ListingKind::Unspecified
    }
}

/// `None` when the text carries no recognizable pair.
pub fn classify_listing(text: &str) -> Option<ListingAlert> {
    let symbol = extract_pair(text)?;
    Some(ListingAlert {
        symbol,
        kind: classify_kind(text),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spot_keyword_with_token() {
        let alert = classify_listing("Binance will list ABCDEF12 on the Spot market").unwrap();
        assert_eq!(alert.symbol, "ABCDEF12");
        assert_eq!(alert.kind, ListingKind::Spot);
        assert_eq!(alert.kind.label(), "New spot pair");
    }

    #[test]
    fn test_russian_keywords() {
        let spot = classify_listing("Листинг PEPEUSDT на споте").unwrap();
        assert_eq!(spot.symbol, "PEPEUSDT");
        assert_eq!(spot.kind, ListingKind::Spot);

        let futures = classify_listing("Новый фьючерсный контракт WIFUSDT").unwrap();
        assert_eq!(futures.kind, ListingKind::Futures);
    }

    #[test]
    fn test_no_keyword_is_new_pair() {
        let alert = classify_listing("Introducing NEWCOIN7 to the platform").unwrap();
        assert_eq!(alert.symbol, "NEWCOIN7");
        assert_eq!(alert.kind, ListingKind::Unspecified);
        assert_eq!(alert.kind.to_string(), "New pair");
    }

    #[test]
    fn test_futures_wins_over_spot() {
        let alert = classify_listing("Spot and USDⓈ-M Futures: SOLUSDT perpetual").unwrap();
        assert_eq!(alert.kind, ListingKind::Futures);
        assert_eq!(alert.symbol, "SOLUSDT");
    }

    #[test]
    fn test_keywords_inside_longer_words_are_ignored() {
        let alert = classify_listing("Binance spotlight on ABCDEF12").unwrap();
        assert_eq!(alert.kind, ListingKind::Unspecified);
        assert_eq!(classify_kind("New hotspot campaign"), ListingKind::Unspecified);
        assert_eq!(classify_kind("Quarterly futuresque promo"), ListingKind::Unspecified);
        assert_eq!(classify_kind("New Perpetuals: ORDIUSDT"), ListingKind::Futures);
    }

    #[test]
    fn test_slash_pair_is_normalized() {
        let alert = classify_listing("New spot listing: JUP / USDC").unwrap();
        assert_eq!(alert.symbol, "JUPUSDC");
    }

    #[test]
    fn test_text_without_pair() {
        assert_eq!(classify_listing("Scheduled maintenance tonight"), None);
        assert_eq!(classify_listing("Block 12345678 mined"), None);
        assert_eq!(extract_pair("short ABC tokens"), None);
    }
}
