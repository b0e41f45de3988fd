use super::{bad_format, banner, no_data, render_with, unavailable, ReportKind, Shape};
use crate::api::feeds::{merge_unique, FeedItem};
use crate::api::newsapi::Article;
use serde_json::Value;
use teloxide::utils::html;

pub const MAX_NEWS_ITEMS: usize = 10;

fn escape_attr(value: &str) -> String {
    html::escape(value).replace('"', "&quot;")
}

/// Renders the merged feed digest. `None` entries are feeds that could not be read.
pub fn news(feeds: &[Option<Vec<FeedItem>>]) -> String {
    if feeds.iter().all(Option::is_none) {
        return unavailable(ReportKind::News);
    }
    let items = merge_unique(feeds.iter().flatten().cloned().collect());
    if items.is_empty() {
        return no_data(ReportKind::News);
    }

    let mut text = banner(ReportKind::News);
    let lines: Vec<String> = items
        .iter()
        .take(MAX_NEWS_ITEMS)
        .map(|item| {
            let mut line = format!(
                "• <a href=\"{}\">{}</a>",
                escape_attr(&item.link),
                html::escape(&item.title)
            );
            if let Some(published) = item.published {
                line.push_str(&format!(" <i>({})</i>", published.format("%b %d, %H:%M UTC")));
            }
            line
        })
        .collect();
    text.push_str(&lines.join("\n"));
    text
}

fn parse_articles(body: &Value) -> Shape<Vec<String>> {
    if body.get("status").and_then(Value::as_str) == Some("error") {
        return Shape::Malformed;
    }
    let articles = match body.get("articles").and_then(Value::as_array) {
        Some(articles) => articles,
        None => return Shape::Malformed,
    };
    let titles: Vec<String> = articles
        .iter()
        .filter_map(|a| serde_json::from_value::<Article>(a.clone()).ok())
        .filter_map(|a| a.title)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && t != "[Removed]")
        .collect();
    if titles.is_empty() {
        Shape::Empty
    } else {
        Shape::Valid(titles)
    }
}

/// NewsAPI top headlines, one bullet per title.
pub fn headlines(body: Option<&Value>) -> String {
    let kind = ReportKind::News;
    match body {
        Some(body) if body.get("status").and_then(Value::as_str) == Some("error") => {
            log::warn!(
                "NewsAPI rejected the request: {}",
                body.get("message").and_then(Value::as_str).unwrap_or("no message")
            );
            bad_format(kind)
        }
        _ => render_with(kind, body, parse_articles, |titles| {
            let mut text = String::from("📰 <b>Latest Headlines</b>\n\n");
            let lines: Vec<String> = titles
                .iter()
                .map(|t| format!("• {}", html::escape(t)))
                .collect();
            text.push_str(&lines.join("\n"));
            text
        }),
    }
}
