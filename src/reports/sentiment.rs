use super::{banner, render_with, ReportKind, Shape};
use crate::api::fear_greed::FearGreedEntry;
use chrono::DateTime;
use serde_json::Value;
use teloxide::utils::html;

fn gauge(score: u8) -> &'static str {
    match score {
        0..=24 => "😱",
        25..=44 => "😨",
        45..=55 => "😐",
        56..=75 => "😊",
        _ => "🤑",
    }
}

fn parse_latest(body: &Value) -> Shape<(u8, FearGreedEntry)> {
    let entries = match body.get("data").and_then(Value::as_array) {
        Some(entries) => entries,
        None => return Shape::Malformed,
    };
    let first = match entries.first() {
        Some(first) => first,
        None => return Shape::Empty,
    };
    match serde_json::from_value::<FearGreedEntry>(first.clone()) {
        Ok(entry) => match entry.score() {
            Some(score) => Shape::Valid((score, entry)),
            None => Shape::Malformed,
        },
        Err(_) => Shape::Malformed,
    }
}

pub fn fear_greed(body: Option<&Value>) -> String {
    render_with(ReportKind::FearGreed, body, parse_latest, |(score, entry)| {
        let mut text = banner(ReportKind::FearGreed);
        text.push_str(&format!(
            "{} <b>{}/100</b> - {}",
            gauge(score),
            score,
            html::escape(entry.value_classification.trim())
        ));
        let updated = entry
            .timestamp
            .as_deref()
            .and_then(|t| t.trim().parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        if let Some(updated) = updated {
            text.push_str(&format!("\nUpdated: {} UTC", updated.format("%Y-%m-%d")));
        }
        text
    })
}
