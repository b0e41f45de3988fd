use crate::reports::ReportKind;
use prometheus::{IntCounter, IntCounterVec, Opts};
use lazy_static::lazy_static;

lazy_static! {
    pub static ref FETCH_ATTEMPTS: IntCounter = IntCounter::new(
        "fetch_attempts_total",
        "Total number of upstream HTTP attempts"
    ).expect("valid metric definition");

    pub static ref FETCH_FAILURES: IntCounter = IntCounter::new(
        "fetch_failures_total",
        "Total number of failed upstream HTTP attempts"
    ).expect("valid metric definition");

    pub static ref FETCH_EXHAUSTED: IntCounter = IntCounter::new(
        "fetch_exhausted_total",
        "Total number of fetches that ran out of retries"
    ).expect("valid metric definition");

    pub static ref MESSAGES_SENT: IntCounter = IntCounter::new(
        "messages_sent_total",
        "Total number of delivered messages"
    ).expect("valid metric definition");

    pub static ref MESSAGES_DROPPED: IntCounter = IntCounter::new(
        "messages_dropped_total",
        "Total number of messages dropped after exhausting retries"
    ).expect("valid metric definition");

    pub static ref REPORTS_PUBLISHED: IntCounterVec = IntCounterVec::new(
        Opts::new("reports_published_total", "Reports rendered and handed to delivery"),
        &["report"]
    ).expect("valid metric definition");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Snapshot {
    pub fetch_attempts: u64,
    pub fetch_failures: u64,
    pub fetch_exhausted: u64,
    pub messages_sent: u64,
    pub messages_dropped: u64,
    pub reports_published: u64,
}

pub fn snapshot() -> Snapshot {
    Snapshot {
        fetch_attempts: FETCH_ATTEMPTS.get(),
        fetch_failures: FETCH_FAILURES.get(),
        fetch_exhausted: FETCH_EXHAUSTED.get(),
        messages_sent: MESSAGES_SENT.get(),
        messages_dropped: MESSAGES_DROPPED.get(),
        reports_published: ReportKind::ALL.iter().map(|kind| published(*kind)).sum(),
    }
}

pub fn published(kind: ReportKind) -> u64 {
    REPORTS_PUBLISHED.with_label_values(&[kind.as_str()]).get()
}
