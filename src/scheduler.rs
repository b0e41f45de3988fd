use crate::config::ScheduleEntry;
use crate::context::BotContext;
use crate::error::{Error, Result};
use crate::reports::ReportKind;
use chrono::{DateTime, Duration as ChronoDuration, NaiveTime, Utc};
use log::{debug, info};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A report published to the channel once a day at a fixed UTC time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledJob {
    pub at: NaiveTime,
    pub report: ReportKind,
}

impl ScheduledJob {
    pub fn from_entry(entry: &ScheduleEntry) -> Result<Self> {
        let at = NaiveTime::from_hms_opt(entry.hour, entry.minute, 0).ok_or_else(|| {
            Error::ConfigError(format!(
                "invalid schedule time {:02}:{:02} for {}",
                entry.hour, entry.minute, entry.report
            ))
        })?;
        Ok(Self { at, report: entry.report })
    }
}

/// Next occurrence of `at` strictly after `now`.
pub fn next_fire(at: NaiveTime, now: DateTime<Utc>) -> DateTime<Utc> {
    let today = DateTime::<Utc>::from_naive_utc_and_offset(now.date_naive().and_time(at), Utc);
    if today > now {
        today
    } else {
        today + ChronoDuration::days(1)
    }
}

pub fn build_table(entries: &[ScheduleEntry]) -> Result<Vec<ScheduledJob>> {
    let mut jobs = entries
        .iter()
        .map(ScheduledJob::from_entry)
        .collect::<Result<Vec<_>>>()?;
    jobs.sort_by_key(|job| job.at);
    Ok(jobs)
}

fn until(target: DateTime<Utc>) -> Duration {
    (target - Utc::now()).to_std().unwrap_or(Duration::ZERO)
}

async fn run_job(ctx: Arc<BotContext>, job: ScheduledJob) {
    loop {
        let fire_at = next_fire(job.at, Utc::now());
        debug!("{} next fires at {}", job.report, fire_at);
        tokio::time::sleep(until(fire_at)).await;
        info!("Scheduled run: {}", job.report);
        ctx.publish(job.report, ctx.channel()).await;
    }
}

async fn run_heartbeat(ctx: Arc<BotContext>, period: Duration) {
    let mut ticker = tokio::time::interval(period);
    // The first tick completes immediately.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        ctx.heartbeat().await;
    }
}

/// Starts one task per job, plus the heartbeat when a period is given.
pub fn spawn(
    ctx: Arc<BotContext>,
    jobs: &[ScheduledJob],
    heartbeat: Option<Duration>,
) -> Vec<JoinHandle<()>> {
    let mut handles: Vec<JoinHandle<()>> = jobs
        .iter()
        .map(|job| tokio::spawn(run_job(ctx.clone(), *job)))
        .collect();

    if let Some(period) = heartbeat.filter(|p| !p.is_zero()) {
        handles.push(tokio::spawn(run_heartbeat(ctx, period)));
    }
    info!("Scheduler started with {} jobs", jobs.len());
    handles
}
