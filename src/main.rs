use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::sync::Arc;
use teloxide::prelude::*;

use crypto_digest_bot::api::HttpFetcher;
use crypto_digest_bot::cli::Cli;
use crypto_digest_bot::config::Config;
use crypto_digest_bot::context::BotContext;
use crypto_digest_bot::reports::Reporter;
use crypto_digest_bot::telegram::{commands, MtprotoChannelReader, TelegramMessenger};
use crypto_digest_bot::{logging, scheduler};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_file.as_deref(), cli.debug)?;

    info!("Starting crypto digest bot...");

    let config = match Config::load(&cli.config, cli.env_file.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(anyhow::anyhow!("Configuration loading failed: {}", e));
        }
    };
    info!("Configuration loaded: {:?}", config.secrets);
    let Config { secrets, settings } = config;

    let jobs = scheduler::build_table(&settings.schedule)?;

    let http = HttpFetcher::from_settings(&settings.http)?;
    let channel_reader =
        MtprotoChannelReader::connect(secrets.api_id, &secrets.api_hash, &secrets.session).await?;
    channel_reader
        .join_all(&[
            settings.channels.whale_alerts.as_str(),
            settings.channels.listings.as_str(),
        ])
        .await;

    let reporter = Reporter::new(http, &settings, &secrets.newsapi_key, Arc::new(channel_reader));
    let bot = Bot::new(&secrets.bot_token);
    let ctx = Arc::new(BotContext::new(
        reporter,
        Arc::new(TelegramMessenger::new(bot.clone())),
        &settings.delivery,
        ChatId(secrets.channel_id),
        UserId(secrets.owner_id),
    ));

    if cli.once {
        match cli.report {
            Some(kind) => ctx.publish(kind, ctx.channel()).await,
            None => ctx.publish_all(ctx.channel()).await,
        }
        info!("One-shot run finished");
        return Ok(());
    }

    ctx.announce_online().await;

    let _jobs = scheduler::spawn(ctx.clone(), &jobs, settings.heartbeat());
    info!(
        "Scheduled reports: {}",
        jobs.iter()
            .map(|job| format!("{} {}", job.at.format("%H:%M"), job.report))
            .collect::<Vec<_>>()
            .join(", ")
    );

    commands::run(ctx, bot).await;
    info!("Command loop stopped, shutting down");
    Ok(())
}
