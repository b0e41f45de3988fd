use crate::context::BotContext;
use crate::metrics;
use chrono::Utc;
use log::info;
use std::sync::Arc;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

pub const TEST_NOTIFY_TEXT: &str = "✅ Channel notification is working!";
pub const OWNER_ONLY_TEXT: &str = "⛔ This command is reserved for the bot owner.";

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "Get every report (the owner publishes to the channel)")]
    Start,
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Latest 5 headlines")]
    Latest,
    #[command(description = "Send a test message to the channel (owner only)")]
    TestNotify,
    #[command(description = "Uptime and delivery counters (owner only)")]
    Status,
}

/// Who sent a command and where to answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Caller {
    pub chat: ChatId,
    pub user: Option<UserId>,
}

impl Caller {
    pub fn from_message(msg: &Message) -> Self {
        Self {
            chat: msg.chat.id,
            user: msg.from().map(|u| u.id),
        }
    }
}

pub fn status_text(ctx: &BotContext) -> String {
    let uptime = Utc::now() - ctx.started_at();
    let snapshot = metrics::snapshot();
    format!(
        "🤖 <b>Bot Status</b>\n\n\
        Uptime: {}d {}h {}m\n\
        Fetch attempts: {}\n\
        Failed attempts: {}\n\
        Exhausted fetches: {}\n\
        Messages sent: {}\n\
        Messages dropped: {}\n\
        Reports published: {}",
        uptime.num_days(),
        uptime.num_hours() % 24,
        uptime.num_minutes() % 60,
        snapshot.fetch_attempts,
        snapshot.fetch_failures,
        snapshot.fetch_exhausted,
        snapshot.messages_sent,
        snapshot.messages_dropped,
        snapshot.reports_published
    )
}

pub async fn handle_command(ctx: &BotContext, caller: Caller, command: Command) {
    let is_owner = ctx.is_owner(caller.user);
    info!("Command {:?} from {:?} (owner: {})", command, caller.user, is_owner);

    match command {
        Command::Start => {
            if is_owner {
                ctx.courier
                    .deliver(caller.chat, "📤 Publishing all reports to the channel…")
                    .await;
                ctx.publish_all(ctx.channel()).await;
                ctx.courier.deliver(caller.chat, "✅ All reports published.").await;
            } else {
                ctx.publish_all(caller.chat).await;
            }
        }
        Command::Help => {
            ctx.courier
                .deliver(caller.chat, &Command::descriptions().to_string())
                .await;
        }
        Command::Latest => {
            let text = ctx.reporter.latest_headlines().await;
            ctx.courier.deliver(caller.chat, &text).await;
            if is_owner {
                ctx.courier.deliver(ctx.channel(), &text).await;
            }
        }
        Command::TestNotify => {
            if !is_owner {
                ctx.courier.deliver(caller.chat, OWNER_ONLY_TEXT).await;
                return;
            }
            // Straight through the messenger so the owner sees the real error.
            let reply = match ctx
                .courier
                .messenger()
                .send_html(ctx.channel(), TEST_NOTIFY_TEXT)
                .await
            {
                Ok(()) => "✅ Sent to the channel.".to_string(),
                Err(e) => format!(
                    "❌ Channel send failed: {}",
                    teloxide::utils::html::escape(&e.to_string())
                ),
            };
            ctx.courier.deliver(caller.chat, &reply).await;
        }
        Command::Status => {
            if !is_owner {
                ctx.courier.deliver(caller.chat, OWNER_ONLY_TEXT).await;
                return;
            }
            ctx.courier.deliver(caller.chat, &status_text(ctx)).await;
        }
    }
}

/// Runs the command loop until the process is stopped.
pub async fn run(ctx: Arc<BotContext>, bot: Bot) {
    Command::repl(bot, move |_bot: Bot, msg: Message, cmd: Command| {
        let ctx = ctx.clone();
        async move {
            handle_command(&ctx, Caller::from_message(&msg), cmd).await;
            respond(())
        }
    })
    .await;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_parsing() {
        assert_eq!(Command::parse("/start", "digest_bot").unwrap(), Command::Start);
        assert_eq!(Command::parse("/testnotify", "digest_bot").unwrap(), Command::TestNotify);
        assert_eq!(Command::parse("/latest@digest_bot", "digest_bot").unwrap(), Command::Latest);
        assert!(Command::parse("/trade", "digest_bot").is_err());
    }

    #[test]
    fn test_help_lists_every_command() {
        let help = Command::descriptions().to_string();
        for name in ["/start", "/help", "/latest", "/testnotify", "/status"] {
            assert!(help.contains(name), "missing {}", name);
        }
    }
}
