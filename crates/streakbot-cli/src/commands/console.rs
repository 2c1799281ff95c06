use std::sync::Arc;

use streakbot_core::{Gateway, StreakBot, SystemClock, WebhookGateway};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::load_config;
use crate::console::{inbound, ConsoleGateway, CONSOLE_CHANNEL_ID};

pub async fn run(webhook: Option<String>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config()?;
    if config.announce_channel_id == 0 {
        config.announce_channel_id = CONSOLE_CHANNEL_ID;
    }

    let announcer: Box<dyn Gateway> = match webhook {
        Some(url) => Box::new(WebhookGateway::new(&url)?),
        None => Box::new(ConsoleGateway),
    };
    let sender_name = std::env::var("USER").unwrap_or_else(|_| "console".into());

    let (bot, events) = StreakBot::new(&config, Arc::new(SystemClock))?;
    let bot = Arc::new(bot);

    let announcements = {
        let bot = Arc::clone(&bot);
        tokio::spawn(async move { bot.run_announcements(announcer.as_ref(), events).await })
    };

    if let Some(greeting) = bot.greeting() {
        ConsoleGateway.deliver(&greeting).await?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line? {
                Some(line) => bot.dispatch(&ConsoleGateway, &inbound(&sender_name, &line)).await,
                None => break,
            },
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    tracing::debug!("console input closed");
    bot.shutdown().await;
    announcements.abort();
    Ok(())
}
