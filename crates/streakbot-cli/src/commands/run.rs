use std::sync::Arc;

use serenity::Client;
use streakbot_core::{StreakBot, SystemClock};

use super::load_config;
use crate::discord::{intents, DiscordGateway, Handler, TOKEN_ENV};

pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let token =
        std::env::var(TOKEN_ENV).map_err(|_| format!("{TOKEN_ENV} environment variable is required"))?;

    let (bot, events) = StreakBot::new(&config, Arc::new(SystemClock))?;
    match bot.announce_channel_id() {
        Some(channel) => tracing::info!(channel, "announcing to channel"),
        None => tracing::warn!("no announcement channel configured; set CHANNEL_ID"),
    }
    let bot = Arc::new(bot);

    let mut client = Client::builder(&token, intents())
        .event_handler(Handler::new(Arc::clone(&bot)))
        .await?;

    let announcer = {
        let bot = Arc::clone(&bot);
        let gateway = DiscordGateway::new(Arc::clone(&client.http));
        tokio::spawn(async move { bot.run_announcements(&gateway, events).await })
    };

    let shard_manager = Arc::clone(&client.shard_manager);
    let shutdown_bot = Arc::clone(&bot);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {e}");
            return;
        }
        tracing::info!("shutting down");
        shutdown_bot.shutdown().await;
        shard_manager.shutdown_all().await;
    });

    tracing::info!(zone = %config.timezone, "connecting to Discord");
    client.start().await?;

    bot.shutdown().await;
    announcer.abort();
    Ok(())
}
