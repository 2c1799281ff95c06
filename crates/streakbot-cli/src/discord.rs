//! Discord adapter built on serenity.

use std::sync::Arc;

use async_trait::async_trait;
use serenity::http::Http;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::{ChannelId, UserId};
use serenity::prelude::{Context, EventHandler, GatewayIntents};
use streakbot_core::bot::deliver_logged;
use streakbot_core::{Gateway, GatewayError, InboundMessage, StreakBot};

pub const TOKEN_ENV: &str = "DISCORD_TOKEN";

pub fn intents() -> GatewayIntents {
    GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT
}

/// Sends through Discord's REST API.
#[derive(Clone)]
pub struct DiscordGateway {
    http: Arc<Http>,
}

impl DiscordGateway {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Gateway for DiscordGateway {
    fn name(&self) -> &str {
        "discord"
    }

    async fn send_channel_message(&self, channel_id: u64, text: &str) -> Result<(), GatewayError> {
        ChannelId::new(channel_id)
            .say(&self.http, text)
            .await
            .map(|_| ())
            .map_err(|e| GatewayError::Send {
                target: format!("channel {channel_id}"),
                message: e.to_string(),
            })
    }

    async fn send_direct_message(&self, user_id: u64, text: &str) -> Result<(), GatewayError> {
        let send_failed = |e: serenity::Error| GatewayError::Send {
            target: format!("user {user_id}"),
            message: e.to_string(),
        };
        let dm = UserId::new(user_id)
            .create_dm_channel(&self.http)
            .await
            .map_err(send_failed)?;
        dm.id.say(&self.http, text).await.map_err(send_failed)?;
        Ok(())
    }
}

fn inbound(msg: &Message) -> InboundMessage {
    InboundMessage {
        sender_id: msg.author.id.get(),
        sender_name: msg.author.name.clone(),
        channel_id: msg.channel_id.get(),
        content: msg.content.clone(),
        from_bot: msg.author.bot,
    }
}

pub struct Handler {
    bot: Arc<StreakBot>,
}

impl Handler {
    pub fn new(bot: Arc<StreakBot>) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        tracing::info!("{} is connected", ready.user.name);
        if let Some(greeting) = self.bot.greeting() {
            deliver_logged(&DiscordGateway::new(ctx.http.clone()), &greeting).await;
        }
    }

    async fn message(&self, ctx: Context, msg: Message) {
        let gateway = DiscordGateway::new(ctx.http.clone());
        self.bot.dispatch(&gateway, &inbound(&msg)).await;
    }
}
