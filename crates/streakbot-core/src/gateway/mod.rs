//! Chat platform boundary.
//!
//! The core never talks to a wire protocol directly. Adapters deliver
//! [`InboundMessage`]s to the bot and implement [`Gateway`] for sending.

mod webhook;

pub use webhook::{WebhookGateway, WEBHOOK_PREFIX};

use async_trait::async_trait;

use crate::error::GatewayError;

/// One message received from the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    pub sender_id: u64,
    /// Display name used in replies.
    pub sender_name: String,
    pub channel_id: u64,
    pub content: String,
    /// Set for messages written by bots, including this one.
    pub from_bot: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destination {
    Channel(u64),
    Direct(u64),
}

/// A message ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub destination: Destination,
    pub text: String,
}

/// Every chat platform adapter implements this trait.
#[async_trait]
pub trait Gateway: Send + Sync {
    /// Short identifier used in logs (e.g. "discord", "console").
    fn name(&self) -> &str;

    async fn send_channel_message(&self, channel_id: u64, text: &str) -> Result<(), GatewayError>;

    async fn send_direct_message(&self, _user_id: u64, _text: &str) -> Result<(), GatewayError> {
        Err(GatewayError::Unsupported("direct messages"))
    }

    async fn deliver(&self, outbound: &Outbound) -> Result<(), GatewayError> {
        match outbound.destination {
            Destination::Channel(id) => self.send_channel_message(id, &outbound.text).await,
            Destination::Direct(id) => self.send_direct_message(id, &outbound.text).await,
        }
    }
}
