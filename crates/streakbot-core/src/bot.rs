//! Bot orchestration.
//!
//! Ties the pieces together for a gateway adapter:
//! inbound message -> parse -> [`CommandHandler`] -> [`Outbound`] reply, and
//! scheduler [`Event`]s -> announcement -> [`Outbound`].
//!
//! Nothing here holds the streak lock while sending.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::clock::{Clock, ClockSource};
use crate::commands::{parse, CommandHandler, Replies, ReplyKind};
use crate::error::CoreError;
use crate::events::Event;
use crate::gateway::{Destination, Gateway, InboundMessage, Outbound};
use crate::scheduler::DailyScheduler;
use crate::storage::Config;
use crate::streak::StreakTracker;

pub struct StreakBot {
    tracker: Arc<StreakTracker>,
    scheduler: DailyScheduler,
    handler: CommandHandler,
    prefix: String,
    announce_channel_id: Option<u64>,
    greet_on_ready: bool,
    errors_via_dm: bool,
}

impl StreakBot {
    /// Build the bot and return the receiver for scheduler events.
    pub fn new(config: &Config, clock: Arc<dyn Clock>) -> Result<(Self, mpsc::Receiver<Event>), CoreError> {
        config.validate()?;
        let source = ClockSource::new(clock, config.zone()?);
        let tracker = Arc::new(StreakTracker::new(source, config.policy));
        let (scheduler, events) = DailyScheduler::new(Arc::clone(&tracker), &config.scheduler);
        let handler = CommandHandler::new(
            Arc::clone(&tracker),
            scheduler.clone(),
            Replies::new(config.command_prefix.clone()),
        );
        let bot = Self {
            tracker,
            scheduler,
            handler,
            prefix: config.command_prefix.clone(),
            announce_channel_id: (config.announce_channel_id != 0)
                .then_some(config.announce_channel_id),
            greet_on_ready: config.greet_on_ready,
            errors_via_dm: config.replies.errors_via_dm,
        };
        Ok((bot, events))
    }

    pub fn tracker(&self) -> &Arc<StreakTracker> {
        &self.tracker
    }

    pub fn scheduler(&self) -> &DailyScheduler {
        &self.scheduler
    }

    pub fn announce_channel_id(&self) -> Option<u64> {
        self.announce_channel_id
    }

    /// Reply for one inbound message, or `None` if it is not for us.
    pub fn handle_message(&self, msg: &InboundMessage) -> Option<Outbound> {
        if msg.from_bot {
            return None;
        }
        let Some(parsed) = parse(&msg.content, &self.prefix) else {
            tracing::trace!(channel = msg.channel_id, "ignoring non-command message");
            return None;
        };
        let reply = self.handler.handle(parsed, &msg.sender_name);
        tracing::debug!(
            sender = msg.sender_id,
            channel = msg.channel_id,
            kind = ?reply.kind,
            "handled command"
        );
        let destination = if reply.kind == ReplyKind::Failure && self.errors_via_dm {
            Destination::Direct(msg.sender_id)
        } else {
            Destination::Channel(msg.channel_id)
        };
        Some(Outbound {
            destination,
            text: reply.text,
        })
    }

    /// Command listing for the announcement channel, sent on connect.
    pub fn greeting(&self) -> Option<Outbound> {
        if !self.greet_on_ready {
            return None;
        }
        let channel = self.announce_channel_id?;
        Some(Outbound {
            destination: Destination::Channel(channel),
            text: self.handler.replies().greeting(),
        })
    }

    /// Announcement for a scheduler event, if it warrants one.
    pub fn announcement(&self, event: &Event) -> Option<Outbound> {
        let Event::StreakAdvanced { count, .. } = event else {
            return None;
        };
        match self.announce_channel_id {
            Some(channel) => Some(Outbound {
                destination: Destination::Channel(channel),
                text: self.handler.replies().advanced(*count),
            }),
            None => {
                tracing::warn!(count, "no announcement channel configured");
                None
            }
        }
    }

    /// Handle a message and send the reply through `gateway`.
    pub async fn dispatch(&self, gateway: &dyn Gateway, msg: &InboundMessage) {
        if let Some(outbound) = self.handle_message(msg) {
            deliver_logged(gateway, &outbound).await;
        }
    }

    /// Forward scheduler events as announcements until the channel closes.
    pub async fn run_announcements(&self, gateway: &dyn Gateway, mut events: mpsc::Receiver<Event>) {
        while let Some(event) = events.recv().await {
            tracing::debug!(at = %event.at(), ?event, "scheduler event");
            if let Some(outbound) = self.announcement(&event) {
                deliver_logged(gateway, &outbound).await;
            }
        }
    }

    pub async fn shutdown(&self) {
        self.scheduler.shutdown().await;
    }
}

/// Send one message. Failures are logged and not retried.
pub async fn deliver_logged(gateway: &dyn Gateway, outbound: &Outbound) {
    if let Err(err) = gateway.deliver(outbound).await {
        tracing::warn!(
            gateway = gateway.name(),
            destination = ?outbound.destination,
            "failed to deliver message: {err}"
        );
    }
}
