//! Local adapter: stdin lines in, stdout lines out.

use async_trait::async_trait;
use streakbot_core::{Gateway, GatewayError, InboundMessage};

/// Channel id used for every console message.
pub const CONSOLE_CHANNEL_ID: u64 = 1;
pub const CONSOLE_USER_ID: u64 = 1;

#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleGateway;

#[async_trait]
impl Gateway for ConsoleGateway {
    fn name(&self) -> &str {
        "console"
    }

    async fn send_channel_message(&self, _channel_id: u64, text: &str) -> Result<(), GatewayError> {
        println!("{text}");
        Ok(())
    }

    async fn send_direct_message(&self, _user_id: u64, text: &str) -> Result<(), GatewayError> {
        println!("(private) {text}");
        Ok(())
    }
}

/// Wrap one line of input as a message from the local user.
pub fn inbound(sender_name: &str, line: &str) -> InboundMessage {
    InboundMessage {
        sender_id: CONSOLE_USER_ID,
        sender_name: sender_name.to_string(),
        channel_id: CONSOLE_CHANNEL_ID,
        content: line.trim_end().to_string(),
        from_bot: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_endings() {
        let msg = inbound("ana", "!start 3\r\n");
        assert_eq!(msg.content, "!start 3");
        assert_eq!(msg.channel_id, CONSOLE_CHANNEL_ID);
        assert!(!msg.from_bot);
    }
}
