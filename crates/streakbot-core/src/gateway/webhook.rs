//! Discord webhook gateway -- post announcements without a bot connection.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;
use url::Url;

use super::Gateway;
use crate::error::GatewayError;

pub const WEBHOOK_PREFIX: &str = "https://discord.com/api/webhooks/";

/// Send-only gateway bound to one Discord webhook. The channel id passed to
/// [`Gateway::send_channel_message`] is ignored: a webhook always posts to
/// the channel it was created for.
#[derive(Debug, Clone)]
pub struct WebhookGateway {
    client: Client,
    url: Url,
}

impl WebhookGateway {
    /// Validate and wrap a Discord webhook URL.
    pub fn new(webhook_url: &str) -> Result<Self, GatewayError> {
        if !webhook_url.starts_with(WEBHOOK_PREFIX) {
            return Err(GatewayError::InvalidWebhook(format!(
                "must start with {WEBHOOK_PREFIX}"
            )));
        }
        Self::unchecked(webhook_url)
    }

    fn unchecked(webhook_url: &str) -> Result<Self, GatewayError> {
        let url =
            Url::parse(webhook_url).map_err(|e| GatewayError::InvalidWebhook(e.to_string()))?;
        Ok(Self {
            client: Client::new(),
            url,
        })
    }

    /// Post a message to the webhook.
    async fn post_message(&self, content: &str) -> Result<(), GatewayError> {
        let body = json!({ "content": content });
        let resp = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await?;

        if resp.status().is_success() {
            Ok(())
        } else {
            let status = resp.status();
            let text = resp.text().await.unwrap_or_default();
            Err(GatewayError::Send {
                target: "webhook".into(),
                message: format!("HTTP {status}: {text}"),
            })
        }
    }
}

#[async_trait]
impl Gateway for WebhookGateway {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn send_channel_message(&self, _channel_id: u64, text: &str) -> Result<(), GatewayError> {
        self.post_message(text).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[test]
    fn rejects_non_discord_urls() {
        assert!(matches!(
            WebhookGateway::new("https://example.com/hook"),
            Err(GatewayError::InvalidWebhook(_))
        ));
        assert!(WebhookGateway::new("https://discord.com/api/webhooks/1/abc").is_ok());
    }

    #[tokio::test]
    async fn posts_content_as_json() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/webhooks/1/abc")
            .match_body(Matcher::Json(json!({ "content": "Day 3 completed" })))
            .with_status(204)
            .create_async()
            .await;

        let gateway =
            WebhookGateway::unchecked(&format!("{}/api/webhooks/1/abc", server.url())).unwrap();
        gateway.send_channel_message(0, "Day 3 completed").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn reports_http_errors() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/hook")
            .with_status(404)
            .with_body("Unknown Webhook")
            .create_async()
            .await;

        let gateway = WebhookGateway::unchecked(&format!("{}/hook", server.url())).unwrap();
        let err = gateway.send_channel_message(0, "hi").await.unwrap_err();
        match err {
            GatewayError::Send { message, .. } => {
                assert!(message.contains("404"));
                assert!(message.contains("Unknown Webhook"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn direct_messages_are_unsupported() {
        let gateway = WebhookGateway::new("https://discord.com/api/webhooks/1/abc").unwrap();
        assert!(matches!(
            gateway.send_direct_message(7, "hi").await,
            Err(GatewayError::Unsupported(_))
        ));
    }
}
