//! Slack bot channel (`chat.postMessage`)

use crate::template::{TemplateContext, render};
use crate::{DEFAULT_MESSAGE_TEMPLATE, deliver, http_client};
use async_trait::async_trait;
use dnsync_core::config::{IpType, SlackConfig};
use dnsync_core::traits::Notifier;
use dnsync_core::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::IpAddr;

const SLACK_API_BASE: &str = "https://slack.com/api";

#[derive(Serialize)]
struct PostMessage<'a> {
    channel: &'a str,
    text: String,
}

/// Slack answers HTTP 200 even for rejected messages
#[derive(Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Sends change notices to a Slack channel
pub struct SlackNotifier {
    bot_api_token: String,
    channel: String,
    template: String,
    ip_type: IpType,
    api_base: String,
    client: reqwest::Client,
}

impl std::fmt::Debug for SlackNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackNotifier")
            .field("bot_api_token", &"<REDACTED>")
            .field("channel", &self.channel)
            .finish()
    }
}

impl SlackNotifier {
    pub fn new(config: &SlackConfig, ip_type: IpType) -> Self {
        Self {
            bot_api_token: config.bot_api_token.clone(),
            channel: config.channel.clone(),
            template: config
                .message_template
                .clone()
                .unwrap_or_else(|| DEFAULT_MESSAGE_TEMPLATE.to_string()),
            ip_type,
            api_base: SLACK_API_BASE.to_string(),
            client: http_client(),
        }
    }

    /// Point the notifier at another Web API endpoint
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, hostname: &str, ip: IpAddr) -> Result<()> {
        let text = render(&self.template, &TemplateContext::new(hostname, ip, self.ip_type));

        let request = self
            .client
            .post(format!("{}/chat.postMessage", self.api_base))
            .bearer_auth(&self.bot_api_token)
            .json(&PostMessage {
                channel: &self.channel,
                text,
            });

        let response: PostMessageResponse = deliver(self.name(), request)
            .await?
            .json()
            .await
            .map_err(|e| {
                Error::notification(self.name(), format!("Invalid response: {}", e.without_url()))
            })?;

        if !response.ok {
            return Err(Error::notification(
                self.name(),
                response.error.unwrap_or_else(|| "unknown error".to_string()),
            ));
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }
}
