//! Discord webhook channel

use crate::template::{TemplateContext, render};
use crate::{DEFAULT_MESSAGE_TEMPLATE, deliver, http_client};
use async_trait::async_trait;
use dnsync_core::config::{DiscordConfig, IpType};
use dnsync_core::traits::Notifier;
use dnsync_core::Result;
use serde::Serialize;
use std::net::IpAddr;

#[derive(Serialize)]
struct WebhookMessage {
    content: String,
}

/// Posts change notices to a Discord webhook
pub struct DiscordNotifier {
    webhook_url: String,
    template: String,
    ip_type: IpType,
    client: reqwest::Client,
}

impl DiscordNotifier {
    pub fn new(config: &DiscordConfig, ip_type: IpType) -> Self {
        Self {
            webhook_url: config.webhook_url.clone(),
            template: config
                .message_template
                .clone()
                .unwrap_or_else(|| DEFAULT_MESSAGE_TEMPLATE.to_string()),
            ip_type,
            client: http_client(),
        }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn send(&self, hostname: &str, ip: IpAddr) -> Result<()> {
        let content = render(&self.template, &TemplateContext::new(hostname, ip, self.ip_type));
        let request = self
            .client
            .post(&self.webhook_url)
            .json(&WebhookMessage { content });

        deliver(self.name(), request).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }
}
