//! Telegram bot channel (`sendMessage`)

use crate::template::{TemplateContext, render};
use crate::{DEFAULT_MESSAGE_TEMPLATE, deliver, http_client};
use async_trait::async_trait;
use dnsync_core::config::{IpType, TelegramConfig};
use dnsync_core::traits::Notifier;
use dnsync_core::Result;
use serde::Serialize;
use std::net::IpAddr;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: &'a str,
    text: String,
}

/// Sends change notices through a Telegram bot
pub struct TelegramNotifier {
    bot_api_key: String,
    chat_id: String,
    template: String,
    ip_type: IpType,
    api_base: String,
    client: reqwest::Client,
}

// The bot key is part of the request path; keep it out of Debug output.
impl std::fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("bot_api_key", &"<REDACTED>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl TelegramNotifier {
    pub fn new(config: &TelegramConfig, ip_type: IpType) -> Self {
        Self {
            bot_api_key: config.bot_api_key.clone(),
            chat_id: config.chat_id.clone(),
            template: config
                .message_template
                .clone()
                .unwrap_or_else(|| DEFAULT_MESSAGE_TEMPLATE.to_string()),
            ip_type,
            api_base: TELEGRAM_API_BASE.to_string(),
            client: http_client(),
        }
    }

    /// Point the notifier at another Bot API endpoint
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn send(&self, hostname: &str, ip: IpAddr) -> Result<()> {
        let text = render(&self.template, &TemplateContext::new(hostname, ip, self.ip_type));
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_api_key);

        let request = self.client.post(url).json(&SendMessage {
            chat_id: &self.chat_id,
            text,
        });

        deliver(self.name(), request).await?;
        Ok(())
    }

    fn name(&self) -> &'static str {
        "telegram"
    }
}
