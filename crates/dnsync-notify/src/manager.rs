//! Fan-out over every enabled notification channel

use crate::{DiscordNotifier, SlackNotifier, TelegramNotifier};
use async_trait::async_trait;
use dnsync_core::config::{IpType, NotifyConfig};
use dnsync_core::traits::Notifier;
use dnsync_core::Result;
use std::net::IpAddr;

/// Notifier that forwards each notice to all registered channels
///
/// A failing channel is logged and skipped; [`Notifier::send`] on the
/// manager always succeeds.
#[derive(Default)]
pub struct NotificationManager {
    channels: Vec<Box<dyn Notifier>>,
}

impl NotificationManager {
    /// Create a manager without channels
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a manager with one channel per enabled section of `config`
    pub fn from_config(config: &NotifyConfig, ip_type: IpType) -> Self {
        let mut manager = Self::new();

        if let Some(telegram) = config.telegram.as_ref().filter(|c| c.enabled) {
            manager.add_channel(Box::new(TelegramNotifier::new(telegram, ip_type)));
        }
        if let Some(slack) = config.slack.as_ref().filter(|c| c.enabled) {
            manager.add_channel(Box::new(SlackNotifier::new(slack, ip_type)));
        }
        if let Some(discord) = config.discord.as_ref().filter(|c| c.enabled) {
            manager.add_channel(Box::new(DiscordNotifier::new(discord, ip_type)));
        }

        tracing::debug!(channels = ?manager.channel_names(), "Notification channels configured");
        manager
    }

    /// Add a notification channel
    pub fn add_channel(&mut self, channel: Box<dyn Notifier>) {
        self.channels.push(channel);
    }

    pub fn channel_names(&self) -> Vec<&'static str> {
        self.channels.iter().map(|c| c.name()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[async_trait]
impl Notifier for NotificationManager {
    async fn send(&self, hostname: &str, ip: IpAddr) -> Result<()> {
        for channel in &self.channels {
            match channel.send(hostname, ip).await {
                Ok(()) => tracing::debug!(channel = channel.name(), %hostname, "Notification sent"),
                Err(e) => tracing::warn!(
                    channel = channel.name(),
                    %hostname,
                    error = %e,
                    "Failed to send notification"
                ),
            }
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "manager"
    }
}
