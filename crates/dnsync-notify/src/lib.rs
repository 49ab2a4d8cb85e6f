// # dnsync-notify
//
// Side effects that follow a successful record update:
//
// - **Notifiers**: Telegram, Slack and Discord channels behind the core
//   `Notifier` trait, fanned out by [`NotificationManager`]. Delivery is
//   best-effort.
// - **Webhook**: [`HttpWebhook`] implements `WebhookExecutor`. A failing
//   webhook aborts the sync.
//
// Message bodies and webhook URLs are rendered from templates, see
// [`template`].

pub mod discord;
pub mod manager;
pub mod slack;
pub mod telegram;
pub mod template;
pub mod webhook;

pub use discord::DiscordNotifier;
pub use manager::NotificationManager;
pub use slack::SlackNotifier;
pub use telegram::TelegramNotifier;
pub use webhook::HttpWebhook;

use dnsync_core::{Error, Result};
use std::time::Duration;

/// Timeout applied to every outgoing request
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Message used by channels without a `message_template`
pub const DEFAULT_MESSAGE_TEMPLATE: &str =
    "{{ .Domain }} is now {{ .CurrentIP }} ({{ .IPType }})";

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(REQUEST_TIMEOUT)
        .build()
        .unwrap_or_default()
}

/// Send a request and turn transport failures or non-2xx answers into a
/// notification error for `channel`
///
/// Channel URLs carry credentials (Telegram bot keys, Discord webhook
/// tokens), so request errors are reported without their URL.
async fn deliver(channel: &str, request: reqwest::RequestBuilder) -> Result<reqwest::Response> {
    let response = request.send().await.map_err(|e| {
        Error::notification(channel, format!("Request failed: {}", e.without_url()))
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(Error::notification(
            channel,
            format!("HTTP {}: {}", status, body.trim()),
        ));
    }

    Ok(response)
}
