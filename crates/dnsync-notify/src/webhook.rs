//! HTTP webhook run after each successful record update
//!
//! The URL is rendered as a template. With an empty `request_body` the
//! rendered URL is fetched with GET; otherwise the rendered body is POSTed
//! as JSON. Any non-2xx answer is an [`Error::Webhook`].
//!
//! Webhook URLs often embed a token, so errors and logs never include them.

use crate::http_client;
use crate::template::{TemplateContext, render};
use async_trait::async_trait;
use dnsync_core::config::{IpType, WebhookConfig};
use dnsync_core::traits::WebhookExecutor;
use dnsync_core::{Error, Result};
use std::net::IpAddr;

/// [`WebhookExecutor`] over HTTP
#[derive(Debug)]
pub struct HttpWebhook {
    url: String,
    request_body: String,
    ip_type: IpType,
    client: reqwest::Client,
}

impl HttpWebhook {
    pub fn new(config: &WebhookConfig, ip_type: IpType) -> Self {
        Self {
            url: config.url.clone(),
            request_body: config.request_body.clone(),
            ip_type,
            client: http_client(),
        }
    }
}

#[async_trait]
impl WebhookExecutor for HttpWebhook {
    async fn execute(&self, hostname: &str, ip: IpAddr) -> Result<()> {
        let ctx = TemplateContext::new(hostname, ip, self.ip_type);
        let url = render(&self.url, &ctx);

        let request = if self.request_body.is_empty() {
            self.client.get(&url)
        } else {
            self.client
                .post(&url)
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(render(&self.request_body, &ctx))
        };

        let response = request
            .send()
            .await
            .map_err(|e| Error::webhook(format!("Request failed: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::webhook(format!("HTTP {}: {}", status, body.trim())));
        }

        tracing::debug!(%hostname, %status, "Webhook accepted");
        Ok(())
    }
}
