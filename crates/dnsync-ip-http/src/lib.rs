// # HTTP IP Source
//
// This crate discovers the caller's public address by asking IP-echo
// services over HTTP.
//
// ## Architecture
//
// Services are tried in order. The first one that answers with a plain-text
// address of the configured family wins; the others are only contacted when
// an earlier one fails. Nothing is cached between calls.

use dnsync_core::config::{IpSourceConfig, IpType};
use dnsync_core::traits::{IpSource, IpSourceFactory};
use dnsync_core::{Error, ProviderRegistry, Result};

use std::net::IpAddr;
use std::time::Duration;

/// Per-request timeout
const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Built-in IPv4 echo services
pub const DEFAULT_IPV4_SERVICES: &[&str] = &[
    "https://api.ipify.org",
    "https://ifconfig.me/ip",
    "https://icanhazip.com",
];

/// Built-in IPv6 echo services
pub const DEFAULT_IPV6_SERVICES: &[&str] =
    &["https://api6.ipify.org", "https://ipv6.icanhazip.com"];

/// HTTP-based IP source
pub struct HttpIpSource {
    /// Services to ask, in order
    urls: Vec<String>,

    /// Address family to report
    ip_type: IpType,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `urls`: Services to ask, in order. Empty selects the built-in list for `ip_type`.
    /// - `ip_type`: Address family to report
    pub fn new(urls: Vec<String>, ip_type: IpType) -> Self {
        let urls = if urls.is_empty() {
            default_services(ip_type)
                .iter()
                .map(|s| s.to_string())
                .collect()
        } else {
            urls
        };

        Self {
            urls,
            ip_type,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
                .build()
                .unwrap_or_default(),
        }
    }

    /// Services this source asks, in order
    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    /// Fetch the address from one service
    async fn fetch_ip(&self, url: &str) -> Result<IpAddr> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::http(format!("Request to {} failed: {}", url, e)))?;

        if !response.status().is_success() {
            return Err(Error::http(format!(
                "{} answered HTTP {}",
                url,
                response.status()
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| Error::http(format!("Failed to read response from {}: {}", url, e)))?;

        parse_answer(&body, self.ip_type)
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<IpAddr> {
        let mut last_error = None;

        for url in &self.urls {
            match self.fetch_ip(url).await {
                Ok(ip) => {
                    tracing::debug!(%url, %ip, "Echo service answered");
                    return Ok(ip);
                }
                Err(e) => {
                    tracing::warn!(%url, error = %e, "Echo service failed, trying next");
                    last_error = Some(e);
                }
            }
        }

        Err(Error::discovery(match last_error {
            Some(e) => format!("All {} echo services failed, last error: {}", self.urls.len(), e),
            None => "No echo services configured".to_string(),
        }))
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

fn default_services(ip_type: IpType) -> &'static [&'static str] {
    match ip_type {
        IpType::V4 => DEFAULT_IPV4_SERVICES,
        IpType::V6 => DEFAULT_IPV6_SERVICES,
    }
}

/// Parse an echo service answer, rejecting the wrong family
fn parse_answer(body: &str, ip_type: IpType) -> Result<IpAddr> {
    let text = body.trim();

    let ip: IpAddr = text
        .parse()
        .map_err(|_| Error::discovery(format!("Invalid IP address: {:?}", text)))?;

    if !ip_type.matches(&ip) {
        return Err(Error::discovery(format!("Expected {}, got: {}", ip_type, ip)));
    }

    Ok(ip)
}

/// Factory for creating HTTP IP sources
pub struct HttpFactory;

impl IpSourceFactory for HttpFactory {
    fn create(&self, config: &IpSourceConfig, ip_type: IpType) -> Result<Box<dyn IpSource>> {
        match config {
            IpSourceConfig::Http { urls } => Ok(Box::new(HttpIpSource::new(urls.clone(), ip_type))),
            _ => Err(Error::config("Invalid config for HTTP IP source")),
        }
    }
}

/// Register the HTTP IP source with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_ip_source("http", Box::new(HttpFactory));
}
