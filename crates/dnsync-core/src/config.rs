//! Configuration types for dnsync
//!
//! Settings are loaded once from a JSON file at startup and shared read-only
//! by every worker for the lifetime of the process.
//!
//! ```json
//! {
//!   "domains": [{ "domain_name": "example.com", "sub_domains": ["www", "@"] }],
//!   "interval": 300,
//!   "ip_type": "IPv4",
//!   "resolver": "8.8.8.8",
//!   "provider": { "type": "cloudflare", "api_token": "..." },
//!   "webhook": { "enabled": false, "url": "" }
//! }
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

/// Subdomain entry that stands for the bare domain name
pub const ROOT_MARKER: &str = "@";

/// Port used when the resolver endpoint does not name one
pub const DEFAULT_RESOLVER_PORT: u16 = 53;

/// Main dnsync settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Domains to keep synchronized
    pub domains: Vec<Domain>,

    /// Seconds between two poll cycles of a worker
    #[serde(default = "default_interval")]
    pub interval: u64,

    /// Run one cycle per domain and exit
    #[serde(default)]
    pub run_once: bool,

    /// Address family to discover and publish
    #[serde(default)]
    pub ip_type: IpType,

    /// Nameserver used to read published records (`host` or `host:port`).
    /// Empty means the system resolver.
    #[serde(default)]
    pub resolver: String,

    /// Where the current address is discovered
    #[serde(default)]
    pub ip_source: IpSourceConfig,

    /// DNS provider configuration
    pub provider: ProviderConfig,

    /// Notification channels
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Webhook triggered after each successful record update
    #[serde(default)]
    pub webhook: WebhookConfig,

    /// Enable debug logging
    #[serde(default)]
    pub debug_info: bool,

    /// Worker crashes tolerated across all domains before the process gives up
    #[serde(default = "default_restart_budget")]
    pub restart_budget: usize,
}

impl Settings {
    /// Load settings from a JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::from_json(&raw)
    }

    /// Parse settings from a JSON document
    pub fn from_json(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).map_err(|e| Error::config(format!("Invalid config file: {}", e)))
    }

    /// Time a worker sleeps between two cycles
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.domains.is_empty() {
            return Err(Error::config("No domains configured"));
        }

        for domain in &self.domains {
            domain.validate()?;
        }

        if self.interval == 0 {
            return Err(Error::config("interval must be greater than 0 seconds"));
        }

        if self.restart_budget == 0 {
            return Err(Error::config("restart_budget must be greater than 0"));
        }

        parse_resolver(&self.resolver)?;

        self.ip_source.validate()?;
        self.provider.validate()?;
        self.notify.validate()?;
        self.webhook.validate()?;

        Ok(())
    }
}

fn default_interval() -> u64 {
    300
}

fn default_restart_budget() -> usize {
    5
}

/// A DNS zone and the subdomains kept in sync with the current address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Zone name (e.g., "example.com")
    pub domain_name: String,

    /// Subdomain entries, in update order. [`ROOT_MARKER`] means the zone itself.
    pub sub_domains: Vec<String>,
}

impl Domain {
    /// Create a new domain
    pub fn new<S: Into<String>>(
        domain_name: impl Into<String>,
        sub_domains: impl IntoIterator<Item = S>,
    ) -> Self {
        Self {
            domain_name: domain_name.into(),
            sub_domains: sub_domains.into_iter().map(Into::into).collect(),
        }
    }

    /// Fully qualified hostname of a subdomain entry
    ///
    /// ```
    /// use dnsync_core::Domain;
    ///
    /// let domain = Domain::new("example.com", ["www", "@"]);
    /// assert_eq!(domain.hostname("www"), "www.example.com");
    /// assert_eq!(domain.hostname("@"), "example.com");
    /// ```
    pub fn hostname(&self, sub_domain: &str) -> String {
        if sub_domain == ROOT_MARKER {
            self.domain_name.clone()
        } else {
            format!("{}.{}", sub_domain, self.domain_name)
        }
    }

    fn validate(&self) -> Result<()> {
        validate_domain_name(&self.domain_name)?;

        if self.sub_domains.is_empty() {
            return Err(Error::config(format!(
                "Domain {} has no sub_domains (use \"{}\" for the bare domain)",
                self.domain_name, ROOT_MARKER
            )));
        }

        for sub in &self.sub_domains {
            if sub == ROOT_MARKER {
                continue;
            }
            validate_domain_name(sub).map_err(|e| {
                Error::config(format!("Invalid sub_domain in {}: {}", self.domain_name, e))
            })?;
        }

        Ok(())
    }
}

/// Validate that a string is a plausible domain name (RFC 1035 labels).
/// A leading `*` label is accepted for wildcard records.
pub fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(Error::config("Domain name cannot be empty"));
    }

    if domain.len() > 253 {
        return Err(Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    for (index, label) in domain.split('.').enumerate() {
        if label.is_empty() {
            return Err(Error::config(format!("Domain name has empty label: '{}'", domain)));
        }

        if index == 0 && label == "*" {
            continue;
        }

        if label.len() > 63 {
            return Err(Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return Err(Error::config(format!(
                "Domain label contains invalid characters. Label: '{}'",
                label
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{}'",
                label
            )));
        }
    }

    Ok(())
}

/// Parse a resolver endpoint (`"1.1.1.1"`, `"1.1.1.1:5353"`, `"[2606:4700::1111]:53"`).
///
/// Returns `Ok(None)` for an empty string, which selects the system resolver.
pub fn parse_resolver(resolver: &str) -> Result<Option<SocketAddr>> {
    let resolver = resolver.trim();
    if resolver.is_empty() {
        return Ok(None);
    }

    if let Ok(addr) = resolver.parse::<SocketAddr>() {
        return Ok(Some(addr));
    }

    resolver
        .parse::<IpAddr>()
        .map(|ip| Some(SocketAddr::new(ip, DEFAULT_RESOLVER_PORT)))
        .map_err(|_| {
            Error::config(format!(
                "resolver must be an IP address with optional port. Got: {}",
                resolver
            ))
        })
}

/// Address family to track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IpType {
    /// IPv4 (A records)
    #[default]
    #[serde(rename = "IPv4", alias = "ipv4")]
    V4,
    /// IPv6 (AAAA records)
    #[serde(rename = "IPv6", alias = "ipv6")]
    V6,
}

impl IpType {
    /// Whether an address belongs to this family
    pub fn matches(&self, ip: &IpAddr) -> bool {
        match self {
            IpType::V4 => ip.is_ipv4(),
            IpType::V6 => ip.is_ipv6(),
        }
    }

    /// DNS record type carrying this family
    pub fn record_type(&self) -> &'static str {
        match self {
            IpType::V4 => "A",
            IpType::V6 => "AAAA",
        }
    }
}

impl std::fmt::Display for IpType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IpType::V4 => f.write_str("IPv4"),
            IpType::V6 => f.write_str("IPv6"),
        }
    }
}

/// IP source configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum IpSourceConfig {
    /// Ask external IP-echo services over HTTP
    Http {
        /// Services tried in order. Empty selects built-in services for the address family.
        #[serde(default)]
        urls: Vec<String>,
    },

    /// Custom IP source
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl IpSourceConfig {
    /// Validate the IP source configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            IpSourceConfig::Http { urls } => {
                for url in urls {
                    if !url.starts_with("http://") && !url.starts_with("https://") {
                        return Err(Error::config(format!(
                            "IP source URL must use HTTP or HTTPS scheme. Got: {}",
                            url
                        )));
                    }
                }
                Ok(())
            }
            IpSourceConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(Error::config("Custom IP source factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(Error::config("Custom IP source config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the IP source type name
    pub fn type_name(&self) -> &str {
        match self {
            IpSourceConfig::Http { .. } => "http",
            IpSourceConfig::Custom { factory, .. } => factory,
        }
    }
}

impl Default for IpSourceConfig {
    fn default() -> Self {
        IpSourceConfig::Http { urls: Vec::new() }
    }
}

/// DNS provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// Cloudflare provider
    Cloudflare {
        /// Cloudflare API token
        api_token: String,
        /// Zone ID (optional, looked up from the domain name otherwise)
        #[serde(default)]
        zone_id: Option<String>,
        /// Proxy traffic through Cloudflare
        #[serde(default)]
        proxied: bool,
        /// Record TTL in seconds (1 = automatic)
        #[serde(default = "default_ttl")]
        ttl: u32,
        /// Perform lookups but skip the update request
        #[serde(default)]
        dry_run: bool,
    },

    /// Custom provider
    Custom {
        /// Factory name to use
        factory: String,
        /// Custom configuration data
        config: serde_json::Value,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    pub fn validate(&self) -> Result<()> {
        match self {
            ProviderConfig::Cloudflare { api_token, ttl, .. } => {
                if api_token.is_empty() {
                    return Err(Error::config("Cloudflare API token cannot be empty"));
                }
                if *ttl != 1 && !(60..=86400).contains(ttl) {
                    return Err(Error::config(format!(
                        "Cloudflare ttl must be 1 (auto) or between 60 and 86400. Got: {}",
                        ttl
                    )));
                }
                Ok(())
            }
            ProviderConfig::Custom { factory, config } => {
                if factory.is_empty() {
                    return Err(Error::config("Custom provider factory cannot be empty"));
                }
                if config.is_null() {
                    return Err(Error::config("Custom provider config cannot be null"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Cloudflare { .. } => "cloudflare",
            ProviderConfig::Custom { factory, .. } => factory,
        }
    }
}

fn default_ttl() -> u32 {
    1
}

/// Notification channels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Telegram bot messages
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    /// Slack bot messages
    #[serde(default)]
    pub slack: Option<SlackConfig>,
    /// Discord webhook messages
    #[serde(default)]
    pub discord: Option<DiscordConfig>,
}

impl NotifyConfig {
    /// Validate every enabled channel
    pub fn validate(&self) -> Result<()> {
        if let Some(telegram) = self.telegram.as_ref().filter(|c| c.enabled) {
            if telegram.bot_api_key.is_empty() || telegram.chat_id.is_empty() {
                return Err(Error::config("Telegram notify requires bot_api_key and chat_id"));
            }
        }

        if let Some(slack) = self.slack.as_ref().filter(|c| c.enabled) {
            if slack.bot_api_token.is_empty() || slack.channel.is_empty() {
                return Err(Error::config("Slack notify requires bot_api_token and channel"));
            }
        }

        if let Some(discord) = self.discord.as_ref().filter(|c| c.enabled) {
            if !discord.webhook_url.starts_with("https://") {
                return Err(Error::config("Discord notify requires an https webhook_url"));
            }
        }

        Ok(())
    }
}

/// Telegram channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub enabled: bool,
    pub bot_api_key: String,
    pub chat_id: String,
    #[serde(default)]
    pub message_template: Option<String>,
}

/// Slack channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlackConfig {
    #[serde(default)]
    pub enabled: bool,
    pub bot_api_token: String,
    pub channel: String,
    #[serde(default)]
    pub message_template: Option<String>,
}

/// Discord channel settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    #[serde(default)]
    pub enabled: bool,
    pub webhook_url: String,
    #[serde(default)]
    pub message_template: Option<String>,
}

/// Webhook settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// Execute the webhook after each successful update
    #[serde(default)]
    pub enabled: bool,
    /// Target URL; may contain template placeholders
    #[serde(default)]
    pub url: String,
    /// POST body template. Empty sends a GET request instead.
    #[serde(default)]
    pub request_body: String,
}

impl WebhookConfig {
    /// Validate the webhook configuration
    pub fn validate(&self) -> Result<()> {
        if !self.enabled {
            return Ok(());
        }

        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err(Error::config(format!(
                "Webhook url must use HTTP or HTTPS scheme. Got: {}",
                self.url
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "domains": [{ "domain_name": "example.com", "sub_domains": ["www", "@"] }],
        "interval": 300,
        "ip_type": "IPv4",
        "resolver": "8.8.8.8",
        "provider": { "type": "cloudflare", "api_token": "abcdefghijklmnopqrstuvwxyz" },
        "webhook": { "enabled": true, "url": "https://hooks.example.net/{{.Domain}}" }
    }"#;

    #[test]
    fn test_parse_sample_settings() {
        let settings = Settings::from_json(SAMPLE).unwrap();

        assert_eq!(settings.domains.len(), 1);
        assert_eq!(settings.domains[0].sub_domains, vec!["www", "@"]);
        assert_eq!(settings.poll_interval(), Duration::from_secs(300));
        assert_eq!(settings.ip_type, IpType::V4);
        assert!(!settings.run_once);
        assert_eq!(settings.restart_budget, 5);
        assert!(settings.webhook.enabled);
        assert_eq!(settings.provider.type_name(), "cloudflare");
        assert_eq!(settings.ip_source.type_name(), "http");
        settings.validate().unwrap();
    }

    #[test]
    fn test_root_marker_maps_to_bare_domain() {
        let domain = Domain::new("example.com", ["www", ROOT_MARKER, "a.b"]);

        assert_eq!(domain.hostname(ROOT_MARKER), "example.com");
        assert_eq!(domain.hostname("www"), "www.example.com");
        assert_eq!(domain.hostname("a.b"), "a.b.example.com");
    }

    #[test]
    fn test_validation_rejects_empty_domains() {
        let mut settings = Settings::from_json(SAMPLE).unwrap();
        settings.domains.clear();
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_validation_rejects_zero_interval() {
        let mut settings = Settings::from_json(SAMPLE).unwrap();
        settings.interval = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_bad_subdomain() {
        let mut settings = Settings::from_json(SAMPLE).unwrap();
        settings.domains[0].sub_domains.push("bad label".to_string());
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_enabled_webhook_without_url() {
        let mut settings = Settings::from_json(SAMPLE).unwrap();
        settings.webhook.url.clear();
        assert!(settings.validate().is_err());

        settings.webhook.enabled = false;
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_ip_type_serialization() {
        let v6: IpType = serde_json::from_str("\"IPv6\"").unwrap();
        assert_eq!(v6, IpType::V6);
        assert_eq!(serde_json::to_string(&IpType::V4).unwrap(), "\"IPv4\"");
        assert_eq!(v6.record_type(), "AAAA");
        assert!(v6.matches(&"::1".parse().unwrap()));
        assert!(!v6.matches(&"127.0.0.1".parse().unwrap()));
    }

    #[test]
    fn test_parse_resolver() {
        assert_eq!(parse_resolver("").unwrap(), None);
        assert_eq!(
            parse_resolver("1.1.1.1").unwrap(),
            Some("1.1.1.1:53".parse().unwrap())
        );
        assert_eq!(
            parse_resolver("9.9.9.9:5353").unwrap(),
            Some("9.9.9.9:5353".parse().unwrap())
        );
        assert_eq!(
            parse_resolver("2606:4700::1111").unwrap(),
            Some("[2606:4700::1111]:53".parse().unwrap())
        );
        assert!(parse_resolver("dns.google").is_err());
    }

    #[test]
    fn test_wildcard_subdomain_is_valid() {
        assert!(validate_domain_name("*.dev").is_ok());
        assert!(validate_domain_name("dev.*").is_err());
        assert!(validate_domain_name("-bad.com").is_err());
    }

    #[test]
    fn test_from_file_missing_is_config_error() {
        let err = Settings::from_file("/nonexistent/dnsync.json").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_from_file_reads_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, SAMPLE).unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings.domains[0].domain_name, "example.com");
    }
}
