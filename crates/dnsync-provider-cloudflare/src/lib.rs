// # Cloudflare DNS Provider
//
// This crate provides a Cloudflare DNS provider implementation for dnsync.
//
// ## Behavior
//
// One `update_ip` call performs up to three API requests:
//
// 1. Zone lookup by domain name (skipped when `zone_id` is configured)
// 2. Record lookup by hostname and record type (A or AAAA)
// 3. PUT of the new record content (skipped in dry-run mode)
//
// The provider is single-shot: no retry, no backoff, no caching. A failed
// request is returned to the updater, which aborts the domain's sync and
// tries again on the next cycle.
//
// ## Security Requirements
//
// - API token NEVER appears in logs or `Debug` output
// - An empty token is rejected by the factory as a configuration error
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List Zones: GET `/zones?name=...`
// - List DNS Records: GET `/zones/:zone_id/dns_records?name=...&type=...`
// - Update DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use dnsync_core::config::{Domain, ProviderConfig};
use dnsync_core::traits::{DnsProvider, DnsProviderFactory};
use dnsync_core::{Error, ProviderRegistry, Result};
use serde::Serialize;
use serde_json::Value;
use std::net::IpAddr;
use std::time::Duration;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Record body sent with the PUT request
#[derive(Debug, Serialize)]
struct RecordUpdate<'a> {
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    content: String,
    ttl: u32,
    proxied: bool,
}

/// Cloudflare DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider performs the zone and record
/// lookups, logs the intended PUT payload and reports success without
/// modifying anything.
pub struct CloudflareProvider {
    /// Cloudflare API token. Never log this value.
    api_token: String,

    /// Zone ID (optional, looked up from the domain name otherwise)
    zone_id: Option<String>,

    /// Proxy traffic through Cloudflare
    proxied: bool,

    /// Record TTL in seconds (1 = automatic)
    ttl: u32,

    /// Perform GET requests but skip PUT updates
    dry_run: bool,

    /// API base URL
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("api_token", &"<REDACTED>")
            .field("zone_id", &self.zone_id)
            .field("proxied", &self.proxied)
            .field("ttl", &self.ttl)
            .field("dry_run", &self.dry_run)
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: Cloudflare API token with Zone:DNS:Edit permissions
    /// - `zone_id`: Optional zone ID (looked up per domain otherwise)
    pub fn new(api_token: impl Into<String>, zone_id: Option<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.is_empty() {
            return Err(Error::config("Cloudflare API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            zone_id,
            proxied: false,
            ttl: 1,
            dry_run: false,
            base_url: CLOUDFLARE_API_BASE.to_string(),
            client,
        })
    }

    /// Set the proxied flag written to updated records
    pub fn with_proxied(mut self, proxied: bool) -> Self {
        self.proxied = proxied;
        self
    }

    /// Set the TTL written to updated records
    pub fn with_ttl(mut self, ttl: u32) -> Self {
        self.ttl = ttl;
        self
    }

    /// Enable or disable dry-run mode
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Point the provider at another API endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Get the zone ID for a domain
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones?name=example.com
    /// Authorization: Bearer <token>
    /// ```
    async fn get_zone_id(&self, domain_name: &str) -> Result<String> {
        if let Some(ref zone_id) = self.zone_id {
            tracing::debug!("Using pre-configured zone ID");
            return Ok(zone_id.clone());
        }

        tracing::debug!(zone = domain_name, "Looking up zone ID");

        let json = self
            .get_json(
                format!("{}/zones", self.base_url),
                &[("name", domain_name)],
                &format!("zone {}", domain_name),
            )
            .await?;

        let zone_id = first_result_id(&json)?
            .ok_or_else(|| Error::not_found(format!("Zone not found: {}", domain_name)))?;

        tracing::debug!(zone = domain_name, %zone_id, "Found zone ID");
        Ok(zone_id)
    }

    /// Get the DNS record ID for a hostname
    ///
    /// # API Call
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?name=www.example.com&type=A
    /// Authorization: Bearer <token>
    /// ```
    async fn get_record_id(
        &self,
        zone_id: &str,
        hostname: &str,
        record_type: &str,
    ) -> Result<String> {
        tracing::debug!(%hostname, record_type, "Looking up record ID");

        let context = format!("record {} (type: {})", hostname, record_type);
        let json = self
            .get_json(
                format!("{}/zones/{}/dns_records", self.base_url, zone_id),
                &[("name", hostname), ("type", record_type)],
                &context,
            )
            .await?;

        let record_id = first_result_id(&json)?
            .ok_or_else(|| Error::not_found(format!("DNS {} not found", context)))?;

        tracing::debug!(%hostname, %record_id, "Found record ID");
        Ok(record_id)
    }

    async fn get_json(&self, url: String, query: &[(&str, &str)], context: &str) -> Result<Value> {
        let response = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(&self.api_token)
            .send()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(map_status(status.as_u16(), context, &error_text));
        }

        response
            .json()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("Failed to parse response: {}", e)))
    }
}

/// Extract `result[0].id` from a list response
fn first_result_id(json: &Value) -> Result<Option<String>> {
    let results = json["result"].as_array().ok_or_else(|| {
        Error::provider("cloudflare", "Invalid response format: result is not an array")
    })?;

    match results.first() {
        None => Ok(None),
        Some(entry) => entry["id"].as_str().map(|id| Some(id.to_string())).ok_or_else(|| {
            Error::provider("cloudflare", "Invalid response format: id is not a string")
        }),
    }
}

/// Map a non-success HTTP status to an error
fn map_status(status: u16, context: &str, error_text: &str) -> Error {
    match status {
        401 | 403 => Error::provider(
            "cloudflare",
            format!(
                "Authentication failed: Invalid API token or insufficient permissions. Status: {}",
                status
            ),
        ),
        404 => Error::not_found(format!("Cloudflare {} not found", context)),
        409 => Error::provider(
            "cloudflare",
            format!(
                "Conflict: {} is being updated by another process. Status: {}",
                context, status
            ),
        ),
        429 => Error::provider(
            "cloudflare",
            format!("Rate limit exceeded. Please retry later. Status: {}", status),
        ),
        500..=599 => Error::provider(
            "cloudflare",
            format!("Cloudflare server error (transient): {} - {}", status, error_text),
        ),
        _ => Error::provider(
            "cloudflare",
            format!("Request for {} failed: {} - {}", context, status, error_text),
        ),
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    async fn update_ip(&self, domain_name: &str, sub_domain: &str, ip: IpAddr) -> Result<()> {
        let hostname = Domain::new(domain_name, [sub_domain]).hostname(sub_domain);
        let record_type = match ip {
            IpAddr::V4(_) => "A",
            IpAddr::V6(_) => "AAAA",
        };

        tracing::info!(
            %hostname,
            %ip,
            record_type,
            mode = if self.dry_run { "DRY-RUN" } else { "LIVE" },
            "Updating Cloudflare DNS record"
        );

        let zone_id = self.get_zone_id(domain_name).await?;
        let record_id = self.get_record_id(&zone_id, &hostname, record_type).await?;

        let url = format!("{}/zones/{}/dns_records/{}", self.base_url, zone_id, record_id);
        let payload = RecordUpdate {
            record_type,
            name: &hostname,
            content: ip.to_string(),
            ttl: self.ttl,
            proxied: self.proxied,
        };

        if self.dry_run {
            tracing::info!(
                %url,
                payload = %serde_json::to_string(&payload).unwrap_or_default(),
                "[DRY-RUN] Would send PUT request"
            );
            return Ok(());
        }

        let response = self
            .client
            .put(&url)
            .bearer_auth(&self.api_token)
            .json(&payload)
            .send()
            .await
            .map_err(|e| Error::provider("cloudflare", format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());
            return Err(map_status(status.as_u16(), &format!("record {}", hostname), &error_text));
        }

        tracing::info!(%hostname, %ip, "DNS record updated successfully");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}

/// Factory for creating Cloudflare providers
pub struct CloudflareFactory;

impl DnsProviderFactory for CloudflareFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Cloudflare {
                api_token,
                zone_id,
                proxied,
                ttl,
                dry_run,
            } => {
                if *dry_run {
                    tracing::warn!(
                        "Cloudflare provider running in DRY-RUN mode, no changes will be made"
                    );
                }

                let provider = CloudflareProvider::new(api_token.clone(), zone_id.clone())?
                    .with_proxied(*proxied)
                    .with_ttl(*ttl)
                    .with_dry_run(*dry_run);

                Ok(Box::new(provider))
            }
            _ => Err(Error::config("Invalid config for Cloudflare provider")),
        }
    }
}

/// Register the Cloudflare provider with a registry
///
/// # Example
///
/// ```rust
/// use dnsync_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// dnsync_provider_cloudflare::register(&registry);
/// assert!(registry.has_provider("cloudflare"));
/// ```
pub fn register(registry: &ProviderRegistry) {
    registry.register_provider("cloudflare", Box::new(CloudflareFactory));
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN: &str = "secret_token_12345";

    fn provider(server: &MockServer, zone_id: Option<&str>) -> CloudflareProvider {
        CloudflareProvider::new(TOKEN, zone_id.map(str::to_string))
            .unwrap()
            .with_base_url(server.uri())
    }

    fn list(id: &str) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "success": true,
            "result": [{ "id": id }]
        }))
    }

    async fn mount_zone(server: &MockServer, name: &str, id: &str) {
        Mock::given(method("GET"))
            .and(path("/zones"))
            .and(query_param("name", name))
            .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
            .respond_with(list(id))
            .expect(1)
            .mount(server)
            .await;
    }

    async fn mount_record(
        server: &MockServer,
        zone: &str,
        name: &str,
        record_type: &str,
        id: &str,
    ) {
        Mock::given(method("GET"))
            .and(path(format!("/zones/{}/dns_records", zone)))
            .and(query_param("name", name))
            .and(query_param("type", record_type))
            .respond_with(list(id))
            .expect(1)
            .mount(server)
            .await;
    }

    #[test]
    fn test_factory_creation() {
        let registry = ProviderRegistry::new();
        register(&registry);

        let config = ProviderConfig::Cloudflare {
            api_token: "test_token".to_string(),
            zone_id: Some("test_zone".to_string()),
            proxied: false,
            ttl: 1,
            dry_run: false,
        };

        let provider = registry.create_provider(&config).unwrap();
        assert_eq!(provider.provider_name(), "cloudflare");
    }

    #[test]
    fn test_factory_missing_token() {
        let config = ProviderConfig::Cloudflare {
            api_token: String::new(),
            zone_id: None,
            proxied: false,
            ttl: 1,
            dry_run: false,
        };

        let err = CloudflareFactory.create(&config).err().unwrap();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_api_token_not_exposed_in_debug() {
        let provider = CloudflareProvider::new(TOKEN, None).unwrap();

        let debug_str = format!("{:?}", provider);
        assert!(!debug_str.contains("secret_token"));
        assert!(debug_str.contains("CloudflareProvider"));
        assert!(debug_str.contains("<REDACTED>"));
    }

    #[test]
    fn test_status_mapping() {
        assert!(map_status(403, "zone x", "").to_string().contains("Authentication failed"));
        assert!(matches!(map_status(404, "zone x", ""), Error::NotFound(_)));
        assert!(map_status(409, "record x", "").to_string().contains("Conflict"));
        assert!(map_status(429, "zone x", "").to_string().contains("Rate limit"));
        assert!(map_status(502, "zone x", "bad gateway").to_string().contains("transient"));
        assert!(map_status(400, "zone x", "bad").to_string().contains("400"));
    }

    #[tokio::test]
    async fn test_update_looks_up_zone_and_record_then_puts() {
        let server = MockServer::start().await;
        mount_zone(&server, "example.com", "zone-1").await;
        mount_record(&server, "zone-1", "www.example.com", "A", "rec-1").await;

        Mock::given(method("PUT"))
            .and(path("/zones/zone-1/dns_records/rec-1"))
            .and(body_json(serde_json::json!({
                "type": "A",
                "name": "www.example.com",
                "content": "203.0.113.10",
                "ttl": 120,
                "proxied": true
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "success": true })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = provider(&server, None).with_ttl(120).with_proxied(true);
        provider
            .update_ip("example.com", "www", "203.0.113.10".parse().unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_root_marker_targets_bare_domain_aaaa() {
        let server = MockServer::start().await;
        mount_record(&server, "zone-9", "example.com", "AAAA", "rec-9").await;

        Mock::given(method("PUT"))
            .and(path("/zones/zone-9/dns_records/rec-9"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        // Configured zone ID: no zone lookup
        Mock::given(method("GET"))
            .and(path("/zones"))
            .respond_with(list("unexpected"))
            .expect(0)
            .mount(&server)
            .await;

        provider(&server, Some("zone-9"))
            .update_ip("example.com", "@", "2001:db8::10".parse().unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_dry_run_skips_put() {
        let server = MockServer::start().await;
        mount_zone(&server, "example.com", "zone-1").await;
        mount_record(&server, "zone-1", "www.example.com", "A", "rec-1").await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        provider(&server, None)
            .with_dry_run(true)
            .update_ip("example.com", "www", "203.0.113.10".parse().unwrap())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_missing_record_is_not_found() {
        let server = MockServer::start().await;
        mount_zone(&server, "example.com", "zone-1").await;

        Mock::given(method("GET"))
            .and(path("/zones/zone-1/dns_records"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "success": true, "result": [] })),
            )
            .mount(&server)
            .await;

        let err = provider(&server, None)
            .update_ip("example.com", "nas", "203.0.113.10".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
        assert!(err.to_string().contains("nas.example.com"));
    }

    #[tokio::test]
    async fn test_forbidden_put_is_provider_error() {
        let server = MockServer::start().await;
        mount_record(&server, "zone-1", "www.example.com", "A", "rec-1").await;

        Mock::given(method("PUT"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let err = provider(&server, Some("zone-1"))
            .update_ip("example.com", "www", "203.0.113.10".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Provider { .. }));
        assert!(!err.to_string().contains(TOKEN));
    }
}
