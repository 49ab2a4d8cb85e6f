// # DNS Provider Trait
//
// Defines the interface for updating DNS records via provider APIs.
//
// ## Implementations
//
// - Cloudflare: `dnsync-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsync_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     // Point www.example.com at a new address
//     provider.update_ip("example.com", "www", "192.0.2.10".parse()?).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for DNS provider implementations
///
/// This trait defines the interface for updating DNS records.
/// Implementations must handle the specifics of each provider's API.
///
/// # Contract
///
/// - Single-shot: one update attempt per call, no retry loop or backoff.
///   The worker retries the whole domain on its next cycle.
/// - Stateless: no caching of records between calls
/// - No task spawning
///
/// The subdomain is passed exactly as configured, so it may be the root
/// marker [`crate::config::ROOT_MARKER`]; use
/// [`crate::config::Domain::hostname`] semantics to build the record name.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Set the record of `sub_domain` in zone `domain_name` to `ip`
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider accepted the update
    /// - `Err(Error)`: The update failed; the caller aborts the current sync
    async fn update_ip(
        &self,
        domain_name: &str,
        sub_domain: &str,
        ip: IpAddr,
    ) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
