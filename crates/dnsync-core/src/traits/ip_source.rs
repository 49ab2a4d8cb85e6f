// # IP Source Trait
//
// Defines the interface for discovering the caller's current address.
//
// ## Implementations
//
// - HTTP IP-echo services: `dnsync-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use dnsync_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("current address: {}", current_ip);
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

use crate::config::{IpSourceConfig, IpType};

/// Trait for IP source implementations
///
/// A source answers one question: what is the current public address?
/// Workers call it once per poll cycle.
///
/// # Contract
///
/// - Must not cache answers across calls; change detection belongs to the worker
/// - Must not retry internally beyond trying its configured endpoints once;
///   a failed discovery simply skips the cycle
/// - Must only return addresses of the configured family
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current IP address
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: The current IP address
    /// - `Err(Error)`: If unable to determine the current IP (usually `Error::Discovery`)
    async fn current(&self) -> Result<IpAddr, crate::Error>;

    /// Short name used in logs
    fn source_name(&self) -> &'static str;
}

/// Helper trait for constructing IP sources from configuration
pub trait IpSourceFactory: Send + Sync {
    /// Create an IpSource instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this IP source type
    /// - `ip_type`: Address family the source must report
    fn create(
        &self,
        config: &IpSourceConfig,
        ip_type: IpType,
    ) -> Result<Box<dyn IpSource>, crate::Error>;
}
