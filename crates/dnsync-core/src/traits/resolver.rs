// # Record Resolver Trait
//
// Reads the address a hostname currently publishes in DNS, so that records
// already pointing at the target address are left alone.

use async_trait::async_trait;
use std::net::IpAddr;

use crate::config::IpType;

/// Trait for published-record lookups
#[async_trait]
pub trait RecordResolver: Send + Sync {
    /// Resolve `hostname` through `resolver` for the given address family
    ///
    /// # Parameters
    ///
    /// - `hostname`: Fully qualified name (e.g., "www.example.com")
    /// - `resolver`: Nameserver endpoint as configured; empty means the system resolver
    /// - `ip_type`: Which record family to query (A or AAAA)
    ///
    /// # Returns
    ///
    /// - `Ok(IpAddr)`: First published address
    /// - `Err(Error)`: No answer or lookup failure (usually `Error::Resolution`)
    async fn resolve(
        &self,
        hostname: &str,
        resolver: &str,
        ip_type: IpType,
    ) -> Result<IpAddr, crate::Error>;
}
