// # Published Record Resolver
//
// Looks up the address a hostname currently publishes, through the
// nameserver named in the settings (or the system resolver when none is
// configured). Only the record family matching the configured address
// type is queried.

use dnsync_core::config::{IpType, parse_resolver};
use dnsync_core::traits::RecordResolver;
use dnsync_core::{Error, Result};

use hickory_resolver::config::{NameServerConfig, ResolverConfig, ResolverOpts};
use hickory_resolver::name_server::TokioConnectionProvider;
use hickory_resolver::proto::xfer::Protocol;
use hickory_resolver::{Resolver, TokioResolver};

use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

/// Per-query timeout
const LOOKUP_TIMEOUT_SECS: u64 = 5;

/// hickory-based [`RecordResolver`]
///
/// A fresh hickory resolver is built for every lookup, so answers are never
/// served from a cache kept across poll cycles.
#[derive(Debug, Default, Clone, Copy)]
pub struct DnsResolver;

impl DnsResolver {
    /// Create a new resolver
    pub fn new() -> Self {
        Self
    }

    fn build(&self, endpoint: Option<SocketAddr>) -> Result<TokioResolver> {
        match endpoint {
            Some(addr) => {
                let mut config = ResolverConfig::new();
                config.add_name_server(NameServerConfig::new(addr, Protocol::Udp));
                config.add_name_server(NameServerConfig::new(addr, Protocol::Tcp));

                Ok(
                    Resolver::builder_with_config(config, TokioConnectionProvider::default())
                        .with_options(lookup_options())
                        .build(),
                )
            }
            None => {
                let builder = Resolver::builder_tokio().map_err(|e| {
                    Error::resolution(format!("Failed to read system resolver config: {}", e))
                })?;
                Ok(builder.with_options(lookup_options()).build())
            }
        }
    }
}

fn lookup_options() -> ResolverOpts {
    let mut opts = ResolverOpts::default();
    opts.timeout = Duration::from_secs(LOOKUP_TIMEOUT_SECS);
    opts.attempts = 1;
    opts
}

fn lookup_error(hostname: &str, ip_type: IpType, e: impl std::fmt::Display) -> Error {
    Error::resolution(format!("{} lookup for {} failed: {}", ip_type.record_type(), hostname, e))
}

#[async_trait::async_trait]
impl RecordResolver for DnsResolver {
    async fn resolve(&self, hostname: &str, resolver: &str, ip_type: IpType) -> Result<IpAddr> {
        let endpoint = parse_resolver(resolver)?;
        let lookup = self.build(endpoint)?;

        tracing::debug!(
            %hostname,
            resolver = %endpoint.map(|a| a.to_string()).unwrap_or_else(|| "system".to_string()),
            record = ip_type.record_type(),
            "Resolving published record"
        );

        let first = match ip_type {
            IpType::V4 => lookup
                .ipv4_lookup(hostname)
                .await
                .map_err(|e| lookup_error(hostname, ip_type, e))?
                .iter()
                .next()
                .map(|a| IpAddr::V4(a.0)),
            IpType::V6 => lookup
                .ipv6_lookup(hostname)
                .await
                .map_err(|e| lookup_error(hostname, ip_type, e))?
                .iter()
                .next()
                .map(|aaaa| IpAddr::V6(aaaa.0)),
        };

        first.ok_or_else(|| {
            Error::resolution(format!(
                "No {} record found for {}",
                ip_type.record_type(),
                hostname
            ))
        })
    }
}
