//! Collaborator traits for dnsync
//!
//! The core only talks to the outside world through these interfaces.
//!
//! - [`IpSource`]: Discover the current address
//! - [`RecordResolver`]: Read the currently published address of a hostname
//! - [`DnsProvider`]: Update DNS records via provider APIs
//! - [`Notifier`]: Announce a change
//! - [`WebhookExecutor`]: Trigger an HTTP side effect after a change

pub mod ip_source;
pub mod dns_provider;
pub mod resolver;
pub mod notifier;
pub mod webhook;

pub use ip_source::{IpSource, IpSourceFactory};
pub use dns_provider::{DnsProvider, DnsProviderFactory};
pub use resolver::RecordResolver;
pub use notifier::Notifier;
pub use webhook::WebhookExecutor;
