// # Webhook Executor Trait
//
// Optional HTTP side effect run after a record was updated.

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for webhook executors
///
/// Unlike notifications, a webhook failure aborts the current sync exactly
/// like a provider failure.
#[async_trait]
pub trait WebhookExecutor: Send + Sync {
    /// Run the webhook for an updated `hostname`
    async fn execute(&self, hostname: &str, ip: IpAddr) -> Result<(), crate::Error>;
}
