// # Notifier Trait
//
// Best-effort delivery of a human-readable change notice.

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for notification channels
///
/// Errors are reported to the caller for logging only; a failed notification
/// never affects whether a record update counts as successful.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Announce that `hostname` now points at `ip`
    async fn send(&self, hostname: &str, ip: IpAddr) -> Result<(), crate::Error>;

    /// Channel name (for logging)
    fn name(&self) -> &'static str;
}
