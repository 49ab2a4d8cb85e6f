//! Collaborator bundle shared by all workers

use crate::traits::{DnsProvider, IpSource, Notifier, RecordResolver, WebhookExecutor};
use std::sync::Arc;

/// The external collaborators a worker talks to
///
/// Cloning is cheap: every collaborator sits behind an `Arc` and is shared
/// by all workers of the process.
#[derive(Clone)]
pub struct Components {
    /// Current address discovery
    pub ip_source: Arc<dyn IpSource>,
    /// Published record lookups
    pub resolver: Arc<dyn RecordResolver>,
    /// Record updates
    pub provider: Arc<dyn DnsProvider>,
    /// Change notices
    pub notifier: Arc<dyn Notifier>,
    /// Post-update webhook, used only when enabled in the settings
    pub webhook: Option<Arc<dyn WebhookExecutor>>,
}

impl Components {
    /// Create a bundle without a webhook executor
    pub fn new(
        ip_source: Arc<dyn IpSource>,
        resolver: Arc<dyn RecordResolver>,
        provider: Arc<dyn DnsProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            ip_source,
            resolver,
            provider,
            notifier,
            webhook: None,
        }
    }

    /// Attach a webhook executor
    pub fn with_webhook(mut self, webhook: Arc<dyn WebhookExecutor>) -> Self {
        self.webhook = Some(webhook);
        self
    }
}
