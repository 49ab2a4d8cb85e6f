//! Per-domain record synchronization
//!
//! The [`Updater`] reconciles every subdomain of one [`Domain`] with a target
//! address, in configuration order:
//!
//! ```text
//!  for each sub_domain
//!     │
//!     ▼
//!  resolve published address ──(error)──► log, next sub_domain
//!     │
//!     ├──(== target)──► log "already current", next sub_domain
//!     │
//!     ▼
//!  DnsProvider::update_ip ──(error)──► abort sync, return error
//!     │
//!     ▼
//!  Notifier::send (best-effort)
//!     │
//!     ▼
//!  WebhookExecutor::execute (if enabled) ──(error)──► abort sync, return error
//! ```
//!
//! Only one provider call is in flight at a time for a domain.

use crate::components::Components;
use crate::config::{Domain, Settings};
use crate::error::Result;
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// What happened to each hostname during one sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Hostnames updated at the provider
    pub updated: Vec<String>,
    /// Hostnames whose published address already matched
    pub already_current: Vec<String>,
    /// Hostnames that could not be resolved and were skipped
    pub unresolved: Vec<String>,
}

/// Synchronizes the records of a domain to a target address
#[derive(Clone)]
pub struct Updater {
    settings: Arc<Settings>,
    components: Components,
}

impl Updater {
    /// Create a new updater
    pub fn new(settings: Arc<Settings>, components: Components) -> Self {
        Self {
            settings,
            components,
        }
    }

    /// Bring every subdomain of `domain` to `target`
    ///
    /// Returns an error as soon as a provider update or a webhook fails; the
    /// remaining subdomains are not processed. Resolution failures only skip
    /// the affected subdomain.
    pub async fn sync(&self, domain: &Domain, target: IpAddr) -> Result<SyncReport> {
        let mut report = SyncReport::default();

        for sub_domain in &domain.sub_domains {
            let hostname = domain.hostname(sub_domain);

            let published = match self
                .components
                .resolver
                .resolve(&hostname, &self.settings.resolver, self.settings.ip_type)
                .await
            {
                Ok(ip) => ip,
                Err(e) => {
                    warn!(%hostname, error = %e, "Failed to resolve published address, skipping");
                    report.unresolved.push(hostname);
                    continue;
                }
            };

            if published == target {
                info!(%hostname, ip = %target, "Record already current, skipping update");
                report.already_current.push(hostname);
                continue;
            }

            info!(
                %hostname,
                published = %published,
                ip = %target,
                provider = self.components.provider.provider_name(),
                "Updating record"
            );

            if let Err(e) = self
                .components
                .provider
                .update_ip(&domain.domain_name, sub_domain, target)
                .await
            {
                error!(%hostname, error = %e, "Record update failed, aborting sync");
                return Err(e);
            }

            info!(%hostname, ip = %target, "Record updated");

            if let Err(e) = self.components.notifier.send(&hostname, target).await {
                warn!(
                    %hostname,
                    channel = self.components.notifier.name(),
                    error = %e,
                    "Notification failed"
                );
            }

            if self.settings.webhook.enabled {
                match &self.components.webhook {
                    Some(webhook) => {
                        if let Err(e) = webhook.execute(&hostname, target).await {
                            error!(%hostname, error = %e, "Webhook failed, aborting sync");
                            return Err(e);
                        }
                        debug!(%hostname, "Webhook executed");
                    }
                    None => warn!(%hostname, "Webhook enabled but no executor configured"),
                }
            }

            report.updated.push(hostname);
        }

        Ok(report)
    }
}
