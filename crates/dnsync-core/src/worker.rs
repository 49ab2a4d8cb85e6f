//! Per-domain polling worker
//!
//! A [`Worker`] owns one domain's loop:
//!
//! 1. Discover the current address via [`IpSource`](crate::traits::IpSource)
//! 2. Compare it with the last address applied by this worker
//! 3. If it differs, run the [`Updater`] for the domain
//! 4. Advance the cache only when the whole sync succeeded
//! 5. Sleep for the poll interval and repeat
//!
//! Providers and resolvers are never contacted while the discovered address
//! equals the cached one.

use crate::components::Components;
use crate::config::{Domain, Settings};
use crate::error::Error;
use crate::updater::{SyncReport, Updater};
use futures::FutureExt;
use std::any::Any;
use std::net::IpAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// Mutable state of one worker. Dropped when the worker ends.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerState {
    /// Address applied by the last fully successful sync
    pub last_applied: Option<IpAddr>,
}

/// Result of a single poll cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The current address could not be discovered; cycle skipped
    DiscoveryFailed,
    /// The discovered address equals the last applied one; nothing to do
    Unchanged(IpAddr),
    /// Every subdomain was synchronized and the cache advanced
    Applied {
        /// Address now applied
        ip: IpAddr,
        /// Per-hostname result
        report: SyncReport,
    },
    /// The sync aborted; the cache was left untouched
    SyncFailed(IpAddr),
}

/// A worker that panicked, converted into a value the supervisor can act on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkerFault {
    /// Domain the crashed worker was responsible for, unchanged
    pub domain: Domain,
    /// Panic message
    pub message: String,
}

impl WorkerFault {
    fn from_panic(domain: Domain, payload: &(dyn Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };

        Self { domain, message }
    }
}

impl std::fmt::Display for WorkerFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker for {} crashed: {}", self.domain.domain_name, self.message)
    }
}

impl From<WorkerFault> for Error {
    fn from(fault: WorkerFault) -> Self {
        Error::WorkerFault {
            domain: fault.domain.domain_name,
            message: fault.message,
        }
    }
}

/// Polling loop for one domain
pub struct Worker {
    domain: Domain,
    components: Components,
    updater: Updater,
    poll_interval: Duration,
    state: WorkerState,
}

impl Worker {
    /// Create a worker with empty state
    pub fn new(domain: Domain, settings: Arc<Settings>, components: Components) -> Self {
        let poll_interval = settings.poll_interval();
        let updater = Updater::new(settings, components.clone());

        Self {
            domain,
            components,
            updater,
            poll_interval,
            state: WorkerState::default(),
        }
    }

    /// Domain handled by this worker
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Address applied by the last successful cycle
    pub fn last_applied(&self) -> Option<IpAddr> {
        self.state.last_applied
    }

    /// Execute one poll cycle
    pub async fn poll_once(&mut self) -> PollOutcome {
        let domain_name = self.domain.domain_name.as_str();

        let ip = match self.components.ip_source.current().await {
            Ok(ip) => ip,
            Err(e) => {
                error!(
                    domain = domain_name,
                    source = self.components.ip_source.source_name(),
                    error = %e,
                    "Failed to discover current address, skipping cycle"
                );
                return PollOutcome::DiscoveryFailed;
            }
        };

        debug!(domain = domain_name, %ip, "Discovered current address");

        if self.state.last_applied == Some(ip) {
            debug!(domain = domain_name, %ip, "Address matches cached address, skipping");
            return PollOutcome::Unchanged(ip);
        }

        info!(
            domain = domain_name,
            %ip,
            cached = ?self.state.last_applied,
            "Address changed, synchronizing records"
        );

        match self.updater.sync(&self.domain, ip).await {
            Ok(report) => {
                self.state.last_applied = Some(ip);
                info!(
                    domain = domain_name,
                    %ip,
                    updated = report.updated.len(),
                    current = report.already_current.len(),
                    unresolved = report.unresolved.len(),
                    "Sync complete, cached address"
                );
                PollOutcome::Applied { ip, report }
            }
            Err(e) => {
                warn!(
                    domain = domain_name,
                    %ip,
                    error = %e,
                    "Sync failed, will retry next cycle"
                );
                PollOutcome::SyncFailed(ip)
            }
        }
    }

    /// Run the polling loop
    ///
    /// With `run_once` the worker returns after the first cycle, whatever its
    /// outcome. Otherwise it loops forever and only returns when a cycle
    /// panics; the panic is caught and handed back as a [`WorkerFault`].
    pub async fn run(mut self, run_once: bool) -> Result<(), WorkerFault> {
        loop {
            let cycle = AssertUnwindSafe(self.poll_once()).catch_unwind().await;

            if let Err(payload) = cycle {
                return Err(WorkerFault::from_panic(self.domain.clone(), payload.as_ref()));
            }

            if run_once {
                return Ok(());
            }

            debug!(
                domain = %self.domain.domain_name,
                interval_secs = self.poll_interval.as_secs(),
                "Cycle finished, sleeping"
            );
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}
