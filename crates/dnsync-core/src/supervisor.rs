//! Worker supervision
//!
//! The [`Supervisor`] owns one [`Worker`] per configured domain.
//!
//! ## Modes
//!
//! - **Run-once**: workers run one cycle each, sequentially on the caller's
//!   task. A crash is returned as a fatal [`Error::WorkerFault`].
//! - **Continuous**: every worker runs on its own task. A crashed worker
//!   reports a [`WorkerFault`] on the crash-report channel and is replaced
//!   by a fresh worker for the same domain.
//!
//! ## Restart Budget
//!
//! Restarts are counted across all domains. When the count reaches
//! `Settings::restart_budget` the supervisor stops every worker and returns
//! [`SupervisorExit::RestartBudgetExceeded`]; no replacement is spawned.
//!
//! ```text
//!             ┌──────────────┐   spawn    ┌──────────┐
//!             │  Supervisor  │──────────► │  Worker  │ × domains
//!             └──────────────┘            └──────────┘
//!                    ▲                          │
//!                    └──── WorkerFault (mpsc) ──┘
//! ```
//!
//! The supervisor never exits the process. It returns a [`SupervisorExit`]
//! and the caller decides the exit code.

use crate::components::Components;
use crate::config::{Domain, Settings};
use crate::error::Result;
use crate::worker::{Worker, WorkerFault};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// Why [`Supervisor::run`] returned
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorExit {
    /// Every domain ran its single cycle
    RunOnceComplete,
    /// A stop was requested
    Stopped,
    /// Workers crashed more often than the restart budget allows
    RestartBudgetExceeded {
        /// Crashes counted across all domains
        restarts: usize,
    },
}

impl SupervisorExit {
    /// Whether the process should exit with a failure code
    pub fn is_failure(&self) -> bool {
        matches!(self, SupervisorExit::RestartBudgetExceeded { .. })
    }
}

/// Cloneable handle that asks a running supervisor to stop
///
/// Stopping does not wait for in-flight cycles; worker tasks are aborted.
#[derive(Debug, Clone)]
pub struct StopHandle {
    tx: Arc<watch::Sender<bool>>,
}

impl StopHandle {
    /// Signal the supervisor to terminate. Idempotent.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Owner of all per-domain workers
pub struct Supervisor {
    settings: Arc<Settings>,
    components: Components,
    stop_tx: Arc<watch::Sender<bool>>,
}

impl Supervisor {
    /// Create a supervisor for the given settings
    pub fn new(settings: Arc<Settings>, components: Components) -> Self {
        let (stop_tx, _) = watch::channel(false);

        Self {
            settings,
            components,
            stop_tx: Arc::new(stop_tx),
        }
    }

    /// Handle for stopping the supervisor from another task
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            tx: Arc::clone(&self.stop_tx),
        }
    }

    /// Signal the supervisor to terminate
    pub fn stop(&self) {
        self.stop_tx.send_replace(true);
    }

    /// Run all workers until completion, stop, or restart budget exhaustion
    pub async fn run(&self) -> Result<SupervisorExit> {
        if self.settings.run_once {
            self.run_once().await
        } else {
            self.run_continuous().await
        }
    }

    async fn run_once(&self) -> Result<SupervisorExit> {
        info!(domains = self.settings.domains.len(), "Running a single cycle per domain");

        for domain in &self.settings.domains {
            let worker = Worker::new(
                domain.clone(),
                Arc::clone(&self.settings),
                self.components.clone(),
            );

            if let Err(fault) = worker.run(true).await {
                error!(
                    domain = %fault.domain.domain_name,
                    message = %fault.message,
                    "Worker crashed in run-once mode"
                );
                return Err(fault.into());
            }
        }

        info!("Run-once cycle complete");
        Ok(SupervisorExit::RunOnceComplete)
    }

    async fn run_continuous(&self) -> Result<SupervisorExit> {
        let (fault_tx, mut fault_rx) = mpsc::unbounded_channel::<WorkerFault>();
        let mut stop_rx = self.stop_tx.subscribe();
        let budget = self.settings.restart_budget;

        let mut workers: Vec<JoinHandle<()>> = self
            .settings
            .domains
            .iter()
            .map(|domain| self.spawn_worker(domain.clone(), fault_tx.clone()))
            .collect();

        info!(workers = workers.len(), restart_budget = budget, "Supervisor running");

        let mut restarts = 0usize;

        let exit = loop {
            if *stop_rx.borrow_and_update() {
                info!("Stop requested, shutting down workers");
                break SupervisorExit::Stopped;
            }

            tokio::select! {
                Some(fault) = fault_rx.recv() => {
                    restarts += 1;
                    error!(
                        domain = %fault.domain.domain_name,
                        message = %fault.message,
                        restarts,
                        restart_budget = budget,
                        "Worker crashed"
                    );

                    if restarts >= budget {
                        error!(restarts, "Restart budget exhausted, giving up");
                        break SupervisorExit::RestartBudgetExceeded { restarts };
                    }

                    info!(domain = %fault.domain.domain_name, "Spawning replacement worker");
                    workers.retain(|handle| !handle.is_finished());
                    workers.push(self.spawn_worker(fault.domain, fault_tx.clone()));
                }

                changed = stop_rx.changed() => {
                    if changed.is_err() {
                        warn!("Stop channel closed, shutting down workers");
                        break SupervisorExit::Stopped;
                    }
                }
            }
        };

        for handle in &workers {
            handle.abort();
        }
        debug!(aborted = workers.len(), "Worker tasks aborted");

        Ok(exit)
    }

    fn spawn_worker(
        &self,
        domain: Domain,
        fault_tx: mpsc::UnboundedSender<WorkerFault>,
    ) -> JoinHandle<()> {
        debug!(domain = %domain.domain_name, "Spawning worker");
        let worker = Worker::new(domain, Arc::clone(&self.settings), self.components.clone());

        tokio::spawn(async move {
            if let Err(fault) = worker.run(false).await {
                // The supervisor may already be gone during shutdown.
                let _ = fault_tx.send(fault);
            }
        })
    }
}
