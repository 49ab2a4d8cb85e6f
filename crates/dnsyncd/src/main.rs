// # dnsyncd - dnsync daemon
//
// Thin integration layer around dnsync-core. The daemon is responsible for:
// 1. Parsing the command line and loading the JSON settings file
// 2. Installing the tracing subscriber
// 3. Building the runtime and the concrete collaborators
// 4. Running the supervisor until run-once completion, a stop signal, or
//    restart budget exhaustion
// 5. Turning the supervisor outcome into a process exit code
//
// All polling, change detection and update logic lives in dnsync-core.
//
// ## Logging
//
// INFO by default, DEBUG when `debug_info` is set in the settings. The
// `DNSYNC_LOG_LEVEL` environment variable (trace, debug, info, warn, error)
// overrides both.
//
// ## Example
//
// ```bash
// dnsyncd -c /etc/dnsync/config.json
// ```

use anyhow::{Context, Result};
use clap::Parser;
use dnsync_core::{
    Components, Error, ProviderRegistry, Settings, Supervisor, SupervisorExit,
};
use dnsync_notify::{HttpWebhook, NotificationManager};
use dnsync_resolver::DnsResolver;
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Environment variable overriding the log level
const LOG_LEVEL_ENV: &str = "DNSYNC_LOG_LEVEL";

const BANNER: &str = r"
     _
  __| |_ __  ___ _   _ _ __   ___
 / _` | '_ \/ __| | | | '_ \ / __|
| (_| | | | \__ \ |_| | | | | (__
 \__,_|_| |_|___/\__, |_| |_|\___|
                 |___/
";

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean exit (help, run-once success, stop signal)
/// - 1: Configuration error or unrecoverable worker crashes
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DnsyncExitCode {
    /// Normal exit
    Success = 0,
    /// Configuration error, run-once crash, or restart budget exhausted
    Failure = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DnsyncExitCode> for ExitCode {
    fn from(code: DnsyncExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

impl DnsyncExitCode {
    fn from_outcome(outcome: &dnsync_core::Result<SupervisorExit>) -> Self {
        match outcome {
            Ok(exit) if exit.is_failure() => DnsyncExitCode::Failure,
            Ok(_) => DnsyncExitCode::Success,
            Err(Error::WorkerFault { .. }) => DnsyncExitCode::Failure,
            Err(_) => DnsyncExitCode::RuntimeError,
        }
    }
}

/// Dynamic DNS client keeping DNS records in sync with the current address
#[derive(Parser, Debug)]
#[command(name = "dnsyncd", version, before_help = BANNER)]
struct Cli {
    /// Specify a config file
    #[arg(short, long, default_value = "./config.json")]
    config: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let settings = match load_settings(&cli.config) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DnsyncExitCode::Failure.into();
        }
    };

    let level = log_level(std::env::var(LOG_LEVEL_ENV).ok().as_deref(), settings.debug_info);
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DnsyncExitCode::RuntimeError.into();
    }

    info!(
        config = %cli.config.display(),
        domains = settings.domains.len(),
        interval_secs = settings.interval,
        run_once = settings.run_once,
        ip_type = %settings.ip_type,
        "Starting dnsyncd"
    );

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DnsyncExitCode::RuntimeError.into();
        }
    };

    rt.block_on(async {
        let components = match build_components(&settings) {
            Ok(components) => components,
            Err(e) => {
                error!("Failed to initialize components: {:#}", e);
                return DnsyncExitCode::Failure;
            }
        };

        let outcome = run_daemon(Arc::new(settings), components).await;
        match &outcome {
            Ok(exit) => info!(?exit, "dnsyncd finished"),
            Err(e) => error!("Daemon error: {}", e),
        }
        DnsyncExitCode::from_outcome(&outcome)
    })
    .into()
}

fn load_settings(path: &std::path::Path) -> Result<Settings> {
    let settings = Settings::from_file(path)?;
    settings.validate().context("Invalid settings")?;
    Ok(settings)
}

/// Resolve the log level from the override variable and the settings
fn log_level(env_override: Option<&str>, debug_info: bool) -> Level {
    if let Some(raw) = env_override {
        match Level::from_str(raw.trim()) {
            Ok(level) => return level,
            Err(_) => eprintln!("Ignoring invalid {}={:?}", LOG_LEVEL_ENV, raw),
        }
    }

    if debug_info { Level::DEBUG } else { Level::INFO }
}

/// Build the collaborators named by the settings
fn build_components(settings: &Settings) -> Result<Components> {
    let registry = ProviderRegistry::new();

    #[cfg(feature = "cloudflare")]
    dnsync_provider_cloudflare::register(&registry);

    #[cfg(feature = "http")]
    dnsync_ip_http::register(&registry);

    let provider = registry
        .create_provider(&settings.provider)
        .with_context(|| format!("provider {:?}", settings.provider.type_name()))?;
    let ip_source = registry
        .create_ip_source(&settings.ip_source, settings.ip_type)
        .with_context(|| format!("IP source {:?}", settings.ip_source.type_name()))?;

    let notifier = NotificationManager::from_config(&settings.notify, settings.ip_type);
    if notifier.is_empty() {
        info!("No notification channels enabled");
    }

    info!(
        provider = provider.provider_name(),
        ip_source = ip_source.source_name(),
        notify = ?notifier.channel_names(),
        webhook = settings.webhook.enabled,
        "Components ready"
    );

    let components = Components::new(
        Arc::from(ip_source),
        Arc::new(DnsResolver::new()),
        Arc::from(provider),
        Arc::new(notifier),
    );

    Ok(if settings.webhook.enabled {
        components.with_webhook(Arc::new(HttpWebhook::new(&settings.webhook, settings.ip_type)))
    } else {
        components
    })
}

/// Run the supervisor, stopping it on SIGTERM or SIGINT
async fn run_daemon(
    settings: Arc<Settings>,
    components: Components,
) -> dnsync_core::Result<SupervisorExit> {
    let supervisor = Supervisor::new(settings, components);
    let stop = supervisor.stop_handle();

    let signals = tokio::spawn(async move {
        match wait_for_shutdown().await {
            Ok(signal) => {
                info!("Received shutdown signal: {}", signal);
                stop.stop();
            }
            Err(e) => warn!("Signal handling unavailable: {}", e),
        }
    });

    let outcome = supervisor.run().await;
    signals.abort();
    outcome
}

/// Wait for shutdown signals (SIGTERM, SIGINT)
///
/// # Returns
///
/// Returns the name of the signal received.
#[cfg(unix)]
async fn wait_for_shutdown() -> Result<&'static str> {
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGTERM handler: {}", e))?;
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| anyhow::anyhow!("Failed to setup SIGINT handler: {}", e))?;

    Ok(tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = sigint.recv() => "SIGINT",
    })
}

/// Wait for shutdown signals (SIGINT only)
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn wait_for_shutdown() -> Result<&'static str> {
    tokio::signal::ctrl_c()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to wait for CTRL-C: {}", e))?;
    Ok("SIGINT")
}
