// # dnsync-core
//
// Core library for the dnsync dynamic-DNS client.
//
// ## Architecture Overview
//
// This library keeps DNS records synchronized with the caller's changing address:
// - **Supervisor**: One worker per domain, crash isolation, global restart budget
// - **Worker**: Per-domain poll loop with change detection against the last applied address
// - **Updater**: Per-subdomain resolve → compare → update → notify → webhook
// - **Traits**: `IpSource`, `RecordResolver`, `DnsProvider`, `Notifier`, `WebhookExecutor`
// - **ProviderRegistry**: Plugin-based registry for DNS providers and IP sources
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from concrete collaborators
// 2. **Crash Isolation**: A panicking worker is replaced, never takes others down
// 3. **Plugin-Based**: Providers are registered dynamically, no hard-coded if-else
// 4. **Library-First**: The core never exits the process; it returns outcomes
// 5. **Idempotency**: Providers are only called for records that differ from the target

pub mod components;
pub mod config;
pub mod error;
pub mod registry;
pub mod supervisor;
pub mod traits;
pub mod updater;
pub mod worker;

// Re-export core types for convenience
pub use components::Components;
pub use config::{Domain, IpSourceConfig, IpType, ProviderConfig, ROOT_MARKER, Settings};
pub use error::{Error, Result};
pub use registry::ProviderRegistry;
pub use supervisor::{StopHandle, Supervisor, SupervisorExit};
pub use traits::{DnsProvider, IpSource, Notifier, RecordResolver, WebhookExecutor};
pub use updater::{SyncReport, Updater};
pub use worker::{PollOutcome, Worker, WorkerFault, WorkerState};
