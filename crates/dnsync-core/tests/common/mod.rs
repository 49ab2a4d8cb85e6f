//! Test doubles and common utilities for contract tests
//!
//! The resolver and provider doubles share a [`Zone`]: a successful update
//! publishes the new address, so later lookups see it, as they would once a
//! real provider change has propagated.

#![allow(dead_code)]

use async_trait::async_trait;
use dnsync_core::config::{Domain, IpType, ProviderConfig, Settings, WebhookConfig};
use dnsync_core::error::{Error, Result};
use dnsync_core::traits::{DnsProvider, IpSource, Notifier, RecordResolver, WebhookExecutor};
use dnsync_core::Components;
use std::collections::{HashMap, HashSet};
use std::net::IpAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Published records, keyed by hostname
pub type Zone = Arc<Mutex<HashMap<String, IpAddr>>>;

pub fn ip(s: &str) -> IpAddr {
    s.parse().expect("valid IP literal")
}

/// An IP source whose answer the test controls
pub struct MockIpSource {
    current: Mutex<Option<IpAddr>>,
    calls: AtomicUsize,
}

impl MockIpSource {
    pub fn new(ip: IpAddr) -> Self {
        Self {
            current: Mutex::new(Some(ip)),
            calls: AtomicUsize::new(0),
        }
    }

    /// Answer with `ip` from now on
    pub fn set(&self, ip: IpAddr) {
        *self.current.lock().unwrap() = Some(ip);
    }

    /// Fail every discovery from now on
    pub fn fail(&self) {
        *self.current.lock().unwrap() = None;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IpSource for MockIpSource {
    async fn current(&self) -> Result<IpAddr> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.current
            .lock()
            .unwrap()
            .ok_or_else(|| Error::discovery("echo service unreachable"))
    }

    fn source_name(&self) -> &'static str {
        "mock"
    }
}

/// A resolver reading from a shared zone
pub struct MockResolver {
    zone: Zone,
    failing: Mutex<HashSet<String>>,
    lookups: Mutex<Vec<String>>,
}

impl MockResolver {
    pub fn new(zone: Zone) -> Self {
        Self {
            zone,
            failing: Mutex::new(HashSet::new()),
            lookups: Mutex::new(Vec::new()),
        }
    }

    /// Make lookups of `hostname` fail
    pub fn fail_for(&self, hostname: &str) {
        self.failing.lock().unwrap().insert(hostname.to_string());
    }

    pub fn calls(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordResolver for MockResolver {
    async fn resolve(&self, hostname: &str, _resolver: &str, _ip_type: IpType) -> Result<IpAddr> {
        self.lookups.lock().unwrap().push(hostname.to_string());

        if self.failing.lock().unwrap().contains(hostname) {
            return Err(Error::resolution(format!("SERVFAIL for {}", hostname)));
        }

        self.zone
            .lock()
            .unwrap()
            .get(hostname)
            .copied()
            .ok_or_else(|| Error::resolution(format!("no record for {}", hostname)))
    }
}

/// One recorded `update_ip` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateCall {
    pub domain_name: String,
    pub sub_domain: String,
    pub ip: IpAddr,
}

/// A provider writing into a shared zone
pub struct MockProvider {
    zone: Zone,
    calls: Mutex<Vec<UpdateCall>>,
    failing_subdomains: Mutex<HashSet<String>>,
    panics_left: Mutex<HashMap<String, usize>>,
    panic_attempts: AtomicUsize,
}

impl MockProvider {
    pub fn new(zone: Zone) -> Self {
        Self {
            zone,
            calls: Mutex::new(Vec::new()),
            failing_subdomains: Mutex::new(HashSet::new()),
            panics_left: Mutex::new(HashMap::new()),
            panic_attempts: AtomicUsize::new(0),
        }
    }

    /// Fail updates of `sub_domain` until [`MockProvider::recover`]
    pub fn fail_on(&self, sub_domain: &str) {
        self.failing_subdomains
            .lock()
            .unwrap()
            .insert(sub_domain.to_string());
    }

    pub fn recover(&self) {
        self.failing_subdomains.lock().unwrap().clear();
    }

    /// Panic on the next `times` updates for `domain_name`
    pub fn panic_for(&self, domain_name: &str, times: usize) {
        self.panics_left
            .lock()
            .unwrap()
            .insert(domain_name.to_string(), times);
    }

    /// Number of updates that panicked
    pub fn panic_attempts(&self) -> usize {
        self.panic_attempts.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<UpdateCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn calls_for(&self, domain_name: &str) -> Vec<UpdateCall> {
        self.calls()
            .into_iter()
            .filter(|c| c.domain_name == domain_name)
            .collect()
    }
}

#[async_trait]
impl DnsProvider for MockProvider {
    async fn update_ip(&self, domain_name: &str, sub_domain: &str, ip: IpAddr) -> Result<()> {
        let should_panic = {
            let mut panics = self.panics_left.lock().unwrap();
            match panics.get_mut(domain_name) {
                Some(left) if *left > 0 => {
                    *left -= 1;
                    true
                }
                _ => false,
            }
        };
        if should_panic {
            self.panic_attempts.fetch_add(1, Ordering::SeqCst);
            panic!("injected provider fault for {}", domain_name);
        }

        self.calls.lock().unwrap().push(UpdateCall {
            domain_name: domain_name.to_string(),
            sub_domain: sub_domain.to_string(),
            ip,
        });

        if self.failing_subdomains.lock().unwrap().contains(sub_domain) {
            return Err(Error::provider("mock", format!("rejected {}", sub_domain)));
        }

        let hostname = Domain::new(domain_name, [sub_domain]).hostname(sub_domain);
        self.zone.lock().unwrap().insert(hostname, ip);
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// A notifier recording every notice
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, IpAddr)>>,
    fail: AtomicBool,
}

impl RecordingNotifier {
    pub fn failing() -> Self {
        Self {
            sent: Mutex::new(Vec::new()),
            fail: AtomicBool::new(true),
        }
    }

    pub fn sent(&self) -> Vec<(String, IpAddr)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, hostname: &str, ip: IpAddr) -> Result<()> {
        self.sent.lock().unwrap().push((hostname.to_string(), ip));
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::notification("recording", "channel down"));
        }
        Ok(())
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}

/// A webhook executor recording hostnames
#[derive(Default)]
pub struct MockWebhook {
    executed: Mutex<Vec<String>>,
    fail: AtomicBool,
}

impl MockWebhook {
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn executed(&self) -> Vec<String> {
        self.executed.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookExecutor for MockWebhook {
    async fn execute(&self, hostname: &str, _ip: IpAddr) -> Result<()> {
        self.executed.lock().unwrap().push(hostname.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::webhook("HTTP 500 from hook"));
        }
        Ok(())
    }
}

/// Every double wired together
pub struct Harness {
    pub zone: Zone,
    pub ip_source: Arc<MockIpSource>,
    pub resolver: Arc<MockResolver>,
    pub provider: Arc<MockProvider>,
    pub notifier: Arc<RecordingNotifier>,
    pub webhook: Arc<MockWebhook>,
}

impl Harness {
    pub fn new(current_ip: IpAddr) -> Self {
        Self::with_notifier(current_ip, RecordingNotifier::default())
    }

    pub fn with_notifier(current_ip: IpAddr, notifier: RecordingNotifier) -> Self {
        let zone: Zone = Arc::new(Mutex::new(HashMap::new()));

        Self {
            ip_source: Arc::new(MockIpSource::new(current_ip)),
            resolver: Arc::new(MockResolver::new(Arc::clone(&zone))),
            provider: Arc::new(MockProvider::new(Arc::clone(&zone))),
            notifier: Arc::new(notifier),
            webhook: Arc::new(MockWebhook::default()),
            zone,
        }
    }

    /// Publish `ip` for `hostname`
    pub fn publish(&self, hostname: &str, ip: IpAddr) {
        self.zone.lock().unwrap().insert(hostname.to_string(), ip);
    }

    pub fn published(&self, hostname: &str) -> Option<IpAddr> {
        self.zone.lock().unwrap().get(hostname).copied()
    }

    pub fn components(&self) -> Components {
        Components::new(
            self.ip_source.clone(),
            self.resolver.clone(),
            self.provider.clone(),
            self.notifier.clone(),
        )
        .with_webhook(self.webhook.clone())
    }
}

/// Settings for the given domains, 300 s interval, continuous mode
pub fn settings(domains: Vec<Domain>) -> Settings {
    Settings {
        domains,
        interval: 300,
        run_once: false,
        ip_type: IpType::V4,
        resolver: "8.8.8.8".to_string(),
        ip_source: Default::default(),
        provider: ProviderConfig::Custom {
            factory: "mock".to_string(),
            config: serde_json::json!({}),
        },
        notify: Default::default(),
        webhook: WebhookConfig::default(),
        debug_info: false,
        restart_budget: 5,
    }
}

/// Settings with the webhook enabled
pub fn settings_with_webhook(domains: Vec<Domain>) -> Settings {
    let mut settings = settings(domains);
    settings.webhook = WebhookConfig {
        enabled: true,
        url: "https://hooks.example.net/ddns".to_string(),
        request_body: String::new(),
    };
    settings
}
