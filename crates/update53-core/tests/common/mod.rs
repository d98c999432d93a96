//! Test doubles and common utilities for update pipeline contract tests
//!
//! Every double counts its calls so tests can assert which collaborators a
//! cycle touched.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use update53_core::error::{Error, Result};
use update53_core::traits::{AddressSource, ChangeReceipt, ChangeRequest, DnsProvider, Zone};
use update53_core::{AddressSources, UpdateConfig, UpdateOrchestrator};

/// An address source returning scripted text and counting fetches
#[derive(Clone)]
pub struct MockAddressSource {
    name: &'static str,
    address: Arc<std::sync::Mutex<String>>,
    fail: Arc<AtomicBool>,
    fetch_count: Arc<AtomicUsize>,
}

impl MockAddressSource {
    pub fn new(name: &'static str, address: &str) -> Self {
        Self {
            name,
            address: Arc::new(std::sync::Mutex::new(address.to_string())),
            fail: Arc::new(AtomicBool::new(false)),
            fetch_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// A source whose every fetch fails with a network error
    pub fn failing(name: &'static str) -> Self {
        let source = Self::new(name, "");
        source.fail.store(true, Ordering::SeqCst);
        source
    }

    /// Change what the next fetch returns
    pub fn set_address(&self, address: &str) {
        *self.address.lock().unwrap() = address.to_string();
    }

    /// Get the number of times fetch() was called
    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }

    pub fn shared(&self) -> Arc<dyn AddressSource> {
        Arc::new(self.clone())
    }
}

#[async_trait::async_trait]
impl AddressSource for MockAddressSource {
    async fn fetch(&self) -> Result<String> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(Error::network(self.describe(), "connection refused"));
        }
        Ok(self.address.lock().unwrap().clone())
    }

    fn describe(&self) -> String {
        self.name.to_string()
    }
}

/// A mock DnsProvider with a fixed zone listing that records upserts
#[derive(Clone)]
pub struct MockDnsProvider {
    zones: Vec<Zone>,
    fail_listing: Arc<AtomicBool>,
    fail_upserts: Arc<AtomicBool>,
    list_call_count: Arc<AtomicUsize>,
    upsert_call_count: Arc<AtomicUsize>,
    changes: Arc<std::sync::Mutex<Vec<ChangeRequest>>>,
}

impl MockDnsProvider {
    pub fn new(zones: Vec<Zone>) -> Self {
        Self {
            zones,
            fail_listing: Arc::new(AtomicBool::new(false)),
            fail_upserts: Arc::new(AtomicBool::new(false)),
            list_call_count: Arc::new(AtomicUsize::new(0)),
            upsert_call_count: Arc::new(AtomicUsize::new(0)),
            changes: Arc::new(std::sync::Mutex::new(Vec::new())),
        }
    }

    /// Provider with a single `example.com.` zone
    pub fn example_com() -> Self {
        Self::new(vec![Zone::new("example.com.", "Z123")])
    }

    /// Make upserts fail (or succeed again)
    pub fn set_fail_upserts(&self, fail: bool) {
        self.fail_upserts.store(fail, Ordering::SeqCst);
    }

    /// Make zone listing fail
    pub fn set_fail_listing(&self, fail: bool) {
        self.fail_listing.store(fail, Ordering::SeqCst);
    }

    /// Get the number of times list_zones() was called
    pub fn list_call_count(&self) -> usize {
        self.list_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times upsert_record() was called
    pub fn upsert_call_count(&self) -> usize {
        self.upsert_call_count.load(Ordering::SeqCst)
    }

    /// Every change submitted, failed ones included
    pub fn changes(&self) -> Vec<ChangeRequest> {
        self.changes.lock().unwrap().clone()
    }

    pub fn shared(&self) -> Arc<dyn DnsProvider> {
        Arc::new(self.clone())
    }
}

#[async_trait::async_trait]
impl DnsProvider for MockDnsProvider {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        self.list_call_count.fetch_add(1, Ordering::SeqCst);
        if self.fail_listing.load(Ordering::SeqCst) {
            return Err(Error::provider("mock", "access denied"));
        }
        Ok(self.zones.clone())
    }

    async fn upsert_record(&self, change: &ChangeRequest) -> Result<ChangeReceipt> {
        self.upsert_call_count.fetch_add(1, Ordering::SeqCst);
        self.changes.lock().unwrap().push(change.clone());

        if self.fail_upserts.load(Ordering::SeqCst) {
            return Err(Error::provider("mock", "Throttling: Rate exceeded"));
        }

        Ok(ChangeReceipt {
            id: Some(format!("C{}", self.upsert_call_count())),
            status: Some("PENDING".to_string()),
        })
    }

    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Collaborators for one orchestrator under test
pub struct Harness {
    pub url: MockAddressSource,
    pub metadata: MockAddressSource,
    pub provider: MockDnsProvider,
}

impl Harness {
    /// URL source and metadata return different addresses
    pub fn new(provider: MockDnsProvider) -> Self {
        Self {
            url: MockAddressSource::new("url", "192.0.2.10"),
            metadata: MockAddressSource::new("metadata", "198.51.100.20"),
            provider,
        }
    }

    pub fn sources(&self, with_url: bool) -> AddressSources {
        let sources = AddressSources::metadata(self.metadata.shared());
        if with_url {
            sources.with_url(self.url.shared())
        } else {
            sources
        }
    }

    pub fn orchestrator(&self, config: UpdateConfig) -> UpdateOrchestrator {
        let with_url = config.ip_source_url().is_some();
        UpdateOrchestrator::new(config, self.sources(with_url), self.provider.shared())
            .expect("orchestrator construction succeeds")
    }
}
