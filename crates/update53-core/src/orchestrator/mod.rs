//! Update orchestrator
//!
//! The UpdateOrchestrator is responsible for:
//! - Validating the hostname and override address for each cycle
//! - Launching the address and zone resolvers
//! - Skipping the update when the address has not changed
//! - Submitting the record upsert
//! - Remembering the address only after the provider accepted it
//!
//! ## Cycle Flow
//!
//! ```text
//! ┌─────────────────┐   IpAddr    ┌──────────────┐  changed  ┌──────────────┐
//! │ AddressResolver │────────────▶│ previous_ip? │──────────▶│ ZoneResolver │
//! └─────────────────┘             └──────────────┘           └──────────────┘
//!                                        │ same                     │ zone id
//!                                        ▼                          ▼
//!                                   Unchanged               ┌──────────────┐
//!                                                           │ DnsProvider  │
//!                                                           │ (UPSERT)     │
//!                                                           └──────────────┘
//! ```
//!
//! Address resolution always finishes before zone resolution starts; the
//! zone is only needed when the address changed.

use crate::config::{UpdateConfig, normalize_hostname};
use crate::error::{Error, Result};
use crate::resolver::{AddressResolver, AddressSources, ZoneResolver};
use crate::traits::{ChangeReceipt, ChangeRequest, DnsProvider};
use std::net::IpAddr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// How a successful cycle ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The public address matches the last applied one
    Unchanged {
        /// The current public address
        ip: IpAddr,
    },

    /// The record was upserted
    Updated {
        /// The new address
        ip: IpAddr,
        /// The address applied before this cycle, if any
        previous_ip: Option<IpAddr>,
        /// Zone the change was submitted to
        zone_id: String,
        /// What the provider reported
        receipt: ChangeReceipt,
    },
}

/// Runs update cycles and owns the last applied address
///
/// `previous_ip` is only touched from [`UpdateOrchestrator::run_cycle`],
/// which takes `&mut self`, so at most one cycle can be writing it.
pub struct UpdateOrchestrator {
    config: UpdateConfig,
    addresses: AddressResolver,
    zones: ZoneResolver,
    provider: Arc<dyn DnsProvider>,
    previous_ip: Option<IpAddr>,
}

impl UpdateOrchestrator {
    /// Create a new orchestrator
    ///
    /// # Parameters
    ///
    /// - `config`: validated here; conflicting options are a configuration error
    /// - `sources`: network address sources; must include a URL source when
    ///   `config.ip_source_url` is set
    /// - `provider`: DNS provider used for zone listing and upserts
    pub fn new(
        config: UpdateConfig,
        sources: AddressSources,
        provider: Arc<dyn DnsProvider>,
    ) -> Result<Self> {
        config.validate()?;

        if config.ip_source_url().is_some() && sources.url.is_none() {
            return Err(Error::config(
                "an ip source url is configured but no url source was supplied",
            ));
        }

        let addresses = AddressResolver::new(config.force_ip(), sources);
        let zones = ZoneResolver::new(
            Arc::clone(&provider),
            config.hosted_zone_id(),
            config.zone_match,
        );

        Ok(Self {
            config,
            addresses,
            zones,
            provider,
            previous_ip: None,
        })
    }

    /// The configuration this orchestrator runs with
    pub fn config(&self) -> &UpdateConfig {
        &self.config
    }

    /// Last address the provider accepted, `None` before the first success
    pub fn previous_ip(&self) -> Option<IpAddr> {
        self.previous_ip
    }

    /// Run one full update cycle
    ///
    /// # Returns
    ///
    /// - `Ok(CycleOutcome::Unchanged)`: address matches the last applied one
    /// - `Ok(CycleOutcome::Updated)`: the provider accepted the upsert
    /// - `Err(Error)`: the cycle failed; `previous_ip` is unchanged
    pub async fn run_cycle(&mut self) -> Result<CycleOutcome> {
        if self.config.hostname.is_empty() {
            return Err(Error::config("invalid hostname supplied"));
        }
        self.config.hostname = normalize_hostname(&self.config.hostname);

        // Cheap check before launching any work
        self.config.parsed_force_ip()?;

        let ip = self.addresses.resolve().await?;

        if self.previous_ip == Some(ip) {
            info!("public ip has not changed so not updating");
            return Ok(CycleOutcome::Unchanged { ip });
        }

        debug!(
            "public ip changed: {} -> {}",
            self.previous_ip
                .map(|ip| ip.to_string())
                .unwrap_or_else(|| "none".to_string()),
            ip
        );

        let zone_id = self.zones.resolve(&self.config.hostname).await?;

        if ip.is_ipv6() {
            warn!(
                "submitting IPv6 address {} as an A record for {}",
                ip, self.config.hostname
            );
        }

        let change = ChangeRequest::upsert_a(&zone_id, &self.config.hostname, ip.to_string());
        let receipt = self.provider.upsert_record(&change).await?;

        info!(
            "updated ip cache. new: {} old: {}",
            ip,
            self.previous_ip
                .map(|ip| ip.to_string())
                .unwrap_or_default()
        );

        let previous_ip = self.previous_ip.replace(ip);

        Ok(CycleOutcome::Updated {
            ip,
            previous_ip,
            zone_id,
            receipt,
        })
    }
}
