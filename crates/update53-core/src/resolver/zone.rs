//! Hosted zone resolution
//!
//! An explicit zone id short-circuits everything. Otherwise the provider's
//! zone listing is scanned for a zone whose name is a suffix of the
//! hostname.
//!
//! Only the first page of the listing is consulted. Accounts with more
//! zones than fit on one page will not find zones past that page.

use crate::config::ZoneMatch;
use crate::error::{Error, Result};
use crate::pending::Pending;
use crate::traits::{DnsProvider, Zone};
use std::sync::Arc;

/// Resolves the hosted zone id for a hostname
pub struct ZoneResolver {
    provider: Arc<dyn DnsProvider>,
    hosted_zone_id: Option<String>,
    policy: ZoneMatch,
}

impl ZoneResolver {
    /// Create a resolver
    ///
    /// An empty `hosted_zone_id` counts as absent.
    pub fn new(
        provider: Arc<dyn DnsProvider>,
        hosted_zone_id: Option<&str>,
        policy: ZoneMatch,
    ) -> Self {
        Self {
            provider,
            hosted_zone_id: hosted_zone_id
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            policy,
        }
    }

    /// Launch a resolution for a normalized (trailing '.') hostname
    pub fn resolve(&self, hostname: &str) -> Pending<String> {
        if let Some(ref id) = self.hosted_zone_id {
            tracing::debug!("Using pre-configured hosted zone id {}", id);
            return Pending::ready("zone resolver", Ok(id.clone()));
        }

        let provider = Arc::clone(&self.provider);
        let hostname = hostname.to_string();
        let policy = self.policy;

        Pending::spawn("zone resolver", async move {
            let zones = provider.list_zones().await?;
            tracing::debug!(
                "{} listed {} hosted zone(s)",
                provider.provider_name(),
                zones.len()
            );

            find_zone_id(&zones, &hostname, policy)
        })
    }
}

/// Pick the zone for `hostname` from a listing
///
/// `ZoneMatch::First` returns the first suffix match in listing order, so
/// a parent zone listed before a child zone wins even though the child is
/// more specific.
pub fn select_zone<'a>(zones: &'a [Zone], hostname: &str, policy: ZoneMatch) -> Option<&'a Zone> {
    let mut matches = zones.iter().filter(|zone| zone.covers(hostname));

    match policy {
        ZoneMatch::First => matches.next(),
        // max_by_key keeps the last maximum; rev() keeps the first
        ZoneMatch::Longest => matches.rev().max_by_key(|zone| zone.name.len()),
    }
}

/// Convenience wrapper returning an error on no match
pub fn find_zone_id(zones: &[Zone], hostname: &str, policy: ZoneMatch) -> Result<String> {
    select_zone(zones, hostname, policy)
        .map(|zone| zone.id.clone())
        .ok_or_else(|| Error::not_found("unable to find hosted domain details"))
}
