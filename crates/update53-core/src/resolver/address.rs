//! Public address resolution
//!
//! Exactly one source is consulted per resolution, chosen by precedence:
//!
//! 1. force ip override (no network call)
//! 2. source URL
//! 3. instance metadata service
//!
//! Whatever text the chosen source returns must parse as an IP literal.

use crate::error::{Error, Result};
use crate::pending::Pending;
use crate::traits::{AddressSource, FixedAddress};
use std::net::IpAddr;
use std::sync::Arc;

/// The network-backed sources an [`AddressResolver`] can fall back to
#[derive(Clone)]
pub struct AddressSources {
    /// Operator supplied URL source, if configured
    pub url: Option<Arc<dyn AddressSource>>,
    /// Instance metadata source, used when nothing else is configured
    pub metadata: Arc<dyn AddressSource>,
}

impl AddressSources {
    /// Only the metadata service
    pub fn metadata(metadata: Arc<dyn AddressSource>) -> Self {
        Self {
            url: None,
            metadata,
        }
    }

    /// Add a URL source
    pub fn with_url(mut self, url: Arc<dyn AddressSource>) -> Self {
        self.url = Some(url);
        self
    }
}

/// Resolves the current public address
pub struct AddressResolver {
    force_ip: Option<Arc<dyn AddressSource>>,
    sources: AddressSources,
}

impl AddressResolver {
    /// Create a resolver
    ///
    /// An empty `force_ip` counts as absent.
    pub fn new(force_ip: Option<&str>, sources: AddressSources) -> Self {
        let force_ip = force_ip
            .filter(|ip| !ip.is_empty())
            .map(|ip| Arc::new(FixedAddress::new(ip)) as Arc<dyn AddressSource>);

        Self { force_ip, sources }
    }

    /// The source the next resolution will use
    pub fn selected_source(&self) -> Arc<dyn AddressSource> {
        self.force_ip
            .as_ref()
            .or(self.sources.url.as_ref())
            .unwrap_or(&self.sources.metadata)
            .clone()
    }

    /// Launch a resolution on its own task
    pub fn resolve(&self) -> Pending<IpAddr> {
        let source = self.selected_source();

        Pending::spawn("address resolver", async move {
            tracing::debug!("Fetching public ip from {}", source.describe());
            let candidate = source.fetch().await?;
            parse_address(&candidate)
        })
    }
}

/// Parse a candidate address, IPv4 or IPv6
pub fn parse_address(candidate: &str) -> Result<IpAddr> {
    candidate.parse().map_err(|_| {
        Error::validation(format!("unable to parse public ip from: {}", candidate))
    })
}
