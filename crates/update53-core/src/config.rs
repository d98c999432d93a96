//! Configuration types for update53
//!
//! [`UpdateConfig`] is built once at startup and is immutable afterwards.
//! The last applied address is not part of it; that lives in the
//! orchestrator.

use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::time::Duration;

/// Record TTL submitted with every change (seconds)
pub const RECORD_TTL: u32 = 300;

/// Comment attached to every change batch
pub const CHANGE_COMMENT: &str = "Update53";

/// Default time between daemon cycles (5 minutes)
pub const DEFAULT_INTERVAL_SECS: u64 = 300;

/// Default timeout for address source requests
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Main update53 configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Use this address instead of discovering one
    #[serde(default)]
    pub force_ip: Option<String>,

    /// Fetch the public address as plain text from this URL
    #[serde(default)]
    pub ip_source_url: Option<String>,

    /// Record to update; normalized to end with '.'
    pub hostname: String,

    /// Hosted zone id, if known. Skips the zone listing call.
    #[serde(default)]
    pub hosted_zone_id: Option<String>,

    /// Keep running and re-check every `interval_secs`
    #[serde(default)]
    pub daemon: bool,

    /// Log status information
    #[serde(default)]
    pub verbose: bool,

    /// Log scheduling detail; implies `verbose`
    #[serde(default)]
    pub debug: bool,

    /// Seconds between daemon cycles
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// How a hostname is matched against hosted zone names
    #[serde(default)]
    pub zone_match: ZoneMatch,
}

impl UpdateConfig {
    /// Create a configuration for a hostname with everything else defaulted
    pub fn new(hostname: impl Into<String>) -> Self {
        Self {
            force_ip: None,
            ip_source_url: None,
            hostname: normalize_hostname(&hostname.into()),
            hosted_zone_id: None,
            daemon: false,
            verbose: false,
            debug: false,
            interval_secs: default_interval_secs(),
            zone_match: ZoneMatch::default(),
        }
    }

    /// Use a fixed address
    pub fn with_force_ip(mut self, ip: impl Into<String>) -> Self {
        self.force_ip = non_empty(Some(ip.into()));
        self
    }

    /// Fetch the address from a URL
    pub fn with_ip_source_url(mut self, url: impl Into<String>) -> Self {
        self.ip_source_url = non_empty(Some(url.into()));
        self
    }

    /// Use a known hosted zone id
    pub fn with_hosted_zone_id(mut self, id: impl Into<String>) -> Self {
        self.hosted_zone_id = non_empty(Some(id.into()));
        self
    }

    /// Run as a daemon
    pub fn with_daemon(mut self, daemon: bool) -> Self {
        self.daemon = daemon;
        self
    }

    /// Set the zone matching policy
    pub fn with_zone_match(mut self, zone_match: ZoneMatch) -> Self {
        self.zone_match = zone_match;
        self
    }

    /// Enable debug output, which also turns on verbose output
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self.verbose |= debug;
        self
    }

    /// Whether info-level status messages are wanted
    pub fn is_verbose(&self) -> bool {
        self.verbose || self.debug
    }

    /// Daemon tick period
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Validate the configuration
    ///
    /// Only cross-field problems are checked here. Hostname and override
    /// address checks are repeated by every cycle so that a bad value
    /// fails the cycle rather than the process.
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.force_ip().is_some() && self.ip_source_url().is_some() {
            return Err(crate::Error::config(
                "can not supply both a force ip and an ip source url",
            ));
        }

        if self.interval_secs == 0 {
            return Err(crate::Error::config("interval must be > 0"));
        }

        if let Some(url) = self.ip_source_url()
            && !url.starts_with("http://")
            && !url.starts_with("https://")
        {
            return Err(crate::Error::config(format!(
                "ip source url must use http or https. Got: {}",
                url
            )));
        }

        Ok(())
    }

    /// Override address, ignoring empty values
    pub fn force_ip(&self) -> Option<&str> {
        self.force_ip.as_deref().filter(|s| !s.is_empty())
    }

    /// Source URL, ignoring empty values
    pub fn ip_source_url(&self) -> Option<&str> {
        self.ip_source_url.as_deref().filter(|s| !s.is_empty())
    }

    /// Hosted zone id, ignoring empty values
    pub fn hosted_zone_id(&self) -> Option<&str> {
        self.hosted_zone_id.as_deref().filter(|s| !s.is_empty())
    }

    /// Parse the override address, if one is set
    pub fn parsed_force_ip(&self) -> Result<Option<IpAddr>, crate::Error> {
        match self.force_ip() {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                crate::Error::validation(format!("invalid force ip supplied: {}", raw))
            }),
        }
    }
}

/// Zone matching policy
///
/// `First` takes the first zone in listing order whose name is a suffix of
/// the hostname. With nested zones (`example.com.` and `sub.example.com.`)
/// that can be the parent zone; `Longest` picks the most specific one.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneMatch {
    /// First suffix match in provider order
    #[default]
    First,
    /// Longest suffix match
    Longest,
}

/// Append the trailing '.' so suffix checks line up with zone names
pub fn normalize_hostname(hostname: &str) -> String {
    if hostname.is_empty() || hostname.ends_with('.') {
        hostname.to_string()
    } else {
        format!("{}.", hostname)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}
