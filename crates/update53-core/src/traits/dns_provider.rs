// # DNS Provider Trait
//
// Defines the interface for the authoritative DNS service.
//
// ## Implementations
//
// - Route 53: `update53-provider-route53` crate
//
// ## Usage
//
// ```rust,ignore
// use update53_core::DnsProvider;
// use update53_core::traits::ChangeRequest;
//
// #[tokio::main]
// async fn main() -> update53_core::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let zones = provider.list_zones().await?;
//     let change = ChangeRequest::upsert_a(&zones[0].id, "home.example.com.", "203.0.113.5");
//     provider.upsert_record(&change).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::fmt;

/// A hosted zone as returned by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Zone {
    /// Fully qualified zone name, trailing '.' included
    pub name: String,
    /// Opaque provider id
    pub id: String,
}

impl Zone {
    pub fn new(name: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: id.into(),
        }
    }

    /// True when this zone is authoritative for `hostname` by suffix
    ///
    /// Both sides are expected in trailing-dot form.
    pub fn covers(&self, hostname: &str) -> bool {
        hostname.ends_with(&self.name)
    }
}

/// DNS record type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordType {
    /// IPv4 address record
    A,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => f.write_str("A"),
        }
    }
}

/// Change action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeAction {
    /// Create the record, or replace it if it exists
    Upsert,
}

impl fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChangeAction::Upsert => f.write_str("UPSERT"),
        }
    }
}

/// A single record change, built fresh for each cycle that needs one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeRequest {
    /// Hosted zone id
    pub zone_id: String,
    /// Record name, trailing '.' included
    pub name: String,
    /// Record type
    pub record_type: RecordType,
    /// Record value
    pub value: String,
    /// Time-to-live in seconds
    pub ttl: u32,
    /// Change batch comment
    pub comment: String,
    /// What to do with the record
    pub action: ChangeAction,
}

impl ChangeRequest {
    /// Build the standard `A` record upsert
    pub fn upsert_a(
        zone_id: impl Into<String>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            zone_id: zone_id.into(),
            name: name.into(),
            record_type: RecordType::A,
            value: value.into(),
            ttl: crate::config::RECORD_TTL,
            comment: crate::config::CHANGE_COMMENT.to_string(),
            action: ChangeAction::Upsert,
        }
    }
}

/// What the provider reported about an accepted change
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeReceipt {
    /// Provider change id, if one was issued
    pub id: Option<String>,
    /// Provider change status (e.g. "PENDING")
    pub status: Option<String>,
}

/// Trait for DNS provider implementations
///
/// # Contract
///
/// - `list_zones` makes one listing call and returns the first page only,
///   in provider order
/// - `upsert_record` submits exactly one change; success means the provider
///   accepted it
/// - No retries and no caching; the orchestrator decides when to call again
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List hosted zones (first page)
    async fn list_zones(&self) -> Result<Vec<Zone>, crate::Error>;

    /// Submit one record change
    async fn upsert_record(&self, change: &ChangeRequest) -> Result<ChangeReceipt, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
