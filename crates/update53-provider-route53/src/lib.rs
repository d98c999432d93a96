// # Route 53 DNS Provider
//
// This crate provides the Amazon Route 53 implementation of
// `update53_core::DnsProvider`.
//
// ## Behavior
//
// - One API call per trait method; no retries, no caching
// - Credentials and region come from the standard AWS provider chain
//   (environment, profile, instance role). Route 53 is a global service, so
//   the region falls back to us-east-1 when none is configured
// - Every operation is bounded by an operation timeout
// - Dry-run mode lists zones normally but only logs the change it would submit
//
// ## API Reference
//
// - ListHostedZones: GET `/2013-04-01/hostedzone`
// - ChangeResourceRecordSets: POST `/2013-04-01/hostedzone/{Id}/rrset`
//
// ## Known Limitation
//
// `list_zones` reads only the first page (at most 100 zones). A truncated
// listing is logged as a warning but not followed.

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_config::meta::region::RegionProviderChain;
use aws_config::timeout::TimeoutConfig;
use aws_sdk_route53::Client;
use aws_sdk_route53::error::DisplayErrorContext;
use aws_sdk_route53::types::{
    Change, ChangeAction as SdkChangeAction, ChangeBatch, ResourceRecord, ResourceRecordSet,
    RrType,
};
use std::time::Duration;
use update53_core::traits::{ChangeAction, ChangeReceipt, ChangeRequest, DnsProvider, RecordType, Zone};
use update53_core::{Error, Result};

/// Default timeout for a Route 53 operation (30 seconds)
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(30);

/// Region used when the provider chain has none
const FALLBACK_REGION: &str = "us-east-1";

/// Prefix Route 53 puts on hosted zone ids in listings
const HOSTED_ZONE_PREFIX: &str = "/hostedzone/";

const PROVIDER_NAME: &str = "route53";

/// Route 53 DNS provider
///
/// Holds no state beyond the SDK client.
#[derive(Debug, Clone)]
pub struct Route53Provider {
    client: Client,
    dry_run: bool,
}

impl Route53Provider {
    /// Wrap an existing SDK client
    pub fn new(client: Client, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Build a client from the default AWS configuration chain
    ///
    /// # Parameters
    ///
    /// - `operation_timeout`: upper bound for each API call, retries included
    /// - `dry_run`: if true, log changes instead of submitting them
    pub async fn from_env(operation_timeout: Duration, dry_run: bool) -> Self {
        let region = RegionProviderChain::default_provider().or_else(FALLBACK_REGION);
        let timeouts = TimeoutConfig::builder()
            .operation_timeout(operation_timeout)
            .build();

        let sdk_config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .timeout_config(timeouts)
            .load()
            .await;

        if dry_run {
            tracing::warn!("Route 53 provider running in DRY-RUN mode - no changes will be made");
        }

        Self::new(Client::new(&sdk_config), dry_run)
    }

    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}

#[async_trait]
impl DnsProvider for Route53Provider {
    async fn list_zones(&self) -> Result<Vec<Zone>> {
        let output = self
            .client
            .list_hosted_zones()
            .send()
            .await
            .map_err(|e| {
                Error::provider(
                    PROVIDER_NAME,
                    format!("ListHostedZones failed: {}", DisplayErrorContext(&e)),
                )
            })?;

        if output.is_truncated() {
            tracing::warn!(
                "hosted zone listing is truncated; zones past the first page are not considered"
            );
        }

        let zones = output
            .hosted_zones()
            .iter()
            .map(|zone| Zone::new(zone.name(), strip_zone_prefix(zone.id())))
            .collect();

        Ok(zones)
    }

    async fn upsert_record(&self, change: &ChangeRequest) -> Result<ChangeReceipt> {
        let batch = change_batch(change)?;

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would submit {} {} {} -> {} (ttl {}) to zone {}",
                change.action,
                change.record_type,
                change.name,
                change.value,
                change.ttl,
                change.zone_id
            );
            return Ok(ChangeReceipt {
                id: None,
                status: Some("DRY-RUN".to_string()),
            });
        }

        tracing::debug!(
            "Submitting {} {} {} -> {} to zone {}",
            change.action,
            change.record_type,
            change.name,
            change.value,
            change.zone_id
        );

        let output = self
            .client
            .change_resource_record_sets()
            .hosted_zone_id(&change.zone_id)
            .change_batch(batch)
            .send()
            .await
            .map_err(|e| {
                Error::provider(
                    PROVIDER_NAME,
                    format!("ChangeResourceRecordSets failed: {}", DisplayErrorContext(&e)),
                )
            })?;

        let receipt = match output.change_info() {
            Some(info) => ChangeReceipt {
                id: Some(info.id().to_string()),
                status: Some(info.status().as_str().to_string()),
            },
            None => ChangeReceipt::default(),
        };

        tracing::debug!("Change accepted: {:?}", receipt);
        Ok(receipt)
    }

    fn provider_name(&self) -> &'static str {
        PROVIDER_NAME
    }
}

/// Translate a change request into a Route 53 change batch
fn change_batch(change: &ChangeRequest) -> Result<ChangeBatch> {
    let invalid = |e: aws_sdk_route53::error::BuildError| {
        Error::provider(PROVIDER_NAME, format!("invalid change request: {}", e))
    };

    let record = ResourceRecord::builder()
        .value(&change.value)
        .build()
        .map_err(invalid)?;

    let record_set = ResourceRecordSet::builder()
        .name(&change.name)
        .r#type(rr_type(change.record_type))
        .ttl(i64::from(change.ttl))
        .resource_records(record)
        .build()
        .map_err(invalid)?;

    let sdk_change = Change::builder()
        .action(change_action(change.action))
        .resource_record_set(record_set)
        .build()
        .map_err(invalid)?;

    ChangeBatch::builder()
        .changes(sdk_change)
        .comment(&change.comment)
        .build()
        .map_err(invalid)
}

fn rr_type(record_type: RecordType) -> RrType {
    match record_type {
        RecordType::A => RrType::A,
    }
}

fn change_action(action: ChangeAction) -> SdkChangeAction {
    match action {
        ChangeAction::Upsert => SdkChangeAction::Upsert,
    }
}

/// `/hostedzone/Z123` -> `Z123`
fn strip_zone_prefix(id: &str) -> String {
    id.strip_prefix(HOSTED_ZONE_PREFIX).unwrap_or(id).to_string()
}
