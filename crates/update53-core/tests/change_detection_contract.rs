//! Contract Test: Change Detection & Cache Commit
//!
//! Constraints verified:
//! - unchanged address ⇒ no zone lookup, no upsert
//! - the cached address is committed only after the provider accepted the change
//! - address failure ⇒ zone lookup and upsert never happen
//! - hostnames are submitted in trailing-dot form
//! - IPv6 addresses go out as A records in canonical text form
//!
//! If this test fails, someone has made the cache optimistic or reordered
//! the cycle.

mod common;

use common::*;
use std::net::IpAddr;
use update53_core::traits::{ChangeAction, ChangeRequest, RecordType};
use update53_core::{AddressSources, CycleOutcome, Error, UpdateConfig, UpdateOrchestrator};

#[tokio::test]
async fn end_to_end_force_ip_update() {
    let harness = Harness::new(MockDnsProvider::example_com());
    let config = UpdateConfig::new("home.example.com").with_force_ip("203.0.113.5");
    let mut orchestrator = harness.orchestrator(config);

    assert_eq!(orchestrator.previous_ip(), None);

    let outcome = orchestrator.run_cycle().await.expect("cycle succeeds");

    assert_eq!(
        harness.provider.changes(),
        vec![ChangeRequest {
            zone_id: "Z123".to_string(),
            name: "home.example.com.".to_string(),
            record_type: RecordType::A,
            value: "203.0.113.5".to_string(),
            ttl: 300,
            comment: "Update53".to_string(),
            action: ChangeAction::Upsert,
        }]
    );
    assert_eq!(
        orchestrator.previous_ip(),
        Some(IpAddr::from([203, 0, 113, 5]))
    );
    assert!(matches!(
        outcome,
        CycleOutcome::Updated { previous_ip: None, ref zone_id, .. } if zone_id == "Z123"
    ));
}

#[tokio::test]
async fn ipv6_override_is_submitted_as_canonical_a_record() {
    let harness = Harness::new(MockDnsProvider::example_com());
    let config = UpdateConfig::new("home.example.com").with_force_ip("2001:DB8::1");
    let mut orchestrator = harness.orchestrator(config);

    let outcome = orchestrator.run_cycle().await.expect("cycle succeeds");

    let changes = harness.provider.changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(changes[0].record_type, RecordType::A);
    assert_eq!(changes[0].value, "2001:db8::1");
    assert_eq!(changes[0].zone_id, "Z123");

    let expected: IpAddr = "2001:db8::1".parse().unwrap();
    assert_eq!(orchestrator.previous_ip(), Some(expected));
    assert!(matches!(outcome, CycleOutcome::Updated { ip, .. } if ip == expected));
}

#[tokio::test]
async fn unchanged_address_performs_one_upsert() {
    let harness = Harness::new(MockDnsProvider::example_com());
    let mut orchestrator = harness.orchestrator(UpdateConfig::new("home.example.com"));

    let first = orchestrator.run_cycle().await.unwrap();
    let second = orchestrator.run_cycle().await.unwrap();

    assert!(matches!(first, CycleOutcome::Updated { .. }));
    assert_eq!(
        second,
        CycleOutcome::Unchanged {
            ip: IpAddr::from([198, 51, 100, 20])
        }
    );
    assert_eq!(harness.provider.upsert_call_count(), 1);
    assert_eq!(
        harness.provider.list_call_count(),
        1,
        "no zone lookup when nothing changed"
    );
    assert_eq!(harness.metadata.fetch_count(), 2, "address is checked every cycle");
}

#[tokio::test]
async fn failed_upsert_does_not_poison_cache() {
    let harness = Harness::new(MockDnsProvider::example_com());
    let mut orchestrator = harness.orchestrator(UpdateConfig::new("home.example.com"));

    harness.provider.set_fail_upserts(true);
    let err = orchestrator.run_cycle().await.unwrap_err();
    assert!(matches!(err, Error::Provider { .. }));
    assert_eq!(orchestrator.previous_ip(), None);

    // Same address again: must retry, not treat it as applied
    harness.provider.set_fail_upserts(false);
    let outcome = orchestrator.run_cycle().await.unwrap();

    assert!(matches!(outcome, CycleOutcome::Updated { .. }));
    assert_eq!(harness.provider.upsert_call_count(), 2);
    assert_eq!(
        orchestrator.previous_ip(),
        Some(IpAddr::from([198, 51, 100, 20]))
    );
}

#[tokio::test]
async fn failed_upsert_keeps_last_good_address() {
    let harness = Harness::new(MockDnsProvider::example_com());
    let mut orchestrator = harness.orchestrator(UpdateConfig::new("home.example.com"));

    orchestrator.run_cycle().await.unwrap();

    harness.metadata.set_address("198.51.100.99");
    harness.provider.set_fail_upserts(true);
    assert!(orchestrator.run_cycle().await.is_err());

    assert_eq!(
        orchestrator.previous_ip(),
        Some(IpAddr::from([198, 51, 100, 20]))
    );
}

#[tokio::test]
async fn address_failure_short_circuits() {
    let harness = Harness::new(MockDnsProvider::example_com());
    let failing = MockAddressSource::failing("metadata");
    let config = UpdateConfig::new("home.example.com");

    let mut orchestrator = UpdateOrchestrator::new(
        config,
        AddressSources::metadata(failing.shared()),
        harness.provider.shared(),
    )
    .unwrap();

    let err = orchestrator.run_cycle().await.unwrap_err();

    assert!(matches!(err, Error::Network { .. }));
    assert_eq!(harness.provider.list_call_count(), 0);
    assert_eq!(harness.provider.upsert_call_count(), 0);
}

#[tokio::test]
async fn zone_failure_leaves_cache_untouched() {
    let harness = Harness::new(MockDnsProvider::example_com());
    let mut orchestrator = harness.orchestrator(UpdateConfig::new("home.example.org"));

    let err = orchestrator.run_cycle().await.unwrap_err();

    assert!(matches!(err, Error::NotFound(_)));
    assert_eq!(harness.provider.upsert_call_count(), 0);
    assert_eq!(orchestrator.previous_ip(), None);
}

#[tokio::test]
async fn malformed_force_ip_fails_before_any_work() {
    let harness = Harness::new(MockDnsProvider::example_com());
    let config = UpdateConfig::new("home.example.com").with_force_ip("999.1.1.1");
    let mut orchestrator = harness.orchestrator(config);

    let err = orchestrator.run_cycle().await.unwrap_err();

    assert_eq!(err.to_string(), "invalid force ip supplied: 999.1.1.1");
    assert_eq!(harness.provider.list_call_count(), 0);
    assert_eq!(harness.metadata.fetch_count(), 0);
}

#[tokio::test]
async fn hostname_is_normalized_before_matching_and_submission() {
    let harness = Harness::new(MockDnsProvider::example_com());
    let mut config = UpdateConfig::new("example.com");
    // Bypass the constructor's normalization to exercise the cycle's
    config.hostname = "example.com".to_string();
    let mut orchestrator = harness.orchestrator(config);

    orchestrator.run_cycle().await.unwrap();

    assert_eq!(orchestrator.config().hostname, "example.com.");
    assert_eq!(harness.provider.changes()[0].name, "example.com.");
}

#[tokio::test]
async fn explicit_zone_id_is_submitted_verbatim() {
    let harness = Harness::new(MockDnsProvider::example_com());
    let config = UpdateConfig::new("home.example.com").with_hosted_zone_id("ZKNOWN");
    let mut orchestrator = harness.orchestrator(config);

    orchestrator.run_cycle().await.unwrap();

    assert_eq!(harness.provider.list_call_count(), 0);
    assert_eq!(harness.provider.changes()[0].zone_id, "ZKNOWN");
}

#[test]
fn force_ip_and_url_together_fail_at_startup() {
    let harness = Harness::new(MockDnsProvider::example_com());
    let config = UpdateConfig::new("home.example.com")
        .with_force_ip("203.0.113.5")
        .with_ip_source_url("https://ip.example/");

    let result = UpdateOrchestrator::new(config, harness.sources(true), harness.provider.shared());

    assert!(matches!(result, Err(Error::Config(_))));
    assert_eq!(harness.url.fetch_count(), 0);
    assert_eq!(harness.provider.upsert_call_count(), 0);
}
