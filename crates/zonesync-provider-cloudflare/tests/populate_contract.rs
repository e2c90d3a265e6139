//! Contract Test: Populating From Live Records
//!
//! Constraints verified:
//! - Wire records are grouped by name and type into canonical records
//! - A root CNAME is read back as ALIAS
//! - Record types the provider does not manage are ignored
//! - A missing zone populates nothing and reports it does not exist
//! - Odd records already on the service never block planning
//! - Record names match their live copies regardless of case

mod common;

use common::*;
use std::sync::Arc;
use zonesync_core::{Change, MxValue, Provider, Record, RecordData, RecordType, Source, Zone};
use zonesync_provider_cloudflare::CloudflareProvider;

#[tokio::test]
async fn live_records_become_canonical_records() {
    let fake = Arc::new(FakeCloudflare::new());
    let zone_id = fake.seed_zone("example.com");
    fake.seed_record(&zone_id, "example.com", "CNAME", 300, "lb.example.net");
    fake.seed_record(&zone_id, "www.example.com", "A", 300, "192.0.2.2");
    fake.seed_record(&zone_id, "www.example.com", "A", 600, "192.0.2.1");
    fake.seed_record(&zone_id, "docs.example.com", "CNAME", 300, "pages.example.net");
    fake.seed_record(&zone_id, "txt.example.com", "TXT", 300, "a;b");
    fake.seed_mx(&zone_id, "example.com", 300, 10, "mx.example.com");
    fake.seed_record(&zone_id, "_sip._tcp.example.com", "SRV", 300, "10 5060 sip.example.com");

    let provider = CloudflareProvider::with_api(fake.clone(), 120);
    let mut zone = Zone::new(ZONE);
    assert!(provider.populate(&mut zone, false, false).await.unwrap());
    assert_eq!(zone.len(), 5);

    let root = zone.get("", RecordType::Alias).unwrap();
    assert_eq!(root.data(), &RecordData::Alias("lb.example.net.".into()));
    assert!(zone.get("", RecordType::Cname).is_none());

    let www = zone.get("www", RecordType::A).unwrap();
    assert_eq!(www.ttl(), 300, "first listed record's TTL represents the set");
    assert_eq!(
        www.data(),
        &RecordData::A(vec!["192.0.2.1".into(), "192.0.2.2".into()])
    );

    assert_eq!(
        zone.get("docs", RecordType::Cname).unwrap().data(),
        &RecordData::Cname("pages.example.net.".into())
    );
    assert_eq!(
        zone.get("txt", RecordType::Txt).unwrap().data(),
        &RecordData::Txt(vec!["a\\;b".into()])
    );
    assert_eq!(
        zone.get("", RecordType::Mx).unwrap().data(),
        &RecordData::Mx(vec![MxValue::new(10, "mx.example.com.")])
    );
}

#[tokio::test]
async fn missing_zone_populates_nothing() {
    let fake = Arc::new(FakeCloudflare::new());
    let provider = CloudflareProvider::with_api(fake.clone(), 120);

    let mut zone = Zone::new(ZONE);
    assert!(!provider.populate(&mut zone, true, false).await.unwrap());
    assert!(zone.is_empty());
}

#[tokio::test]
async fn malformed_live_record_fails_populate() {
    let fake = Arc::new(FakeCloudflare::new());
    let zone_id = fake.seed_zone("example.com");
    // an MX without its priority
    fake.seed_record(&zone_id, "example.com", "MX", 300, "mx.example.com");

    let provider = CloudflareProvider::with_api(fake.clone(), 120);
    let mut zone = Zone::new(ZONE);
    assert!(matches!(
        provider.populate(&mut zone, false, false).await,
        Err(zonesync_core::Error::Codec(_))
    ));
}

#[tokio::test]
async fn escaped_semicolon_in_live_txt_does_not_block_planning() {
    let fake = Arc::new(FakeCloudflare::new());
    let zone_id = fake.seed_zone("example.com");
    fake.seed_record(&zone_id, "www.example.com", "A", 300, "192.0.2.1");
    fake.seed_record(&zone_id, "odd.example.com", "TXT", 300, "a\\;b");

    let provider = CloudflareProvider::with_api(fake.clone(), 120);
    let plan = provider.plan(&zone_of(vec![])).await.unwrap().unwrap();
    assert_eq!(plan.changes.len(), 2);
    assert!(plan.changes.iter().all(|c| matches!(c, Change::Delete { .. })));
}

#[tokio::test]
async fn invalid_live_record_is_read_leniently_when_planning() {
    let fake = Arc::new(FakeCloudflare::new());
    let zone_id = fake.seed_zone("example.com");
    fake.seed_record(&zone_id, "www.example.com", "A", 300, "192.0.2.1");
    fake.seed_record(&zone_id, "broken.example.com", "A", 300, "not-an-address");

    let provider = CloudflareProvider::with_api(fake.clone(), 120);
    let www = Record::new(ZONE, "www", 300, RecordData::A(vec!["192.0.2.1".into()]));
    let plan = provider.plan(&zone_of(vec![www])).await.unwrap().unwrap();

    assert!(matches!(&plan.changes[..], [Change::Delete { .. }]));
    assert_eq!(plan.changes[0].record().name(), "broken");
}

#[tokio::test]
async fn mixed_case_desired_names_are_in_sync_with_live() {
    let fake = Arc::new(FakeCloudflare::new());
    let zone_id = fake.seed_zone("example.com");
    fake.seed_record(&zone_id, "www.example.com", "A", 300, "192.0.2.1");

    let provider = CloudflareProvider::with_api(fake.clone(), 120);
    let mut desired = Zone::new("Example.COM");
    desired
        .add_record(
            Record::new("Example.COM", "WWW", 300, RecordData::A(vec!["192.0.2.1".into()])),
            false,
            false,
        )
        .unwrap();

    assert!(provider.plan(&desired).await.unwrap().is_none());
    assert!(fake.calls().is_empty());
    assert!(fake.created_zones().is_empty());
}
