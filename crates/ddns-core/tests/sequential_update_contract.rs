//! Contract Test: Sequential, Fresh-Fetch Processing
//!
//! Constraints verified:
//! - Mapping entries are processed in configuration order
//! - Every entry fetches a fresh record set (no caching across entries)
//! - Entries sharing a parent domain never lose each other's changes
//! - Events describe the run in order

mod common;

use common::*;
use ddns_core::{DdnsEngine, EngineEvent, EngineOptions, UpdateOutcome};
use std::net::Ipv4Addr;

#[tokio::test]
async fn entries_on_same_domain_see_each_others_changes() {
    let registrar = InMemoryRegistrar::new()
        .with_zone("example.com", vec![host("@", "A", "198.51.100.1", "1800")]);

    let (engine, _events) = DdnsEngine::new(
        Box::new(registrar.clone()),
        vec![mapping("home", "example.com"), mapping("api", "example.com")],
        EngineOptions::default(),
    )
    .unwrap();

    let report = engine.run(Ipv4Addr::new(5, 6, 7, 8)).await;

    assert!(report.all_succeeded());
    assert_eq!(registrar.fetch_call_count(), 2);
    assert_eq!(
        registrar.zone("example.com").as_slice(),
        &[
            host("@", "A", "198.51.100.1", "1800"),
            host("home", "A", "5.6.7.8", "60"),
            host("api", "A", "5.6.7.8", "60"),
        ]
    );

    // The second submission must carry the first entry's record
    let submissions = registrar.submissions();
    assert_eq!(submissions[1].1.len(), 3);
}

#[tokio::test]
async fn entries_are_processed_in_order() {
    let registrar = InMemoryRegistrar::new();

    let (engine, _events) = DdnsEngine::new(
        Box::new(registrar.clone()),
        vec![
            mapping("b", "example.org"),
            mapping("a", "example.com"),
            mapping("c", "example.net"),
        ],
        EngineOptions::default(),
    )
    .unwrap();

    let report = engine.run(Ipv4Addr::new(5, 6, 7, 8)).await;

    let processed: Vec<String> = report.results.iter().map(|r| r.entry.to_string()).collect();
    assert_eq!(
        processed,
        vec!["b.example.org", "a.example.com", "c.example.net"]
    );

    let submitted: Vec<String> = registrar
        .submissions()
        .into_iter()
        .map(|(domain, _)| domain)
        .collect();
    assert_eq!(submitted, vec!["example.org", "example.com", "example.net"]);
}

#[tokio::test]
async fn events_describe_the_run() {
    let registrar = InMemoryRegistrar::new()
        .with_zone("example.com", vec![host("home", "A", "1.2.3.4", "60")]);

    let (engine, mut events) = DdnsEngine::new(
        Box::new(registrar),
        vec![mapping("home", "example.com")],
        EngineOptions::default(),
    )
    .unwrap();

    let address = Ipv4Addr::new(5, 6, 7, 8);
    engine.run(address).await;

    let mut received = Vec::new();
    while let Ok(event) = events.try_recv() {
        received.push(event);
    }

    assert_eq!(
        received,
        vec![
            EngineEvent::Started { entries: 1 },
            EngineEvent::UpdateStarted {
                record: "home.example.com".to_string(),
                address,
            },
            EngineEvent::UpdateSucceeded {
                record: "home.example.com".to_string(),
                address,
                outcome: UpdateOutcome::Updated {
                    previous_address: "1.2.3.4".to_string()
                },
                dry_run: false,
            },
            EngineEvent::Finished {
                succeeded: 1,
                failed: 0,
            },
        ]
    );
}

#[tokio::test]
async fn dry_run_is_reported_and_changes_nothing() {
    let registrar = InMemoryRegistrar::new()
        .with_zone("example.com", vec![host("home", "A", "1.2.3.4", "60")])
        .with_dry_run();

    let (engine, mut events) = DdnsEngine::new(
        Box::new(registrar.clone()),
        vec![mapping("home", "example.com")],
        EngineOptions::default(),
    )
    .unwrap();

    let address = Ipv4Addr::new(5, 6, 7, 8);
    let report = engine.run(address).await;

    assert!(report.all_succeeded());
    assert!(registrar.submissions().is_empty());
    assert_eq!(registrar.zone("example.com").get(0).unwrap().address, "1.2.3.4");

    let mut succeeded = Vec::new();
    while let Ok(event) = events.try_recv() {
        if let EngineEvent::UpdateSucceeded { dry_run, .. } = event {
            succeeded.push(dry_run);
        }
    }
    assert_eq!(succeeded, vec![true]);
}

#[test]
fn engine_requires_mappings() {
    let result = DdnsEngine::new(
        Box::new(InMemoryRegistrar::new()),
        Vec::new(),
        EngineOptions::default(),
    );
    assert!(matches!(result, Err(ddns_core::Error::Config(_))));
}
