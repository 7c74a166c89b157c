//! Test doubles and common utilities for engine contract tests
//!
//! `InMemoryRegistrar` behaves like a whole-set registrar: a submission
//! replaces the domain's record set, so records omitted from a submission
//! disappear exactly as they would at the real registrar.

#![allow(dead_code)]

use ddns_core::error::{Error, Result};
use ddns_core::traits::DnsProvider;
use ddns_core::{DomainName, HostRecord, MappingEntry, RecordSet, SubmissionResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// How the registrar should answer calls for one domain
#[derive(Debug, Clone)]
pub enum Behaviour {
    /// Fetch and submit succeed
    Healthy,
    /// Fetch fails with a transport error
    Unreachable,
    /// Fetch fails with a decode error
    Garbled,
    /// Submission is rejected with the given messages
    Rejects(Vec<String>),
}

#[derive(Default)]
struct Shared {
    zones: Mutex<HashMap<String, RecordSet>>,
    behaviours: Mutex<HashMap<String, Behaviour>>,
    submissions: Mutex<Vec<(String, RecordSet)>>,
    fetch_call_count: AtomicUsize,
    submit_call_count: AtomicUsize,
    dry_run: AtomicBool,
}

/// A mock DnsProvider holding record sets in memory
#[derive(Clone, Default)]
pub struct InMemoryRegistrar {
    shared: Arc<Shared>,
}

impl InMemoryRegistrar {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the record set of `domain`
    pub fn with_zone(self, domain: &str, records: Vec<HostRecord>) -> Self {
        self.shared
            .zones
            .lock()
            .unwrap()
            .insert(domain.to_string(), RecordSet::from(records));
        self
    }

    /// Set how calls for `domain` behave
    pub fn with_behaviour(self, domain: &str, behaviour: Behaviour) -> Self {
        self.shared
            .behaviours
            .lock()
            .unwrap()
            .insert(domain.to_string(), behaviour);
        self
    }

    /// Accept submissions without applying or recording them
    pub fn with_dry_run(self) -> Self {
        self.shared.dry_run.store(true, Ordering::SeqCst);
        self
    }

    /// Current record set of `domain`
    pub fn zone(&self, domain: &str) -> RecordSet {
        self.shared
            .zones
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or_default()
    }

    /// Every submission, in order, as (domain, records)
    pub fn submissions(&self) -> Vec<(String, RecordSet)> {
        self.shared.submissions.lock().unwrap().clone()
    }

    /// Get the number of times fetch_records() was called
    pub fn fetch_call_count(&self) -> usize {
        self.shared.fetch_call_count.load(Ordering::SeqCst)
    }

    /// Get the number of times submit_records() was called
    pub fn submit_call_count(&self) -> usize {
        self.shared.submit_call_count.load(Ordering::SeqCst)
    }

    fn behaviour(&self, domain: &str) -> Behaviour {
        self.shared
            .behaviours
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .unwrap_or(Behaviour::Healthy)
    }
}

#[async_trait::async_trait]
impl DnsProvider for InMemoryRegistrar {
    async fn fetch_records(&self, domain: &DomainName) -> Result<RecordSet> {
        self.shared.fetch_call_count.fetch_add(1, Ordering::SeqCst);
        let key = domain.to_string();

        match self.behaviour(&key) {
            Behaviour::Unreachable => Err(Error::transport("connection refused")),
            Behaviour::Garbled => Err(Error::decode("not XML", "<<<")),
            _ => Ok(self.zone(&key)),
        }
    }

    async fn submit_records(
        &self,
        domain: &DomainName,
        records: &RecordSet,
    ) -> Result<SubmissionResult> {
        self.shared.submit_call_count.fetch_add(1, Ordering::SeqCst);
        if self.is_dry_run() {
            return Ok(SubmissionResult::succeeded(""));
        }
        let key = domain.to_string();

        self.shared
            .submissions
            .lock()
            .unwrap()
            .push((key.clone(), records.clone()));

        match self.behaviour(&key) {
            Behaviour::Rejects(errors) => Ok(SubmissionResult::failed(errors, "<rejected/>")),
            _ => {
                self.shared
                    .zones
                    .lock()
                    .unwrap()
                    .insert(key, records.clone());
                Ok(SubmissionResult::succeeded("<ok/>"))
            }
        }
    }

    fn provider_name(&self) -> &'static str {
        "in-memory"
    }

    fn is_dry_run(&self) -> bool {
        self.shared.dry_run.load(Ordering::SeqCst)
    }
}

/// Build a mapping entry from "sub" and "example.com"
pub fn mapping(subdomain: &str, domain: &str) -> MappingEntry {
    MappingEntry::new(subdomain, DomainName::parse(domain).expect("valid test domain"))
}

/// Shorthand for a host record
pub fn host(name: &str, record_type: &str, address: &str, ttl: &str) -> HostRecord {
    HostRecord::new(name, record_type, address, ttl)
}
