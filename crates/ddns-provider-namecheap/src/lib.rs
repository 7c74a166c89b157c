// # Namecheap DNS Provider
//
// This crate provides the Namecheap DNS provider for the DDNS updater.
//
// ## How Namecheap updates work
//
// The Namecheap API has no per-record update call. `getHosts` returns every
// host record of a domain and `setHosts` replaces them all at once, so an
// update is a read-modify-write of the whole set:
//
// 1. `getHosts` (SLD/TLD) → XML host list → `RecordSet`
// 2. engine reconciles the desired address into the set
// 3. `setHosts` with every record as indexed form fields → XML result
//
// A `setHosts` call that omits a record deletes it.
//
// ## Provider rules
//
// - One HTTP request per trait call, no retries, no caching
// - Credentials never appear in logs or Debug output
// - Dry-run mode performs the `getHosts` call but only logs the `setHosts`
//   request it would have sent
//
// ## API Reference
//
// - https://www.namecheap.com/support/api/methods/domains-dns/get-hosts/
// - https://www.namecheap.com/support/api/methods/domains-dns/set-hosts/

pub mod client;
pub mod codec;

use async_trait::async_trait;
use ddns_core::traits::DnsProvider;
use ddns_core::{DomainName, RecordSet, Result, SubmissionResult, UpdaterConfig};

pub use client::{NamecheapClient, PRODUCTION_ENDPOINT, SANDBOX_ENDPOINT};
pub use codec::Command;

/// Namecheap DNS provider
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform `getHosts` requests
/// - Log the intended `setHosts` parameters (API key redacted)
/// - **NOT** modify any records
#[derive(Debug)]
pub struct NamecheapProvider {
    client: NamecheapClient,
    dry_run: bool,
}

impl NamecheapProvider {
    /// Create a provider over an existing client
    pub fn new(client: NamecheapClient, dry_run: bool) -> Self {
        Self { client, dry_run }
    }

    /// Create a provider from the run configuration
    pub fn from_config(config: &UpdaterConfig, dry_run: bool) -> Result<Self> {
        let client = NamecheapClient::from_config(&config.credentials, &config.registrar)?;

        if dry_run {
            tracing::warn!("Namecheap provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self::new(client, dry_run))
    }
}

#[async_trait]
impl DnsProvider for NamecheapProvider {
    async fn fetch_records(&self, domain: &DomainName) -> Result<RecordSet> {
        let raw = self.client.fetch_records(domain).await?;
        codec::decode(&raw)
    }

    async fn submit_records(
        &self,
        domain: &DomainName,
        records: &RecordSet,
    ) -> Result<SubmissionResult> {
        if self.dry_run {
            let params = codec::encode(
                domain,
                Command::SetHosts,
                self.client.credentials(),
                records,
            );
            tracing::info!(
                "[DRY-RUN] Would send {} to {} with {} record(s): {:?}",
                Command::SetHosts,
                self.client.endpoint(),
                records.len(),
                codec::redacted(&params)
            );
            return Ok(SubmissionResult::succeeded(""));
        }

        let raw = self.client.submit_records(domain, records).await?;
        Ok(codec::decode_result(&raw))
    }

    fn provider_name(&self) -> &'static str {
        "namecheap"
    }

    fn is_dry_run(&self) -> bool {
        self.dry_run
    }
}
