// # DNS Provider Trait
//
// Defines the interface for reading and replacing a domain's record set at
// a registrar.
//
// ## Implementations
//
// - Namecheap: `ddns-provider-namecheap` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::{DnsProvider, DomainName, reconcile};
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//     let domain = DomainName::parse("example.com")?;
//
//     let records = provider.fetch_records(&domain).await?;
//     let records = reconcile(records, "home", "5.6.7.8".parse()?);
//     provider.submit_records(&domain, &records).await?.into_result()?;
//
//     Ok(())
// }
// ```

use crate::record::{DomainName, RecordSet, SubmissionResult};
use async_trait::async_trait;

/// Trait for DNS provider implementations
///
/// Registrars of this kind have no per-record update call: the whole record
/// set of a domain is read, modified locally and written back in one
/// request. A submission that omits a record deletes it.
///
/// # Error contract
///
/// - Transport failures (connection, timeout, non-2xx) → `Error::Transport`
/// - Unparsable responses → `Error::Decode`
/// - Registrar-reported failures while fetching → `Error::Registrar`
///
/// A failed *submission* is not an `Err`: it is returned as a
/// [`SubmissionResult`] with `success == false` so the caller can report the
/// registrar's messages.
///
/// Providers must not retry; the engine decides what happens after a failure.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Fetch the complete, current record set of `domain`
    async fn fetch_records(&self, domain: &DomainName) -> Result<RecordSet, crate::Error>;

    /// Replace the record set of `domain` with `records`
    ///
    /// `records` must be the complete set; anything missing is deleted by
    /// the registrar.
    async fn submit_records(
        &self,
        domain: &DomainName,
        records: &RecordSet,
    ) -> Result<SubmissionResult, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;

    /// Whether submissions are only logged, never sent
    fn is_dry_run(&self) -> bool {
        false
    }
}
