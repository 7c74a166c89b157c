//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Fetching the current record set of each mapping entry's domain
//! - Reconciling the desired address into it
//! - Submitting the complete record set back to the registrar
//! - Reporting per-entry outcomes
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────┐
//!  Ipv4Addr ─────▶│ DdnsEngine   │────── EngineEvent ──────▶ (monitoring)
//!                 └──────────────┘
//!                        │  for each MappingEntry, in order
//!         ┌──────────────┼─────────────────┐
//!         ▼              ▼                 ▼
//! ┌──────────────┐ ┌────────────┐ ┌──────────────────┐
//! │ DnsProvider  │ │ reconcile  │ │ DnsProvider      │
//! │ (fetch)      │ │ (pure)     │ │ (submit)         │
//! └──────────────┘ └────────────┘ └──────────────────┘
//! ```
//!
//! ## Sequencing
//!
//! Entries are processed strictly one after another and every entry fetches
//! a fresh record set. Two entries on the same domain therefore never race
//! on the registrar's read-modify-write cycle, and the second one sees the
//! first one's change.

use crate::error::{Error, Result};
use crate::reconcile::{self, RecordChange};
use crate::record::MappingEntry;
use crate::traits::DnsProvider;
use std::net::Ipv4Addr;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Run started
    Started { entries: usize },

    /// Processing of one entry started
    UpdateStarted { record: String, address: Ipv4Addr },

    /// Record set submitted and accepted
    ///
    /// `dry_run` is set when the provider only logged the submission.
    UpdateSucceeded {
        record: String,
        address: Ipv4Addr,
        outcome: UpdateOutcome,
        dry_run: bool,
    },

    /// Record already had the address, nothing submitted
    UpdateSkipped { record: String, address: Ipv4Addr },

    /// Entry failed; the run continues with the next entry
    UpdateFailed { record: String, error: String },

    /// Run finished
    Finished { succeeded: usize, failed: usize },
}

/// Result of updating one mapping entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    /// An existing record's address was replaced
    Updated { previous_address: String },
    /// A new A record was appended
    Created,
    /// The record already carried the address (no submission)
    Unchanged,
}

/// Engine behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct EngineOptions {
    /// Submit even when the record already carries the address
    pub force: bool,
}

/// Outcome of one entry within a run
#[derive(Debug)]
pub struct EntryReport {
    pub entry: MappingEntry,
    pub result: Result<UpdateOutcome>,
}

/// Outcome of a full run
#[derive(Debug)]
pub struct RunReport {
    /// Address that was published
    pub address: Ipv4Addr,
    /// One report per mapping entry, in processing order
    pub results: Vec<EntryReport>,
}

impl RunReport {
    /// Number of entries that succeeded (including unchanged ones)
    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.result.is_ok()).count()
    }

    /// Number of entries that failed
    pub fn failed(&self) -> usize {
        self.results.len() - self.succeeded()
    }

    /// Whether every entry succeeded
    pub fn all_succeeded(&self) -> bool {
        self.failed() == 0
    }
}

/// Core DDNS engine
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Publish an address with [`DdnsEngine::run()`]
/// 3. Inspect the returned [`RunReport`] or the event stream
///
/// ## Failure isolation
///
/// A transport, decode or registrar failure aborts only the entry being
/// processed. No retries are performed.
pub struct DdnsEngine {
    /// DNS provider for reading and replacing record sets
    provider: Box<dyn DnsProvider>,

    /// Records this run is responsible for
    mappings: Vec<MappingEntry>,

    options: EngineOptions,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events.
    /// The channel holds every event of one run, so an undrained receiver never
    /// causes events to be dropped.
    pub fn new(
        provider: Box<dyn DnsProvider>,
        mappings: Vec<MappingEntry>,
        options: EngineOptions,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        if mappings.is_empty() {
            return Err(Error::config("No mapping entries configured"));
        }

        // Started + Finished, and two events per entry
        let (tx, rx) = mpsc::channel(mappings.len() * 2 + 2);

        let engine = Self {
            provider,
            mappings,
            options,
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Mapping entries in processing order
    pub fn mappings(&self) -> &[MappingEntry] {
        &self.mappings
    }

    /// Publish `address` for every mapping entry
    pub async fn run(&self, address: Ipv4Addr) -> RunReport {
        self.emit_event(EngineEvent::Started {
            entries: self.mappings.len(),
        });
        info!(
            "Publishing {} for {} record(s) via {}",
            address,
            self.mappings.len(),
            self.provider.provider_name()
        );

        let mut results = Vec::with_capacity(self.mappings.len());

        for entry in &self.mappings {
            let record = entry.to_string();
            self.emit_event(EngineEvent::UpdateStarted {
                record: record.clone(),
                address,
            });

            let result = self.update_entry(entry, address).await;

            match &result {
                Ok(UpdateOutcome::Unchanged) => {
                    info!("DNS record {} already points to {}", record, address);
                    self.emit_event(EngineEvent::UpdateSkipped { record, address });
                }
                Ok(outcome) => {
                    let dry_run = self.provider.is_dry_run();
                    if dry_run {
                        info!("[DRY-RUN] DNS record {} would be set to {}", record, address);
                    } else {
                        info!("DNS record updated successfully for {} to {}", record, address);
                    }
                    self.emit_event(EngineEvent::UpdateSucceeded {
                        record,
                        address,
                        outcome: outcome.clone(),
                        dry_run,
                    });
                }
                Err(e) => {
                    error!("Failed to update DNS record for {}: {}", record, e);
                    if let Some(payload) = e.payload() {
                        error!("Registrar response for {}: {}", record, payload);
                    }
                    self.emit_event(EngineEvent::UpdateFailed {
                        record,
                        error: e.to_string(),
                    });
                }
            }

            results.push(EntryReport {
                entry: entry.clone(),
                result,
            });
        }

        let report = RunReport { address, results };
        self.emit_event(EngineEvent::Finished {
            succeeded: report.succeeded(),
            failed: report.failed(),
        });

        report
    }

    /// Run the fetch → reconcile → submit pipeline for one entry
    pub async fn update_entry(
        &self,
        entry: &MappingEntry,
        address: Ipv4Addr,
    ) -> Result<UpdateOutcome> {
        let existing = self.provider.fetch_records(&entry.domain).await?;
        debug!(
            "Fetched {} record(s) for {}",
            existing.len(),
            entry.domain
        );

        let reconciled = reconcile::plan(existing, &entry.subdomain, address);

        if reconciled.is_noop() && !self.options.force {
            debug!("Record {} unchanged, skipping submission", entry);
            return Ok(UpdateOutcome::Unchanged);
        }

        let outcome = match &reconciled.change {
            RecordChange::Updated {
                previous_address, ..
            } => UpdateOutcome::Updated {
                previous_address: previous_address.clone(),
            },
            RecordChange::Appended => UpdateOutcome::Created,
        };

        debug!(
            "Submitting {} record(s) for {} ({:?})",
            reconciled.records.len(),
            entry.domain,
            outcome
        );

        self.provider
            .submit_records(&entry.domain, &reconciled.records)
            .await?
            .into_result()?;

        Ok(outcome)
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full or closed, dropping event");
        }
    }
}
