// # ddns-core
//
// Core library for the Namecheap dynamic DNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for keeping A records in sync
// with a host's public IPv4 address:
// - **IpSource**: Trait for determining the address to publish
// - **DnsProvider**: Trait for reading and replacing a domain's record set
// - **reconcile**: Pure merge of the desired address into a record set
// - **DdnsEngine**: Sequential fetch → reconcile → submit pipeline
// - **UpdaterConfig**: Validated, immutable run configuration
//
// ## Design Principles
//
// 1. **Registrar is the source of truth**: nothing is persisted between runs
// 2. **Whole-set submission**: every fetched record is resubmitted
// 3. **Library-First**: the binary is a thin wiring layer

pub mod traits;
pub mod engine;
pub mod config;
pub mod error;
pub mod record;
pub mod reconcile;

// Re-export core types for convenience
pub use traits::{IpSource, DnsProvider, StaticIpSource};
pub use engine::{DdnsEngine, EngineEvent, EngineOptions, EntryReport, RunReport, UpdateOutcome};
pub use config::{Credentials, UpdaterConfig, RegistrarConfig, AddressEchoConfig};
pub use error::{Error, Result};
pub use record::{HostRecord, RecordSet, DomainName, MappingEntry, SubmissionResult};
pub use reconcile::{reconcile, RecordChange};
