//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Determine the address to publish
//! - [`DnsProvider`]: Read and replace a domain's record set at the registrar

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::{IpSource, StaticIpSource};
pub use dns_provider::DnsProvider;
