//! DNS data model
//!
//! Records are kept as the registrar reports them: every field is a string so
//! that a fetched record set can be resubmitted byte-for-byte.

use crate::error::{Error, Result};
use std::fmt;
use std::net::Ipv4Addr;

/// TTL used when the registrar omits one and for newly appended records
pub const DEFAULT_TTL: &str = "60";

/// Record type of newly appended records
pub const DEFAULT_RECORD_TYPE: &str = "A";

/// A single host record within a parent domain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostRecord {
    /// Host label relative to the parent domain (e.g. "home", "@", "www")
    pub host_name: String,
    /// Record type as reported by the registrar ("A", "CNAME", "TXT", ...)
    pub record_type: String,
    /// Record value
    pub address: String,
    /// Time-to-live in seconds, as a string
    pub ttl: String,
    /// MX preference, only present on MX records
    pub mx_pref: Option<String>,
}

impl HostRecord {
    /// Create a record with an explicit type and TTL
    pub fn new(
        host_name: impl Into<String>,
        record_type: impl Into<String>,
        address: impl Into<String>,
        ttl: impl Into<String>,
    ) -> Self {
        Self {
            host_name: host_name.into(),
            record_type: record_type.into(),
            address: address.into(),
            ttl: ttl.into(),
            mx_pref: None,
        }
    }

    /// Create an A record with the default TTL
    pub fn a(host_name: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self::new(host_name, DEFAULT_RECORD_TYPE, ip.to_string(), DEFAULT_TTL)
    }

    /// Attach an MX preference
    pub fn with_mx_pref(mut self, mx_pref: impl Into<String>) -> Self {
        self.mx_pref = Some(mx_pref.into());
        self
    }
}

/// Ordered record set of one parent domain
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordSet {
    records: Vec<HostRecord>,
}

impl RecordSet {
    /// Create an empty record set
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the set holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate records in order
    pub fn iter(&self) -> std::slice::Iter<'_, HostRecord> {
        self.records.iter()
    }

    /// Position of the first record whose host name matches exactly
    pub fn position(&self, host_name: &str) -> Option<usize> {
        self.records.iter().position(|r| r.host_name == host_name)
    }

    /// First record whose host name matches exactly
    pub fn find(&self, host_name: &str) -> Option<&HostRecord> {
        self.position(host_name).map(|i| &self.records[i])
    }

    /// Record at `index`
    pub fn get(&self, index: usize) -> Option<&HostRecord> {
        self.records.get(index)
    }

    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut HostRecord> {
        self.records.get_mut(index)
    }

    /// Append a record at the end
    pub fn push(&mut self, record: HostRecord) {
        self.records.push(record);
    }

    /// Borrow the records as a slice
    pub fn as_slice(&self) -> &[HostRecord] {
        &self.records
    }
}

impl From<Vec<HostRecord>> for RecordSet {
    fn from(records: Vec<HostRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<HostRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = HostRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl IntoIterator for RecordSet {
    type Item = HostRecord;
    type IntoIter = std::vec::IntoIter<HostRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a HostRecord;
    type IntoIter = std::slice::Iter<'a, HostRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// A registrable domain split into its second-level and top-level labels
///
/// Only two-label domains are accepted. The registrar API addresses domains
/// by `SLD`/`TLD` pair, and silently splitting "example.co.uk" on the first
/// dot would target the wrong zone.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DomainName {
    sld: String,
    tld: String,
}

impl DomainName {
    /// Parse "example.com" into ("example", "com")
    pub fn parse(domain: &str) -> Result<Self> {
        let domain = domain.trim();
        let labels: Vec<&str> = domain.split('.').collect();

        match labels.as_slice() {
            [sld, tld] if !sld.is_empty() && !tld.is_empty() => Ok(Self {
                sld: sld.to_string(),
                tld: tld.to_string(),
            }),
            [_, _] => Err(Error::config(format!(
                "Domain '{}' has an empty label",
                domain
            ))),
            _ => Err(Error::config(format!(
                "Domain '{}' must have exactly two labels (e.g. example.com), got {}",
                domain,
                labels.len()
            ))),
        }
    }

    /// Second-level label
    pub fn sld(&self) -> &str {
        &self.sld
    }

    /// Top-level label
    pub fn tld(&self) -> &str {
        &self.tld
    }
}

impl fmt::Display for DomainName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.sld, self.tld)
    }
}

/// One (subdomain -> parent domain) pair this run is responsible for
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MappingEntry {
    /// Host label within the parent domain
    pub subdomain: String,
    /// Parent domain
    pub domain: DomainName,
}

impl MappingEntry {
    pub fn new(subdomain: impl Into<String>, domain: DomainName) -> Self {
        Self {
            subdomain: subdomain.into(),
            domain,
        }
    }
}

impl fmt::Display for MappingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.subdomain, self.domain)
    }
}

/// Outcome of a record-set submission as reported by the registrar
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionResult {
    /// Whether the registrar reported success
    pub success: bool,
    /// Error messages reported on failure
    pub errors: Vec<String>,
    /// The raw response body
    pub raw: String,
}

impl SubmissionResult {
    /// A successful submission
    pub fn succeeded(raw: impl Into<String>) -> Self {
        Self {
            success: true,
            errors: Vec::new(),
            raw: raw.into(),
        }
    }

    /// A failed submission
    pub fn failed(errors: Vec<String>, raw: impl Into<String>) -> Self {
        Self {
            success: false,
            errors,
            raw: raw.into(),
        }
    }

    /// Turn a failed submission into a registrar error
    pub fn into_result(self) -> Result<()> {
        if self.success {
            Ok(())
        } else {
            Err(Error::registrar(self.errors, self.raw))
        }
    }
}
