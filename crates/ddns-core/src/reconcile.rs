//! Record-set reconciliation
//!
//! Computes the record set to resubmit for one subdomain. The registrar
//! replaces a domain's whole record set on every submission, so the result
//! always carries every existing record: exactly one record is changed or
//! appended, the rest pass through untouched and in order.

use crate::record::{HostRecord, RecordSet};
use std::net::Ipv4Addr;

/// What reconciliation did to the record set
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordChange {
    /// An existing record had its address replaced
    Updated {
        /// Position of the changed record
        index: usize,
        /// Address the record held before
        previous_address: String,
    },
    /// No record matched, a new A record was appended
    Appended,
}

/// Reconciled record set together with the change that produced it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub records: RecordSet,
    pub change: RecordChange,
    new_address: String,
}

impl Reconciliation {
    /// True when the matched record already carried the desired address
    pub fn is_noop(&self) -> bool {
        matches!(&self.change, RecordChange::Updated { previous_address, .. } if *previous_address == self.new_address)
    }
}

/// Merge `new_ip` for `subdomain` into `records`
///
/// Only the first record whose host name equals `subdomain` (exact,
/// case-sensitive) is touched, and only its address; type and TTL are kept.
/// Without a match an `A` record with the default TTL is appended.
pub fn plan(mut records: RecordSet, subdomain: &str, new_ip: Ipv4Addr) -> Reconciliation {
    let new_address = new_ip.to_string();

    let matched = records
        .position(subdomain)
        .and_then(|index| records.get_mut(index).map(|record| (index, record)));

    let change = match matched {
        Some((index, record)) => {
            let previous_address = std::mem::replace(&mut record.address, new_address.clone());
            RecordChange::Updated {
                index,
                previous_address,
            }
        }
        None => {
            records.push(HostRecord::a(subdomain, new_ip));
            RecordChange::Appended
        }
    };

    Reconciliation {
        records,
        change,
        new_address,
    }
}

/// Merge `new_ip` for `subdomain` into `records`, returning only the new set
pub fn reconcile(records: RecordSet, subdomain: &str, new_ip: Ipv4Addr) -> RecordSet {
    plan(records, subdomain, new_ip).records
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ip(s: &str) -> Ipv4Addr {
        s.parse().unwrap()
    }

    fn sample() -> RecordSet {
        RecordSet::from(vec![
            HostRecord::new("@", "A", "1.1.1.1", "1800"),
            HostRecord::new("www", "CNAME", "example.com.", "1800"),
            HostRecord::new("@", "MX", "mail.example.com.", "3600").with_mx_pref("10"),
        ])
    }

    #[test]
    fn updates_existing_record_in_place() {
        let existing = RecordSet::from(vec![HostRecord::new("home", "A", "1.2.3.4", "60")]);

        let result = reconcile(existing, "home", ip("5.6.7.8"));

        assert_eq!(
            result,
            RecordSet::from(vec![HostRecord::new("home", "A", "5.6.7.8", "60")])
        );
    }

    #[test]
    fn appends_to_empty_set() {
        let result = reconcile(RecordSet::new(), "api", ip("9.9.9.9"));

        assert_eq!(
            result,
            RecordSet::from(vec![HostRecord::new("api", "A", "9.9.9.9", "60")])
        );
    }

    #[test]
    fn append_keeps_existing_records_and_order() {
        let existing = sample();
        let result = reconcile(existing.clone(), "home", ip("5.6.7.8"));

        assert_eq!(result.len(), existing.len() + 1);
        assert_eq!(&result.as_slice()[..existing.len()], existing.as_slice());
        assert_eq!(
            result.as_slice().last().unwrap(),
            &HostRecord::new("home", "A", "5.6.7.8", "60")
        );
    }

    #[test]
    fn update_changes_only_the_address_of_one_record() {
        let existing = sample();
        let result = plan(existing.clone(), "www", ip("5.6.7.8"));

        assert_eq!(
            result.change,
            RecordChange::Updated {
                index: 1,
                previous_address: "example.com.".to_string(),
            }
        );
        assert_eq!(result.records.len(), existing.len());

        for (i, (before, after)) in existing.iter().zip(result.records.iter()).enumerate() {
            if i == 1 {
                assert_eq!(after.address, "5.6.7.8");
                assert_eq!(after.host_name, before.host_name);
                assert_eq!(after.record_type, "CNAME");
                assert_eq!(after.ttl, "1800");
            } else {
                assert_eq!(after, before);
            }
        }
    }

    #[test]
    fn only_first_match_is_updated() {
        let existing = RecordSet::from(vec![
            HostRecord::new("home", "TXT", "hello", "1800"),
            HostRecord::new("home", "A", "1.2.3.4", "60"),
        ]);

        let result = reconcile(existing, "home", ip("5.6.7.8"));

        assert_eq!(result.get(0).unwrap().address, "5.6.7.8");
        assert_eq!(result.get(0).unwrap().record_type, "TXT");
        assert_eq!(result.get(1).unwrap().address, "1.2.3.4");
    }

    #[test]
    fn match_is_case_sensitive() {
        let existing = RecordSet::from(vec![HostRecord::new("Home", "A", "1.2.3.4", "60")]);

        let result = plan(existing, "home", ip("5.6.7.8"));

        assert_eq!(result.change, RecordChange::Appended);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records.get(0).unwrap().address, "1.2.3.4");
    }

    #[test]
    fn noop_detection() {
        let existing = RecordSet::from(vec![HostRecord::new("home", "A", "5.6.7.8", "60")]);
        assert!(plan(existing.clone(), "home", ip("5.6.7.8")).is_noop());
        assert!(!plan(existing, "home", ip("1.1.1.1")).is_noop());
        assert!(!plan(RecordSet::new(), "home", ip("1.1.1.1")).is_noop());
    }
}
